//! Core types for the traffic simulation
//!
//! Handles, weather and vehicle status shared by roads, junctions and vehicles.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{Result, SimError};

/// A unique identifier for simulation entities
/// This is a simple wrapper around a usize index into the owning arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimId(pub usize);

/// A wrapper type for junction IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JunctionId(pub SimId);

/// A wrapper type for road IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoadId(pub SimId);

/// A wrapper type for vehicle IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VehicleId(pub SimId);

impl JunctionId {
    pub fn index(self) -> usize {
        self.0 .0
    }
}

impl RoadId {
    pub fn index(self) -> usize {
        self.0 .0
    }
}

impl VehicleId {
    pub fn index(self) -> usize {
        self.0 .0
    }
}

/// Weather over a road. Drives pollution decay and, on inter-city roads,
/// vehicle speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Weather {
    Sunny,
    Cloudy,
    Rainy,
    Windy,
    Storm,
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Weather::Sunny => "SUNNY",
            Weather::Cloudy => "CLOUDY",
            Weather::Rainy => "RAINY",
            Weather::Windy => "WINDY",
            Weather::Storm => "STORM",
        };
        f.write_str(name)
    }
}

/// Travel state of a vehicle
///
/// `Pending -> Traveling -> Waiting -> Traveling -> ... -> Arrived`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VehicleStatus {
    /// Created, not yet placed on its first road
    Pending,
    /// Moving along a road
    Traveling,
    /// Queued at the junction at the end of its road
    Waiting,
    /// Itinerary exhausted
    Arrived,
}

impl VehicleStatus {
    /// Whether the vehicle currently sits on a road (moving or queued at its end)
    pub fn is_on_road(self) -> bool {
        matches!(self, VehicleStatus::Traveling | VehicleStatus::Waiting)
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VehicleStatus::Pending => "PENDING",
            VehicleStatus::Traveling => "TRAVELING",
            VehicleStatus::Waiting => "WAITING",
            VehicleStatus::Arrived => "ARRIVED",
        };
        f.write_str(name)
    }
}

/// Highest contamination class a vehicle may carry
pub const MAX_CONT_CLASS: u8 = 10;

/// Validate an entity name: identifiers must be non-blank
pub(crate) fn check_name(kind: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(SimError::validation(format!(
            "{kind} identifier must not be blank"
        )));
    }
    Ok(())
}
