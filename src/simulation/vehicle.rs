//! Vehicle movement logic for the traffic simulation
//!
//! A vehicle follows a precomputed itinerary of junctions. It never touches
//! roads or junctions directly: movement reports what happened and the world
//! applies the cross-entity effects.

use log::debug;

use super::error::{Result, SimError};
use super::types::{check_name, JunctionId, RoadId, VehicleId, VehicleStatus, MAX_CONT_CLASS};

/// Read-only view of the junction graph used to resolve itinerary legs
pub trait RoadLookup {
    /// The outgoing road from `from` whose destination is `to`
    fn road_between(&self, from: JunctionId, to: JunctionId) -> Option<RoadId>;

    /// Human-readable identifier of a junction, for error messages
    fn junction_name(&self, id: JunctionId) -> &str;
}

/// Outcome of a single vehicle advance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VehicleStep {
    /// Distance covered this tick
    pub distance: u32,
    /// Contamination emitted this tick (distance x contamination class)
    pub co2: u64,
    /// The vehicle reached the end of its road and is now waiting
    pub reached_end: bool,
}

/// Roads a vehicle left and entered during `move_to_next_road`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoadChange {
    pub left: Option<RoadId>,
    pub entered: Option<RoadId>,
}

/// A vehicle in the traffic simulation
#[derive(Debug, Clone)]
pub struct Vehicle {
    id: VehicleId,
    name: String,
    itinerary: Vec<JunctionId>,
    max_speed: u32,
    cont_class: u8,
    speed: u32,
    status: VehicleStatus,
    road: Option<RoadId>,
    location: u32,
    total_co2: u64,
    total_distance: u64,
    /// Index into the itinerary of the last junction the vehicle left
    last_junction: usize,
}

impl Vehicle {
    pub fn new(
        id: VehicleId,
        name: impl Into<String>,
        max_speed: u32,
        cont_class: u8,
        itinerary: Vec<JunctionId>,
    ) -> Result<Self> {
        let name = name.into();
        check_name("vehicle", &name)?;
        if max_speed == 0 {
            return Err(SimError::validation(format!(
                "vehicle {name}: max speed must be positive"
            )));
        }
        if cont_class > MAX_CONT_CLASS {
            return Err(SimError::validation(format!(
                "vehicle {name}: contamination class {cont_class} is outside 0..={MAX_CONT_CLASS}"
            )));
        }
        if itinerary.len() < 2 {
            return Err(SimError::validation(format!(
                "vehicle {name}: itinerary needs at least 2 junctions, got {}",
                itinerary.len()
            )));
        }

        Ok(Self {
            id,
            name,
            itinerary,
            max_speed,
            cont_class,
            speed: 0,
            status: VehicleStatus::Pending,
            road: None,
            location: 0,
            total_co2: 0,
            total_distance: 0,
            last_junction: 0,
        })
    }

    /// Set the current speed, capped at the vehicle's max speed.
    /// Ignored unless the vehicle is traveling.
    pub fn set_speed(&mut self, speed: u32) {
        if self.status == VehicleStatus::Traveling {
            self.speed = speed.min(self.max_speed);
        }
    }

    pub fn set_cont_class(&mut self, cont_class: u8) -> Result<()> {
        if cont_class > MAX_CONT_CLASS {
            return Err(SimError::validation(format!(
                "vehicle {}: contamination class {cont_class} is outside 0..={MAX_CONT_CLASS}",
                self.name
            )));
        }
        self.cont_class = cont_class;
        Ok(())
    }

    /// Move along the current road of length `road_length`.
    ///
    /// Only traveling vehicles move. When the end of the road is reached the
    /// vehicle stops and starts waiting; the caller is responsible for
    /// queueing it at [`Vehicle::next_junction`].
    pub fn advance(&mut self, road_length: u32) -> VehicleStep {
        if self.status != VehicleStatus::Traveling {
            return VehicleStep::default();
        }

        let previous = self.location;
        self.location = self.location.saturating_add(self.speed).min(road_length);
        let distance = self.location - previous;
        let co2 = u64::from(distance) * u64::from(self.cont_class);

        self.total_distance += u64::from(distance);
        self.total_co2 += co2;

        let reached_end = self.location == road_length;
        if reached_end {
            self.status = VehicleStatus::Waiting;
            self.speed = 0;
        }

        VehicleStep {
            distance,
            co2,
            reached_end,
        }
    }

    /// Leave the current road (if any) and enter the next one on the itinerary.
    ///
    /// Legal only while pending or waiting. Leaving the road that ends at the
    /// final itinerary junction makes the vehicle arrive. The next road is
    /// resolved before any state changes, so a missing road leaves the
    /// vehicle untouched.
    pub fn move_to_next_road(&mut self, lookup: &impl RoadLookup) -> Result<RoadChange> {
        let from_index = match self.status {
            VehicleStatus::Pending => 0,
            VehicleStatus::Waiting => self.last_junction + 1,
            status => {
                return Err(SimError::state(format!(
                    "vehicle {} cannot move to the next road while {status}",
                    self.name
                )))
            }
        };

        let left = match self.status {
            VehicleStatus::Waiting => self.road,
            _ => None,
        };

        // Last junction reached
        if from_index == self.itinerary.len() - 1 {
            self.last_junction = from_index;
            self.status = VehicleStatus::Arrived;
            self.road = None;
            self.location = 0;
            self.speed = 0;
            debug!("Vehicle {} arrived", self.name);
            return Ok(RoadChange {
                left,
                entered: None,
            });
        }

        let from = self.itinerary[from_index];
        let to = self.itinerary[from_index + 1];
        let next = lookup.road_between(from, to).ok_or_else(|| SimError::NoRoad {
            from: lookup.junction_name(from).to_string(),
            to: lookup.junction_name(to).to_string(),
        })?;

        self.last_junction = from_index;
        self.road = Some(next);
        self.location = 0;
        self.status = VehicleStatus::Traveling;

        Ok(RoadChange {
            left,
            entered: Some(next),
        })
    }

    /// The junction at the end of the current road
    pub fn next_junction(&self) -> Option<JunctionId> {
        match self.status {
            VehicleStatus::Traveling | VehicleStatus::Waiting => {
                self.itinerary.get(self.last_junction + 1).copied()
            }
            _ => None,
        }
    }

    pub fn id(&self) -> VehicleId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn itinerary(&self) -> &[JunctionId] {
        &self.itinerary
    }

    pub fn max_speed(&self) -> u32 {
        self.max_speed
    }

    pub fn cont_class(&self) -> u8 {
        self.cont_class
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    pub fn status(&self) -> VehicleStatus {
        self.status
    }

    pub fn road(&self) -> Option<RoadId> {
        self.road
    }

    pub fn location(&self) -> u32 {
        self.location
    }

    pub fn total_co2(&self) -> u64 {
        self.total_co2
    }

    pub fn total_distance(&self) -> u64 {
        self.total_distance
    }
}
