//! Per-tick snapshots of the world
//!
//! Plain serializable values; the CLI writes them out as JSON.

use log::warn;
use serde::Serialize;

use super::types::{RoadId, VehicleId, VehicleStatus, Weather};
use super::world::SimWorld;

/// Green-light value reported for a junction without a green road
pub const NO_GREEN: &str = "none";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoadReport {
    pub id: String,
    pub speedlimit: u32,
    pub weather: Weather,
    pub co2: u64,
    /// Lead vehicle first
    pub vehicles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueReport {
    pub road: String,
    /// FIFO order
    pub vehicles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JunctionReport {
    pub id: String,
    pub green: String,
    pub queues: Vec<QueueReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleReport {
    pub id: String,
    pub speed: u32,
    pub distance: u64,
    pub co2: u64,
    pub class: u8,
    pub status: VehicleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub road: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorldState {
    pub roads: Vec<RoadReport>,
    pub vehicles: Vec<VehicleReport>,
    pub junctions: Vec<JunctionReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimReport {
    pub time: u32,
    pub state: WorldState,
}

impl SimWorld {
    /// Snapshot of every road, vehicle and junction, in registration order
    pub fn report(&self) -> SimReport {
        let roads = self
            .roads()
            .iter()
            .map(|road| RoadReport {
                id: road.name().to_string(),
                speedlimit: road.speed_limit(),
                weather: road.weather(),
                co2: road.total_co2(),
                vehicles: road
                    .vehicles()
                    .iter()
                    .map(|id| self.vehicle_name(*id))
                    .collect(),
            })
            .collect();

        let vehicles = self
            .vehicles()
            .iter()
            .map(|vehicle| {
                let on_road = vehicle.status().is_on_road();
                VehicleReport {
                    id: vehicle.name().to_string(),
                    speed: vehicle.speed(),
                    distance: vehicle.total_distance(),
                    co2: vehicle.total_co2(),
                    class: vehicle.cont_class(),
                    status: vehicle.status(),
                    road: vehicle
                        .road()
                        .filter(|_| on_road)
                        .map(|id| self.road_name(id)),
                    location: on_road.then(|| vehicle.location()),
                }
            })
            .collect();

        let junctions = self
            .junctions()
            .iter()
            .map(|junction| JunctionReport {
                id: junction.name().to_string(),
                green: junction
                    .green_road()
                    .map_or_else(|| NO_GREEN.to_string(), |id| self.road_name(id)),
                queues: junction
                    .incoming_roads()
                    .iter()
                    .zip(junction.queues())
                    .map(|(road, queue)| QueueReport {
                        road: self.road_name(*road),
                        vehicles: queue
                            .iter()
                            .map(|id| self.vehicle_name(*id))
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        SimReport {
            time: self.time(),
            state: WorldState {
                roads,
                vehicles,
                junctions,
            },
        }
    }

    fn road_name(&self, id: RoadId) -> String {
        match self.get_road(id) {
            Some(road) => road.name().to_string(),
            None => {
                warn!("Report references unknown road {:?}", id);
                String::new()
            }
        }
    }

    fn vehicle_name(&self, id: VehicleId) -> String {
        match self.get_vehicle(id) {
            Some(vehicle) => vehicle.name().to_string(),
            None => {
                warn!("Report references unknown vehicle {:?}", id);
                String::new()
            }
        }
    }
}
