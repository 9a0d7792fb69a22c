//! Standalone traffic flow simulation module
//!
//! Vehicles travel along roads between junctions; junctions arbitrate the
//! right of way through pluggable light switching and dequeuing strategies;
//! roads accumulate and shed pollution and adjust their speed limits.

mod demo;
mod dequeuing;
mod error;
mod events;
mod junction;
mod light_switching;
mod report;
mod road;
mod types;
mod vehicle;
mod world;

pub use demo::{generate_demo, DemoConfig};
pub use dequeuing::{DequeuingStrategy, MoveAll, MoveFirst};
pub use error::{Result, SimError};
pub use events::{
    parse_event, ClassChange, DequeuingSpec, Event, LightSwitchingSpec, NewJunction, NewRoad,
    NewVehicle, NoData, Scenario, SetContClass, SetWeather, TimeslotData, WeatherChange,
};
pub use junction::Junction;
pub use light_switching::{LightSwitchingStrategy, MostCrowded, RoundRobin, DEFAULT_TIMESLOT};
pub use report::{
    JunctionReport, QueueReport, RoadReport, SimReport, VehicleReport, WorldState, NO_GREEN,
};
pub use road::{CityRoad, InterCityRoad, Road, RoadKind, RoadPolicy, CITY_DECAY, CITY_DECAY_WINDY};
pub use types::{JunctionId, RoadId, SimId, VehicleId, VehicleStatus, Weather, MAX_CONT_CLASS};
pub use vehicle::{RoadChange, RoadLookup, Vehicle, VehicleStep};
pub use world::SimWorld;
