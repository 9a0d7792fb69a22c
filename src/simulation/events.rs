//! Timed events and the JSON scenario format
//!
//! A scenario is a list of events, each tagged with the tick at which it
//! runs. Events name entities by their string identifiers; the world
//! resolves them when the event executes.

use std::io::Read;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::dequeuing::{DequeuingStrategy, MoveAll, MoveFirst};
use super::error::{Result as SimResult, SimError};
use super::light_switching::{LightSwitchingStrategy, MostCrowded, RoundRobin, DEFAULT_TIMESLOT};
use super::road::RoadKind;
use super::types::{Weather, MAX_CONT_CLASS};
use super::world::SimWorld;

/// Light switching policy as written in a scenario
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum LightSwitchingSpec {
    #[serde(rename = "round_robin_lss")]
    RoundRobin(TimeslotData),
    #[serde(rename = "most_crowded_lss")]
    MostCrowded(TimeslotData),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TimeslotData {
    #[serde(default = "default_timeslot")]
    pub timeslot: u32,
}

fn default_timeslot() -> u32 {
    DEFAULT_TIMESLOT
}

impl Default for TimeslotData {
    fn default() -> Self {
        Self {
            timeslot: DEFAULT_TIMESLOT,
        }
    }
}

impl LightSwitchingSpec {
    pub fn build(&self) -> Box<dyn LightSwitchingStrategy> {
        match self {
            LightSwitchingSpec::RoundRobin(data) => Box::new(RoundRobin::new(data.timeslot)),
            LightSwitchingSpec::MostCrowded(data) => Box::new(MostCrowded::new(data.timeslot)),
        }
    }
}

/// Dequeuing policy as written in a scenario
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum DequeuingSpec {
    #[serde(rename = "move_first_dqs")]
    MoveFirst(NoData),
    #[serde(rename = "move_all_dqs")]
    MoveAll(NoData),
}

/// Empty `data` payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct NoData {}

impl DequeuingSpec {
    pub fn build(&self) -> Box<dyn DequeuingStrategy> {
        match self {
            DequeuingSpec::MoveFirst(_) => Box::new(MoveFirst),
            DequeuingSpec::MoveAll(_) => Box::new(MoveAll),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewJunction {
    pub time: u32,
    pub id: String,
    pub coor: [u32; 2],
    pub ls_strategy: LightSwitchingSpec,
    pub dq_strategy: DequeuingSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewRoad {
    pub time: u32,
    pub id: String,
    pub src: String,
    pub dest: String,
    pub length: u32,
    pub co2limit: u64,
    pub maxspeed: u32,
    pub weather: Weather,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewVehicle {
    pub time: u32,
    pub id: String,
    pub maxspeed: u32,
    pub class: u8,
    pub itinerary: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WeatherChange {
    pub road: String,
    pub weather: Weather,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SetWeather {
    pub time: u32,
    pub info: Vec<WeatherChange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClassChange {
    pub vehicle: String,
    pub class: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SetContClass {
    pub time: u32,
    pub info: Vec<ClassChange>,
}

/// Something that happens to the world at the start of a given tick
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Event {
    NewJunction(NewJunction),
    NewCityRoad(NewRoad),
    NewInterCityRoad(NewRoad),
    NewVehicle(NewVehicle),
    SetWeather(SetWeather),
    SetContClass(SetContClass),
}

impl Event {
    /// Tick at which the event runs
    pub fn time(&self) -> u32 {
        match self {
            Event::NewJunction(e) => e.time,
            Event::NewCityRoad(e) | Event::NewInterCityRoad(e) => e.time,
            Event::NewVehicle(e) => e.time,
            Event::SetWeather(e) => e.time,
            Event::SetContClass(e) => e.time,
        }
    }

    /// Apply the event. Every referenced entity is resolved before anything
    /// changes, so a failing event has no effect.
    pub fn execute(self, world: &mut SimWorld) -> SimResult<()> {
        match self {
            Event::NewJunction(e) => {
                world.add_junction(
                    &e.id,
                    e.ls_strategy.build(),
                    e.dq_strategy.build(),
                    e.coor[0],
                    e.coor[1],
                )?;
            }
            Event::NewCityRoad(e) => add_road(world, RoadKind::City, e)?,
            Event::NewInterCityRoad(e) => add_road(world, RoadKind::InterCity, e)?,
            Event::NewVehicle(e) => {
                let itinerary = e
                    .itinerary
                    .iter()
                    .map(|name| world.junction_id(name))
                    .collect::<SimResult<Vec<_>>>()?;
                world.add_vehicle(&e.id, e.maxspeed, e.class, itinerary)?;
            }
            Event::SetWeather(e) => {
                let changes = e
                    .info
                    .iter()
                    .map(|c| world.road_id(&c.road).map(|id| (id, c.weather)))
                    .collect::<SimResult<Vec<_>>>()?;
                for (road, weather) in changes {
                    world.set_weather(road, weather)?;
                }
            }
            Event::SetContClass(e) => {
                let changes = e
                    .info
                    .iter()
                    .map(|c| world.vehicle_id(&c.vehicle).map(|id| (id, c.class)))
                    .collect::<SimResult<Vec<_>>>()?;
                let invalid = changes.iter().find(|(_, class)| *class > MAX_CONT_CLASS);
                if let Some((_, class)) = invalid {
                    return Err(SimError::validation(format!(
                        "contamination class {class} is outside 0..={MAX_CONT_CLASS}"
                    )));
                }
                for (vehicle, class) in changes {
                    world.set_cont_class(vehicle, class)?;
                }
            }
        }
        Ok(())
    }
}

fn add_road(world: &mut SimWorld, kind: RoadKind, e: NewRoad) -> SimResult<()> {
    let src = world.junction_id(&e.src)?;
    let dest = world.junction_id(&e.dest)?;
    world.add_road(
        &e.id, kind, src, dest, e.length, e.maxspeed, e.co2limit, e.weather,
    )?;
    Ok(())
}

/// Top-level scenario file layout
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub events: Vec<Event>,
}

impl Scenario {
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        serde_json::from_reader(reader).context("Failed to parse scenario")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse scenario")
    }

    /// Queue every event of the scenario on the world
    pub fn load_into(self, world: &mut SimWorld) {
        for event in self.events {
            world.add_event(event);
        }
    }
}

/// Parse a single event object
pub fn parse_event(json: &str) -> Result<Event> {
    serde_json::from_str(json).context("Failed to parse event")
}
