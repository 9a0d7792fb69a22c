//! Main simulation world that ties everything together
//!
//! The world owns every junction, road and vehicle, the global tick counter
//! and the queue of pending events. Entities never reach into each other:
//! the world applies the cross-entity transitions they report, in a fixed
//! order, once per tick.

use std::collections::HashMap;

use log::{debug, info};

use super::dequeuing::DequeuingStrategy;
use super::error::{Result, SimError};
use super::events::Event;
use super::junction::Junction;
use super::light_switching::LightSwitchingStrategy;
use super::road::{Road, RoadKind};
use super::types::{JunctionId, RoadId, SimId, VehicleId, VehicleStatus, Weather};
use super::vehicle::Vehicle;

/// The main simulation world
#[derive(Debug, Default)]
pub struct SimWorld {
    /// Current tick; 0 until the first advance
    time: u32,

    /// All junctions, in registration order
    junctions: Vec<Junction>,

    /// All roads, in registration order
    roads: Vec<Road>,

    /// All vehicles, in registration order
    vehicles: Vec<Vehicle>,

    junction_names: HashMap<String, JunctionId>,
    road_names: HashMap<String, RoadId>,
    vehicle_names: HashMap<String, VehicleId>,

    /// Pending events ordered by time, then insertion
    events: Vec<Event>,
}

impl SimWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all entities and events and rewind the clock
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Add a junction with its traffic light and dequeuing policies
    pub fn add_junction(
        &mut self,
        name: &str,
        light_strategy: Box<dyn LightSwitchingStrategy>,
        dequeue_strategy: Box<dyn DequeuingStrategy>,
        x: u32,
        y: u32,
    ) -> Result<JunctionId> {
        if self.junction_names.contains_key(name) {
            return Err(SimError::DuplicateId(name.to_string()));
        }

        let id = JunctionId(SimId(self.junctions.len()));
        let junction = Junction::new(id, name, light_strategy, dequeue_strategy, x, y)?;
        self.junctions.push(junction);
        self.junction_names.insert(name.to_string(), id);

        info!("Created junction {} at ({}, {})", name, x, y);
        Ok(id)
    }

    /// Add a road from `src` to `dest` and register it with both junctions.
    ///
    /// Everything is validated before either junction is touched, so a
    /// rejected road leaves the topology unchanged.
    #[allow(clippy::too_many_arguments)]
    pub fn add_road(
        &mut self,
        name: &str,
        kind: RoadKind,
        src: JunctionId,
        dest: JunctionId,
        length: u32,
        max_speed: u32,
        cont_limit: u64,
        weather: Weather,
    ) -> Result<RoadId> {
        if self.road_names.contains_key(name) {
            return Err(SimError::DuplicateId(name.to_string()));
        }
        self.check_junction(src)?;
        self.check_junction(dest)?;

        let id = RoadId(SimId(self.roads.len()));
        let road = Road::new(
            id, name, kind, src, dest, length, max_speed, cont_limit, weather,
        )?;
        self.junctions[src.index()].check_outgoing_road(&road)?;

        self.junctions[src.index()].add_outgoing_road(&road)?;
        self.junctions[dest.index()].add_incoming_road(&road)?;
        self.roads.push(road);
        self.road_names.insert(name.to_string(), id);

        info!(
            "Created {:?} road {} from {} to {}",
            kind,
            name,
            self.junctions[src.index()].name(),
            self.junctions[dest.index()].name()
        );
        Ok(id)
    }

    /// Add a vehicle and place it on the first road of its itinerary
    pub fn add_vehicle(
        &mut self,
        name: &str,
        max_speed: u32,
        cont_class: u8,
        itinerary: Vec<JunctionId>,
    ) -> Result<VehicleId> {
        if self.vehicle_names.contains_key(name) {
            return Err(SimError::DuplicateId(name.to_string()));
        }
        for junction in &itinerary {
            self.check_junction(*junction)?;
        }

        let id = VehicleId(SimId(self.vehicles.len()));
        let mut vehicle = Vehicle::new(id, name, max_speed, cont_class, itinerary)?;
        let change = vehicle.move_to_next_road(&self.junctions)?;
        if let Some(road) = change.entered {
            self.roads[road.index()].enter(&vehicle)?;
        }
        self.vehicles.push(vehicle);
        self.vehicle_names.insert(name.to_string(), id);

        info!("Created vehicle {}", name);
        Ok(id)
    }

    pub fn set_weather(&mut self, road: RoadId, weather: Weather) -> Result<()> {
        let road = self
            .roads
            .get_mut(road.index())
            .ok_or_else(|| SimError::UnknownRoad(format!("{:?}", road)))?;
        road.set_weather(weather);
        Ok(())
    }

    pub fn set_cont_class(&mut self, vehicle: VehicleId, cont_class: u8) -> Result<()> {
        self.vehicles
            .get_mut(vehicle.index())
            .ok_or_else(|| SimError::UnknownVehicle(format!("{:?}", vehicle)))?
            .set_cont_class(cont_class)
    }

    /// Queue an event to run at the start of the tick it names
    pub fn add_event(&mut self, event: Event) {
        let position = self.events.partition_point(|e| e.time() <= event.time());
        self.events.insert(position, event);
    }

    /// Main simulation tick
    ///
    /// Runs due events, then every road, then every junction, each in
    /// registration order. An error aborts the tick part-way; the world is
    /// not rolled back.
    pub fn advance(&mut self) -> Result<()> {
        self.time += 1;
        let now = self.time;

        let due = self.events.partition_point(|e| e.time() <= now);
        let due: Vec<Event> = self.events.drain(..due).collect();
        for event in due {
            event.execute(self)?;
        }

        // Roads move vehicles; those reaching the end queue at the next junction
        for road in &mut self.roads {
            for id in road.advance(&mut self.vehicles, now) {
                let vehicle = &self.vehicles[id.index()];
                let junction = vehicle.next_junction().ok_or_else(|| {
                    SimError::state(format!("vehicle {} has no next junction", vehicle.name()))
                })?;
                self.junctions[junction.index()].enter(vehicle)?;
            }
        }

        // Junctions release vehicles from their green queue
        for index in 0..self.junctions.len() {
            for id in self.junctions[index].advance(now) {
                self.move_vehicle_to_next_road(id)?;
            }
        }

        debug!("Tick {} complete", now);
        Ok(())
    }

    fn move_vehicle_to_next_road(&mut self, id: VehicleId) -> Result<()> {
        let vehicle = &mut self.vehicles[id.index()];
        let change = vehicle.move_to_next_road(&self.junctions)?;
        if let Some(left) = change.left {
            self.roads[left.index()].exit(id);
        }
        if let Some(entered) = change.entered {
            self.roads[entered.index()].enter(vehicle)?;
        }
        Ok(())
    }

    fn check_junction(&self, id: JunctionId) -> Result<()> {
        if id.index() < self.junctions.len() {
            Ok(())
        } else {
            Err(SimError::UnknownJunction(format!("{:?}", id)))
        }
    }

    pub fn time(&self) -> u32 {
        self.time
    }

    pub fn junctions(&self) -> &[Junction] {
        &self.junctions
    }

    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn get_junction(&self, id: JunctionId) -> Option<&Junction> {
        self.junctions.get(id.index())
    }

    pub fn get_road(&self, id: RoadId) -> Option<&Road> {
        self.roads.get(id.index())
    }

    pub fn get_vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(id.index())
    }

    pub fn junction_id(&self, name: &str) -> Result<JunctionId> {
        self.junction_names
            .get(name)
            .copied()
            .ok_or_else(|| SimError::UnknownJunction(name.to_string()))
    }

    pub fn road_id(&self, name: &str) -> Result<RoadId> {
        self.road_names
            .get(name)
            .copied()
            .ok_or_else(|| SimError::UnknownRoad(name.to_string()))
    }

    pub fn vehicle_id(&self, name: &str) -> Result<VehicleId> {
        self.vehicle_names
            .get(name)
            .copied()
            .ok_or_else(|| SimError::UnknownVehicle(name.to_string()))
    }

    /// Number of events still waiting for their tick
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Number of vehicles that completed their itinerary
    pub fn arrived_count(&self) -> usize {
        self.vehicles
            .iter()
            .filter(|v| v.status() == VehicleStatus::Arrived)
            .count()
    }
}
