//! Junction logic for the traffic simulation
//!
//! A junction keeps one FIFO queue per incoming road and a green light over
//! one of them. Which vehicles leave and when the light changes is decided
//! entirely by the injected strategies.

use std::collections::HashMap;

use log::debug;

use super::dequeuing::DequeuingStrategy;
use super::error::{Result, SimError};
use super::light_switching::LightSwitchingStrategy;
use super::road::Road;
use super::types::{check_name, JunctionId, RoadId, VehicleId};
use super::vehicle::{RoadLookup, Vehicle};

/// A junction in the traffic simulation
#[derive(Debug)]
pub struct Junction {
    id: JunctionId,
    name: String,
    x: u32,
    y: u32,
    incoming: Vec<RoadId>,
    /// Index-aligned with `incoming`
    queues: Vec<Vec<VehicleId>>,
    queue_by_road: HashMap<RoadId, usize>,
    outgoing: HashMap<JunctionId, RoadId>,
    green: Option<usize>,
    last_switch: u32,
    light_strategy: Box<dyn LightSwitchingStrategy>,
    dequeue_strategy: Box<dyn DequeuingStrategy>,
}

impl Junction {
    pub fn new(
        id: JunctionId,
        name: impl Into<String>,
        light_strategy: Box<dyn LightSwitchingStrategy>,
        dequeue_strategy: Box<dyn DequeuingStrategy>,
        x: u32,
        y: u32,
    ) -> Result<Self> {
        let name = name.into();
        check_name("junction", &name)?;

        Ok(Self {
            id,
            name,
            x,
            y,
            incoming: Vec::new(),
            queues: Vec::new(),
            queue_by_road: HashMap::new(),
            outgoing: HashMap::new(),
            green: None,
            last_switch: 0,
            light_strategy,
            dequeue_strategy,
        })
    }

    /// Register a road ending here and give it an empty queue
    pub fn add_incoming_road(&mut self, road: &Road) -> Result<()> {
        if road.dest() != self.id {
            return Err(SimError::validation(format!(
                "road {} does not end at junction {}",
                road.name(),
                self.name
            )));
        }
        if self.queue_by_road.contains_key(&road.id()) {
            return Err(SimError::validation(format!(
                "road {} is already an incoming road of junction {}",
                road.name(),
                self.name
            )));
        }
        self.queue_by_road.insert(road.id(), self.queues.len());
        self.incoming.push(road.id());
        self.queues.push(Vec::new());
        Ok(())
    }

    /// Register a road starting here; at most one per destination junction
    pub fn add_outgoing_road(&mut self, road: &Road) -> Result<()> {
        self.check_outgoing_road(road)?;
        self.outgoing.insert(road.dest(), road.id());
        Ok(())
    }

    /// Whether `add_outgoing_road` would accept this road
    pub fn check_outgoing_road(&self, road: &Road) -> Result<()> {
        if road.src() != self.id {
            return Err(SimError::validation(format!(
                "road {} does not start at junction {}",
                road.name(),
                self.name
            )));
        }
        if self.outgoing.contains_key(&road.dest()) {
            return Err(SimError::validation(format!(
                "junction {} already has an outgoing road to the destination of road {}",
                self.name,
                road.name()
            )));
        }
        Ok(())
    }

    /// Queue a vehicle that reached the end of one of the incoming roads
    pub fn enter(&mut self, vehicle: &Vehicle) -> Result<()> {
        let queue = vehicle
            .road()
            .and_then(|road| self.queue_by_road.get(&road))
            .copied()
            .ok_or_else(|| {
                SimError::state(format!(
                    "vehicle {} is not on an incoming road of junction {}",
                    vehicle.name(),
                    self.name
                ))
            })?;
        self.queues[queue].push(vehicle.id());
        Ok(())
    }

    /// The outgoing road towards `junction`, if any
    pub fn road_to(&self, junction: JunctionId) -> Option<RoadId> {
        self.outgoing.get(&junction).copied()
    }

    /// Run one tick over this junction.
    ///
    /// Releases vehicles from the green queue and lets the light strategy pick
    /// the next green. Returns the released vehicles, already removed from
    /// their queue, in the order they must be moved to their next road.
    pub fn advance(&mut self, tick: u32) -> Vec<VehicleId> {
        let mut released = Vec::new();
        if let Some(green) = self.green {
            let queue = &mut self.queues[green];
            released = self.dequeue_strategy.dequeue(queue);
            queue.retain(|id| !released.contains(id));
        }

        let next = self.light_strategy.choose_next_green(
            &self.incoming,
            &self.queues,
            self.green,
            self.last_switch,
            tick,
        );
        if next != self.green {
            debug!(
                "Junction {} switches green from {:?} to {:?} at tick {}",
                self.name, self.green, next, tick
            );
            self.green = next;
            self.last_switch = tick;
        }

        released
    }

    pub fn id(&self) -> JunctionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn x(&self) -> u32 {
        self.x
    }

    pub fn y(&self) -> u32 {
        self.y
    }

    pub fn incoming_roads(&self) -> &[RoadId] {
        &self.incoming
    }

    pub fn outgoing_roads(&self) -> &HashMap<JunctionId, RoadId> {
        &self.outgoing
    }

    /// Queues, index-aligned with [`Junction::incoming_roads`]
    pub fn queues(&self) -> &[Vec<VehicleId>] {
        &self.queues
    }

    /// Index into the incoming roads of the current green light
    pub fn green(&self) -> Option<usize> {
        self.green
    }

    /// Road currently holding the green light
    pub fn green_road(&self) -> Option<RoadId> {
        self.green.map(|index| self.incoming[index])
    }

    pub fn last_switch(&self) -> u32 {
        self.last_switch
    }
}

impl RoadLookup for Vec<Junction> {
    fn road_between(&self, from: JunctionId, to: JunctionId) -> Option<RoadId> {
        self.get(from.index()).and_then(|junction| junction.road_to(to))
    }

    fn junction_name(&self, id: JunctionId) -> &str {
        self.get(id.index()).map_or("?", |junction| junction.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::dequeuing::{MoveAll, MoveFirst};
    use crate::simulation::light_switching::RoundRobin;
    use crate::simulation::road::RoadKind;
    use crate::simulation::types::{SimId, Weather};

    fn junction(index: usize, dequeue: Box<dyn DequeuingStrategy>) -> Junction {
        Junction::new(
            JunctionId(SimId(index)),
            format!("j{index}"),
            Box::new(RoundRobin::new(2)),
            dequeue,
            0,
            0,
        )
        .unwrap()
    }

    fn road(index: usize, src: usize, dest: usize) -> Road {
        Road::new(
            RoadId(SimId(index)),
            format!("r{index}"),
            RoadKind::City,
            JunctionId(SimId(src)),
            JunctionId(SimId(dest)),
            100,
            50,
            10,
            Weather::Sunny,
        )
        .unwrap()
    }

    /// A vehicle waiting at the end of road 0 (j0 -> j1)
    fn waiting_vehicle(index: usize, junctions: &Vec<Junction>) -> Vehicle {
        let mut v = Vehicle::new(
            VehicleId(SimId(index)),
            format!("v{index}"),
            100,
            0,
            vec![JunctionId(SimId(0)), JunctionId(SimId(1))],
        )
        .unwrap();
        v.move_to_next_road(junctions).unwrap();
        v.set_speed(100);
        assert!(v.advance(100).reached_end);
        v
    }

    #[test]
    fn test_endpoint_mismatch_rejected() {
        let mut j = junction(0, Box::new(MoveFirst));
        let r = road(0, 1, 2);
        assert!(j.add_incoming_road(&r).is_err());
        assert!(j.add_outgoing_road(&r).is_err());
    }

    #[test]
    fn test_duplicate_outgoing_destination_rejected() {
        let mut j = junction(0, Box::new(MoveFirst));
        j.add_outgoing_road(&road(0, 0, 1)).unwrap();
        assert!(j.add_outgoing_road(&road(1, 0, 1)).is_err());
        assert_eq!(j.road_to(JunctionId(SimId(1))), Some(RoadId(SimId(0))));
        assert_eq!(j.road_to(JunctionId(SimId(2))), None);
    }

    #[test]
    fn test_enter_requires_incoming_road() {
        let mut j0 = junction(0, Box::new(MoveFirst));
        j0.add_outgoing_road(&road(0, 0, 1)).unwrap();
        let j1 = junction(1, Box::new(MoveFirst));
        let junctions = vec![j0, j1];
        let v = waiting_vehicle(0, &junctions);

        // Road 0 was never registered as incoming at j1
        let mut j1 = junction(1, Box::new(MoveFirst));
        assert!(j1.enter(&v).is_err());

        j1.add_incoming_road(&road(0, 0, 1)).unwrap();
        j1.enter(&v).unwrap();
        assert_eq!(j1.queues(), &[vec![VehicleId(SimId(0))]]);
    }

    fn loaded_junction(dequeue: Box<dyn DequeuingStrategy>) -> Junction {
        let mut j0 = junction(0, Box::new(MoveFirst));
        j0.add_outgoing_road(&road(0, 0, 1)).unwrap();
        let junctions = vec![j0, junction(1, Box::new(MoveFirst))];

        let mut j1 = junction(1, dequeue);
        j1.add_incoming_road(&road(0, 0, 1)).unwrap();
        for i in 0..3 {
            j1.enter(&waiting_vehicle(i, &junctions)).unwrap();
        }
        j1
    }

    #[test]
    fn test_no_release_without_green() {
        let mut j = loaded_junction(Box::new(MoveAll));
        assert!(j.advance(1).is_empty());
        assert_eq!(j.green(), Some(0));
        assert_eq!(j.last_switch(), 1);
        assert_eq!(j.queues()[0].len(), 3);
    }

    #[test]
    fn test_move_first_releases_one_per_tick() {
        let mut j = loaded_junction(Box::new(MoveFirst));
        j.advance(1);
        assert_eq!(j.advance(2), vec![VehicleId(SimId(0))]);
        assert_eq!(j.advance(3), vec![VehicleId(SimId(1))]);
        assert_eq!(j.queues()[0], vec![VehicleId(SimId(2))]);
        // Single road: round robin keeps the same index, so no switch recorded
        assert_eq!(j.last_switch(), 1);
    }

    #[test]
    fn test_move_all_empties_queue() {
        let mut j = loaded_junction(Box::new(MoveAll));
        j.advance(1);
        let released = j.advance(2);
        assert_eq!(released.len(), 3);
        assert!(j.queues()[0].is_empty());
    }

    #[test]
    fn test_empty_junction_has_no_green() {
        let mut j = junction(0, Box::new(MoveFirst));
        assert!(j.advance(1).is_empty());
        assert_eq!(j.green(), None);
        assert_eq!(j.green_road(), None);
    }
}
