//! Traffic light policies: which incoming road of a junction gets the green
//!
//! A strategy is a pure decision function. Junctions call it once per tick
//! after dequeuing and record the tick whenever the answer changes.

use std::fmt;

use super::types::{RoadId, VehicleId};

/// Default number of ticks a light stays green before it may switch
pub const DEFAULT_TIMESLOT: u32 = 1;

/// Chooses the next green-light index for a junction.
///
/// Must be total: with no incoming roads the answer is `None`, and ties are
/// broken deterministically.
pub trait LightSwitchingStrategy: fmt::Debug {
    fn choose_next_green(
        &self,
        roads: &[RoadId],
        queues: &[Vec<VehicleId>],
        current_green: Option<usize>,
        last_switch: u32,
        tick: u32,
    ) -> Option<usize>;
}

/// Rotate through incoming roads, holding each green for `timeslot` ticks
#[derive(Debug, Clone, Copy)]
pub struct RoundRobin {
    timeslot: u32,
}

impl RoundRobin {
    pub fn new(timeslot: u32) -> Self {
        Self { timeslot }
    }

    pub fn timeslot(&self) -> u32 {
        self.timeslot
    }
}

impl Default for RoundRobin {
    fn default() -> Self {
        Self::new(DEFAULT_TIMESLOT)
    }
}

impl LightSwitchingStrategy for RoundRobin {
    fn choose_next_green(
        &self,
        roads: &[RoadId],
        _queues: &[Vec<VehicleId>],
        current_green: Option<usize>,
        last_switch: u32,
        tick: u32,
    ) -> Option<usize> {
        if roads.is_empty() {
            return None;
        }
        let Some(current) = current_green else {
            return Some(0);
        };
        if tick.saturating_sub(last_switch) < self.timeslot {
            return Some(current);
        }
        Some((current + 1) % roads.len())
    }
}

/// Give the green to the longest queue once the current slot has elapsed
#[derive(Debug, Clone, Copy)]
pub struct MostCrowded {
    timeslot: u32,
}

impl MostCrowded {
    pub fn new(timeslot: u32) -> Self {
        Self { timeslot }
    }

    pub fn timeslot(&self) -> u32 {
        self.timeslot
    }

    /// Index of the longest queue scanning circularly from `start`; the
    /// first maximum in scan order wins.
    fn longest_from(queues: &[Vec<VehicleId>], start: usize) -> usize {
        let n = queues.len();
        let mut best = start % n;
        for offset in 1..n {
            let index = (start + offset) % n;
            if queues[index].len() > queues[best].len() {
                best = index;
            }
        }
        best
    }
}

impl Default for MostCrowded {
    fn default() -> Self {
        Self::new(DEFAULT_TIMESLOT)
    }
}

impl LightSwitchingStrategy for MostCrowded {
    fn choose_next_green(
        &self,
        roads: &[RoadId],
        queues: &[Vec<VehicleId>],
        current_green: Option<usize>,
        last_switch: u32,
        tick: u32,
    ) -> Option<usize> {
        if roads.is_empty() || queues.is_empty() {
            return None;
        }
        let Some(current) = current_green else {
            return Some(Self::longest_from(queues, 0));
        };
        if tick.saturating_sub(last_switch) < self.timeslot {
            return Some(current);
        }
        Some(Self::longest_from(queues, current + 1))
    }
}
