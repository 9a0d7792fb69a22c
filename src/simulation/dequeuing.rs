//! Dequeuing strategies: which queued vehicles leave a green junction queue

use std::fmt;

use super::types::VehicleId;

/// Decides which vehicles at the head of a green queue move on this tick.
///
/// Implementations must not assume they own the queue; the junction removes
/// the returned vehicles afterwards.
pub trait DequeuingStrategy: fmt::Debug {
    /// Vehicles to release, in the order they should move
    fn dequeue(&self, queue: &[VehicleId]) -> Vec<VehicleId>;
}

/// Release only the vehicle at the head of the queue
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveFirst;

impl DequeuingStrategy for MoveFirst {
    fn dequeue(&self, queue: &[VehicleId]) -> Vec<VehicleId> {
        queue.first().copied().into_iter().collect()
    }
}

/// Release the whole queue in arrival order
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveAll;

impl DequeuingStrategy for MoveAll {
    fn dequeue(&self, queue: &[VehicleId]) -> Vec<VehicleId> {
        queue.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::types::SimId;

    fn queue(n: usize) -> Vec<VehicleId> {
        (0..n).map(|i| VehicleId(SimId(i))).collect()
    }

    #[test]
    fn test_empty_queue_releases_nothing() {
        assert!(MoveFirst.dequeue(&[]).is_empty());
        assert!(MoveAll.dequeue(&[]).is_empty());
    }

    #[test]
    fn test_move_first_releases_head() {
        let q = queue(3);
        assert_eq!(MoveFirst.dequeue(&q), vec![VehicleId(SimId(0))]);
        assert_eq!(q.len(), 3);
    }

    #[test]
    fn test_move_all_keeps_fifo_order() {
        let q = queue(4);
        assert_eq!(MoveAll.dequeue(&q), q);
    }
}
