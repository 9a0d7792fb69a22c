//! Traffic Flow Simulation Library
//!
//! A discrete-time urban traffic simulation: roads, junctions with traffic
//! light policies, and vehicles that pollute as they drive.

pub mod simulation;
