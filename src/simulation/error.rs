//! Error types for the simulation core.

use thiserror::Error;

/// Errors raised by simulation entities and the world that owns them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    /// Constructor argument rejected; the entity was not created
    #[error("Invalid argument: {0}")]
    Validation(String),

    /// Operation called in a state that does not allow it
    #[error("Invalid state: {0}")]
    State(String),

    /// No junction with this identifier exists
    #[error("Unknown junction: {0}")]
    UnknownJunction(String),

    /// No road with this identifier exists
    #[error("Unknown road: {0}")]
    UnknownRoad(String),

    /// No vehicle with this identifier exists
    #[error("Unknown vehicle: {0}")]
    UnknownVehicle(String),

    /// An entity of the same kind already uses this identifier
    #[error("Duplicate identifier: {0}")]
    DuplicateId(String),

    /// An itinerary step has no connecting road
    #[error("No road from junction {from} to junction {to}")]
    NoRoad { from: String, to: String },
}

impl SimError {
    /// Creates a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a state error.
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
