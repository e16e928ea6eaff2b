//! Error types for the map data layer

use crate::Position;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapError {
    #[error("Position out of bounds: {0}")]
    InvalidPosition(Position),

    #[error("House already exists: {0}")]
    DuplicateHouse(u32),

    #[error("Waypoint already exists: {0}")]
    DuplicateWaypoint(String),

    #[error("Waypoint not found: {0}")]
    WaypointNotFound(String),
}
