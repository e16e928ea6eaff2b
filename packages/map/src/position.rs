//! Map coordinates.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Largest valid x/y coordinate.
pub const MAP_MAX_WIDTH: i32 = 65000;
pub const MAP_MAX_HEIGHT: i32 = 65000;

/// Highest floor index (floors run from 0, the sky, down to 15).
pub const MAP_MAX_LAYER: i32 = 15;

/// The surface floor. Floors above it are `z < GROUND_LAYER`.
pub const GROUND_LAYER: i32 = 7;

/// A cell coordinate on the map.
///
/// The zero position doubles as "no position" for exits and waypoints that
/// have not been placed yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Whether the coordinate addresses a cell inside the map bounds.
    pub fn is_valid(&self) -> bool {
        (0..=MAP_MAX_WIDTH).contains(&self.x)
            && (0..=MAP_MAX_HEIGHT).contains(&self.y)
            && (0..=MAP_MAX_LAYER).contains(&self.z)
    }

    /// True for the zero "unset" position.
    pub fn is_unset(&self) -> bool {
        *self == Position::default()
    }
}

// Floors first, then rows, then columns. Selection relies on this order for
// binary search, so it must stay total and consistent with `Eq`.
impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.z
            .cmp(&other.z)
            .then(self.y.cmp(&other.y))
            .then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
