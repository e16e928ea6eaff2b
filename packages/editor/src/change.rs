//! # Changes
//!
//! The smallest reversible unit of state. A change is applied by *swapping*
//! its payload with the live value, so the same change undoes itself when
//! applied a second time:
//!
//! - a tile snapshot trades places with the live cell,
//! - a house-exit move trades positions with the house's exit,
//! - a waypoint move trades positions with the waypoint.

use mapedit_map::{House, Position, Tile, Waypoint};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HouseExitMove {
    pub house_id: u32,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaypointMove {
    pub name: String,
    pub position: Position,
}

/// Discriminant of a [`Change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChangeKind {
    None,
    Tile,
    HouseExit,
    Waypoint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// A cleared change. Applying it does nothing.
    None,
    Tile(Box<Tile>),
    HouseExit(HouseExitMove),
    Waypoint(WaypointMove),
}

impl Change {
    /// A snapshot that replaces the cell at `tile.position()` when applied.
    pub fn tile(tile: Tile) -> Self {
        Change::Tile(Box::new(tile))
    }

    /// Moves `house`'s exit to `to` when applied.
    pub fn house_exit(house: &House, to: Position) -> Self {
        Change::HouseExit(HouseExitMove {
            house_id: house.id,
            position: to,
        })
    }

    /// Moves `waypoint` to `to` when applied.
    pub fn waypoint(waypoint: &Waypoint, to: Position) -> Self {
        Change::Waypoint(WaypointMove {
            name: waypoint.name.clone(),
            position: to,
        })
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            Change::None => ChangeKind::None,
            Change::Tile(_) => ChangeKind::Tile,
            Change::HouseExit(_) => ChangeKind::HouseExit,
            Change::Waypoint(_) => ChangeKind::Waypoint,
        }
    }

    /// Drops the payload. The change becomes a no-op.
    pub fn clear(&mut self) {
        *self = Change::None;
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Change::None)
    }

    pub fn as_tile(&self) -> Option<&Tile> {
        match self {
            Change::Tile(tile) => Some(&**tile),
            _ => None,
        }
    }

    pub fn as_house_exit(&self) -> Option<&HouseExitMove> {
        match self {
            Change::HouseExit(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_waypoint(&self) -> Option<&WaypointMove> {
        match self {
            Change::Waypoint(data) => Some(data),
            _ => None,
        }
    }

    /// Estimated number of bytes owned by this change.
    pub fn memsize(&self) -> usize {
        let mut mem = std::mem::size_of::<Change>();
        match self {
            Change::None => {}
            Change::Tile(tile) => mem += tile.memsize(),
            Change::HouseExit(_) => mem += std::mem::size_of::<HouseExitMove>(),
            Change::Waypoint(data) => mem += data.name.capacity(),
        }
        mem
    }
}
