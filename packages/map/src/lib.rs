//! # Map data layer
//!
//! In-memory tile map used by the editor core. Everything here is plain
//! data: the editor's history machinery decides *when* cells change, this
//! crate only knows *how* to store them and keep the position-keyed indices
//! (houses, waypoints, spawns) consistent.

mod errors;
mod house;
mod map;
mod position;
mod tile;
mod waypoint;

pub use errors::MapError;
pub use house::{House, Houses};
pub use map::Map;
pub use position::{Position, GROUND_LAYER, MAP_MAX_HEIGHT, MAP_MAX_LAYER, MAP_MAX_WIDTH};
pub use tile::{flags, Creature, Item, Spawn, Tile, TilePart};
pub use waypoint::{Waypoint, Waypoints};
