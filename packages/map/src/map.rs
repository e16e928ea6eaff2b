//! # Map
//!
//! Owns every tile plus the registries that index into tiles by position:
//! houses, waypoints, spawns and per-location waypoint reference counts.
//!
//! Cells are only ever replaced through [`Map::exchange_tile`], which swaps a
//! caller-owned tile with the live one so that each cell value has exactly
//! one owner at every point in time.

use crate::{House, Houses, MapError, Position, Spawn, Tile, Waypoint, Waypoints};
use std::collections::{BTreeMap, HashMap};
use tracing::trace;

#[derive(Debug, Clone, Default)]
pub struct Map {
    tiles: HashMap<Position, Tile>,
    houses: Houses,
    waypoints: Waypoints,
    /// Spawn centre -> radius.
    spawns: BTreeMap<Position, i32>,
    /// Number of waypoints standing on each location. Lives outside the tile
    /// so it survives tile exchanges.
    waypoint_counts: HashMap<Position, u32>,
    /// Bumped on every modification.
    revision: u64,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self, position: Position) -> bool {
        position.is_valid()
    }

    // ------------------------------------------------------------------
    // Tiles
    // ------------------------------------------------------------------

    pub fn tile(&self, position: Position) -> Option<&Tile> {
        self.tiles.get(&position)
    }

    pub fn tile_mut(&mut self, position: Position) -> Option<&mut Tile> {
        self.tiles.get_mut(&position)
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    /// Places a tile directly, registering its house membership and spawn.
    /// Used when populating a map; edits go through [`Map::exchange_tile`].
    pub fn insert_tile(&mut self, tile: Tile) -> Result<(), MapError> {
        let position = tile.position();
        if !position.is_valid() {
            return Err(MapError::InvalidPosition(position));
        }
        if let Some(house) = self.houses.get_mut(tile.house_id) {
            house.add_tile(position);
        }
        if let Some(spawn) = &tile.spawn {
            self.add_spawn(position, spawn);
        }
        if tile.is_empty() {
            self.tiles.remove(&position);
        } else {
            self.tiles.insert(position, tile);
        }
        Ok(())
    }

    /// Swaps `slot` with the live tile at `slot.position()`.
    ///
    /// Afterwards `slot` holds what was live before, or an empty tile if the
    /// cell had no content. Empty tiles are never stored.
    pub fn exchange_tile(&mut self, slot: &mut Tile) {
        let position = slot.position();
        let live = self
            .tiles
            .entry(position)
            .or_insert_with(|| Tile::new(position));
        std::mem::swap(live, slot);
        if live.is_empty() {
            self.tiles.remove(&position);
        }
        trace!(%position, "exchanged tile");
    }

    // ------------------------------------------------------------------
    // Houses
    // ------------------------------------------------------------------

    pub fn houses(&self) -> &Houses {
        &self.houses
    }

    pub fn houses_mut(&mut self) -> &mut Houses {
        &mut self.houses
    }

    pub fn add_house(&mut self, house: House) -> Result<(), MapError> {
        if self.houses.contains(house.id) {
            return Err(MapError::DuplicateHouse(house.id));
        }
        if !house.exit().is_unset() && !house.exit().is_valid() {
            return Err(MapError::InvalidPosition(house.exit()));
        }
        self.houses.insert(house);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Waypoints
    // ------------------------------------------------------------------

    pub fn waypoints(&self) -> &Waypoints {
        &self.waypoints
    }

    pub fn waypoints_mut(&mut self) -> &mut Waypoints {
        &mut self.waypoints
    }

    pub fn add_waypoint(&mut self, name: impl Into<String>, position: Position) -> Result<(), MapError> {
        let name = name.into();
        if !position.is_valid() {
            return Err(MapError::InvalidPosition(position));
        }
        if self.waypoints.contains(&name) {
            return Err(MapError::DuplicateWaypoint(name));
        }
        self.increase_waypoint_count(position);
        self.waypoints.insert(Waypoint { name, position });
        Ok(())
    }

    pub fn remove_waypoint(&mut self, name: &str) -> Result<Waypoint, MapError> {
        let waypoint = self
            .waypoints
            .remove(name)
            .ok_or_else(|| MapError::WaypointNotFound(name.to_string()))?;
        self.decrease_waypoint_count(waypoint.position);
        Ok(waypoint)
    }

    pub fn waypoint_count(&self, position: Position) -> u32 {
        self.waypoint_counts.get(&position).copied().unwrap_or(0)
    }

    pub fn increase_waypoint_count(&mut self, position: Position) {
        *self.waypoint_counts.entry(position).or_insert(0) += 1;
    }

    /// Saturates at zero.
    pub fn decrease_waypoint_count(&mut self, position: Position) {
        if let Some(count) = self.waypoint_counts.get_mut(&position) {
            *count -= 1;
            if *count == 0 {
                self.waypoint_counts.remove(&position);
            }
        }
    }

    // ------------------------------------------------------------------
    // Spawns
    // ------------------------------------------------------------------

    pub fn add_spawn(&mut self, position: Position, spawn: &Spawn) {
        self.spawns.insert(position, spawn.radius);
    }

    pub fn remove_spawn(&mut self, position: Position) {
        self.spawns.remove(&position);
    }

    /// Radius of the spawn registered at `position`.
    pub fn spawn_radius(&self, position: Position) -> Option<i32> {
        self.spawns.get(&position).copied()
    }

    pub fn spawn_count(&self) -> usize {
        self.spawns.len()
    }

    // ------------------------------------------------------------------
    // Modification tracking
    // ------------------------------------------------------------------

    pub fn mark_changed(&mut self) {
        self.revision += 1;
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

// The revision counter is bookkeeping, not map content.
impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        self.tiles == other.tiles
            && self.houses == other.houses
            && self.waypoints == other.waypoints
            && self.spawns == other.spawns
            && self.waypoint_counts == other.waypoint_counts
    }
}

impl Eq for Map {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Item;

    #[test]
    fn test_exchange_into_empty_cell() {
        let mut map = Map::new();
        let pos = Position::new(10, 10, 7);

        let mut slot = Tile::with_ground(pos, 4526);
        map.exchange_tile(&mut slot);

        assert!(slot.is_empty());
        assert_eq!(map.tile(pos).and_then(|t| t.ground.as_ref()).map(|g| g.id), Some(4526));

        // Swapping the empty tile back removes the entry entirely.
        map.exchange_tile(&mut slot);
        assert!(map.tile(pos).is_none());
        assert_eq!(slot.ground.as_ref().map(|g| g.id), Some(4526));
    }

    #[test]
    fn test_exchange_replaces_existing() {
        let mut map = Map::new();
        let pos = Position::new(3, 4, 7);
        map.insert_tile(Tile::with_ground(pos, 100)).unwrap();

        let mut slot = Tile::with_ground(pos, 100);
        slot.add_item(Item::new(1987));
        map.exchange_tile(&mut slot);

        assert_eq!(map.tile(pos).unwrap().items.len(), 1);
        assert!(slot.items.is_empty());
    }

    #[test]
    fn test_waypoint_counts() {
        let mut map = Map::new();
        let pos = Position::new(50, 50, 7);
        map.add_waypoint("Temple", pos).unwrap();
        assert_eq!(map.waypoint_count(pos), 1);

        assert!(matches!(
            map.add_waypoint("temple", pos),
            Err(MapError::DuplicateWaypoint(_))
        ));

        map.remove_waypoint("TEMPLE").unwrap();
        assert_eq!(map.waypoint_count(pos), 0);

        // Never underflows.
        map.decrease_waypoint_count(pos);
        assert_eq!(map.waypoint_count(pos), 0);
    }

    #[test]
    fn test_insert_registers_indices() {
        let mut map = Map::new();
        map.add_house(House::new(7, "Harbour Lane 1")).unwrap();

        let pos = Position::new(20, 20, 7);
        let mut tile = Tile::with_ground(pos, 100);
        tile.house_id = 7;
        tile.spawn = Some(Spawn::new(2));
        map.insert_tile(tile).unwrap();

        assert!(map.houses().get(7).unwrap().contains(pos));
        assert_eq!(map.spawn_radius(pos), Some(2));
    }

    #[test]
    fn test_rejects_invalid_positions() {
        let mut map = Map::new();
        let bad = Position::new(-5, 0, 7);
        assert_eq!(map.insert_tile(Tile::new(bad)), Err(MapError::InvalidPosition(bad)));
        assert!(map.add_waypoint("nowhere", bad).is_err());
    }
}
