//! # Dirty list
//!
//! What one commit/undo/redo touched, in the shape the live layer needs:
//!
//! - a deduplicated set of coarse keys, one per 4×4 column block, each with a
//!   bitmask of the floors touched inside it,
//! - the changes a locally originated action applied, borrowed from the
//!   action that owns them.
//!
//! Borrowing ties the list's lifetime to the history entry it describes, so
//! it has to be drained before that entry can be evicted.

use crate::Change;
use mapedit_map::Position;
use serde::Serialize;
use std::collections::BTreeMap;

/// One coarse key and the floors touched in its block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DirtyEntry {
    pub key: u32,
    pub floors: u32,
}

impl DirtyEntry {
    /// Top-left corner (x, y) of the 4×4 block this key covers.
    pub fn origin(&self) -> (i32, i32) {
        let x = (self.key >> 18) << 2;
        let y = ((self.key >> 4) & 0x3FFF) << 2;
        (x as i32, y as i32)
    }

    pub fn has_floor(&self, z: i32) -> bool {
        (0..32).contains(&z) && self.floors & (1 << z) != 0
    }

    /// Whether `position` falls inside this block on a touched floor.
    pub fn covers(&self, position: Position) -> bool {
        let (x, y) = self.origin();
        (x..x + 4).contains(&position.x)
            && (y..y + 4).contains(&position.y)
            && self.has_floor(position.z)
    }
}

/// Packs the 4×4 block containing (x, y) into one key.
pub fn coarse_key(x: i32, y: i32) -> u32 {
    (((x as u32) >> 2) << 18) | (((y as u32) >> 2) << 4)
}

#[derive(Debug, Default)]
pub struct DirtyList<'a> {
    /// Peer that originated the edit (0 = this editor).
    pub owner: u32,
    positions: BTreeMap<u32, u32>,
    changes: Vec<&'a Change>,
}

impl<'a> DirtyList<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_owner(owner: u32) -> Self {
        Self {
            owner,
            ..Self::default()
        }
    }

    /// Marks the block holding `(x, y)` dirty on floor `z`. Floors that do
    /// not fit the 32-bit mask are ignored.
    pub fn add_position(&mut self, x: i32, y: i32, z: i32) {
        let Some(bit) = u32::try_from(z).ok().and_then(|z| 1u32.checked_shl(z)) else {
            return;
        };
        *self.positions.entry(coarse_key(x, y)).or_insert(0) |= bit;
    }

    pub fn add_change(&mut self, change: &'a Change) {
        self.changes.push(change);
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.changes.is_empty()
    }

    /// Touched blocks in key order.
    pub fn positions(&self) -> impl Iterator<Item = DirtyEntry> + '_ {
        self.positions
            .iter()
            .map(|(&key, &floors)| DirtyEntry { key, floors })
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    pub fn changes(&self) -> &[&'a Change] {
        &self.changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapedit_map::Tile;

    #[test]
    fn test_same_block_merges_floors() {
        let mut dirty = DirtyList::new();
        dirty.add_position(100, 100, 7);
        dirty.add_position(101, 103, 7);
        dirty.add_position(102, 100, 6);

        assert_eq!(dirty.position_count(), 1);
        let entry = dirty.positions().next().unwrap();
        assert_eq!(entry.floors, (1 << 7) | (1 << 6));
        assert_eq!(entry.origin(), (100, 100));
    }

    #[test]
    fn test_out_of_range_floor_is_ignored() {
        let mut dirty = DirtyList::new();
        dirty.add_position(100, 100, 40);
        dirty.add_position(100, 100, -1);
        dirty.add_position(100, 100, 32);
        assert!(dirty.is_empty());

        dirty.add_position(100, 100, 31);
        assert_eq!(dirty.positions().next().unwrap().floors, 1 << 31);
    }

    #[test]
    fn test_neighbouring_blocks_stay_apart() {
        let mut dirty = DirtyList::new();
        dirty.add_position(3, 0, 7);
        dirty.add_position(4, 0, 7);
        dirty.add_position(0, 4, 7);
        assert_eq!(dirty.position_count(), 3);
    }

    #[test]
    fn test_entry_covers() {
        let mut dirty = DirtyList::new();
        dirty.add_position(100, 100, 7);
        let entry = dirty.positions().next().unwrap();

        assert!(entry.covers(Position::new(103, 101, 7)));
        assert!(!entry.covers(Position::new(104, 101, 7)));
        assert!(!entry.covers(Position::new(100, 100, 8)));
    }

    #[test]
    fn test_changes_are_borrowed() {
        let change = Change::tile(Tile::new(Position::new(1, 1, 7)));
        let mut dirty = DirtyList::with_owner(4);
        assert!(dirty.is_empty());

        dirty.add_change(&change);
        assert!(!dirty.is_empty());
        assert_eq!(dirty.owner, 4);
        assert!(std::ptr::eq(dirty.changes()[0], &change));
    }
}
