//! # Tiles
//!
//! A tile is the full content of one map cell: ground, the item stack on
//! top of it, an optional creature and spawn, the owning house and the map
//! flags. Every sub-object carries its own selection mark so that a deep
//! copy of a tile also captures what was selected on it.

use crate::Position;
use serde::{Deserialize, Serialize};

/// Protection zone, no-PvP and similar map flags.
pub mod flags {
    pub const PROTECTION_ZONE: u32 = 0x0001;
    pub const NO_PVP: u32 = 0x0004;
    pub const NO_LOGOUT: u32 = 0x0008;
    pub const PVP_ZONE: u32 = 0x0010;
    pub const REFRESH: u32 = 0x0020;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u16,
    pub count: u16,
    /// Border items are the auto-generated edges between ground types.
    pub border: bool,
    pub selected: bool,
}

impl Item {
    pub fn new(id: u16) -> Self {
        Self {
            id,
            count: 1,
            border: false,
            selected: false,
        }
    }

    pub fn border(id: u16) -> Self {
        Self {
            border: true,
            ..Self::new(id)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creature {
    pub name: String,
    pub spawn_time: u32,
    pub selected: bool,
}

impl Creature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spawn_time: 60,
            selected: false,
        }
    }
}

/// A spawn area centred on the tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spawn {
    pub radius: i32,
    pub selected: bool,
}

impl Spawn {
    pub fn new(radius: i32) -> Self {
        Self {
            radius,
            selected: false,
        }
    }

    /// Identity comparison ignoring the selection mark.
    pub fn same_area(&self, other: &Spawn) -> bool {
        self.radius == other.radius
    }
}

/// Addresses one selectable sub-object of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TilePart {
    Ground,
    /// Index into the item stack, bottom first.
    Item(usize),
    Creature,
    Spawn,
}

/// The content of one map cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    position: Position,
    pub ground: Option<Item>,
    pub items: Vec<Item>,
    pub creature: Option<Creature>,
    pub spawn: Option<Spawn>,
    pub house_id: u32,
    pub map_flags: u32,
}

impl Tile {
    /// An empty tile at `position`.
    pub fn new(position: Position) -> Self {
        Self {
            position,
            ground: None,
            items: Vec::new(),
            creature: None,
            spawn: None,
            house_id: 0,
            map_flags: 0,
        }
    }

    pub fn with_ground(position: Position, ground_id: u16) -> Self {
        let mut tile = Self::new(position);
        tile.ground = Some(Item::new(ground_id));
        tile
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// A tile with no content at all. The map stores no entry for these.
    pub fn is_empty(&self) -> bool {
        self.ground.is_none()
            && self.items.is_empty()
            && self.creature.is_none()
            && self.spawn.is_none()
            && self.house_id == 0
            && self.map_flags == 0
    }

    pub fn add_item(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn is_house_tile(&self) -> bool {
        self.house_id != 0
    }

    // ------------------------------------------------------------------
    // Selection marks
    // ------------------------------------------------------------------

    /// True when any sub-object is selected.
    pub fn is_selected(&self) -> bool {
        self.ground.as_ref().is_some_and(|g| g.selected)
            || self.items.iter().any(|i| i.selected)
            || self.creature.as_ref().is_some_and(|c| c.selected)
            || self.spawn.as_ref().is_some_and(|s| s.selected)
    }

    /// Whether the addressed sub-object exists and is selected.
    pub fn is_part_selected(&self, part: TilePart) -> bool {
        match part {
            TilePart::Ground => self.ground.as_ref().is_some_and(|g| g.selected),
            TilePart::Item(index) => self.items.get(index).is_some_and(|i| i.selected),
            TilePart::Creature => self.creature.as_ref().is_some_and(|c| c.selected),
            TilePart::Spawn => self.spawn.as_ref().is_some_and(|s| s.selected),
        }
    }

    /// Sets the selection mark on one sub-object. Returns false when the
    /// sub-object does not exist.
    pub fn set_part_selected(&mut self, part: TilePart, selected: bool) -> bool {
        let mark = match part {
            TilePart::Ground => self.ground.as_mut().map(|g| &mut g.selected),
            TilePart::Item(index) => self.items.get_mut(index).map(|i| &mut i.selected),
            TilePart::Creature => self.creature.as_mut().map(|c| &mut c.selected),
            TilePart::Spawn => self.spawn.as_mut().map(|s| &mut s.selected),
        };
        match mark {
            Some(mark) => {
                *mark = selected;
                true
            }
            None => false,
        }
    }

    pub fn select(&mut self) {
        self.set_all_selected(true);
    }

    pub fn deselect(&mut self) {
        self.set_all_selected(false);
    }

    fn set_all_selected(&mut self, selected: bool) {
        if let Some(ground) = &mut self.ground {
            ground.selected = selected;
        }
        for item in &mut self.items {
            item.selected = selected;
        }
        if let Some(creature) = &mut self.creature {
            creature.selected = selected;
        }
        if let Some(spawn) = &mut self.spawn {
            spawn.selected = selected;
        }
    }

    pub fn select_ground(&mut self) {
        self.set_part_selected(TilePart::Ground, true);
    }

    pub fn deselect_ground(&mut self) {
        self.set_part_selected(TilePart::Ground, false);
    }

    /// Approximate number of bytes owned by this tile.
    pub fn memsize(&self) -> usize {
        let mut mem = std::mem::size_of::<Tile>();
        mem += self.items.capacity() * std::mem::size_of::<Item>();
        if self.ground.is_some() {
            mem += std::mem::size_of::<Item>();
        }
        if let Some(creature) = &self.creature {
            mem += std::mem::size_of::<Creature>() + creature.name.capacity();
        }
        if self.spawn.is_some() {
            mem += std::mem::size_of::<Spawn>();
        }
        mem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tile() {
        let mut tile = Tile::new(Position::new(1, 1, 7));
        assert!(tile.is_empty());
        tile.house_id = 3;
        assert!(!tile.is_empty());
    }

    #[test]
    fn test_part_selection() {
        let mut tile = Tile::with_ground(Position::new(1, 1, 7), 100);
        tile.add_item(Item::new(2000));
        assert!(!tile.is_selected());

        assert!(tile.set_part_selected(TilePart::Item(0), true));
        assert!(tile.is_selected());
        assert!(tile.is_part_selected(TilePart::Item(0)));
        assert!(!tile.is_part_selected(TilePart::Ground));

        // Missing sub-objects cannot be marked.
        assert!(!tile.set_part_selected(TilePart::Creature, true));
        assert!(!tile.set_part_selected(TilePart::Item(4), true));

        tile.deselect();
        assert!(!tile.is_selected());
    }

    #[test]
    fn test_select_marks_every_part() {
        let mut tile = Tile::with_ground(Position::new(1, 1, 7), 100);
        tile.creature = Some(Creature::new("rat"));
        tile.spawn = Some(Spawn::new(3));
        tile.select();
        assert!(tile.is_part_selected(TilePart::Ground));
        assert!(tile.is_part_selected(TilePart::Creature));
        assert!(tile.is_part_selected(TilePart::Spawn));
    }

    #[test]
    fn test_memsize_grows_with_content() {
        let mut tile = Tile::new(Position::new(1, 1, 7));
        let empty = tile.memsize();
        tile.add_item(Item::new(1));
        tile.creature = Some(Creature::new("dragon lord"));
        assert!(tile.memsize() > empty);
    }

    #[test]
    fn test_serialized_tile_keeps_position_and_marks() {
        let mut tile = Tile::with_ground(Position::new(12, 34, 7), 100);
        tile.add_item(Item::border(4550));
        tile.select_ground();

        let json = serde_json::to_string(&tile).unwrap();
        let parsed: Tile = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.position(), Position::new(12, 34, 7));
        assert!(parsed.is_part_selected(TilePart::Ground));
        assert!(parsed.items[0].border);
    }
}
