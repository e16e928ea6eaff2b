//! House registry.

use crate::Position;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct House {
    pub id: u32,
    pub name: String,
    exit: Position,
    tiles: BTreeSet<Position>,
}

impl House {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            exit: Position::default(),
            tiles: BTreeSet::new(),
        }
    }

    pub fn exit(&self) -> Position {
        self.exit
    }

    pub fn set_exit(&mut self, exit: Position) {
        self.exit = exit;
    }

    pub fn add_tile(&mut self, position: Position) {
        self.tiles.insert(position);
    }

    pub fn remove_tile(&mut self, position: Position) {
        self.tiles.remove(&position);
    }

    pub fn contains(&self, position: Position) -> bool {
        self.tiles.contains(&position)
    }

    pub fn tiles(&self) -> impl Iterator<Item = Position> + '_ {
        self.tiles.iter().copied()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }
}

/// Id-keyed house lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Houses {
    houses: BTreeMap<u32, House>,
}

impl Houses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: u32) -> Option<&House> {
        self.houses.get(&id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut House> {
        self.houses.get_mut(&id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.houses.contains_key(&id)
    }

    pub(crate) fn insert(&mut self, house: House) {
        self.houses.insert(house.id, house);
    }

    pub fn remove(&mut self, id: u32) -> Option<House> {
        self.houses.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.houses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.houses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &House> {
        self.houses.values()
    }
}
