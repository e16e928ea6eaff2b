//! Named waypoints.

use crate::Position;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waypoint {
    pub name: String,
    pub position: Position,
}

/// Name-keyed waypoint lookup. Names compare case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Waypoints {
    waypoints: BTreeMap<String, Waypoint>,
}

fn key(name: &str) -> String {
    name.to_lowercase()
}

impl Waypoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Waypoint> {
        self.waypoints.get(&key(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Waypoint> {
        self.waypoints.get_mut(&key(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.waypoints.contains_key(&key(name))
    }

    pub(crate) fn insert(&mut self, waypoint: Waypoint) {
        self.waypoints.insert(key(&waypoint.name), waypoint);
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<Waypoint> {
        self.waypoints.remove(&key(name))
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.values()
    }
}
