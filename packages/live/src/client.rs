//! # Live client
//!
//! Mirrors the part of the host's map it subscribed to. Local edits are
//! copied into [`ChangeRecord`]s and queued for the host; edits that fall
//! outside the subscribed area are dropped by the history core before they
//! reach the map.

use crate::ChangeRecord;
use mapedit_editor::{DirtyList, LiveRole, LiveSync, Visibility};
use mapedit_map::{Map, Position};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// An inclusive rectangle of columns on every floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Region {
    pub fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn contains(&self, position: Position) -> bool {
        (self.min_x..=self.max_x).contains(&position.x) && (self.min_y..=self.max_y).contains(&position.y)
    }
}

/// The regions a client has subscribed to.
#[derive(Debug, Clone, Default)]
pub struct ViewRegions {
    regions: Vec<Region>,
}

impl ViewRegions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, region: Region) {
        if !self.regions.contains(&region) {
            self.regions.push(region);
        }
    }

    pub fn unsubscribe(&mut self, region: Region) {
        self.regions.retain(|r| *r != region);
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl Visibility for ViewRegions {
    fn is_visible(&self, position: Position) -> bool {
        self.regions.iter().any(|r| r.contains(position))
    }
}

pub struct LiveClient<V: Visibility = ViewRegions> {
    read_only: bool,
    view: V,
    outgoing: mpsc::Sender<Vec<ChangeRecord>>,
}

impl LiveClient<ViewRegions> {
    /// A client with nothing subscribed yet, plus the receiving end of its
    /// outgoing change queue.
    pub fn new(read_only: bool, capacity: usize) -> (Self, mpsc::Receiver<Vec<ChangeRecord>>) {
        Self::with_view(read_only, ViewRegions::new(), capacity)
    }
}

impl<V: Visibility> LiveClient<V> {
    pub fn with_view(read_only: bool, view: V, capacity: usize) -> (Self, mpsc::Receiver<Vec<ChangeRecord>>) {
        let (outgoing, rx) = mpsc::channel(capacity);
        let client = Self {
            read_only,
            view,
            outgoing,
        };
        (client, rx)
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }
}

impl<V: Visibility> LiveSync for LiveClient<V> {
    fn role(&self) -> LiveRole {
        LiveRole::Client {
            read_only: self.read_only,
        }
    }

    fn is_visible(&self, position: Position) -> bool {
        self.view.is_visible(position)
    }

    fn publish(&mut self, map: &Map, dirty: &DirtyList<'_>) {
        let records: Vec<ChangeRecord> = dirty
            .changes()
            .iter()
            .filter_map(|change| ChangeRecord::capture(change, map))
            .collect();
        if records.is_empty() {
            return;
        }

        let count = records.len();
        match self.outgoing.try_send(records) {
            Ok(()) => debug!(count, "queued local changes for host"),
            Err(mpsc::error::TrySendError::Full(_)) => warn!(count, "outgoing queue full, dropping changes"),
            Err(mpsc::error::TrySendError::Closed(_)) => warn!(count, "host disconnected, dropping changes"),
        }
    }
}
