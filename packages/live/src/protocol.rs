//! Messages exchanged between host and clients.
//!
//! Everything here is owned data: a [`DirtyList`] only borrows from the
//! history, so whatever leaves the editor is copied out of it first.

use crate::LiveError;
use mapedit_editor::{Change, DirtyEntry, DirtyList};
use mapedit_map::{Map, Position, Tile};
use serde::{Deserialize, Serialize};

/// Regions touched by one commit/undo/redo on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeBroadcast {
    /// Peer the edit came from (0 = the host itself).
    pub owner: u32,
    pub entries: Vec<DirtyEntry>,
}

impl NodeBroadcast {
    pub fn from_dirty(dirty: &DirtyList<'_>) -> Self {
        Self {
            owner: dirty.owner,
            entries: dirty.positions().collect(),
        }
    }

    /// Whether any touched block covers `position`.
    pub fn covers(&self, position: Position) -> bool {
        self.entries.iter().any(|entry| entry.covers(position))
    }
}

/// The live state one applied change left behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChangeRecord {
    Tile { tile: Tile },
    #[serde(rename_all = "camelCase")]
    HouseExit { house_id: u32, position: Position },
    Waypoint { name: String, position: Position },
}

impl ChangeRecord {
    /// Reads what `change` touched from `map`. An applied change holds the
    /// value it replaced, so the new value has to come from the map.
    /// Cleared changes and vanished houses or waypoints yield nothing.
    pub fn capture(change: &Change, map: &Map) -> Option<Self> {
        match change {
            Change::None => None,
            Change::Tile(tile) => {
                let position = tile.position();
                let live = map.tile(position).cloned().unwrap_or_else(|| Tile::new(position));
                Some(ChangeRecord::Tile { tile: live })
            }
            Change::HouseExit(data) => {
                let house = map.houses().get(data.house_id)?;
                Some(ChangeRecord::HouseExit {
                    house_id: house.id,
                    position: house.exit(),
                })
            }
            Change::Waypoint(data) => {
                let waypoint = map.waypoints().get(&data.name)?;
                Some(ChangeRecord::Waypoint {
                    name: waypoint.name.clone(),
                    position: waypoint.position,
                })
            }
        }
    }

    pub fn into_change(self) -> Change {
        match self {
            ChangeRecord::Tile { tile } => Change::tile(tile),
            ChangeRecord::HouseExit { house_id, position } => {
                Change::HouseExit(mapedit_editor::HouseExitMove { house_id, position })
            }
            ChangeRecord::Waypoint { name, position } => {
                Change::Waypoint(mapedit_editor::WaypointMove { name, position })
            }
        }
    }

    pub fn to_json(records: &[ChangeRecord]) -> Result<String, LiveError> {
        Ok(serde_json::to_string(records)?)
    }

    pub fn from_json(json: &str) -> Result<Vec<ChangeRecord>, LiveError> {
        Ok(serde_json::from_str(json)?)
    }
}
