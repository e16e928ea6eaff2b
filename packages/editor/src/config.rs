//! History and selection settings.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "mapedit.config.json";

/// Editor history configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryConfig {
    /// Maximum number of undo steps (0 = unlimited)
    pub undo_size: usize,

    /// Maximum approximate bytes held by the history (0 = unlimited)
    pub undo_memory_bytes: usize,

    /// Merge consecutive batches of the same kind within the stacking delay
    pub group_actions: bool,

    /// Stacking delay, in seconds, used when a selection session is pushed
    pub selection_stacking_delay: i64,

    /// Shift ranged selections one cell diagonally per floor above ground
    pub compensated_select: bool,

    /// Selecting a border item also selects the ground beneath it
    pub border_is_ground: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            undo_size: 40,
            undo_memory_bytes: 64 * 1024 * 1024,
            group_actions: true,
            selection_stacking_delay: 2,
            compensated_select: true,
            border_is_ground: false,
        }
    }
}

impl HistoryConfig {
    /// Load config from a directory, falling back to defaults when the file
    /// is absent.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: HistoryConfig = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(HistoryConfig::default())
        }
    }
}
