//! # Map Editor Core
//!
//! Undo/redo history and change propagation for the tile map editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ Editor: map + history + selection + live    │
//! └─────────────────────────────────────────────┘
//!                     ↓ add_batch / undo / redo
//! ┌─────────────────────────────────────────────┐
//! │ ActionQueue: bounded, cursor-based history  │
//! │  - BatchAction: one user-visible undo step  │
//! │  - Action: changes applied together         │
//! │  - Change: one swap with the live map       │
//! └─────────────────────────────────────────────┘
//!                     ↓ DirtyList
//! ┌─────────────────────────────────────────────┐
//! │ LiveSync: host/client collaborator          │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Swap, don't diff**: a change holds the value that is *not* live;
//!    applying it twice is a no-op
//! 2. **Commit once**: a batch touches the map exactly once, whatever the
//!    history decides to do with it afterwards
//! 3. **Sessions for selection**: the selection only changes between
//!    `start` and `finish`, and plain sessions are undoable
//! 4. **Explicit context**: no globals, every operation gets the map,
//!    selection and live collaborator it works on
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mapedit_editor::{ActionKind, Change, Editor};
//! use mapedit_map::{Position, Tile};
//!
//! let mut editor = Editor::default();
//!
//! let mut action = editor.create_action(ActionKind::Draw);
//! action.add_change(Change::tile(Tile::with_ground(Position::new(100, 100, 7), 405)));
//! editor.add_action(action, 0);
//!
//! editor.undo();
//! editor.redo();
//! ```

mod action;
mod action_queue;
mod batch;
mod change;
mod clock;
mod config;
mod dirty_list;
mod editor;
mod errors;
mod live;
mod selection;
mod selection_thread;

pub use action::{Action, ActionKind, ApplyContext};
pub use action_queue::ActionQueue;
pub use batch::BatchAction;
pub use change::{Change, ChangeKind, HouseExitMove, WaypointMove};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{HistoryConfig, DEFAULT_CONFIG_NAME};
pub use dirty_list::{coarse_key, DirtyEntry, DirtyList};
pub use editor::Editor;
pub use errors::ConfigError;
pub use live::{LiveRole, LiveSync, LocalOnly, Visibility};
pub use selection::{Selection, SessionEnd, SessionMode};
pub use selection_thread::SelectionThread;
