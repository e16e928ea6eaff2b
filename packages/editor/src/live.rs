//! # Live collaboration seam
//!
//! The history core does not talk to the network. It asks a [`LiveSync`]
//! implementation two things while applying changes: which role the editor
//! plays, and whether a cell is inside the locally subscribed area. After
//! every commit/undo/redo that a role wants reported, the populated
//! [`DirtyList`] is handed to [`LiveSync::publish`], together with the map
//! in its new state, before the call returns.

use crate::DirtyList;
use mapedit_map::{Map, Position};

/// The part this editor plays in a live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LiveRole {
    /// No live session. Nothing is reported.
    #[default]
    Local,
    /// Owns the authoritative map and broadcasts touched regions.
    Host,
    /// Mirrors part of a host's map. A read-only client refuses local edits.
    Client { read_only: bool },
}

impl LiveRole {
    pub fn is_host(&self) -> bool {
        matches!(self, LiveRole::Host)
    }

    pub fn is_client(&self) -> bool {
        matches!(self, LiveRole::Client { .. })
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, LiveRole::Client { read_only: true })
    }

    /// Whether commits under this role must produce a [`DirtyList`].
    pub fn reports_changes(&self) -> bool {
        !matches!(self, LiveRole::Local)
    }
}

/// Which cells a client currently mirrors.
pub trait Visibility {
    fn is_visible(&self, position: Position) -> bool;
}

/// Consumer of the change stream produced by the history core.
pub trait LiveSync {
    fn role(&self) -> LiveRole;

    /// Only consulted in the client role. Edits outside the visible area are
    /// discarded instead of applied.
    fn is_visible(&self, _position: Position) -> bool {
        true
    }

    /// Drains one commit/undo/redo worth of changes. `map` is already in
    /// its new state. The list borrows the changes it reports, so it cannot
    /// be kept past this call.
    fn publish(&mut self, map: &Map, dirty: &DirtyList<'_>);
}

/// The stand-alone editor: no peers, nothing to report.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalOnly;

impl LiveSync for LocalOnly {
    fn role(&self) -> LiveRole {
        LiveRole::Local
    }

    fn publish(&mut self, _map: &Map, _dirty: &DirtyList<'_>) {}
}
