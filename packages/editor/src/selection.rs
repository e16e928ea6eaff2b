//! # Selection
//!
//! The set of selected cells, kept as positions in strict [`Position`] order
//! so membership is a binary search. The cells themselves stay owned by the
//! map.
//!
//! ## Sessions
//!
//! The set is only mutated inside a session:
//!
//! ```text
//! idle --start(mode)--> in session --add/remove/clear...--> finish(mode) --> idle
//! ```
//!
//! - **Plain**: every add/remove records a tile snapshot with the new
//!   selection marks into an action. `finish` hands back a batch for the
//!   history, which makes selecting undoable.
//! - **Subthread**: like plain, but `finish` hands back the bare action so a
//!   worker can build it without touching the history.
//! - **Internal**: no recording. Used by actions while they apply changes;
//!   adds and removes are deferred and reconciled at `finish`.
//!
//! Internal sessions nest inside plain ones because committing the plain
//! session's action opens one.

use crate::{Action, ActionKind, ApplyContext, BatchAction, Change, LiveSync, SelectionThread};
use mapedit_map::{Map, Position, Tile, TilePart};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Plain,
    Internal,
    Subthread,
}

/// What a finished session leaves behind.
#[derive(Debug)]
pub enum SessionEnd {
    /// Internal session: pending adds/removes were reconciled.
    Reconciled,
    /// Plain session: a select batch, ready for the history.
    Batch(BatchAction),
    /// Subthread session: the recorded action, to be merged by the owner.
    Detached(Action),
}

#[derive(Debug)]
struct Session {
    /// `None` for subthread sessions.
    batch: Option<BatchAction>,
    action: Action,
}

#[derive(Debug, Default)]
pub struct Selection {
    tiles: Vec<Position>,
    session: Option<Session>,
    deferred: bool,
    /// Deferred membership updates in arrival order; `true` adds.
    pending: Vec<(Position, bool)>,
    border_is_ground: bool,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selecting or deselecting a border item also (de)selects the ground.
    pub fn set_border_is_ground(&mut self, enabled: bool) {
        self.border_is_ground = enabled;
    }

    // ------------------------------------------------------------------
    // Session protocol
    // ------------------------------------------------------------------

    /// # Panics
    ///
    /// When a session of the same category is already open.
    pub fn start(&mut self, mode: SessionMode) {
        match mode {
            SessionMode::Internal => self.start_internal(),
            SessionMode::Plain | SessionMode::Subthread => {
                assert!(self.session.is_none(), "selection session already open");
                let batch = (mode == SessionMode::Plain).then(|| BatchAction::new(ActionKind::Select));
                self.session = Some(Session {
                    batch,
                    action: Action::new(ActionKind::Select),
                });
            }
        }
    }

    /// Applies what the open plain session recorded so far and keeps the
    /// session going with a fresh action. Lets later adds see the new marks.
    pub fn commit(&mut self, map: &mut Map, live: &mut dyn LiveSync) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        if let Some(batch) = session.batch.as_mut() {
            let action = std::mem::replace(&mut session.action, Action::new(ActionKind::Select));
            let mut ctx = ApplyContext::new(map, self, live);
            batch.add_and_commit_action(action, &mut ctx);
        }
        self.session = Some(session);
    }

    /// # Panics
    ///
    /// When `mode` does not match the open session.
    pub fn finish(&mut self, mode: SessionMode) -> SessionEnd {
        match mode {
            SessionMode::Internal => {
                self.finish_internal();
                SessionEnd::Reconciled
            }
            SessionMode::Plain => match self.session.take() {
                Some(Session {
                    batch: Some(mut batch),
                    action,
                }) => {
                    batch.add_action(action);
                    SessionEnd::Batch(batch)
                }
                Some(_) => panic!("finishing a subthread session as plain"),
                None => panic!("no selection session open"),
            },
            SessionMode::Subthread => match self.session.take() {
                Some(Session { batch: None, action }) => SessionEnd::Detached(action),
                Some(_) => panic!("finishing a plain session as subthread"),
                None => panic!("no selection session open"),
            },
        }
    }

    /// Waits for a ranged worker and adds its action to the open plain
    /// session.
    pub fn join(&mut self, thread: SelectionThread<'_>) {
        let action = thread.wait();
        let Some(batch) = self.session.as_mut().and_then(|s| s.batch.as_mut()) else {
            panic!("joining a selection thread requires a plain session");
        };
        debug!(changes = action.len(), "joined selection thread");
        batch.add_action(action);
    }

    pub fn is_busy(&self) -> bool {
        self.session.is_some() || self.deferred
    }

    pub(crate) fn start_internal(&mut self) {
        assert!(!self.deferred, "internal selection session already open");
        self.deferred = true;
        self.pending.clear();
    }

    pub(crate) fn finish_internal(&mut self) {
        self.flush();
        self.deferred = false;
    }

    // ------------------------------------------------------------------
    // Recording
    // ------------------------------------------------------------------

    fn session_action(&mut self) -> &mut Action {
        match &mut self.session {
            Some(session) => &mut session.action,
            None => panic!("selection changed outside a session"),
        }
    }

    /// Records the whole cell as selected.
    pub fn add(&mut self, tile: &Tile) {
        let mut copy = tile.clone();
        copy.select();
        self.session_action().add_change(Change::tile(copy));
    }

    /// Records one sub-object of the cell as selected. No-op if it already
    /// is, or does not exist.
    pub fn add_part(&mut self, tile: &Tile, part: TilePart) {
        if tile.is_part_selected(part) {
            return;
        }
        let mut copy = tile.clone();
        if !copy.set_part_selected(part, true) {
            return;
        }
        if self.is_border(tile, part) {
            copy.select_ground();
        }
        self.session_action().add_change(Change::tile(copy));
    }

    /// Records the whole cell as deselected.
    pub fn remove(&mut self, tile: &Tile) {
        let mut copy = tile.clone();
        copy.deselect();
        self.session_action().add_change(Change::tile(copy));
    }

    pub fn remove_part(&mut self, tile: &Tile, part: TilePart) {
        let mut copy = tile.clone();
        copy.set_part_selected(part, false);
        if self.is_border(tile, part) {
            copy.deselect_ground();
        }
        self.session_action().add_change(Change::tile(copy));
    }

    fn is_border(&self, tile: &Tile, part: TilePart) -> bool {
        match part {
            TilePart::Item(index) => {
                self.border_is_ground && tile.items.get(index).is_some_and(|i| i.border)
            }
            _ => false,
        }
    }

    /// Deselects everything. Inside a session the deselection is recorded and
    /// membership follows once it is committed; outside a session it happens
    /// in place with no history.
    pub fn clear(&mut self, map: &mut Map) {
        if self.tiles.is_empty() {
            return;
        }

        match &mut self.session {
            Some(session) => {
                for &position in &self.tiles {
                    if let Some(tile) = map.tile(position) {
                        let mut copy = tile.clone();
                        copy.deselect();
                        session.action.add_change(Change::tile(copy));
                    }
                }
            }
            None => {
                for &position in &self.tiles {
                    if let Some(tile) = map.tile_mut(position) {
                        tile.deselect();
                    }
                }
                self.tiles.clear();
            }
        }
    }

    // ------------------------------------------------------------------
    // Membership bookkeeping
    // ------------------------------------------------------------------

    pub(crate) fn add_internal(&mut self, position: Position) {
        if self.deferred {
            self.pending.push((position, true));
        } else if let Err(index) = self.tiles.binary_search(&position) {
            self.tiles.insert(index, position);
        }
    }

    pub(crate) fn remove_internal(&mut self, position: Position) {
        if self.deferred {
            self.pending.push((position, false));
        } else if let Ok(index) = self.tiles.binary_search(&position) {
            self.tiles.remove(index);
        }
    }

    /// Applies deferred updates. Disjoint adds and removes reconcile to
    /// `(initial ∪ adds) − removes`. A position touched more than once ends up
    /// as its last update left it, so a remove followed by an add keeps it
    /// selected, matching the tile's mark.
    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }

        let mut pending = std::mem::take(&mut self.pending);
        // Stable, so updates to one position keep their order.
        pending.sort_by_key(|(position, _)| *position);

        let mut adds = Vec::new();
        let mut removes = Vec::new();
        for (index, &(position, add)) in pending.iter().enumerate() {
            let last = pending.get(index + 1).map_or(true, |(next, _)| *next != position);
            if !last {
                continue;
            }
            if add {
                adds.push(position);
            } else {
                removes.push(position);
            }
        }

        if !removes.is_empty() {
            self.tiles.retain(|p| removes.binary_search(p).is_err());
        }
        if !adds.is_empty() {
            self.tiles = merge_sorted(&self.tiles, &adds);
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn contains(&self, position: Position) -> bool {
        self.tiles.binary_search(&position).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = Position> + '_ {
        self.tiles.iter().copied()
    }

    /// The single selected cell, if exactly one is selected.
    pub fn selected_tile(&self) -> Option<Position> {
        match self.tiles.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Component-wise minimum; the zero position when empty.
    pub fn min_position(&self) -> Position {
        self.bounds().0
    }

    /// Component-wise maximum; the zero position when empty.
    pub fn max_position(&self) -> Position {
        self.bounds().1
    }

    fn bounds(&self) -> (Position, Position) {
        let Some(first) = self.tiles.first() else {
            return (Position::default(), Position::default());
        };
        self.tiles.iter().fold((*first, *first), |(min, max), p| {
            (
                Position::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z)),
                Position::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z)),
            )
        })
    }
}

/// Union of two strictly ordered slices, still strictly ordered.
fn merge_sorted(left: &[Position], right: &[Position]) -> Vec<Position> {
    let mut merged = Vec::with_capacity(left.len() + right.len());
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        match left[i].cmp(&right[j]) {
            std::cmp::Ordering::Less => {
                merged.push(left[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                merged.push(right[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                merged.push(left[i]);
                i += 1;
                j += 1;
            }
        }
    }
    merged.extend_from_slice(&left[i..]);
    merged.extend_from_slice(&right[j..]);
    merged
}
