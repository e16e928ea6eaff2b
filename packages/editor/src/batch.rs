//! # Batch actions
//!
//! A batch is one undo step as the user sees it. It owns a list of actions
//! of a single kind and remembers when it was last extended, which is what
//! the history uses to coalesce rapid edits of the same kind.

use crate::{Action, ActionKind, ApplyContext, DirtyList};
use std::cell::Cell;
use tracing::debug;

#[derive(Debug)]
pub struct BatchAction {
    kind: ActionKind,
    actions: Vec<Action>,
    /// Seconds since the epoch; 0 means "never merge into this batch".
    timestamp: i64,
    /// Cached footprint, 0 = not computed yet.
    memory_size: Cell<usize>,
    /// Set for batches created under a read-only client role.
    read_only: bool,
}

impl BatchAction {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            actions: Vec::new(),
            timestamp: 0,
            memory_size: Cell::new(0),
            read_only: false,
        }
    }

    pub(crate) fn read_only(kind: ActionKind) -> Self {
        Self {
            read_only: true,
            ..Self::new(kind)
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub(crate) fn set_timestamp(&mut self, timestamp: i64) {
        self.timestamp = timestamp;
    }

    pub fn reset_timer(&mut self) {
        self.timestamp = 0;
    }

    /// Appends an uncommitted action. It is committed with the batch.
    ///
    /// Empty actions are dropped, as is every local action while the batch
    /// belongs to a read-only client.
    ///
    /// # Panics
    ///
    /// When the action's kind differs from the batch's.
    pub fn add_action(&mut self, action: Action) {
        if !self.accepts(&action) {
            return;
        }
        self.actions.push(action);
    }

    /// Commits `action` right away, then appends it.
    pub fn add_and_commit_action(&mut self, mut action: Action, ctx: &mut ApplyContext<'_>) {
        if !self.accepts(&action) {
            return;
        }
        action.commit(ctx, None);
        self.actions.push(action);
    }

    fn accepts(&self, action: &Action) -> bool {
        if action.is_empty() {
            return false;
        }
        assert_eq!(
            action.kind(),
            self.kind,
            "action kind does not match its batch"
        );
        if self.read_only && action.kind() != ActionKind::Remote {
            debug!(kind = ?action.kind(), "read-only client, dropping local action");
            return false;
        }
        true
    }

    /// Commits every action that is not committed yet.
    pub fn commit<'a>(&'a mut self, ctx: &mut ApplyContext<'_>, mut dirty: Option<&mut DirtyList<'a>>) {
        for action in self.actions.iter_mut() {
            if !action.is_committed() {
                action.commit(ctx, dirty.as_deref_mut());
            }
        }
    }

    /// Reverts the actions, last first.
    pub fn undo<'a>(&'a mut self, ctx: &mut ApplyContext<'_>, mut dirty: Option<&mut DirtyList<'a>>) {
        for action in self.actions.iter_mut().rev() {
            action.undo(ctx, dirty.as_deref_mut());
        }
    }

    /// Re-applies the actions through the commit path.
    pub fn redo<'a>(&'a mut self, ctx: &mut ApplyContext<'_>, dirty: Option<&mut DirtyList<'a>>) {
        self.commit(ctx, dirty);
    }

    /// Moves all of `other`'s actions to the end of this batch.
    pub fn merge(&mut self, other: &mut BatchAction) {
        self.actions.append(&mut other.actions);
    }

    /// Approximate footprint. Walking every action is O(n), so the result is
    /// cached until `recalc` is requested.
    pub fn memsize(&self, recalc: bool) -> usize {
        let cached = self.memory_size.get();
        if !recalc && cached > 0 {
            return cached;
        }

        let mut mem = std::mem::size_of::<Self>();
        mem += std::mem::size_of::<*const Action>() * 3 * self.actions.len();
        mem += self.actions.iter().map(Action::approx_memsize).sum::<usize>();
        self.memory_size.set(mem);
        mem
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Change, LocalOnly, Selection};
    use mapedit_map::{Map, Position, Tile};

    fn draw(x: i32) -> Action {
        let mut action = Action::new(ActionKind::Draw);
        action.add_change(Change::tile(Tile::with_ground(Position::new(x, 10, 7), 100)));
        action
    }

    #[test]
    fn test_empty_actions_are_dropped() {
        let mut batch = BatchAction::new(ActionKind::Draw);
        batch.add_action(Action::new(ActionKind::Draw));
        assert!(batch.is_empty());
    }

    #[test]
    #[should_panic(expected = "action kind does not match its batch")]
    fn test_foreign_kind_panics() {
        let mut batch = BatchAction::new(ActionKind::Select);
        batch.add_action(draw(1));
    }

    #[test]
    fn test_read_only_accepts_only_remote() {
        let mut batch = BatchAction::read_only(ActionKind::Draw);
        batch.add_action(draw(1));
        assert!(batch.is_empty());

        let mut remote = BatchAction::read_only(ActionKind::Remote);
        let mut action = Action::new(ActionKind::Remote);
        action.add_change(Change::tile(Tile::with_ground(Position::new(1, 1, 7), 100)));
        remote.add_action(action);
        assert_eq!(remote.len(), 1);
    }

    #[test]
    fn test_commit_skips_committed_actions() {
        let mut map = Map::new();
        let mut selection = Selection::new();
        let mut live = LocalOnly;
        let mut ctx = ApplyContext::new(&mut map, &mut selection, &mut live);

        let mut batch = BatchAction::new(ActionKind::Draw);
        batch.add_and_commit_action(draw(1), &mut ctx);
        batch.add_action(draw(2));

        // Only the second action is still pending; committing the first
        // again would panic.
        batch.commit(&mut ctx, None);
        assert!(batch.actions().iter().all(Action::is_committed));
        assert_eq!(ctx.map.tile_count(), 2);

        batch.undo(&mut ctx, None);
        assert_eq!(ctx.map.tile_count(), 0);

        batch.redo(&mut ctx, None);
        assert_eq!(ctx.map.tile_count(), 2);
    }

    #[test]
    fn test_merge_empties_other() {
        let mut first = BatchAction::new(ActionKind::Draw);
        first.add_action(draw(1));
        let mut second = BatchAction::new(ActionKind::Draw);
        second.add_action(draw(2));
        second.add_action(draw(3));

        first.merge(&mut second);
        assert_eq!(first.len(), 3);
        assert!(second.is_empty());
    }

    #[test]
    fn test_memsize_is_cached() {
        let mut batch = BatchAction::new(ActionKind::Draw);
        batch.add_action(draw(1));
        let size = batch.memsize(false);

        batch.add_action(draw(2));
        assert_eq!(batch.memsize(false), size);
        assert!(batch.memsize(true) > size);
    }
}
