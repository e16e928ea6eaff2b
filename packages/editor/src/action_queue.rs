//! # Action queue
//!
//! Cursor-based undo history of [`BatchAction`]s.
//!
//! ```text
//! [ b0 b1 b2 | b3 b4 ]
//!            ^ current
//! undo: current -= 1, undo b2
//! redo: redo b3, current += 1
//! ```
//!
//! Every batch is committed before the history decides what to do with it,
//! so the map changes exactly once per batch no matter whether the batch is
//! recorded, merged into the tail, or (for remote batches) thrown away.

use crate::{
    Action, ActionKind, ApplyContext, BatchAction, Clock, DirtyList, HistoryConfig, LiveRole,
    SystemClock,
};
use std::collections::VecDeque;
use tracing::{debug, instrument, trace};

pub struct ActionQueue {
    actions: VecDeque<BatchAction>,
    /// Number of batches that are currently applied.
    current: usize,
    /// Sum of the cached footprints of every batch in `actions`.
    memory_size: usize,
    config: HistoryConfig,
    role: LiveRole,
    clock: Box<dyn Clock + Send + Sync>,
}

impl ActionQueue {
    pub fn new(config: HistoryConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    pub fn with_clock(config: HistoryConfig, clock: impl Clock + Send + Sync + 'static) -> Self {
        Self {
            actions: VecDeque::new(),
            current: 0,
            memory_size: 0,
            config,
            role: LiveRole::Local,
            clock: Box::new(clock),
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    pub fn role(&self) -> LiveRole {
        self.role
    }

    /// Switches the live role. Batches created afterwards follow the new
    /// role; existing history is left alone.
    pub fn set_role(&mut self, role: LiveRole) {
        self.role = role;
    }

    pub fn create_action(&self, kind: ActionKind) -> Action {
        Action::new(kind)
    }

    /// An action that can be added to `batch`.
    pub fn create_action_for(&self, batch: &BatchAction) -> Action {
        Action::new(batch.kind())
    }

    /// A batch for `kind`. Under a read-only client role the batch only
    /// accepts remote actions.
    pub fn create_batch(&self, kind: ActionKind) -> BatchAction {
        if self.role.is_read_only() {
            BatchAction::read_only(kind)
        } else {
            BatchAction::new(kind)
        }
    }

    /// Wraps `action` into a fresh batch and adds that.
    pub fn add_action(&mut self, action: Action, stacking_delay: i64, ctx: &mut ApplyContext<'_>) {
        let mut batch = self.create_batch(action.kind());
        batch.add_action(action);
        self.add_batch(batch, stacking_delay, ctx);
    }

    /// Commits `batch` and records it.
    ///
    /// The redo suffix is dropped, the oldest entries are evicted while the
    /// history is over budget, and the batch is either merged into the tail
    /// (same kind, grouping enabled, tail touched less than `stacking_delay`
    /// seconds ago) or appended as a new entry.
    #[instrument(skip_all, fields(kind = ?batch.kind(), actions = batch.len()))]
    pub fn add_batch(&mut self, mut batch: BatchAction, stacking_delay: i64, ctx: &mut ApplyContext<'_>) {
        if batch.is_empty() {
            trace!("dropping empty batch");
            return;
        }

        self.commit_and_publish(&mut batch, ctx);

        if batch.kind() == ActionKind::Remote {
            trace!("remote batch applied, not recorded");
            return;
        }

        while self.actions.len() > self.current {
            if let Some(dropped) = self.actions.pop_back() {
                self.memory_size = self.memory_size.saturating_sub(dropped.memsize(false));
            }
        }

        let memory_cap = self.config.undo_memory_bytes;
        while memory_cap > 0 && self.memory_size > memory_cap && !self.actions.is_empty() {
            self.evict_front();
        }

        let now = self.clock.now();
        if let Some(last) = self.actions.back_mut() {
            if self.config.group_actions
                && last.kind() == batch.kind()
                && now - stacking_delay < last.timestamp()
            {
                self.memory_size = self.memory_size.saturating_sub(last.memsize(false));
                last.merge(&mut batch);
                last.set_timestamp(now);
                self.memory_size += last.memsize(true);
                debug!(entries = self.actions.len(), "merged batch into history tail");
                return;
            }
        }

        let count_cap = self.config.undo_size;
        while count_cap > 0 && self.actions.len() >= count_cap {
            self.evict_front();
        }

        batch.set_timestamp(now);
        self.memory_size += batch.memsize(false);
        self.actions.push_back(batch);
        self.current += 1;
        debug!(
            entries = self.actions.len(),
            memory = self.memory_size,
            "recorded batch"
        );
    }

    fn commit_and_publish(&self, batch: &mut BatchAction, ctx: &mut ApplyContext<'_>) {
        if self.role.reports_changes() {
            let mut dirty = DirtyList::new();
            batch.commit(ctx, Some(&mut dirty));
            ctx.live.publish(ctx.map, &dirty);
        } else {
            batch.commit(ctx, None);
        }
    }

    fn evict_front(&mut self) {
        if let Some(evicted) = self.actions.pop_front() {
            self.memory_size = self.memory_size.saturating_sub(evicted.memsize(false));
            self.current = self.current.saturating_sub(1);
            trace!(kind = ?evicted.kind(), "evicted oldest batch");
        }
    }

    /// Reverts the last applied batch. Returns false when there is nothing
    /// to undo.
    #[instrument(skip_all)]
    pub fn undo(&mut self, ctx: &mut ApplyContext<'_>) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        let reports = self.role.reports_changes();
        let batch = &mut self.actions[self.current];
        debug!(kind = ?batch.kind(), "undo");

        if reports {
            let mut dirty = DirtyList::new();
            batch.undo(ctx, Some(&mut dirty));
            ctx.live.publish(ctx.map, &dirty);
        } else {
            batch.undo(ctx, None);
        }
        true
    }

    /// Re-applies the next undone batch. Returns false when there is
    /// nothing to redo.
    #[instrument(skip_all)]
    pub fn redo(&mut self, ctx: &mut ApplyContext<'_>) -> bool {
        if self.current == self.actions.len() {
            return false;
        }
        let reports = self.role.reports_changes();
        let batch = &mut self.actions[self.current];
        debug!(kind = ?batch.kind(), "redo");

        if reports {
            let mut dirty = DirtyList::new();
            batch.redo(ctx, Some(&mut dirty));
            ctx.live.publish(ctx.map, &dirty);
        } else {
            batch.redo(ctx, None);
        }
        self.current += 1;
        true
    }

    /// Makes the tail batch refuse further merges.
    pub fn reset_timer(&mut self) {
        if let Some(last) = self.actions.back_mut() {
            last.reset_timer();
        }
    }

    /// Forgets the whole history. The map is left as it is.
    pub fn clear(&mut self) {
        self.actions.clear();
        self.current = 0;
        self.memory_size = 0;
    }

    pub fn can_undo(&self) -> bool {
        self.current > 0
    }

    pub fn can_redo(&self) -> bool {
        self.current < self.actions.len()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn undo_len(&self) -> usize {
        self.current
    }

    pub fn redo_len(&self) -> usize {
        self.actions.len() - self.current
    }

    pub fn memory_size(&self) -> usize {
        self.memory_size
    }

    pub fn batches(&self) -> impl Iterator<Item = &BatchAction> {
        self.actions.iter()
    }
}

impl Default for ActionQueue {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}
