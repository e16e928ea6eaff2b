//! # Editor context
//!
//! One open map with its history, selection and live collaborator. Every
//! history operation borrows the pieces it needs from here, so there is no
//! process-wide state: two editors never share a queue or a selection.

use crate::{
    Action, ActionKind, ActionQueue, ApplyContext, BatchAction, Clock, HistoryConfig, LiveRole,
    LiveSync, LocalOnly, Selection, SelectionThread, SessionEnd, SessionMode,
};
use mapedit_map::{Map, Position, TilePart};
use tracing::{debug, info};

pub struct Editor {
    pub map: Map,
    pub history: ActionQueue,
    pub selection: Selection,
    live: Box<dyn LiveSync + Send>,
    config: HistoryConfig,
}

impl Editor {
    pub fn new(map: Map, config: HistoryConfig) -> Self {
        let history = ActionQueue::new(config.clone());
        Self::assemble(map, history, config)
    }

    pub fn with_clock(map: Map, config: HistoryConfig, clock: impl Clock + Send + Sync + 'static) -> Self {
        let history = ActionQueue::with_clock(config.clone(), clock);
        Self::assemble(map, history, config)
    }

    fn assemble(map: Map, history: ActionQueue, config: HistoryConfig) -> Self {
        let mut selection = Selection::new();
        selection.set_border_is_ground(config.border_is_ground);
        Self {
            map,
            history,
            selection,
            live: Box::new(LocalOnly),
            config,
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    pub fn live_role(&self) -> LiveRole {
        self.live.role()
    }

    /// Joins or leaves a live session. History recorded under another role
    /// is dropped.
    pub fn set_live(&mut self, live: Box<dyn LiveSync + Send>) {
        let role = live.role();
        info!(?role, "switching live role");
        self.live = live;
        self.history.clear();
        self.history.set_role(role);
    }

    pub fn live_mut(&mut self) -> &mut dyn LiveSync {
        &mut *self.live
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    pub fn create_action(&self, kind: ActionKind) -> Action {
        self.history.create_action(kind)
    }

    pub fn create_batch(&self, kind: ActionKind) -> BatchAction {
        self.history.create_batch(kind)
    }

    pub fn add_action(&mut self, action: Action, stacking_delay: i64) {
        let mut ctx = ApplyContext::new(&mut self.map, &mut self.selection, &mut *self.live);
        self.history.add_action(action, stacking_delay, &mut ctx);
    }

    pub fn add_batch(&mut self, batch: BatchAction, stacking_delay: i64) {
        let mut ctx = ApplyContext::new(&mut self.map, &mut self.selection, &mut *self.live);
        self.history.add_batch(batch, stacking_delay, &mut ctx);
    }

    pub fn undo(&mut self) -> bool {
        let mut ctx = ApplyContext::new(&mut self.map, &mut self.selection, &mut *self.live);
        self.history.undo(&mut ctx)
    }

    pub fn redo(&mut self) -> bool {
        let mut ctx = ApplyContext::new(&mut self.map, &mut self.selection, &mut *self.live);
        self.history.redo(&mut ctx)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn start_selection(&mut self) {
        self.selection.start(SessionMode::Plain);
    }

    /// Records the cell at `position` as selected. Missing cells are ignored.
    pub fn select(&mut self, position: Position) {
        if let Some(tile) = self.map.tile(position) {
            self.selection.add(tile);
        }
    }

    pub fn select_part(&mut self, position: Position, part: TilePart) {
        if let Some(tile) = self.map.tile(position) {
            self.selection.add_part(tile, part);
        }
    }

    pub fn deselect(&mut self, position: Position) {
        if let Some(tile) = self.map.tile(position) {
            self.selection.remove(tile);
        }
    }

    pub fn deselect_part(&mut self, position: Position, part: TilePart) {
        if let Some(tile) = self.map.tile(position) {
            self.selection.remove_part(tile, part);
        }
    }

    /// Deselects everything; recorded when a session is open.
    pub fn clear_selection(&mut self) {
        self.selection.clear(&mut self.map);
    }

    pub fn commit_selection(&mut self) {
        self.selection.commit(&mut self.map, &mut *self.live);
    }

    /// Closes the plain session and pushes its batch into the history.
    pub fn finish_selection(&mut self) {
        if let SessionEnd::Batch(batch) = self.selection.finish(SessionMode::Plain) {
            debug!(actions = batch.len(), "selection session finished");
            let delay = self.config.selection_stacking_delay;
            self.add_batch(batch, delay);
        }
    }

    /// Selects every non-empty cell between `from` and `to` on a worker
    /// thread and adds the result to the open session.
    pub fn select_region(&mut self, from: Position, to: Position) {
        let map = &self.map;
        let selection = &mut self.selection;
        let compensated = self.config.compensated_select;
        let border_is_ground = self.config.border_is_ground;

        std::thread::scope(|scope| {
            let worker = SelectionThread::spawn(scope, map, from, to, compensated, border_is_ground);
            selection.join(worker);
        });
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Map::new(), HistoryConfig::default())
    }
}
