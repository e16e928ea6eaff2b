//! # Actions
//!
//! An action is an ordered list of [`Change`]s that are applied and reverted
//! together, e.g. one brush stroke.
//!
//! ## State machine
//!
//! ```text
//! uncommitted --commit--> committed --undo--> uncommitted --commit (redo)--> ...
//! ```
//!
//! Commit walks the changes forwards, undo walks them backwards. Every
//! change is a swap, so both directions share the same per-change code and
//! redo is literally a second commit.

use crate::{Change, DirtyList, LiveSync, Selection};
use mapedit_map::{Map, Tile};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// What kind of edit an action represents. Batches only merge with batches
/// of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Move,
    /// Received from a live peer. Applied but never recorded in history.
    Remote,
    Select,
    DeleteTiles,
    CutTiles,
    PasteTiles,
    Randomize,
    Borderize,
    Draw,
    SwitchDoor,
    RotateItem,
    ReplaceItems,
    ChangeProperties,
}

/// Everything a change touches while it is applied.
pub struct ApplyContext<'e> {
    pub map: &'e mut Map,
    pub selection: &'e mut Selection,
    pub live: &'e mut dyn LiveSync,
}

impl<'e> ApplyContext<'e> {
    pub fn new(map: &'e mut Map, selection: &'e mut Selection, live: &'e mut dyn LiveSync) -> Self {
        Self {
            map,
            selection,
            live,
        }
    }
}

#[derive(Debug)]
pub struct Action {
    kind: ActionKind,
    changes: Vec<Change>,
    committed: bool,
}

impl Action {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            changes: Vec::new(),
            committed: false,
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn add_change(&mut self, change: Change) {
        debug_assert!(!self.committed, "changes must be added before the first commit");
        self.changes.push(change);
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Exact footprint: walks every change.
    pub fn memsize(&self) -> usize {
        let mut mem = std::mem::size_of::<Self>();
        mem += std::mem::size_of::<*const Change>() * 3 * self.changes.len();
        mem += self.changes.iter().map(Change::memsize).sum::<usize>();
        mem
    }

    /// Footprint estimate from the change count alone.
    pub fn approx_memsize(&self) -> usize {
        const PER_CHANGE: usize = std::mem::size_of::<Change>()
            + std::mem::size_of::<Tile>()
            + std::mem::size_of::<mapedit_map::Item>()
            + 6;
        std::mem::size_of::<Self>() + self.changes.len() * PER_CHANGE
    }

    /// Applies every change in order.
    ///
    /// # Panics
    ///
    /// When the action is already committed.
    pub fn commit<'a>(&'a mut self, ctx: &mut ApplyContext<'_>, dirty: Option<&mut DirtyList<'a>>) {
        assert!(!self.committed, "action committed twice");
        let applied = self.apply(ctx, false);
        self.committed = true;
        let this: &'a Action = self;
        this.report(applied, dirty);
    }

    /// Reverts every change in reverse order.
    pub fn undo<'a>(&'a mut self, ctx: &mut ApplyContext<'_>, dirty: Option<&mut DirtyList<'a>>) {
        let applied = self.apply(ctx, true);
        self.committed = false;
        let this: &'a Action = self;
        this.report(applied, dirty);
    }

    /// Same as [`Action::commit`].
    pub fn redo<'a>(&'a mut self, ctx: &mut ApplyContext<'_>, dirty: Option<&mut DirtyList<'a>>) {
        self.commit(ctx, dirty);
    }

    /// Drops every change without applying it. Used when a client's changes
    /// no longer match what it can see.
    pub fn clear(&mut self) {
        self.changes.clear();
    }

    /// Applies all changes and returns the indices of the tile changes that
    /// actually reached the map.
    fn apply(&mut self, ctx: &mut ApplyContext<'_>, reverse: bool) -> Vec<usize> {
        let mut applied = Vec::new();
        if self.changes.is_empty() {
            return applied;
        }

        ctx.selection.start_internal();
        let count = self.changes.len();
        for step in 0..count {
            let index = if reverse { count - 1 - step } else { step };
            let change = &mut self.changes[index];
            if apply_change(change, ctx) {
                applied.push(index);
            }
        }
        ctx.selection.finish_internal();
        applied
    }

    fn report<'a>(&'a self, applied: Vec<usize>, dirty: Option<&mut DirtyList<'a>>) {
        let Some(dirty) = dirty else {
            return;
        };
        for index in applied {
            let change = &self.changes[index];
            if let Some(tile) = change.as_tile() {
                let pos = tile.position();
                dirty.add_position(pos.x, pos.y, pos.z);
            }
            if self.kind != ActionKind::Remote {
                dirty.add_change(change);
            }
        }
    }
}

/// Applies one change. Returns true for tile changes that reached the map.
fn apply_change(change: &mut Change, ctx: &mut ApplyContext<'_>) -> bool {
    if let Change::Tile(slot) = change {
        let position = slot.position();
        if !ctx.map.is_valid(position) {
            debug!(%position, "skipping tile change at invalid position");
            return false;
        }
        if ctx.live.role().is_client() && !ctx.live.is_visible(position) {
            trace!(%position, "dropping change outside visible area");
            change.clear();
            return false;
        }
    }

    match change {
        Change::None => false,
        Change::Tile(slot) => {
            exchange_tile(slot, ctx);
            true
        }
        Change::HouseExit(data) => {
            if !data.position.is_unset() && !ctx.map.is_valid(data.position) {
                debug!(position = %data.position, "skipping house exit move to invalid position");
                return false;
            }
            match ctx.map.houses_mut().get_mut(data.house_id) {
                Some(house) => {
                    let previous = house.exit();
                    house.set_exit(data.position);
                    data.position = previous;
                }
                None => debug!(house_id = data.house_id, "house no longer exists"),
            }
            false
        }
        Change::Waypoint(data) => {
            let to = data.position;
            if !ctx.map.is_valid(to) {
                debug!(name = %data.name, position = %to, "skipping waypoint move to invalid position");
                return false;
            }
            let Some(waypoint) = ctx.map.waypoints_mut().get_mut(&data.name) else {
                debug!(name = %data.name, "waypoint no longer exists");
                return false;
            };
            let from = waypoint.position;
            waypoint.position = to;
            data.position = from;

            if ctx.map.is_valid(from) {
                ctx.map.decrease_waypoint_count(from);
            }
            ctx.map.increase_waypoint_count(to);
            false
        }
    }
}

/// Swaps `slot` with the live cell and brings the position-keyed indices in
/// line with the tile that is now live. Symmetric: the same code serves
/// commit and undo.
fn exchange_tile(slot: &mut Tile, ctx: &mut ApplyContext<'_>) {
    let position = slot.position();
    ctx.map.exchange_tile(slot);

    let (incoming_house, incoming_spawn, incoming_selected) = match ctx.map.tile(position) {
        Some(live) => (live.house_id, live.spawn.clone(), live.is_selected()),
        None => (0, None, false),
    };
    let outgoing = slot;

    if incoming_house != outgoing.house_id {
        match ctx.map.houses_mut().get_mut(outgoing.house_id) {
            Some(house) => house.remove_tile(position),
            // The house was removed meanwhile; the snapshot must not refer to it.
            None => outgoing.house_id = 0,
        }
        if let Some(house) = ctx.map.houses_mut().get_mut(incoming_house) {
            house.add_tile(position);
        }
    }

    match (&outgoing.spawn, &incoming_spawn) {
        (Some(old), Some(new)) if !old.same_area(new) => {
            ctx.map.remove_spawn(position);
            ctx.map.add_spawn(position, new);
        }
        (Some(_), None) => ctx.map.remove_spawn(position),
        (None, Some(new)) => ctx.map.add_spawn(position, new),
        _ => {}
    }

    if incoming_selected {
        ctx.selection.add_internal(position);
    }
    if outgoing.is_selected() {
        ctx.selection.remove_internal(position);
    }

    ctx.map.mark_changed();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LocalOnly;
    use mapedit_map::{House, Item, Position, Spawn};

    fn pos() -> Position {
        Position::new(100, 100, 7)
    }

    #[test]
    fn test_commit_and_undo_tile() {
        let mut map = Map::new();
        let mut selection = Selection::new();
        let mut live = LocalOnly;
        let mut ctx = ApplyContext::new(&mut map, &mut selection, &mut live);

        let mut tile = Tile::with_ground(pos(), 100);
        tile.add_item(Item::new(1987));
        let mut action = Action::new(ActionKind::Draw);
        action.add_change(Change::tile(tile));

        action.commit(&mut ctx, None);
        assert!(action.is_committed());
        assert_eq!(ctx.map.tile(pos()).unwrap().items.len(), 1);
        // The change now holds the previous (empty) cell.
        assert!(action.changes()[0].as_tile().unwrap().is_empty());

        action.undo(&mut ctx, None);
        assert!(!action.is_committed());
        assert!(ctx.map.tile(pos()).is_none());
    }

    #[test]
    #[should_panic(expected = "action committed twice")]
    fn test_double_commit_panics() {
        let mut map = Map::new();
        let mut selection = Selection::new();
        let mut live = LocalOnly;
        let mut ctx = ApplyContext::new(&mut map, &mut selection, &mut live);

        let mut action = Action::new(ActionKind::Draw);
        action.add_change(Change::tile(Tile::with_ground(pos(), 100)));
        action.commit(&mut ctx, None);
        action.commit(&mut ctx, None);
    }

    #[test]
    fn test_house_membership_follows_tile() {
        let mut map = Map::new();
        map.add_house(House::new(3, "Main Street 1")).unwrap();
        let mut selection = Selection::new();
        let mut live = LocalOnly;
        let mut ctx = ApplyContext::new(&mut map, &mut selection, &mut live);

        let mut tile = Tile::with_ground(pos(), 100);
        tile.house_id = 3;
        let mut action = Action::new(ActionKind::Draw);
        action.add_change(Change::tile(tile));

        action.commit(&mut ctx, None);
        assert!(ctx.map.houses().get(3).unwrap().contains(pos()));

        action.undo(&mut ctx, None);
        assert!(!ctx.map.houses().get(3).unwrap().contains(pos()));
    }

    #[test]
    fn test_spawn_registry_follows_tile() {
        let mut map = Map::new();
        let mut selection = Selection::new();
        let mut live = LocalOnly;
        let mut ctx = ApplyContext::new(&mut map, &mut selection, &mut live);

        let mut tile = Tile::with_ground(pos(), 100);
        tile.spawn = Some(Spawn::new(3));
        let mut action = Action::new(ActionKind::Draw);
        action.add_change(Change::tile(tile));

        action.commit(&mut ctx, None);
        assert_eq!(ctx.map.spawn_radius(pos()), Some(3));

        action.undo(&mut ctx, None);
        assert_eq!(ctx.map.spawn_radius(pos()), None);
    }

    #[test]
    fn test_missing_house_is_skipped() {
        let mut map = Map::new();
        let mut selection = Selection::new();
        let mut live = LocalOnly;
        let mut ctx = ApplyContext::new(&mut map, &mut selection, &mut live);

        let ghost = House::new(99, "Demolished");
        let mut action = Action::new(ActionKind::ChangeProperties);
        action.add_change(Change::house_exit(&ghost, Position::new(5, 5, 7)));
        action.add_change(Change::tile(Tile::with_ground(pos(), 100)));

        action.commit(&mut ctx, None);
        // The tile change still applied.
        assert!(ctx.map.tile(pos()).is_some());
    }

    #[test]
    fn test_house_exit_move_swaps() {
        let mut map = Map::new();
        let mut house = House::new(4, "Harbour Lane 2");
        house.set_exit(Position::new(1, 1, 7));
        map.add_house(house.clone()).unwrap();
        let mut selection = Selection::new();
        let mut live = LocalOnly;
        let mut ctx = ApplyContext::new(&mut map, &mut selection, &mut live);

        let mut action = Action::new(ActionKind::ChangeProperties);
        action.add_change(Change::house_exit(&house, Position::new(9, 9, 7)));

        action.commit(&mut ctx, None);
        assert_eq!(ctx.map.houses().get(4).unwrap().exit(), Position::new(9, 9, 7));
        // The change now holds the exit it replaced.
        assert_eq!(
            action.changes()[0].as_house_exit().unwrap().position,
            Position::new(1, 1, 7)
        );

        action.undo(&mut ctx, None);
        assert_eq!(ctx.map.houses().get(4).unwrap().exit(), Position::new(1, 1, 7));

        action.redo(&mut ctx, None);
        assert_eq!(ctx.map.houses().get(4).unwrap().exit(), Position::new(9, 9, 7));
    }

    #[test]
    fn test_tile_at_invalid_position_is_skipped() {
        let mut map = Map::new();
        let mut selection = Selection::new();
        let mut live = LocalOnly;
        let mut ctx = ApplyContext::new(&mut map, &mut selection, &mut live);

        let outside = Position::new(-3, 5, 20);
        let mut action = Action::new(ActionKind::Draw);
        action.add_change(Change::tile(Tile::with_ground(outside, 405)));
        action.add_change(Change::tile(Tile::with_ground(Position::new(100, 100, 40), 405)));
        action.add_change(Change::tile(Tile::with_ground(pos(), 405)));

        let mut dirty = DirtyList::new();
        action.commit(&mut ctx, Some(&mut dirty));
        assert!(ctx.map.tile(outside).is_none());
        assert_eq!(ctx.map.tile_count(), 1);
        // Only the valid cell is reported.
        assert_eq!(dirty.position_count(), 1);
        assert_eq!(dirty.changes().len(), 1);
        drop(dirty);

        action.undo(&mut ctx, None);
        assert_eq!(ctx.map.tile_count(), 0);
    }

    #[test]
    fn test_waypoint_move_to_invalid_position_is_skipped() {
        let mut map = Map::new();
        map.add_waypoint("Temple", pos()).unwrap();
        let waypoint = map.waypoints().get("Temple").unwrap().clone();
        let mut selection = Selection::new();
        let mut live = LocalOnly;
        let mut ctx = ApplyContext::new(&mut map, &mut selection, &mut live);

        let mut action = Action::new(ActionKind::ChangeProperties);
        action.add_change(Change::waypoint(&waypoint, Position::new(10, 10, 99)));
        action.commit(&mut ctx, None);

        assert_eq!(ctx.map.waypoints().get("Temple").unwrap().position, pos());
        assert_eq!(ctx.map.waypoint_count(pos()), 1);
    }

    #[test]
    fn test_memsize_estimates() {
        let mut action = Action::new(ActionKind::Draw);
        let empty = action.approx_memsize();
        action.add_change(Change::tile(Tile::with_ground(pos(), 100)));
        assert!(action.approx_memsize() > empty);
        assert!(action.memsize() > std::mem::size_of::<Action>());
    }
}
