//! Ranged selection on a worker thread.
//!
//! The worker borrows the map read-only through a [`std::thread::Scope`], so
//! nothing can mutate the map until the owning thread joins it. Its only
//! output is the detached select [`Action`] it recorded.

use crate::{Action, Selection, SessionEnd, SessionMode};
use mapedit_map::{Map, Position, GROUND_LAYER};
use std::thread::{Scope, ScopedJoinHandle};
use tracing::trace;

pub struct SelectionThread<'scope> {
    handle: ScopedJoinHandle<'scope, Action>,
}

impl<'scope> SelectionThread<'scope> {
    /// Starts selecting every non-empty cell in the box spanned by `from`
    /// and `to`. Floors are walked from `from.z` down to `to.z`; with
    /// `compensated` set, each floor at or above ground level shifts the
    /// rectangle by one cell diagonally.
    pub fn spawn<'env>(
        scope: &'scope Scope<'scope, 'env>,
        map: &'env Map,
        from: Position,
        to: Position,
        compensated: bool,
        border_is_ground: bool,
    ) -> Self {
        let handle = scope.spawn(move || {
            let mut selection = Selection::new();
            selection.set_border_is_ground(border_is_ground);
            selection.start(SessionMode::Subthread);

            let (mut start, mut end) = (from, to);
            let mut z = start.z;
            while z >= end.z {
                for x in start.x..=end.x {
                    for y in start.y..=end.y {
                        if let Some(tile) = map.tile(Position::new(x, y, z)) {
                            if !tile.is_empty() {
                                selection.add(tile);
                            }
                        }
                    }
                }
                if z <= GROUND_LAYER && compensated {
                    start.x += 1;
                    start.y += 1;
                    end.x += 1;
                    end.y += 1;
                }
                z -= 1;
            }

            match selection.finish(SessionMode::Subthread) {
                SessionEnd::Detached(action) => {
                    trace!(changes = action.len(), "ranged selection done");
                    action
                }
                _ => unreachable!("subthread session ends detached"),
            }
        });
        Self { handle }
    }

    /// Blocks until the worker is done. A panic on the worker is resumed on
    /// the caller.
    pub fn wait(self) -> Action {
        match self.handle.join() {
            Ok(action) => action,
            Err(payload) => std::panic::resume_unwind(payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapedit_map::Tile;

    fn map_with(positions: &[Position]) -> Map {
        let mut map = Map::new();
        for &p in positions {
            map.insert_tile(Tile::with_ground(p, 100)).unwrap();
        }
        map
    }

    #[test]
    fn test_selects_tiles_in_box() {
        let map = map_with(&[
            Position::new(10, 10, 7),
            Position::new(12, 11, 7),
            Position::new(20, 20, 7),
        ]);

        let action = std::thread::scope(|scope| {
            SelectionThread::spawn(
                scope,
                &map,
                Position::new(10, 10, 7),
                Position::new(15, 15, 7),
                false,
                false,
            )
            .wait()
        });

        assert_eq!(action.len(), 2);
        assert!(action
            .changes()
            .iter()
            .all(|c| c.as_tile().is_some_and(Tile::is_selected)));
    }

    #[test]
    fn test_compensated_shift_per_floor() {
        // One floor below ground the box starts shifted by one.
        let map = map_with(&[Position::new(10, 10, 6), Position::new(11, 11, 6)]);

        let run = |compensated| {
            std::thread::scope(|scope| {
                SelectionThread::spawn(
                    scope,
                    &map,
                    Position::new(10, 10, 7),
                    Position::new(10, 10, 6),
                    compensated,
                    false,
                )
                .wait()
            })
        };

        let plain = run(false);
        assert_eq!(plain.changes()[0].as_tile().unwrap().position(), Position::new(10, 10, 6));

        let shifted = run(true);
        assert_eq!(shifted.len(), 1);
        assert_eq!(shifted.changes()[0].as_tile().unwrap().position(), Position::new(11, 11, 6));
    }
}
