//! # Live host
//!
//! Owns the authoritative map. Every commit/undo/redo is turned into a
//! [`NodeBroadcast`] and fanned out to subscribed clients, which refresh the
//! blocks they mirror.

use crate::NodeBroadcast;
use mapedit_editor::{DirtyList, LiveRole, LiveSync};
use mapedit_map::Map;
use tokio::sync::broadcast;
use tracing::{debug, trace};

pub struct LiveHost {
    sender: broadcast::Sender<NodeBroadcast>,
    broadcasts: u64,
}

impl LiveHost {
    /// `capacity` is how many broadcasts a slow subscriber may fall behind
    /// before it starts missing them.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            broadcasts: 0,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NodeBroadcast> {
        self.sender.subscribe()
    }

    /// A handle for subscribing after the host was handed to an editor.
    pub fn sender(&self) -> broadcast::Sender<NodeBroadcast> {
        self.sender.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn broadcasts(&self) -> u64 {
        self.broadcasts
    }
}

impl LiveSync for LiveHost {
    fn role(&self) -> LiveRole {
        LiveRole::Host
    }

    fn publish(&mut self, _map: &Map, dirty: &DirtyList<'_>) {
        if dirty.position_count() == 0 {
            return;
        }
        let message = NodeBroadcast::from_dirty(dirty);
        let blocks = message.entries.len();
        // No subscribers is not an error; the edit still happened locally.
        match self.sender.send(message) {
            Ok(receivers) => debug!(blocks, receivers, "broadcast dirty blocks"),
            Err(_) => trace!(blocks, "no subscribers for dirty blocks"),
        }
        self.broadcasts += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_lists_are_not_broadcast() {
        let mut host = LiveHost::new(8);
        let mut rx = host.subscribe();
        host.publish(&Map::new(), &DirtyList::new());
        assert_eq!(host.broadcasts(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_publish_reaches_every_subscriber() {
        let mut host = LiveHost::new(8);
        let mut first = host.subscribe();
        let mut second = host.sender().subscribe();
        assert_eq!(host.subscriber_count(), 2);

        let mut dirty = DirtyList::new();
        dirty.add_position(8, 8, 7);
        host.publish(&Map::new(), &dirty);

        assert_eq!(first.try_recv().unwrap().entries.len(), 1);
        assert_eq!(second.try_recv().unwrap().entries.len(), 1);
    }
}
