//! Replaying peer edits into a local editor.

use crate::{ChangeRecord, LiveError, NodeBroadcast};
use mapedit_editor::{ActionKind, Editor};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, instrument};

/// Applies `records` as one remote action. Remote actions bypass history
/// and are still subject to the client's visibility gate.
pub fn apply_remote(editor: &mut Editor, records: Vec<ChangeRecord>) {
    if records.is_empty() {
        return;
    }
    let mut action = editor.create_action(ActionKind::Remote);
    for record in records {
        action.add_change(record.into_change());
    }
    debug!(changes = action.len(), "applying remote changes");
    editor.add_action(action, 0);
}

/// Waits for the next batch of records on `incoming` and applies it.
/// Returns how many records were received.
#[instrument(skip_all)]
pub async fn receive_remote(
    editor: &mut Editor,
    incoming: &mut mpsc::Receiver<Vec<ChangeRecord>>,
) -> Result<usize, LiveError> {
    let records = incoming.recv().await.ok_or(LiveError::Disconnected)?;
    let count = records.len();
    apply_remote(editor, records);
    Ok(count)
}

/// Waits for the next host broadcast.
pub async fn receive_broadcast(
    incoming: &mut broadcast::Receiver<NodeBroadcast>,
) -> Result<NodeBroadcast, LiveError> {
    match incoming.recv().await {
        Ok(message) => Ok(message),
        Err(broadcast::error::RecvError::Lagged(missed)) => Err(LiveError::Lagged(missed)),
        Err(broadcast::error::RecvError::Closed) => Err(LiveError::Disconnected),
    }
}
