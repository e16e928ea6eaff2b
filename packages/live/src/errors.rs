//! Error types for live collaboration

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LiveError {
    #[error("Peer disconnected")]
    Disconnected,

    #[error("Subscriber lagged behind by {0} broadcasts")]
    Lagged(u64),

    #[error("Invalid change record: {0}")]
    Serialization(#[from] serde_json::Error),
}
