//! # Map Editor Live Collaboration
//!
//! In-process host and client collaborators for [`mapedit_editor::Editor`].
//! The history core reports every commit/undo/redo through
//! [`mapedit_editor::LiveSync`]; this crate turns those reports into owned
//! messages on tokio channels. Transport is left to the embedding
//! application.
//!
//! ```text
//! client editor ──ChangeRecord──▶ host editor ──NodeBroadcast──▶ clients
//!        ▲                                                          │
//!        └──────────────── apply_remote (Remote action) ◀───────────┘
//! ```

mod client;
mod errors;
mod host;
mod protocol;
mod remote;

pub use client::{LiveClient, Region, ViewRegions};
pub use errors::LiveError;
pub use host::LiveHost;
pub use protocol::{ChangeRecord, NodeBroadcast};
pub use remote::{apply_remote, receive_broadcast, receive_remote};
