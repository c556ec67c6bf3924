//! Persistence backend capability.
//!
//! The hosted storage and database are opaque to this crate. Everything the
//! manager needs from them fits in two calls: store a file, and save a whole
//! batch of gallery positions atomically.

use crate::types::ItemId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistError {
    /// Transient failure (network, timeout, 5xx). Safe to retry.
    #[error("request failed: {0}")]
    Failed(String),
    /// The server rejected the write because its state moved on.
    #[error("conflicting change on the server")]
    Conflict,
}

/// One entry of a position batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub id: ItemId,
    pub position: u32,
}

/// A file to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Reference to a stored object, as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub id: ItemId,
    pub url: String,
    pub key: String,
}

/// Remote storage and database, seen from the dashboard.
pub trait Backend {
    fn upload(&mut self, request: &UploadRequest) -> Result<StoredObject, PersistError>;

    /// Persist all positions or none.
    fn persist_positions(&mut self, batch: &[PositionUpdate]) -> Result<(), PersistError>;
}
