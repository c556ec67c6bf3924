//! Preview handles for selected files.
//!
//! A preview handle lets the dashboard render a file before it is uploaded.
//! Handles are a scarce resource: each one pins the file's bytes in memory
//! until it is revoked. The [`PreviewStore`] trait is the capability the
//! selection state uses to create and release them; [`MemoryPreviews`] is the
//! in-process implementation.
//!
//! Ownership rule: the pending file that created a handle is the only one
//! allowed to revoke it, and it must do so exactly once.

use crate::types::{FileMeta, PreviewHandle};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreviewError {
    #[error("preview handle already revoked: {0}")]
    AlreadyRevoked(PreviewHandle),
}

/// Creates and revokes preview handles.
pub trait PreviewStore {
    /// Create a handle for a local file's bytes.
    fn create(&mut self, meta: &FileMeta, bytes: &[u8]) -> PreviewHandle;

    /// Release a handle. Revoking a handle that is not live is an error the
    /// caller may ignore; it never affects other handles.
    fn revoke(&mut self, handle: &PreviewHandle) -> Result<(), PreviewError>;
}

/// In-memory preview store keyed by `blob:` style handles.
#[derive(Debug, Default)]
pub struct MemoryPreviews {
    next: u64,
    live: HashMap<PreviewHandle, Vec<u8>>,
}

impl MemoryPreviews {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles created and not yet revoked.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Bytes behind a live handle.
    pub fn resolve(&self, handle: &PreviewHandle) -> Option<&[u8]> {
        self.live.get(handle).map(Vec::as_slice)
    }
}

impl PreviewStore for MemoryPreviews {
    fn create(&mut self, meta: &FileMeta, bytes: &[u8]) -> PreviewHandle {
        self.next += 1;
        let handle = PreviewHandle(format!("blob:folio/{}/{}", self.next, meta.filename));
        self.live.insert(handle.clone(), bytes.to_vec());
        handle
    }

    fn revoke(&mut self, handle: &PreviewHandle) -> Result<(), PreviewError> {
        self.live
            .remove(handle)
            .map(|_| ())
            .ok_or_else(|| PreviewError::AlreadyRevoked(handle.clone()))
    }
}
