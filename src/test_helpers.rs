//! Shared test utilities for the folio-media test suite.
//!
//! Recording fakes for the manager's capabilities, candidate builders, and
//! gallery extractors.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut sel = Selection::new(config, RecordingPreviews::new()).unwrap();
//! let id = sel.select(vec![png("a.png", 10)]).accepted[0];
//! sel.remove(id);
//! assert_eq!(sel.previews().revoke_count(), 1);
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::backend::{Backend, PersistError, PositionUpdate, StoredObject, UploadRequest};
use crate::gallery::Gallery;
use crate::notify::{Notification, NotificationSink};
use crate::preview::{MemoryPreviews, PreviewError, PreviewStore};
use crate::types::{Candidate, Category, FileMeta, GalleryItem, ItemId, PreviewHandle};

// =========================================================================
// Candidate builders
// =========================================================================

pub fn png(name: &str, size: u64) -> Candidate {
    Candidate::local(name, "image/png", vec![0; size as usize])
}

pub fn jpeg(name: &str, size: u64) -> Candidate {
    Candidate::local(name, "image/jpeg", vec![0; size as usize])
}

// =========================================================================
// Preview store fake
// =========================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewOp {
    /// Filename the preview was created for.
    Create(String),
    Revoke(PreviewHandle),
}

/// Real in-memory store that also records every call.
///
/// The log is shared so it stays readable after the store is dropped.
#[derive(Default)]
pub struct RecordingPreviews {
    inner: MemoryPreviews,
    log: Rc<RefCell<Vec<PreviewOp>>>,
}

impl RecordingPreviews {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Rc<RefCell<Vec<PreviewOp>>> {
        Rc::clone(&self.log)
    }

    pub fn ops(&self) -> Vec<PreviewOp> {
        self.log.borrow().clone()
    }

    pub fn revoke_count(&self) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|op| matches!(op, PreviewOp::Revoke(_)))
            .count()
    }
}

impl PreviewStore for RecordingPreviews {
    fn create(&mut self, meta: &FileMeta, bytes: &[u8]) -> PreviewHandle {
        self.log
            .borrow_mut()
            .push(PreviewOp::Create(meta.filename.clone()));
        self.inner.create(meta, bytes)
    }

    fn revoke(&mut self, handle: &PreviewHandle) -> Result<(), PreviewError> {
        self.log.borrow_mut().push(PreviewOp::Revoke(handle.clone()));
        self.inner.revoke(handle)
    }
}

// =========================================================================
// Notification sink fake
// =========================================================================

#[derive(Debug, Default)]
pub struct RecordingSink {
    notifications: Vec<Notification>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }
}

// =========================================================================
// Backend fake
// =========================================================================

/// Backend answering from scripted queues. Empty queues succeed.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    uploads: VecDeque<Result<StoredObject, PersistError>>,
    persists: VecDeque<Result<(), PersistError>>,
    persisted: Vec<Vec<PositionUpdate>>,
    uploaded: usize,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upload_ok(mut self, id: &str) -> Self {
        self.uploads.push_back(Ok(StoredObject {
            id: id.into(),
            url: format!("https://cdn.example/{id}"),
            key: format!("projects/{id}"),
        }));
        self
    }

    pub fn upload_err(mut self, err: PersistError) -> Self {
        self.uploads.push_back(Err(err));
        self
    }

    pub fn persist_err(mut self, err: PersistError) -> Self {
        self.persists.push_back(Err(err));
        self
    }

    /// Batches that were persisted successfully.
    pub fn persisted(&self) -> &[Vec<PositionUpdate>] {
        &self.persisted
    }
}

impl Backend for ScriptedBackend {
    fn upload(&mut self, request: &UploadRequest) -> Result<StoredObject, PersistError> {
        self.uploaded += 1;
        self.uploads.pop_front().unwrap_or_else(|| {
            Ok(StoredObject {
                id: format!("auto-{}", self.uploaded).as_str().into(),
                url: format!("https://cdn.example/{}", request.filename),
                key: format!("projects/{}", request.filename),
            })
        })
    }

    fn persist_positions(&mut self, batch: &[PositionUpdate]) -> Result<(), PersistError> {
        let result = self.persists.pop_front().unwrap_or(Ok(()));
        if result.is_ok() {
            self.persisted.push(batch.to_vec());
        }
        result
    }
}

// =========================================================================
// Gallery helpers
// =========================================================================

pub fn item(id: &str, position: u32, category: Category) -> GalleryItem {
    GalleryItem {
        id: id.into(),
        position,
        category,
        filename: format!("{id}.bin"),
        url: format!("https://cdn.example/{id}"),
        key: format!("projects/{id}"),
    }
}

pub fn ids(names: &[&str]) -> Vec<ItemId> {
    names.iter().map(|n| ItemId::from(*n)).collect()
}

/// Item ids in display order.
pub fn order_of(gallery: &Gallery) -> Vec<&str> {
    gallery.items().iter().map(|i| i.id.0.as_str()).collect()
}

pub fn positions_of(gallery: &Gallery) -> Vec<u32> {
    gallery.items().iter().map(|i| i.position).collect()
}
