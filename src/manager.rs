//! The upload and ordered-gallery manager.
//!
//! [`MediaManager`] is what a dashboard screen mounts. It owns one widget's
//! [`Selection`], its [`DropZone`], and the [`Gallery`] the uploads land in,
//! and it is the only place that talks to the notification sink.
//!
//! Every mutating method takes `&mut self`, so events are applied one at a
//! time in the order they arrive and no method can observe a half-applied
//! predecessor.
//!
//! # Asynchronous work
//!
//! Uploads and reorders resolve later than the event that started them. The
//! manager hands out tickets and accepts results against them:
//!
//! ```text
//! begin_upload(id)  → UploadTicket { id, generation, request }
//!      ... user may remove the file, or start another attempt ...
//! finish_upload(ticket, result)
//!      generation still current → Committed / Failed / NeedsRefresh
//!      otherwise                → Discarded (no item, no notification)
//! ```
//!
//! Callers without an async runtime can use [`MediaManager::upload_all`] and
//! [`MediaManager::reorder_with`], which drive a [`Backend`] synchronously.

use crate::backend::{Backend, PersistError, StoredObject, UploadRequest};
use crate::config::{ConfigError, UploadConfig};
use crate::dropzone::{DragEvent, DragState, DropZone};
use crate::gallery::{Gallery, GalleryError, ReorderOutcome, ReorderTicket};
use crate::notify::{Notification, NotificationSink};
use crate::preview::PreviewStore;
use crate::selection::{SelectOutcome, Selection};
use crate::types::{Candidate, FileId, FileSource, GalleryItem, ItemId, PendingFile};

type ChangeCallback = Box<dyn FnMut(&[PendingFile])>;

/// A started upload. Hand `request` to the backend, then pass the ticket back
/// to [`MediaManager::finish_upload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    pub id: FileId,
    generation: u64,
    pub request: UploadRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Committed(GalleryItem),
    /// The file stays selected, marked failed.
    Failed(PersistError),
    /// The ticket was superseded; its result was ignored.
    Discarded,
    /// Stored, but the gallery already held the returned id. The file leaves
    /// the selection and the gallery must be reloaded.
    NeedsRefresh(GalleryError),
}

/// Result of a drag event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragOutcome {
    pub prevent_default: bool,
    /// Present when the event was a drop.
    pub selection: Option<SelectOutcome>,
}

pub struct MediaManager<P: PreviewStore, S: NotificationSink> {
    selection: Selection<P>,
    dropzone: DropZone,
    gallery: Gallery,
    sink: S,
    on_change: Option<ChangeCallback>,
}

impl<P: PreviewStore, S: NotificationSink> MediaManager<P, S> {
    pub fn new(config: UploadConfig, previews: P, sink: S) -> Result<Self, ConfigError> {
        let dropzone = DropZone::new(config.disabled);
        Ok(Self {
            selection: Selection::new(config, previews)?,
            dropzone,
            gallery: Gallery::new(),
            sink,
            on_change: None,
        })
    }

    /// Called with the full pending set whenever it changes.
    pub fn on_change(mut self, callback: impl FnMut(&[PendingFile]) + 'static) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &UploadConfig {
        self.selection.config()
    }

    pub fn pending(&self) -> &[PendingFile] {
        self.selection.files()
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn previews(&self) -> &P {
        self.selection.previews()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn drag_state(&self) -> DragState {
        self.dropzone.state()
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Validate and accept a batch from the file picker or a drop.
    ///
    /// Rejections produce exactly one notification for the whole batch.
    pub fn select(&mut self, batch: Vec<Candidate>) -> SelectOutcome {
        if self.config().disabled {
            tracing::debug!(count = batch.len(), "selection ignored: widget disabled");
            return SelectOutcome::default();
        }
        let outcome = self.selection.select(batch);
        if !outcome.report.is_empty() {
            self.sink.notify(Notification::Rejected {
                report: outcome.report.clone(),
            });
        }
        if outcome.changed() {
            self.emit_change();
        }
        outcome
    }

    /// Feed a platform drag event to the drop zone.
    pub fn handle_drag(&mut self, event: DragEvent) -> DragOutcome {
        let response = self.dropzone.handle(event);
        let selection = response.dropped.map(|files| self.select(files));
        DragOutcome {
            prevent_default: response.prevent_default,
            selection,
        }
    }

    /// Remove a pending file. Unknown ids are a no-op.
    ///
    /// Any upload in flight for the file will be discarded when it resolves.
    pub fn remove(&mut self, id: FileId) -> bool {
        let removed = self.selection.remove(id).is_some();
        if removed {
            self.emit_change();
        }
        removed
    }

    /// Release every pending file and preview, e.g. when the screen unmounts.
    pub fn teardown(&mut self) {
        let had_files = !self.selection.files().is_empty();
        self.selection.clear();
        if had_files {
            tracing::debug!("tore down pending selection");
            self.emit_change();
        }
    }

    fn emit_change(&mut self) {
        if let Some(callback) = self.on_change.as_mut() {
            callback(self.selection.files());
        }
    }

    // =========================================================================
    // Uploads
    // =========================================================================

    /// Start uploading a local pending file.
    ///
    /// Returns `None` for unknown ids and remote references. Starting again
    /// supersedes the previous attempt's ticket.
    pub fn begin_upload(&mut self, id: FileId) -> Option<UploadTicket> {
        let file = self.selection.get(id)?;
        let FileSource::Local { bytes } = &file.source else {
            return None;
        };
        let request = UploadRequest {
            filename: file.meta.filename.clone(),
            mime_type: file.meta.mime_type.clone(),
            bytes: bytes.clone(),
        };
        let generation = self.selection.start_upload(id)?;
        tracing::debug!(%id, generation, filename = %request.filename, "upload started");
        Some(UploadTicket {
            id,
            generation,
            request,
        })
    }

    /// Apply the backend's answer to an upload.
    pub fn finish_upload(
        &mut self,
        ticket: UploadTicket,
        result: Result<StoredObject, PersistError>,
    ) -> UploadOutcome {
        if !self.selection.is_current(ticket.id, ticket.generation) {
            tracing::debug!(id = %ticket.id, "discarding stale upload result");
            return UploadOutcome::Discarded;
        }
        match result {
            Ok(stored) => {
                let request = ticket.request;
                let appended = self
                    .gallery
                    .append(stored, &request.filename, &request.mime_type)
                    .cloned();
                self.selection.remove(ticket.id);
                self.emit_change();
                match appended {
                    Ok(item) => {
                        tracing::info!(item = %item.id, position = item.position, "upload committed");
                        UploadOutcome::Committed(item)
                    }
                    Err(err) => {
                        self.sink.notify(Notification::OrderOutOfDate);
                        UploadOutcome::NeedsRefresh(err)
                    }
                }
            }
            Err(err) => {
                self.selection.mark_failed(ticket.id);
                self.sink.notify(Notification::UploadFailed {
                    filename: ticket.request.filename,
                    reason: err.to_string(),
                });
                UploadOutcome::Failed(err)
            }
        }
    }

    /// Upload every local pending file through `backend`, in selection order.
    pub fn upload_all(&mut self, backend: &mut impl Backend) -> Vec<UploadOutcome> {
        let ids: Vec<FileId> = self.pending().iter().map(|f| f.id).collect();
        let mut outcomes = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(ticket) = self.begin_upload(id) else {
                continue;
            };
            let result = backend.upload(&ticket.request);
            outcomes.push(self.finish_upload(ticket, result));
        }
        outcomes
    }

    // =========================================================================
    // Gallery
    // =========================================================================

    /// Install the canonical collection fetched from the server.
    pub fn load_gallery(&mut self, items: Vec<GalleryItem>) -> Result<(), GalleryError> {
        self.gallery.load(items)
    }

    pub fn delete_item(&mut self, id: &ItemId) -> Option<GalleryItem> {
        self.gallery.delete(id)
    }

    /// Apply a user drag-reorder locally.
    ///
    /// A non-permutation is a caller bug, not a user error: it is logged and
    /// returned, with no notification and no state change.
    pub fn reorder(&mut self, order: &[ItemId]) -> Result<ReorderTicket, GalleryError> {
        self.gallery.propose_reorder(order).inspect_err(|err| {
            tracing::warn!("reorder refused: {err}");
        })
    }

    /// Apply the backend's answer to a reorder.
    pub fn finish_reorder(
        &mut self,
        ticket: ReorderTicket,
        result: Result<(), PersistError>,
    ) -> ReorderOutcome {
        let reason = result.as_ref().err().map(|e| e.to_string());
        let outcome = self.gallery.resolve_reorder(ticket, result);
        match outcome {
            ReorderOutcome::Committed => tracing::info!("gallery order saved"),
            ReorderOutcome::RolledBack { refresh: false } => {
                self.sink.notify(Notification::ReorderFailed {
                    reason: reason.unwrap_or_default(),
                });
            }
            ReorderOutcome::RolledBack { refresh: true }
            | ReorderOutcome::Stale { refresh: true } => {
                self.sink.notify(Notification::OrderOutOfDate);
            }
            ReorderOutcome::Stale { refresh: false } => {
                tracing::debug!("discarding stale reorder result");
            }
        }
        outcome
    }

    /// Reorder and persist through `backend` in one step.
    pub fn reorder_with(
        &mut self,
        backend: &mut impl Backend,
        order: &[ItemId],
    ) -> Result<ReorderOutcome, GalleryError> {
        let ticket = self.reorder(order)?;
        let result = backend.persist_positions(ticket.updates());
        Ok(self.finish_reorder(ticket, result))
    }
}
