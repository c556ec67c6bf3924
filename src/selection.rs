//! Pending-file selection, validation and removal.
//!
//! [`Selection`] owns the set of files a widget currently holds and every
//! preview handle created for them. Candidates from a picker or a drop go
//! through [`Selection::select`], which checks them in batch order:
//!
//! 1. Count: beyond `max_files` (or beyond the first file of a single-file
//!    widget) the tail of the batch is rejected.
//! 2. Size: `size > max_size` is rejected, never truncated.
//! 3. Type: MIME type or extension must match the accepted list.
//!
//! Rejections never abort the batch. They are collected into one
//! [`ValidationReport`] so the caller can raise a single notification.
//!
//! ## Preview lifecycle
//!
//! A local file gets its preview when it is accepted. The preview is revoked
//! exactly once, on whichever comes first: removal, replacement by a newer
//! single-file selection, commit after upload, or teardown (including drop of
//! the `Selection` itself).

use crate::accept::AcceptList;
use crate::config::{ConfigError, UploadConfig};
use crate::preview::PreviewStore;
use crate::types::{Candidate, FileId, FileSource, PendingFile, UploadStatus};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Why a candidate was not accepted.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectReason {
    #[error("too many files (max {max})")]
    TooManyFiles { max: usize },
    #[error("file is too large ({size} bytes, max {max})")]
    TooLarge { size: u64, max: u64 },
    #[error("unsupported file type {mime_type} (accepted: {accepted})")]
    UnsupportedType { mime_type: String, accepted: String },
}

/// One rejected candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub filename: String,
    pub reason: RejectReason,
}

/// All rejections of one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub rejections: Vec<Rejection>,
}

impl ValidationReport {
    pub fn is_empty(&self) -> bool {
        self.rejections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rejections.len()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rejections.as_slice() {
            [] => write!(f, "All files accepted"),
            [only] => write!(f, "{} was rejected: {}", only.filename, only.reason),
            many => {
                write!(f, "{} files were rejected: ", many.len())?;
                let parts: Vec<String> = many
                    .iter()
                    .map(|r| format!("{} ({})", r.filename, r.reason))
                    .collect();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}

/// Result of one `select` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectOutcome {
    /// Newly accepted files, in batch order.
    pub accepted: Vec<FileId>,
    /// File displaced by a single-file replacement.
    pub replaced: Option<FileId>,
    pub report: ValidationReport,
}

impl SelectOutcome {
    /// Whether the pending set changed.
    pub fn changed(&self) -> bool {
        !self.accepted.is_empty() || self.replaced.is_some()
    }
}

/// The pending files of one mounted widget.
pub struct Selection<P: PreviewStore> {
    config: UploadConfig,
    accept: AcceptList,
    files: Vec<PendingFile>,
    previews: P,
    next_generation: u64,
}

impl<P: PreviewStore> Selection<P> {
    /// Validates `config` once; it is fixed for the selection's lifetime.
    pub fn new(config: UploadConfig, previews: P) -> Result<Self, ConfigError> {
        config.validate()?;
        let accept = config.accept_list()?;
        Ok(Self {
            config,
            accept,
            files: Vec::new(),
            previews,
            next_generation: 0,
        })
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    pub fn files(&self) -> &[PendingFile] {
        &self.files
    }

    pub fn get(&self, id: FileId) -> Option<&PendingFile> {
        self.files.iter().find(|f| f.id == id)
    }

    pub fn previews(&self) -> &P {
        &self.previews
    }

    /// Validate and accept a batch of candidates.
    pub fn select(&mut self, batch: Vec<Candidate>) -> SelectOutcome {
        let mut outcome = SelectOutcome::default();
        let max_files = self.config.effective_max_files();

        for candidate in batch {
            let reason = if self.config.multiple {
                (self.files.len() >= max_files)
                    .then_some(RejectReason::TooManyFiles { max: max_files })
            } else {
                // A single-file widget replaces its file, but only once per batch.
                (!outcome.accepted.is_empty())
                    .then_some(RejectReason::TooManyFiles { max: max_files })
            };
            if let Some(reason) = reason.or_else(|| self.check(&candidate)) {
                tracing::debug!(filename = %candidate.meta.filename, %reason, "rejected file");
                outcome.reject(candidate.meta.filename, reason);
                continue;
            }

            if !self.config.multiple {
                if let Some(old) = self.files.first().map(|f| f.id) {
                    self.remove(old);
                    outcome.replaced = Some(old);
                }
            }
            let id = self.accept_candidate(candidate);
            outcome.accepted.push(id);
        }

        outcome
    }

    fn check(&self, candidate: &Candidate) -> Option<RejectReason> {
        let meta = &candidate.meta;
        if meta.size > self.config.max_size {
            return Some(RejectReason::TooLarge {
                size: meta.size,
                max: self.config.max_size,
            });
        }
        if !self.accept.accepts(&meta.mime_type, &meta.filename) {
            return Some(RejectReason::UnsupportedType {
                mime_type: meta.mime_type.clone(),
                accepted: self.accept.to_string(),
            });
        }
        None
    }

    fn accept_candidate(&mut self, candidate: Candidate) -> FileId {
        let preview = match &candidate.source {
            FileSource::Local { bytes } => Some(self.previews.create(&candidate.meta, bytes)),
            FileSource::Remote { .. } => None,
        };
        let file = PendingFile {
            id: FileId::new(),
            meta: candidate.meta,
            source: candidate.source,
            preview,
            status: UploadStatus::Idle,
            generation: self.bump_generation(),
        };
        tracing::debug!(id = %file.id, filename = %file.meta.filename, "accepted file");
        let id = file.id;
        self.files.push(file);
        id
    }

    fn bump_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    /// Remove a file and release its preview. Unknown ids are a no-op.
    pub fn remove(&mut self, id: FileId) -> Option<PendingFile> {
        let index = self.files.iter().position(|f| f.id == id)?;
        let mut file = self.files.remove(index);
        self.release(&mut file);
        tracing::debug!(%id, "removed file");
        Some(file)
    }

    /// Remove every file and release every preview.
    pub fn clear(&mut self) {
        let mut files = std::mem::take(&mut self.files);
        for file in &mut files {
            self.release(file);
        }
    }

    fn release(&mut self, file: &mut PendingFile) {
        if let Some(handle) = file.preview.take() {
            if let Err(e) = self.previews.revoke(&handle) {
                tracing::warn!(id = %file.id, "{e}");
            }
        }
    }

    /// Mark a file as uploading and return its new generation.
    pub(crate) fn start_upload(&mut self, id: FileId) -> Option<u64> {
        let generation = self.bump_generation();
        let file = self.files.iter_mut().find(|f| f.id == id)?;
        file.generation = generation;
        file.status = UploadStatus::Uploading;
        Some(generation)
    }

    /// Whether `generation` is still the latest upload attempt for `id`.
    pub(crate) fn is_current(&self, id: FileId, generation: u64) -> bool {
        self.get(id).is_some_and(|f| f.generation == generation)
    }

    pub(crate) fn mark_failed(&mut self, id: FileId) {
        if let Some(file) = self.files.iter_mut().find(|f| f.id == id) {
            file.status = UploadStatus::Failed;
        }
    }
}

impl SelectOutcome {
    fn reject(&mut self, filename: String, reason: RejectReason) {
        self.report.rejections.push(Rejection { filename, reason });
    }
}

impl<P: PreviewStore> Drop for Selection<P> {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    const MB: u64 = 1_000_000;

    fn avatar() -> UploadConfig {
        UploadConfig {
            max_files: 1,
            max_size: 2 * MB,
            accepted_types: "image/*".into(),
            multiple: false,
            disabled: false,
        }
    }

    fn gallery(max_files: usize) -> UploadConfig {
        UploadConfig {
            max_files,
            max_size: 2 * MB,
            accepted_types: "image/*,.pdf".into(),
            multiple: true,
            disabled: false,
        }
    }

    #[test]
    fn oversized_file_rejected_then_small_file_accepted() {
        let mut sel = Selection::new(avatar(), RecordingPreviews::new()).unwrap();

        let out = sel.select(vec![jpeg("big.jpg", 3 * MB)]);
        assert!(out.accepted.is_empty());
        assert!(sel.files().is_empty());
        assert_eq!(out.report.len(), 1);
        assert!(matches!(
            out.report.rejections[0].reason,
            RejectReason::TooLarge { size, max } if size == 3 * MB && max == 2 * MB
        ));

        let out = sel.select(vec![png("small.png", MB)]);
        assert_eq!(out.accepted.len(), 1);
        assert!(out.report.is_empty());
        assert_eq!(sel.files().len(), 1);
        assert!(sel.files()[0].preview.is_some());
    }

    #[test]
    fn single_file_selection_replaces_and_revokes_first() {
        let mut sel = Selection::new(avatar(), RecordingPreviews::new()).unwrap();
        let first = sel.select(vec![png("a.png", 10)]).accepted[0];
        let first_handle = sel.files()[0].preview.clone().unwrap();

        let out = sel.select(vec![png("b.png", 10)]);
        assert_eq!(out.replaced, Some(first));
        assert_eq!(sel.files().len(), 1);
        assert_eq!(sel.files()[0].meta.filename, "b.png");

        let ops = sel.previews().ops();
        let revoke_at = ops
            .iter()
            .position(|op| *op == PreviewOp::Revoke(first_handle.clone()))
            .unwrap();
        let create_b = ops
            .iter()
            .position(|op| matches!(op, PreviewOp::Create(name) if name == "b.png"))
            .unwrap();
        assert!(revoke_at < create_b, "old preview must be revoked first: {ops:?}");
    }

    #[test]
    fn single_file_widget_takes_first_valid_of_batch() {
        let mut sel = Selection::new(avatar(), RecordingPreviews::new()).unwrap();
        let out = sel.select(vec![
            jpeg("huge.jpg", 5 * MB),
            png("a.png", 10),
            png("b.png", 10),
        ]);
        assert_eq!(out.accepted.len(), 1);
        assert_eq!(sel.files().len(), 1);
        assert_eq!(sel.files()[0].meta.filename, "a.png");
        assert_eq!(out.report.len(), 2);
        assert!(matches!(
            out.report.rejections[1].reason,
            RejectReason::TooManyFiles { max: 1 }
        ));
    }

    #[test]
    fn batch_over_limit_keeps_earliest() {
        let mut sel = Selection::new(gallery(3), RecordingPreviews::new()).unwrap();
        let batch = (0..5).map(|i| png(&format!("{i}.png"), 10)).collect();
        let out = sel.select(batch);

        assert_eq!(out.accepted.len(), 3);
        let names: Vec<&str> = sel.files().iter().map(|f| f.meta.filename.as_str()).collect();
        assert_eq!(names, vec!["0.png", "1.png", "2.png"]);
        let rejected: Vec<&str> = out
            .report
            .rejections
            .iter()
            .map(|r| r.filename.as_str())
            .collect();
        assert_eq!(rejected, vec!["3.png", "4.png"]);
    }

    #[test]
    fn limit_counts_files_already_selected() {
        let mut sel = Selection::new(gallery(2), RecordingPreviews::new()).unwrap();
        sel.select(vec![png("a.png", 10)]);
        let out = sel.select(vec![png("b.png", 10), png("c.png", 10)]);
        assert_eq!(out.accepted.len(), 1);
        assert_eq!(out.report.len(), 1);
        assert_eq!(sel.files().len(), 2);
    }

    #[test]
    fn mixed_batch_aggregates_all_rejections() {
        let mut sel = Selection::new(gallery(10), RecordingPreviews::new()).unwrap();
        let out = sel.select(vec![
            png("ok.png", 10),
            Candidate::local("clip.mp4", "video/mp4", vec![0; 10]),
            jpeg("huge.jpg", 3 * MB),
            Candidate::local("cv.pdf", "application/octet-stream", vec![0; 10]),
        ]);
        assert_eq!(out.accepted.len(), 2);
        assert_eq!(out.report.len(), 2);
        assert!(matches!(
            &out.report.rejections[0].reason,
            RejectReason::UnsupportedType { mime_type, .. } if mime_type == "video/mp4"
        ));
    }

    #[test]
    fn remote_reference_has_no_preview() {
        let mut sel = Selection::new(avatar(), RecordingPreviews::new()).unwrap();
        sel.select(vec![Candidate::remote(
            "me.jpg",
            "image/jpeg",
            1000,
            "https://cdn.example/me.jpg",
            "avatars/me.jpg",
        )]);
        assert_eq!(sel.files()[0].preview, None);
        assert!(sel.previews().ops().is_empty());
    }

    #[test]
    fn remove_revokes_exactly_once_and_is_idempotent() {
        let mut sel = Selection::new(gallery(5), RecordingPreviews::new()).unwrap();
        let id = sel.select(vec![png("a.png", 10)]).accepted[0];

        assert!(sel.remove(id).is_some());
        assert!(sel.remove(id).is_none());
        assert_eq!(sel.previews().revoke_count(), 1);
        assert!(sel.files().is_empty());
    }

    #[test]
    fn drop_revokes_every_remaining_preview() {
        let previews = RecordingPreviews::new();
        let log = previews.log();
        {
            let mut sel = Selection::new(gallery(5), previews).unwrap();
            let a = sel.select(vec![png("a.png", 10), png("b.png", 10)]).accepted[0];
            sel.remove(a);
        }
        let ops = log.borrow();
        let revokes = ops.iter().filter(|op| matches!(op, PreviewOp::Revoke(_))).count();
        assert_eq!(revokes, 2);
    }

    #[test]
    fn clear_then_drop_does_not_double_revoke() {
        let previews = RecordingPreviews::new();
        let log = previews.log();
        {
            let mut sel = Selection::new(gallery(5), previews).unwrap();
            sel.select(vec![png("a.png", 10)]);
            sel.clear();
        }
        let revokes = log
            .borrow()
            .iter()
            .filter(|op| matches!(op, PreviewOp::Revoke(_)))
            .count();
        assert_eq!(revokes, 1);
    }

    #[test]
    fn report_display() {
        let one = ValidationReport {
            rejections: vec![Rejection {
                filename: "a.mp4".into(),
                reason: RejectReason::TooManyFiles { max: 1 },
            }],
        };
        assert_eq!(one.to_string(), "a.mp4 was rejected: too many files (max 1)");
        assert_eq!(ValidationReport::default().to_string(), "All files accepted");
    }

    #[test]
    fn invalid_config_is_refused() {
        let config = UploadConfig {
            accepted_types: "nonsense".into(),
            ..gallery(3)
        };
        assert!(Selection::new(config, RecordingPreviews::new()).is_err());
    }
}
