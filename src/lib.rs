//! # Folio Media
//!
//! The upload and ordered-gallery manager behind the portfolio admin
//! dashboard. Project and experience screens mount one manager per upload
//! widget: it validates what the user picks or drops, keeps preview handles
//! alive exactly as long as they are needed, resolves uploads into gallery
//! items, and keeps the gallery in a dense, user-controlled order.
//!
//! # Architecture: One Event at a Time
//!
//! ```text
//! picker / drop zone ─▶ select ─▶ Selection (pending files + previews)
//!                                     │ begin_upload / finish_upload
//!                                     ▼
//!                         Gallery (dense positions) ◀─ reorder / load / delete
//!                                     │
//!                         NotificationSink, Backend (injected)
//! ```
//!
//! Every mutation goes through `&mut MediaManager`, so events are serialized
//! in arrival order. Results that arrive late, from uploads or reorders,
//! carry a ticket and are checked against the current state before they are
//! applied.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`manager`] | [`MediaManager`](manager::MediaManager): the façade a screen mounts |
//! | [`selection`] | Validation, replacement, removal, preview ownership |
//! | [`dropzone`] | Drag-and-drop state machine |
//! | [`gallery`] | Ordered gallery, optimistic reorder with rollback, tab filters |
//! | [`accept`] | `image/*,.pdf` accepted-type lists |
//! | [`config`] | `uploads.toml` loading, merging and validation |
//! | [`preview`] | Preview-handle capability and in-memory store |
//! | [`notify`] | Notification capability and `tracing` sink |
//! | [`backend`] | Storage/database capability |
//! | [`types`] | Pending files, gallery items, ids |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Capabilities, Not Singletons
//!
//! The toast channel, the preview store and the backend are passed in as
//! trait implementations. Tests swap in recording fakes; the CLI uses
//! [`MemoryPreviews`](preview::MemoryPreviews) and
//! [`TracingSink`](notify::TracingSink).
//!
//! ## One Notification per Batch
//!
//! A drop of twenty files with five bad ones produces one aggregated report,
//! not five toasts. Valid files in the batch are still accepted.
//!
//! ## Fail Closed on Ordering Conflicts
//!
//! When the server reports a conflicting change, or the gallery changed while
//! a reorder was being saved, the manager does not try to merge orders. It
//! restores what it safely can and asks for the canonical order to be
//! reloaded.

pub mod accept;
pub mod backend;
pub mod config;
pub mod dropzone;
pub mod gallery;
pub mod manager;
pub mod notify;
pub mod output;
pub mod preview;
pub mod selection;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
