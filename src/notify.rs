//! User-facing notifications.
//!
//! The manager never talks to a global toast channel. It is handed a
//! [`NotificationSink`] at construction and pushes at most one notification
//! per triggering event through it.

use crate::selection::ValidationReport;
use serde::Serialize;
use std::fmt;

/// A transient message for the dashboard user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// Some files of a batch were rejected. One per batch.
    Rejected { report: ValidationReport },
    /// An upload failed; the file stays selected for a retry.
    UploadFailed { filename: String, reason: String },
    /// Saving a new order failed and the previous order was restored.
    ReorderFailed { reason: String },
    /// The local order no longer matches the server; reload before editing.
    OrderOutOfDate,
}

impl Notification {
    /// Whether the user can simply try the same action again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UploadFailed { .. } | Self::ReorderFailed { .. })
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected { report } => write!(f, "{report}"),
            Self::UploadFailed { filename, reason } => {
                write!(f, "Upload of {filename} failed: {reason}. Please try again.")
            }
            Self::ReorderFailed { reason } => {
                write!(f, "Could not save the new order: {reason}. Please try again.")
            }
            Self::OrderOutOfDate => {
                write!(f, "The gallery was changed elsewhere. Reload to see the current order.")
            }
        }
    }
}

/// Displays notifications. Fire-and-forget.
pub trait NotificationSink {
    fn notify(&mut self, notification: Notification);
}

impl<F: FnMut(Notification)> NotificationSink for F {
    fn notify(&mut self, notification: Notification) {
        self(notification)
    }
}

/// Sink that writes every notification to the `tracing` log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&mut self, notification: Notification) {
        let retryable = notification.is_retryable();
        tracing::warn!(retryable, "{notification}");
    }
}
