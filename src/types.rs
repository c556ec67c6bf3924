//! Shared types for pending uploads and persisted gallery items.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Locally generated identifier of a pending file.
///
/// Stable for as long as the file stays selected; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId(Uuid);

impl FileId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server-assigned key of a gallery item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Original filename, size and MIME type of a selected file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub filename: String,
    pub size: u64,
    pub mime_type: String,
}

/// Where a pending file's bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// Freshly selected from the user's machine.
    Local { bytes: Vec<u8> },
    /// Already stored remotely (e.g. the current avatar).
    Remote { url: String, key: String },
}

impl FileSource {
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local { .. })
    }
}

/// A file offered for selection by a picker or a drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub meta: FileMeta,
    pub source: FileSource,
}

impl Candidate {
    /// A local blob; the size is the blob's length.
    pub fn local(filename: &str, mime_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            meta: FileMeta {
                filename: filename.to_string(),
                size: bytes.len() as u64,
                mime_type: mime_type.to_string(),
            },
            source: FileSource::Local { bytes },
        }
    }

    /// A reference to an object that is already stored.
    pub fn remote(filename: &str, mime_type: &str, size: u64, url: &str, key: &str) -> Self {
        Self {
            meta: FileMeta {
                filename: filename.to_string(),
                size,
                mime_type: mime_type.to_string(),
            },
            source: FileSource::Remote {
                url: url.to_string(),
                key: key.to_string(),
            },
        }
    }
}

/// Revocable, memory-backed display reference for a local file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreviewHandle(pub String);

impl fmt::Display for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Upload progress of a pending file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadStatus {
    #[default]
    Idle,
    Uploading,
    /// Last attempt failed; the file stays selected so it can be retried.
    Failed,
}

/// A selected file awaiting upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub id: FileId,
    pub meta: FileMeta,
    pub source: FileSource,
    /// `None` for remote references.
    pub preview: Option<PreviewHandle>,
    pub status: UploadStatus,
    /// Bumped every time an upload starts, so older results can be told apart.
    pub(crate) generation: u64,
}

impl PendingFile {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Coarse classification used for tab filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Image,
    File,
}

impl Category {
    pub fn from_mime(mime: &str) -> Self {
        if mime.trim().to_ascii_lowercase().starts_with("image/") {
            Self::Image
        } else {
            Self::File
        }
    }
}

/// A persisted asset with a stable display position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub id: ItemId,
    /// Dense rank, 0-based.
    pub position: u32,
    pub category: Category,
    pub filename: String,
    pub url: String,
    pub key: String,
}
