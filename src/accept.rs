//! Accepted-type lists for upload widgets.
//!
//! Widgets describe what they take with the same comma-separated syntax as an
//! HTML `accept` attribute. Each entry is one of:
//!
//! - `image/png` → exact MIME match
//! - `image/*` → any subtype of `image`
//! - `.pdf` → filename extension match
//! - `*` or `*/*` → anything
//!
//! Matching is case-insensitive. An empty list accepts every file.
//!
//! ```text
//! "image/*, application/pdf, .svg"
//!   → [Wildcard("image"), Exact("application/pdf"), Extension("svg")]
//! ```

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AcceptError {
    #[error("invalid accepted type pattern: {0:?}")]
    InvalidPattern(String),
}

/// One entry of an accepted-type list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptPattern {
    Any,
    /// Full `type/subtype`, lowercased.
    Exact(String),
    /// Top-level type of a `type/*` entry, lowercased.
    Wildcard(String),
    /// Extension without the leading dot, lowercased.
    Extension(String),
}

impl AcceptPattern {
    fn parse(raw: &str) -> Result<Self, AcceptError> {
        let entry = raw.trim().to_ascii_lowercase();
        if entry == "*" || entry == "*/*" {
            return Ok(Self::Any);
        }
        if let Some(ext) = entry.strip_prefix('.') {
            if ext.is_empty() || ext.contains(['/', '.']) {
                return Err(AcceptError::InvalidPattern(raw.trim().to_string()));
            }
            return Ok(Self::Extension(ext.to_string()));
        }
        match entry.split_once('/') {
            Some((top, "*")) if is_token(top) => Ok(Self::Wildcard(top.to_string())),
            Some((top, sub)) if is_token(top) && is_token(sub) => Ok(Self::Exact(entry)),
            _ => Err(AcceptError::InvalidPattern(raw.trim().to_string())),
        }
    }

    /// `mime` and `filename` are compared case-insensitively.
    pub fn matches(&self, mime: &str, filename: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(expected) => essence(mime) == *expected,
            Self::Wildcard(top) => essence(mime)
                .split_once('/')
                .is_some_and(|(t, _)| t == top),
            Self::Extension(ext) => extension_of(filename).is_some_and(|e| e == *ext),
        }
    }
}

impl fmt::Display for AcceptPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "*"),
            Self::Exact(mime) => write!(f, "{mime}"),
            Self::Wildcard(top) => write!(f, "{top}/*"),
            Self::Extension(ext) => write!(f, ".{ext}"),
        }
    }
}

/// Parsed accepted-type list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcceptList {
    patterns: Vec<AcceptPattern>,
}

impl AcceptList {
    pub fn patterns(&self) -> &[AcceptPattern] {
        &self.patterns
    }

    /// True when the list is empty or any entry matches.
    pub fn accepts(&self, mime: &str, filename: &str) -> bool {
        self.patterns.is_empty() || self.patterns.iter().any(|p| p.matches(mime, filename))
    }
}

impl FromStr for AcceptList {
    type Err = AcceptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let patterns = s
            .split(',')
            .filter(|entry| !entry.trim().is_empty())
            .map(AcceptPattern::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }
}

impl fmt::Display for AcceptList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.patterns.is_empty() {
            return write!(f, "*");
        }
        let joined: Vec<String> = self.patterns.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", joined.join(","))
    }
}

/// Strip parameters (`; charset=...`) and normalise case.
fn essence(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn extension_of(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "!#$&-^_.+".contains(c))
}

/// Guess a MIME type from a filename's extension.
///
/// Browsers hand us a MIME type with every file; on the command line we only
/// have the path. Unknown extensions fall back to `application/octet-stream`.
pub fn mime_from_filename(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
