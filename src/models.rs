// Core data structures for docsieve

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use crate::utils::error::{AcquireError, InputError};

/// One row of the index table that carries a document link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Label from the first cell, e.g. "N° 001-2015/SUNAT" (may be empty)
    pub name: String,
    /// Text of the second cell
    pub description: String,
    /// href exactly as found in the markup
    pub link_raw: String,
    /// Final path segment of `link_raw`; file name in the content store
    pub document_name: String,
}

impl Entry {
    /// Build an entry, deriving `document_name` from the link
    ///
    /// Returns `None` when the link has nothing after its last `/`.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        link_raw: impl Into<String>,
    ) -> Option<Self> {
        let link_raw = link_raw.into();
        let document_name = crate::crawler::url::document_name(&link_raw)?.to_string();
        Some(Self {
            name: name.into(),
            description: description.into(),
            link_raw,
            document_name,
        })
    }
}

/// Entries in table row order. Built once, never re-sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntryList {
    entries: Vec<Entry>,
}

impl EntryList {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// First `count` entries, clamped to the list length
    pub fn prefix(&self, count: usize) -> &[Entry] {
        &self.entries[..count.min(self.entries.len())]
    }

    /// Document names shared by more than one entry in `entries`
    ///
    /// Colliding entries overwrite each other in the store; the last writer wins.
    pub fn duplicate_document_names(entries: &[Entry]) -> Vec<String> {
        let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
        for entry in entries {
            *seen.entry(entry.document_name.as_str()).or_default() += 1;
        }

        seen.into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(name, _)| name.to_string())
            .collect()
    }
}

impl<'a> IntoIterator for &'a EntryList {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// How a count answer that is not a whole number is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountPolicy {
    /// Reject with an error message
    #[default]
    Strict,
    /// Treat as zero
    Lenient,
}

impl FromStr for CountPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(format!("unknown count policy {other:?} (strict, lenient)")),
        }
    }
}

/// Parse the user's document count answer
///
/// Negative numbers are accepted here and clamped later by [`clamp_count`].
///
/// # Errors
///
/// Returns `InputError::InvalidCount` for non-integers under [`CountPolicy::Strict`].
pub fn parse_count(input: &str, policy: CountPolicy) -> Result<i64, InputError> {
    match input.trim().parse::<i64>() {
        Ok(n) => Ok(n),
        Err(_) => match policy {
            CountPolicy::Strict => Err(InputError::InvalidCount(input.trim().to_string())),
            CountPolicy::Lenient => {
                tracing::warn!(input = %input.trim(), "Count is not a number, processing 0 documents");
                Ok(0)
            }
        },
    }
}

/// Clamp a requested count into `0..=len`
pub fn clamp_count(requested: i64, len: usize) -> usize {
    if requested <= 0 {
        0
    } else {
        usize::try_from(requested).map_or(len, |n| n.min(len))
    }
}

/// What happened to one entry's download
#[derive(Debug)]
pub enum AcquisitionResult {
    /// Payload written to `path`
    Stored { path: PathBuf, bytes: u64 },
    /// File already present and reused
    Reused { path: PathBuf },
    /// Download or write failed; nothing was left at the target path
    Failed(AcquireError),
}

impl AcquisitionResult {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Per-entry search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchStatus {
    /// Term found; matching lines in document order
    Matched { lines: Vec<String> },
    /// Term absent from the document text
    NoMatch,
    /// No file for this entry in the store
    FileMissing,
    /// Download failed earlier in the same run
    DownloadFailed { reason: String },
    /// Text could not be extracted from the stored file
    ExtractFailed { reason: String },
}

impl SearchStatus {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Matched { .. } => "matched",
            Self::NoMatch => "no_match",
            Self::FileMissing => "file_missing",
            Self::DownloadFailed { .. } => "download_failed",
            Self::ExtractFailed { .. } => "extract_failed",
        }
    }
}

/// Search result bound to the entry it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOutcome<'a> {
    /// Position in the entry list
    pub index: usize,
    pub entry: &'a Entry,
    #[serde(flatten)]
    pub status: SearchStatus,
}

/// Counts of outcomes by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchSummary {
    pub matched: usize,
    pub no_match: usize,
    pub file_missing: usize,
    pub download_failed: usize,
    pub extract_failed: usize,
}

impl SearchSummary {
    pub fn from_outcomes(outcomes: &[SearchOutcome<'_>]) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            match outcome.status {
                SearchStatus::Matched { .. } => summary.matched += 1,
                SearchStatus::NoMatch => summary.no_match += 1,
                SearchStatus::FileMissing => summary.file_missing += 1,
                SearchStatus::DownloadFailed { .. } => summary.download_failed += 1,
                SearchStatus::ExtractFailed { .. } => summary.extract_failed += 1,
            }
        }
        summary
    }
}
