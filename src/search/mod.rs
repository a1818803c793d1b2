//! Document search
//!
//! Extracts the text of each stored document and scans it for a literal
//! term. The engine knows nothing about downloads: it finds documents purely
//! by name in the content store, so it can run again over an existing store
//! without fetching anything. Extractions run concurrently, but outcomes are
//! always returned in entry order.

pub mod extract;
pub mod matcher;

use futures::stream::{self, StreamExt};
use std::sync::Arc;

use crate::crawler::AcquisitionReport;
use crate::error::DocsieveErrorTrait;
use crate::models::{AcquisitionResult, Entry, SearchOutcome, SearchStatus, SearchSummary};
use crate::storage::ContentStore;
use crate::utils::error::ExtractError;

pub use extract::{
    AutoExtractor, ExtractorKind, PdfTextExtractor, PlainTextExtractor, TextExtractor,
};
pub use matcher::matching_lines;

/// Searches stored documents for a term
pub struct SearchEngine {
    store: ContentStore,
    extractor: Arc<dyn TextExtractor>,
    max_concurrent: usize,
}

impl SearchEngine {
    pub fn new(store: ContentStore, extractor: Arc<dyn TextExtractor>, max_concurrent: usize) -> Self {
        Self {
            store,
            extractor,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Search every entry in `entries` for `term`
    ///
    /// When `acquisition` is given it must be aligned with `entries`; entries
    /// whose download failed are reported as such and not searched.
    pub async fn search<'a>(
        &self,
        entries: &'a [Entry],
        term: &str,
        acquisition: Option<&AcquisitionReport>,
    ) -> Vec<SearchOutcome<'a>> {
        tracing::info!(
            documents = entries.len(),
            term = %term,
            max_concurrent = self.max_concurrent,
            "Searching documents"
        );

        let mut outcomes: Vec<SearchOutcome<'a>> = stream::iter(entries.iter().enumerate())
            .map(|(index, entry)| async move {
                let failed = acquisition.and_then(|report| match report.result(index) {
                    Some(AcquisitionResult::Failed(e)) => Some(e.to_string()),
                    _ => None,
                });

                let status = match failed {
                    Some(reason) => {
                        tracing::debug!(entry = %entry.name, "Skipping search, download failed");
                        SearchStatus::DownloadFailed { reason }
                    }
                    None => self.search_one(entry, term).await,
                };

                SearchOutcome {
                    index,
                    entry,
                    status,
                }
            })
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        outcomes.sort_by_key(|outcome| outcome.index);

        let summary = SearchSummary::from_outcomes(&outcomes);
        tracing::info!(
            matched = summary.matched,
            no_match = summary.no_match,
            missing = summary.file_missing,
            download_failed = summary.download_failed,
            extract_failed = summary.extract_failed,
            "Search completed"
        );

        outcomes
    }

    /// Search a single entry's document
    pub async fn search_one(&self, entry: &Entry, term: &str) -> SearchStatus {
        if !self.store.exists(&entry.document_name).await {
            tracing::warn!(
                entry = %entry.name,
                path = %self.store.root().join(&entry.document_name).display(),
                "Document file does not exist"
            );
            return SearchStatus::FileMissing;
        }

        let text = match self.extract(&entry.document_name).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    entry = %entry.name,
                    document = %entry.document_name,
                    error = %e,
                    category = e.category().as_str(),
                    "Text extraction failed"
                );
                return SearchStatus::ExtractFailed {
                    reason: e.to_string(),
                };
            }
        };

        match matching_lines(&text, term) {
            Some(lines) => SearchStatus::Matched {
                lines: lines.into_iter().map(str::to_string).collect(),
            },
            None => {
                tracing::debug!(document = %entry.document_name, "No match");
                SearchStatus::NoMatch
            }
        }
    }

    async fn extract(&self, document_name: &str) -> Result<String, ExtractError> {
        let bytes = self.store.read(document_name).await?;
        let extractor = Arc::clone(&self.extractor);

        tokio::task::spawn_blocking(move || extractor.extract_text(&bytes))
            .await
            .map_err(|e| {
                if e.is_panic() {
                    ExtractError::Aborted(extract::panic_message(e.into_panic().as_ref()))
                } else {
                    ExtractError::Aborted(e.to_string())
                }
            })?
    }
}
