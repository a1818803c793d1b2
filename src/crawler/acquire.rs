//! Document acquisition
//!
//! Downloads a prefix of the entry list into the content store. Downloads
//! run concurrently up to a configured limit; each one is bounded by a
//! timeout and fails on its own without affecting the rest of the batch.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use super::url::LinkResolver;
use super::BinaryRetriever;
use crate::config::AcquisitionConfig;
use crate::error::DocsieveErrorTrait;
use crate::models::{AcquisitionResult, Entry, EntryList};
use crate::storage::ContentStore;
use crate::utils::error::{AcquireError, StoreError};

/// Acquisition counters (thread-safe)
#[derive(Debug, Default)]
pub struct AcquisitionStats {
    /// Downloads attempted
    pub attempted: AtomicU64,

    /// Documents written to the store
    pub stored: AtomicU64,

    /// Documents reused from a previous run
    pub reused: AtomicU64,

    /// Failed downloads
    pub failed: AtomicU64,

    /// Total bytes written
    pub bytes: AtomicU64,
}

impl AcquisitionStats {
    /// Create new stats counter
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_attempt(&self) {
        self.attempted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stored(&self, bytes: u64) {
        self.stored.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_reused(&self) {
        self.reused.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of current stats
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            attempted: self.attempted.load(Ordering::Relaxed),
            stored: self.stored.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of acquisition statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub attempted: u64,
    pub stored: u64,
    pub reused: u64,
    pub failed: u64,
    pub bytes: u64,
}

/// Per-entry results, aligned with the entries passed to [`AcquisitionManager::acquire`]
#[derive(Debug)]
pub struct AcquisitionReport {
    pub results: Vec<AcquisitionResult>,
    pub stats: StatsSnapshot,
}

impl AcquisitionReport {
    /// Result for the entry at `index`
    pub fn result(&self, index: usize) -> Option<&AcquisitionResult> {
        self.results.get(index)
    }
}

/// Downloads documents into the content store
pub struct AcquisitionManager {
    retriever: Arc<dyn BinaryRetriever>,
    resolver: LinkResolver,
    store: ContentStore,
    semaphore: Arc<Semaphore>,
    document_timeout: Duration,
    skip_existing: bool,
}

impl AcquisitionManager {
    pub fn new(
        retriever: Arc<dyn BinaryRetriever>,
        resolver: LinkResolver,
        store: ContentStore,
        config: &AcquisitionConfig,
    ) -> Self {
        Self {
            retriever,
            resolver,
            store,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent_downloads.max(1))),
            document_timeout: Duration::from_secs(config.document_timeout_secs),
            skip_existing: config.skip_existing,
        }
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    /// Download the first `count` entries of `list`
    ///
    /// # Errors
    ///
    /// Returns `StoreError` only if the store directory cannot be created
    pub async fn acquire_prefix(
        &self,
        list: &EntryList,
        count: usize,
    ) -> Result<AcquisitionReport, StoreError> {
        self.acquire(list.prefix(count)).await
    }

    /// Download every entry in `entries`
    ///
    /// One result per entry, in the same order. Individual failures are
    /// logged and recorded, never propagated.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` only if the store directory cannot be created
    pub async fn acquire(&self, entries: &[Entry]) -> Result<AcquisitionReport, StoreError> {
        self.store.ensure().await?;

        for name in EntryList::duplicate_document_names(entries) {
            tracing::warn!(document = %name, "Several entries share this file name; the last download wins");
        }

        tracing::info!(
            documents = entries.len(),
            max_concurrent = self.semaphore.available_permits(),
            "Starting downloads"
        );

        let stats = AcquisitionStats::new();
        let futures = entries
            .iter()
            .map(|entry| self.acquire_one(entry, &stats));
        let results = futures::future::join_all(futures).await;

        let snapshot = stats.snapshot();
        tracing::info!(
            stored = snapshot.stored,
            reused = snapshot.reused,
            failed = snapshot.failed,
            bytes = snapshot.bytes,
            "Downloads completed"
        );

        Ok(AcquisitionReport {
            results,
            stats: snapshot,
        })
    }

    async fn acquire_one(&self, entry: &Entry, stats: &AcquisitionStats) -> AcquisitionResult {
        if self.skip_existing && self.store.exists(&entry.document_name).await {
            tracing::debug!(document = %entry.document_name, "Reusing stored document");
            stats.record_reused();
            return match self.store.path_for(&entry.document_name) {
                Ok(path) => AcquisitionResult::Reused { path },
                Err(e) => AcquisitionResult::Failed(e.into()),
            };
        }

        // The semaphore is never closed, so this always yields a permit
        let _permit = self.semaphore.acquire().await.ok();

        let url = self.resolver.resolve_entry(entry);
        stats.record_attempt();
        tracing::debug!(entry = %entry.name, url = %url, "Downloading");

        match self.download(entry, &url).await {
            Ok(result) => {
                if let AcquisitionResult::Stored { bytes, .. } = &result {
                    stats.record_stored(*bytes);
                }
                result
            }
            Err(e) => {
                stats.record_failure();
                tracing::warn!(
                    entry = %entry.name,
                    document = %entry.document_name,
                    url = %url,
                    error = %e,
                    category = e.category().as_str(),
                    recoverable = e.is_recoverable(),
                    "Download failed"
                );
                AcquisitionResult::Failed(e)
            }
        }
    }

    async fn download(&self, entry: &Entry, url: &str) -> Result<AcquisitionResult, AcquireError> {
        let bytes = tokio::time::timeout(self.document_timeout, self.retriever.retrieve(url))
            .await
            .map_err(|_| AcquireError::Timeout(self.document_timeout))??;

        let path = self.store.write(&entry.document_name, &bytes).await?;

        Ok(AcquisitionResult::Stored {
            path,
            bytes: bytes.len() as u64,
        })
    }
}
