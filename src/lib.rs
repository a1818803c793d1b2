//! docsieve - document index scraper and term search
//!
//! Reads an HTML table listing downloadable documents, downloads the first
//! N of them concurrently into a local directory, extracts their text and
//! reports the lines that contain a search term.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`crawler`] - Index fetching, link resolution and document downloads
//! - [`parser`] - Extraction of entries from the index table
//! - [`models`] - Core data structures and types
//! - [`storage`] - Content store for downloaded documents
//! - [`search`] - Text extraction and term matching
//! - [`report`] - Text and JSON rendering of search outcomes
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use docsieve::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let fetcher = Arc::new(DocumentFetcher::new(&config.http)?);
//!
//!     let index = load_index(fetcher.as_ref(), &config.source.index_url).await?;
//!     let store = ContentStore::new(&config.store.dir);
//!     let manager = AcquisitionManager::new(
//!         fetcher,
//!         LinkResolver::new(&config.source.base_url),
//!         store.clone(),
//!         &config.acquisition,
//!     );
//!
//!     let entries = index.entries.prefix(5);
//!     let downloads = manager.acquire(entries).await?;
//!
//!     let engine = SearchEngine::new(store, config.search.extractor.build(), 4);
//!     let outcomes = engine.search(entries, "IGV", Some(&downloads)).await;
//!     print!("{}", TextReport::new()?.render(&outcomes, "IGV")?);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crawler;
pub mod error;
pub mod models;
pub mod parser;
pub mod report;
pub mod search;
pub mod storage;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::crawler::{
        load_index, AcquisitionManager, AcquisitionReport, DocumentFetcher, LinkResolver,
    };
    pub use crate::error::{DocsieveErrorTrait, Error, ErrorCategory, Result};
    pub use crate::models::{
        clamp_count, parse_count, AcquisitionResult, CountPolicy, Entry, EntryList,
        SearchOutcome, SearchStatus, SearchSummary,
    };
    pub use crate::parser::{TableExtraction, TableExtractor};
    pub use crate::report::{JsonReport, TextReport};
    pub use crate::search::{
        AutoExtractor, ExtractorKind, PdfTextExtractor, SearchEngine, TextExtractor,
    };
    pub use crate::storage::ContentStore;
}

// Direct re-exports for convenience
pub use models::{Entry, EntryList, SearchOutcome, SearchStatus};
