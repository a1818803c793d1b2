//! Index page fetching and document acquisition
//!
//! This module implements the network half of the pipeline: fetching the
//! index page, resolving document links and downloading a prefix of the
//! listed documents into the content store.

pub mod acquire;
pub mod fetcher;
pub mod url;

use async_trait::async_trait;
use bytes::Bytes;

use crate::parser::{TableExtraction, TableExtractor};
use crate::utils::error::FetchError;

pub use acquire::{AcquisitionManager, AcquisitionReport, AcquisitionStats};
pub use fetcher::DocumentFetcher;
pub use url::LinkResolver;

/// Retrieves the HTML of the index page
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError>;
}

/// Retrieves a document payload
#[async_trait]
pub trait BinaryRetriever: Send + Sync {
    async fn retrieve(&self, url: &str) -> Result<Bytes, FetchError>;
}

/// Fetch the index page and extract its entries
///
/// This is the only fatal step of a run: without the index there is nothing
/// to download or search.
///
/// # Errors
///
/// Returns the `FetchError` of the page fetch
pub async fn load_index(
    fetcher: &dyn PageFetcher,
    index_url: &str,
) -> Result<TableExtraction, FetchError> {
    tracing::info!(url = %index_url, "Fetching index page");

    let html = fetcher.fetch_page(index_url).await?;
    let extraction = TableExtractor::new().extract(&html);

    tracing::info!(
        entries = extraction.entries.len(),
        skipped_rows = extraction.anomalies.len(),
        "Index page parsed"
    );

    Ok(extraction)
}
