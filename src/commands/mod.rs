pub mod download;
pub mod list;
pub mod prompt;
pub mod search;

use anyhow::{Context, Result};
use std::sync::Arc;

use docsieve::config::Config;
use docsieve::crawler::{load_index, DocumentFetcher};
use docsieve::models::{clamp_count, parse_count, CountPolicy};
use docsieve::parser::TableExtraction;
use docsieve::utils::error::InputError;

// Re-export command functions for convenience
pub use download::download;
pub use list::list;
pub use search::search;

/// Build the HTTP fetcher and load the index page
///
/// A failure here ends the run with a non-zero exit status.
pub async fn open_index(config: &Config) -> Result<(Arc<DocumentFetcher>, TableExtraction)> {
    let fetcher =
        Arc::new(DocumentFetcher::new(&config.http).context("Failed to create HTTP client")?);

    let index = load_index(fetcher.as_ref(), &config.source.index_url)
        .await
        .with_context(|| format!("Failed to load index page {}", config.source.index_url))?;

    Ok((fetcher, index))
}

/// Turn the count answer (given or prompted) into a prefix length
///
/// Returns `None` when the answer is rejected; the caller then stops without
/// processing anything.
pub async fn resolve_count(
    answer: Option<String>,
    policy: CountPolicy,
    available: usize,
) -> Result<Option<usize>> {
    let answer = match answer {
        Some(answer) => answer,
        None => prompt::ask(&format!("How many documents to process (0-{available})? "))
            .await
            .context("Failed to read document count")?,
    };

    match parse_count(&answer, policy) {
        Ok(requested) => {
            let count = clamp_count(requested, available);
            tracing::info!(requested, count, available, "Document count resolved");
            Ok(Some(count))
        }
        Err(e @ InputError::InvalidCount(_)) => {
            tracing::error!(error = %e, "Nothing processed");
            eprintln!("Error: {e}");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
