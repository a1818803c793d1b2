use anyhow::{Context, Result};
use clap::ValueEnum;

use docsieve::config::Config;
use docsieve::crawler::{AcquisitionManager, LinkResolver};
use docsieve::report::{JsonReport, TextReport};
use docsieve::search::SearchEngine;
use docsieve::storage::ContentStore;

/// Report format on stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One block per matching document
    Text,
    /// Every outcome, machine-readable
    Json,
}

/// Parameters for the search command
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub count: Option<String>,
    pub term: Option<String>,
    pub offline: bool,
    pub format: OutputFormat,
}

pub async fn search(config: &Config, params: SearchParams) -> Result<()> {
    let (fetcher, index) = super::open_index(config).await?;

    let Some(count) =
        super::resolve_count(params.count, config.search.count_policy, index.entries.len())
            .await?
    else {
        return Ok(());
    };
    let entries = index.entries.prefix(count);

    let store = ContentStore::new(&config.store.dir);

    let downloads = if params.offline {
        tracing::info!(store = %store.root().display(), "Offline, searching stored documents");
        None
    } else {
        let manager = AcquisitionManager::new(
            fetcher,
            LinkResolver::new(&config.source.base_url),
            store.clone(),
            &config.acquisition,
        );
        let report = manager
            .acquire(entries)
            .await
            .context("Failed to prepare the content store")?;
        Some(report)
    };

    // Asked only once downloads have finished
    let term = match params.term {
        Some(term) => term,
        None => super::prompt::ask("Search term: ")
            .await
            .context("Failed to read search term")?,
    };

    let engine = SearchEngine::new(
        store,
        config.search.extractor.build(),
        config.search.max_concurrent_extractions,
    );
    let outcomes = engine.search(entries, &term, downloads.as_ref()).await;

    match params.format {
        OutputFormat::Text => {
            let rendered = TextReport::new()?.render(&outcomes, &term)?;
            if !rendered.is_empty() {
                print!("{rendered}");
            }
        }
        OutputFormat::Json => {
            println!("{}", JsonReport::new(&term, &outcomes).to_json()?);
        }
    }

    Ok(())
}
