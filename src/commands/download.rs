use anyhow::{Context, Result};

use docsieve::config::Config;
use docsieve::crawler::{AcquisitionManager, LinkResolver};
use docsieve::storage::ContentStore;
use docsieve::utils::format_bytes;

pub async fn download(config: &Config, count: Option<String>) -> Result<()> {
    let (fetcher, index) = super::open_index(config).await?;

    let Some(count) =
        super::resolve_count(count, config.search.count_policy, index.entries.len()).await?
    else {
        return Ok(());
    };

    let store = ContentStore::new(&config.store.dir);
    let manager = AcquisitionManager::new(
        fetcher,
        LinkResolver::new(&config.source.base_url),
        store,
        &config.acquisition,
    );

    let report = manager
        .acquire_prefix(&index.entries, count)
        .await
        .context("Failed to prepare the content store")?;

    println!("Downloads");
    println!("=========");
    println!("  Store:     {}", config.store.dir.display());
    println!("  Requested: {count}");
    println!("  Stored:    {}", report.stats.stored);
    println!("  Reused:    {}", report.stats.reused);
    println!("  Failed:    {}", report.stats.failed);
    println!("  Size:      {}", format_bytes(report.stats.bytes));

    Ok(())
}
