use anyhow::Result;

use docsieve::config::Config;
use docsieve::crawler::LinkResolver;
use docsieve::utils::{collapse_whitespace, truncate_text};

/// Width the description column is cut to
const DESCRIPTION_WIDTH: usize = 60;

pub async fn list(config: &Config) -> Result<()> {
    let (_fetcher, index) = super::open_index(config).await?;
    let resolver = LinkResolver::new(&config.source.base_url);

    println!("Index: {}", config.source.index_url);
    println!("======");

    for (i, entry) in index.entries.iter().enumerate() {
        println!("{:>4}. {}", i + 1, collapse_whitespace(&entry.name));
        println!(
            "      {}",
            truncate_text(&collapse_whitespace(&entry.description), DESCRIPTION_WIDTH)
        );
        println!("      {} <- {}", entry.document_name, resolver.resolve_entry(entry));
    }

    println!();
    println!("Entries:      {}", index.entries.len());
    println!("Table rows:   {}", index.rows);
    println!("Skipped rows: {}", index.anomalies.len());

    for anomaly in &index.anomalies {
        tracing::debug!(%anomaly, "Skipped row");
    }

    Ok(())
}
