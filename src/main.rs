use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docsieve::config::Config;

mod commands;

use commands::search::{OutputFormat, SearchParams};

#[derive(Parser)]
#[command(
    name = "docsieve",
    version,
    about = "Downloads the documents listed in an HTML index table and searches them for a term",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); defaults to the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// TOML configuration file (environment variables are used otherwise)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the entries of the index table
    List,

    /// Download the first N documents of the index
    Download {
        /// Number of documents to download (prompted when omitted)
        #[arg(short = 'n', long, allow_hyphen_values = true)]
        count: Option<String>,

        /// Content store directory
        #[arg(short, long)]
        store: Option<PathBuf>,
    },

    /// Download the first N documents and search them for a term
    Search {
        /// Number of documents to process (prompted when omitted)
        #[arg(short = 'n', long, allow_hyphen_values = true)]
        count: Option<String>,

        /// Term to search for (prompted when omitted)
        #[arg(short, long)]
        term: Option<String>,

        /// Content store directory
        #[arg(short, long)]
        store: Option<PathBuf>,

        /// Search the documents already in the store without downloading
        #[arg(long, default_value = "false")]
        offline: bool,

        /// Report format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;

    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, cli.verbose, &config.logging.level)?;

    tracing::info!(index = %config.source.index_url, "docsieve starting");

    tokio::select! {
        result = run(cli.command, config) => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, stopping");
            anyhow::bail!("interrupted");
        }
    }

    tracing::info!("docsieve completed");
    Ok(())
}

async fn run(command: Commands, mut config: Config) -> Result<()> {
    match command {
        Commands::List => {
            tracing::info!("Starting list command");
            commands::list(&config).await
        }

        Commands::Download { count, store } => {
            if let Some(dir) = store {
                config.store.dir = dir;
            }
            tracing::info!(
                count = ?count,
                store = %config.store.dir.display(),
                "Starting download command"
            );
            commands::download(&config, count).await
        }

        Commands::Search {
            count,
            term,
            store,
            offline,
            format,
        } => {
            if let Some(dir) = store {
                config.store.dir = dir;
            }
            tracing::info!(
                count = ?count,
                term = ?term,
                store = %config.store.dir.display(),
                offline = %offline,
                "Starting search command"
            );
            commands::search(
                &config,
                SearchParams {
                    count,
                    term,
                    offline,
                    format,
                },
            )
            .await
        }
    }
}

fn setup_tracing(format: &str, verbose: bool, level: &str) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("docsieve=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("docsieve={level},warn"))?
    };

    // Logs go to stderr; stdout carries the report
    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }

    Ok(())
}
