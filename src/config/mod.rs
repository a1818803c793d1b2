//! Configuration management for docsieve
//!
//! This module handles loading and validating configuration from environment
//! variables, TOML files, and command-line overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::models::CountPolicy;
use crate::search::ExtractorKind;

/// Upper bound for `http.max_retries`
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Index page listing the 2015 superintendence resolutions
pub const DEFAULT_INDEX_URL: &str =
    "https://www.sunat.gob.pe/legislacion/superin/2015/indices/indcor.htm";

/// Prefix that relative document links are appended to
pub const DEFAULT_BASE_URL: &str = "https://www.sunat.gob.pe/legislacion/superin/2015/indices/";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Where the index page lives
    pub source: SourceConfig,

    /// HTTP client configuration
    pub http: HttpConfig,

    /// Download stage configuration
    pub acquisition: AcquisitionConfig,

    /// Content store configuration
    pub store: StoreConfig,

    /// Search stage configuration
    pub search: SearchConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Index page location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// URL of the page holding the document table
    pub index_url: String,

    /// Prefix for relative links found in the table
    pub base_url: String,
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Fixed user agent; a browser pool is rotated when unset
    pub user_agent: Option<String>,

    /// Timeout for a single request in seconds
    pub request_timeout_secs: u64,

    /// Rate limit (requests per second)
    pub requests_per_second: u32,

    /// Retry attempts for retryable failures
    pub max_retries: u32,

    /// Base delay for exponential backoff in milliseconds
    pub retry_base_delay_ms: u64,
}

/// Download stage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Maximum number of documents downloaded at once
    pub max_concurrent_downloads: usize,

    /// Budget for one document including retries, in seconds
    pub document_timeout_secs: u64,

    /// Reuse documents already present in the store
    pub skip_existing: bool,
}

/// Content store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding downloaded documents
    pub dir: PathBuf,
}

/// Search stage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of documents extracted at once
    pub max_concurrent_extractions: usize,

    /// How a non-numeric document count is treated
    pub count_policy: CountPolicy,

    /// Text extractor for stored documents
    pub extractor: ExtractorKind,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            index_url: DEFAULT_INDEX_URL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            request_timeout_secs: 30,
            requests_per_second: 5,
            max_retries: 3,
            retry_base_delay_ms: 500,
        }
    }
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            max_concurrent_downloads: 8,
            document_timeout_secs: 120,
            skip_existing: false,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("documentos_pdfs"),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_extractions: 4,
            count_policy: CountPolicy::Strict,
            extractor: ExtractorKind::Pdf,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("DOCSIEVE_INDEX_URL") {
            config.source.index_url = v;
        }
        if let Ok(v) = std::env::var("DOCSIEVE_BASE_URL") {
            config.source.base_url = v;
        }

        config.http.user_agent = std::env::var("DOCSIEVE_USER_AGENT").ok();
        config.http.request_timeout_secs =
            env_parse("DOCSIEVE_REQUEST_TIMEOUT")?.unwrap_or(config.http.request_timeout_secs);
        config.http.requests_per_second =
            env_parse("DOCSIEVE_RATE_LIMIT")?.unwrap_or(config.http.requests_per_second);
        config.http.max_retries =
            env_parse("DOCSIEVE_MAX_RETRIES")?.unwrap_or(config.http.max_retries);

        config.acquisition.max_concurrent_downloads = env_parse("DOCSIEVE_MAX_CONCURRENT_DOWNLOADS")?
            .unwrap_or(config.acquisition.max_concurrent_downloads);
        config.acquisition.document_timeout_secs = env_parse("DOCSIEVE_DOCUMENT_TIMEOUT")?
            .unwrap_or(config.acquisition.document_timeout_secs);
        config.acquisition.skip_existing =
            env_parse("DOCSIEVE_SKIP_EXISTING")?.unwrap_or(config.acquisition.skip_existing);

        if let Ok(v) = std::env::var("DOCSIEVE_STORE_DIR") {
            config.store.dir = PathBuf::from(v);
        }

        config.search.max_concurrent_extractions = env_parse("DOCSIEVE_MAX_CONCURRENT_EXTRACTIONS")?
            .unwrap_or(config.search.max_concurrent_extractions);
        if let Ok(v) = std::env::var("DOCSIEVE_COUNT_POLICY") {
            config.search.count_policy = v
                .parse()
                .map_err(|e: String| anyhow::anyhow!("DOCSIEVE_COUNT_POLICY: {e}"))?;
        }
        if let Ok(v) = std::env::var("DOCSIEVE_EXTRACTOR") {
            config.search.extractor = v
                .parse()
                .map_err(|e: String| anyhow::anyhow!("DOCSIEVE_EXTRACTOR: {e}"))?;
        }

        if let Ok(v) = std::env::var("DOCSIEVE_LOG_LEVEL") {
            config.logging.level = v;
        }
        if let Ok(v) = std::env::var("DOCSIEVE_LOG_FORMAT") {
            config.logging.format = v;
        }

        Ok(config)
    }

    /// Load configuration from a TOML file; missing keys take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load from `path` when given, from the environment otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::from_env()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.source.index_url)
            .with_context(|| format!("index_url is not a valid URL: {}", self.source.index_url))?;
        Url::parse(&self.source.base_url)
            .with_context(|| format!("base_url is not a valid URL: {}", self.source.base_url))?;

        if self.http.requests_per_second == 0 {
            anyhow::bail!("requests_per_second must be greater than 0");
        }

        if self.http.max_retries > MAX_RETRIES_LIMIT {
            anyhow::bail!("max_retries must be at most {MAX_RETRIES_LIMIT}");
        }

        if self.acquisition.max_concurrent_downloads == 0 {
            anyhow::bail!("max_concurrent_downloads must be greater than 0");
        }

        if self.acquisition.document_timeout_secs == 0 {
            anyhow::bail!("document_timeout_secs must be greater than 0");
        }

        if self.search.max_concurrent_extractions == 0 {
            anyhow::bail!("max_concurrent_extractions must be greater than 0");
        }

        if self.store.dir.as_os_str().is_empty() {
            anyhow::bail!("store.dir must not be empty");
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.http.request_timeout_secs)
    }

    /// Get per-document download budget as Duration
    #[must_use]
    pub fn document_timeout(&self) -> Duration {
        Duration::from_secs(self.acquisition.document_timeout_secs)
    }
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{key}={raw:?}: {e}")),
        Err(_) => Ok(None),
    }
}
