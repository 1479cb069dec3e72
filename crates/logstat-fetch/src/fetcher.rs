//! Log fetchers
//!
//! A [`LogFetcher`] returns the full log content as an ordered sequence of
//! lines. Transport failures are reported as errors; there is no retry.
//!
//! # Examples
//!
//! ```no_run
//! use logstat_fetch::{LogFetcher, fetcher_for};
//! use std::time::Duration;
//!
//! # async fn example() -> logstat_core::Result<()> {
//! let fetcher = fetcher_for("https://example.com/logs/app.log", Duration::from_secs(30))?;
//! let lines = fetcher.fetch_lines().await?;
//! println!("{} lines from {}", lines.len(), fetcher.source());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use logstat_core::error::{LogstatError, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Source of raw log lines
#[async_trait]
pub trait LogFetcher: Send + Sync {
    /// Fetch the whole log, one entry per line, in source order
    async fn fetch_lines(&self) -> Result<Vec<String>>;

    /// Where the log comes from, for display
    fn source(&self) -> &str;
}

fn split_lines(body: &str) -> Vec<String> {
    body.lines().map(str::to_string).collect()
}

/// Fetches a log over HTTP(S)
pub struct HttpLogFetcher {
    url: String,
    client: reqwest::Client,
}

impl HttpLogFetcher {
    /// Create a fetcher with a whole-request timeout
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl LogFetcher for HttpLogFetcher {
    async fn fetch_lines(&self) -> Result<Vec<String>> {
        debug!("Requesting {}", self.url);
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LogstatError::Fetch {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let lines = split_lines(&body);
        info!("Fetched {} lines ({} bytes) from {}", lines.len(), body.len(), self.url);
        Ok(lines)
    }

    fn source(&self) -> &str {
        &self.url
    }
}

/// Reads a log from the local filesystem
pub struct FileLogFetcher {
    source: String,
    path: PathBuf,
}

impl FileLogFetcher {
    /// Create a fetcher for a path or a `file://` URL
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let path = PathBuf::from(source.strip_prefix("file://").unwrap_or(&source));
        Self { source, path }
    }
}

#[async_trait]
impl LogFetcher for FileLogFetcher {
    async fn fetch_lines(&self) -> Result<Vec<String>> {
        debug!("Reading {}", self.path.display());
        let body = tokio::fs::read_to_string(&self.path).await?;
        let lines = split_lines(&body);
        info!("Read {} lines from {}", lines.len(), self.path.display());
        Ok(lines)
    }

    fn source(&self) -> &str {
        &self.source
    }
}

/// Pick a fetcher for the source: HTTP(S) URLs go over the network,
/// anything else is read from disk.
pub fn fetcher_for(source: &str, timeout: Duration) -> Result<Box<dyn LogFetcher>> {
    let lower = source.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Ok(Box::new(HttpLogFetcher::new(source, timeout)?))
    } else if source.trim().is_empty() {
        Err(LogstatError::InvalidArgument("log source is empty".to_string()))
    } else {
        Ok(Box::new(FileLogFetcher::new(source)))
    }
}
