//! HTTP provider shared by every remote call in a fetch run.
//!
//! One [`HttpProvider`] owns a single `reqwest::Client` so the task lookup,
//! artifact listing and download reuse the same connection pool. Nothing here
//! retries: every failure is returned to the caller immediately.

use indicatif::ProgressBar;
use reqwest::{Client, Response};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, trace};

use crate::progress::{ProgressHandler, bytes_progress_bar};
use crate::{Error, Result};

/// Default timeout for connecting and for non-streaming requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Size of the write buffer used when streaming a download to disk.
pub const DOWNLOAD_CHUNK_SIZE: usize = 1024 * 1024;

/// Default `User-Agent` header.
pub const USER_AGENT: &str = concat!("browser-fetcher/", env!("CARGO_PKG_VERSION"));

/// Configuration for the HTTP provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// `User-Agent` sent with every request.
    pub user_agent: String,
    /// Timeout for establishing a connection.
    pub connect_timeout: Duration,
    /// Total timeout for non-streaming requests, and the longest stall tolerated
    /// while reading any response.
    pub request_timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            connect_timeout: DEFAULT_TIMEOUT,
            request_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ProviderConfig {
    /// Use the same timeout for connecting and for whole requests.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self.request_timeout = timeout;
        self
    }
}

/// Per-request options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOptions {
    /// Total deadline for the request, or `None` for no deadline.
    pub timeout: Option<Duration>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

impl RequestOptions {
    /// Options for a streaming body: no total deadline, only the connect timeout applies.
    #[must_use]
    pub const fn streaming() -> Self {
        Self { timeout: None }
    }
}

/// HTTP provider with one persistent client and injected progress reporting.
pub struct HttpProvider {
    client: Client,
    config: ProviderConfig,
    progress: Arc<dyn ProgressHandler>,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HttpProvider {
    /// Create a provider with the given configuration and progress handler.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HttpClient`] if the TLS backend fails to initialize.
    pub fn new(config: ProviderConfig, progress: Arc<dyn ProgressHandler>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.request_timeout)
            .build()
            .map_err(|source| Error::HttpClient { source })?;

        Ok(Self {
            client,
            config,
            progress,
        })
    }

    /// The progress handler this provider reports through.
    #[must_use]
    pub fn progress(&self) -> &dyn ProgressHandler {
        self.progress.as_ref()
    }

    /// Default options for a non-streaming request, honouring the configured timeout.
    #[must_use]
    pub fn request_options(&self) -> RequestOptions {
        RequestOptions {
            timeout: Some(self.config.request_timeout),
        }
    }

    /// Issue a GET and fail on transport errors, timeouts or non-2xx statuses.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Request`] wrapping the underlying transport error.
    pub async fn get(&self, url: &str, options: &RequestOptions) -> Result<Response> {
        self.send(url, options)
            .await
            .map_err(|source| Error::request(url, source))
    }

    /// Issue a GET and read the whole body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Request`] if the request or reading the body fails.
    pub async fn get_bytes(&self, url: &str, options: &RequestOptions) -> Result<Vec<u8>> {
        let response = self.get(url, options).await?;
        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|source| Error::request(url, source))
    }

    /// Stream `url` into `destination`, overwriting it, and return the byte count.
    ///
    /// The progress bar is keyed by the last path segment of the URL. There is no
    /// total deadline, but a stall longer than the request timeout fails the
    /// download. A failure mid-stream leaves the bytes received so far on disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Download`] if the request fails, the destination cannot be
    /// opened, or reading the stream or writing a chunk fails.
    pub async fn download(&self, url: &str, destination: &Path) -> Result<u64> {
        let response = self
            .send(url, &RequestOptions::streaming())
            .await
            .map_err(|source| Error::download(url, destination, source))?;

        let total = response.content_length().unwrap_or(0);
        let name = url.rsplit('/').next().unwrap_or(url);
        debug!(%url, destination = %destination.display(), total, "Downloading");

        let bar = bytes_progress_bar(self.progress(), total, name);
        let result = stream_to_file(response, destination, &bar).await;
        match &result {
            Ok(_) => bar.finish(),
            Err(_) => bar.abandon(),
        }

        result.map_err(|source| Error::download(url, destination, source))
    }

    /// Release the underlying connection pool.
    pub fn close(self) {
        trace!("Closing HTTP session");
        drop(self.client);
    }

    async fn send(&self, url: &str, options: &RequestOptions) -> reqwest::Result<Response> {
        debug!(%url, "URL");

        let mut request = self.client.get(url);
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }

        request.send().await?.error_for_status()
    }
}

async fn stream_to_file(
    mut response: Response,
    destination: &Path,
    bar: &ProgressBar,
) -> std::result::Result<u64, Box<dyn std::error::Error + Send + Sync>> {
    let file = tokio::fs::File::create(destination).await?;
    let mut writer = BufWriter::with_capacity(DOWNLOAD_CHUNK_SIZE, file);
    let copied = copy_chunks(&mut response, &mut writer, bar).await;
    // Flush even on failure so the partial file holds everything received.
    let flushed = writer.flush().await;

    let written = copied?;
    flushed?;
    Ok(written)
}

async fn copy_chunks(
    response: &mut Response,
    writer: &mut BufWriter<tokio::fs::File>,
    bar: &ProgressBar,
) -> std::result::Result<u64, Box<dyn std::error::Error + Send + Sync>> {
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        writer.write_all(&chunk).await?;
        written += chunk.len() as u64;
        bar.inc(chunk.len() as u64);
    }
    Ok(written)
}
