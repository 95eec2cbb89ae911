//! HTTP fetcher implementation
//!
//! This module retrieves a single magazine page and hands its markup to the
//! parser. It handles:
//! - Building the shared HTTP client with a browser identity
//! - Rejecting URLs outside the accepted source prefix before any request
//! - Classifying transport failures and non-success responses
//! - Abandoning the request as soon as the scrape context is cancelled

use crate::config::{ClientConfig, Config, SourceConfig};
use crate::crawler::context::ScrapeContext;
use crate::crawler::parser::{extract_records, ArticleSelectors};
use crate::record::Record;
use crate::ScrapeError;
use chrono::Utc;
use reqwest::{redirect::Policy, Client};
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// `reqwest::Client` is internally reference counted and safe to share
/// between concurrent fetches.
///
/// # Example
///
/// ```no_run
/// use magazine_harvester::config::ClientConfig;
/// use magazine_harvester::crawler::build_http_client;
///
/// let client = build_http_client(&ClientConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &ClientConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.request_timeout)
        .connect_timeout(config.connect_timeout)
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches magazine pages and extracts their article records
///
/// A `PageFetcher` holds no per-call state: every [`fetch`](Self::fetch)
/// parses into its own document and record buffer, so one instance can
/// serve any number of concurrent calls.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    url_prefix: String,
    selectors: ArticleSelectors,
}

impl PageFetcher {
    /// Creates a fetcher around an existing client
    pub fn new(client: Client, source: &SourceConfig) -> Result<Self, ScrapeError> {
        Ok(Self {
            client,
            url_prefix: source.url_prefix.clone(),
            selectors: ArticleSelectors::compile(source)?,
        })
    }

    /// Creates a fetcher and its HTTP client from the full configuration
    pub fn from_config(config: &Config) -> Result<Self, ScrapeError> {
        let client = build_http_client(&config.client)?;
        Self::new(client, &config.source)
    }

    /// The scheme+host prefix every page URL must start with
    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Checks that `url` belongs to the accepted source
    ///
    /// Performs no I/O.
    pub fn validate(&self, url: &str) -> Result<Url, ScrapeError> {
        if !url.starts_with(&self.url_prefix) {
            return Err(ScrapeError::InvalidInput {
                url: url.to_string(),
            });
        }

        Url::parse(url).map_err(|_| ScrapeError::InvalidInput {
            url: url.to_string(),
        })
    }

    /// Fetches one page and extracts its records
    ///
    /// # Request Flow
    ///
    /// 1. Validate the URL against the source prefix (no request on failure)
    /// 2. Send a single GET; discovered links are never followed
    /// 3. Parse the body and extract article blocks
    ///
    /// # Errors
    ///
    /// | Condition | Error |
    /// |-----------|-------|
    /// | URL outside the source prefix | `InvalidInput` |
    /// | Transport failure or non-2xx status | `FetchFailed` |
    /// | Context cancelled at any point | `Cancelled` |
    ///
    /// A cancelled fetch never returns partial records.
    pub async fn fetch(&self, ctx: &ScrapeContext, url: &str) -> Result<Vec<Record>, ScrapeError> {
        let page_url = self.validate(url)?;

        if ctx.is_cancelled() {
            return Err(ctx.cancelled_error());
        }

        let body = tokio::select! {
            biased;
            _ = ctx.cancelled() => return Err(ctx.cancelled_error()),
            body = self.download(&page_url) => body?,
        };

        let records = extract_records(&body, &page_url, &self.selectors, Utc::now());

        if ctx.is_cancelled() {
            return Err(ctx.cancelled_error());
        }

        tracing::debug!("Extracted {} articles from {}", records.len(), url);

        Ok(records)
    }

    /// Sends the GET request and reads the body as text
    async fn download(&self, page_url: &Url) -> Result<String, ScrapeError> {
        let fetch_failed = |source: reqwest::Error| ScrapeError::FetchFailed {
            url: page_url.to_string(),
            source,
        };

        let response = self
            .client
            .get(page_url.clone())
            .send()
            .await
            .map_err(fetch_failed)?
            .error_for_status()
            .map_err(fetch_failed)?;

        response.text().await.map_err(fetch_failed)
    }
}
