//! Scrape coordinator - main orchestration logic
//!
//! This module ties the scrape together:
//! - Validating the input batch
//! - Deriving a deadline-bound context for the whole invocation
//! - Running one rate-limited fetch task per URL under the concurrency bound
//! - Collecting records and summarizing failures

use crate::config::{validate_scrape_config, Config, ScrapeConfig};
use crate::crawler::aggregator::ResultAggregator;
use crate::crawler::context::ScrapeContext;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::rate_limiter::RateLimiter;
use crate::crawler::task_group::TaskGroup;
use crate::record::{Record, TaskOutcome};
use crate::ScrapeError;
use std::sync::Arc;
use std::time::Instant;

/// Expected articles per page, used to size the result buffer
const ARTICLES_PER_PAGE_HINT: usize = 10;

/// Records collected by a scrape plus the first failure, if any
///
/// `error == None` means every URL succeeded. An error alongside
/// non-empty `records` is a partial success; the caller decides whether
/// that is acceptable.
#[derive(Debug)]
pub struct ScrapeOutcome {
    pub records: Vec<Record>,
    pub error: Option<ScrapeError>,
}

impl ScrapeOutcome {
    /// An outcome with no records and the given error
    pub fn failed(error: ScrapeError) -> Self {
        Self {
            records: Vec::new(),
            error: Some(error),
        }
    }

    /// True when every URL was scraped successfully
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// True when some records were collected but at least one URL failed
    pub fn is_partial(&self) -> bool {
        self.error.is_some() && !self.records.is_empty()
    }

    /// Converts to a `Result`, discarding records when any URL failed
    pub fn into_result(self) -> Result<Vec<Record>, ScrapeError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.records),
        }
    }
}

/// Main scrape coordinator structure
///
/// The coordinator owns the validated [`ScrapeConfig`] and a shared
/// [`PageFetcher`]. Rate limiter and result buffer are created fresh for
/// every [`scrape_urls`](Self::scrape_urls) call, so concurrent invocations
/// never share a budget.
#[derive(Debug, Clone)]
pub struct ScrapeOrchestrator {
    config: ScrapeConfig,
    fetcher: Arc<PageFetcher>,
}

impl ScrapeOrchestrator {
    /// Creates a new orchestrator
    ///
    /// # Errors
    ///
    /// Returns `ScrapeError::Config` if the scrape configuration is invalid.
    pub fn new(config: ScrapeConfig, fetcher: PageFetcher) -> Result<Self, ScrapeError> {
        validate_scrape_config(&config)?;

        Ok(Self {
            config,
            fetcher: Arc::new(fetcher),
        })
    }

    /// Creates an orchestrator, HTTP client included, from the full configuration
    pub fn from_config(config: &Config) -> Result<Self, ScrapeError> {
        let fetcher = PageFetcher::from_config(config)?;
        Self::new(config.scraper.clone(), fetcher)
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Scrapes every URL concurrently and aggregates the records
    ///
    /// Each URL runs as one task: validate, wait for a rate-limit token,
    /// fetch and extract, then append to the shared buffer. Failures do not
    /// stop other URLs. The whole call is bounded by the configured
    /// overall timeout, intersected with any deadline already on `ctx`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use magazine_harvester::{Config, ScrapeContext, ScrapeOrchestrator};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let orchestrator = ScrapeOrchestrator::from_config(&Config::default())?;
    /// let urls = vec!["https://flipboard.com/@news/top-stories".to_string()];
    /// let outcome = orchestrator.scrape_urls(&ScrapeContext::new(), &urls).await;
    /// println!("{} articles", outcome.records.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn scrape_urls(&self, ctx: &ScrapeContext, urls: &[String]) -> ScrapeOutcome {
        if urls.is_empty() {
            return ScrapeOutcome::failed(ScrapeError::EmptyInput);
        }

        tracing::info!(
            "Scraping {} URLs (concurrency {}, {} req/s, timeout {:?})",
            urls.len(),
            self.config.max_concurrency,
            self.config.max_requests_per_second,
            self.config.overall_timeout
        );

        let start_time = Instant::now();
        let ctx = ctx.with_timeout(self.config.overall_timeout);
        let limiter = Arc::new(RateLimiter::new(self.config.max_requests_per_second));
        let aggregator = Arc::new(ResultAggregator::with_capacity(
            urls.len() * ARTICLES_PER_PAGE_HINT,
        ));

        let task = {
            let fetcher = Arc::clone(&self.fetcher);
            let limiter = Arc::clone(&limiter);
            let aggregator = Arc::clone(&aggregator);

            move |ctx: ScrapeContext, url: String| {
                let fetcher = Arc::clone(&fetcher);
                let limiter = Arc::clone(&limiter);
                let aggregator = Arc::clone(&aggregator);

                async move {
                    match scrape_one(&ctx, &fetcher, &limiter, &url).await {
                        TaskOutcome::Success(records) => {
                            aggregator.add(records);
                            Ok(())
                        }
                        TaskOutcome::Failure { cause, .. } => Err(cause),
                    }
                }
            }
        };

        let result = TaskGroup::new(self.config.max_concurrency)
            .run(&ctx, urls.to_vec(), task)
            .await;

        let records = aggregator.snapshot();

        tracing::info!(
            "Scrape finished: {} articles from {} URLs in {:?}",
            records.len(),
            urls.len(),
            start_time.elapsed()
        );

        ScrapeOutcome {
            records,
            error: result.err(),
        }
    }

    /// Scrapes a single URL without rate limiting or the overall timeout
    pub async fn scrape_url(
        &self,
        ctx: &ScrapeContext,
        url: &str,
    ) -> Result<Vec<Record>, ScrapeError> {
        self.fetcher.fetch(ctx, url).await
    }
}

/// Runs one URL end-to-end: validate, acquire a token, fetch
///
/// Validation happens first so a rejected URL never spends rate budget.
async fn scrape_one(
    ctx: &ScrapeContext,
    fetcher: &PageFetcher,
    limiter: &RateLimiter,
    url: &str,
) -> TaskOutcome {
    let result: Result<Vec<Record>, ScrapeError> = async {
        fetcher.validate(url)?;
        limiter.acquire(ctx).await?;
        fetcher.fetch(ctx, url).await
    }
    .await;

    TaskOutcome::from_result(url, result)
}

/// Scrapes `urls` with an orchestrator built from `config`
///
/// Configuration or client errors are reported through the outcome.
///
/// # Example
///
/// ```no_run
/// use magazine_harvester::{scrape_urls, Config, ScrapeContext};
///
/// # async fn example() {
/// let urls = vec!["https://flipboard.com/@news/top-stories".to_string()];
/// let outcome = scrape_urls(&ScrapeContext::new(), &urls, &Config::default()).await;
/// if let Some(error) = &outcome.error {
///     eprintln!("warning: {}", error);
/// }
/// # }
/// ```
pub async fn scrape_urls(ctx: &ScrapeContext, urls: &[String], config: &Config) -> ScrapeOutcome {
    if urls.is_empty() {
        return ScrapeOutcome::failed(ScrapeError::EmptyInput);
    }

    match ScrapeOrchestrator::from_config(config) {
        Ok(orchestrator) => orchestrator.scrape_urls(ctx, urls).await,
        Err(error) => ScrapeOutcome::failed(error),
    }
}
