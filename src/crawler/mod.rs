//! Crawler module for concurrent page scraping
//!
//! This module contains the core scraping logic, including:
//! - Cancellation and deadline scopes
//! - A shared token-bucket rate limiter
//! - HTTP fetching and article extraction
//! - Thread-safe result aggregation
//! - A bounded task group and the orchestration on top of it

mod aggregator;
mod context;
mod coordinator;
mod fetcher;
mod parser;
mod rate_limiter;
mod task_group;

pub use aggregator::ResultAggregator;
pub use context::{CancelReason, ScrapeContext};
pub use coordinator::{scrape_urls, ScrapeOrchestrator, ScrapeOutcome};
pub use fetcher::{build_http_client, PageFetcher};
pub use parser::{extract_records, normalize_text, ArticleSelectors};
pub use rate_limiter::RateLimiter;
pub use task_group::TaskGroup;
