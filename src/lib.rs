//! Magazine Harvester: concurrent article extraction from magazine pages
//!
//! This crate fetches a batch of magazine page URLs with bounded parallelism
//! and a shared request-rate budget, extracts article records from each page,
//! and hands the aggregated records to an exporter.

pub mod config;
pub mod crawler;
pub mod output;
pub mod record;
pub mod storage;

use crawler::CancelReason;
use thiserror::Error;

/// Main error type for scrape operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Invalid source URL: {url}")]
    InvalidInput { url: String },

    #[error("No URLs provided")]
    EmptyInput,

    #[error("Fetch failed for {url}: {source}")]
    FetchFailed { url: String, source: reqwest::Error },

    #[error("Scrape cancelled: {reason}")]
    Cancelled { reason: CancelReason },

    #[error("Failed to scrape {item}: {source}")]
    TaskFailed {
        item: String,
        source: Box<ScrapeError>,
    },

    #[error("Scrape task for {item} aborted: {message}")]
    TaskAborted { item: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl ScrapeError {
    /// Returns the innermost error, looking through task wrappers
    pub fn root_cause(&self) -> &ScrapeError {
        match self {
            ScrapeError::TaskFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Returns true if the failure came from a cancellation or deadline
    pub fn is_cancelled(&self) -> bool {
        matches!(self.root_cause(), ScrapeError::Cancelled { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Result type alias for scrape operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, ScrapeConfig};
pub use crawler::{scrape_urls, ScrapeContext, ScrapeOrchestrator, ScrapeOutcome};
pub use record::{Record, TaskOutcome};
