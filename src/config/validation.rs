use crate::config::types::{ClientConfig, Config, OutputConfig, ScrapeConfig, SourceConfig};
use crate::crawler::ArticleSelectors;
use crate::ConfigError;
use std::time::Duration;
use url::Url;

/// Upper bound on concurrently open pages
const MAX_CONCURRENCY_LIMIT: usize = 100;

/// Upper bound on the overall scrape timeout (one week)
const MAX_OVERALL_TIMEOUT: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Upper bound on redirect hops for a single retrieval
const MAX_REDIRECT_LIMIT: usize = 20;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scrape_config(&config.scraper)?;
    validate_source_config(&config.source)?;
    validate_client_config(&config.client)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates concurrency, rate and timeout settings
pub fn validate_scrape_config(config: &ScrapeConfig) -> Result<(), ConfigError> {
    if config.max_concurrency < 1 || config.max_concurrency > MAX_CONCURRENCY_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY_LIMIT, config.max_concurrency
        )));
    }

    if !config.max_requests_per_second.is_finite() || config.max_requests_per_second <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "max_requests_per_second must be a positive number, got {}",
            config.max_requests_per_second
        )));
    }

    if config.overall_timeout.is_zero() {
        return Err(ConfigError::Validation(
            "overall timeout must be greater than zero".to_string(),
        ));
    }

    if config.overall_timeout > MAX_OVERALL_TIMEOUT {
        return Err(ConfigError::Validation(format!(
            "overall timeout must be at most {} seconds, got {} seconds",
            MAX_OVERALL_TIMEOUT.as_secs(),
            config.overall_timeout.as_secs()
        )));
    }

    Ok(())
}

/// Validates the accepted URL prefix and the article selectors
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    let prefix = Url::parse(&config.url_prefix).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid url_prefix '{}': {}", config.url_prefix, e))
    })?;

    if prefix.scheme() != "https" && prefix.scheme() != "http" {
        return Err(ConfigError::Validation(format!(
            "url_prefix '{}' must use an HTTP(S) scheme",
            config.url_prefix
        )));
    }

    if prefix.host_str().is_none() {
        return Err(ConfigError::Validation(format!(
            "url_prefix '{}' must include a host",
            config.url_prefix
        )));
    }

    ArticleSelectors::compile(config)?;

    Ok(())
}

/// Validates HTTP client settings
fn validate_client_config(config: &ClientConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout.is_zero() || config.connect_timeout.is_zero() {
        return Err(ConfigError::Validation(
            "client timeouts must be greater than zero".to_string(),
        ));
    }

    if config.max_redirects > MAX_REDIRECT_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_redirects must be at most {}, got {}",
            MAX_REDIRECT_LIMIT, config.max_redirects
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
