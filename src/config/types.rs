use serde::{de, Deserialize, Deserializer};
use std::path::PathBuf;
use std::time::Duration;

/// Default browser identity sent with every page request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scraper: ScrapeConfig,
    pub source: SourceConfig,
    pub client: ClientConfig,
    pub output: OutputConfig,
}

/// Concurrency, rate and time budget for one scrape invocation
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Maximum number of pages fetched at the same time
    #[serde(rename = "max-concurrency")]
    pub max_concurrency: usize,

    /// Aggregate request rate across all concurrent fetches
    #[serde(rename = "max-requests-per-second")]
    pub max_requests_per_second: f64,

    /// Upper bound on the whole invocation, measured from its start
    #[serde(rename = "timeout-seconds", deserialize_with = "deserialize_seconds")]
    pub overall_timeout: Duration,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 3,
            max_requests_per_second: 1.0,
            overall_timeout: Duration::from_secs(120),
        }
    }
}

/// Which pages are accepted and how articles are located in them
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Required scheme+host prefix of every page URL
    #[serde(rename = "url-prefix")]
    pub url_prefix: String,

    /// Selector matching one article block
    #[serde(rename = "item-selector")]
    pub item_selector: String,

    /// Selector for the title, relative to the article block
    #[serde(rename = "title-selector")]
    pub title_selector: String,

    /// Selector for the element carrying the article link in `href`
    #[serde(rename = "link-selector")]
    pub link_selector: String,

    /// Selector for the summary text
    #[serde(rename = "summary-selector")]
    pub summary_selector: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url_prefix: "https://flipboard.com/".to_string(),
            item_selector: "article.item".to_string(),
            title_selector: "h3".to_string(),
            link_selector: "a".to_string(),
            summary_selector: "p.description".to_string(),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    #[serde(
        rename = "request-timeout-seconds",
        deserialize_with = "deserialize_seconds"
    )]
    pub request_timeout: Duration,

    #[serde(
        rename = "connect-timeout-seconds",
        deserialize_with = "deserialize_seconds"
    )]
    pub connect_timeout: Duration,

    /// Redirect hops followed while retrieving a single page
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_redirects: 5,
        }
    }
}

/// Export format for scraped records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Sqlite,
}

impl ExportFormat {
    /// File extension appended to the output path
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Sqlite => "db",
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: ExportFormat,

    /// Output file path without extension
    pub path: String,
}

impl OutputConfig {
    /// Full output path with the format's extension
    pub fn file_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.{}", self.path, self.format.extension()))
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Csv,
            path: "articles".to_string(),
        }
    }
}

/// Reads a duration written as (possibly fractional) seconds
fn deserialize_seconds<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let seconds = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(seconds).map_err(de::Error::custom)
}
