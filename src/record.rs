//! Article records and per-URL task outcomes

use crate::ScrapeError;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One article extracted from a magazine page
///
/// Records are only built by the page parser and are never mutated
/// afterwards. The serialized column names are the ones persistence
/// layers write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    #[serde(rename = "Title")]
    title: String,

    #[serde(rename = "SourceURL")]
    source_url: String,

    #[serde(rename = "Summary")]
    summary: String,

    #[serde(rename = "ObservedAt")]
    observed_at: DateTime<Utc>,
}

impl Record {
    /// Builds a record, returning `None` when the title is empty
    pub(crate) fn new(
        title: String,
        source_url: String,
        summary: String,
        observed_at: DateTime<Utc>,
    ) -> Option<Self> {
        if title.is_empty() {
            return None;
        }

        Some(Self {
            title,
            source_url,
            summary,
            observed_at,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Link to the article itself (may be empty)
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Wall-clock time the page was processed, not a publication date
    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }
}

/// Result of running one URL task end-to-end
#[derive(Debug)]
pub enum TaskOutcome {
    /// The page was fetched and yielded these records (possibly none)
    Success(Vec<Record>),

    /// The page could not be scraped
    Failure { url: String, cause: ScrapeError },
}

impl TaskOutcome {
    /// Converts a fetch result for `url` into an outcome
    pub fn from_result(url: &str, result: Result<Vec<Record>, ScrapeError>) -> Self {
        match result {
            Ok(records) => TaskOutcome::Success(records),
            Err(cause) => TaskOutcome::Failure {
                url: url.to_string(),
                cause,
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success(_))
    }
}
