//! HTML parser for extracting article records
//!
//! This module turns a retrieved magazine page into [`Record`]s:
//! - Locates article blocks with the configured item selector
//! - Reads title, link and summary inside each block
//! - Normalizes whitespace and drops blocks without a title
//!
//! Every call parses into its own document and buffer; only the compiled
//! selectors are shared, and they are immutable.

use crate::config::SourceConfig;
use crate::record::Record;
use crate::ConfigError;
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Pre-compiled selectors describing one article block
#[derive(Debug, Clone)]
pub struct ArticleSelectors {
    item: Selector,
    title: Selector,
    link: Selector,
    summary: Selector,
}

impl ArticleSelectors {
    /// Compiles the selectors named in the source configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidSelector` naming the first selector
    /// that fails to parse.
    pub fn compile(config: &SourceConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            item: compile_selector(&config.item_selector)?,
            title: compile_selector(&config.title_selector)?,
            link: compile_selector(&config.link_selector)?,
            summary: compile_selector(&config.summary_selector)?,
        })
    }
}

fn compile_selector(selector: &str) -> Result<Selector, ConfigError> {
    if selector.trim().is_empty() {
        return Err(ConfigError::InvalidSelector {
            selector: selector.to_string(),
            message: "selector cannot be empty".to_string(),
        });
    }

    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Extracts every article record from a page
///
/// # Arguments
///
/// * `html` - The page markup
/// * `page_url` - The page URL, used to resolve relative article links
/// * `selectors` - Where to find articles and their fields
/// * `observed_at` - Timestamp stamped on every record of this pass
///
/// # Example
///
/// ```
/// use magazine_harvester::config::SourceConfig;
/// use magazine_harvester::crawler::{extract_records, ArticleSelectors};
/// use url::Url;
///
/// let html = r#"<article class="item"><h3> Hello </h3><a href="/story">x</a></article>"#;
/// let selectors = ArticleSelectors::compile(&SourceConfig::default()).unwrap();
/// let page = Url::parse("https://flipboard.com/@news").unwrap();
/// let records = extract_records(html, &page, &selectors, chrono::Utc::now());
/// assert_eq!(records[0].title(), "Hello");
/// assert_eq!(records[0].source_url(), "https://flipboard.com/story");
/// ```
pub fn extract_records(
    html: &str,
    page_url: &Url,
    selectors: &ArticleSelectors,
    observed_at: DateTime<Utc>,
) -> Vec<Record> {
    let document = Html::parse_document(html);

    document
        .select(&selectors.item)
        .filter_map(|item| {
            let title = normalize_text(&child_text(&item, &selectors.title));
            let link = item
                .select(&selectors.link)
                .next()
                .and_then(|element| element.value().attr("href"))
                .map(|href| resolve_link(href, page_url))
                .unwrap_or_default();
            let summary = normalize_text(&child_text(&item, &selectors.summary));

            Record::new(title, link, summary, observed_at)
        })
        .collect()
}

/// Concatenated text of every descendant matching `selector`
fn child_text(item: &ElementRef<'_>, selector: &Selector) -> String {
    item.select(selector)
        .flat_map(|element| element.text())
        .collect::<String>()
}

/// Resolves an article href against the page URL
///
/// Hrefs that cannot be resolved are kept verbatim.
fn resolve_link(href: &str, page_url: &Url) -> String {
    let href = href.trim();

    if href.is_empty() {
        return String::new();
    }

    match page_url.join(href) {
        Ok(absolute) => absolute.to_string(),
        Err(_) => href.to_string(),
    }
}

/// Collapses whitespace runs (including tabs and newlines) into single
/// spaces and trims both ends
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
