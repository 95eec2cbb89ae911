//! Configuration module for Magazine Harvester
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Every section is optional; missing values fall back to defaults.
//!
//! # Example
//!
//! ```no_run
//! use magazine_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvester.toml")).unwrap();
//! println!("Rate limit: {} req/s", config.scraper.max_requests_per_second);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ClientConfig, Config, ExportFormat, OutputConfig, ScrapeConfig, SourceConfig,
    DEFAULT_USER_AGENT,
};

// Re-export parser and validation functions
pub use parser::{load_config, parse_config};
pub use validation::{validate, validate_scrape_config};
