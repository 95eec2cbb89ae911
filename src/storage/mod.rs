//! Storage module for persisting scraped articles
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Transactional insertion of record batches
//! - Reading stored articles back

mod schema;
mod sqlite;

pub use sqlite::SqliteStorage;

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// An article row as stored in the database
#[derive(Debug, Clone)]
pub struct ArticleRow {
    pub id: i64,
    pub title: String,
    pub url: Option<String>,
    pub summary: Option<String>,
    pub date: Option<String>,
    pub created_at: String,
}
