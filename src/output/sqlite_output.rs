//! SQLite exporter
//!
//! Appends records to the `articles` table of a database file, creating
//! the file and schema when missing.

use crate::output::traits::{Exporter, OutputResult};
use crate::record::Record;
use crate::storage::SqliteStorage;
use std::path::{Path, PathBuf};

/// Exports records into a SQLite database in a single transaction
#[derive(Debug, Clone)]
pub struct SqliteExporter {
    path: PathBuf,
}

impl SqliteExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Exporter for SqliteExporter {
    fn export(&self, records: &[Record]) -> OutputResult<()> {
        let mut storage = SqliteStorage::new(&self.path)?;
        let inserted = storage.insert_records(records)?;

        tracing::debug!("Inserted {} records into {}", inserted, self.path.display());
        Ok(())
    }

    fn format_name(&self) -> &'static str {
        "sqlite"
    }
}
