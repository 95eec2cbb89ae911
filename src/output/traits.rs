//! Exporter trait and error types
//!
//! Exporters take the final record collection of a scrape and persist it.
//! They run after the scrape has finished, so they never see partial
//! batches.

use crate::record::Record;
use crate::storage::StorageError;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for record exporters
pub trait Exporter {
    /// Writes every record to the exporter's destination
    ///
    /// # Arguments
    ///
    /// * `records` - The records to write, in order
    ///
    /// # Returns
    ///
    /// * `Ok(())` - All records were written
    /// * `Err(OutputError)` - The destination could not be written
    fn export(&self, records: &[Record]) -> OutputResult<()>;

    /// Short name of the output format, used in log messages
    fn format_name(&self) -> &'static str;
}
