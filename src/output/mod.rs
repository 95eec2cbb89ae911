//! Output module for exporting scraped articles
//!
//! This module handles:
//! - Writing records to CSV files
//! - Appending records to SQLite databases
//! - Choosing the exporter for a configured format

mod csv_output;
mod sqlite_output;
mod traits;

pub use csv_output::CsvExporter;
pub use sqlite_output::SqliteExporter;
pub use traits::{Exporter, OutputError, OutputResult};

use crate::config::{ExportFormat, OutputConfig};
use crate::record::Record;
use std::path::{Path, PathBuf};

/// Returns the exporter for `format` writing to `path`
///
/// # Arguments
///
/// * `format` - The output format
/// * `path` - Full path of the destination file, extension included
pub fn exporter_for(format: ExportFormat, path: &Path) -> Box<dyn Exporter> {
    match format {
        ExportFormat::Csv => Box::new(CsvExporter::new(path)),
        ExportFormat::Sqlite => Box::new(SqliteExporter::new(path)),
    }
}

/// Exports `records` according to the output configuration
///
/// # Returns
///
/// The path that was written
pub fn export_records(config: &OutputConfig, records: &[Record]) -> OutputResult<PathBuf> {
    let path = config.file_path();
    let exporter = exporter_for(config.format, &path);

    exporter.export(records)?;

    tracing::info!(
        "Exported {} articles as {} to {}",
        records.len(),
        exporter.format_name(),
        path.display()
    );
    Ok(path)
}
