//! CSV exporter

use crate::output::traits::{Exporter, OutputResult};
use crate::record::Record;
use std::path::{Path, PathBuf};

/// Writes records to a CSV file with a `Title,SourceURL,Summary,ObservedAt` header
///
/// An existing file at the target path is replaced.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    path: PathBuf,
}

impl CsvExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Exporter for CsvExporter {
    fn export(&self, records: &[Record]) -> OutputResult<()> {
        let mut writer = csv::Writer::from_path(&self.path)?;

        if records.is_empty() {
            // serialize() derives the header from the first row
            writer.write_record(["Title", "SourceURL", "Summary", "ObservedAt"])?;
        }

        for record in records {
            writer.serialize(record)?;
        }

        writer.flush()?;

        tracing::debug!("Wrote {} records to {}", records.len(), self.path.display());
        Ok(())
    }

    fn format_name(&self) -> &'static str {
        "csv"
    }
}
