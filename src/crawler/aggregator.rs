//! Thread-safe accumulation of extracted records

use crate::record::Record;
use std::sync::{Mutex, PoisonError};

/// Mutex-guarded record buffer written by concurrent scrape tasks
///
/// Insertion order across writers is unspecified.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    records: Mutex<Vec<Record>>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an aggregator with room for `capacity` records
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    /// Appends a page's records under exclusive access
    pub fn add(&self, records: Vec<Record>) {
        if records.is_empty() {
            return;
        }

        // Records are plain data, so a poisoned buffer is still consistent
        let mut buffer = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        buffer.extend(records);
    }

    /// Returns a copy of everything collected so far
    pub fn snapshot(&self) -> Vec<Record> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
