//! SQLite storage implementation

use crate::record::Record;
use crate::storage::schema::initialize_schema;
use crate::storage::{ArticleRow, StorageResult};
use rusqlite::{params, Connection};
use std::path::Path;

/// SQLite storage backend for articles
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the database at `path` and ensures the schema exists
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Inserts all records in a single transaction
    ///
    /// Either every record is stored or, on error, none are.
    ///
    /// # Returns
    ///
    /// The number of rows inserted
    pub fn insert_records(&mut self, records: &[Record]) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO articles (title, url, summary, date) VALUES (?1, ?2, ?3, ?4)",
            )?;

            for record in records {
                stmt.execute(params![
                    record.title(),
                    record.source_url(),
                    record.summary(),
                    record.observed_at().to_rfc3339(),
                ])?;
            }
        }

        tx.commit()?;

        tracing::debug!("Inserted {} articles", records.len());
        Ok(records.len())
    }

    /// Counts stored articles
    pub fn count_articles(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Loads every stored article in insertion order
    pub fn load_articles(&self) -> StorageResult<Vec<ArticleRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, url, summary, date, created_at FROM articles ORDER BY id",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ArticleRow {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    url: row.get(2)?,
                    summary: row.get(3)?,
                    date: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}
