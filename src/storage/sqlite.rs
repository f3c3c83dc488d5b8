//! `SQLite`-backed document store.
//!
//! Every index lives in the same database file; documents carry the index
//! name as a column. One connection is shared behind a mutex since the
//! session awaits store calls one at a time.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

use super::schema::{migrate, verify_schema, SCHEMA_VERSION};
use super::{now_unix, DocumentStore};
use crate::error::StorageError;
use crate::ingest::CodeLine;
use crate::Result;

const IN_MEMORY: &str = ":memory:";

/// Local store keeping every index in one database file.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    location: String,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open (or create) a store at `path` and run migrations.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created, opened or migrated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path).map_err(|e| {
            StorageError::Database(format!("failed to open '{}': {e}", path.display()))
        })?;
        // bulk single-row inserts, WAL keeps them cheap
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")
            .map_err(|e| StorageError::Database(format!("failed to enable WAL: {e}")))?;

        Self::prepare(conn, path.to_string_lossy().into_owned())
    }

    /// Open a store that lives only as long as this value and its clones.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Database(format!("failed to open {IN_MEMORY}: {e}")))?;
        Self::prepare(conn, IN_MEMORY.to_string())
    }

    fn prepare(conn: Connection, location: String) -> Result<Self> {
        migrate(&conn)?;
        verify_schema(&conn)?;
        tracing::info!(%location, "Storage initialized, schema version {SCHEMA_VERSION}");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            location,
        })
    }

    /// Database file path, or `:memory:`.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Number of documents in `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_documents(&self, index: &str) -> Result<usize> {
        let count: i64 = self
            .conn
            .lock()
            .query_row(
                "SELECT COUNT(*) FROM code_lines WHERE index_name = ?",
                [index],
                |row| row.get(0),
            )
            .map_err(|e| StorageError::Database(format!("failed to count documents: {e}")))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// All documents in `index`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn documents(&self, index: &str) -> Result<Vec<CodeLine>> {
        self.query_documents(
            "SELECT repository, file_path, line, content, function
             FROM code_lines WHERE index_name = ?1 ORDER BY id",
            &[index],
        )
    }

    /// Documents of one file in `index`, ordered by line.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn documents_for_file(&self, index: &str, file_path: &str) -> Result<Vec<CodeLine>> {
        self.query_documents(
            "SELECT repository, file_path, line, content, function
             FROM code_lines WHERE index_name = ?1 AND file_path = ?2 ORDER BY line",
            &[index, file_path],
        )
    }

    fn query_documents(&self, sql: &str, args: &[&str]) -> Result<Vec<CodeLine>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| StorageError::Database(format!("failed to prepare query: {e}")))?;

        let rows = stmt
            .query_map(rusqlite::params_from_iter(args.iter()), |row| {
                let line: i64 = row.get(2)?;
                Ok(CodeLine {
                    repository: row.get(0)?,
                    file_path: row.get(1)?,
                    line: u64::try_from(line).unwrap_or(0),
                    content: row.get(3)?,
                    function: row.get(4)?,
                })
            })
            .map_err(|e| StorageError::Database(format!("failed to query documents: {e}")))?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| StorageError::Database(format!("failed to read document: {e}")).into())
    }
}

impl DocumentStore for SqliteStore {
    async fn index_exists(&self, index: &str) -> Result<bool> {
        let found = self
            .conn
            .lock()
            .query_row("SELECT 1 FROM indices WHERE name = ?", [index], |_| Ok(()))
            .optional()
            .map_err(|e| StorageError::Database(format!("failed to check index: {e}")))?;
        Ok(found.is_some())
    }

    async fn delete_index(&self, index: &str) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| StorageError::Database(format!("failed to begin transaction: {e}")))?;

        let deleted = tx
            .execute("DELETE FROM code_lines WHERE index_name = ?", [index])
            .map_err(|e| StorageError::Database(format!("failed to delete documents: {e}")))?;
        tx.execute("DELETE FROM indices WHERE name = ?", [index])
            .map_err(|e| StorageError::Database(format!("failed to delete index: {e}")))?;
        tx.commit()
            .map_err(|e| StorageError::Database(format!("failed to commit deletion: {e}")))?;

        tracing::debug!(index, documents = deleted, "Deleted index");
        Ok(())
    }

    async fn index_document(&self, index: &str, doc: &CodeLine) -> Result<()> {
        let line = i64::try_from(doc.line)
            .map_err(|_| StorageError::Database(format!("line number {} out of range", doc.line)))?;

        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR IGNORE INTO indices (name, created_at) VALUES (?, ?)",
            params![index, now_unix()],
        )
        .map_err(|e| StorageError::Database(format!("failed to create index: {e}")))?;

        conn.execute(
            "INSERT INTO code_lines (index_name, repository, file_path, line, content, function)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                index,
                doc.repository,
                doc.file_path,
                line,
                doc.content,
                doc.function
            ],
        )
        .map_err(|e| StorageError::Database(format!("failed to insert document: {e}")))?;

        tracing::trace!(index, path = %doc.file_path, line = doc.line, "Inserted document");
        Ok(())
    }
}
