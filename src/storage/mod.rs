//! Search stores receiving the per-line documents.
//!
//! Two backends implement [`DocumentStore`]:
//! - [`ElasticStore`], the Elasticsearch REST API
//! - [`SqliteStore`], a local `SQLite` database

mod elastic;
mod schema;
mod sqlite;

use std::future::Future;

pub use elastic::ElasticStore;
pub use schema::{migrate, verify_schema, SCHEMA_VERSION};
pub use sqlite::SqliteStore;

use crate::ingest::CodeLine;
use crate::Result;

/// Destination for indexed documents.
///
/// Calls are awaited one at a time; implementations need no internal
/// ordering guarantees beyond that.
pub trait DocumentStore {
    /// Whether the named index exists.
    fn index_exists(&self, index: &str) -> impl Future<Output = Result<bool>>;

    /// Drop the named index and all its documents.
    fn delete_index(&self, index: &str) -> impl Future<Output = Result<()>>;

    /// Add one document to the named index, creating the index if needed.
    fn index_document(&self, index: &str, doc: &CodeLine) -> impl Future<Output = Result<()>>;
}

/// Get current Unix timestamp.
fn now_unix() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(0))
        .unwrap_or(0)
}
