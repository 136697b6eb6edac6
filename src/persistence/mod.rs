//! Persistence module for fingerprint records
//!
//! Records live in a schemaless document collection keyed by visitor id.
//! The store handle is passed explicitly to every operation that needs it.

pub mod sqlite_store;

pub use sqlite_store::SqliteFingerprintStore;

use crate::models::FingerprintRecord;
use thiserror::Error;

/// Errors that can occur during persistence operations
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid document in database: {0}")]
    InvalidData(#[from] serde_json::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,
}

/// Trait for fingerprint document stores
///
/// Writes are unconditional overwrites: the last writer for a visitor id
/// wins and there is no history.
pub trait FingerprintStore: Send + Sync {
    /// Store a record, replacing any previous record for the visitor
    fn put_record(
        &self,
        visitor_id: &str,
        record: &FingerprintRecord,
    ) -> Result<(), PersistenceError>;

    /// Fetch the record for a visitor, if one was ever written
    fn get_record(&self, visitor_id: &str) -> Result<Option<FingerprintRecord>, PersistenceError>;

    /// Most recently written visitor ids, newest first
    fn list_visitor_ids(&self, limit: usize) -> Result<Vec<String>, PersistenceError>;

    /// Clear all data (useful for testing)
    fn clear_all(&self) -> Result<(), PersistenceError>;
}
