//! SQLite implementation of the FingerprintStore trait

use super::{FingerprintStore, PersistenceError};
use crate::models::FingerprintRecord;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite-backed document store
///
/// Each record is kept as a JSON document in a single table keyed by
/// visitor id, so the stored shape matches what clients send and receive.
pub struct SqliteFingerprintStore {
    conn: Mutex<Connection>,
}

impl SqliteFingerprintStore {
    /// Open (or create) a store at the specified path
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, PersistenceError> {
        let conn = Connection::open(db_path)?;
        let store = SqliteFingerprintStore {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory SQLite database (useful for testing)
    pub fn in_memory() -> Result<Self, PersistenceError> {
        let conn = Connection::open_in_memory()?;
        let store = SqliteFingerprintStore {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<(), PersistenceError> {
        let conn = self.lock()?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, PersistenceError> {
        self.conn.lock().map_err(|_| PersistenceError::LockPoisoned)
    }
}

impl FingerprintStore for SqliteFingerprintStore {
    fn put_record(
        &self,
        visitor_id: &str,
        record: &FingerprintRecord,
    ) -> Result<(), PersistenceError> {
        let document = serde_json::to_string(record)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO fingerprints (visitor_id, document, updated_at) VALUES (?, ?, ?)",
            params![visitor_id, document, chrono::Utc::now().timestamp_millis()],
        )?;
        Ok(())
    }

    fn get_record(&self, visitor_id: &str) -> Result<Option<FingerprintRecord>, PersistenceError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT document FROM fingerprints WHERE visitor_id = ?")?;

        let result = stmt.query_row(params![visitor_id], |row| row.get::<_, String>(0));

        match result {
            Ok(document) => Ok(Some(serde_json::from_str(&document)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn list_visitor_ids(&self, limit: usize) -> Result<Vec<String>, PersistenceError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT visitor_id FROM fingerprints
             ORDER BY updated_at DESC, rowid DESC
             LIMIT ?",
        )?;

        let ids = stmt
            .query_map(params![limit as i64], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(ids)
    }

    fn clear_all(&self) -> Result<(), PersistenceError> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM fingerprints", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserInfo;
    use chrono::{TimeZone, Utc};

    fn create_test_store() -> SqliteFingerprintStore {
        SqliteFingerprintStore::in_memory().expect("Failed to create in-memory store")
    }

    fn record_with_ip(ip: &str, ts: i64) -> FingerprintRecord {
        FingerprintRecord {
            user_info: UserInfo {
                timestamp: Utc.timestamp_opt(ts, 0).unwrap(),
                user_agent: "Mozilla/5.0 (X11; Linux x86_64)".to_string(),
                os: "Linux x86_64".to_string(),
                screen_size: "1920x1080".to_string(),
                hardware: Some(8),
                device_model: Some(8.0),
                ip: ip.to_string(),
            },
        }
    }

    #[test]
    fn test_record_roundtrip() {
        let store = create_test_store();

        assert!(store.get_record("abc123").unwrap().is_none());

        store.put_record("abc123", &record_with_ip("1.2.3.4", 1700000000)).unwrap();

        let stored = store.get_record("abc123").unwrap().unwrap();
        assert_eq!(stored.user_info.ip, "1.2.3.4");
        assert_eq!(stored, record_with_ip("1.2.3.4", 1700000000));
    }

    #[test]
    fn test_overwrite_replaces_record() {
        let store = create_test_store();

        store.put_record("abc123", &record_with_ip("1.2.3.4", 1000)).unwrap();
        store.put_record("abc123", &record_with_ip("5.6.7.8", 2000)).unwrap();

        let stored = store.get_record("abc123").unwrap().unwrap();
        assert_eq!(stored.user_info.ip, "5.6.7.8");
        assert_eq!(store.list_visitor_ids(10).unwrap(), vec!["abc123"]);
    }

    #[test]
    fn test_key_equality_only() {
        let store = create_test_store();
        store.put_record("abc123", &record_with_ip("1.2.3.4", 1000)).unwrap();

        assert!(store.get_record("ABC123").unwrap().is_none());
        assert!(store.get_record("abc12").unwrap().is_none());
    }

    #[test]
    fn test_list_newest_first() {
        let store = create_test_store();
        store.put_record("first", &record_with_ip("1.1.1.1", 1000)).unwrap();
        store.put_record("second", &record_with_ip("2.2.2.2", 2000)).unwrap();
        store.put_record("first", &record_with_ip("3.3.3.3", 3000)).unwrap();

        assert_eq!(store.list_visitor_ids(10).unwrap(), vec!["first", "second"]);
        assert_eq!(store.list_visitor_ids(1).unwrap(), vec!["first"]);
    }

    #[test]
    fn test_clear_all() {
        let store = create_test_store();
        store.put_record("abc123", &record_with_ip("1.2.3.4", 1000)).unwrap();

        store.clear_all().unwrap();

        assert!(store.get_record("abc123").unwrap().is_none());
        assert!(store.list_visitor_ids(10).unwrap().is_empty());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("fingerprints.db");

        {
            let store = SqliteFingerprintStore::new(&path).unwrap();
            store.put_record("abc123", &record_with_ip("1.2.3.4", 1000)).unwrap();
        }

        let reopened = SqliteFingerprintStore::new(&path).unwrap();
        let stored = reopened.get_record("abc123").unwrap().unwrap();
        assert_eq!(stored.user_info.ip, "1.2.3.4");
    }

    #[test]
    fn test_ipv6_ip_stored_verbatim() {
        let store = create_test_store();
        store.put_record("v6", &record_with_ip("2001:db8::1", 1000)).unwrap();
        assert_eq!(store.get_record("v6").unwrap().unwrap().user_info.ip, "2001:db8::1");
    }
}
