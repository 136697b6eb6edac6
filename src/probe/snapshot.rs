//! File-backed browser environment
//!
//! A snapshot is a JSON export of one browser profile:
//!
//! ```json
//! {
//!   "cookies": [{ "name": "tracking", "value": "true" }],
//!   "localStorage": { "userID": "1234" },
//!   "device": { "userAgent": "Mozilla/5.0", "platform": "Linux x86_64" }
//! }
//! ```

use super::memory::BrowserState;
use super::{ElevatedCookieAccess, EnvironmentProbe, ProbeError};
use crate::models::{CookieEntry, DeviceAttributes, StorageEntry};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotFile {
    #[serde(default)]
    cookies: Vec<CookieEntry>,
    #[serde(default)]
    local_storage: BTreeMap<String, String>,
    #[serde(default)]
    device: DeviceAttributes,
}

pub struct SnapshotProbe {
    path: PathBuf,
    state: RwLock<BrowserState>,
}

impl SnapshotProbe {
    /// Load a snapshot; a missing file yields an empty profile
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ProbeError> {
        let path = path.as_ref().to_path_buf();
        let file = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            log::debug!("Snapshot {:?} not found, starting empty", path);
            SnapshotFile::default()
        };

        Ok(SnapshotProbe {
            path,
            state: RwLock::new(BrowserState {
                cookies: file.cookies,
                local_storage: file.local_storage,
                device: file.device,
            }),
        })
    }

    /// Write the current state back to the snapshot file
    pub fn save(&self) -> Result<(), ProbeError> {
        let state = self.read();
        let file = SnapshotFile {
            cookies: state.cookies.clone(),
            local_storage: state.local_storage.clone(),
            device: state.device.clone(),
        };
        std::fs::write(&self.path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BrowserState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BrowserState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl EnvironmentProbe for SnapshotProbe {
    fn cookies(&self) -> Vec<CookieEntry> {
        self.read()
            .cookies
            .iter()
            .filter(|c| !c.http_only)
            .cloned()
            .collect()
    }

    fn set_cookie(&self, cookie: CookieEntry) {
        self.write().upsert_cookie(cookie);
    }

    fn local_storage(&self) -> Vec<StorageEntry> {
        self.read().storage_entries()
    }

    fn set_local_storage_item(&self, key: &str, value: &str) {
        self.write()
            .local_storage
            .insert(key.to_string(), value.to_string());
    }

    fn device_attributes(&self) -> DeviceAttributes {
        self.read().device.clone()
    }
}

#[async_trait]
impl ElevatedCookieAccess for SnapshotProbe {
    async fn list_all(&self) -> Result<Vec<CookieEntry>, ProbeError> {
        Ok(self.read().cookies.clone())
    }
}
