//! In-memory browser environment

use super::{ElevatedCookieAccess, EnvironmentProbe, ProbeError};
use crate::models::{CookieEntry, DeviceAttributes, StorageEntry};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;

#[derive(Debug, Default, Clone)]
pub(crate) struct BrowserState {
    pub(crate) cookies: Vec<CookieEntry>,
    pub(crate) local_storage: BTreeMap<String, String>,
    pub(crate) device: DeviceAttributes,
}

impl BrowserState {
    pub(crate) fn upsert_cookie(&mut self, cookie: CookieEntry) {
        match self.cookies.iter_mut().find(|c| c.name == cookie.name) {
            Some(existing) => *existing = cookie,
            None => self.cookies.push(cookie),
        }
    }

    pub(crate) fn storage_entries(&self) -> Vec<StorageEntry> {
        self.local_storage
            .iter()
            .map(|(k, v)| StorageEntry::new(k.clone(), v.clone()))
            .collect()
    }
}

/// Browser environment held entirely in memory
///
/// Implements both capabilities over the same state. Setting
/// `fail_elevated` makes the elevated listing return an error, which is
/// how callers exercise the cookie-access failure path.
#[derive(Debug, Default)]
pub struct MemoryProbe {
    state: RwLock<BrowserState>,
    fail_elevated: bool,
}

impl MemoryProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(device: DeviceAttributes) -> Self {
        MemoryProbe {
            state: RwLock::new(BrowserState {
                device,
                ..BrowserState::default()
            }),
            fail_elevated: false,
        }
    }

    pub fn failing_elevated_access() -> Self {
        MemoryProbe {
            state: RwLock::default(),
            fail_elevated: true,
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BrowserState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BrowserState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl EnvironmentProbe for MemoryProbe {
    fn cookies(&self) -> Vec<CookieEntry> {
        // The page jar hides HttpOnly cookies
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
impl ElevatedCookieAccess for MemoryProbe {
    async fn list_all(&self) -> Result<Vec<CookieEntry>, ProbeError> {
        if self.fail_elevated {
            return Err(ProbeError::CookieAccess(
                "cookie permission not granted".to_string(),
            ));
        }
        Ok(self.read().cookies.clone())
    }
}
