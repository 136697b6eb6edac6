//! Browser environment capabilities
//!
//! The inspector and the demo never touch ambient browser state directly.
//! They go through two capabilities that can be swapped for fakes:
//!
//! - [`EnvironmentProbe`]: the page-level cookie jar, localStorage and the
//!   read-only navigator/screen attributes.
//! - [`ElevatedCookieAccess`]: the privileged, asynchronous cookie listing a
//!   userscript manager grants. It sees cookies the page itself cannot (for
//!   example `HttpOnly` ones), so it is kept separate from the ambient jar.

pub mod demo;
pub mod memory;
pub mod snapshot;

pub use memory::MemoryProbe;
pub use snapshot::SnapshotProbe;

use crate::models::{CookieEntry, DeviceAttributes, StorageEntry};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Cookie access failed: {0}")]
    CookieAccess(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// Ambient browser state visible to page scripts
pub trait EnvironmentProbe: Send + Sync {
    /// Cookies in the page's own cookie jar
    fn cookies(&self) -> Vec<CookieEntry>;

    /// Set a cookie, replacing any cookie with the same name
    fn set_cookie(&self, cookie: CookieEntry);

    /// All localStorage entries, ordered by key
    fn local_storage(&self) -> Vec<StorageEntry>;

    fn set_local_storage_item(&self, key: &str, value: &str);

    fn device_attributes(&self) -> DeviceAttributes;
}

/// Privileged cookie enumeration
#[async_trait]
pub trait ElevatedCookieAccess: Send + Sync {
    async fn list_all(&self) -> Result<Vec<CookieEntry>, ProbeError>;
}
