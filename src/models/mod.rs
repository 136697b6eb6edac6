pub mod entries;
pub mod fingerprint;
pub mod whois;

pub use entries::{CookieEntry, DeviceAttributes, StorageEntry};
pub use fingerprint::{FingerprintRecord, UserInfo};
pub use whois::WhoisRecord;
