pub mod collector;
pub mod config;
pub mod enrichment;
pub mod geolocation;
pub mod html;
pub mod inspector;
pub mod models;
pub mod persistence;
pub mod probe;
pub mod server;
pub mod validation;
pub mod whois;

// Re-export commonly used types
pub use models::{CookieEntry, DeviceAttributes, FingerprintRecord, StorageEntry, UserInfo, WhoisRecord};
pub use collector::{AttributeFingerprinter, FingerprintCollector, Fingerprinter};
pub use enrichment::{lookup_and_enrich, EnrichedRecord, Outcome};
pub use geolocation::{GeoIpService, IpLocator};
pub use inspector::{InspectionReport, Inspector};
pub use persistence::{FingerprintStore, SqliteFingerprintStore};
pub use probe::{ElevatedCookieAccess, EnvironmentProbe, MemoryProbe, SnapshotProbe};
pub use whois::{WhoisClient, WhoisProxy};
