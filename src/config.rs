use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::whois::{rdap, tcp};

/// Configuration for the tracking demo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Fingerprint document store configuration
    pub store: StoreConfig,
    /// WHOIS backend configuration
    pub whois: WhoisConfig,
    /// Optional GeoIP enrichment
    #[serde(default)]
    pub geoip: GeoIpConfig,
    /// Demo page configuration
    #[serde(default)]
    pub pages: PagesConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the demo app binds to
    pub bind_address: String,
    /// Take the client IP from X-Forwarded-For when present
    pub trust_forwarded_for: bool,
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite database file
    pub db_path: PathBuf,
}

/// WHOIS backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhoisConfig {
    /// Backend to use: "tcp" or "rdap"
    pub backend: String,
    /// WHOIS server queried first (tcp backend)
    pub server: String,
    /// WHOIS port (tcp backend)
    pub port: u16,
    /// Follow one registry referral (tcp backend)
    pub follow_referral: bool,
    /// RDAP bootstrap base URL (rdap backend)
    pub rdap_base_url: String,
    /// Upper bound for a single lookup; unset means wait indefinitely
    pub timeout_secs: Option<u64>,
}

/// GeoIP configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeoIpConfig {
    /// Path to a GeoLite2-City.mmdb file
    pub db_path: Option<PathBuf>,
}

/// Demo page configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagesConfig {
    /// ES module that exports the browser fingerprinting library
    pub fingerprint_script_url: String,
}

impl Default for PagesConfig {
    fn default() -> Self {
        PagesConfig {
            fingerprint_script_url: "https://openfpcdn.io/fingerprintjs/v4".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                bind_address: "127.0.0.1:3000".to_string(),
                trust_forwarded_for: true,
            },
            store: StoreConfig {
                db_path: PathBuf::from("fingerprints.db"),
            },
            whois: WhoisConfig {
                backend: "tcp".to_string(),
                server: tcp::DEFAULT_SERVER.to_string(),
                port: tcp::DEFAULT_PORT,
                follow_referral: true,
                rdap_base_url: rdap::DEFAULT_BASE_URL.to_string(),
                timeout_secs: None,
            },
            geoip: GeoIpConfig::default(),
            pages: PagesConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn to_file(&self, path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
