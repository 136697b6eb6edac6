use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DeviceAttributes;

/// Visitor metadata captured when a fingerprint is collected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub timestamp: DateTime<Utc>,
    pub user_agent: String,
    pub os: String,
    pub screen_size: String,
    /// Logical processor count
    pub hardware: Option<u32>,
    /// Device memory hint in GiB
    pub device_model: Option<f64>,
    /// Client IP observed at write time, not necessarily the current one
    pub ip: String,
}

impl UserInfo {
    pub fn from_attributes(attributes: &DeviceAttributes, ip: String, timestamp: DateTime<Utc>) -> Self {
        UserInfo {
            timestamp,
            user_agent: attributes.user_agent.clone(),
            os: attributes.platform.clone(),
            screen_size: attributes.screen_size.clone(),
            hardware: attributes.hardware_concurrency,
            device_model: attributes.device_memory,
            ip,
        }
    }
}

/// Document stored under `fingerprints/<visitorId>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FingerprintRecord {
    pub user_info: UserInfo,
}
