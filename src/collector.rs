//! Fingerprint collection
//!
//! Builds a [`FingerprintRecord`] from device attributes plus the client IP
//! the server observed, and writes it under the visitor id. Writes always
//! overwrite: repeated visits from one device replace the earlier record.

use crate::models::{DeviceAttributes, FingerprintRecord, UserInfo};
use crate::persistence::{FingerprintStore, PersistenceError};
use crate::probe::EnvironmentProbe;
use axum::http::HeaderMap;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use uuid::Uuid;

pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// Source of visitor identifiers
///
/// In the browser this is the fingerprinting library. Server-side callers
/// only need it when a client did not send an identifier of its own.
pub trait Fingerprinter: Send + Sync {
    fn visitor_id(&self, attributes: &DeviceAttributes) -> String;
}

/// Deterministic identifier derived from the device attributes
///
/// Same attributes, same id: a UUIDv5 over the attribute values rendered
/// as 32 lowercase hex digits.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeFingerprinter;

impl Fingerprinter for AttributeFingerprinter {
    fn visitor_id(&self, attributes: &DeviceAttributes) -> String {
        let canonical = format!(
            "{}\u{1f}{}\u{1f}{}\u{1f}{}\u{1f}{}",
            attributes.user_agent,
            attributes.platform,
            attributes.screen_size,
            attributes
                .hardware_concurrency
                .map(|n| n.to_string())
                .unwrap_or_default(),
            attributes
                .device_memory
                .map(|m| m.to_string())
                .unwrap_or_default(),
        );
        Uuid::new_v5(&Uuid::NAMESPACE_OID, canonical.as_bytes())
            .simple()
            .to_string()
    }
}

/// Client IP as seen by the server
///
/// Takes the first `X-Forwarded-For` hop when trusted, otherwise the raw
/// connection address. Yields `"unknown"` when neither is available.
pub fn client_ip(headers: &HeaderMap, remote: Option<SocketAddr>, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = headers
            .get(FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    remote
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Result of a collection: the key and the document written under it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Collected {
    pub visitor_id: String,
    #[serde(flatten)]
    pub record: FingerprintRecord,
}

pub struct FingerprintCollector {
    store: Arc<dyn FingerprintStore>,
    fingerprinter: Arc<dyn Fingerprinter>,
}

impl FingerprintCollector {
    pub fn new(store: Arc<dyn FingerprintStore>, fingerprinter: Arc<dyn Fingerprinter>) -> Self {
        FingerprintCollector {
            store,
            fingerprinter,
        }
    }

    /// Write a record for the visitor, deriving an id when none was supplied
    pub fn collect(
        &self,
        visitor_id: Option<String>,
        attributes: &DeviceAttributes,
        ip: String,
    ) -> Result<Collected, PersistenceError> {
        let visitor_id = visitor_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| self.fingerprinter.visitor_id(attributes));

        let record = FingerprintRecord {
            user_info: UserInfo::from_attributes(attributes, ip, chrono::Utc::now()),
        };

        self.store.put_record(&visitor_id, &record)?;
        log::info!(
            "Stored fingerprint {} (ip {})",
            visitor_id,
            record.user_info.ip
        );

        Ok(Collected { visitor_id, record })
    }

    /// Collect using the attributes an environment probe reports
    pub fn collect_from_probe(
        &self,
        probe: &dyn EnvironmentProbe,
        visitor_id: Option<String>,
        ip: String,
    ) -> Result<Collected, PersistenceError> {
        self.collect(visitor_id, &probe.device_attributes(), ip)
    }
}
