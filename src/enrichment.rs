//! Record lookup and enrichment pipeline
//!
//! `fetch record → validate stored IP → WHOIS → (GeoIP)`. Only the record
//! stage can come up empty; later stages either succeed or fail. Nothing is
//! retried and a failed stage produces no partial result.

use crate::geolocation::{IpLocation, IpLocator};
use crate::models::{FingerprintRecord, WhoisRecord};
use crate::persistence::{FingerprintStore, PersistenceError};
use crate::validation::ValidationError;
use crate::whois::{ProxyError, WhoisError, WhoisProxy};
use serde::Serialize;
use std::net::IpAddr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Record store failed: {0}")]
    Store(#[from] PersistenceError),

    #[error(transparent)]
    InvalidIp(#[from] ValidationError),

    #[error("WHOIS lookup failed: {0}")]
    Whois(#[from] WhoisError),
}

impl From<ProxyError> for LookupError {
    fn from(e: ProxyError) -> Self {
        match e {
            ProxyError::InvalidIp(e) => LookupError::InvalidIp(e),
            ProxyError::Upstream(e) => LookupError::Whois(e),
        }
    }
}

/// Tagged result of a pipeline stage
#[derive(Debug)]
pub enum Outcome<T> {
    Found(T),
    /// Nothing to report; not an error
    Absent,
    Failed(LookupError),
}

impl<T> Outcome<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Outcome::Absent)
    }

    pub fn found(self) -> Option<T> {
        match self {
            Outcome::Found(value) => Some(value),
            _ => None,
        }
    }
}

/// A stored record together with what is known about its IP
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedRecord {
    pub visitor_id: String,
    #[serde(flatten)]
    pub record: FingerprintRecord,
    pub whois: WhoisRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<IpLocation>,
}

/// Stage 1: load the record for a visitor id
pub fn fetch_record(store: &dyn FingerprintStore, visitor_id: &str) -> Outcome<FingerprintRecord> {
    match store.get_record(visitor_id) {
        Ok(Some(record)) => Outcome::Found(record),
        Ok(None) => {
            log::info!("No fingerprint record for {}", visitor_id);
            Outcome::Absent
        }
        Err(e) => {
            log::error!("Failed to read fingerprint {}: {}", visitor_id, e);
            Outcome::Failed(e.into())
        }
    }
}

/// Stage 2: WHOIS for the IP stored in the record
pub async fn fetch_whois(
    proxy: &WhoisProxy,
    record: &FingerprintRecord,
) -> Result<WhoisRecord, LookupError> {
    Ok(proxy.lookup(&record.user_info.ip).await?)
}

/// Run the whole pipeline for one visitor id
pub async fn lookup_and_enrich(
    store: &dyn FingerprintStore,
    proxy: &WhoisProxy,
    geoip: Option<&dyn IpLocator>,
    visitor_id: &str,
) -> Outcome<EnrichedRecord> {
    let record = match fetch_record(store, visitor_id) {
        Outcome::Found(record) => record,
        Outcome::Absent => return Outcome::Absent,
        Outcome::Failed(e) => return Outcome::Failed(e),
    };

    let whois = match fetch_whois(proxy, &record).await {
        Ok(whois) => whois,
        Err(e) => return Outcome::Failed(e),
    };

    let location = geoip.and_then(|locator| {
        record
            .user_info
            .ip
            .parse::<IpAddr>()
            .ok()
            .and_then(|ip| locator.locate(&ip))
    });

    Outcome::Found(EnrichedRecord {
        visitor_id: visitor_id.to_string(),
        record,
        whois,
        location,
    })
}
