//! WHOIS lookups
//!
//! [`WhoisClient`] is the seam to the upstream service. Two backends are
//! provided: the classic port-43 protocol ([`TcpWhoisClient`]) and RDAP over
//! HTTPS ([`RdapWhoisClient`]). [`WhoisProxy`] sits in front of either and
//! rejects malformed addresses before anything goes over the network.

pub mod rdap;
pub mod tcp;

pub use rdap::RdapWhoisClient;
pub use tcp::TcpWhoisClient;

use crate::config::WhoisConfig;
use crate::models::WhoisRecord;
use crate::validation::{parse_ipv4, ValidationError};
use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a WHOIS backend
#[derive(Error, Debug)]
pub enum WhoisError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned status {0}")]
    Status(u16),

    #[error("Upstream returned no data for {0}")]
    Empty(Ipv4Addr),

    #[error("Lookup timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors surfaced to callers of the proxy
#[derive(Error, Debug)]
pub enum ProxyError {
    /// The input was rejected before any upstream call
    #[error(transparent)]
    InvalidIp(#[from] ValidationError),

    #[error("WHOIS lookup failed: {0}")]
    Upstream(#[from] WhoisError),
}

#[async_trait]
pub trait WhoisClient: Send + Sync {
    async fn lookup(&self, ip: Ipv4Addr) -> Result<WhoisRecord, WhoisError>;
}

/// Validating front for a WHOIS backend
///
/// No caching, rate limiting or retries. The optional timeout bounds a
/// single upstream call; without it a stalled upstream stalls the caller.
#[derive(Clone)]
pub struct WhoisProxy {
    client: Arc<dyn WhoisClient>,
    timeout: Option<Duration>,
}

impl WhoisProxy {
    pub fn new(client: Arc<dyn WhoisClient>) -> Self {
        WhoisProxy {
            client,
            timeout: None,
        }
    }

    pub fn with_timeout(client: Arc<dyn WhoisClient>, timeout: Option<Duration>) -> Self {
        WhoisProxy { client, timeout }
    }

    /// Build the configured backend; unknown backends fall back to TCP
    pub fn from_config(config: &WhoisConfig) -> Self {
        let client: Arc<dyn WhoisClient> = match config.backend.as_str() {
            "rdap" => Arc::new(RdapWhoisClient::new(config.rdap_base_url.clone())),
            "tcp" => Arc::new(TcpWhoisClient::new(
                config.server.clone(),
                config.port,
                config.follow_referral,
            )),
            other => {
                log::warn!("Unknown WHOIS backend {:?}, using tcp", other);
                Arc::new(TcpWhoisClient::new(
                    config.server.clone(),
                    config.port,
                    config.follow_referral,
                ))
            }
        };

        WhoisProxy::with_timeout(client, config.timeout_secs.map(Duration::from_secs))
    }

    pub async fn lookup(&self, raw_ip: &str) -> Result<WhoisRecord, ProxyError> {
        let ip = parse_ipv4(raw_ip)?;

        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.client.lookup(ip))
                .await
                .unwrap_or(Err(WhoisError::Timeout(limit))),
            None => self.client.lookup(ip).await,
        };

        result.map_err(|e| {
            log::error!("WHOIS lookup for {} failed: {}", ip, e);
            ProxyError::Upstream(e)
        })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::StubWhois;
    use super::*;

    #[tokio::test]
    async fn test_valid_ip_delegates() {
        let stub = Arc::new(StubWhois::default());
        let proxy = WhoisProxy::new(stub.clone());

        let record = proxy.lookup("1.2.3.4").await.unwrap();
        assert_eq!(record.get("query"), Some("1.2.3.4"));
        assert_eq!(stub.call_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_ip_never_reaches_upstream() {
        let stub = Arc::new(StubWhois::default());
        let proxy = WhoisProxy::new(stub.clone());

        for bad in ["999.1.1.1", "", "1.2.3", "example.com"] {
            assert!(matches!(proxy.lookup(bad).await, Err(ProxyError::InvalidIp(_))));
        }
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_upstream_failure_carries_message() {
        let proxy = WhoisProxy::new(Arc::new(StubWhois::failing()));

        let err = proxy.lookup("8.8.8.8").await.unwrap_err();
        assert!(matches!(err, ProxyError::Upstream(WhoisError::Status(503))));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_timeout() {
        let stub = Arc::new(StubWhois {
            delay: Some(Duration::from_secs(5)),
            ..StubWhois::default()
        });
        let proxy = WhoisProxy::with_timeout(stub, Some(Duration::from_millis(20)));

        let err = proxy.lookup("8.8.8.8").await.unwrap_err();
        assert!(matches!(err, ProxyError::Upstream(WhoisError::Timeout(_))));
    }
}
