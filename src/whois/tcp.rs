//! WHOIS over TCP port 43 (RFC 3912)

use super::{WhoisClient, WhoisError};
use crate::models::WhoisRecord;
use async_trait::async_trait;
use std::net::Ipv4Addr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

pub const DEFAULT_SERVER: &str = "whois.iana.org";
pub const DEFAULT_PORT: u16 = 43;
/// Responses are cut off after this many bytes
pub const MAX_RESPONSE_BYTES: u64 = 1024 * 1024;

/// Port-43 WHOIS client
///
/// Queries the configured server and, when enabled, follows a single
/// `refer:` / `whois:` / `ReferralServer:` pointer to the registry that
/// actually holds the allocation.
#[derive(Debug, Clone)]
pub struct TcpWhoisClient {
    server: String,
    port: u16,
    follow_referral: bool,
    max_response_bytes: u64,
}

impl TcpWhoisClient {
    pub fn new(server: impl Into<String>, port: u16, follow_referral: bool) -> Self {
        TcpWhoisClient {
            server: server.into(),
            port,
            follow_referral,
            max_response_bytes: MAX_RESPONSE_BYTES,
        }
    }

    pub fn with_max_response_bytes(mut self, limit: u64) -> Self {
        self.max_response_bytes = limit;
        self
    }

    async fn query(&self, server: &str, ip: Ipv4Addr) -> Result<String, WhoisError> {
        log::debug!("WHOIS query {} -> {}:{}", ip, server, self.port);

        let mut stream = TcpStream::connect((server, self.port)).await?;
        stream.write_all(format!("{}\r\n", ip).as_bytes()).await?;

        let mut buf = Vec::new();
        (&mut stream)
            .take(self.max_response_bytes)
            .read_to_end(&mut buf)
            .await?;
        if buf.len() as u64 >= self.max_response_bytes {
            log::warn!(
                "WHOIS response from {} truncated at {} bytes",
                server,
                self.max_response_bytes
            );
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl Default for TcpWhoisClient {
    fn default() -> Self {
        TcpWhoisClient::new(DEFAULT_SERVER, DEFAULT_PORT, true)
    }
}

#[async_trait]
impl WhoisClient for TcpWhoisClient {
    async fn lookup(&self, ip: Ipv4Addr) -> Result<WhoisRecord, WhoisError> {
        let response = self.query(&self.server, ip).await?;
        let mut record = parse_response(&response);

        if self.follow_referral {
            if let Some(referral) = referral_server(&record).filter(|s| *s != self.server) {
                log::debug!("Following WHOIS referral to {}", referral);
                let referred = parse_response(&self.query(&referral, ip).await?);
                if !referred.is_empty() {
                    record = referred;
                }
            }
        }

        if record.is_empty() {
            return Err(WhoisError::Empty(ip));
        }
        Ok(record)
    }
}

/// Parse `key: value` lines, skipping comments and blank lines
pub fn parse_response(response: &str) -> WhoisRecord {
    let mut record = WhoisRecord::new();

    for line in response.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim();
            let value = value.trim();
            if key.is_empty() || value.is_empty() {
                continue;
            }
            record.push(key, value);
        }
    }

    record
}

fn referral_server(record: &WhoisRecord) -> Option<String> {
    ["refer", "whois", "ReferralServer"]
        .iter()
        .find_map(|key| record.get(key))
        .and_then(|value| {
            let host = value.strip_prefix("whois://").unwrap_or(value);
            if host.contains("://") {
                // rwhois:// and friends speak a different protocol
                return None;
            }
            host.split(':').next().map(str::to_string)
        })
        .filter(|host| !host.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;

    /// Serve one canned response per accepted connection, in order
    async fn fake_server(responses: Vec<String>) -> (u16, tokio::task::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = tokio::spawn(async move {
            let mut queries = Vec::new();
            for response in responses {
                let (stream, _) = listener.accept().await.unwrap();
                let (read, mut write) = stream.into_split();
                let mut line = String::new();
                BufReader::new(read).read_line(&mut line).await.unwrap();
                queries.push(line);
                write.write_all(response.as_bytes()).await.unwrap();
                write.shutdown().await.unwrap();
            }
            queries
        });

        (port, handle)
    }

    #[test]
    fn test_parse_response() {
        let response = "% IANA WHOIS server\n\
                        % for more information on IANA, visit http://www.iana.org\n\
                        \n\
                        refer:        whois.arin.net\n\
                        inetnum:      8.0.0.0 - 8.255.255.255\n\
                        organisation: Administered by ARIN\n\
                        status:       LEGACY\n\
                        # comment: ignored\n\
                        remarks:      first\n\
                        remarks:      second\n";

        let record = parse_response(response);
        assert_eq!(record.get("refer"), Some("whois.arin.net"));
        assert_eq!(record.get("inetnum"), Some("8.0.0.0 - 8.255.255.255"));
        assert_eq!(record.get("remarks"), Some("first\nsecond"));
        assert!(record.get("comment").is_none());
    }

    #[test]
    fn test_referral_server_forms() {
        let mut record = WhoisRecord::new();
        record.push("ReferralServer", "whois://whois.ripe.net:43");
        assert_eq!(referral_server(&record).as_deref(), Some("whois.ripe.net"));

        let mut rwhois = WhoisRecord::new();
        rwhois.push("ReferralServer", "rwhois://rwhois.example.net:4321");
        assert!(referral_server(&rwhois).is_none());
    }

    #[tokio::test]
    async fn test_lookup_without_referral() {
        let (port, handle) = fake_server(vec![
            "NetRange: 1.2.3.0 - 1.2.3.255\nOrgName: Example Org\n".to_string(),
        ])
        .await;

        let client = TcpWhoisClient::new("127.0.0.1", port, true);
        let record = client.lookup(Ipv4Addr::new(1, 2, 3, 4)).await.unwrap();

        assert_eq!(record.get("OrgName"), Some("Example Org"));
        assert_eq!(handle.await.unwrap(), vec!["1.2.3.4\r\n".to_string()]);
    }

    #[tokio::test]
    async fn test_lookup_follows_referral() {
        let (port, handle) = fake_server(vec![
            "refer: localhost\ninetnum: 8.0.0.0 - 8.255.255.255\n".to_string(),
            "NetRange: 8.8.8.0 - 8.8.8.255\nOrgName: Google LLC\n".to_string(),
        ])
        .await;

        let client = TcpWhoisClient::new("127.0.0.1", port, true);
        let record = client.lookup(Ipv4Addr::new(8, 8, 8, 8)).await.unwrap();

        assert_eq!(record.get("OrgName"), Some("Google LLC"));
        assert!(record.get("refer").is_none());
        assert_eq!(handle.await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_referral_disabled() {
        let (port, _handle) = fake_server(vec!["refer: localhost\ninetnum: 8.0.0.0 - 8.255.255.255\n".to_string()]).await;

        let client = TcpWhoisClient::new("127.0.0.1", port, false);
        let record = client.lookup(Ipv4Addr::new(8, 8, 8, 8)).await.unwrap();
        assert_eq!(record.get("refer"), Some("localhost"));
    }

    #[tokio::test]
    async fn test_empty_response_is_error() {
        let (port, _handle) = fake_server(vec!["% nothing here\n".to_string()]).await;

        let client = TcpWhoisClient::new("127.0.0.1", port, true);
        let err = client.lookup(Ipv4Addr::new(1, 2, 3, 4)).await.unwrap_err();
        assert!(matches!(err, WhoisError::Empty(_)));
    }

    #[tokio::test]
    async fn test_response_is_capped() {
        let mut response = "OrgName: Example Org\n".to_string();
        response.push_str(&"remarks: filler\n".repeat(200));
        let (port, _handle) = fake_server(vec![response]).await;

        let client = TcpWhoisClient::new("127.0.0.1", port, false).with_max_response_bytes(64);
        let record = client.lookup(Ipv4Addr::new(1, 2, 3, 4)).await.unwrap();

        assert_eq!(record.get("OrgName"), Some("Example Org"));
        let remarks = record.get("remarks").unwrap_or_default();
        assert!(remarks.len() < 64);
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = TcpWhoisClient::new("127.0.0.1", port, true);
        assert!(matches!(
            client.lookup(Ipv4Addr::new(1, 2, 3, 4)).await,
            Err(WhoisError::Io(_))
        ));
    }
}
