//! WHOIS data over RDAP (RFC 9083)

use super::{WhoisClient, WhoisError};
use crate::models::WhoisRecord;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::net::Ipv4Addr;

pub const DEFAULT_BASE_URL: &str = "https://rdap.org";

/// RDAP client returning the top-level scalar fields of an IP network object
pub struct RdapWhoisClient {
    base_url: String,
    client: Client,
}

impl RdapWhoisClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        RdapWhoisClient {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::builder()
                .user_agent(concat!("tracking_lab/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl WhoisClient for RdapWhoisClient {
    async fn lookup(&self, ip: Ipv4Addr) -> Result<WhoisRecord, WhoisError> {
        let url = format!("{}/ip/{}", self.base_url, ip);
        log::debug!("RDAP query {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/rdap+json, application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WhoisError::Status(response.status().as_u16()));
        }

        let body: Value = response.json().await?;
        let record = flatten(&body);
        if record.is_empty() {
            return Err(WhoisError::Empty(ip));
        }
        Ok(record)
    }
}

/// Keep strings, numbers, booleans and arrays of those; drop nested objects
fn flatten(body: &Value) -> WhoisRecord {
    let mut record = WhoisRecord::new();

    if let Value::Object(map) = body {
        for (key, value) in map {
            match value {
                Value::String(s) => record.push(key.as_str(), s.as_str()),
                Value::Number(_) | Value::Bool(_) => record.push(key.as_str(), value.to_string()),
                Value::Array(items) => {
                    for item in items {
                        match item {
                            Value::String(s) => record.push(key.as_str(), s.as_str()),
                            Value::Number(_) | Value::Bool(_) => {
                                record.push(key.as_str(), item.to_string())
                            }
                            _ => {}
                        }
                    }
                }
                _ => {}
            }
        }
    }

    record
}
