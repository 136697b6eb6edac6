//! IPv4 dotted-quad validation
//!
//! Every WHOIS query passes through here before any network call is made.

use regex::Regex;
use std::net::Ipv4Addr;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid IP address: {0:?}")]
    InvalidIpv4(String),
}

fn dotted_quad() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{1,3})\.(\d{1,3})\.(\d{1,3})\.(\d{1,3})$")
            .expect("dotted-quad pattern is valid")
    })
}

/// Parse a dotted-quad IPv4 address, each octet in 0-255
pub fn parse_ipv4(input: &str) -> Result<Ipv4Addr, ValidationError> {
    let invalid = || ValidationError::InvalidIpv4(input.to_string());

    let caps = dotted_quad().captures(input).ok_or_else(invalid)?;
    let mut octets = [0u8; 4];
    for (i, octet) in octets.iter_mut().enumerate() {
        *octet = caps[i + 1].parse::<u8>().map_err(|_| invalid())?;
    }

    Ok(Ipv4Addr::from(octets))
}

pub fn is_valid_ipv4(input: &str) -> bool {
    parse_ipv4(input).is_ok()
}
