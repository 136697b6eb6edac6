//! IP geolocation using a MaxMind GeoLite2-City database
//!
//! Optional enrichment for stored fingerprints. The database file must be
//! downloaded separately from MaxMind (free with registration).

use maxminddb::{geoip2, Reader};
use serde::Serialize;
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during geolocation lookups
#[derive(Error, Debug)]
pub enum GeoError {
    #[error("Failed to read database: {0}")]
    Database(#[from] maxminddb::MaxMindDBError),

    #[error("IP address not found in database")]
    NotFound,

    #[error("Location data missing for IP address")]
    NoLocation,

    #[error("Database file not found: {0}")]
    FileNotFound(String),
}

/// Where an IP address appears to be
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IpLocation {
    pub city: Option<String>,
    pub country: Option<String>,
    /// ISO 3166-1 alpha-2 country code
    pub country_code: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// e.g. "America/New_York"
    pub timezone: Option<String>,
    /// Accuracy radius in kilometers
    pub accuracy_radius: Option<u16>,
}

impl IpLocation {
    /// Human-readable place name
    pub fn display_location(&self) -> String {
        match (&self.city, &self.country) {
            (Some(city), Some(country)) => format!("{}, {}", city, country),
            (None, Some(country)) => country.clone(),
            (Some(city), None) => city.clone(),
            (None, None) => format!("({:.4}, {:.4})", self.latitude, self.longitude),
        }
    }
}

/// Anything that can place an IP address on a map
pub trait IpLocator: Send + Sync {
    /// Location for `ip`, or `None` when it cannot be placed
    fn locate(&self, ip: &IpAddr) -> Option<IpLocation>;
}

/// GeoIP lookup service
///
/// ```ignore
/// use tracking_lab::geolocation::GeoIpService;
///
/// let service = GeoIpService::new("GeoLite2-City.mmdb")?;
/// if let Some(location) = service.lookup_optional(&"8.8.8.8".parse()?) {
///     println!("{}", location.display_location());
/// }
/// ```
#[derive(Clone)]
pub struct GeoIpService {
    reader: Arc<Reader<Vec<u8>>>,
}

impl GeoIpService {
    /// Open a GeoLite2-City.mmdb file
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, GeoError> {
        let path = db_path.as_ref();
        if !path.exists() {
            return Err(GeoError::FileNotFound(path.display().to_string()));
        }

        let reader = Reader::open_readfile(path)?;
        Ok(GeoIpService {
            reader: Arc::new(reader),
        })
    }

    pub fn lookup(&self, ip: &IpAddr) -> Result<IpLocation, GeoError> {
        let city: geoip2::City = self.reader.lookup(*ip).map_err(|e| match e {
            maxminddb::MaxMindDBError::AddressNotFoundError(_) => GeoError::NotFound,
            other => GeoError::Database(other),
        })?;

        let location = city.location.ok_or(GeoError::NoLocation)?;
        let latitude = location.latitude.ok_or(GeoError::NoLocation)?;
        let longitude = location.longitude.ok_or(GeoError::NoLocation)?;

        Ok(IpLocation {
            city: city
                .city
                .and_then(|c| c.names)
                .and_then(|n| n.get("en").copied())
                .map(String::from),
            country: city
                .country
                .as_ref()
                .and_then(|c| c.names.as_ref())
                .and_then(|n| n.get("en").copied())
                .map(String::from),
            country_code: city.country.and_then(|c| c.iso_code).map(String::from),
            latitude,
            longitude,
            timezone: location.time_zone.map(String::from),
            accuracy_radius: location.accuracy_radius,
        })
    }

    /// Look up an address, logging and discarding failures
    pub fn lookup_optional(&self, ip: &IpAddr) -> Option<IpLocation> {
        match self.lookup(ip) {
            Ok(location) => Some(location),
            Err(e) => {
                log::debug!("No GeoIP location for {}: {}", ip, e);
                None
            }
        }
    }
}

impl IpLocator for GeoIpService {
    fn locate(&self, ip: &IpAddr) -> Option<IpLocation> {
        self.lookup_optional(ip)
    }
}
