use serde::{Deserialize, Serialize};

/// A single browser cookie
///
/// Only `name` and `value` are shown by the inspector; the remaining
/// attributes are kept so snapshots round-trip without losing data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieEntry {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
    /// True when the cookie has no expiry and dies with the browser session
    #[serde(default = "default_session")]
    pub session: bool,
}

fn default_session() -> bool {
    true
}

impl CookieEntry {
    /// A session cookie with no domain, path or security attributes
    pub fn session(name: impl Into<String>, value: impl Into<String>) -> Self {
        CookieEntry {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
            secure: false,
            http_only: false,
            session: true,
        }
    }
}

/// A localStorage key/value pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEntry {
    pub key: String,
    pub value: String,
}

impl StorageEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        StorageEntry {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Read-only device attributes exposed by navigator/screen
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAttributes {
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub platform: String,
    /// Formatted as `<width>x<height>`
    #[serde(default)]
    pub screen_size: String,
    #[serde(default)]
    pub hardware_concurrency: Option<u32>,
    /// Device memory hint in GiB
    #[serde(default)]
    pub device_memory: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_export_uses_camel_case() {
        let cookie: CookieEntry = serde_json::from_str(
            r#"{"name": "sid", "value": "x", "httpOnly": true, "secure": true, "session": false}"#,
        )
        .unwrap();
        assert!(cookie.http_only);
        assert!(cookie.secure);
        assert!(!cookie.session);

        let json = serde_json::to_value(&cookie).unwrap();
        assert_eq!(json["httpOnly"], true);
        assert!(json.get("http_only").is_none());
    }
}
