//! Local data inspector
//!
//! Collects every cookie visible to the elevated cookie capability and every
//! localStorage entry, then renders them as a standalone HTML report.

use crate::html;
use crate::models::{CookieEntry, StorageEntry};
use crate::probe::{ElevatedCookieAccess, EnvironmentProbe, ProbeError};
use serde::Serialize;
use std::sync::Arc;

pub const NO_COOKIES: &str = "No cookies detected.";
pub const NO_LOCAL_STORAGE: &str = "No localStorage data detected.";

/// Cookie names commonly used to carry a visitor identifier
const TRACKER_NAMES: &[&str] = &[
    "uid", "guid", "_ga", "visitor_id", "trackingid", "userid", "sessionid", "_fbp", "_gid", "id",
];

/// Name fragments that mark an entry as identifying
const TRACKER_FRAGMENTS: &[&str] = &["track", "fingerprint", "device"];

pub struct Inspector {
    cookies: Arc<dyn ElevatedCookieAccess>,
    probe: Arc<dyn EnvironmentProbe>,
}

impl Inspector {
    pub fn new(cookies: Arc<dyn ElevatedCookieAccess>, probe: Arc<dyn EnvironmentProbe>) -> Self {
        Inspector { cookies, probe }
    }

    /// Read both categories; cookie access errors are returned, never retried
    pub async fn inspect(&self) -> Result<InspectionReport, ProbeError> {
        let cookies = self.cookies.list_all().await?;
        let local_storage = self.probe.local_storage();

        log::debug!(
            "Inspected {} cookies and {} localStorage entries",
            cookies.len(),
            local_storage.len()
        );

        Ok(InspectionReport {
            cookies,
            local_storage,
        })
    }
}

/// A flagged entry in the JSON report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackerHit {
    pub category: &'static str,
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionReport {
    pub cookies: Vec<CookieEntry>,
    pub local_storage: Vec<StorageEntry>,
}

impl InspectionReport {
    pub fn render_html(&self) -> String {
        let mut body = String::from("<h1>Local data inspector</h1>\n");

        body.push_str("<h2>Cookies</h2>\n");
        body.push_str(&render_list(
            self.cookies.iter().map(|c| (c.name.as_str(), c.value.as_str())),
            NO_COOKIES,
        ));

        body.push_str("<h2>localStorage</h2>\n");
        body.push_str(&render_list(
            self.local_storage.iter().map(|e| (e.key.as_str(), e.value.as_str())),
            NO_LOCAL_STORAGE,
        ));

        html::document("Cookies and localStorage", &body)
    }

    /// Entries whose names match well-known identifier patterns
    pub fn likely_trackers(&self) -> Vec<TrackerHit> {
        let cookies = self
            .cookies
            .iter()
            .filter(|c| looks_like_tracker(&c.name))
            .map(|c| TrackerHit {
                category: "cookie",
                name: c.name.clone(),
                value: c.value.clone(),
            });

        let storage = self
            .local_storage
            .iter()
            .filter(|e| looks_like_tracker(&e.key))
            .map(|e| TrackerHit {
                category: "localStorage",
                name: e.key.clone(),
                value: e.value.clone(),
            });

        cookies.chain(storage).collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let value = serde_json::json!({
            "cookies": self.cookies,
            "localStorage": self.local_storage,
            "likelyTrackers": self.likely_trackers(),
        });
        serde_json::to_string_pretty(&value)
    }
}

fn render_list<'a>(items: impl Iterator<Item = (&'a str, &'a str)>, empty: &str) -> String {
    let rendered: Vec<String> = items
        .map(|(name, value)| format!("<li>{}: {}</li>\n", html::escape(name), html::escape(value)))
        .collect();

    if rendered.is_empty() {
        return format!("<p>{}</p>\n", empty);
    }

    format!("<ul>\n{}</ul>\n", rendered.concat())
}

fn looks_like_tracker(name: &str) -> bool {
    let lower = name.to_lowercase();
    TRACKER_NAMES.contains(&lower.as_str())
        || TRACKER_FRAGMENTS.iter().any(|f| lower.contains(f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::MemoryProbe;

    fn inspector_for(probe: MemoryProbe) -> Inspector {
        let probe = Arc::new(probe);
        Inspector::new(probe.clone(), probe)
    }

    #[tokio::test]
    async fn test_empty_environment_renders_placeholders_only() {
        let report = inspector_for(MemoryProbe::new()).inspect().await.unwrap();
        let html = report.render_html();

        assert_eq!(html.matches(NO_COOKIES).count(), 1);
        assert_eq!(html.matches(NO_LOCAL_STORAGE).count(), 1);
        assert!(!html.contains("<li>"));
        assert!(!html.contains("<ul>"));
    }

    #[tokio::test]
    async fn test_entries_rendered_as_name_value() {
        let probe = MemoryProbe::new();
        probe.set_cookie(CookieEntry::session("tracking", "true"));
        probe.set_local_storage_item("userID", "1234");

        let html = inspector_for(probe).inspect().await.unwrap().render_html();
        assert!(html.contains("<li>tracking: true</li>"));
        assert!(html.contains("<li>userID: 1234</li>"));
        assert!(!html.contains(NO_COOKIES));
        assert!(!html.contains(NO_LOCAL_STORAGE));
    }

    #[tokio::test]
    async fn test_empty_cookies_with_storage() {
        let probe = MemoryProbe::new();
        probe.set_local_storage_item("userID", "1234");

        let html = inspector_for(probe).inspect().await.unwrap().render_html();
        assert!(html.contains(NO_COOKIES));
        assert_eq!(html.matches("<li>").count(), 1);
    }

    #[tokio::test]
    async fn test_values_are_escaped() {
        let probe = MemoryProbe::new();
        probe.set_local_storage_item("<b>", "<script>alert(1)</script>");

        let html = inspector_for(probe).inspect().await.unwrap().render_html();
        assert!(html.contains("<li>&lt;b&gt;: &lt;script&gt;alert(1)&lt;/script&gt;</li>"));
    }

    #[tokio::test]
    async fn test_cookie_access_failure_is_reported() {
        let result = inspector_for(MemoryProbe::failing_elevated_access())
            .inspect()
            .await;
        assert!(matches!(result, Err(ProbeError::CookieAccess(_))));
    }

    #[test]
    fn test_likely_trackers() {
        let report = InspectionReport {
            cookies: vec![
                CookieEntry::session("_ga", "GA1.2.3"),
                CookieEntry::session("theme", "dark"),
                CookieEntry::session("tracking", "true"),
            ],
            local_storage: vec![
                StorageEntry::new("userID", "1234"),
                StorageEntry::new("device_hash", "ff00"),
                StorageEntry::new("canvas_hash", "0a0b"),
            ],
        };

        let names: Vec<_> = report.likely_trackers().into_iter().map(|h| h.name).collect();
        assert_eq!(names, vec!["_ga", "tracking", "userID", "device_hash"]);
    }

    #[test]
    fn test_json_report_includes_trackers() {
        let report = InspectionReport {
            cookies: vec![CookieEntry::session("uid", "42")],
            local_storage: vec![],
        };
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["likelyTrackers"][0]["name"], "uid");
        assert_eq!(value["likelyTrackers"][0]["category"], "cookie");
    }
}
