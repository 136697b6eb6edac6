//! HTML for the demo pages

use crate::enrichment::EnrichedRecord;
use crate::html::{document, escape};
use crate::probe::demo::{USER_ID_KEY, USER_ID_VALUE};

pub const SEEN_MESSAGE: &str = "Tracking cookie found: you have been seen on this site before.";
pub const NOT_SEEN_MESSAGE: &str =
    "No tracking cookie found: you have not been seen before. A tracking cookie has now been set.";
pub const NO_RECORD_MESSAGE: &str = "No such record.";

const LOCAL_STORAGE_SCRIPT: &str = r#"<p id="status">Writing to localStorage...</p>
<script>
  const previous = localStorage.getItem('__KEY__');
  localStorage.setItem('__KEY__', '__VALUE__');
  document.getElementById('status').textContent = previous === null
    ? 'Stored __KEY__=__VALUE__ in localStorage.'
    : '__KEY__ was already stored: ' + previous;
</script>
"#;

const FINGERPRINT_SCRIPT: &str = r#"<p id="status">Computing fingerprint...</p>
<script type="module">
  import FingerprintJS from __SCRIPT_URL__;

  const status = document.getElementById('status');
  try {
    const agent = await FingerprintJS.load();
    const { visitorId } = await agent.get();
    const response = await fetch('/api/fingerprints', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({
        visitorId,
        userAgent: navigator.userAgent,
        platform: navigator.platform,
        screenSize: `${screen.width}x${screen.height}`,
        hardwareConcurrency: navigator.hardwareConcurrency ?? null,
        deviceMemory: navigator.deviceMemory ?? null,
      }),
    });
    if (!response.ok) {
      throw new Error((await response.json()).error);
    }
    status.innerHTML = `Stored fingerprint <code>${visitorId}</code>. ` +
      `<a href="/lookup/${visitorId}">See what we know about you</a>.`;
  } catch (err) {
    status.textContent = 'Fingerprinting failed: ' + err.message;
  }
</script>
"#;

pub fn index_page() -> String {
    document(
        "Tracking demo",
        "<h1>Tracking demo</h1>\n\
         <ul>\n\
         <li><a href=\"/cookies\">Cookie tracking</a></li>\n\
         <li><a href=\"/local-storage\">localStorage tracking</a></li>\n\
         <li><a href=\"/fingerprint\">Device fingerprinting</a></li>\n\
         </ul>\n",
    )
}

pub fn cookie_page(seen_before: bool) -> String {
    let message = if seen_before { SEEN_MESSAGE } else { NOT_SEEN_MESSAGE };
    document(
        "Cookie tracking",
        &format!("<h1>Cookie tracking</h1>\n<p>{}</p>\n", message),
    )
}

pub fn local_storage_page() -> String {
    let script = LOCAL_STORAGE_SCRIPT
        .replace("__KEY__", USER_ID_KEY)
        .replace("__VALUE__", USER_ID_VALUE);
    document(
        "localStorage tracking",
        &format!("<h1>localStorage tracking</h1>\n{}", script),
    )
}

pub fn fingerprint_page(script_url: &str) -> String {
    let script = FINGERPRINT_SCRIPT.replace("__SCRIPT_URL__", &script_string(script_url));
    document(
        "Device fingerprinting",
        &format!("<h1>Device fingerprinting</h1>\n{}", script),
    )
}

/// A JS string literal that cannot close the enclosing script element
fn script_string(value: &str) -> String {
    serde_json::Value::String(value.to_string())
        .to_string()
        .replace('<', "\\u003c")
}

pub fn lookup_page(enriched: &EnrichedRecord) -> String {
    let info = &enriched.record.user_info;
    let optional = |value: Option<String>| value.unwrap_or_else(|| "unknown".to_string());

    let mut body = format!(
        "<h1>Visitor {}</h1>\n<h2>Recorded visit</h2>\n<ul>\n",
        escape(&enriched.visitor_id)
    );
    for (label, value) in [
        ("Timestamp", info.timestamp.to_rfc3339()),
        ("User agent", info.user_agent.clone()),
        ("OS", info.os.clone()),
        ("Screen size", info.screen_size.clone()),
        ("Logical processors", optional(info.hardware.map(|n| n.to_string()))),
        ("Device memory (GiB)", optional(info.device_model.map(|m| m.to_string()))),
        ("IP address", info.ip.clone()),
    ] {
        body.push_str(&format!("<li>{}: {}</li>\n", label, escape(&value)));
    }
    body.push_str("</ul>\n");

    if let Some(location) = &enriched.location {
        body.push_str(&format!(
            "<h2>Location</h2>\n<p>{}</p>\n",
            escape(&location.display_location())
        ));
    }

    body.push_str("<h2>WHOIS</h2>\n<ul>\n");
    for (key, value) in enriched.whois.iter() {
        body.push_str(&format!("<li>{}: {}</li>\n", escape(key), escape(value)));
    }
    body.push_str("</ul>\n");

    document("What we know about you", &body)
}

pub fn no_record_page(visitor_id: &str) -> String {
    document(
        "Lookup",
        &format!(
            "<h1>Visitor {}</h1>\n<p>{}</p>\n<p><a href=\"/fingerprint\">Record a fingerprint</a></p>\n",
            escape(visitor_id),
            NO_RECORD_MESSAGE
        ),
    )
}

pub fn error_page(message: &str) -> String {
    document(
        "Error",
        &format!("<h1>Something went wrong</h1>\n<p>{}</p>\n", escape(message)),
    )
}
