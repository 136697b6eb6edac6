//! Route handlers
//!
//! Every handler awaits its I/O sequentially and returns on the first
//! failure; nothing is retried.

use super::error::ApiError;
use super::pages;
use super::AppState;
use crate::collector::{client_ip, Collected};
use crate::enrichment::{lookup_and_enrich, EnrichedRecord, Outcome};
use crate::geolocation::IpLocator;
use crate::models::{DeviceAttributes, WhoisRecord};
use crate::probe::demo::{TRACKING_COOKIE, TRACKING_COOKIE_VALUE};
use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use std::net::SocketAddr;

/// Body posted by the fingerprint page
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectRequest {
    #[serde(default)]
    pub visitor_id: Option<String>,
    #[serde(flatten)]
    pub attributes: DeviceAttributes,
}

#[derive(Debug, Deserialize)]
pub struct WhoisQuery {
    pub ip: Option<String>,
}

/// Whether the request carries a cookie with the given name
pub fn has_cookie(headers: &HeaderMap, name: &str) -> bool {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .any(|(key, _)| key.trim() == name)
}

pub async fn index() -> Html<String> {
    Html(pages::index_page())
}

pub async fn cookie_demo(headers: HeaderMap) -> impl IntoResponse {
    let seen = has_cookie(&headers, TRACKING_COOKIE);
    log::debug!("Cookie demo visit, seen before: {}", seen);

    (
        [(SET_COOKIE, format!("{}={}", TRACKING_COOKIE, TRACKING_COOKIE_VALUE))],
        Html(pages::cookie_page(seen)),
    )
}

pub async fn local_storage_demo() -> Html<String> {
    Html(pages::local_storage_page())
}

pub async fn fingerprint_demo(State(state): State<AppState>) -> Html<String> {
    Html(pages::fingerprint_page(&state.fingerprint_script_url))
}

pub async fn collect_fingerprint(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Result<Json<CollectRequest>, JsonRejection>,
) -> Result<Json<Collected>, ApiError> {
    let Json(request) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let ip = client_ip(
        &headers,
        connect_info.map(|ConnectInfo(addr)| addr),
        state.trust_forwarded_for,
    );

    let collected = state
        .collector
        .collect(request.visitor_id, &request.attributes, ip)?;
    Ok(Json(collected))
}

async fn enrich(state: &AppState, visitor_id: &str) -> Outcome<EnrichedRecord> {
    lookup_and_enrich(
        state.store.as_ref(),
        &state.whois,
        state.geoip.as_ref().map(|service| service as &dyn IpLocator),
        visitor_id,
    )
    .await
}

pub async fn lookup_record(
    State(state): State<AppState>,
    Path(visitor_id): Path<String>,
) -> Result<Json<EnrichedRecord>, ApiError> {
    match enrich(&state, &visitor_id).await {
        Outcome::Found(enriched) => Ok(Json(enriched)),
        Outcome::Absent => Err(ApiError::NotFound(visitor_id)),
        Outcome::Failed(e) => Err(e.into()),
    }
}

pub async fn lookup_page(
    State(state): State<AppState>,
    Path(visitor_id): Path<String>,
) -> Response {
    match enrich(&state, &visitor_id).await {
        Outcome::Found(enriched) => Html(pages::lookup_page(&enriched)).into_response(),
        Outcome::Absent => (
            StatusCode::NOT_FOUND,
            Html(pages::no_record_page(&visitor_id)),
        )
            .into_response(),
        Outcome::Failed(e) => {
            let err = ApiError::from(e);
            (err.status_code(), Html(pages::error_page(&err.public_message()))).into_response()
        }
    }
}

pub async fn whois_lookup(
    State(state): State<AppState>,
    Query(query): Query<WhoisQuery>,
) -> Result<Json<WhoisRecord>, ApiError> {
    let ip = query
        .ip
        .ok_or_else(|| ApiError::BadRequest("Missing ip query parameter".to_string()))?;

    let record = state.whois.lookup(&ip).await?;
    Ok(Json(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_has_cookie() {
        let mut headers = HeaderMap::new();
        assert!(!has_cookie(&headers, "tracking"));

        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; tracking=true"));
        assert!(has_cookie(&headers, "tracking"));
        assert!(!has_cookie(&headers, "track"));
    }

    #[test]
    fn test_has_cookie_across_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("a=1"));
        headers.append(COOKIE, HeaderValue::from_static("tracking=true"));
        assert!(has_cookie(&headers, "tracking"));
    }

    #[test]
    fn test_collect_request_shape() {
        let request: CollectRequest = serde_json::from_str(
            r#"{"visitorId": "abc123", "userAgent": "UA", "platform": "MacIntel",
                "screenSize": "1440x900", "hardwareConcurrency": 8, "deviceMemory": null}"#,
        )
        .unwrap();

        assert_eq!(request.visitor_id.as_deref(), Some("abc123"));
        assert_eq!(request.attributes.platform, "MacIntel");
        assert_eq!(request.attributes.hardware_concurrency, Some(8));
        assert!(request.attributes.device_memory.is_none());
    }
}
