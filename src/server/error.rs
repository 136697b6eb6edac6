//! Error responses for the demo app

use crate::enrichment::LookupError;
use crate::persistence::PersistenceError;
use crate::whois::ProxyError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed input, rejected before any upstream call
    #[error("{0}")]
    BadRequest(String),

    #[error("No such record: {0}")]
    NotFound(String),

    /// WHOIS failure; the underlying message is passed through
    #[error("{0}")]
    Upstream(String),

    /// Store failure; logged, reported generically
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show a visitor
    pub fn public_message(&self) -> String {
        match self {
            Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<ProxyError> for ApiError {
    fn from(e: ProxyError) -> Self {
        match e {
            ProxyError::InvalidIp(e) => ApiError::BadRequest(e.to_string()),
            upstream @ ProxyError::Upstream(_) => ApiError::Upstream(upstream.to_string()),
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(e: PersistenceError) -> Self {
        log::error!("Store error: {}", e);
        ApiError::Internal(e.to_string())
    }
}

impl From<LookupError> for ApiError {
    fn from(e: LookupError) -> Self {
        match e {
            LookupError::Store(e) => e.into(),
            LookupError::InvalidIp(e) => ApiError::BadRequest(e.to_string()),
            whois @ LookupError::Whois(_) => ApiError::Upstream(whois.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.public_message() });
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;
    use crate::whois::WhoisError;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            ApiError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Upstream("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_proxy_errors_map_to_client_and_server_errors() {
        let invalid: ApiError =
            ProxyError::InvalidIp(ValidationError::InvalidIpv4("999.1.1.1".into())).into();
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);

        let upstream: ApiError = ProxyError::Upstream(WhoisError::Status(502)).into();
        assert_eq!(upstream.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(upstream.public_message().contains("502"));
    }

    #[test]
    fn test_internal_details_not_exposed() {
        let err = ApiError::Internal("disk I/O error at /var/lib/fp.db".into());
        assert_eq!(err.public_message(), "Internal server error");
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
