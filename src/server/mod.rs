//! HTTP surface of the tracking demo
//!
//! | Route | Purpose |
//! |---|---|
//! | `GET /` | index of the demos |
//! | `GET /cookies` | set and detect the `tracking` cookie |
//! | `GET /local-storage` | write `userID` into localStorage |
//! | `GET /fingerprint` | compute and submit a fingerprint |
//! | `POST /api/fingerprints` | store a fingerprint record |
//! | `GET /api/fingerprints/:id` | record plus WHOIS as JSON |
//! | `GET /lookup/:id` | record plus WHOIS as HTML |
//! | `GET /api/whois?ip=` | WHOIS proxy |

pub mod error;
pub mod handlers;
pub mod pages;

pub use error::ApiError;

use crate::collector::{AttributeFingerprinter, FingerprintCollector};
use crate::config::Config;
use crate::geolocation::GeoIpService;
use crate::persistence::FingerprintStore;
use crate::whois::WhoisProxy;
use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Shared handles injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FingerprintStore>,
    pub collector: Arc<FingerprintCollector>,
    pub whois: WhoisProxy,
    pub geoip: Option<GeoIpService>,
    pub trust_forwarded_for: bool,
    pub fingerprint_script_url: String,
}

impl AppState {
    pub fn new(
        store: Arc<dyn FingerprintStore>,
        whois: WhoisProxy,
        geoip: Option<GeoIpService>,
        config: &Config,
    ) -> Self {
        let collector = FingerprintCollector::new(store.clone(), Arc::new(AttributeFingerprinter));
        AppState {
            store,
            collector: Arc::new(collector),
            whois,
            geoip,
            trust_forwarded_for: config.server.trust_forwarded_for,
            fingerprint_script_url: config.pages.fingerprint_script_url.clone(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/cookies", get(handlers::cookie_demo))
        .route("/local-storage", get(handlers::local_storage_demo))
        .route("/fingerprint", get(handlers::fingerprint_demo))
        .route("/api/fingerprints", post(handlers::collect_fingerprint))
        .route("/api/fingerprints/:visitor_id", get(handlers::lookup_record))
        .route("/lookup/:visitor_id", get(handlers::lookup_page))
        .route("/api/whois", get(handlers::whois_lookup))
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        log::info!("Tracking demo listening on http://{}", addr);
    }

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}
