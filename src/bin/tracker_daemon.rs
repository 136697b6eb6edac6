use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::watch;

use tracking_lab::config::Config;
use tracking_lab::geolocation::GeoIpService;
use tracking_lab::persistence::SqliteFingerprintStore;
use tracking_lab::server::{self, AppState};
use tracking_lab::whois::WhoisProxy;

/// Tracking demo web app entry point
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Starting tracking demo...");

    // Load configuration
    let config_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    let config = if config_path.exists() {
        Config::from_file(&config_path)?
    } else {
        log::warn!("Config file not found, using defaults");
        Config::default()
    };

    // Setup graceful shutdown signal handling
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal, gracefully stopping...");
        let _ = shutdown_tx.send(true);
    })?;

    let store = Arc::new(SqliteFingerprintStore::new(&config.store.db_path)?);
    log::info!("Fingerprint store: {:?}", config.store.db_path);

    let whois = WhoisProxy::from_config(&config.whois);
    log::info!("WHOIS backend: {}", config.whois.backend);

    let geoip = match &config.geoip.db_path {
        Some(path) => match GeoIpService::new(path) {
            Ok(service) => {
                log::info!("GeoIP enrichment enabled: {:?}", path);
                Some(service)
            }
            Err(e) => {
                log::warn!("GeoIP disabled: {}", e);
                None
            }
        },
        None => None,
    };

    let state = AppState::new(store, whois, geoip, &config);
    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;

    server::serve(listener, state, async move {
        let _ = shutdown_rx.wait_for(|stop| *stop).await;
    })
    .await?;

    log::info!("Tracking demo stopped");
    Ok(())
}
