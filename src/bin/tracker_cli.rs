use std::path::PathBuf;
use std::sync::Arc;
use structopt::StructOpt;

use tracking_lab::collector::{AttributeFingerprinter, FingerprintCollector};
use tracking_lab::config::Config;
use tracking_lab::enrichment::{lookup_and_enrich, Outcome};
use tracking_lab::geolocation::{GeoIpService, IpLocator};
use tracking_lab::inspector::Inspector;
use tracking_lab::persistence::{FingerprintStore, SqliteFingerprintStore};
use tracking_lab::probe::{demo, SnapshotProbe};
use tracking_lab::whois::WhoisProxy;

/// Tracking demo command line interface
#[derive(StructOpt, Debug)]
#[structopt(name = "tracker", about = "Browser tracking demo CLI")]
pub enum Cli {
    /// Generate a default configuration file
    Config {
        /// Output path for the configuration file
        #[structopt(short, long, default_value = "config.toml")]
        output: PathBuf,
    },
    /// Render the cookies and localStorage of a browser snapshot
    Inspect {
        /// Browser snapshot (JSON)
        #[structopt(short, long)]
        snapshot: PathBuf,
        /// Write the report here instead of stdout
        #[structopt(short, long)]
        output: Option<PathBuf>,
        /// Report format: "html" or "json"
        #[structopt(short, long, default_value = "html")]
        format: String,
    },
    /// Plant the demo's tracking cookie and localStorage item in a snapshot
    Simulate {
        /// Browser snapshot (JSON); created if missing
        #[structopt(short, long)]
        snapshot: PathBuf,
    },
    /// Record a fingerprint for the device described by a snapshot
    Collect {
        #[structopt(short, long, default_value = "config.toml")]
        config: PathBuf,
        /// Browser snapshot (JSON)
        #[structopt(short, long)]
        snapshot: PathBuf,
        /// Client IP to record
        #[structopt(long)]
        ip: String,
        /// Visitor id; derived from the device attributes when omitted
        #[structopt(long)]
        visitor_id: Option<String>,
    },
    /// Query WHOIS for an IPv4 address
    Whois {
        #[structopt(short, long, default_value = "config.toml")]
        config: PathBuf,
        #[structopt(long)]
        ip: String,
    },
    /// Look up a stored fingerprint and enrich it with WHOIS data
    Show {
        #[structopt(short, long, default_value = "config.toml")]
        config: PathBuf,
        #[structopt(long)]
        visitor_id: String,
    },
    /// List recently stored visitor ids
    Records {
        #[structopt(short, long, default_value = "config.toml")]
        config: PathBuf,
        /// Number of ids to show
        #[structopt(short, long, default_value = "10")]
        limit: usize,
    },
}

fn load_config(path: &PathBuf) -> Result<Config, Box<dyn std::error::Error>> {
    if path.exists() {
        Config::from_file(path)
    } else {
        log::warn!("Config file {:?} not found, using defaults", path);
        Ok(Config::default())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();

    let cli = Cli::from_args();

    match cli {
        Cli::Config { output } => {
            let config = Config::default();
            config.to_file(&output)?;
            println!("Default configuration written to: {:?}", output);
        }
        Cli::Inspect {
            snapshot,
            output,
            format,
        } => {
            let probe = Arc::new(SnapshotProbe::load(&snapshot)?);
            let report = Inspector::new(probe.clone(), probe).inspect().await?;

            let rendered = match format.to_lowercase().as_str() {
                "json" => report.to_json()?,
                "html" => report.render_html(),
                other => {
                    eprintln!("Unknown format {:?}, expected html or json", other);
                    std::process::exit(1);
                }
            };

            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)?;
                    println!("Report written to: {:?}", path);
                }
                None => print!("{}", rendered),
            }
        }
        Cli::Simulate { snapshot } => {
            let probe = SnapshotProbe::load(&snapshot)?;
            let seen = demo::seen_before(&probe);
            demo::plant_tracking_cookie(&probe);
            demo::plant_user_id(&probe);
            probe.save()?;

            println!(
                "{} tracking cookie and {}={} in {:?}",
                if seen { "Refreshed" } else { "Planted" },
                demo::USER_ID_KEY,
                demo::USER_ID_VALUE,
                probe.path()
            );
        }
        Cli::Collect {
            config,
            snapshot,
            ip,
            visitor_id,
        } => {
            let config = load_config(&config)?;
            let store = Arc::new(SqliteFingerprintStore::new(&config.store.db_path)?);
            let probe = SnapshotProbe::load(&snapshot)?;

            let collector = FingerprintCollector::new(store, Arc::new(AttributeFingerprinter));
            let collected = collector.collect_from_probe(&probe, visitor_id, ip)?;
            println!("{}", serde_json::to_string_pretty(&collected)?);
        }
        Cli::Whois { config, ip } => {
            let config = load_config(&config)?;
            let proxy = WhoisProxy::from_config(&config.whois);
            let record = proxy.lookup(&ip).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Cli::Show { config, visitor_id } => {
            let config = load_config(&config)?;
            let store = SqliteFingerprintStore::new(&config.store.db_path)?;
            let proxy = WhoisProxy::from_config(&config.whois);
            let geoip = config
                .geoip
                .db_path
                .as_ref()
                .and_then(|path| match GeoIpService::new(path) {
                    Ok(service) => Some(service),
                    Err(e) => {
                        log::warn!("GeoIP disabled: {}", e);
                        None
                    }
                });
            let locator = geoip.as_ref().map(|service| service as &dyn IpLocator);

            match lookup_and_enrich(&store, &proxy, locator, &visitor_id).await {
                Outcome::Found(enriched) => {
                    println!("{}", serde_json::to_string_pretty(&enriched)?);
                }
                Outcome::Absent => {
                    println!("No such record: {}", visitor_id);
                }
                Outcome::Failed(e) => {
                    eprintln!("Lookup failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Cli::Records { config, limit } => {
            let config = load_config(&config)?;
            let store = SqliteFingerprintStore::new(&config.store.db_path)?;
            let ids = store.list_visitor_ids(limit)?;

            if ids.is_empty() {
                println!("No fingerprint records stored.");
            }
            for id in ids {
                println!("{}", id);
            }
        }
    }

    Ok(())
}
