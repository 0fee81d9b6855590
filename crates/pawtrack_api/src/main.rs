use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::signal;
use tracing::info;

use pawtrack_api::http_api::{AppState, router};
use pawtrack_api::orchestrator::ReportService;
use pawtrack_api::poller::ReportFeed;
use pawtrack_telemetry::config::StoreConfig;
use pawtrack_telemetry::http_client::InfluxStoreClient;
use pawtrack_telemetry::{TelemetryStore, TrackerId};

/// Pets polled when `PAWTRACK_ROSTER` is not set.
const DEFAULT_ROSTER: &str = "221,105,302";
const DEFAULT_POLL_SECONDS: u64 = 300;
const DEFAULT_QUERY_LIMIT: u32 = 30;

/// Parse a comma-separated roster of tracker ids. Blank entries are
/// skipped; a malformed id or an empty roster is a startup error.
fn parse_roster(raw: &str) -> Result<Vec<TrackerId>, String> {
    let mut roster = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let tracker = TrackerId::parse(part).map_err(|e| e.to_string())?;
        if !roster.contains(&tracker) {
            roster.push(tracker);
        }
    }
    if roster.is_empty() {
        return Err(format!("PAWTRACK_ROSTER has no usable tracker ids: {raw:?}"));
    }
    Ok(roster)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}


#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Configure logging from env var `PAWTRACK_LOG_LEVEL` (or fallback to `RUST_LOG`, default `info`).
    let log_env = std::env::var("PAWTRACK_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(log_env.clone())
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
    tracing::info!(%log_env, "pawtrack_api: log filter");

    let builder = PrometheusBuilder::new();
    let handle = builder.install_recorder()?;

    let roster_raw = std::env::var("PAWTRACK_ROSTER").unwrap_or_else(|_| DEFAULT_ROSTER.to_string());
    let roster = match parse_roster(&roster_raw) {
        Ok(r) => r,
        Err(msg) => {
            tracing::error!(%msg, "bad roster; aborting startup");
            std::process::exit(1);
        }
    };
    let default_tracker = roster[0].clone();

    let query_limit = env_parse("PAWTRACK_QUERY_LIMIT", DEFAULT_QUERY_LIMIT);
    let poll_seconds = env_parse("PAWTRACK_POLL_SECONDS", DEFAULT_POLL_SECONDS);

    // A missing store is not fatal: the service comes up and serves demo
    // fallbacks until one is configured.
    let (service, store_configured) = match StoreConfig::from_env() {
        Ok(cfg) => {
            info!(base_url = %cfg.base_url, database = %cfg.database, "telemetry store configured");
            let store: Arc<dyn TelemetryStore> = Arc::new(InfluxStoreClient::from_config(&cfg));
            (ReportService::new(store, query_limit), true)
        }
        Err(err) => {
            tracing::warn!(error = %err, "no telemetry store; serving demo fallbacks");
            (ReportService::unconfigured(err.to_string(), query_limit), false)
        }
    };

    let feed = ReportFeed::spawn(Arc::new(service), roster, Duration::from_secs(poll_seconds));
    let state = Arc::new(AppState {
        feed,
        metrics: handle.clone(),
        store_configured,
        default_tracker,
    });
    let app = router(state.clone());

    let addr: SocketAddr = std::env::var("PAWTRACK_ADDR")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3000)));
    info!(%addr, poll_seconds, roster = %roster_raw, "starting HTTP server");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };

    let server = axum::serve(listener, app.into_make_service());
    if let Err(e) = server
        .with_graceful_shutdown(async {
            signal::ctrl_c()
                .await
                .expect("failed to install ctrl+c handler");
        })
        .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    state.feed.shutdown();
    Ok(())
}
