use pawtrack_telemetry::config::StoreConfig;
use pawtrack_telemetry::http_client::InfluxStoreClient;
use pawtrack_telemetry::{TelemetryStore, TrackerId};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example: expects PAWTRACK_INFLUX_URL in env
    let cfg = match StoreConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(());
        }
    };
    let client = InfluxStoreClient::from_config(&cfg);
    let tracker = TrackerId::parse(
        &std::env::args()
            .nth(1)
            .unwrap_or_else(|| "221".to_string()),
    )?;
    match client.query_recent(&tracker, 30).await? {
        Some(series) => println!(
            "tracker {}: {} rows, columns {:?}",
            tracker,
            series.row_count(),
            series.columns
        ),
        None => println!("tracker {}: no series", tracker),
    }
    Ok(())
}
