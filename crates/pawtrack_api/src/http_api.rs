//! HTTP surface for the dashboard.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router, debug_handler};
use chrono::{SecondsFormat, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use pawtrack_telemetry::TrackerId;
use pawtrack_telemetry::observability::Health;
use serde::{Deserialize, Serialize};
use tower_http::timeout::TimeoutLayer;

use crate::demo;
use crate::error::ApiError;
use crate::merge::ReportPatch;
use crate::poller::ReportFeed;
use crate::types::{FetchOutcome, SourceStatus};

/// How long one request may wait for a first publication; covers a full
/// store timeout plus slack.
const FIRST_REPORT_WAIT: Duration = Duration::from_secs(12);

/// Whole-request deadline, above the first-report wait.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct AppState {
    pub feed: ReportFeed,
    pub metrics: PrometheusHandle,
    pub store_configured: bool,
    /// Served when a request names no pet; the first roster entry.
    pub default_tracker: TrackerId,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/telemetry", get(get_telemetry))
        .route("/api/telemetry/refresh", post(post_refresh))
        .route("/api/report/override", post(post_override))
        .route("/api/health", get(get_health))
        .route("/metrics", get(metrics_endpoint))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetQuery {
    pet_id: Option<String>,
}

/// Current daily report. Never errors for a roster pet: if no poll has
/// landed yet one is requested and awaited, and if even that stalls the
/// deterministic demo fallback goes out instead of an error page.
#[debug_handler]
async fn get_telemetry(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PetQuery>,
) -> Result<Json<FetchOutcome>, (StatusCode, String)> {
    let tracker = resolve_tracker(&state, params.pet_id.as_deref())?;
    if let Some(outcome) = state.feed.latest(&tracker) {
        return Ok(Json(outcome.as_ref().clone()));
    }

    state.feed.refresh(&tracker);
    if let Some(outcome) = state.feed.wait_for_report(&tracker, FIRST_REPORT_WAIT).await {
        return Ok(Json(outcome.as_ref().clone()));
    }

    tracing::warn!(tracker = %tracker, "no publication in time; serving demo fallback");
    Ok(Json(FetchOutcome {
        report: demo::demo_report(&tracker, Utc::now()),
        source: SourceStatus::demo(format!(
            "first fetch for tracker {tracker} still in flight"
        )),
    }))
}

/// Queue an immediate poll; 202 means queued (or coalesced into one already
/// pending), not completed.
#[debug_handler]
async fn post_refresh(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PetQuery>,
) -> Result<StatusCode, (StatusCode, String)> {
    let tracker = resolve_tracker(&state, params.pet_id.as_deref())?;
    state.feed.refresh(&tracker);
    Ok(StatusCode::ACCEPTED)
}

#[debug_handler]
async fn post_override(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PetQuery>,
    Json(patch): Json<ReportPatch>,
) -> Result<Json<FetchOutcome>, (StatusCode, String)> {
    let tracker = resolve_tracker(&state, params.pet_id.as_deref())?;
    match state.feed.apply_override(&tracker, &patch) {
        Ok(outcome) => Ok(Json(outcome.as_ref().clone())),
        Err(err) => Err(map_err(err)),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthBody {
    status: &'static str,
    store_configured: bool,
    timestamp: String,
}

#[debug_handler]
async fn get_health(State(state): State<Arc<AppState>>) -> Json<HealthBody> {
    let health = Health::readiness(state.store_configured);
    Json(HealthBody {
        status: if health.ready && health.store_configured {
            "ok"
        } else {
            "degraded"
        },
        store_configured: health.store_configured,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    })
}

#[debug_handler]
async fn metrics_endpoint(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = state.metrics.render();
    ([("content-type", "text/plain; version=0.0.4")], body)
}

/// Identity routing: no id means the default pet; anything else must be a
/// well-formed id on the roster.
fn resolve_tracker(
    state: &AppState,
    pet_id: Option<&str>,
) -> Result<TrackerId, (StatusCode, String)> {
    let Some(raw) = pet_id else {
        return Ok(state.default_tracker.clone());
    };
    let tracker = TrackerId::parse(raw)
        .map_err(|err| (StatusCode::NOT_FOUND, err.to_string()))?;
    if !state.feed.contains(&tracker) {
        return Err((
            StatusCode::NOT_FOUND,
            format!("tracker {tracker} is not on the roster"),
        ));
    }
    Ok(tracker)
}

fn map_err(err: ApiError) -> (StatusCode, String) {
    let status = match err {
        ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ApiError::UnknownTracker(_) => StatusCode::NOT_FOUND,
        ApiError::NotReady(_) => StatusCode::CONFLICT,
    };
    (status, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_mapping_covers_every_class() {
        let (status, body) = map_err(ApiError::Validation("completionRate 2 is outside [0, 1]".into()));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("completionRate"));

        let (status, _) = map_err(ApiError::UnknownTracker("404".into()));
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = map_err(ApiError::NotReady("221".into()));
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body.contains("221"));
    }
}
