//! HTTP client for the InfluxDB-compatible telemetry store.
//!
//! This module provides a reqwest-based implementation of the [`TelemetryStore`](crate::TelemetryStore) trait.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};

use crate::config::StoreConfig;
use crate::{QueryResponse, Series, StoreError, TelemetryStore, TrackerId, query};

/// Upper bound on one store round-trip; a hung upstream connection must not
/// stall the poll loop.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the store's `/query` interface using reqwest.
#[derive(Clone, Debug)]
pub struct InfluxStoreClient {
    base_url: String,
    database: String,
    token: Option<SecretString>,
    client: reqwest::Client,
}

impl InfluxStoreClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the store (e.g., "http://influx:8086")
    /// * `database` - Database holding the pet-activity measurement
    /// * `token` - Optional credential sent as an `Authorization: Token` header
    pub fn new(base_url: &str, database: impl Into<String>, token: Option<SecretString>) -> Self {
        Self::with_timeout(base_url, database, token, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: &str,
        database: impl Into<String>,
        token: Option<SecretString>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client build should not fail");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            database: database.into(),
            token,
            client,
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(
            &config.base_url,
            config.database.clone(),
            config.token.clone(),
        )
    }

    /// Build the query request; `db` and `q` travel as URL parameters.
    fn query_request(&self, statement: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/query", self.base_url);
        let mut request = self
            .client
            .get(url)
            .query(&[("db", self.database.as_str()), ("q", statement)])
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.header(
                reqwest::header::AUTHORIZATION,
                format!("Token {}", token.expose_secret()),
            );
        }
        request
    }

    async fn run_statement(&self, statement: &str) -> Result<Option<Series>, StoreError> {
        metrics::counter!("store_queries_total").increment(1);
        tracing::debug!(%statement, "querying telemetry store");
        let resp = self.query_request(statement).send().await?;
        let response = self.handle_response(resp).await?;
        response.into_first_series()
    }

    /// Handle a response, converting status codes and body defects to
    /// appropriate errors.
    async fn handle_response(&self, resp: reqwest::Response) -> Result<QueryResponse, StoreError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(self.error_from_response(resp).await);
        }
        let body = resp.text().await?;
        parse_query_body(&body)
    }

    /// Extract error information from a failed response.
    async fn error_from_response(&self, resp: reqwest::Response) -> StoreError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let snippet: String = body.chars().take(256).collect();
        StoreError::Status { status, snippet }
    }
}

/// Parse a `/query` body, separating "not JSON at all" (usually an HTML error
/// page from a misrouted base URL) from "JSON of the wrong shape".
fn parse_query_body(body: &str) -> Result<QueryResponse, StoreError> {
    if body.trim_start().starts_with('<') {
        return Err(StoreError::ContentType(
            "HTML where JSON was expected; the store URL likely routes to a web page".into(),
        ));
    }
    serde_json::from_str::<QueryResponse>(body).map_err(|e| {
        let snippet: String = body.chars().take(128).collect();
        if serde_json::from_str::<serde_json::Value>(body).is_ok() {
            StoreError::Schema(format!("{e}; body starts {snippet:?}"))
        } else {
            StoreError::ContentType(format!("{e}; body starts {snippet:?}"))
        }
    })
}

#[async_trait]
impl TelemetryStore for InfluxStoreClient {
    async fn query_recent(
        &self,
        tracker: &TrackerId,
        limit: u32,
    ) -> Result<Option<Series>, StoreError> {
        self.run_statement(&query::recent_activity(tracker, limit))
            .await
    }

    async fn query_window(
        &self,
        tracker: &TrackerId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<Series>, StoreError> {
        self.run_statement(&query::activity_between(
            tracker,
            start,
            end,
            query::HISTORY_ROW_LIMIT,
        ))
        .await
    }
}
