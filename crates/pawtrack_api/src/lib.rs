//! Report derivation service for the pet-health dashboard.
//!
//! Polls a telemetry store for each tracked pet, derives a daily report
//! (activity, vitals, trend, device link, walking track) from the raw rows,
//! and serves it over HTTP. Every failure mode folds into a deterministic
//! demo fallback, tagged so the dashboard can say where the numbers came
//! from.

pub mod demo;
pub mod error;
pub mod http_api;
pub mod merge;
pub mod orchestrator;
pub mod pipeline;
pub mod poller;
pub mod types;

mod test_utils;
