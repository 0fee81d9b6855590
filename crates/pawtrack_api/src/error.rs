//! Service-level errors for the HTTP surface.
//!
//! Report fetching itself never fails (the orchestrator folds every store
//! problem into the demo fallback); these cover the operations that can
//! legitimately refuse: overrides and identity routing.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("unknown tracker: {0}")]
    UnknownTracker(String),

    #[error("no report published yet for tracker {0}")]
    NotReady(String),
}

pub type ApiResult<T> = Result<T, ApiError>;
