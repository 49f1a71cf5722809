//! snapsort-ic library interface
//!
//! Image intent classification: an uploaded image is labelled Shopping,
//! Document, Music or Other by a remote multimodal model, with validation and
//! bounded retry around the non-deterministic reply.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult, UploadError};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use snapsort_common::config::DEFAULT_MAX_UPLOAD_BYTES;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::services::{ImageClassifier, RetryPolicy};

/// Module name used in logs, health output and the config file name
pub const MODULE_NAME: &str = "snapsort-ic";

/// Application state shared across handlers
///
/// Everything here is immutable after startup; each request owns its own
/// image buffer and retry counter.
#[derive(Clone)]
pub struct AppState {
    /// Remote (or test double) classifier
    pub classifier: Arc<dyn ImageClassifier>,
    pub retry_policy: RetryPolicy,
    /// Request body cap for uploads
    pub max_upload_bytes: usize,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(classifier: Arc<dyn ImageClassifier>, retry_policy: RetryPolicy) -> Self {
        Self {
            classifier,
            retry_policy,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            startup_time: Utc::now(),
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .merge(api::root_routes())
        .merge(api::classify_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
