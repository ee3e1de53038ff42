//! BizCheckr validation service.
//!
//! Accepts a free-text business description, asks a chat-completions model
//! which of WHAT / WHOM / WHERE it states explicitly, and returns a
//! completeness score with suggestions for whatever is missing.

pub mod analysis;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod prompt;
pub mod providers;
pub mod rate_limit;
pub mod scoring;
pub mod state;
pub mod sweeper;
pub mod validation;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, UpstreamError, ValidationError};
pub use models::{ExternalAnalysis, ValidationResult};
pub use state::AppState;

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/api/validate-business", post(handlers::validate_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
