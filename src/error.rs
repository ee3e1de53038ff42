use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

pub const CALLER_UPSTREAM_MESSAGE: &str = "Failed to validate business description";

/// Why a description was rejected before reaching the model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Business description is required")]
    Required,
    #[error("Business description is too long. Maximum {max} characters.")]
    TooLong { max: usize },
    #[error("Business description cannot be empty")]
    Empty,
}

/// Failures talking to the completion API or reading its output.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("completion API key is not configured")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Transport(String),
    #[error("request timed out")]
    Timeout,
    #[error("completion API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("completion response had no choices")]
    NoChoices,
    #[error("model output is not a valid analysis: {0}")]
    Malformed(String),
}

impl UpstreamError {
    /// Whether another attempt might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Terminal outcome of a rejected request.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("server credential is not configured")]
    Configuration,
    #[error("no credential supplied")]
    MissingCredential,
    #[error("credential does not match")]
    InvalidCredential,
    #[error("rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("upstream failure: {0}")]
    Upstream(#[from] UpstreamError),
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(rename = "retryAfter", skip_serializing_if = "Option::is_none")]
    retry_after: Option<u64>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Configuration | Self::Upstream(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::MissingCredential => StatusCode::UNAUTHORIZED,
            Self::InvalidCredential => StatusCode::FORBIDDEN,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Label used for the request outcome metric.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Configuration => "misconfigured",
            Self::MissingCredential => "unauthorized",
            Self::InvalidCredential => "forbidden",
            Self::RateLimited { .. } => "rate_limited",
            Self::Validation(_) => "invalid",
            Self::Upstream(_) | Self::Internal(_) => "upstream_error",
        }
    }

    /// Message shown to the caller. Upstream detail stays in the logs.
    pub fn caller_message(&self) -> String {
        match self {
            Self::Configuration => "API configuration error".to_string(),
            Self::MissingCredential => {
                "API key is required. Pass it via X-API-Key header or Authorization: Bearer header."
                    .to_string()
            }
            Self::InvalidCredential => "Invalid API key".to_string(),
            Self::RateLimited { .. } => "Too many requests. Please try again later.".to_string(),
            Self::Validation(err) => err.to_string(),
            Self::Upstream(_) | Self::Internal(_) => CALLER_UPSTREAM_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let retry_after = match &self {
            Self::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };
        let body = ErrorBody {
            error: self.caller_message(),
            retry_after,
        };

        let mut response = (self.status(), Json(body)).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}
