use axum::{
    Json,
    body::Body,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::{error, info, warn};

use crate::analysis::parse_analysis;
use crate::auth::authorize;
use crate::error::ApiError;
use crate::metrics::{SCORE, record_outcome};
use crate::models::ValidationResult;
use crate::prompt::CompletionRequest;
use crate::rate_limit::{RateLimitDecision, client_key};
use crate::scoring::score;
use crate::state::AppState;
use crate::validation::{read_body, validate_description};

// Attach quota headers to whatever the request ended with
fn with_quota_headers(mut response: Response, decision: &RateLimitDecision) -> Response {
    response.headers_mut().extend(decision.headers());
    response
}

fn reject(err: ApiError) -> Response {
    record_outcome(err.outcome());
    err.into_response()
}

pub async fn validate_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    // Access control comes before quota so auth failures cost nothing
    if let Err(err) = authorize(state.api_key.as_deref(), &headers) {
        match &err {
            ApiError::Configuration => error!("Server API key is not configured"),
            _ => warn!(reason = %err, "Rejected request credential"),
        }
        return reject(err);
    }

    let key = client_key(&headers);
    let now = Utc::now();
    let decision = state.limiter.check(&key, now).await;

    if !decision.allowed {
        let retry_after_secs = decision.retry_after_secs(now);
        warn!(client = %key, retry_after_secs, "Rate limit exceeded");
        return with_quota_headers(reject(ApiError::RateLimited { retry_after_secs }), &decision);
    }

    let response = match run_validation(&state, body).await {
        Ok(result) => {
            info!(client = %key, score = result.score, missing = ?result.missing, "Description validated");
            record_outcome("ok");
            SCORE.observe(result.score as f64);
            Json(result).into_response()
        }
        Err(err) => {
            match &err {
                ApiError::Upstream(cause) => {
                    error!(client = %key, provider = state.provider.provider_name(), error = %cause, "Validation failed upstream")
                }
                _ => info!(client = %key, reason = %err, "Rejected description"),
            }
            reject(err)
        }
    };

    with_quota_headers(response, &decision)
}

async fn run_validation(state: &AppState, body: Body) -> Result<ValidationResult, ApiError> {
    let bytes = read_body(body).await?;
    let description = validate_description(&bytes)?;

    let request = CompletionRequest::for_description(&description);
    let raw = state.provider.complete(&request).await?;
    let analysis = parse_analysis(&raw)?;

    Ok(score(analysis))
}
