use std::sync::Arc;

use crate::providers::CompletionProvider;
use crate::rate_limit::RateLimitStore;

// app's shared state
#[derive(Clone)]
pub struct AppState {
    pub api_key: Option<String>, // server credential, None means misconfigured
    pub limiter: Arc<dyn RateLimitStore>,
    pub provider: Arc<dyn CompletionProvider>,
}

impl AppState {
    pub fn new(
        api_key: Option<String>,
        limiter: Arc<dyn RateLimitStore>,
        provider: Arc<dyn CompletionProvider>,
    ) -> Self {
        Self {
            api_key,
            limiter,
            provider,
        }
    }
}
