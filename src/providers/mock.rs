use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::CompletionProvider;
use crate::error::UpstreamError;
use crate::prompt::CompletionRequest;

/// Scripted provider for tests. Replies are served in order; once the script
/// runs out the fallback reply is repeated.
pub struct MockProvider {
    script: Mutex<VecDeque<Result<String, UpstreamError>>>,
    fallback: String,
    received: Mutex<Vec<CompletionRequest>>,
}

impl MockProvider {
    pub fn new(fallback: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: fallback.to_string(),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn with_reply(self, reply: &str) -> Self {
        self.push(Ok(reply.to_string()));
        self
    }

    pub fn with_error(self, error: UpstreamError) -> Self {
        self.push(Err(error));
        self
    }

    fn push(&self, item: Result<String, UpstreamError>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(item);
        }
    }

    /// Requests seen so far.
    pub fn received(&self) -> Vec<CompletionRequest> {
        self.received.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, UpstreamError> {
        if let Ok(mut received) = self.received.lock() {
            received.push(request.clone());
        }
        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}
