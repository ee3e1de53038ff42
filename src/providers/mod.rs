use async_trait::async_trait;

use crate::error::UpstreamError;
use crate::prompt::CompletionRequest;

/// A text completion backend: prompt in, raw completion text out.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn provider_name(&self) -> &str;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, UpstreamError>;
}

pub mod mock;
pub mod openai;

pub use mock::MockProvider;
pub use openai::OpenAiProvider;
