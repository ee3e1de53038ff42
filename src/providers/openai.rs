use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::CompletionProvider;
use crate::config::CompletionConfig;
use crate::error::UpstreamError;
use crate::metrics::{UPSTREAM_LATENCY, UPSTREAM_RETRIES};
use crate::models::{ChatMessage, ChatRequest, ChatResponse};
use crate::prompt::CompletionRequest;

const RETRY_BACKOFF: Duration = Duration::from_millis(250);

// OpenAI compatible chat completions client
pub struct OpenAiProvider {
    client: reqwest::Client,
    config: CompletionConfig,
}

impl OpenAiProvider {
    pub fn new(config: CompletionConfig) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    async fn attempt(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<String, UpstreamError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            n: 1,
        };

        let res = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = res.json().await?;
        first_choice_text(parsed)
    }
}

/// Text of the single requested completion. Null content reads as empty.
pub fn first_choice_text(response: ChatResponse) -> Result<String, UpstreamError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or(UpstreamError::NoChoices)?;
    Ok(choice.message.content.unwrap_or_default())
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, UpstreamError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(UpstreamError::MissingApiKey)?;

        let start = Instant::now();
        let mut attempt = 0;
        let result = loop {
            match self.attempt(api_key, request).await {
                Err(err) if err.is_transient() && attempt < self.config.max_retries => {
                    attempt += 1;
                    UPSTREAM_RETRIES.inc();
                    warn!(attempt, error = %err, "Completion attempt failed, retrying");
                    tokio::time::sleep(RETRY_BACKOFF).await;
                }
                other => break other,
            }
        };

        let elapsed = start.elapsed();
        UPSTREAM_LATENCY.observe(elapsed.as_secs_f64());
        debug!(
            model = %self.config.model,
            attempts = attempt + 1,
            elapsed_ms = elapsed.as_millis() as u64,
            ok = result.is_ok(),
            "Completion finished"
        );
        result
    }
}
