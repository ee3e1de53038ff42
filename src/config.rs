use clap::Parser;
use std::time::Duration;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "bizcheckr")]
#[command(about = "Validates business descriptions for what, whom and where")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    // Server credential callers must present
    #[arg(long, env = "BIZCHECKR_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    // Key for the completion API
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    // Completion API base url
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub openai_url: String,

    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4o-mini")]
    pub model: String,

    // Per attempt timeout in seconds
    #[arg(long, default_value_t = 15)]
    pub upstream_timeout_secs: u64,

    // Extra attempts on transient upstream failures
    #[arg(long, default_value_t = 1)]
    pub upstream_retries: u32,

    // Rate limit max requests per window
    #[arg(long, default_value_t = 50)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, default_value_t = 60)]
    pub rate_window: u64,

    // Seconds between stale rate limit entry sweeps
    #[arg(long, default_value_t = 300)]
    pub sweep_interval: u64,
}

// Longest accepted rate limit window, one day
pub const MAX_RATE_WINDOW_SECS: u64 = 86_400;

/// Fixed-window quota settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimiterConfig {
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            max_requests: 50,
            window: Duration::from_secs(60),
        }
    }
}

/// Settings for the chat-completions client.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            timeout: Duration::from_secs(15),
            max_retries: 1,
        }
    }
}

impl Args {
    /// Reject settings that would make the service unusable.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.rate_limit == 0 {
            anyhow::bail!("--rate-limit must be at least 1");
        }
        if self.rate_window == 0 || self.rate_window > MAX_RATE_WINDOW_SECS {
            anyhow::bail!(
                "--rate-window must be between 1 and {} seconds",
                MAX_RATE_WINDOW_SECS
            );
        }
        if self.sweep_interval == 0 {
            anyhow::bail!("--sweep-interval must be at least 1 second");
        }
        if self.upstream_timeout_secs == 0 {
            anyhow::bail!("--upstream-timeout-secs must be at least 1 second");
        }
        Ok(())
    }

    pub fn limiter_config(&self) -> LimiterConfig {
        LimiterConfig {
            max_requests: self.rate_limit,
            window: Duration::from_secs(self.rate_window),
        }
    }

    pub fn completion_config(&self) -> CompletionConfig {
        CompletionConfig {
            base_url: self.openai_url.trim_end_matches('/').to_string(),
            api_key: self.openai_api_key.clone(),
            model: self.model.clone(),
            timeout: Duration::from_secs(self.upstream_timeout_secs),
            max_retries: self.upstream_retries,
        }
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval)
    }
}
