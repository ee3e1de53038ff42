use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use std::time::Duration;
use tracing::debug;

use crate::config::{LimiterConfig, MAX_RATE_WINDOW_SECS};

pub const UNKNOWN_CLIENT: &str = "unknown";

// Rate limit entry - tracks requests per client key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_at: DateTime<Utc>,
}

/// Outcome of a quota check, with what the caller needs for headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

impl RateLimitDecision {
    /// Whole seconds until the window resets, rounded up and never zero.
    pub fn retry_after_secs(&self, now: DateTime<Utc>) -> u64 {
        let millis = (self.reset_at - now).num_milliseconds().max(0) as u64;
        millis.div_ceil(1000).max(1)
    }

    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-ratelimit-limit"),
            HeaderValue::from(self.limit),
        );
        headers.insert(
            HeaderName::from_static("x-ratelimit-remaining"),
            HeaderValue::from(self.remaining),
        );
        headers.insert(
            HeaderName::from_static("x-ratelimit-reset"),
            HeaderValue::from(self.reset_at.timestamp_millis()),
        );
        headers
    }
}

/// Backing store for per-client fixed windows.
///
/// The in-memory store is process local; a shared backend can implement the
/// same trait without the handler changing.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Count one request for `key` at `now`. Rejections do not consume quota.
    async fn check(&self, key: &str, now: DateTime<Utc>) -> RateLimitDecision;

    /// Drop entries whose window has ended. Returns how many were removed.
    async fn sweep(&self, now: DateTime<Utc>) -> usize;

    async fn len(&self) -> usize;
}

pub struct InMemoryRateLimitStore {
    config: LimiterConfig,
    entries: DashMap<String, RateLimitEntry>,
}

impl InMemoryRateLimitStore {
    pub fn new(config: LimiterConfig) -> Self {
        Self {
            config,
            entries: DashMap::new(),
        }
    }

    // Windows longer than a day are clamped, matching `Args::validate`
    fn window(&self) -> ChronoDuration {
        let max = Duration::from_secs(MAX_RATE_WINDOW_SECS);
        ChronoDuration::milliseconds(self.config.window.min(max).as_millis() as i64)
    }

    pub fn entry(&self, key: &str) -> Option<RateLimitEntry> {
        self.entries.get(key).map(|e| *e)
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn check(&self, key: &str, now: DateTime<Utc>) -> RateLimitDecision {
        let limit = self.config.max_requests;

        // the entry guard holds the shard lock until the decision is made
        let mut entry = self.entries.entry(key.to_string()).or_insert(RateLimitEntry {
            count: 0,
            reset_at: now,
        });

        // no window yet or window expired..? open a new one
        if entry.count == 0 || now > entry.reset_at {
            entry.count = 1;
            entry.reset_at = now + self.window();
            return RateLimitDecision {
                allowed: true,
                limit,
                remaining: limit.saturating_sub(1),
                reset_at: entry.reset_at,
            };
        }

        // over limit
        if entry.count >= limit {
            return RateLimitDecision {
                allowed: false,
                limit,
                remaining: 0,
                reset_at: entry.reset_at,
            };
        }

        entry.count += 1;
        RateLimitDecision {
            allowed: true,
            limit,
            remaining: limit - entry.count,
            reset_at: entry.reset_at,
        }
    }

    async fn sweep(&self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| now <= entry.reset_at);
        let removed = before.saturating_sub(self.entries.len());
        debug!(removed, remaining = self.entries.len(), "Swept rate limit entries");
        removed
    }

    async fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Derive the quota key from proxy headers.
pub fn client_key(headers: &HeaderMap) -> String {
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    if let Some(first) = header_str("x-forwarded-for")
        .and_then(|v| v.split(',').next().map(|s| s.trim().to_string()))
        .filter(|s| !s.is_empty())
    {
        return first;
    }

    header_str("x-real-ip")
        .map(|v| v.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn store(max_requests: u32) -> InMemoryRateLimitStore {
        InMemoryRateLimitStore::new(LimiterConfig {
            max_requests,
            window: Duration::from_secs(60),
        })
    }

    #[tokio::test]
    async fn test_fiftieth_allowed_fifty_first_rejected() {
        let limiter = store(50);
        let now = Utc::now();

        for i in 1..=50 {
            let decision = limiter.check("1.2.3.4", now).await;
            assert!(decision.allowed, "request {i} should be allowed");
            assert_eq!(decision.remaining, 50 - i);
        }

        let rejected = limiter.check("1.2.3.4", now + ChronoDuration::seconds(10)).await;
        assert!(!rejected.allowed);
        assert_eq!(rejected.remaining, 0);
        assert_eq!(rejected.retry_after_secs(now + ChronoDuration::seconds(10)), 50);
    }

    #[tokio::test]
    async fn test_rejection_does_not_increment() {
        let limiter = store(2);
        let now = Utc::now();
        limiter.check("k", now).await;
        limiter.check("k", now).await;
        for _ in 0..5 {
            assert!(!limiter.check("k", now).await.allowed);
        }
        assert_eq!(limiter.entry("k").unwrap().count, 2);
    }

    #[tokio::test]
    async fn test_window_resets_after_expiry() {
        let limiter = store(1);
        let now = Utc::now();
        assert!(limiter.check("k", now).await.allowed);
        assert!(!limiter.check("k", now + ChronoDuration::seconds(60)).await.allowed);

        let later = now + ChronoDuration::milliseconds(60_001);
        let decision = limiter.check("k", later).await;
        assert!(decision.allowed);
        assert_eq!(decision.reset_at, later + ChronoDuration::seconds(60));
        assert_eq!(limiter.entry("k").unwrap().count, 1);
    }

    #[tokio::test]
    async fn test_oversized_window_is_clamped() {
        let limiter = InMemoryRateLimitStore::new(LimiterConfig {
            max_requests: 1,
            window: Duration::from_secs(u64::MAX),
        });
        let now = Utc::now();
        let decision = limiter.check("k", now).await;
        assert_eq!(decision.reset_at, now + ChronoDuration::days(1));
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = store(1);
        let now = Utc::now();
        assert!(limiter.check("a", now).await.allowed);
        assert!(limiter.check("b", now).await.allowed);
        assert!(!limiter.check("a", now).await.allowed);
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired() {
        let limiter = store(5);
        let now = Utc::now();
        limiter.check("old", now).await;
        limiter.check("fresh", now + ChronoDuration::seconds(30)).await;

        let removed = limiter.sweep(now + ChronoDuration::seconds(61)).await;
        assert_eq!(removed, 1);
        assert!(limiter.entry("old").is_none());
        assert!(limiter.entry("fresh").is_some());
        assert_eq!(limiter.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_checks_never_over_admit() {
        let limiter = Arc::new(store(50));
        let now = Utc::now();

        let mut tasks = Vec::new();
        for _ in 0..200 {
            let limiter = limiter.clone();
            tasks.push(tokio::spawn(async move { limiter.check("shared", now).await.allowed }));
        }

        let mut admitted = 0;
        for task in tasks {
            if task.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 50);
    }

    #[test]
    fn test_retry_after_rounds_up() {
        let now = Utc::now();
        let decision = RateLimitDecision {
            allowed: false,
            limit: 50,
            remaining: 0,
            reset_at: now + ChronoDuration::milliseconds(1_200),
        };
        assert_eq!(decision.retry_after_secs(now), 2);
        assert_eq!(decision.retry_after_secs(decision.reset_at), 1);
    }

    #[test]
    fn test_headers_carry_epoch_millis() {
        let reset_at = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        let decision = RateLimitDecision {
            allowed: true,
            limit: 50,
            remaining: 49,
            reset_at,
        };
        let headers = decision.headers();
        assert_eq!(headers["x-ratelimit-limit"], "50");
        assert_eq!(headers["x-ratelimit-remaining"], "49");
        assert_eq!(headers["x-ratelimit-reset"], "1700000000123");
    }

    #[test]
    fn test_client_key_precedence() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_key(&headers), UNKNOWN_CLIENT);

        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_key(&headers), "10.0.0.2");

        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(client_key(&headers), "203.0.113.7");
    }

    #[test]
    fn test_blank_forwarded_for_falls_back() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(" , 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.9"));
        assert_eq!(client_key(&headers), "10.0.0.9");
    }
}
