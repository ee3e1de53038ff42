use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Gauge, Histogram, register_counter, register_counter_vec,
    register_gauge, register_histogram,
};

lazy_static! {
    pub static ref REQUEST_TOTAL: CounterVec = register_counter_vec!(
        "bizcheckr_requests_total",
        "Validation requests by outcome",
        &["outcome"]
    )
    .unwrap();
    pub static ref UPSTREAM_LATENCY: Histogram = register_histogram!(
        "bizcheckr_upstream_latency_seconds",
        "Completion API latency in seconds"
    )
    .unwrap();
    pub static ref UPSTREAM_RETRIES: Counter = register_counter!(
        "bizcheckr_upstream_retries_total",
        "Completion API retry attempts"
    )
    .unwrap();
    pub static ref RATE_LIMIT_KEYS: Gauge = register_gauge!(
        "bizcheckr_rate_limit_keys",
        "Client keys currently tracked by the rate limiter"
    )
    .unwrap();
    pub static ref SCORE: Histogram = register_histogram!(
        "bizcheckr_score",
        "Completeness scores returned",
        vec![0.0, 33.0, 67.0, 100.0]
    )
    .unwrap();
}

pub fn record_outcome(outcome: &str) {
    REQUEST_TOTAL.with_label_values(&[outcome]).inc();
}
