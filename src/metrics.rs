//! Prometheus metrics for the dashboard.
//!
//! This module provides metrics for:
//! - Bot API request latency and failures
//! - Status poll failures
//! - Start/stop actions and login attempts

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use tracing::debug;

use crate::client::Endpoint;

// === Metric Name Constants ===

/// Bot API request latency metric name.
pub const METRIC_API_REQUEST_LATENCY: &str = "bot_api_request_latency_ms";
/// Bot API failures counter metric name.
pub const METRIC_API_FAILURES: &str = "bot_api_failures_total";
/// Status poll failures counter metric name.
pub const METRIC_POLL_FAILURES: &str = "status_poll_failures_total";
/// Bot actions counter metric name.
pub const METRIC_BOT_ACTIONS: &str = "bot_actions_total";
/// Login attempts counter metric name.
pub const METRIC_LOGIN_ATTEMPTS: &str = "login_attempts_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_API_REQUEST_LATENCY,
        "Bot API request latency in milliseconds"
    );
    describe_counter!(METRIC_API_FAILURES, "Total number of failed bot API calls");
    describe_counter!(
        METRIC_POLL_FAILURES,
        "Total number of status polls that failed"
    );
    describe_counter!(
        METRIC_BOT_ACTIONS,
        "Total number of start/stop/reload actions by outcome"
    );
    describe_counter!(METRIC_LOGIN_ATTEMPTS, "Total number of login attempts");

    debug!("Metrics initialized");
}

/// Increment bot API failure counter.
pub fn inc_api_failures(endpoint: Endpoint) {
    let endpoint: &'static str = endpoint.into();
    counter!(METRIC_API_FAILURES, "endpoint" => endpoint).increment(1);
}

/// Increment status poll failure counter.
pub fn inc_poll_failures() {
    counter!(METRIC_POLL_FAILURES).increment(1);
}

/// Increment bot action counter.
pub fn inc_bot_actions(action: &'static str, outcome: &'static str) {
    counter!(METRIC_BOT_ACTIONS, "action" => action, "outcome" => outcome).increment(1);
}

/// Increment login attempt counter.
pub fn inc_login_attempts(outcome: &'static str) {
    counter!(METRIC_LOGIN_ATTEMPTS, "outcome" => outcome).increment(1);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
    endpoint: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric and endpoint label.
    pub fn new(metric_name: &'static str, endpoint: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
            endpoint,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        let latency_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        histogram!(self.metric_name, "endpoint" => self.endpoint).record(latency_ms);
    }
}

/// Create a latency timer for one bot API request.
pub fn timer_api_request(endpoint: Endpoint) -> LatencyTimer {
    LatencyTimer::new(METRIC_API_REQUEST_LATENCY, endpoint.into())
}
