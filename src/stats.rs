//! Running counters and point-in-time statistics.

use std::fmt;
use std::time::Duration;

use crate::backoff::BackoffController;
use crate::window::{RequestWindow, WINDOW_SPAN};

/// Monotonic counters owned by the limiter state.
#[derive(Debug, Clone, Default)]
pub struct StatsRecorder {
    total_requests: u64,
    throttled_requests: u64,
    total_retries: u64,
    completed_calls: u64,
    exhausted_calls: u64,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A request reached the server and was accepted.
    pub fn record_success(&mut self) {
        self.total_requests = self.total_requests.saturating_add(1);
    }

    /// A request reached the server and was throttled.
    pub fn record_throttled(&mut self) {
        self.total_requests = self.total_requests.saturating_add(1);
        self.throttled_requests = self.throttled_requests.saturating_add(1);
    }

    /// A retry-orchestrated call finished after `retries` retries.
    pub fn record_call(&mut self, retries: u32, exhausted: bool) {
        self.completed_calls = self.completed_calls.saturating_add(1);
        self.total_retries = self.total_retries.saturating_add(u64::from(retries));
        if exhausted {
            self.exhausted_calls = self.exhausted_calls.saturating_add(1);
        }
    }

    /// Build a snapshot; counters are left untouched.
    pub fn snapshot(
        &self,
        window: &mut RequestWindow,
        backoff: &BackoffController,
        max_requests_per_minute: u32,
        now: u64,
    ) -> Stats {
        Stats {
            total_requests: self.total_requests,
            throttled_requests: self.throttled_requests,
            throttle_rate: ratio(self.throttled_requests, self.total_requests),
            current_backoff: backoff.current_delay(),
            consecutive_throttles: backoff.consecutive_throttles(),
            average_retry_count: ratio(self.total_retries, self.completed_calls),
            requests_per_minute: window.count_since(now, WINDOW_SPAN) as u64,
            requests_per_second: window.count_since(now, Duration::from_secs(1)) as u64,
            max_requests_per_minute,
            completed_calls: self.completed_calls,
            exhausted_calls: self.exhausted_calls,
        }
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Read-only statistics snapshot for dashboards and logs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stats {
    pub total_requests: u64,
    pub throttled_requests: u64,
    /// `throttled_requests / total_requests`, 0 when nothing was sent.
    pub throttle_rate: f64,
    pub current_backoff: Duration,
    pub consecutive_throttles: u32,
    /// Mean retries per call made through `execute_with_retry`.
    pub average_retry_count: f64,
    /// Requests granted within the last 60 seconds.
    pub requests_per_minute: u64,
    /// Requests granted within the last second.
    pub requests_per_second: u64,
    pub max_requests_per_minute: u32,
    pub completed_calls: u64,
    pub exhausted_calls: u64,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "requests={} throttled={} ({:.1}%) rpm={}/{} backoff={:?} consecutive_throttles={} avg_retries={:.2}",
            self.total_requests,
            self.throttled_requests,
            self.throttle_rate * 100.0,
            self.requests_per_minute,
            self.max_requests_per_minute,
            self.current_backoff,
            self.consecutive_throttles,
            self.average_retry_count,
        )
    }
}
