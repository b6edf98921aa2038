//! Sliding window of recent request timestamps.
//!
//! The window keeps one entry per request granted by the limiter, covering the longest
//! tracked interval (one minute). Eviction is lazy: every mutating or counting call
//! first drops entries that have aged out.
//!
//! ```rust
//! use std::time::Duration;
//! use quota_guard::window::RequestWindow;
//!
//! let mut window = RequestWindow::new();
//! window.record(1_000);
//! window.record(1_100);
//! assert_eq!(window.count_since(1_500, Duration::from_secs(1)), 2);
//! // With a limit of 2 per second the next slot opens when the first entry expires.
//! assert_eq!(
//!     window.projected_wait(1_500, 2, Duration::from_secs(1)),
//!     Duration::from_millis(500)
//! );
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use crate::clock::duration_to_millis_ceil;

/// Longest interval the window answers questions about.
pub const WINDOW_SPAN: Duration = Duration::from_secs(60);

/// Ordered record of request timestamps (Unix epoch milliseconds).
#[derive(Debug, Clone, Default)]
pub struct RequestWindow {
    entries: VecDeque<u64>,
}

impl RequestWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request at `now`.
    ///
    /// A timestamp older than the newest entry is clamped forward so entries stay
    /// non-decreasing even if the wall clock steps backwards.
    pub fn record(&mut self, now: u64) {
        let stamp = self.entries.back().map_or(now, |&last| last.max(now));
        self.entries.push_back(stamp);
        self.evict(stamp);
    }

    /// Number of recorded requests within `(now - interval, now]`.
    pub fn count_since(&mut self, now: u64, interval: Duration) -> usize {
        self.evict(now);
        self.in_range(duration_to_millis_ceil(interval), now).count()
    }

    /// How long a caller must wait before one more request fits under `limit` per
    /// `interval`. Zero when there is headroom.
    pub fn projected_wait(&mut self, now: u64, limit: u32, interval: Duration) -> Duration {
        self.evict(now);
        let span = duration_to_millis_ceil(interval);
        let count = self.in_range(span, now).count();
        let limit = limit as usize;
        if limit == 0 || count < limit {
            return Duration::ZERO;
        }
        // The slot frees up when the entry `limit` places from the end leaves the window.
        match self.in_range(span, now).nth(count - limit) {
            Some(blocking) => Duration::from_millis(blocking.saturating_add(span).saturating_sub(now)),
            None => Duration::ZERO,
        }
    }

    /// Requests recorded in the last full window.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Timestamp of the newest entry, if any.
    pub fn latest(&self) -> Option<u64> {
        self.entries.back().copied()
    }

    /// Entries younger than `span` milliseconds as seen from `now`.
    fn in_range(&self, span: u64, now: u64) -> impl Iterator<Item = u64> + '_ {
        self.entries.iter().copied().filter(move |&t| t.saturating_add(span) > now)
    }

    fn evict(&mut self, now: u64) {
        let span = duration_to_millis_ceil(WINDOW_SPAN);
        while let Some(&front) = self.entries.front() {
            if front.saturating_add(span) <= now {
                self.entries.pop_front();
            } else {
                break;
            }
        }
    }
}
