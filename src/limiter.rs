//! Adaptive rate limiter façade
//!
//! Semantics:
//! - `acquire` is the only suspension point. It computes the wait under the state lock,
//!   releases the lock, sleeps through the configured `Sleeper`, and re-evaluates. When the wait
//!   is zero the request slot is reserved (recorded in the window) before the lock is dropped,
//!   so concurrent callers never both claim the last slot.
//! - The wait is the maximum of: the per-minute window wait, the per-second burst wait, the
//!   backoff hold, and the remote quota wait. The quota wait starts once this limiter has
//!   granted `X-RateLimit-Remaining` requests since the server reported it, and lasts until
//!   `X-RateLimit-Reset`.
//! - Server hints never stretch a wait past `LimiterConfig::max_wait` (backoff ceiling plus one
//!   minute window): `Retry-After` is clamped, and a hint stops applying at
//!   `min(reset, absorbed_at + max_wait)`.
//! - Responses may arrive out of order. A hint for the same reset window only tightens the
//!   stored one; a hint for an earlier window is ignored.
//! - The backoff hold is anchored at the most recent reported outcome: after a throttle it lasts
//!   `max(backoff, Retry-After)`, after a success it lasts the decayed backoff. A retry that
//!   already slept the delay returned by `report_throttled` is not charged again.
//! - A fresh remote hint whose `X-RateLimit-Limit` is below the local per-minute ceiling lowers
//!   the effective ceiling until its reset time passes.
//! - `execute_with_retry` makes at most `max_retries + 1` attempts. Throttles inside the budget
//!   are absorbed; running out yields `LimiterError::QuotaExhausted`. Transport errors return
//!   immediately as `LimiterError::Transport` and are not retried.
//!
//! Invariants:
//! - The state lock is never held across a sleep or the caller's operation.
//! - Disabled limiters never wait.
//!
//! Example
//! ```rust
//! use quota_guard::{LimiterConfig, Outcome, RateLimiter};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let limiter = RateLimiter::new(LimiterConfig::default()).unwrap();
//! let body = limiter
//!     .execute_with_retry(|| async { Ok::<_, std::io::Error>(Outcome::success("ok")) })
//!     .await
//!     .unwrap();
//! assert_eq!(body, "ok");
//! assert_eq!(limiter.stats().total_requests, 1);
//! # });
//! ```

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::backoff::BackoffController;
use crate::clock::{duration_to_millis_ceil, Clock, SystemClock};
use crate::config::{ConfigError, LimiterConfig};
use crate::error::{AcquireError, LimiterError};
use crate::headers::{RemoteQuotaHint, ResponseMeta};
use crate::sleeper::{Sleeper, TokioSleeper};
use crate::stats::{Stats, StatsRecorder};
use crate::window::{RequestWindow, WINDOW_SPAN};

const BURST_SPAN: Duration = Duration::from_secs(1);

/// Lifecycle of one call through `execute_with_retry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Idle,
    Waiting,
    InFlight,
    Throttled,
    Exhausted,
    Succeeded,
}

/// What the caller's operation observed.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The remote API accepted the request.
    Success { value: T, meta: Option<ResponseMeta> },
    /// The remote API answered "too many requests" (HTTP 429).
    Throttled { meta: Option<ResponseMeta> },
}

/// Server-reported quota for the current remote window, and how many requests were granted
/// since the server last lowered `remaining`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct QuotaTracker {
    hint: RemoteQuotaHint,
    /// Epoch millis at which the hint stops applying.
    until: u64,
    granted: u32,
}

impl QuotaTracker {
    fn new(hint: RemoteQuotaHint, until: u64) -> Self {
        Self { hint, until, granted: 0 }
    }

    /// Requests still allowed before `until`, when the server reported a remaining count.
    fn budget(&self) -> Option<u32> {
        self.hint.remaining.map(|remaining| remaining.saturating_sub(self.granted))
    }

    /// Fold in a hint for the same remote window. Only ever tightens.
    fn merge(&mut self, newer: RemoteQuotaHint) {
        self.hint.limit = min_present(self.hint.limit, newer.limit);
        if let Some(remaining) = newer.remaining {
            match self.budget() {
                Some(left) if remaining >= left => {}
                _ => {
                    self.hint.remaining = Some(remaining);
                    self.granted = 0;
                }
            }
        }
    }
}

fn min_present(a: Option<u32>, b: Option<u32>) -> Option<u32> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

impl<T> Outcome<T> {
    pub fn success(value: T) -> Self {
        Outcome::Success { value, meta: None }
    }

    pub fn throttled() -> Self {
        Outcome::Throttled { meta: None }
    }

    /// Attach response metadata (quota headers, retry hint).
    pub fn with_meta(self, meta: ResponseMeta) -> Self {
        match self {
            Outcome::Success { value, .. } => Outcome::Success { value, meta: Some(meta) },
            Outcome::Throttled { .. } => Outcome::Throttled { meta: Some(meta) },
        }
    }

    pub fn is_throttled(&self) -> bool {
        matches!(self, Outcome::Throttled { .. })
    }
}

/// Shared mutable state, guarded by one mutex.
#[derive(Debug)]
struct LimiterState {
    window: RequestWindow,
    backoff: BackoffController,
    quota: Option<QuotaTracker>,
    /// No request may start before this instant (epoch millis).
    hold_until: u64,
    stats: StatsRecorder,
}

#[derive(Debug)]
struct Inner {
    config: LimiterConfig,
    state: Mutex<LimiterState>,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
}

/// Client-side limiter shared by every caller of one remote API.
///
/// Cloning is cheap; clones share state.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    inner: Arc<Inner>,
}

impl RateLimiter {
    /// Limiter on the wall clock and tokio timers.
    pub fn new(config: LimiterConfig) -> Result<Self, ConfigError> {
        Self::builder(config).build()
    }

    pub fn builder(config: LimiterConfig) -> RateLimiterBuilder {
        RateLimiterBuilder::new(config)
    }

    pub fn config(&self) -> &LimiterConfig {
        &self.inner.config
    }

    /// How long a caller arriving now would wait. Does not reserve a slot.
    pub fn wait_time(&self) -> Duration {
        if !self.inner.config.enabled() {
            return Duration::ZERO;
        }
        let mut state = self.lock();
        let now = self.inner.clock.now_millis();
        self.compute_wait(&mut state, now)
    }

    /// Wait until a request may be sent, then reserve its slot.
    pub async fn acquire(&self) -> Result<(), AcquireError> {
        self.acquire_inner(None).await
    }

    /// Like [`acquire`](Self::acquire), but gives up with `LimiterError::Cancelled` when `cancel`
    /// fires before the wait elapses.
    pub async fn acquire_with_cancel(&self, cancel: &CancellationToken) -> Result<(), AcquireError> {
        self.acquire_inner(Some(cancel)).await
    }

    /// Record an accepted request.
    pub fn report_success(&self, meta: Option<&ResponseMeta>) {
        let config = &self.inner.config;
        let mut state = self.lock();
        let now = self.inner.clock.now_millis();
        state.stats.record_success();
        if let Some(meta) = meta {
            self.absorb_hint(&mut state, meta.quota, now);
        }
        if !config.enabled() {
            return;
        }
        let before = state.backoff.current_delay();
        let decayed = state.backoff.on_success();
        state.hold_until = state.hold_until.max(now.saturating_add(duration_to_millis_ceil(decayed)));
        if decayed != before {
            tracing::debug!(
                target: "quota_guard::limiter",
                backoff_ms = decayed.as_millis() as u64,
                consecutive_throttles = state.backoff.consecutive_throttles(),
                "backoff decayed after success"
            );
        }
    }

    /// Record a throttled request and return how long to wait before retrying:
    /// `max(backoff, Retry-After)`.
    pub fn report_throttled(&self, meta: Option<&ResponseMeta>) -> Duration {
        let config = &self.inner.config;
        let mut state = self.lock();
        let now = self.inner.clock.now_millis();
        state.stats.record_throttled();
        let retry_after = meta
            .and_then(|m| m.retry_after)
            .unwrap_or(Duration::ZERO)
            .min(config.max_wait());
        if let Some(meta) = meta {
            self.absorb_hint(&mut state, meta.quota, now);
        }
        if !config.enabled() {
            return retry_after;
        }

        let before = state.backoff.current_delay();
        let backoff = state.backoff.on_throttle();
        let delay = config.jitter().apply(backoff).max(retry_after);
        state.hold_until = state.hold_until.max(now.saturating_add(duration_to_millis_ceil(delay)));

        let consecutive = state.backoff.consecutive_throttles();
        let delay_ms = delay.as_millis() as u64;
        if config.verbose_logging() {
            tracing::warn!(
                target: "quota_guard::limiter",
                consecutive_throttles = consecutive,
                delay_ms,
                retry_after_ms = retry_after.as_millis() as u64,
                "remote API throttled request"
            );
            if backoff > before {
                tracing::info!(
                    target: "quota_guard::limiter",
                    from_ms = before.as_millis() as u64,
                    to_ms = backoff.as_millis() as u64,
                    "backoff increased"
                );
            }
        } else {
            tracing::debug!(
                target: "quota_guard::limiter",
                consecutive_throttles = consecutive,
                delay_ms,
                "remote API throttled request"
            );
        }
        delay
    }

    /// Run `operation` under the limiter, retrying throttled outcomes up to `max_retries` times.
    pub async fn execute_with_retry<T, E, Fut, Op>(&self, operation: Op) -> Result<T, LimiterError<E>>
    where
        Fut: Future<Output = Result<Outcome<T>, E>>,
        Op: FnMut() -> Fut,
    {
        self.run(operation, None).await
    }

    /// [`execute_with_retry`](Self::execute_with_retry) that aborts any wait when `cancel` fires.
    pub async fn execute_with_retry_cancellable<T, E, Fut, Op>(
        &self,
        operation: Op,
        cancel: &CancellationToken,
    ) -> Result<T, LimiterError<E>>
    where
        Fut: Future<Output = Result<Outcome<T>, E>>,
        Op: FnMut() -> Fut,
    {
        self.run(operation, Some(cancel)).await
    }

    /// Point-in-time statistics.
    pub fn stats(&self) -> Stats {
        let mut state = self.lock();
        let now = self.inner.clock.now_millis();
        let LimiterState { window, backoff, stats, .. } = &mut *state;
        stats.snapshot(window, backoff, self.inner.config.max_requests_per_minute(), now)
    }

    /// The remote quota hint currently in effect, if any.
    pub fn quota_hint(&self) -> Option<RemoteQuotaHint> {
        let mut state = self.lock();
        let now = self.inner.clock.now_millis();
        Self::fresh_quota(&mut state, now).map(|q| q.hint)
    }

    async fn run<T, E, Fut, Op>(
        &self,
        mut operation: Op,
        cancel: Option<&CancellationToken>,
    ) -> Result<T, LimiterError<E>>
    where
        Fut: Future<Output = Result<Outcome<T>, E>>,
        Op: FnMut() -> Fut,
    {
        let max_retries = self.inner.config.max_retries();
        let mut retries: u32 = 0;
        let mut call = CallState::Idle;

        loop {
            transition(&mut call, CallState::Waiting, retries);
            self.acquire_inner(cancel).await.map_err(AcquireError::widen)?;
            transition(&mut call, CallState::InFlight, retries);

            match operation().await {
                Err(e) => return Err(LimiterError::Transport(e)),
                Ok(Outcome::Success { value, meta }) => {
                    self.report_success(meta.as_ref());
                    self.lock().stats.record_call(retries, false);
                    transition(&mut call, CallState::Succeeded, retries);
                    return Ok(value);
                }
                Ok(Outcome::Throttled { meta }) => {
                    let delay = self.report_throttled(meta.as_ref());
                    transition(&mut call, CallState::Throttled, retries);
                    if retries >= max_retries {
                        self.lock().stats.record_call(retries, true);
                        transition(&mut call, CallState::Exhausted, retries);
                        tracing::warn!(
                            target: "quota_guard::limiter",
                            attempts = retries + 1,
                            "retry budget exhausted while throttled"
                        );
                        return Err(LimiterError::QuotaExhausted {
                            attempts: retries.saturating_add(1),
                            next_delay: delay,
                        });
                    }
                    retries += 1;
                    self.pause(delay, cancel).await.map_err(AcquireError::widen)?;
                }
            }
        }
    }

    async fn acquire_inner(&self, cancel: Option<&CancellationToken>) -> Result<(), AcquireError> {
        if !self.inner.config.enabled() {
            return Ok(());
        }
        loop {
            let wait = {
                let mut state = self.lock();
                let now = self.inner.clock.now_millis();
                let wait = self.compute_wait(&mut state, now);
                if wait.is_zero() {
                    state.window.record(now);
                    if let Some(quota) = state.quota.as_mut() {
                        quota.granted = quota.granted.saturating_add(1);
                    }
                    return Ok(());
                }
                wait
            };
            tracing::debug!(
                target: "quota_guard::limiter",
                wait_ms = wait.as_millis() as u64,
                "waiting for rate limit slot"
            );
            self.pause(wait, cancel).await?;
        }
    }

    async fn pause(&self, wait: Duration, cancel: Option<&CancellationToken>) -> Result<(), AcquireError> {
        if wait.is_zero() {
            return Ok(());
        }
        match cancel {
            None => {
                self.inner.sleeper.sleep(wait).await;
                Ok(())
            }
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        tracing::debug!(target: "quota_guard::limiter", "rate limit wait cancelled");
                        Err(LimiterError::Cancelled)
                    }
                    _ = self.inner.sleeper.sleep(wait) => Ok(()),
                }
            }
        }
    }

    fn compute_wait(&self, state: &mut LimiterState, now: u64) -> Duration {
        let config = &self.inner.config;
        let quota = Self::fresh_quota(state, now);

        let minute_limit = match quota.and_then(|q| q.hint.limit) {
            Some(remote) if remote > 0 => remote.min(config.max_requests_per_minute()),
            _ => config.max_requests_per_minute(),
        };
        let minute_wait = state.window.projected_wait(now, minute_limit, WINDOW_SPAN);
        let burst_wait = state.window.projected_wait(now, config.max_burst_per_second(), BURST_SPAN);
        let hold_wait = Duration::from_millis(state.hold_until.saturating_sub(now));
        let quota_wait = match quota {
            Some(q) if q.budget() == Some(0) => Duration::from_millis(q.until.saturating_sub(now)),
            _ => Duration::ZERO,
        };

        minute_wait.max(burst_wait).max(hold_wait).max(quota_wait)
    }

    /// Drop the quota hint once it has expired.
    fn fresh_quota(state: &mut LimiterState, now: u64) -> Option<QuotaTracker> {
        match state.quota {
            Some(q) if q.until > now => Some(q),
            Some(_) => {
                state.quota = None;
                None
            }
            None => None,
        }
    }

    fn absorb_hint(&self, state: &mut LimiterState, hint: RemoteQuotaHint, now: u64) {
        // Without a future reset time there is nothing to hold against.
        let Some(reset) = hint.reset_at_millis().filter(|&reset| reset > now) else {
            return;
        };
        let cap = now.saturating_add(duration_to_millis_ceil(self.inner.config.max_wait()));
        let until = reset.min(cap);
        if until < reset {
            tracing::debug!(
                target: "quota_guard::limiter",
                reset_in_ms = reset - now,
                clamped_to_ms = until - now,
                "quota reset beyond the longest wait; clamping"
            );
        }

        match Self::fresh_quota(state, now) {
            Some(mut current) if current.hint.reset_at == hint.reset_at => {
                current.merge(hint);
                state.quota = Some(current);
            }
            // A late response from an earlier remote window.
            Some(current) if current.hint.reset_at > hint.reset_at => return,
            _ => state.quota = Some(QuotaTracker::new(hint, until)),
        }

        if let Some(quota) = state.quota.filter(|q| q.budget() == Some(0)) {
            let until_reset = quota.until.saturating_sub(now);
            if self.inner.config.verbose_logging() {
                tracing::info!(
                    target: "quota_guard::limiter",
                    until_reset_ms = until_reset,
                    "remote quota exhausted; holding requests until reset"
                );
            } else {
                tracing::debug!(
                    target: "quota_guard::limiter",
                    until_reset_ms = until_reset,
                    "remote quota exhausted"
                );
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, LimiterState> {
        // Every critical section leaves the state consistent, so a poisoned lock is still usable.
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn transition(call: &mut CallState, next: CallState, retries: u32) {
    let from = *call;
    tracing::trace!(
        target: "quota_guard::limiter",
        from = ?from,
        to = ?next,
        retries,
        "call state"
    );
    *call = next;
}

/// Builder for `RateLimiter`, mainly to inject time sources.
#[derive(Debug)]
pub struct RateLimiterBuilder {
    config: LimiterConfig,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
}

impl RateLimiterBuilder {
    pub fn new(config: LimiterConfig) -> Self {
        Self { config, clock: Arc::new(SystemClock), sleeper: Arc::new(TokioSleeper) }
    }

    /// Provide a custom clock implementation.
    pub fn with_clock<C>(mut self, clock: C) -> Self
    where
        C: Clock + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    /// Provide a custom sleeper implementation.
    pub fn with_sleeper<S>(mut self, sleeper: S) -> Self
    where
        S: Sleeper + 'static,
    {
        self.sleeper = Arc::new(sleeper);
        self
    }

    /// Build the limiter, validating the configuration.
    pub fn build(self) -> Result<RateLimiter, ConfigError> {
        self.config.validate()?;
        let backoff = self.config.backoff_controller()?;
        let state = LimiterState {
            window: RequestWindow::new(),
            backoff,
            quota: None,
            hold_until: 0,
            stats: StatsRecorder::new(),
        };
        Ok(RateLimiter {
            inner: Arc::new(Inner {
                config: self.config,
                state: Mutex::new(state),
                clock: self.clock,
                sleeper: self.sleeper,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::sleeper::TrackingSleeper;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const T0: u64 = 1_700_000_000_000;

    fn limiter(config: LimiterConfig) -> (RateLimiter, ManualClock, TrackingSleeper) {
        let clock = ManualClock::new(T0);
        let sleeper = TrackingSleeper::wrapping(clock.clone());
        let limiter = RateLimiter::builder(config)
            .with_clock(clock.clone())
            .with_sleeper(sleeper.clone())
            .build()
            .expect("valid config");
        (limiter, clock, sleeper)
    }

    #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
    #[error("connection reset")]
    struct ConnReset;

    #[tokio::test]
    async fn first_acquire_does_not_wait() {
        let (limiter, clock, sleeper) = limiter(LimiterConfig::default());
        limiter.acquire().await.unwrap();
        assert_eq!(sleeper.call_count(), 0);
        assert_eq!(clock.now_millis(), T0);
    }

    #[tokio::test]
    async fn eleventh_request_in_a_burst_waits_a_full_second() {
        let (limiter, clock, _sleeper) = limiter(LimiterConfig::default());
        let first = clock.now_millis();
        for _ in 0..10 {
            limiter.acquire().await.unwrap();
            limiter.report_success(None);
            clock.advance(Duration::from_millis(20));
        }
        assert!(clock.now_millis() - first <= 200);
        limiter.acquire().await.unwrap();
        assert!(clock.now_millis() - first >= 1_000);
    }

    #[tokio::test]
    async fn per_minute_ceiling_is_enforced() {
        let config = LimiterConfig::builder()
            .max_requests_per_minute(5)
            .max_burst_per_second(100)
            .build()
            .unwrap();
        let (limiter, clock, _sleeper) = limiter(config);
        for _ in 0..5 {
            limiter.acquire().await.unwrap();
        }
        assert_eq!(limiter.wait_time(), Duration::from_secs(60));
        limiter.acquire().await.unwrap();
        assert_eq!(clock.now_millis(), T0 + 60_000);
    }

    #[tokio::test]
    async fn disabled_limiter_never_waits() {
        let (limiter, _clock, sleeper) = limiter(LimiterConfig::disabled());
        for _ in 0..100 {
            limiter.acquire().await.unwrap();
        }
        limiter.report_throttled(None);
        assert_eq!(limiter.wait_time(), Duration::ZERO);
        limiter.acquire().await.unwrap();
        assert_eq!(sleeper.call_count(), 0);
    }

    #[tokio::test]
    async fn throttle_delay_is_max_of_backoff_and_retry_after() {
        let (limiter, _clock, _sleeper) = limiter(LimiterConfig::default());
        assert_eq!(limiter.report_throttled(None), Duration::from_secs(2));
        let meta = ResponseMeta::retry_after(Duration::from_secs(30));
        assert_eq!(limiter.report_throttled(Some(&meta)), Duration::from_secs(30));
        let meta = ResponseMeta::retry_after(Duration::from_secs(1));
        assert_eq!(limiter.report_throttled(Some(&meta)), Duration::from_secs(8));
    }

    #[tokio::test]
    async fn backoff_hold_is_not_charged_twice() {
        let (limiter, clock, sleeper) = limiter(LimiterConfig::default());
        limiter.acquire().await.unwrap();
        let delay = limiter.report_throttled(None);
        assert_eq!(limiter.wait_time(), delay);
        clock.advance(delay);
        assert_eq!(limiter.wait_time(), Duration::ZERO);
        limiter.acquire().await.unwrap();
        assert_eq!(sleeper.call_count(), 0);
    }

    #[tokio::test]
    async fn exhausted_remote_quota_holds_until_reset() {
        let (limiter, clock, _sleeper) = limiter(LimiterConfig::default());
        let reset_secs = T0 / 1_000 + 45;
        let meta = ResponseMeta::default().with_quota(RemoteQuotaHint {
            limit: Some(30),
            remaining: Some(0),
            reset_at: Some(reset_secs),
        });
        limiter.report_throttled(Some(&meta));
        limiter.acquire().await.unwrap();
        assert!(clock.now_millis() >= reset_secs * 1_000);
        assert!(limiter.quota_hint().is_none(), "hint dropped after reset");
    }

    #[tokio::test]
    async fn transport_errors_pass_through_without_retry() {
        let (limiter, _clock, _sleeper) = limiter(LimiterConfig::default());
        let calls = AtomicUsize::new(0);
        let result: Result<(), _> = limiter
            .execute_with_retry(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ConnReset) }
            })
            .await;
        assert_eq!(result, Err(LimiterError::Transport(ConnReset)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancelled_token_interrupts_wait() {
        let (limiter, _clock, _sleeper) = limiter(LimiterConfig::default());
        limiter.report_throttled(None);
        let token = CancellationToken::new();
        token.cancel();
        let err = limiter.acquire_with_cancel(&token).await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn cancellation_is_ignored_when_no_wait_is_needed() {
        let (limiter, _clock, _sleeper) = limiter(LimiterConfig::default());
        let token = CancellationToken::new();
        token.cancel();
        assert!(limiter.acquire_with_cancel(&token).await.is_ok());
    }

    #[test]
    fn quota_merge_only_tightens() {
        let hint = |limit, remaining| RemoteQuotaHint { limit, remaining, reset_at: Some(100) };
        let mut quota = QuotaTracker::new(hint(Some(60), Some(3)), 100_000);
        quota.granted = 2;

        quota.merge(hint(Some(90), Some(2)));
        assert_eq!(quota.budget(), Some(1), "budget already below the late value");
        assert_eq!(quota.hint.limit, Some(60));

        quota.merge(hint(None, Some(0)));
        assert_eq!(quota.budget(), Some(0));
        assert_eq!(quota.granted, 0);
        assert_eq!(quota.hint.limit, Some(60));
    }

    #[test]
    fn outcome_helpers() {
        let ok = Outcome::success(5).with_meta(ResponseMeta::retry_after(Duration::from_secs(1)));
        assert!(!ok.is_throttled());
        assert!(Outcome::<()>::throttled().is_throttled());
        match ok {
            Outcome::Success { value, meta } => {
                assert_eq!(value, 5);
                assert_eq!(meta.unwrap().retry_after, Some(Duration::from_secs(1)));
            }
            Outcome::Throttled { .. } => panic!("expected success"),
        }
    }
}
