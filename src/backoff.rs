//! Exponential backoff driven by throttle responses, with decay on success.
//!
//! The controller is a two-field state machine (`current_backoff`,
//! `consecutive_throttles`) with pure transitions:
//!
//! - `on_throttle`: `consecutive += 1`, `current = min(base * 2^consecutive, ceiling)`, never
//!   lower than the previous value.
//! - `on_success`: `consecutive -= 1` (saturating), `current *= decay`; once `current` falls below
//!   `base` it snaps to zero.
//!
//! Defaults: base 1s, ceiling 60s, decay 0.5.
//!
//! Example
//! ```rust
//! use std::time::Duration;
//! use quota_guard::BackoffController;
//!
//! let mut backoff = BackoffController::default();
//! assert_eq!(backoff.on_throttle(), Duration::from_secs(2));
//! assert_eq!(backoff.on_throttle(), Duration::from_secs(4));
//! assert_eq!(backoff.on_success(), Duration::from_secs(2)); // decays, does not reset
//! assert_eq!(backoff.consecutive_throttles(), 1);
//! ```
//!
//! Overflow behavior: computations that would overflow saturate to `MAX_BACKOFF` (1 day) before
//! the ceiling is applied.

use std::time::Duration;

/// Maximum delay used when calculations overflow (1 day).
pub const MAX_BACKOFF: Duration = Duration::from_secs(24 * 60 * 60);

/// Default base delay.
pub const DEFAULT_BASE: Duration = Duration::from_secs(1);
/// Default ceiling.
pub const DEFAULT_CEILING: Duration = Duration::from_secs(60);
/// Default multiplicative decay applied per success.
pub const DEFAULT_DECAY: f64 = 0.5;

/// Errors returned by backoff configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackoffError {
    #[error("backoff base must be greater than zero")]
    ZeroBase,
    #[error("backoff ceiling ({ceiling:?}) must be >= base ({base:?})")]
    CeilingLessThanBase { base: Duration, ceiling: Duration },
    #[error("backoff decay must be within (0, 1) (got {0})")]
    InvalidDecay(f64),
}

/// Tracks consecutive throttles and the delay they impose.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffController {
    base: Duration,
    ceiling: Duration,
    decay: f64,
    current: Duration,
    consecutive: u32,
}

impl BackoffController {
    /// Create a controller. `ceiling` must be >= `base` and `decay` within (0, 1).
    pub fn new(base: Duration, ceiling: Duration, decay: f64) -> Result<Self, BackoffError> {
        if base.is_zero() {
            return Err(BackoffError::ZeroBase);
        }
        if ceiling < base {
            return Err(BackoffError::CeilingLessThanBase { base, ceiling });
        }
        if decay.is_nan() || decay <= 0.0 || decay >= 1.0 {
            return Err(BackoffError::InvalidDecay(decay));
        }
        Ok(Self { base, ceiling, decay, current: Duration::ZERO, consecutive: 0 })
    }

    /// Register a throttle event; returns the new backoff.
    pub fn on_throttle(&mut self) -> Duration {
        self.consecutive = self.consecutive.saturating_add(1);
        let grown = exponential(self.base, self.consecutive).min(self.ceiling);
        self.current = self.current.max(grown);
        self.current
    }

    /// Register a success; returns the decayed backoff.
    pub fn on_success(&mut self) -> Duration {
        self.consecutive = self.consecutive.saturating_sub(1);
        let decayed = self.current.mul_f64(self.decay);
        self.current = if decayed < self.base { Duration::ZERO } else { decayed };
        self.current
    }

    /// Current backoff, applied as a wait on top of window-derived waits.
    pub fn current_delay(&self) -> Duration {
        self.current
    }

    pub fn consecutive_throttles(&self) -> u32 {
        self.consecutive
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    pub fn ceiling(&self) -> Duration {
        self.ceiling
    }
}

impl Default for BackoffController {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE,
            ceiling: DEFAULT_CEILING,
            decay: DEFAULT_DECAY,
            current: Duration::ZERO,
            consecutive: 0,
        }
    }
}

/// `base * 2^exponent`, saturating at `MAX_BACKOFF`.
fn exponential(base: Duration, exponent: u32) -> Duration {
    let multiplier = 2u128.saturating_pow(exponent);
    let nanos = base.as_nanos().saturating_mul(multiplier);
    Duration::from_nanos(nanos.min(MAX_BACKOFF.as_nanos()) as u64)
}
