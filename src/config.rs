//! Limiter configuration.
//!
//! Configuration is supplied once at construction and never mutated afterwards. The builder
//! validates numeric limits so a running limiter can rely on them being positive.
//!
//! ```rust
//! use quota_guard::LimiterConfig;
//!
//! let config = LimiterConfig::builder()
//!     .max_requests_per_minute(120)
//!     .max_burst_per_second(5)
//!     .max_retries(4)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.max_requests_per_minute(), 120);
//! ```

use std::time::Duration;

use crate::backoff::{BackoffController, BackoffError, DEFAULT_BASE, DEFAULT_CEILING, DEFAULT_DECAY};
use crate::jitter::Jitter;
use crate::window::WINDOW_SPAN;

pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 30;
pub const DEFAULT_BURST_PER_SECOND: u32 = 10;
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Errors produced while validating limiter configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("max_requests_per_minute must be > 0 when the limiter is enabled")]
    ZeroRequestsPerMinute,
    #[error("max_burst_per_second must be > 0 when the limiter is enabled")]
    ZeroBurstPerSecond,
    #[error("invalid backoff configuration: {0}")]
    InvalidBackoff(#[from] BackoffError),
}

/// Validated, immutable limiter configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LimiterConfig {
    enabled: bool,
    max_requests_per_minute: u32,
    max_burst_per_second: u32,
    max_retries: u32,
    verbose_logging: bool,
    backoff_base: Duration,
    backoff_ceiling: Duration,
    backoff_decay: f64,
    jitter: Jitter,
}

impl LimiterConfig {
    pub fn builder() -> LimiterConfigBuilder {
        LimiterConfigBuilder::new()
    }

    /// Configuration with the limiter switched off; every acquire returns at once.
    pub fn disabled() -> Self {
        Self { enabled: false, ..Self::default() }
    }

    /// Re-run validation, e.g. after deserializing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled {
            if self.max_requests_per_minute == 0 {
                return Err(ConfigError::ZeroRequestsPerMinute);
            }
            if self.max_burst_per_second == 0 {
                return Err(ConfigError::ZeroBurstPerSecond);
            }
        }
        self.backoff_controller()?;
        Ok(())
    }

    pub(crate) fn backoff_controller(&self) -> Result<BackoffController, BackoffError> {
        BackoffController::new(self.backoff_base, self.backoff_ceiling, self.backoff_decay)
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn max_requests_per_minute(&self) -> u32 {
        self.max_requests_per_minute
    }

    pub fn max_burst_per_second(&self) -> u32 {
        self.max_burst_per_second
    }

    /// Retries allowed after the initial attempt.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn verbose_logging(&self) -> bool {
        self.verbose_logging
    }

    pub fn backoff_base(&self) -> Duration {
        self.backoff_base
    }

    pub fn backoff_ceiling(&self) -> Duration {
        self.backoff_ceiling
    }

    pub fn backoff_decay(&self) -> f64 {
        self.backoff_decay
    }

    pub fn jitter(&self) -> Jitter {
        self.jitter
    }

    /// Longest single wait the limiter imposes: the backoff ceiling plus one minute window.
    ///
    /// Server-supplied `Retry-After` values and quota reset times are clamped to this.
    pub fn max_wait(&self) -> Duration {
        self.backoff_ceiling.saturating_add(WINDOW_SPAN)
    }
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
            max_burst_per_second: DEFAULT_BURST_PER_SECOND,
            max_retries: DEFAULT_MAX_RETRIES,
            verbose_logging: true,
            backoff_base: DEFAULT_BASE,
            backoff_ceiling: DEFAULT_CEILING,
            backoff_decay: DEFAULT_DECAY,
            jitter: Jitter::None,
        }
    }
}

/// Builder for `LimiterConfig`.
#[derive(Debug, Clone)]
pub struct LimiterConfigBuilder {
    config: LimiterConfig,
}

impl LimiterConfigBuilder {
    /// Create a builder with the documented defaults.
    pub fn new() -> Self {
        Self { config: LimiterConfig::default() }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    pub fn max_requests_per_minute(mut self, limit: u32) -> Self {
        self.config.max_requests_per_minute = limit;
        self
    }

    pub fn max_burst_per_second(mut self, limit: u32) -> Self {
        self.config.max_burst_per_second = limit;
        self
    }

    /// Retries after the initial attempt. Zero disables retrying.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    pub fn verbose_logging(mut self, verbose: bool) -> Self {
        self.config.verbose_logging = verbose;
        self
    }

    pub fn backoff_base(mut self, base: Duration) -> Self {
        self.config.backoff_base = base;
        self
    }

    pub fn backoff_ceiling(mut self, ceiling: Duration) -> Self {
        self.config.backoff_ceiling = ceiling;
        self
    }

    /// Multiplier applied to the backoff on each success, within (0, 1).
    pub fn backoff_decay(mut self, decay: f64) -> Self {
        self.config.backoff_decay = decay;
        self
    }

    pub fn with_jitter(mut self, jitter: Jitter) -> Self {
        self.config.jitter = jitter;
        self
    }

    /// Build the configuration, validating inputs.
    pub fn build(self) -> Result<LimiterConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for LimiterConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
