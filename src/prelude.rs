//! Convenient re-exports for common quota-guard types.
pub use crate::{
    backoff::{BackoffController, BackoffError, MAX_BACKOFF},
    config::{ConfigError, LimiterConfig, LimiterConfigBuilder},
    error::{AcquireError, LimiterError},
    headers::{HeaderLookup, RemoteQuotaHint, ResponseMeta},
    jitter::Jitter,
    layer::{ClassifyResponse, ThrottleLayer},
    limiter::{Outcome, RateLimiter},
    stats::Stats,
    CancellationToken,
};
