#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # quota-guard
//!
//! Adaptive client-side rate limiting for third-party HTTP APIs that enforce their own quota
//! (requests per minute, burst per second, and HTTP 429 responses).
//!
//! ## Features
//!
//! - **Sliding windows** for per-minute and per-second ceilings
//! - **Exponential backoff** on throttling, decaying gradually on success
//! - **Quota hints** from `X-RateLimit-*` and `Retry-After` headers
//! - **Retry orchestration** with a bounded budget and a distinct exhaustion error
//! - **Cancellable waits** via `tokio_util::sync::CancellationToken`
//! - **Live statistics** snapshots for dashboards and logs
//! - **Tower middleware** for wrapping any `Service`
//!
//! ## Quick Start
//!
//! ```rust
//! use quota_guard::{LimiterConfig, Outcome, RateLimiter, ResponseMeta};
//!
//! #[tokio::main]
//! async fn main() {
//!     let limiter = RateLimiter::new(
//!         LimiterConfig::builder()
//!             .max_requests_per_minute(30)
//!             .max_burst_per_second(10)
//!             .max_retries(3)
//!             .build()
//!             .unwrap(),
//!     )
//!     .unwrap();
//!
//!     let result = limiter
//!         .execute_with_retry(|| async {
//!             // Perform the HTTP call here and classify the response.
//!             let headers = [("X-RateLimit-Remaining", "29")];
//!             let meta = ResponseMeta::from_headers(&headers);
//!             Ok::<_, std::io::Error>(Outcome::success(200u16).with_meta(meta))
//!         })
//!         .await;
//!
//!     assert_eq!(result.unwrap(), 200);
//!     println!("{}", limiter.stats());
//! }
//! ```

pub mod backoff;
pub mod clock;
pub mod config;
pub mod error;
pub mod headers;
pub mod jitter;
pub mod layer;
pub mod limiter;
pub mod prelude;
pub mod sleeper;
pub mod stats;
pub mod window;

// Re-exports
pub use backoff::{BackoffController, BackoffError};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, LimiterConfig, LimiterConfigBuilder};
pub use error::{AcquireError, LimiterError};
pub use headers::{HeaderLookup, RemoteQuotaHint, ResponseMeta};
pub use jitter::Jitter;
pub use layer::{ClassifyResponse, ThrottleLayer, ThrottleService};
pub use limiter::{CallState, Outcome, RateLimiter, RateLimiterBuilder};
pub use sleeper::{InstantSleeper, Sleeper, TokioSleeper, TrackingSleeper};
pub use stats::{Stats, StatsRecorder};
pub use tokio_util::sync::CancellationToken;
pub use window::RequestWindow;
