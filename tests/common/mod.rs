#![allow(dead_code)]

use quota_guard::{LimiterConfig, ManualClock, RateLimiter, TrackingSleeper};

/// 2023-11-14T22:13:20Z, a whole second so reset headers line up with the clock.
pub const T0: u64 = 1_700_000_000_000;

/// Limiter on a manual clock; sleeping advances the clock and is recorded.
pub fn manual_limiter(config: LimiterConfig) -> (RateLimiter, ManualClock, TrackingSleeper) {
    let clock = ManualClock::new(T0);
    let sleeper = TrackingSleeper::wrapping(clock.clone());
    let limiter = RateLimiter::builder(config)
        .with_clock(clock.clone())
        .with_sleeper(sleeper.clone())
        .build()
        .expect("valid limiter config");
    (limiter, clock, sleeper)
}

pub fn config(rpm: u32, burst: u32, retries: u32) -> LimiterConfig {
    LimiterConfig::builder()
        .max_requests_per_minute(rpm)
        .max_burst_per_second(burst)
        .max_retries(retries)
        .verbose_logging(false)
        .build()
        .expect("valid limiter config")
}
