mod common;

use common::{config, manual_limiter, T0};
use quota_guard::{Clock, LimiterConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn burst_of_ten_forces_eleventh_to_wait_a_second() {
    let (limiter, clock, sleeper) = manual_limiter(config(30, 10, 3));

    let first = clock.now_millis();
    for _ in 0..10 {
        limiter.acquire().await.expect("acquire");
        limiter.report_success(None);
        clock.advance(Duration::from_millis(15));
    }
    assert!(clock.now_millis() - first < 200);
    assert_eq!(sleeper.call_count(), 0, "first ten fit in the burst");

    limiter.acquire().await.expect("acquire");
    assert!(clock.now_millis() - first >= 1_000);
    assert_eq!(sleeper.call_count(), 1);
}

#[tokio::test]
async fn sliding_windows_never_exceed_configured_ceilings() {
    let (limiter, clock, _sleeper) = manual_limiter(config(30, 10, 3));
    let mut rng = StdRng::seed_from_u64(7);
    let mut granted = Vec::new();

    for _ in 0..200 {
        clock.advance(Duration::from_millis(rng.random_range(0..400)));
        limiter.acquire().await.expect("acquire");
        granted.push(clock.now_millis());
    }

    for i in 0..granted.len() {
        if let Some(later) = granted.get(i + 10) {
            assert!(later - granted[i] >= 1_000, "burst ceiling exceeded at {}", i);
        }
        if let Some(later) = granted.get(i + 30) {
            assert!(later - granted[i] >= 60_000, "minute ceiling exceeded at {}", i);
        }
    }
}

#[tokio::test]
async fn disabled_limiter_returns_immediately_regardless_of_history() {
    let (limiter, clock, sleeper) = manual_limiter(LimiterConfig::disabled());
    for _ in 0..500 {
        limiter.acquire().await.expect("acquire");
        limiter.report_throttled(None);
    }
    assert_eq!(limiter.wait_time(), Duration::ZERO);
    assert_eq!(sleeper.call_count(), 0);
    assert_eq!(clock.now_millis(), T0);
}

#[tokio::test]
async fn wait_time_does_not_reserve_a_slot() {
    let (limiter, _clock, _sleeper) = manual_limiter(config(30, 1, 3));
    assert_eq!(limiter.wait_time(), Duration::ZERO);
    assert_eq!(limiter.wait_time(), Duration::ZERO);
    limiter.acquire().await.expect("acquire");
    assert_eq!(limiter.wait_time(), Duration::from_secs(1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_share_one_window() {
    let (limiter, clock, _sleeper) = manual_limiter(config(1_000, 10, 3));
    let limiter = Arc::new(limiter);

    let tasks: Vec<_> = (0..20)
        .map(|_| {
            let limiter = limiter.clone();
            tokio::spawn(async move { limiter.acquire().await })
        })
        .collect();
    for task in tasks {
        task.await.expect("join").expect("acquire");
    }

    let stats = limiter.stats();
    assert_eq!(stats.requests_per_minute, 20);
    assert!(stats.requests_per_second <= 10);
    assert!(clock.now_millis() >= T0 + 1_000, "half the callers had to wait");
}

#[tokio::test]
async fn stats_expose_live_rates() {
    let (limiter, clock, _sleeper) = manual_limiter(config(30, 10, 3));
    for _ in 0..4 {
        limiter.acquire().await.expect("acquire");
        limiter.report_success(None);
    }
    clock.advance(Duration::from_secs(2));
    limiter.acquire().await.expect("acquire");
    limiter.report_throttled(None);

    let stats = limiter.stats();
    assert_eq!(stats.total_requests, 5);
    assert_eq!(stats.throttled_requests, 1);
    assert_eq!(stats.throttle_rate, 1.0 / 5.0);
    assert_eq!(stats.requests_per_minute, 5);
    assert_eq!(stats.requests_per_second, 1);
    assert_eq!(stats.max_requests_per_minute, 30);
    assert_eq!(stats.consecutive_throttles, 1);
    assert_eq!(stats.current_backoff, Duration::from_secs(2));
}
