mod common;

use common::{config, manual_limiter};
use quota_guard::{ClassifyResponse, LimiterError, ResponseMeta, ThrottleLayer};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::{service_fn, ServiceBuilder, ServiceExt};

#[derive(Debug, Clone, PartialEq)]
struct Reply {
    status: u16,
    retry_after: Option<u64>,
}

impl Reply {
    fn ok() -> Self {
        Self { status: 200, retry_after: None }
    }

    fn too_many(retry_after: Option<u64>) -> Self {
        Self { status: 429, retry_after }
    }
}

impl ClassifyResponse for Reply {
    fn is_throttled(&self) -> bool {
        self.status == 429
    }

    fn response_meta(&self) -> Option<ResponseMeta> {
        self.retry_after.map(|secs| ResponseMeta::retry_after(Duration::from_secs(secs)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("dns lookup failed")]
struct Dns;

#[tokio::test]
async fn throttled_responses_are_retried_transparently() {
    let (limiter, _clock, sleeper) = manual_limiter(config(30, 10, 3));
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    let svc = ServiceBuilder::new().layer(ThrottleLayer::new(limiter.clone())).service(service_fn(
        move |_req: &'static str| {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Ok::<_, Dns>(Reply::too_many(Some(5)))
                } else {
                    Ok(Reply::ok())
                }
            }
        },
    ));

    let reply = svc.oneshot("GET /v1/items").await.expect("third attempt succeeds");
    assert_eq!(reply, Reply::ok());
    assert_eq!(hits.load(Ordering::SeqCst), 3);
    assert_eq!(sleeper.calls(), vec![Duration::from_secs(5), Duration::from_secs(5)]);

    let stats = limiter.stats();
    assert_eq!(stats.total_requests, 3);
    assert_eq!(stats.throttled_requests, 2);
}

#[tokio::test]
async fn exhausted_budget_surfaces_quota_exhausted() {
    let (limiter, _clock, _sleeper) = manual_limiter(config(30, 10, 2));
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    let svc = ServiceBuilder::new().layer(ThrottleLayer::new(limiter)).service(service_fn(
        move |_req: u32| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, Dns>(Reply::too_many(None)) }
        },
    ));

    let err = svc.oneshot(7).await.unwrap_err();
    assert!(matches!(err, LimiterError::QuotaExhausted { attempts: 3, .. }));
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn inner_errors_pass_through() {
    let (limiter, _clock, _sleeper) = manual_limiter(config(30, 10, 3));
    let svc = ServiceBuilder::new()
        .layer(ThrottleLayer::new(limiter.clone()))
        .service(service_fn(|_req: ()| async { Err::<Reply, _>(Dns) }));

    let err = svc.oneshot(()).await.unwrap_err();
    assert_eq!(err, LimiterError::Transport(Dns));
    assert_eq!(limiter.stats().total_requests, 0);
}

#[tokio::test]
async fn services_share_one_limiter() {
    let (limiter, _clock, _sleeper) = manual_limiter(config(30, 10, 3));
    let layer = ThrottleLayer::new(limiter.clone());
    let ok = || service_fn(|_req: ()| async { Ok::<_, Dns>(Reply::ok()) });

    let a = ServiceBuilder::new().layer(layer.clone()).service(ok());
    let b = ServiceBuilder::new().layer(layer).service(ok());
    a.oneshot(()).await.unwrap();
    b.oneshot(()).await.unwrap();

    assert_eq!(limiter.stats().total_requests, 2);
    assert_eq!(limiter.stats().requests_per_second, 2);
}
