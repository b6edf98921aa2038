//! Tower middleware that routes every request through a [`RateLimiter`].
//!
//! The wrapped service's responses are classified with [`ClassifyResponse`]; throttled responses
//! are retried under the limiter's budget and never reach the caller. When the budget runs out
//! the caller gets `LimiterError::QuotaExhausted`. Errors from the inner service come back as
//! `LimiterError::Transport` without retry.
//!
//! ```rust
//! use quota_guard::{ClassifyResponse, LimiterConfig, RateLimiter, ThrottleLayer};
//!
//! struct Status(u16);
//! impl ClassifyResponse for Status {
//!     fn is_throttled(&self) -> bool {
//!         self.0 == 429
//!     }
//! }
//!
//! let limiter = RateLimiter::new(LimiterConfig::default()).unwrap();
//! let layer = ThrottleLayer::new(limiter);
//! # let _ = layer;
//! ```

use futures::future::{poll_fn, BoxFuture};
use std::task::{Context, Poll};
use tower_layer::Layer;
use tower_service::Service;

use crate::error::LimiterError;
use crate::headers::ResponseMeta;
use crate::limiter::{Outcome, RateLimiter};

/// Decides whether a response means "too many requests".
pub trait ClassifyResponse {
    fn is_throttled(&self) -> bool;

    /// Quota headers and retry hint carried by the response.
    fn response_meta(&self) -> Option<ResponseMeta> {
        None
    }
}

#[cfg(feature = "http")]
impl<B> ClassifyResponse for http::Response<B> {
    fn is_throttled(&self) -> bool {
        self.status() == http::StatusCode::TOO_MANY_REQUESTS
    }

    fn response_meta(&self) -> Option<ResponseMeta> {
        let meta = ResponseMeta::from_headers(self.headers());
        (meta != ResponseMeta::default()).then_some(meta)
    }
}

/// A layer that enforces a shared [`RateLimiter`].
#[derive(Clone, Debug)]
pub struct ThrottleLayer {
    limiter: RateLimiter,
}

impl ThrottleLayer {
    /// Create a new throttle layer. Every service it wraps shares `limiter`.
    pub fn new(limiter: RateLimiter) -> Self {
        Self { limiter }
    }
}

impl<S> Layer<S> for ThrottleLayer {
    type Service = ThrottleService<S>;

    fn layer(&self, service: S) -> Self::Service {
        ThrottleService { inner: service, limiter: self.limiter.clone() }
    }
}

/// Middleware service produced by [`ThrottleLayer`].
#[derive(Clone, Debug)]
pub struct ThrottleService<S> {
    inner: S,
    limiter: RateLimiter,
}

impl<S> ThrottleService<S> {
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}

impl<S, Req> Service<Req> for ThrottleService<S>
where
    S: Service<Req> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Response: ClassifyResponse + Send + 'static,
    S::Error: Send + 'static,
    Req: Clone + Send + 'static,
{
    type Response = S::Response;
    type Error = LimiterError<S::Error>;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(LimiterError::Transport)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let limiter = self.limiter.clone();
        let inner = self.inner.clone();

        Box::pin(async move {
            limiter
                .execute_with_retry(move || {
                    let mut svc = inner.clone();
                    let req = req.clone();
                    async move {
                        poll_fn(|cx| svc.poll_ready(cx)).await?;
                        let response = svc.call(req).await?;
                        let meta = response.response_meta();
                        Ok(if response.is_throttled() {
                            Outcome::Throttled { meta }
                        } else {
                            Outcome::Success { value: response, meta }
                        })
                    }
                })
                .await
        })
    }
}
