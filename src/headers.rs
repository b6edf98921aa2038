//! Quota information carried by API response headers.
//!
//! Recognized headers (names are matched case-insensitively):
//! - `X-RateLimit-Limit`: requests allowed per window
//! - `X-RateLimit-Remaining`: requests left in the current window
//! - `X-RateLimit-Reset`: Unix time (seconds) at which the window resets
//! - `Retry-After`: delay in whole seconds before retrying
//!
//! Values that fail to parse are treated as absent. `Retry-After` in HTTP-date form is not
//! interpreted.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

pub const RATE_LIMIT_LIMIT: &str = "x-ratelimit-limit";
pub const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
pub const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";
pub const RETRY_AFTER: &str = "retry-after";

/// Read-only access to response headers by name.
pub trait HeaderLookup {
    /// Value of the header `name` (lowercase ASCII), ignoring case of the stored name.
    fn header(&self, name: &str) -> Option<&str>;
}

impl<S: std::hash::BuildHasher> HeaderLookup for HashMap<String, String, S> {
    fn header(&self, name: &str) -> Option<&str> {
        self.get(name)
            .or_else(|| self.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v))
            .map(String::as_str)
    }
}

impl HeaderLookup for BTreeMap<String, String> {
    fn header(&self, name: &str) -> Option<&str> {
        self.get(name)
            .or_else(|| self.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v))
            .map(String::as_str)
    }
}

impl HeaderLookup for [(&str, &str)] {
    fn header(&self, name: &str) -> Option<&str> {
        self.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| *v)
    }
}

impl<const N: usize> HeaderLookup for [(&str, &str); N] {
    fn header(&self, name: &str) -> Option<&str> {
        self.as_slice().header(name)
    }
}

#[cfg(feature = "http")]
impl HeaderLookup for http::HeaderMap {
    fn header(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Remaining-quota information from the most recent response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemoteQuotaHint {
    /// Requests allowed per remote window.
    pub limit: Option<u32>,
    /// Requests left in the current remote window.
    pub remaining: Option<u32>,
    /// Unix time (seconds) at which the remote window resets.
    pub reset_at: Option<u64>,
}

impl RemoteQuotaHint {
    pub fn from_headers<H: HeaderLookup + ?Sized>(headers: &H) -> Self {
        Self {
            limit: parse(headers, RATE_LIMIT_LIMIT),
            remaining: parse(headers, RATE_LIMIT_REMAINING),
            reset_at: parse(headers, RATE_LIMIT_RESET),
        }
    }

    /// True when no field was present.
    pub fn is_empty(&self) -> bool {
        self.limit.is_none() && self.remaining.is_none() && self.reset_at.is_none()
    }

    /// Reset time in Unix epoch milliseconds.
    pub fn reset_at_millis(&self) -> Option<u64> {
        self.reset_at.map(|secs| secs.saturating_mul(1_000))
    }

    /// A hint stays in effect until its reset time passes. Hints without a reset time are
    /// never considered fresh.
    pub fn is_fresh(&self, now_millis: u64) -> bool {
        self.reset_at_millis().is_some_and(|reset| reset > now_millis)
    }

    /// True when the server reports no quota left before the reset.
    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }
}

/// Everything the limiter takes from one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResponseMeta {
    pub quota: RemoteQuotaHint,
    pub retry_after: Option<Duration>,
}

impl ResponseMeta {
    pub fn from_headers<H: HeaderLookup + ?Sized>(headers: &H) -> Self {
        Self {
            quota: RemoteQuotaHint::from_headers(headers),
            retry_after: parse::<u64, _>(headers, RETRY_AFTER).map(Duration::from_secs),
        }
    }

    /// Metadata carrying only a retry hint.
    pub fn retry_after(delay: Duration) -> Self {
        Self { quota: RemoteQuotaHint::default(), retry_after: Some(delay) }
    }

    pub fn with_quota(mut self, quota: RemoteQuotaHint) -> Self {
        self.quota = quota;
        self
    }
}

fn parse<T, H>(headers: &H, name: &str) -> Option<T>
where
    T: std::str::FromStr,
    H: HeaderLookup + ?Sized,
{
    headers.header(name)?.trim().parse().ok()
}
