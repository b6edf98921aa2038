//! Error types surfaced by the limiter
use std::fmt;
use std::time::Duration;

/// Failures returned from `acquire` and `execute_with_retry`.
///
/// Transient throttling inside the retry budget never shows up here; it is absorbed into a
/// wait-then-retry cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LimiterError<E> {
    /// Every attempt (initial + `max_retries`) was throttled.
    QuotaExhausted {
        /// Total attempts made.
        attempts: u32,
        /// Retry delay the limiter would have imposed next.
        next_delay: Duration,
    },
    /// The caller's cancellation signal fired during a wait.
    Cancelled,
    /// The transport failed for reasons unrelated to rate limiting. Passed through untouched.
    Transport(E),
}

impl<E: fmt::Display> fmt::Display for LimiterError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QuotaExhausted { attempts, next_delay } => write!(
                f,
                "remote quota exhausted after {} attempts (next backoff would be {:?})",
                attempts, next_delay
            ),
            Self::Cancelled => write!(f, "rate limit wait cancelled"),
            Self::Transport(e) => write!(f, "{}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for LimiterError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl<E> LimiterError<E> {
    /// Check if the retry budget ran out
    pub fn is_quota_exhausted(&self) -> bool {
        matches!(self, Self::QuotaExhausted { .. })
    }
    /// Check if the wait was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
    /// Check if this wraps a transport error.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
    /// Get the transport error if this is a Transport variant
    pub fn into_transport(self) -> Option<E> {
        match self {
            Self::Transport(e) => Some(e),
            _ => None,
        }
    }
    /// Borrow the transport error if present.
    pub fn as_transport(&self) -> Option<&E> {
        match self {
            Self::Transport(e) => Some(e),
            _ => None,
        }
    }
    /// Attempts made before giving up, for `QuotaExhausted`.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Self::QuotaExhausted { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }
    /// Change the transport error type; other variants carry over unchanged.
    pub fn map_transport<F, T>(self, f: F) -> LimiterError<T>
    where
        F: FnOnce(E) -> T,
    {
        match self {
            Self::QuotaExhausted { attempts, next_delay } => {
                LimiterError::QuotaExhausted { attempts, next_delay }
            }
            Self::Cancelled => LimiterError::Cancelled,
            Self::Transport(e) => LimiterError::Transport(f(e)),
        }
    }
}

/// Error returned by `acquire`, which never touches the transport.
pub type AcquireError = LimiterError<std::convert::Infallible>;

impl AcquireError {
    /// Widen an acquire failure into any transport error type.
    pub fn widen<E>(self) -> LimiterError<E> {
        self.map_transport(|never| match never {})
    }
}
