//! Rate limiting for relay-server.
//!
//! Codes are only four digits, so anyone can walk the space with enough
//! requests. An optional per-client limit slows that down.
//!
//! Clients are keyed by peer IP address. Requests with no known peer
//! (in-process tests, unusual listeners) share one bucket keyed on the
//! unspecified address.

use crate::config::LimitsConfig;
use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};
use std::net::{IpAddr, Ipv4Addr};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Type alias for a keyed rate limiter using DashMap.
type KeyedLimiter<K> = RateLimiter<
    K,
    dashmap::DashMap<K, InMemoryState>,
    DefaultClock,
    NoOpMiddleware<governor::clock::QuantaInstant>,
>;

/// Rate limiters for the relay server.
#[derive(Clone)]
pub struct RateLimits {
    /// Limits submit and lookup requests per client IP.
    ///
    /// `None` when `limits.requests_per_minute` is 0.
    client_limiter: Option<Arc<KeyedLimiter<IpAddr>>>,
}

impl std::fmt::Debug for RateLimits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimits")
            .field("enabled", &self.is_enabled())
            .field("client_limiter", &"KeyedLimiter<IpAddr>")
            .finish()
    }
}

impl RateLimits {
    /// Create rate limiters from configuration.
    pub fn new(config: &LimitsConfig) -> Self {
        let client_limiter = NonZeroU32::new(config.requests_per_minute)
            .map(|per_minute| Arc::new(RateLimiter::keyed(Quota::per_minute(per_minute))));

        Self { client_limiter }
    }

    /// Whether any limit is enforced.
    pub fn is_enabled(&self) -> bool {
        self.client_limiter.is_some()
    }

    /// Check if a request from `client` is allowed.
    ///
    /// # Returns
    ///
    /// `Ok(())` if allowed or limiting is disabled, `Err` if rate limited.
    pub fn check_client(&self, client: Option<IpAddr>) -> Result<(), RateLimitError> {
        let Some(limiter) = &self.client_limiter else {
            return Ok(());
        };

        let key = client.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        limiter
            .check_key(&key)
            .map_err(|_| RateLimitError::ClientLimitExceeded)
    }

    /// Get the number of tracked client keys (for metrics).
    pub fn tracked_clients(&self) -> usize {
        self.client_limiter.as_ref().map_or(0, |l| l.len())
    }

    /// Evict idle client entries from the keyed limiter.
    ///
    /// Called periodically from the cleanup task.
    pub fn shrink(&self) {
        if let Some(limiter) = &self.client_limiter {
            limiter.retain_recent();
        }
    }
}

/// Rate limit error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitError {
    /// Too many requests from this client.
    ClientLimitExceeded,
}

impl std::fmt::Display for RateLimitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ClientLimitExceeded => write!(f, "client rate limit exceeded"),
        }
    }
}

impl std::error::Error for RateLimitError {}
