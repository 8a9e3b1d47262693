//! Main TokenRelay coordination.
//!
//! TokenRelay owns storage, code generation, limits and metrics. HTTP
//! handlers are thin wrappers around [`TokenRelay::submit`] and
//! [`TokenRelay::lookup`].

use crate::config::{Config, ConfigError};
use crate::limits::RateLimits;
use crate::storage::{SqliteStorage, StoreTokenRequest, TokenStorage};
use relay_types::{Code, CodeRange, TokenResponse};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Operational metrics for monitoring relay activity.
///
/// All counters are monotonically increasing (reset only on restart).
#[derive(Debug, Default)]
pub struct RelayMetrics {
    /// Submissions that reached storage (successful or not).
    pub submissions_total: AtomicU64,
    /// Submissions refused before storage (non-JSON, bad body).
    pub submissions_rejected: AtomicU64,
    /// Storage writes that failed.
    pub write_failures: AtomicU64,
    /// Lookups handled.
    pub lookups_total: AtomicU64,
    /// Lookups that found a token.
    pub lookup_hits: AtomicU64,
    /// Lookups that found nothing.
    pub lookup_misses: AtomicU64,
    /// Storage reads that failed.
    pub read_failures: AtomicU64,
    /// Requests refused by the rate limiter.
    pub rate_limit_hits: AtomicU64,
}

/// Main relay server state, shared by every request.
pub struct TokenRelay {
    config: Config,
    code_range: CodeRange,
    storage: Arc<dyn TokenStorage>,
    /// Rate limiters for submit and lookup.
    rate_limits: RateLimits,
    /// Operational metrics (counters).
    metrics: RelayMetrics,
}

impl std::fmt::Debug for TokenRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRelay")
            .field("config", &self.config)
            .field("code_range", &self.code_range)
            .field("rate_limits", &self.rate_limits)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

impl TokenRelay {
    /// Create a new TokenRelay with the given config and storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured code range is invalid.
    pub fn new(config: Config, storage: impl TokenStorage + 'static) -> Result<Self, ConfigError> {
        let code_range = config.codes.range()?;
        let rate_limits = RateLimits::new(&config.limits);
        Ok(Self {
            config,
            code_range,
            storage: Arc::new(storage),
            rate_limits,
            metrics: RelayMetrics::default(),
        })
    }

    /// Open the configured SQLite database and build a relay on top of it.
    pub async fn open(config: Config) -> crate::error::Result<Self> {
        config.validate()?;
        let storage =
            SqliteStorage::new(&config.storage.database, config.storage.max_connections).await?;
        Ok(Self::new(config, storage)?)
    }

    /// Get the relay configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get access to the storage layer.
    pub fn storage(&self) -> &dyn TokenStorage {
        self.storage.as_ref()
    }

    /// Get a clone of the storage Arc for background tasks.
    pub fn storage_arc(&self) -> Arc<dyn TokenStorage> {
        self.storage.clone()
    }

    /// Get access to the rate limiters.
    pub fn rate_limits(&self) -> &RateLimits {
        &self.rate_limits
    }

    /// Get access to the operational metrics.
    pub fn metrics(&self) -> &RelayMetrics {
        &self.metrics
    }

    /// File `token` under a freshly drawn code.
    ///
    /// A colliding code silently overwrites the earlier token. A failed write
    /// is logged and reported through `success: false`; it is not retried.
    pub async fn submit(&self, token: String) -> TokenResponse {
        let code = Code::random_in(&self.code_range);
        self.metrics.submissions_total.fetch_add(1, Ordering::Relaxed);

        match self
            .storage
            .store_token(StoreTokenRequest::now(code, token.clone()))
            .await
        {
            Ok(()) => {
                tracing::debug!("Stored token under code {} ({} bytes)", code, token.len());
                TokenResponse::stored(code, token, true)
            }
            Err(e) => {
                self.metrics.write_failures.fetch_add(1, Ordering::Relaxed);
                tracing::error!("Failed to store token under code {}: {}", code, e);
                TokenResponse::stored(code, token, false)
            }
        }
    }

    /// Record a submission refused before it reached storage.
    pub fn reject_submission(&self, reason: &str) -> TokenResponse {
        self.metrics
            .submissions_rejected
            .fetch_add(1, Ordering::Relaxed);
        tracing::debug!("Rejected submission: {}", reason);
        TokenResponse::rejected()
    }

    /// Look up the token filed under the raw path segment `key`.
    ///
    /// The response `id` is the lenient parse of `key`; storage is queried
    /// with `key` untouched.
    pub async fn lookup(&self, key: &str) -> TokenResponse {
        let id = Code::parse_lenient(key);
        self.metrics.lookups_total.fetch_add(1, Ordering::Relaxed);

        match self.storage.get_token(key).await {
            Ok(Some(record)) => {
                self.metrics.lookup_hits.fetch_add(1, Ordering::Relaxed);
                TokenResponse::found(id, record.token)
            }
            Ok(None) => {
                self.metrics.lookup_misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("No token for key {:?}", key);
                TokenResponse::missing(id)
            }
            Err(e) => {
                self.metrics.read_failures.fetch_add(1, Ordering::Relaxed);
                tracing::error!("Failed to read token for key {:?}: {}", key, e);
                TokenResponse::missing(id)
            }
        }
    }
}
