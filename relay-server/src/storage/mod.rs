//! Storage layer for relay-server.
//!
//! One table of `(code, token, created_at)` rows with upsert-by-code semantics.

mod sqlite;

pub use sqlite::SqliteStorage;

use crate::error::StorageError;
use async_trait::async_trait;
use relay_types::Code;
use std::time::{SystemTime, UNIX_EPOCH};

/// A token stored in the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    /// Code the token is filed under.
    pub code: Code,
    /// Opaque token, exactly as submitted.
    pub token: String,
    /// Unix timestamp of the last write to this code.
    pub created_at: i64,
}

/// Request to store a token.
#[derive(Debug, Clone)]
pub struct StoreTokenRequest {
    /// Code to file the token under. An existing row is overwritten.
    pub code: Code,
    /// Opaque token.
    pub token: String,
    /// Unix timestamp recorded as `created_at`.
    pub created_at: i64,
}

impl StoreTokenRequest {
    /// Build a request stamped with the current time.
    pub fn now(code: Code, token: impl Into<String>) -> Self {
        Self {
            code,
            token: token.into(),
            created_at: current_timestamp(),
        }
    }
}

/// Trait for token storage backends.
#[async_trait]
pub trait TokenStorage: Send + Sync {
    /// Insert or overwrite the token for `req.code`. Last writer wins.
    async fn store_token(&self, req: StoreTokenRequest) -> Result<(), StorageError>;

    /// Look up a token by the raw key a client sent.
    ///
    /// The key is compared against the integer code column as-is, so
    /// `"4231"` matches code 4231 while malformed keys simply miss.
    async fn get_token(&self, key: &str) -> Result<Option<TokenRecord>, StorageError>;

    /// Number of stored tokens.
    async fn count_tokens(&self) -> Result<u64, StorageError>;

    /// Delete tokens last written more than `max_age_secs` ago.
    ///
    /// Returns the number of tokens deleted.
    async fn cleanup_older_than(&self, max_age_secs: u64) -> Result<u64, StorageError>;
}

/// Current unix time in seconds.
pub fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
