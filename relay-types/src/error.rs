//! Error types for nearby-relay wire types.

use thiserror::Error;

/// Errors raised while building wire-level values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    /// Code range is empty or negative.
    #[error("invalid code range: {min}..={max}")]
    InvalidCodeRange {
        /// Requested lower bound.
        min: i64,
        /// Requested upper bound.
        max: i64,
    },
}
