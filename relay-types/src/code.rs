//! Short numeric codes that users read out to each other.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypesError;

/// A relay-assigned code identifying one stored discovery token.
///
/// Codes are plain integers so they can be read aloud. The relay never
/// derives anything from the token itself.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Code(i64);

impl Code {
    /// Sentinel code returned when a submission is rejected before storage.
    pub const REJECTED: Code = Code(-1);

    /// Create a Code with the given value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the numeric value of this Code.
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Pick a code uniformly at random from `range`.
    pub fn random_in(range: &CodeRange) -> Self {
        Self(rand::thread_rng().gen_range(range.min..=range.max))
    }

    /// Parse a path segment the lenient way clients expect.
    ///
    /// Leading whitespace is skipped, an optional sign is accepted, then the
    /// longest run of ASCII digits is taken. Trailing garbage is ignored, so
    /// `"12abc"` parses as 12. Returns `None` when no digits follow or the
    /// value does not fit in an `i64`.
    pub fn parse_lenient(input: &str) -> Option<Self> {
        let trimmed = input.trim_start();
        let (negative, rest) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits_len == 0 {
            return None;
        }

        let magnitude: i64 = rest[..digits_len].parse().ok()?;
        Some(Self(if negative { -magnitude } else { magnitude }))
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Code({})", self.0)
    }
}

impl From<i64> for Code {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Inclusive range codes are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeRange {
    min: i64,
    max: i64,
}

impl CodeRange {
    /// Four-digit codes, 1000 through 9999.
    pub const FOUR_DIGIT: CodeRange = CodeRange {
        min: 1000,
        max: 9999,
    };

    /// Create a range, rejecting negative bounds and `min > max`.
    pub fn new(min: i64, max: i64) -> Result<Self, TypesError> {
        if min < 0 || min > max {
            return Err(TypesError::InvalidCodeRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Lowest code (inclusive).
    pub fn min(&self) -> i64 {
        self.min
    }

    /// Highest code (inclusive).
    pub fn max(&self) -> i64 {
        self.max
    }

    /// Whether `code` falls inside this range.
    pub fn contains(&self, code: Code) -> bool {
        (self.min..=self.max).contains(&code.value())
    }
}

impl Default for CodeRange {
    fn default() -> Self {
        Self::FOUR_DIGIT
    }
}
