// crates/load-gate-config/src/threshold.rs
// ============================================================================
// Module: Load-Time Threshold
// Description: Typed representation of the `LOADTIME_THRESHOLD` setting.
// Purpose: Parse the threshold once, before any network work happens.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! The threshold is a whole number of seconds. Surrounding whitespace and a
//! single leading `+` are tolerated; anything else is rejected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use thiserror::Error;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Load-time threshold in whole seconds.
///
/// # Invariants
/// - `raw` is the exact text the threshold was parsed from.
/// - `seconds` is the integer value of `raw`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadThreshold {
    /// Parsed threshold in seconds.
    seconds: u64,
    /// Unmodified source text.
    raw: String,
}

/// Threshold parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThresholdError {
    /// The value was empty after trimming.
    #[error("threshold must not be empty")]
    Empty,
    /// The value was not a non-negative integer.
    #[error("threshold must be a non-negative integer number of seconds, got {0:?}")]
    NotAnInteger(String),
    /// The value does not fit in 64 bits.
    #[error("threshold {0} is out of range")]
    OutOfRange(String),
}

impl LoadThreshold {
    /// Parses a threshold from its textual form.
    ///
    /// # Errors
    ///
    /// Returns [`ThresholdError`] when the text is empty, non-numeric,
    /// negative, or too large.
    pub fn parse(raw: &str) -> Result<Self, ThresholdError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ThresholdError::Empty);
        }
        let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
        if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(ThresholdError::NotAnInteger(raw.to_string()));
        }
        let seconds =
            digits.parse::<u64>().map_err(|_| ThresholdError::OutOfRange(raw.to_string()))?;
        Ok(Self {
            seconds,
            raw: raw.to_string(),
        })
    }

    /// Builds a threshold directly from a number of seconds.
    #[must_use]
    pub fn from_secs(seconds: u64) -> Self {
        Self {
            seconds,
            raw: seconds.to_string(),
        }
    }

    /// Returns the threshold in whole seconds.
    #[must_use]
    pub const fn as_secs(&self) -> u64 {
        self.seconds
    }

    /// Returns the threshold as a [`Duration`].
    #[must_use]
    pub const fn as_duration(&self) -> Duration {
        Duration::from_secs(self.seconds)
    }

    /// Returns the unmodified source text.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for LoadThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.seconds)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions favor direct unwrap/expect for clarity."
    )]

    use super::LoadThreshold;
    use super::ThresholdError;

    #[test]
    fn parses_plain_and_padded_integers() {
        assert_eq!(LoadThreshold::parse("5").unwrap().as_secs(), 5);
        assert_eq!(LoadThreshold::parse(" 12 ").unwrap().as_secs(), 12);
        assert_eq!(LoadThreshold::parse("+7").unwrap().as_secs(), 7);
        assert_eq!(LoadThreshold::parse("0").unwrap().as_secs(), 0);
    }

    #[test]
    fn keeps_raw_text() {
        let threshold = LoadThreshold::parse(" 5").unwrap();
        assert_eq!(threshold.raw(), " 5");
        assert_eq!(threshold.to_string(), "5");
    }

    #[test]
    fn rejects_non_integers() {
        assert_eq!(LoadThreshold::parse("   "), Err(ThresholdError::Empty));
        assert!(matches!(LoadThreshold::parse("5.5"), Err(ThresholdError::NotAnInteger(_))));
        assert!(matches!(LoadThreshold::parse("-1"), Err(ThresholdError::NotAnInteger(_))));
        assert!(matches!(LoadThreshold::parse("+"), Err(ThresholdError::NotAnInteger(_))));
        assert!(matches!(LoadThreshold::parse("five"), Err(ThresholdError::NotAnInteger(_))));
    }

    #[test]
    fn rejects_overflow() {
        assert!(matches!(
            LoadThreshold::parse("99999999999999999999999"),
            Err(ThresholdError::OutOfRange(_))
        ));
    }
}
