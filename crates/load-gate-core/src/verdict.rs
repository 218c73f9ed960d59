// crates/load-gate-core/src/verdict.rs
// ============================================================================
// Module: Verdict
// Description: Pass/fail decision on the submit duration.
// Purpose: Map the measured load time onto the process exit status.
// Dependencies: load-gate-config, serde
// ============================================================================

//! ## Overview
//! Only the submit round trip is judged; browser timings are informational.
//! The comparison is strict: a duration equal to the threshold fails.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use load_gate_config::LoadThreshold;
use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome of the load-time test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Submit time was below the threshold.
    Pass,
    /// Submit time reached or exceeded the threshold.
    Fail,
}

impl Verdict {
    /// Judges `elapsed` against `threshold` using strict less-than.
    #[must_use]
    pub fn evaluate(elapsed: Duration, threshold: &LoadThreshold) -> Self {
        if elapsed < threshold.as_duration() { Self::Pass } else { Self::Fail }
    }

    /// Returns the process exit status for this verdict.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Pass => 0,
            Self::Fail => 1,
        }
    }

    /// Returns true for [`Verdict::Pass`].
    #[must_use]
    pub const fn is_pass(self) -> bool {
        matches!(self, Self::Pass)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
