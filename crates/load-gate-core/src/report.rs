// crates/load-gate-core/src/report.rs
// ============================================================================
// Module: Run Report
// Description: Machine-readable summary of one load-gate run.
// Purpose: Give CI jobs a JSON artifact alongside the audit CSV.
// Dependencies: serde, serde_json
// ============================================================================

//! Serializable summary of a run, written with `--report`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;

use crate::audit::AuditOutcome;
use crate::probe::TimingSplit;
use crate::verdict::Verdict;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Submit URL.
    pub post_address: String,
    /// HTTP status of the submit response.
    pub status: u16,
    /// Submit round trip in seconds.
    pub submit_secs: f64,
    /// Threshold in seconds.
    pub threshold_secs: u64,
    /// URL extracted from the response.
    pub target_url: String,
    /// Browser timing split; absent when the browser stage was skipped.
    pub timing: Option<TimingSplit>,
    /// Audit result.
    pub audit: AuditOutcome,
    /// Audit report location.
    pub audit_report: String,
    /// Final decision.
    pub verdict: Verdict,
}

impl RunReport {
    /// Serializes the report as indented JSON.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] when serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Writes the report as indented JSON to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`io::Error`] when serialization or the write fails.
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        let mut json = self.to_json_pretty().map_err(io::Error::other)?;
        json.push('\n');
        fs::write(path, json)
    }
}
