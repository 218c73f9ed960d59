// crates/load-gate-core/src/audit.rs
// ============================================================================
// Module: Audit Runner
// Description: Invokes the external page-quality audit CLI for the target URL.
// Purpose: Produce the CSV audit report next to the project sources.
// Dependencies: reqwest (Url), serde
// ============================================================================

//! ## Overview
//! The audit tool is an opaque external command. It is started with a
//! structured argument list (no shell), inherits stdio, and is waited on. Its
//! result never fails the run: a non-zero exit or a missing binary is
//! reported as an [`AuditOutcome`] and nothing more.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

use reqwest::Url;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Browser flags handed to the audit tool as a single argument.
pub const AUDIT_CHROME_FLAGS: &str = "--chrome-flags=--headless --no-sandbox";

// ============================================================================
// SECTION: Types
// ============================================================================

/// A fully resolved audit invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRequest {
    /// Executable to run.
    pub program: String,
    /// Page to audit.
    pub url: Url,
    /// CSV report destination.
    pub output_path: PathBuf,
}

impl AuditRequest {
    /// Returns the arguments passed to [`AuditRequest::program`].
    #[must_use]
    pub fn argv(&self) -> Vec<OsString> {
        vec![
            OsString::from(self.url.as_str()),
            OsString::from(AUDIT_CHROME_FLAGS),
            OsString::from("--output"),
            OsString::from("csv"),
            OsString::from("--no-enable-error-reporting"),
            OsString::from("--output-path"),
            self.output_path.clone().into_os_string(),
        ]
    }

    /// Renders the invocation for display. Not suitable for a shell.
    #[must_use]
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.argv().iter().map(|arg| arg.to_string_lossy().into_owned()));
        parts.join(" ")
    }
}

/// Result of one audit invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuditOutcome {
    /// The tool exited with status zero.
    Succeeded,
    /// The tool exited unsuccessfully; `code` is `None` when killed by a signal.
    Failed {
        /// Exit code, if any.
        code: Option<i32>,
    },
    /// The tool could not be started.
    Unavailable {
        /// Spawn error text.
        reason: String,
    },
    /// The audit stage was skipped.
    Skipped,
}

impl AuditOutcome {
    /// Returns true when the tool ran and exited successfully.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

// ============================================================================
// SECTION: Runner Trait
// ============================================================================

/// Runs the external audit tool.
pub trait AuditRunner {
    /// Executes `request` and waits for it to finish.
    fn run(&mut self, request: &AuditRequest) -> AuditOutcome;
}

impl<T: AuditRunner + ?Sized> AuditRunner for &mut T {
    fn run(&mut self, request: &AuditRequest) -> AuditOutcome {
        (**self).run(request)
    }
}

/// [`AuditRunner`] that spawns the configured audit executable.
#[derive(Debug, Default, Clone, Copy)]
pub struct LighthouseRunner;

impl AuditRunner for LighthouseRunner {
    fn run(&mut self, request: &AuditRequest) -> AuditOutcome {
        match Command::new(&request.program).args(request.argv()).status() {
            Ok(status) if status.success() => AuditOutcome::Succeeded,
            Ok(status) => AuditOutcome::Failed {
                code: status.code(),
            },
            Err(err) => AuditOutcome::Unavailable {
                reason: err.to_string(),
            },
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
