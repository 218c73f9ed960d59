// crates/load-gate-core/src/pipeline.rs
// ============================================================================
// Module: Load Gate Pipeline
// Description: The linear run: payload, submit, extract, probe, audit, verdict.
// Purpose: Sequence the stages with early exit and a single error type.
// Dependencies: load-gate-config, thiserror
// ============================================================================

//! ## Overview
//! [`Pipeline::run`] executes each stage once, in order, and stops at the
//! first fatal error. Fatal errors are collected into [`GateError`] so the
//! caller has exactly one place that maps failures to diagnostics and exit
//! codes. A failing audit and a failing verdict are not errors: both are part
//! of the returned [`RunReport`].
//! Invariants:
//! - The prober and the auditor each see the extracted URL exactly once.
//! - Only the submit duration feeds the verdict.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use load_gate_config::ConfigError;
use load_gate_config::LoadGateConfig;
use thiserror::Error;

use crate::audit::AuditOutcome;
use crate::audit::AuditRequest;
use crate::audit::AuditRunner;
use crate::events::RunEvent;
use crate::events::RunObserver;
use crate::extract::ExtractError;
use crate::extract::extract_target_url;
use crate::payload::DEFAULT_MAX_PAYLOAD_BYTES;
use crate::payload::PayloadError;
use crate::payload::load_payload;
use crate::payload::render_payload;
use crate::payload::resolve_payload_path;
use crate::probe::BrowserOptions;
use crate::probe::PageProber;
use crate::probe::ProbeError;
use crate::report::RunReport;
use crate::submit::SubmitConfig;
use crate::submit::SubmitError;
use crate::submit::Submitter;
use crate::verdict::Verdict;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fatal run failures. Every variant maps to exit status 1.
#[derive(Debug, Error)]
pub enum GateError {
    /// Required configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The payload could not be loaded from the project root.
    #[error("{source}")]
    PayloadUnreadable {
        /// Project root the payload path was joined onto.
        root: PathBuf,
        /// Loader failure.
        #[source]
        source: PayloadError,
    },
    /// The submit request failed.
    #[error(transparent)]
    Submit(#[from] SubmitError),
    /// The response did not carry a usable target URL.
    #[error(transparent)]
    ResponseMalformed(#[from] ExtractError),
    /// The browser stage failed.
    #[error(transparent)]
    Probe(#[from] ProbeError),
}

impl GateError {
    /// Process exit status for this failure.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        1
    }
}

// ============================================================================
// SECTION: Options
// ============================================================================

/// Switches that shape a run without changing its semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Include the indented payload in the `PayloadLoaded` event.
    pub print_payload: bool,
    /// Do not launch the browser.
    pub skip_browser: bool,
    /// Do not run the audit tool.
    pub skip_audit: bool,
    /// Maximum payload size, in bytes.
    pub max_payload_bytes: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            print_payload: false,
            skip_browser: false,
            skip_audit: false,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}

// ============================================================================
// SECTION: Pipeline
// ============================================================================

/// One configured load-gate run.
pub struct Pipeline<P, A> {
    /// Loaded configuration.
    config: LoadGateConfig,
    /// HTTP submitter.
    submitter: Submitter,
    /// Browser timing source.
    prober: P,
    /// Audit tool runner.
    auditor: A,
    /// Run switches.
    options: PipelineOptions,
}

impl<P: PageProber, A: AuditRunner> Pipeline<P, A> {
    /// Creates a pipeline with default options.
    pub fn new(config: LoadGateConfig, submitter: Submitter, prober: P, auditor: A) -> Self {
        Self {
            config,
            submitter,
            prober,
            auditor,
            options: PipelineOptions::default(),
        }
    }

    /// Replaces the run switches.
    #[must_use]
    pub const fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Executes every stage once and returns the run summary.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] at the first fatal stage failure.
    pub fn run<O: RunObserver + ?Sized>(
        &mut self,
        observer: &mut O,
    ) -> Result<RunReport, GateError> {
        let config = &self.config;
        let post_address = config.post_address();
        observer.on_event(&RunEvent::Started {
            post_address: post_address.clone(),
            threshold_secs: config.threshold.as_secs(),
        });

        let payload =
            load_payload(&config.ci_root, &config.payload_path, self.options.max_payload_bytes)
                .map_err(|source| GateError::PayloadUnreadable {
                    root: config.ci_root.clone(),
                    source,
                })?;
        observer.on_event(&RunEvent::PayloadLoaded {
            path: resolve_payload_path(&config.ci_root, &config.payload_path)
                .display()
                .to_string(),
            rendered: self.options.print_payload.then(|| render_payload(&payload)),
        });

        let submission = self.submitter.submit(&post_address, &payload, &config.auth_header)?;
        let elapsed_secs = submission.elapsed.as_secs_f64();
        observer.on_event(&RunEvent::Submitted {
            elapsed_secs,
            status: submission.status,
            url: submission.url.clone(),
            headers: submission.headers.clone(),
            body: submission.body.clone(),
        });

        let target = extract_target_url(&submission.body, &config.tunables.url_path)?;
        observer.on_event(&RunEvent::TargetResolved {
            url: target.to_string(),
        });

        let timing = if self.options.skip_browser {
            observer.on_event(&RunEvent::ProbeSkipped);
            None
        } else {
            let split = self.prober.probe(&target)?.split();
            observer.on_event(&RunEvent::Probed {
                backend_ms: split.backend_ms,
                frontend_ms: split.frontend_ms,
            });
            Some(split)
        };

        let report_path = config.report_path();
        let audit = if self.options.skip_audit {
            AuditOutcome::Skipped
        } else {
            let request = AuditRequest {
                program: config.tunables.audit_bin.clone(),
                url: target.clone(),
                output_path: report_path.clone(),
            };
            observer.on_event(&RunEvent::AuditStarted {
                command: request.display_command(),
            });
            self.auditor.run(&request)
        };
        observer.on_event(&RunEvent::AuditFinished {
            outcome: audit.clone(),
        });

        let verdict = Verdict::evaluate(submission.elapsed, &config.threshold);
        observer.on_event(&RunEvent::Decided {
            verdict,
            elapsed_secs,
            threshold_secs: config.threshold.as_secs(),
        });

        Ok(RunReport {
            post_address,
            status: submission.status,
            submit_secs: elapsed_secs,
            threshold_secs: config.threshold.as_secs(),
            target_url: target.to_string(),
            timing,
            audit,
            audit_report: report_path.display().to_string(),
            verdict,
        })
    }
}

// ============================================================================
// SECTION: Constructors
// ============================================================================

/// Builds a submitter honoring the configured timeout.
///
/// # Errors
///
/// Returns [`GateError::Submit`] when the HTTP client cannot be created.
pub fn submitter_for(config: &LoadGateConfig) -> Result<Submitter, GateError> {
    Ok(Submitter::new(SubmitConfig {
        timeout: config.tunables.http_timeout,
        ..SubmitConfig::default()
    })?)
}

/// Builds browser launch options from the configured tunables.
#[must_use]
pub fn browser_options_for(config: &LoadGateConfig) -> BrowserOptions {
    BrowserOptions {
        chrome_path: config.tunables.chrome_path.clone(),
        ..BrowserOptions::default()
    }
}
