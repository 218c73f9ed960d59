// crates/load-gate-core/src/lib.rs
// ============================================================================
// Module: Load Gate Core
// Description: Stages of the load-gate run and the linear pipeline tying them.
// Purpose: Submit a payload, probe the returned page, audit it, and decide.
// Dependencies: headless_chrome, jsonpath_lib, load-gate-config, reqwest, serde
// ============================================================================

//! ## Overview
//! A load-gate run is a single linear pass: load the payload, POST it and time
//! the round trip, pull the target URL out of the response, read navigation
//! timing for that URL in a headless browser, run the external audit tool, and
//! compare the submit time with the configured threshold.
//!
//! Each stage is a plain function or a small type with its own error enum.
//! The browser and the audit tool sit behind [`PageProber`] and
//! [`AuditRunner`] so the [`Pipeline`] can be driven without either.
//! Invariants:
//! - The process working directory is never changed.
//! - External tools are invoked with structured argument lists, never a shell.
//! - Browser sessions are released on every exit path.
//!
//! Security posture: the response body and the URL it carries are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod events;
pub mod extract;
pub mod payload;
pub mod pipeline;
pub mod probe;
pub mod report;
pub mod smoke;
pub mod submit;
pub mod verdict;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditOutcome;
pub use audit::AuditRequest;
pub use audit::AuditRunner;
pub use audit::LighthouseRunner;
pub use events::CompositeObserver;
pub use events::JsonLinesObserver;
pub use events::NullObserver;
pub use events::RunEvent;
pub use events::RunObserver;
pub use extract::ExtractError;
pub use extract::extract_target_url;
pub use extract::validate_target_url;
pub use payload::PayloadError;
pub use payload::load_payload;
pub use pipeline::GateError;
pub use pipeline::Pipeline;
pub use pipeline::PipelineOptions;
pub use pipeline::browser_options_for;
pub use pipeline::submitter_for;
pub use probe::BrowserOptions;
pub use probe::BrowserSession;
pub use probe::ChromeProber;
pub use probe::NavigationTiming;
pub use probe::PageProber;
pub use probe::ProbeError;
pub use probe::TimingSplit;
pub use report::RunReport;
pub use smoke::SmokeCheck;
pub use smoke::run_smoke_check;
pub use submit::Submission;
pub use submit::SubmitConfig;
pub use submit::SubmitError;
pub use submit::Submitter;
pub use verdict::Verdict;
