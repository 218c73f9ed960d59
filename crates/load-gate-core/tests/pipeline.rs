// crates/load-gate-core/tests/pipeline.rs
// ============================================================================
// Module: Pipeline Tests
// Description: End-to-end pipeline runs with a stub server and fake stages.
// Purpose: Verify stage ordering, early exits, and the verdict.
// Dependencies: load-gate-config, load-gate-core, proptest, tempfile, tiny_http
// ============================================================================

//! ## Overview
//! The submit stage talks to a real local HTTP stub; the browser and the audit
//! tool are replaced by recording fakes so every run is deterministic.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::thread;
use std::time::Duration;

use load_gate_config::LoadGateConfig;
use load_gate_config::LoadThreshold;
use load_gate_core::AuditOutcome;
use load_gate_core::AuditRequest;
use load_gate_core::AuditRunner;
use load_gate_core::ExtractError;
use load_gate_core::GateError;
use load_gate_core::NavigationTiming;
use load_gate_core::PageProber;
use load_gate_core::Pipeline;
use load_gate_core::PipelineOptions;
use load_gate_core::ProbeError;
use load_gate_core::RunEvent;
use load_gate_core::RunObserver;
use load_gate_core::Verdict;
use load_gate_core::submitter_for;
use proptest::prelude::*;
use reqwest::Url;
use tempfile::TempDir;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Fakes
// ============================================================================

/// Prober that records URLs and returns a fixed result.
struct RecordingProber {
    seen: Vec<String>,
    fail: bool,
}

impl RecordingProber {
    const fn new() -> Self {
        Self {
            seen: Vec::new(),
            fail: false,
        }
    }
}

impl PageProber for RecordingProber {
    fn probe(&mut self, url: &Url) -> Result<NavigationTiming, ProbeError> {
        self.seen.push(url.to_string());
        if self.fail {
            return Err(ProbeError::Launch("no browser here".to_string()));
        }
        Ok(NavigationTiming {
            navigation_start: 1000.0,
            response_start: 1250.0,
            dom_complete: 1900.0,
        })
    }
}

/// Auditor that records requests and returns a fixed outcome.
struct RecordingAuditor {
    seen: Vec<AuditRequest>,
    outcome: AuditOutcome,
}

impl RecordingAuditor {
    const fn new(outcome: AuditOutcome) -> Self {
        Self {
            seen: Vec::new(),
            outcome,
        }
    }
}

impl AuditRunner for RecordingAuditor {
    fn run(&mut self, request: &AuditRequest) -> AuditOutcome {
        self.seen.push(request.clone());
        self.outcome.clone()
    }
}

/// Observer that keeps every event.
#[derive(Default)]
struct EventLog(Vec<RunEvent>);

impl RunObserver for EventLog {
    fn on_event(&mut self, event: &RunEvent) {
        self.0.push(event.clone());
    }
}

impl EventLog {
    fn names(&self) -> Vec<String> {
        self.0
            .iter()
            .map(|event| {
                serde_json::to_value(event).unwrap()["event"].as_str().unwrap().to_string()
            })
            .collect()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Serves one request with `body` and returns the base address.
fn stub(body: &'static str) -> (String, thread::JoinHandle<()>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let handle = thread::spawn(move || {
        if let Ok(request) = server.recv() {
            let _ = request.respond(Response::from_string(body));
        }
    });
    (format!("http://{addr}"), handle)
}

/// Writes a payload under a fresh root and loads a config pointing at `host`.
fn config_for(host: &str, threshold: &str) -> (TempDir, LoadGateConfig) {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("payload.json"), br#"{"sku":"A-1"}"#).unwrap();
    let env = BTreeMap::from([
        ("CI_ROOT", root.path().display().to_string()),
        ("LOADTIME_THRESHOLD", threshold.to_string()),
        ("AUTH_HEADER", "Bearer test".to_string()),
        ("PAYLOAD_PATH", "payload.json".to_string()),
        ("HOST_ADDRESS", host.to_string()),
        ("POST_URL", "api/cart".to_string()),
    ]);
    let config = LoadGateConfig::from_lookup(|name| env.get(name).map(OsString::from)).unwrap();
    (root, config)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn fast_response_passes_and_visits_target_once() {
    let (host, handle) = stub(r#"{"cartUri":"http://test/page"}"#);
    let (root, config) = config_for(&host, "5");
    let submitter = submitter_for(&config).unwrap();
    let mut prober = RecordingProber::new();
    let mut auditor = RecordingAuditor::new(AuditOutcome::Succeeded);
    let mut events = EventLog::default();

    let report = Pipeline::new(config, submitter, &mut prober, &mut auditor)
        .run(&mut events)
        .unwrap();
    handle.join().unwrap();

    assert_eq!(report.verdict, Verdict::Pass);
    assert_eq!(report.verdict.exit_code(), 0);
    assert_eq!(report.target_url, "http://test/page");
    assert_eq!(prober.seen, vec!["http://test/page".to_string()]);
    assert_eq!(auditor.seen.len(), 1);
    assert_eq!(auditor.seen[0].url.as_str(), "http://test/page");
    assert_eq!(auditor.seen[0].output_path, root.path().join("lighthouse-reports.csv"));
    let timing = report.timing.unwrap();
    assert!((timing.backend_ms - 250.0).abs() < f64::EPSILON);
    assert!((timing.frontend_ms - 650.0).abs() < f64::EPSILON);
    assert_eq!(
        events.names(),
        vec![
            "started",
            "payload_loaded",
            "submitted",
            "target_resolved",
            "probed",
            "audit_started",
            "audit_finished",
            "decided",
        ]
    );
}

#[test]
fn zero_threshold_fails_without_error() {
    let (host, handle) = stub(r#"{"cartUri":"http://test/page"}"#);
    let (_root, config) = config_for(&host, "0");
    let submitter = submitter_for(&config).unwrap();
    let report = Pipeline::new(
        config,
        submitter,
        RecordingProber::new(),
        RecordingAuditor::new(AuditOutcome::Succeeded),
    )
    .run(&mut EventLog::default())
    .unwrap();
    handle.join().unwrap();
    assert_eq!(report.verdict, Verdict::Fail);
    assert_eq!(report.verdict.exit_code(), 1);
}

#[test]
fn missing_cart_uri_stops_before_browser() {
    let (host, handle) = stub(r#"{"other":"x"}"#);
    let (_root, config) = config_for(&host, "5");
    let submitter = submitter_for(&config).unwrap();
    let mut prober = RecordingProber::new();
    let mut auditor = RecordingAuditor::new(AuditOutcome::Succeeded);

    let err = Pipeline::new(config, submitter, &mut prober, &mut auditor)
        .run(&mut EventLog::default())
        .unwrap_err();
    handle.join().unwrap();

    assert!(matches!(err, GateError::ResponseMalformed(ExtractError::Missing(_))), "{err:?}");
    assert_eq!(err.exit_code(), 1);
    assert!(prober.seen.is_empty());
    assert!(auditor.seen.is_empty());
}

#[test]
fn unreadable_payload_reports_root() {
    let (root, config) = config_for("http://127.0.0.1:9", "5");
    fs::remove_file(root.path().join("payload.json")).unwrap();
    let submitter = submitter_for(&config).unwrap();
    let err = Pipeline::new(
        config,
        submitter,
        RecordingProber::new(),
        RecordingAuditor::new(AuditOutcome::Succeeded),
    )
    .run(&mut EventLog::default())
    .unwrap_err();
    match err {
        GateError::PayloadUnreadable {
            root: reported,
            source,
        } => {
            assert_eq!(reported, root.path());
            assert_eq!(source.path(), root.path().join("payload.json"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn browser_failure_is_fatal_and_skips_audit() {
    let (host, handle) = stub(r#"{"cartUri":"https://shop.example.com/cart/1"}"#);
    let (_root, config) = config_for(&host, "5");
    let submitter = submitter_for(&config).unwrap();
    let mut prober = RecordingProber::new();
    prober.fail = true;
    let mut auditor = RecordingAuditor::new(AuditOutcome::Succeeded);

    let err = Pipeline::new(config, submitter, &mut prober, &mut auditor)
        .run(&mut EventLog::default())
        .unwrap_err();
    handle.join().unwrap();

    assert!(matches!(err, GateError::Probe(ProbeError::Launch(_))), "{err:?}");
    assert!(auditor.seen.is_empty());
}

#[test]
fn audit_failure_does_not_change_verdict() {
    let (host, handle) = stub(r#"{"cartUri":"http://test/page"}"#);
    let (_root, config) = config_for(&host, "5");
    let submitter = submitter_for(&config).unwrap();
    let report = Pipeline::new(
        config,
        submitter,
        RecordingProber::new(),
        RecordingAuditor::new(AuditOutcome::Unavailable {
            reason: "not installed".to_string(),
        }),
    )
    .run(&mut EventLog::default())
    .unwrap();
    handle.join().unwrap();
    assert_eq!(report.verdict, Verdict::Pass);
    assert!(matches!(report.audit, AuditOutcome::Unavailable { .. }));
}

#[test]
fn skipped_stages_are_not_invoked() {
    let (host, handle) = stub(r#"{"cartUri":"http://test/page"}"#);
    let (_root, config) = config_for(&host, "5");
    let submitter = submitter_for(&config).unwrap();
    let mut prober = RecordingProber::new();
    let mut auditor = RecordingAuditor::new(AuditOutcome::Succeeded);
    let mut events = EventLog::default();

    let report = Pipeline::new(config, submitter, &mut prober, &mut auditor)
        .with_options(PipelineOptions {
            print_payload: true,
            skip_browser: true,
            skip_audit: true,
            ..PipelineOptions::default()
        })
        .run(&mut events)
        .unwrap();
    handle.join().unwrap();

    assert!(prober.seen.is_empty());
    assert!(auditor.seen.is_empty());
    assert_eq!(report.timing, None);
    assert_eq!(report.audit, AuditOutcome::Skipped);
    assert!(events.0.iter().any(|event| matches!(
        event,
        RunEvent::PayloadLoaded { rendered: Some(text), .. } if text.contains("\"sku\": \"A-1\"")
    )));
    assert!(events.names().contains(&"probe_skipped".to_string()));
    assert!(!events.names().contains(&"audit_started".to_string()));
}

// ============================================================================
// SECTION: Properties
// ============================================================================

proptest! {
    #[test]
    fn verdict_is_strict_less_than(elapsed_ms in 0_u64..20_000, threshold_secs in 0_u64..20) {
        let verdict = Verdict::evaluate(
            Duration::from_millis(elapsed_ms),
            &LoadThreshold::from_secs(threshold_secs),
        );
        let expected = if elapsed_ms < threshold_secs * 1000 { Verdict::Pass } else { Verdict::Fail };
        prop_assert_eq!(verdict, expected);
    }
}
