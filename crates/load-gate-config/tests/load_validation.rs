// crates/load-gate-config/tests/load_validation.rs
// ============================================================================
// Module: Config Load Validation Tests
// Description: Lookup-driven tests for required and optional settings.
// Purpose: Ensure loading is fail-closed and passes values through unmodified.
// Dependencies: load-gate-config, proptest
// ============================================================================

//! ## Overview
//! Drives [`LoadGateConfig::from_lookup`] with in-memory environments so the
//! tests never touch the process environment.

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
use std::path::PathBuf;
use std::time::Duration;

use load_gate_config::ConfigError;
use load_gate_config::DEFAULT_AUDIT_BIN;
use load_gate_config::DEFAULT_REPORT_NAME;
use load_gate_config::DEFAULT_URL_PATH;
use load_gate_config::LoadGateConfig;
use load_gate_config::RequiredEnv;
use proptest::prelude::*;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn base_env() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("CI_ROOT".to_string(), "/builds/project".to_string()),
        ("LOADTIME_THRESHOLD".to_string(), "5".to_string()),
        ("AUTH_HEADER".to_string(), "Bearer token".to_string()),
        ("PAYLOAD_PATH".to_string(), "payloads/cart.json".to_string()),
        ("HOST_ADDRESS".to_string(), "https://shop.example.com".to_string()),
        ("POST_URL".to_string(), "api/v1/cart".to_string()),
    ])
}

fn load(env: &BTreeMap<String, String>) -> Result<LoadGateConfig, ConfigError> {
    LoadGateConfig::from_lookup(|name| env.get(name).map(OsString::from))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn complete_environment_loads_with_defaults() {
    let config = load(&base_env()).unwrap();
    assert_eq!(config.ci_root, PathBuf::from("/builds/project"));
    assert_eq!(config.threshold.as_secs(), 5);
    assert_eq!(config.auth_header, "Bearer token");
    assert_eq!(config.payload_path, PathBuf::from("payloads/cart.json"));
    assert_eq!(config.host_address, "https://shop.example.com");
    assert_eq!(config.post_url, "api/v1/cart");
    assert_eq!(config.tunables.url_path, DEFAULT_URL_PATH);
    assert_eq!(config.tunables.audit_bin, DEFAULT_AUDIT_BIN);
    assert_eq!(config.tunables.report_name, DEFAULT_REPORT_NAME);
    assert_eq!(config.tunables.http_timeout, None);
    assert_eq!(config.tunables.chrome_path, None);
}

#[test]
fn post_address_joins_host_and_path_with_slash() {
    let config = load(&base_env()).unwrap();
    assert_eq!(config.post_address(), "https://shop.example.com/api/v1/cart");
}

#[test]
fn report_path_lives_under_ci_root() {
    let config = load(&base_env()).unwrap();
    assert_eq!(config.report_path(), PathBuf::from("/builds/project/lighthouse-reports.csv"));
}

#[test]
fn each_missing_variable_is_named() {
    for key in RequiredEnv::ALL {
        let mut env = base_env();
        env.remove(key.as_str());
        match load(&env) {
            Err(ConfigError::Missing(names)) => assert_eq!(names, vec![key.as_str()]),
            other => panic!("expected missing {}, got {other:?}", key.as_str()),
        }
    }
}

#[test]
fn empty_environment_names_all_six() {
    let err = load(&BTreeMap::new()).unwrap_err();
    let ConfigError::Missing(names) = &err else {
        panic!("expected missing error, got {err:?}");
    };
    assert_eq!(names.len(), 6);
    let message = err.to_string();
    for key in RequiredEnv::ALL {
        assert!(message.contains(key.as_str()), "message lacks {}: {message}", key.as_str());
    }
}

#[test]
fn missing_names_follow_reporting_order() {
    assert_eq!(
        RequiredEnv::names(),
        vec!["CI_ROOT", "LOADTIME_THRESHOLD", "AUTH_HEADER", "PAYLOAD_PATH", "HOST_ADDRESS", "POST_URL"]
    );
    assert_eq!(load(&BTreeMap::new()).unwrap_err(), ConfigError::Missing(RequiredEnv::names()));
}

#[test]
fn blank_values_count_as_missing() {
    let mut env = base_env();
    env.insert("AUTH_HEADER".to_string(), "   ".to_string());
    assert_eq!(load(&env).unwrap_err(), ConfigError::Missing(vec!["AUTH_HEADER"]));
}

#[test]
fn non_integer_threshold_is_invalid() {
    let mut env = base_env();
    env.insert("LOADTIME_THRESHOLD".to_string(), "5s".to_string());
    let err = load(&env).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { name: "LOADTIME_THRESHOLD", .. }), "{err:?}");
}

#[test]
fn absolute_payload_path_is_invalid() {
    let mut env = base_env();
    env.insert("PAYLOAD_PATH".to_string(), "/etc/passwd".to_string());
    let err = load(&env).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { name: "PAYLOAD_PATH", .. }), "{err:?}");
}

#[test]
fn optional_tunables_override_defaults() {
    let mut env = base_env();
    env.insert("LOAD_GATE_URL_PATH".to_string(), "$.data.checkoutUrl".to_string());
    env.insert("LOAD_GATE_CHROME_PATH".to_string(), "/usr/bin/chromium".to_string());
    env.insert("LOAD_GATE_HTTP_TIMEOUT_SEC".to_string(), "45".to_string());
    env.insert("LOAD_GATE_REPORT_NAME".to_string(), "audit.csv".to_string());
    let config = load(&env).unwrap();
    assert_eq!(config.tunables.url_path, "$.data.checkoutUrl");
    assert_eq!(config.tunables.chrome_path, Some(PathBuf::from("/usr/bin/chromium")));
    assert_eq!(config.tunables.http_timeout, Some(Duration::from_secs(45)));
    assert_eq!(config.report_path(), PathBuf::from("/builds/project/audit.csv"));
}

#[test]
fn invalid_optional_values_fail_closed() {
    let cases = [
        ("LOAD_GATE_HTTP_TIMEOUT_SEC", "0"),
        ("LOAD_GATE_HTTP_TIMEOUT_SEC", "soon"),
        ("LOAD_GATE_AUDIT_BIN", ""),
        ("LOAD_GATE_REPORT_NAME", "../escape.csv"),
        ("LOAD_GATE_REPORT_NAME", "nested/report.csv"),
    ];
    for (name, value) in cases {
        let mut env = base_env();
        env.insert(name.to_string(), value.to_string());
        let err = load(&env).unwrap_err();
        assert!(
            matches!(&err, ConfigError::Invalid { name: found, .. } if *found == name),
            "{name}={value:?} gave {err:?}"
        );
    }
}

#[cfg(unix)]
#[test]
fn non_utf8_value_is_invalid() {
    use std::os::unix::ffi::OsStringExt;

    let env = base_env();
    let err = LoadGateConfig::from_lookup(|name| {
        if name == "AUTH_HEADER" {
            return Some(OsString::from_vec(vec![0x66, 0x6f, 0x80]));
        }
        env.get(name).map(OsString::from)
    })
    .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { name: "AUTH_HEADER", .. }), "{err:?}");
}

proptest! {
    #[test]
    fn valid_settings_pass_through_unmodified(
        root in "/[a-z]{1,12}",
        threshold in 0u32..10_000,
        auth in "[A-Za-z0-9 =+/]{0,24}[A-Za-z0-9]",
        payload in "[a-z]{1,8}/[a-z]{1,8}\\.json",
        host in "https?://[a-z]{1,12}\\.example",
        path in "[a-z0-9/_-]{1,20}",
    ) {
        let env = BTreeMap::from([
            ("CI_ROOT".to_string(), root.clone()),
            ("LOADTIME_THRESHOLD".to_string(), threshold.to_string()),
            ("AUTH_HEADER".to_string(), auth.clone()),
            ("PAYLOAD_PATH".to_string(), payload.clone()),
            ("HOST_ADDRESS".to_string(), host.clone()),
            ("POST_URL".to_string(), path.clone()),
        ]);
        let config = load(&env).unwrap();
        prop_assert_eq!(config.ci_root, PathBuf::from(root));
        prop_assert_eq!(config.threshold.raw(), threshold.to_string());
        prop_assert_eq!(config.threshold.as_secs(), u64::from(threshold));
        prop_assert_eq!(config.auth_header, auth);
        prop_assert_eq!(config.payload_path, PathBuf::from(payload));
        prop_assert_eq!(config.host_address, host);
        prop_assert_eq!(config.post_url, path);
    }
}
