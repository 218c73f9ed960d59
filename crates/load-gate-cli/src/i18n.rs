// crates/load-gate-cli/src/i18n.rs
// ============================================================================
// Module: CLI Message Catalog
// Description: Message catalog and translation helpers for CLI output.
// Purpose: Keep every user-facing string in one place with named placeholders.
// Dependencies: Standard library collections.
// ============================================================================

//! ## Overview
//! Every line the `load-gate` binary prints is looked up here by key and
//! rendered through the [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to the key itself.
//! - Placeholders are substituted in one pass; argument values are never
//!   re-scanned for placeholders.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A formatted message argument captured by the [`macro@crate::t`] macro.
///
/// # Invariants
/// - `key` matches a placeholder name without braces (for example, `path`).
/// - `value` is preformatted and should be safe for display.
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates (e.g., `"path"`).
    pub key: &'static str,
    /// The formatted string value to substitute for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// English catalog entries.
const CATALOG_EN: &[(&str, &str)] = &[
    ("main.version", "load-gate {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("run.started", "Submitting payload to {address} (threshold {threshold} seconds)"),
    ("run.payload.loaded", "Loaded payload from {path}"),
    ("run.payload.rendered", "Payload:\n{payload}"),
    ("run.submit.url", "Response URL: {url}"),
    ("run.submit.status", "Response status: {status}"),
    ("run.submit.header", "Response header: {name}: {value}"),
    ("run.submit.body", "Response body: {body}"),
    ("run.submit.elapsed", "Your load time is {seconds} seconds"),
    ("run.target", "Target page: {url}"),
    ("run.probe.backend", "Back end: {ms} ms"),
    ("run.probe.frontend", "Front end: {ms} ms"),
    ("run.probe.skipped", "Browser timing skipped"),
    ("run.audit.started", "Running audit: {command}"),
    ("run.audit.succeeded", "Audit finished"),
    ("run.audit.failed", "Warning: audit exited with status {code}; continuing"),
    ("run.audit.killed", "Warning: audit was terminated by a signal; continuing"),
    ("run.audit.unavailable", "Warning: audit tool could not be started ({reason}); continuing"),
    ("run.audit.skipped", "Audit skipped"),
    ("run.verdict.pass", "PASS: load time {seconds}s is under the {threshold}s threshold"),
    ("run.verdict.fail", "FAIL: load time {seconds}s is not under the {threshold}s threshold"),
    ("run.report.written", "Run report written to {path}"),
    ("run.report.write_failed", "Failed to write run report {path}: {error}"),
    ("run.event_log.open_failed", "Failed to open event log {path}: {error}"),
    ("run.event_log.write_failed", "Event log {path} is incomplete: {error}"),
    ("error.config", "Configuration error: {error}"),
    (
        "error.config.required",
        "Required environment variables: CI_ROOT, LOADTIME_THRESHOLD, AUTH_HEADER, PAYLOAD_PATH, \
         HOST_ADDRESS, POST_URL",
    ),
    ("error.payload", "Unable to load payload: {error}"),
    ("error.payload.attempted", "  attempted path: {path}"),
    ("error.payload.cwd", "  working directory: {cwd}"),
    ("error.payload.root", "  project root: {root}"),
    ("error.submit", "Submit request failed: {error}"),
    ("error.response", "Response does not contain a usable page URL: {error}"),
    ("error.probe", "Browser stage failed: {error}"),
    ("error.cwd_unknown", "<unknown>"),
    ("smoke.url_missing", "No page to check: pass --url or set {env}"),
    ("smoke.url_invalid", "Invalid page URL: {error}"),
    ("smoke.started", "Checking {url} for class '{class}'"),
    ("smoke.passed", "Smoke check passed"),
    ("smoke.failed", "Smoke check failed: {error}"),
];

/// Returns the message catalog.
pub(crate) fn catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG_EN_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    CATALOG_EN_MAP.get_or_init(|| CATALOG_EN.iter().copied().collect())
}

/// Returns the raw catalog entries in declaration order.
#[cfg(test)]
pub(crate) const fn catalog_entries() -> &'static [(&'static str, &'static str)] {
    CATALOG_EN
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Looks up `key` and substitutes `args` into its placeholders.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        result.push_str(&rest[.. open]);
        let after = &rest[open + 1 ..];
        let value = after.find('}').and_then(|close| {
            let name = &after[.. close];
            args.iter().find(|arg| arg.key == name).map(|arg| (arg.value.as_str(), close))
        });
        match value {
            Some((value, close)) => {
                result.push_str(value);
                rest = &after[close + 1 ..];
            }
            None => {
                result.push('{');
                rest = after;
            }
        }
    }
    result.push_str(rest);
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a catalog message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
