// crates/load-gate-core/src/smoke.rs
// ============================================================================
// Module: Page Smoke Check
// Description: Loads a page and asserts an element with a CSS class exists.
// Purpose: Quick post-deploy check that a page renders its expected markup.
// Dependencies: headless_chrome (via probe), reqwest (Url)
// ============================================================================

//! ## Overview
//! A smoke check opens one URL in a headless browser and waits a bounded time
//! for an element carrying the given class (by default `title`).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use reqwest::Url;

use crate::probe::BrowserOptions;
use crate::probe::BrowserSession;
use crate::probe::ProbeError;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default class the smoke check looks for.
pub const DEFAULT_SMOKE_CLASS: &str = "title";
/// Default wait for the element to appear.
pub const DEFAULT_SMOKE_WAIT: Duration = Duration::from_secs(10);

// ============================================================================
// SECTION: Types
// ============================================================================

/// One smoke-check request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmokeCheck {
    /// Page to load.
    pub url: Url,
    /// Class name the page must contain.
    pub class_name: String,
    /// How long to wait for the element.
    pub wait: Duration,
}

// ============================================================================
// SECTION: Check
// ============================================================================

/// Runs a smoke check in a fresh browser session.
///
/// # Errors
///
/// Returns [`ProbeError`] when the class name is invalid, the browser cannot
/// load the page, or no matching element appears within the wait.
pub fn run_smoke_check(options: &BrowserOptions, check: &SmokeCheck) -> Result<(), ProbeError> {
    let selector = class_selector(&check.class_name)?;
    let session = BrowserSession::launch(options)?;
    session.open(&check.url)?;
    session.wait_for_selector(&check.url, &selector, check.wait)
}

/// Builds a `.class` selector after checking the name is a plain CSS identifier.
///
/// # Errors
///
/// Returns [`ProbeError::InvalidClass`] for names that would need escaping.
pub fn class_selector(class_name: &str) -> Result<String, ProbeError> {
    let mut chars = class_name.chars();
    let valid_start = match chars.next() {
        Some('-') => chars.clone().next().is_some_and(|ch| ch.is_ascii_alphabetic() || ch == '_'),
        Some(ch) => ch.is_ascii_alphabetic() || ch == '_',
        None => false,
    };
    let valid_rest = chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
    if !valid_start || !valid_rest {
        return Err(ProbeError::InvalidClass(class_name.to_string()));
    }
    Ok(format!(".{class_name}"))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
