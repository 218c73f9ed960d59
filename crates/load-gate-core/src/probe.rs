// crates/load-gate-core/src/probe.rs
// ============================================================================
// Module: Browser Prober
// Description: Headless-browser navigation timing for the target page.
// Purpose: Split page load into backend and frontend durations.
// Dependencies: headless_chrome, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`ChromeProber`] launches a headless Chrome, opens the target URL, and reads
//! `navigationStart`, `responseStart` and `domComplete` from the page's
//! navigation-timing API in a single script evaluation. The browser lives in a
//! [`BrowserSession`] that closes its tab and shuts the browser down when it is
//! dropped, so every exit path (including errors mid-navigation) releases it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use headless_chrome::Browser;
use headless_chrome::LaunchOptions;
use headless_chrome::LaunchOptionsBuilder;
use headless_chrome::Tab;
use reqwest::Url;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Script returning the three navigation-timing marks as a JSON string.
const NAVIGATION_TIMING_SCRIPT: &str = r"
(() => {
    const timing = window.performance.timing;
    return JSON.stringify({
        navigationStart: timing.navigationStart,
        responseStart: timing.responseStart,
        domComplete: timing.domComplete
    });
})()
";

/// Idle timeout applied to the browser connection.
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

// ============================================================================
// SECTION: Types
// ============================================================================

/// Raw navigation-timing marks, in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationTiming {
    /// Start of navigation.
    pub navigation_start: f64,
    /// First byte of the response.
    pub response_start: f64,
    /// Document fully parsed and sub-resources loaded.
    pub dom_complete: f64,
}

/// Backend/frontend split derived from [`NavigationTiming`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimingSplit {
    /// `responseStart - navigationStart`, in milliseconds.
    pub backend_ms: f64,
    /// `domComplete - responseStart`, in milliseconds.
    pub frontend_ms: f64,
}

impl NavigationTiming {
    /// Computes the backend and frontend durations.
    #[must_use]
    pub fn split(&self) -> TimingSplit {
        TimingSplit {
            backend_ms: self.response_start - self.navigation_start,
            frontend_ms: self.dom_complete - self.response_start,
        }
    }
}

/// Browser failures. All of them end the run.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Launch options were rejected or the browser did not start.
    #[error("failed to launch headless browser: {0}")]
    Launch(String),
    /// Navigation did not complete.
    #[error("failed to navigate to {url}: {reason}")]
    Navigate {
        /// Target URL.
        url: String,
        /// Browser error text.
        reason: String,
    },
    /// Script evaluation failed or returned an unusable value.
    #[error("failed to read navigation timing: {0}")]
    Timing(String),
    /// The requested element never appeared.
    #[error("no element matching {selector} on {url}: {reason}")]
    ElementMissing {
        /// CSS selector.
        selector: String,
        /// Page URL.
        url: String,
        /// Browser error text.
        reason: String,
    },
    /// A class name could not be turned into a selector.
    #[error("invalid class name {0:?}")]
    InvalidClass(String),
}

// ============================================================================
// SECTION: Prober Trait
// ============================================================================

/// Reads navigation timing for a page.
pub trait PageProber {
    /// Loads `url` and returns its navigation-timing marks.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError`] when the browser cannot load the page or the
    /// timing marks cannot be read.
    fn probe(&mut self, url: &Url) -> Result<NavigationTiming, ProbeError>;
}

impl<T: PageProber + ?Sized> PageProber for &mut T {
    fn probe(&mut self, url: &Url) -> Result<NavigationTiming, ProbeError> {
        (**self).probe(url)
    }
}

// ============================================================================
// SECTION: Browser Session
// ============================================================================

/// Launch settings for the headless browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserOptions {
    /// Explicit browser binary; `None` lets the launcher search.
    pub chrome_path: Option<PathBuf>,
    /// Pass `--disable-gpu` to the browser.
    pub disable_gpu: bool,
    /// Idle timeout for the DevTools connection.
    pub idle_timeout: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            chrome_path: None,
            disable_gpu: false,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

/// A running headless browser with one open tab.
///
/// # Invariants
/// - Dropping the session closes the tab, then the browser process exits when
///   the [`Browser`] handle is dropped.
pub struct BrowserSession {
    /// Open tab used for navigation.
    tab: Arc<Tab>,
    /// Browser process handle; dropped after `tab`.
    _browser: Browser,
}

impl BrowserSession {
    /// Launches a headless browser (no sandbox) and opens a tab.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Launch`] when the browser cannot be started.
    pub fn launch(options: &BrowserOptions) -> Result<Self, ProbeError> {
        let launch_options = build_launch_options(options)?;
        let browser =
            Browser::new(launch_options).map_err(|err| ProbeError::Launch(err.to_string()))?;
        let tab = browser.new_tab().map_err(|err| ProbeError::Launch(err.to_string()))?;
        Ok(Self {
            tab,
            _browser: browser,
        })
    }

    /// Navigates to `url` and waits for the load to finish.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Navigate`] when navigation fails.
    pub fn open(&self, url: &Url) -> Result<(), ProbeError> {
        let navigate = |err: &dyn std::fmt::Display| ProbeError::Navigate {
            url: url.to_string(),
            reason: err.to_string(),
        };
        self.tab.navigate_to(url.as_str()).map_err(|err| navigate(&err))?;
        self.tab.wait_until_navigated().map_err(|err| navigate(&err))?;
        Ok(())
    }

    /// Reads the navigation-timing marks of the current page.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Timing`] when evaluation fails or the result does
    /// not contain the three marks.
    pub fn navigation_timing(&self) -> Result<NavigationTiming, ProbeError> {
        let remote = self
            .tab
            .evaluate(NAVIGATION_TIMING_SCRIPT, false)
            .map_err(|err| ProbeError::Timing(err.to_string()))?;
        let value = remote
            .value
            .ok_or_else(|| ProbeError::Timing("timing script returned no value".to_string()))?;
        parse_timing_value(value)
    }

    /// Waits up to `timeout` for an element matching `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::ElementMissing`] when no element appears in time.
    pub fn wait_for_selector(
        &self,
        url: &Url,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), ProbeError> {
        self.tab.wait_for_element_with_custom_timeout(selector, timeout).map_err(|err| {
            ProbeError::ElementMissing {
                selector: selector.to_string(),
                url: url.to_string(),
                reason: err.to_string(),
            }
        })?;
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        let _ = self.tab.close(false);
    }
}

// ============================================================================
// SECTION: Chrome Prober
// ============================================================================

/// [`PageProber`] backed by a fresh headless Chrome per probe.
pub struct ChromeProber {
    /// Launch settings.
    options: BrowserOptions,
}

impl ChromeProber {
    /// Creates a prober with the given launch settings.
    #[must_use]
    pub const fn new(options: BrowserOptions) -> Self {
        Self {
            options,
        }
    }
}

impl PageProber for ChromeProber {
    fn probe(&mut self, url: &Url) -> Result<NavigationTiming, ProbeError> {
        let session = BrowserSession::launch(&self.options)?;
        session.open(url)?;
        session.navigation_timing()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds headless, sandbox-free launch options.
fn build_launch_options(options: &BrowserOptions) -> Result<LaunchOptions<'static>, ProbeError> {
    let mut args = Vec::new();
    if options.disable_gpu {
        args.push(OsStr::new("--disable-gpu"));
    }
    let mut builder = LaunchOptionsBuilder::default();
    builder
        .headless(true)
        .sandbox(false)
        .idle_browser_timeout(options.idle_timeout)
        .path(options.chrome_path.clone())
        .args(args);
    builder.build().map_err(|err| ProbeError::Launch(err.to_string()))
}

/// Decodes the timing script result, accepting a JSON string or an object.
fn parse_timing_value(value: Value) -> Result<NavigationTiming, ProbeError> {
    let decoded = match value {
        Value::String(text) => serde_json::from_str(&text),
        other => serde_json::from_value(other),
    };
    decoded.map_err(|err| ProbeError::Timing(err.to_string()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
