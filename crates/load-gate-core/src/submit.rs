// crates/load-gate-core/src/submit.rs
// ============================================================================
// Module: Submitter
// Description: Timed HTTP POST of the payload to the configured endpoint.
// Purpose: Measure the submit round trip and capture the raw response.
// Dependencies: reqwest, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The submitter sends one POST with a fixed header set and measures wall-clock
//! time from just before the request is sent until the response body has been
//! read in full. There are no retries; any transport failure is returned to
//! the caller. Response bodies are read under a hard size limit.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;
use std::time::Instant;

use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::header::ACCEPT;
use reqwest::header::AUTHORIZATION;
use reqwest::header::CACHE_CONTROL;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::COOKIE;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Debug cookie injected into every submit request.
pub const DEBUG_COOKIE: &str = "XDEBUG_SESSION=PHPSTORM";
/// Default maximum response body size, in bytes.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the submitter.
///
/// # Invariants
/// - `timeout = None` waits for the endpoint indefinitely.
/// - `max_response_bytes` is enforced as a hard upper bound on response bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitConfig {
    /// Whole-request timeout.
    pub timeout: Option<Duration>,
    /// Maximum response size allowed, in bytes.
    pub max_response_bytes: usize,
    /// User agent string for the request.
    pub user_agent: String,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            user_agent: concat!("load-gate/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome of one timed submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Time from send to fully-read body.
    pub elapsed: Duration,
    /// HTTP status code.
    pub status: u16,
    /// Final URL after redirects.
    pub url: String,
    /// Response headers in wire order.
    pub headers: Vec<(String, String)>,
    /// Response body, lossily decoded as UTF-8.
    pub body: String,
}

/// Submit failures.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The HTTP client could not be constructed.
    #[error("http client build failed: {0}")]
    Client(String),
    /// The payload could not be encoded.
    #[error("payload encoding failed: {0}")]
    Encode(String),
    /// A header value contains bytes HTTP does not allow.
    #[error("invalid value for {0} header")]
    Header(&'static str),
    /// The request could not be completed.
    #[error("post to {url} failed: {reason}")]
    Request {
        /// Target URL.
        url: String,
        /// Transport error text.
        reason: String,
    },
    /// The response body was larger than the configured limit.
    #[error("response from {url} exceeds size limit of {limit} bytes")]
    TooLarge {
        /// Target URL.
        url: String,
        /// Limit in bytes.
        limit: usize,
    },
    /// The response body could not be read.
    #[error("failed to read response from {url}: {reason}")]
    Read {
        /// Target URL.
        url: String,
        /// I/O error text.
        reason: String,
    },
}

// ============================================================================
// SECTION: Submitter
// ============================================================================

/// Blocking HTTP submitter.
pub struct Submitter {
    /// Submitter configuration.
    config: SubmitConfig,
    /// HTTP client used for the request.
    client: Client,
}

impl Submitter {
    /// Creates a new submitter with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Client`] when the HTTP client cannot be created.
    pub fn new(config: SubmitConfig) -> Result<Self, SubmitError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|err| SubmitError::Client(err.to_string()))?;
        Ok(Self {
            config,
            client,
        })
    }

    /// Posts `payload` to `url` and times the round trip.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError`] when the headers are invalid, the request fails,
    /// or the response body cannot be read within limits.
    pub fn submit(
        &self,
        url: &str,
        payload: &Value,
        authorization: &str,
    ) -> Result<Submission, SubmitError> {
        let body = serde_json::to_vec(payload).map_err(|err| SubmitError::Encode(err.to_string()))?;
        let headers = submit_headers(authorization)?;
        let request = self.client.post(url).headers(headers).body(body);

        let started = Instant::now();
        let mut response = request.send().map_err(|err| SubmitError::Request {
            url: url.to_string(),
            reason: err.to_string(),
        })?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let response_headers = collect_headers(response.headers());
        let raw = read_response_limited(&mut response, url, self.config.max_response_bytes)?;
        let elapsed = started.elapsed();

        Ok(Submission {
            elapsed,
            status,
            url: final_url,
            headers: response_headers,
            body: String::from_utf8_lossy(&raw).into_owned(),
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds the fixed header set sent with every submit.
fn submit_headers(authorization: &str) -> Result<HeaderMap, SubmitError> {
    let mut auth =
        HeaderValue::from_str(authorization).map_err(|_| SubmitError::Header("Authorization"))?;
    auth.set_sensitive(true);
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(AUTHORIZATION, auth);
    headers.insert(COOKIE, HeaderValue::from_static(DEBUG_COOKIE));
    Ok(headers)
}

/// Flattens response headers into printable name/value pairs.
fn collect_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            (name.as_str().to_string(), String::from_utf8_lossy(value.as_bytes()).into_owned())
        })
        .collect()
}

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(
    response: &mut Response,
    url: &str,
    max_bytes: usize,
) -> Result<Vec<u8>, SubmitError> {
    let too_large = || SubmitError::TooLarge {
        url: url.to_string(),
        limit: max_bytes,
    };
    let max_bytes_u64 = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if let Some(expected) = response.content_length()
        && expected > max_bytes_u64
    {
        return Err(too_large());
    }
    let mut buf = Vec::new();
    let mut handle = response.take(max_bytes_u64.saturating_add(1));
    handle.read_to_end(&mut buf).map_err(|err| SubmitError::Read {
        url: url.to_string(),
        reason: err.to_string(),
    })?;
    if buf.len() > max_bytes {
        return Err(too_large());
    }
    Ok(buf)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
