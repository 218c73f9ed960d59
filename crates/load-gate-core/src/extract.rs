// crates/load-gate-core/src/extract.rs
// ============================================================================
// Module: Response Extractor
// Description: Pulls the target page URL out of the submit response body.
// Purpose: Turn an untrusted response into a validated absolute URL.
// Dependencies: jsonpath_lib, reqwest (Url), serde_json, thiserror
// ============================================================================

//! ## Overview
//! The response body must be JSON and the configured `JSONPath` (by default
//! `$.cartUri`) must select exactly one string. That string is then parsed as
//! an absolute `http`/`https` URL without embedded credentials, since it is
//! handed to a browser and an external tool afterwards.

// ============================================================================
// SECTION: Imports
// ============================================================================

use jsonpath_lib::select;
use reqwest::Url;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Response extraction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The body is not JSON.
    #[error("response body is not valid JSON: {0}")]
    NotJson(String),
    /// The configured path is not a valid `JSONPath` expression.
    #[error("invalid JSONPath expression {0:?}")]
    InvalidPath(String),
    /// Nothing matched the path.
    #[error("response has no value at {0}")]
    Missing(String),
    /// More than one value matched the path.
    #[error("response has {count} values at {path}, expected one")]
    Ambiguous {
        /// `JSONPath` expression.
        path: String,
        /// Number of matches.
        count: usize,
    },
    /// The matched value is not a string.
    #[error("value at {0} is not a string")]
    NotString(String),
    /// The string is not an acceptable target URL.
    #[error("target url {url:?} is invalid: {reason}")]
    InvalidUrl {
        /// Raw URL text.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
}

// ============================================================================
// SECTION: Extraction
// ============================================================================

/// Extracts and validates the target URL from a JSON response body.
///
/// # Errors
///
/// Returns [`ExtractError`] when the body is not JSON, the path does not
/// select exactly one string, or the string is not an acceptable URL.
pub fn extract_target_url(body: &str, path: &str) -> Result<Url, ExtractError> {
    let document: Value =
        serde_json::from_str(body).map_err(|err| ExtractError::NotJson(err.to_string()))?;
    let matches =
        select(&document, path).map_err(|_| ExtractError::InvalidPath(path.to_string()))?;
    let value = match matches.as_slice() {
        [] => return Err(ExtractError::Missing(path.to_string())),
        [value] => *value,
        many => {
            return Err(ExtractError::Ambiguous {
                path: path.to_string(),
                count: many.len(),
            });
        }
    };
    let Value::String(raw) = value else {
        return Err(ExtractError::NotString(path.to_string()));
    };
    validate_target_url(raw)
}

/// Parses `raw` as an absolute `http`/`https` URL without credentials.
///
/// # Errors
///
/// Returns [`ExtractError::InvalidUrl`] when the URL is malformed, uses
/// another scheme, lacks a host, or embeds credentials.
pub fn validate_target_url(raw: &str) -> Result<Url, ExtractError> {
    let invalid = |reason: &str| ExtractError::InvalidUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };
    let url = Url::parse(raw.trim()).map_err(|err| invalid(&err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("host required"));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(invalid("embedded credentials are not allowed"));
    }
    Ok(url)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
