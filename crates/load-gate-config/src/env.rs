// crates/load-gate-config/src/env.rs
// ============================================================================
// Module: Load Gate Environment
// Description: Environment-backed configuration for a load-gate run.
// Purpose: Centralize env parsing with strict UTF-8 and presence validation.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Six variables are required and five are optional tunables. Values are read
//! through a lookup function so callers (and tests) can supply something other
//! than the live process environment. Invalid UTF-8 fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ffi::OsString;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::threshold::LoadThreshold;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default `JSONPath` selecting the target URL from the submit response.
pub const DEFAULT_URL_PATH: &str = "$.cartUri";
/// Default audit executable.
pub const DEFAULT_AUDIT_BIN: &str = "lighthouse";
/// Default audit report file name, created under `CI_ROOT`.
pub const DEFAULT_REPORT_NAME: &str = "lighthouse-reports.csv";

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys that must be present and non-blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredEnv {
    /// Project root used to resolve the payload and the audit report.
    CiRoot,
    /// Load-time threshold in whole seconds.
    LoadtimeThreshold,
    /// Value sent verbatim as the `Authorization` header.
    AuthHeader,
    /// Payload path relative to `CI_ROOT`.
    PayloadPath,
    /// Scheme and host of the endpoint.
    HostAddress,
    /// Path appended to the host address.
    PostUrl,
}

impl RequiredEnv {
    /// Every required key in reporting order.
    pub const ALL: [Self; 6] = [
        Self::CiRoot,
        Self::LoadtimeThreshold,
        Self::AuthHeader,
        Self::PayloadPath,
        Self::HostAddress,
        Self::PostUrl,
    ];

    /// Returns every required variable name in reporting order.
    #[must_use]
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|key| key.as_str()).collect()
    }

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CiRoot => "CI_ROOT",
            Self::LoadtimeThreshold => "LOADTIME_THRESHOLD",
            Self::AuthHeader => "AUTH_HEADER",
            Self::PayloadPath => "PAYLOAD_PATH",
            Self::HostAddress => "HOST_ADDRESS",
            Self::PostUrl => "POST_URL",
        }
    }
}

/// Optional environment keys. Unset means the default applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionalEnv {
    /// `JSONPath` that selects the target URL in the response body.
    UrlPath,
    /// Audit executable name or path.
    AuditBin,
    /// Explicit Chrome/Chromium binary for the browser prober.
    ChromePath,
    /// Submit request timeout in seconds (positive integer).
    HttpTimeoutSeconds,
    /// Audit report file name under `CI_ROOT`.
    ReportName,
}

impl OptionalEnv {
    /// Every optional key.
    pub const ALL: [Self; 5] =
        [Self::UrlPath, Self::AuditBin, Self::ChromePath, Self::HttpTimeoutSeconds, Self::ReportName];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UrlPath => "LOAD_GATE_URL_PATH",
            Self::AuditBin => "LOAD_GATE_AUDIT_BIN",
            Self::ChromePath => "LOAD_GATE_CHROME_PATH",
            Self::HttpTimeoutSeconds => "LOAD_GATE_HTTP_TIMEOUT_SEC",
            Self::ReportName => "LOAD_GATE_REPORT_NAME",
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// One or more required variables are unset or blank.
    #[error("environment variable(s) not set: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    /// A variable is present but its value is unusable.
    #[error("invalid value for {name}: {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Human-readable cause.
        reason: String,
    },
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Optional tunables with their defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tunables {
    /// `JSONPath` selecting the target URL.
    pub url_path: String,
    /// Audit executable.
    pub audit_bin: String,
    /// Explicit browser binary, if any.
    pub chrome_path: Option<PathBuf>,
    /// Submit timeout. `None` waits indefinitely.
    pub http_timeout: Option<Duration>,
    /// Audit report file name.
    pub report_name: String,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            url_path: DEFAULT_URL_PATH.to_string(),
            audit_bin: DEFAULT_AUDIT_BIN.to_string(),
            chrome_path: None,
            http_timeout: None,
            report_name: DEFAULT_REPORT_NAME.to_string(),
        }
    }
}

/// Typed load-gate configuration derived from environment variables.
///
/// # Invariants
/// - Every required value was present and non-blank when loaded.
/// - Required string values are stored exactly as read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadGateConfig {
    /// Project root.
    pub ci_root: PathBuf,
    /// Load-time threshold.
    pub threshold: LoadThreshold,
    /// `Authorization` header value.
    pub auth_header: String,
    /// Payload path relative to `ci_root`.
    pub payload_path: PathBuf,
    /// Endpoint scheme and host.
    pub host_address: String,
    /// Endpoint path.
    pub post_url: String,
    /// Optional tunables.
    pub tunables: Tunables,
}

impl LoadGateConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] listing every unset or blank required
    /// variable, or [`ConfigError::Invalid`] for unusable values.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var_os(name))
    }

    /// Loads configuration from an arbitrary lookup function.
    ///
    /// # Errors
    ///
    /// Same as [`LoadGateConfig::load`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let mut values = Vec::with_capacity(RequiredEnv::ALL.len());
        let mut missing = Vec::new();
        for key in RequiredEnv::ALL {
            match read_strict(&lookup, key.as_str())? {
                Some(value) if !value.trim().is_empty() => values.push(value),
                _ => missing.push(key.as_str()),
            }
        }
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        // The pattern arity is checked against `RequiredEnv::ALL` at compile time.
        let values: [String; RequiredEnv::ALL.len()] =
            values.try_into().map_err(|_| ConfigError::Missing(RequiredEnv::names()))?;
        let [ci_root, threshold_raw, auth_header, payload_path, host_address, post_url] = values;
        let ci_root = PathBuf::from(ci_root);
        let payload_path = PathBuf::from(payload_path);

        let threshold =
            LoadThreshold::parse(&threshold_raw).map_err(|err| ConfigError::Invalid {
                name: RequiredEnv::LoadtimeThreshold.as_str(),
                reason: err.to_string(),
            })?;
        if payload_path.is_absolute() {
            return Err(ConfigError::Invalid {
                name: RequiredEnv::PayloadPath.as_str(),
                reason: "path must be relative to CI_ROOT".to_string(),
            });
        }

        Ok(Self {
            ci_root,
            threshold,
            auth_header,
            payload_path,
            host_address,
            post_url,
            tunables: load_tunables(&lookup)?,
        })
    }

    /// Returns the submit URL, `HOST_ADDRESS + "/" + POST_URL`.
    #[must_use]
    pub fn post_address(&self) -> String {
        format!("{}/{}", self.host_address, self.post_url)
    }

    /// Returns the audit report location under the project root.
    #[must_use]
    pub fn report_path(&self) -> PathBuf {
        self.ci_root.join(&self.tunables.report_name)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &'static str) -> Result<Option<String>, ConfigError> {
    read_strict(&|key: &str| std::env::var_os(key), name)
}

/// Reads a value through `lookup` and enforces UTF-8 validity.
fn read_strict<F>(lookup: &F, name: &'static str) -> Result<Option<String>, ConfigError>
where
    F: Fn(&str) -> Option<OsString>,
{
    lookup(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| ConfigError::Invalid {
            name,
            reason: "value must be valid UTF-8".to_string(),
        })
    })
}

/// Reads an optional variable, rejecting values that are set but blank.
fn read_optional<F>(lookup: &F, key: OptionalEnv) -> Result<Option<String>, ConfigError>
where
    F: Fn(&str) -> Option<OsString>,
{
    match read_strict(lookup, key.as_str())? {
        Some(value) if value.trim().is_empty() => Err(ConfigError::Invalid {
            name: key.as_str(),
            reason: "value must not be empty".to_string(),
        }),
        other => Ok(other),
    }
}

/// Loads the optional tunables, applying defaults for unset keys.
fn load_tunables<F>(lookup: &F) -> Result<Tunables, ConfigError>
where
    F: Fn(&str) -> Option<OsString>,
{
    let defaults = Tunables::default();
    let url_path = read_optional(lookup, OptionalEnv::UrlPath)?.unwrap_or(defaults.url_path);
    let audit_bin = read_optional(lookup, OptionalEnv::AuditBin)?.unwrap_or(defaults.audit_bin);
    let chrome_path = read_optional(lookup, OptionalEnv::ChromePath)?.map(PathBuf::from);
    let http_timeout = read_optional(lookup, OptionalEnv::HttpTimeoutSeconds)?
        .map(|value| parse_timeout_seconds(OptionalEnv::HttpTimeoutSeconds.as_str(), &value))
        .transpose()?;
    let report_name =
        read_optional(lookup, OptionalEnv::ReportName)?.unwrap_or(defaults.report_name);
    let mut components = Path::new(&report_name).components();
    let single_file = matches!(components.next(), Some(Component::Normal(_)))
        && components.next().is_none();
    if !single_file {
        return Err(ConfigError::Invalid {
            name: OptionalEnv::ReportName.as_str(),
            reason: "report name must be a single file name".to_string(),
        });
    }
    Ok(Tunables {
        url_path,
        audit_bin,
        chrome_path,
        http_timeout,
        report_name,
    })
}

/// Parses a positive timeout value from an environment variable string.
fn parse_timeout_seconds(name: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        reason: "must be a positive integer number of seconds".to_string(),
    })?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            name,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}
