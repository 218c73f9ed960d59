// crates/load-gate-core/src/payload.rs
// ============================================================================
// Module: Payload Loader
// Description: Reads the JSON payload relative to the project root.
// Purpose: Load the POST body without touching the process working directory.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! The payload path is joined onto the project root and read with a hard size
//! limit. The document is returned untouched; the submitter serializes it
//! again with standard encoding.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default maximum payload size, in bytes.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 8 * 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Payload loading failures. Every variant carries the attempted path.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The file could not be opened.
    #[error("unable to open payload {}: {reason}", path.display())]
    Open {
        /// Attempted path.
        path: PathBuf,
        /// Underlying I/O error text.
        reason: String,
    },
    /// The file could not be read.
    #[error("unable to read payload {}: {reason}", path.display())]
    Read {
        /// Attempted path.
        path: PathBuf,
        /// Underlying I/O error text.
        reason: String,
    },
    /// The file is larger than the configured limit.
    #[error("payload {} exceeds size limit of {limit} bytes", path.display())]
    TooLarge {
        /// Attempted path.
        path: PathBuf,
        /// Limit in bytes.
        limit: usize,
    },
    /// The content is not JSON.
    #[error("payload {} is not valid JSON: {reason}", path.display())]
    InvalidJson {
        /// Attempted path.
        path: PathBuf,
        /// Parser error text.
        reason: String,
    },
}

impl PayloadError {
    /// Returns the path the loader attempted to read.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Open {
                path, ..
            }
            | Self::Read {
                path, ..
            }
            | Self::TooLarge {
                path, ..
            }
            | Self::InvalidJson {
                path, ..
            } => path,
        }
    }
}

// ============================================================================
// SECTION: Loader
// ============================================================================

/// Joins `relative` onto `root` without consulting the working directory.
#[must_use]
pub fn resolve_payload_path(root: &Path, relative: &Path) -> PathBuf {
    root.join(relative)
}

/// Loads and parses the payload at `root/relative`.
///
/// # Errors
///
/// Returns [`PayloadError`] when the file is missing, unreadable, too large,
/// or not valid JSON.
pub fn load_payload(root: &Path, relative: &Path, max_bytes: usize) -> Result<Value, PayloadError> {
    let path = resolve_payload_path(root, relative);
    let content = read_file_limited(&path, max_bytes)?;
    serde_json::from_slice(&content).map_err(|err| PayloadError::InvalidJson {
        path,
        reason: err.to_string(),
    })
}

/// Renders the payload as indented JSON with sorted keys.
#[must_use]
pub fn render_payload(payload: &Value) -> String {
    let sorted = sort_keys(payload);
    serde_json::to_string_pretty(&sorted).unwrap_or_else(|_| sorted.to_string())
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Rebuilds `value` with every object's keys in ascending order.
///
/// `serde_json::Map` keeps insertion order when the `preserve_order` feature
/// is enabled anywhere in the build, so ordering is applied explicitly.
fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|left, right| left.0.cmp(right.0));
            Value::Object(entries.into_iter().map(|(key, item)| (key.clone(), sort_keys(item))).collect())
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

/// Reads a file while enforcing a maximum byte limit.
fn read_file_limited(path: &Path, max_bytes: usize) -> Result<Vec<u8>, PayloadError> {
    let file = File::open(path).map_err(|err| PayloadError::Open {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    let limit = u64::try_from(max_bytes.saturating_add(1)).unwrap_or(u64::MAX);
    let mut buf = Vec::new();
    file.take(limit).read_to_end(&mut buf).map_err(|err| PayloadError::Read {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    if buf.len() > max_bytes {
        return Err(PayloadError::TooLarge {
            path: path.to_path_buf(),
            limit: max_bytes,
        });
    }
    Ok(buf)
}
