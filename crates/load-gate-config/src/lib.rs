// crates/load-gate-config/src/lib.rs
// ============================================================================
// Module: Load Gate Config Library
// Description: Environment-backed configuration model and validation.
// Purpose: Single source of truth for the settings a load-gate run consumes.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! `load-gate-config` reads the six required CI settings plus a handful of
//! optional tunables from the process environment. Loading is fail-closed:
//! every missing or blank required variable is reported in one error, and the
//! load-time threshold is parsed up front so a malformed value never reaches
//! the network stage.
//!
//! Security posture: environment inputs are untrusted and validated strictly.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod env;
pub mod threshold;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use env::ConfigError;
pub use env::DEFAULT_AUDIT_BIN;
pub use env::DEFAULT_REPORT_NAME;
pub use env::DEFAULT_URL_PATH;
pub use env::LoadGateConfig;
pub use env::OptionalEnv;
pub use env::RequiredEnv;
pub use env::Tunables;
pub use env::read_env_strict;
pub use threshold::LoadThreshold;
pub use threshold::ThresholdError;
