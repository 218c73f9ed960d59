// crates/load-gate-cli/src/lib.rs
// ============================================================================
// Module: Load Gate CLI Library
// Description: Shared helpers for the load-gate command-line interface.
// Purpose: Provide the message catalog to the binary and its tests.
// Dependencies: Standard library.
// ============================================================================

//! ## Overview
//! Houses the message catalog used by `src/main.rs` so that all console output
//! is keyed and testable.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Message catalog and the `t!` macro.
pub mod i18n;
