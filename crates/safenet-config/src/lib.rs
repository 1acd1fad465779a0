// crates/safenet-config/src/lib.rs
// ============================================================================
// Module: SafeNet Config Library
// Description: Canonical config model, validation, and example generation.
// Purpose: Single source of truth for safenet.toml and environment semantics.
// Dependencies: safenet-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `safenet-config` defines the configuration model for the SafeNet server:
//! listener, record store, page assets, and logging. Values come from an
//! optional TOML file and the `PORT` environment variable, and are validated
//! fail-closed before the server starts.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
