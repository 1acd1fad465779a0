// crates/safenet-server/src/lib.rs
// ============================================================================
// Module: SafeNet Server Library
// Description: HTTP surface for SafeNet pages, forms, and the attack counter.
// Purpose: Wire the record store and page templates into an axum router.
// Dependencies: axum, safenet-config, safenet-store-sqlite, tokio, tracing
// ============================================================================

//! ## Overview
//! SafeNet serves four static informational pages, accepts quiz results and
//! contact messages as JSON, and reports a fixed phishing-attempt counter.
//! Every store call runs inside one request-scoped session on the blocking
//! pool; see [`server::run_in_session`].
//!
//! Routes:
//! - `GET /`, `GET /quiz`, `GET /about`, `GET /contact` render templates.
//! - `POST /submit-quiz` and `POST /contact` append one row each.
//! - `GET /api/attack_count` returns the fixed counter.
//! - `GET /static/*` serves page assets.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod api;
pub mod error;
pub mod pages;
pub mod server;
pub mod submissions;
pub mod telemetry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::ApiError;
pub use server::AppState;
pub use server::SafenetServer;
pub use server::ServerError;
