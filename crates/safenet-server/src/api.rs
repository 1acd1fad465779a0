// crates/safenet-server/src/api.rs
// ============================================================================
// Module: Attack Counter API
// Description: Fixed phishing-attempt counter for the home page widget.
// Purpose: Serve `GET /api/attack_count`.
// Dependencies: axum, serde
// ============================================================================

//! ## Overview
//! The counter is a constant. No state is read or written, so every call
//! returns the same body.

use axum::Json;
use serde::Serialize;

/// Value reported by `GET /api/attack_count`.
pub const PHISHING_ATTEMPTS_TODAY: u64 = 24_981;

/// Response body of the attack counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttackCount {
    /// Phishing attempts reported for today.
    pub phishing_attempts_today: u64,
}

/// Handles `GET /api/attack_count`.
pub async fn attack_count() -> Json<AttackCount> {
    Json(AttackCount {
        phishing_attempts_today: PHISHING_ATTEMPTS_TODAY,
    })
}
