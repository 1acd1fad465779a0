// crates/safenet-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example kept in sync with the config model.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example for SafeNet configuration. Every value shown equals the
//! built-in default except the asset directories, which point at the server
//! crate so the example works from the workspace root.

/// Returns a canonical example `safenet.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[server]
bind_host = "0.0.0.0"
port = 5000
max_body_bytes = 65536
schema_init = "startup"

[store]
path = "safenet.db"
busy_timeout_ms = 5000
journal_mode = "wal"
sync_mode = "full"

[pages]
templates_dir = "crates/safenet-server/templates"
static_dir = "crates/safenet-server/static"

[logging]
format = "text"
filter = "info"
"#,
    )
}
