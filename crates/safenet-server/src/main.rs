// crates/safenet-server/src/main.rs
// ============================================================================
// Module: SafeNet Binary
// Description: Process entry point for the `safenet` server.
// Purpose: Load config, install logging, and serve until shutdown.
// Dependencies: safenet-config, safenet-server, tokio, tracing
// ============================================================================

//! ## Overview
//! `safenet` takes no arguments. Configuration comes from `SAFENET_CONFIG`
//! or `./safenet.toml`, and `PORT` overrides the listening port.

use std::io::Write;
use std::process::ExitCode;

use safenet_config::SafenetConfig;
use safenet_server::SafenetServer;
use safenet_server::telemetry::init_tracing;
use tracing::error;
use tracing::info;

/// Process entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    let config = match SafenetConfig::load(None) {
        Ok(config) => config,
        Err(err) => return emit_error(&err.to_string()),
    };
    if let Err(err) = init_tracing(&config.logging) {
        return emit_error(&err.to_string());
    }
    match config.source.as_deref() {
        Some(source) => info!(path = %source.display(), "configuration loaded"),
        None => info!("using built-in configuration"),
    }
    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!(error = %message, "safenet failed");
            ExitCode::FAILURE
        }
    }
}

/// Builds the server off the async executor, then serves.
async fn run(config: SafenetConfig) -> Result<(), String> {
    let server = tokio::task::spawn_blocking(move || SafenetServer::from_config(config))
        .await
        .map_err(|err| format!("init join failed: {err}"))?
        .map_err(|err| err.to_string())?;
    server.serve().await.map_err(|err| err.to_string())
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Reports a failure raised before logging is available.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
