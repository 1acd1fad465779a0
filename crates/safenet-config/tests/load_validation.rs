//! Load and validation tests for safenet-config.
// crates/safenet-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Tests for file resolution, environment overrides, and limits.
// Purpose: Ensure config loading is fail-closed and defaults are stable.
// =============================================================================

use std::fs;
use std::path::PathBuf;

use safenet_config::ConfigError;
use safenet_config::DEFAULT_PORT;
use safenet_config::LogFormat;
use safenet_config::SafenetConfig;
use safenet_config::SchemaInitMode;
use safenet_config::config_toml_example;
use safenet_store_sqlite::SqliteStoreMode;
use safenet_store_sqlite::SqliteSyncMode;
use tempfile::TempDir;

type TestResult = Result<(), String>;

/// Assert that a result is an error containing a specific substring.
fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error '{message}' did not contain '{needle}'"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}

/// Writes `content` to a fresh `safenet.toml` and returns its path.
fn write_config(temp: &TempDir, content: &str) -> Result<PathBuf, String> {
    let path = temp.path().join("safenet.toml");
    fs::write(&path, content).map_err(|err| err.to_string())?;
    Ok(path)
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

#[test]
fn defaults_apply_without_config_file() -> TestResult {
    let config = SafenetConfig::load_with(None, None, None).map_err(|err| err.to_string())?;
    if config.server.port != DEFAULT_PORT {
        return Err(format!("expected default port, got {}", config.server.port));
    }
    if config.server.bind_host != "0.0.0.0" {
        return Err("expected bind on all interfaces".to_string());
    }
    if config.server.schema_init != SchemaInitMode::Startup {
        return Err("expected startup schema init by default".to_string());
    }
    if config.store.path != PathBuf::from("safenet.db") {
        return Err("expected default database path".to_string());
    }
    if config.source.is_some() {
        return Err("defaults must not report a source file".to_string());
    }
    Ok(())
}

#[test]
fn empty_file_yields_defaults() -> TestResult {
    let temp = TempDir::new().map_err(|err| err.to_string())?;
    let path = write_config(&temp, "")?;
    let config =
        SafenetConfig::load_with(Some(&path), None, None).map_err(|err| err.to_string())?;
    let mut expected = SafenetConfig::default();
    expected.source = Some(path);
    if config != expected {
        return Err("empty config file should equal defaults".to_string());
    }
    Ok(())
}

#[test]
fn example_config_parses_and_validates() -> TestResult {
    let config =
        SafenetConfig::from_toml_str(&config_toml_example()).map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    if config.server.port != DEFAULT_PORT || config.logging.format != LogFormat::Text {
        return Err("example should mirror defaults".to_string());
    }
    Ok(())
}

// ============================================================================
// SECTION: File Resolution
// ============================================================================

#[test]
fn explicit_file_values_are_loaded() -> TestResult {
    let temp = TempDir::new().map_err(|err| err.to_string())?;
    let path = write_config(
        &temp,
        r#"
[server]
bind_host = "127.0.0.1"
port = 8080
schema_init = "on_visit"

[store]
path = "data/records.db"
journal_mode = "delete"
sync_mode = "normal"
busy_timeout_ms = 250

[pages]
templates_dir = "site/templates"

[logging]
format = "json"
filter = "safenet_server=debug"
"#,
    )?;
    let config =
        SafenetConfig::load_with(Some(&path), None, None).map_err(|err| err.to_string())?;
    let addr = config.server.socket_addr().map_err(|err| err.to_string())?;
    if addr.to_string() != "127.0.0.1:8080" {
        return Err(format!("unexpected bind address {addr}"));
    }
    if config.server.schema_init != SchemaInitMode::OnVisit {
        return Err("expected on_visit schema init".to_string());
    }
    let sqlite = config.store.sqlite_config();
    if sqlite.path != PathBuf::from("data/records.db")
        || sqlite.journal_mode != SqliteStoreMode::Delete
        || sqlite.sync_mode != SqliteSyncMode::Normal
        || sqlite.busy_timeout_ms != 250
    {
        return Err("store settings not carried into sqlite config".to_string());
    }
    if config.pages.templates_dir != PathBuf::from("site/templates")
        || config.pages.static_dir != PathBuf::from("static")
    {
        return Err("pages settings not applied".to_string());
    }
    if config.logging.format != LogFormat::Json {
        return Err("expected json log format".to_string());
    }
    if config.source.as_deref() != Some(path.as_path()) {
        return Err("expected source path to be recorded".to_string());
    }
    Ok(())
}

#[test]
fn env_path_is_used_when_no_explicit_path() -> TestResult {
    let temp = TempDir::new().map_err(|err| err.to_string())?;
    let path = write_config(&temp, "[server]\nport = 7000\n")?;
    let env_path = path.to_string_lossy().to_string();
    let config =
        SafenetConfig::load_with(None, Some(&env_path), None).map_err(|err| err.to_string())?;
    if config.server.port != 7000 {
        return Err(format!("expected port from env config, got {}", config.server.port));
    }
    Ok(())
}

#[test]
fn missing_explicit_file_is_an_error() -> TestResult {
    let temp = TempDir::new().map_err(|err| err.to_string())?;
    let path = temp.path().join("absent.toml");
    assert_invalid(SafenetConfig::load_with(Some(&path), None, None), "config io error")
}

#[test]
fn unknown_fields_are_rejected() -> TestResult {
    assert_invalid(SafenetConfig::from_toml_str("[server]\nprot = 5000\n"), "config parse error")
}

#[test]
fn non_utf8_file_is_rejected() -> TestResult {
    let temp = TempDir::new().map_err(|err| err.to_string())?;
    let path = temp.path().join("safenet.toml");
    fs::write(&path, [0xff_u8, 0xfe, 0x00]).map_err(|err| err.to_string())?;
    assert_invalid(SafenetConfig::load_with(Some(&path), None, None), "utf-8")
}

#[test]
fn oversized_file_is_rejected() -> TestResult {
    let temp = TempDir::new().map_err(|err| err.to_string())?;
    let padding = format!("# {}\n", "x".repeat(1024 * 1024));
    let path = write_config(&temp, &padding)?;
    assert_invalid(SafenetConfig::load_with(Some(&path), None, None), "size limit")
}

// ============================================================================
// SECTION: PORT Override
// ============================================================================

#[test]
fn port_env_overrides_file_value() -> TestResult {
    let temp = TempDir::new().map_err(|err| err.to_string())?;
    let path = write_config(&temp, "[server]\nport = 7000\n")?;
    let config = SafenetConfig::load_with(Some(&path), None, Some(" 8123 "))
        .map_err(|err| err.to_string())?;
    if config.server.port != 8123 {
        return Err(format!("expected PORT override, got {}", config.server.port));
    }
    Ok(())
}

#[test]
fn non_numeric_port_env_is_rejected() -> TestResult {
    assert_invalid(SafenetConfig::load_with(None, None, Some("http")), "PORT must be a port number")
}

#[test]
fn out_of_range_port_env_is_rejected() -> TestResult {
    assert_invalid(SafenetConfig::load_with(None, None, Some("70000")), "PORT must be a port number")
}

// ============================================================================
// SECTION: Field Validation
// ============================================================================

#[test]
fn bind_host_must_be_ip_address() -> TestResult {
    let config = SafenetConfig::from_toml_str("[server]\nbind_host = \"localhost\"\n")
        .map_err(|err| err.to_string())?;
    assert_invalid(config.validate(), "bind_host must be an IP address")
}

#[test]
fn zero_body_limit_is_rejected() -> TestResult {
    let config = SafenetConfig::from_toml_str("[server]\nmax_body_bytes = 0\n")
        .map_err(|err| err.to_string())?;
    assert_invalid(config.validate(), "max_body_bytes must be greater than zero")
}

#[test]
fn oversized_body_limit_is_rejected() -> TestResult {
    let config = SafenetConfig::from_toml_str("[server]\nmax_body_bytes = 9000000\n")
        .map_err(|err| err.to_string())?;
    assert_invalid(config.validate(), "max_body_bytes exceeds limit")
}

#[test]
fn empty_store_path_is_rejected() -> TestResult {
    let config =
        SafenetConfig::from_toml_str("[store]\npath = \"\"\n").map_err(|err| err.to_string())?;
    assert_invalid(config.validate(), "store.path must be non-empty")
}

#[test]
fn excessive_busy_timeout_is_rejected() -> TestResult {
    let config = SafenetConfig::from_toml_str("[store]\nbusy_timeout_ms = 120000\n")
        .map_err(|err| err.to_string())?;
    assert_invalid(config.validate(), "busy_timeout_ms exceeds limit")
}

#[test]
fn blank_log_filter_is_rejected() -> TestResult {
    let config = SafenetConfig::from_toml_str("[logging]\nfilter = \"  \"\n")
        .map_err(|err| err.to_string())?;
    assert_invalid(config.validate(), "logging.filter must be non-empty")
}

#[test]
fn unknown_schema_init_mode_is_rejected() -> TestResult {
    assert_invalid(
        SafenetConfig::from_toml_str("[server]\nschema_init = \"lazy\"\n"),
        "config parse error",
    )
}

#[test]
fn workspace_config_matches_example() -> TestResult {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../safenet.toml");
    let content = fs::read_to_string(&path).map_err(|err| err.to_string())?;
    if content != config_toml_example() {
        return Err("safenet.toml drifted from config_toml_example()".to_string());
    }
    Ok(())
}
