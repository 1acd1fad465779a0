// crates/safenet-server/src/server.rs
// ============================================================================
// Module: SafeNet Server
// Description: Startup wiring, router assembly, and the HTTP listener.
// Purpose: Turn a validated config into a running axum service.
// Dependencies: axum, safenet-config, safenet-store-sqlite, tokio, tower-http
// ============================================================================

//! ## Overview
//! [`SafenetServer::from_config`] performs all blocking setup: config
//! validation, store path checks, and (in startup mode) schema creation.
//! [`SafenetServer::serve`] binds the listener and runs until ctrl-c or
//! SIGTERM.
//!
//! Store work never runs on the async executor. Handlers call
//! [`run_in_session`], which moves one session onto the blocking pool and
//! releases it before the future resolves.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::routing::post;
use safenet_config::SafenetConfig;
use safenet_config::SchemaInitMode;
use safenet_store_sqlite::RecordSession;
use safenet_store_sqlite::SqliteRecordStore;
use safenet_store_sqlite::SqliteStoreError;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing::warn;

use crate::api;
use crate::error::ApiError;
use crate::pages;
use crate::pages::PageRenderer;
use crate::submissions;

// ============================================================================
// SECTION: Shared State
// ============================================================================

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Record store handle. Holds no open connection.
    pub store: SqliteRecordStore,
    /// Page template reader.
    pub pages: PageRenderer,
    /// When page visits create the schema.
    pub schema_init: SchemaInitMode,
}

/// Runs `scope` in a request-scoped store session on the blocking pool.
///
/// The session, and with it the connection, is released before this returns
/// on every path.
///
/// # Errors
///
/// Returns [`ApiError::Store`] when `scope` fails and [`ApiError::Internal`]
/// when the blocking task cannot complete.
pub async fn run_in_session<T, F>(store: &SqliteRecordStore, scope: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&mut RecordSession) -> Result<T, SqliteStoreError> + Send + 'static,
{
    let store = store.clone();
    tokio::task::spawn_blocking(move || store.with_session(scope))
        .await
        .map_err(|err| ApiError::Internal(format!("store task failed: {err}")))?
        .map_err(ApiError::from)
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// Configured SafeNet HTTP server.
pub struct SafenetServer {
    /// Validated configuration.
    config: SafenetConfig,
    /// Record store handle.
    store: SqliteRecordStore,
}

impl SafenetServer {
    /// Builds a server from configuration. Performs blocking file IO.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when the config is invalid or the store
    /// cannot be prepared.
    pub fn from_config(config: SafenetConfig) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let store = SqliteRecordStore::new(config.store.sqlite_config())
            .map_err(|err| ServerError::Init(err.to_string()))?;
        if config.server.schema_init == SchemaInitMode::Startup {
            store.ensure_schema().map_err(|err| ServerError::Init(err.to_string()))?;
            info!(path = %store.path().display(), "record schema ready");
        }
        let renderer = PageRenderer::new(config.pages.templates_dir.clone());
        for page in renderer.missing_templates() {
            warn!(
                template = page.template_name(),
                dir = %renderer.templates_dir().display(),
                "page template missing"
            );
        }
        if !config.pages.static_dir.is_dir() {
            warn!(dir = %config.pages.static_dir.display(), "static directory missing");
        }
        Ok(Self {
            config,
            store,
        })
    }

    /// Returns the configuration the server was built from.
    #[must_use]
    pub const fn config(&self) -> &SafenetConfig {
        &self.config
    }

    /// Builds the application router.
    #[must_use]
    pub fn router(&self) -> Router {
        let state = AppState {
            store: self.store.clone(),
            pages: PageRenderer::new(self.config.pages.templates_dir.clone()),
            schema_init: self.config.server.schema_init,
        };
        Router::new()
            .route("/", get(pages::home))
            .route("/quiz", get(pages::quiz))
            .route("/about", get(pages::about))
            .route("/contact", get(pages::contact).post(submissions::submit_contact))
            .route("/submit-quiz", post(submissions::submit_quiz))
            .route("/api/attack_count", get(api::attack_count))
            .nest_service("/static", ServeDir::new(&self.config.pages.static_dir))
            .layer(DefaultBodyLimit::max(self.config.server.max_body_bytes))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Binds the listener and serves until a shutdown signal arrives.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ServerError> {
        let addr =
            self.config.server.socket_addr().map_err(|err| ServerError::Config(err.to_string()))?;
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|err| ServerError::Transport(format!("bind {addr} failed: {err}")))?;
        info!(%addr, "safenet listening");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|err| ServerError::Transport(format!("http server failed: {err}")))?;
        info!("safenet stopped");
        Ok(())
    }
}

/// Resolves on ctrl-c or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::SignalKind;
        use tokio::signal::unix::signal;

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Server startup and transport errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}
