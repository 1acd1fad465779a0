// crates/safenet-server/src/pages.rs
// ============================================================================
// Module: Page Server
// Description: Template rendering for the four navigational pages.
// Purpose: Serve home, quiz, about, and contact HTML documents.
// Dependencies: axum, safenet-config, safenet-store-sqlite, tokio
// ============================================================================

//! ## Overview
//! Pages carry no per-request data: rendering reads `<templates_dir>/<page>.html`
//! and returns it verbatim. A missing template is a server error.
//!
//! With `schema_init = "on_visit"` the home and quiz pages create the store
//! schema before rendering. No other page touches the store.

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use safenet_config::SchemaInitMode;
use safenet_store_sqlite::RecordSession;

use crate::error::ApiError;
use crate::server::AppState;
use crate::server::run_in_session;

// ============================================================================
// SECTION: Pages
// ============================================================================

/// Navigational pages served by SafeNet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// Landing page (`/`).
    Home,
    /// Phishing awareness quiz (`/quiz`).
    Quiz,
    /// About page (`/about`).
    About,
    /// Contact form page (`GET /contact`).
    Contact,
}

impl Page {
    /// Every page, in navigation order.
    pub const ALL: [Self; 4] = [Self::Home, Self::Quiz, Self::About, Self::Contact];

    /// Returns the template file name.
    #[must_use]
    pub const fn template_name(self) -> &'static str {
        match self {
            Self::Home => "home.html",
            Self::Quiz => "quiz.html",
            Self::About => "about.html",
            Self::Contact => "contact.html",
        }
    }

    /// Returns true for the pages that create the schema in on-visit mode.
    #[must_use]
    pub const fn triggers_schema_init(self) -> bool {
        matches!(self, Self::Home | Self::Quiz)
    }
}

// ============================================================================
// SECTION: Renderer
// ============================================================================

/// Reads page templates from a directory.
#[derive(Debug, Clone)]
pub struct PageRenderer {
    /// Directory holding `<page>.html` files.
    templates_dir: Arc<PathBuf>,
}

impl PageRenderer {
    /// Builds a renderer over `templates_dir`.
    #[must_use]
    pub fn new(templates_dir: impl Into<PathBuf>) -> Self {
        Self {
            templates_dir: Arc::new(templates_dir.into()),
        }
    }

    /// Returns the template directory.
    #[must_use]
    pub fn templates_dir(&self) -> &Path {
        &self.templates_dir
    }

    /// Renders `page` as an HTML document.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Template`] when the template cannot be read.
    pub async fn render(&self, page: Page) -> Result<Html<String>, ApiError> {
        let path = self.templates_dir.join(page.template_name());
        tokio::fs::read_to_string(&path)
            .await
            .map(Html)
            .map_err(|err| ApiError::Template(format!("{}: {err}", page.template_name())))
    }

    /// Returns the pages whose template file is absent.
    #[must_use]
    pub fn missing_templates(&self) -> Vec<Page> {
        Page::ALL
            .into_iter()
            .filter(|page| !self.templates_dir.join(page.template_name()).is_file())
            .collect()
    }
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Renders `page`, creating the schema first when the mode asks for it.
async fn serve_page(state: &AppState, page: Page) -> Result<Html<String>, ApiError> {
    if state.schema_init == SchemaInitMode::OnVisit && page.triggers_schema_init() {
        run_in_session(&state.store, RecordSession::ensure_schema).await?;
    }
    state.pages.render(page).await
}

/// Handles `GET /`.
pub async fn home(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    serve_page(&state, Page::Home).await
}

/// Handles `GET /quiz`.
pub async fn quiz(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    serve_page(&state, Page::Quiz).await
}

/// Handles `GET /about`.
pub async fn about(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    serve_page(&state, Page::About).await
}

/// Handles `GET /contact`.
pub async fn contact(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    serve_page(&state, Page::Contact).await
}
