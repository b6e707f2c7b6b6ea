//! The research worker: an axum router that authenticates every request with
//! the shared secret, dispatches to the research store or the generation
//! provider, and stamps permissive CORS headers on every response.
//!
//! [`build_router`] assembles the router from an [`AppState`]; [`serve`] wires
//! up the database and gateway from config and runs it.

pub mod auth;
pub mod error;
pub mod handlers;

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;
use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::{middleware, Router};
use rusqlite::Connection;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::ResearchConfig;
use crate::db;
use crate::gateway::{self, GenerationProvider};
use error::ApiError;

pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_METHODS: &str = "GET, POST, PATCH, OPTIONS";
pub const CORS_ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Shared per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    provider: Arc<dyn GenerationProvider>,
    api_key: Arc<str>,
}

impl AppState {
    pub fn new(
        conn: Connection,
        provider: Arc<dyn GenerationProvider>,
        api_key: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            provider,
            api_key: api_key.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn provider(&self) -> &dyn GenerationProvider {
        self.provider.as_ref()
    }

    /// Run a synchronous database operation on the blocking pool.
    ///
    /// A panic in an earlier operation poisons the mutex but leaves the
    /// connection usable, so the poison is ignored.
    pub async fn with_db<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let result = tokio::task::spawn_blocking(move || {
            let conn = db.lock().unwrap_or_else(PoisonError::into_inner);
            op(&conn)
        })
        .await
        .map_err(|e| anyhow::anyhow!("db task failed: {e}"))??;
        Ok(result)
    }
}

/// Build the worker router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/ai/generate", post(handlers::generate))
        .route(
            "/api/research/sessions",
            get(handlers::list_sessions).post(handlers::create_session),
        )
        .route(
            "/api/research/sessions/{id}",
            get(handlers::get_session).patch(handlers::update_session),
        )
        .route("/api/research/tasks", post(handlers::create_task))
        .route("/api/research/logs", post(handlers::create_log))
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ))
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(CORS_ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(CORS_ALLOW_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(CORS_ALLOW_HEADERS),
        ))
        .with_state(state)
}

/// Open the database, create the gateway provider and serve until ctrl-c.
pub async fn serve(config: ResearchConfig) -> Result<()> {
    anyhow::ensure!(
        !config.auth.api_key.trim().is_empty(),
        "no shared secret configured; set WORKER_API_KEY or [auth] api_key"
    );

    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");

    let provider: Arc<dyn GenerationProvider> = Arc::from(gateway::create_provider(&config.gateway)?);
    let state = AppState::new(conn, provider, config.auth.api_key.as_str());
    let router = build_router(state);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "research worker listening at http://{bind_addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
            tracing::info!("shutting down research worker");
        })
        .await?;

    Ok(())
}
