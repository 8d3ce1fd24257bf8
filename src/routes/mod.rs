//! API Routes
//!
//! - `/` - Upload form and result editor
//! - `/api/health` - Health check and LLM mode
//! - `/api/summarize` - Upload a document and summarize it
//! - `/api/summary` - The session's latest result
//! - `/api/download` - Export the result (GET) or edited text (POST)
//! - `/api/reset` - Clear the session's result

pub mod download;
pub mod health;
pub mod summarize;
pub mod ui;

use axum::{extract::DefaultBodyLimit, middleware, Router};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::{apply_cors, session_middleware};
use crate::models::AppState;

/// Create the main application router
///
/// Every route runs behind the session layer, so handlers can extract the
/// caller's `SessionId` from request extensions.
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let router = Router::new()
        .merge(summarize::router(state.clone()))
        .merge(download::router())
        .merge(health::router())
        .merge(ui::router())
        .layer(middleware::from_fn_with_state(state.clone(), session_middleware))
        .layer(DefaultBodyLimit::max(state.config.server.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    apply_cors(router, &state.config.server)
}
