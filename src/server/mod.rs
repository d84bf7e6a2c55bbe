//! # HTTP Preview Server
//!
//! Serves rendered stories and the template list over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! ardoise serve --listen 0.0.0.0:8080
//! ```
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /api/templates?for=daily` | JSON `[{ "id", "name" }]` |
//! | `GET /api/daily/image?date=2024-12-20&template=ID` | `menu-du-jour.png` |
//! | `GET /api/weekly/image?template=ID` | `plats-de-la-semaine.png` |
//!
//! Nothing published gives 404, a failing content store 502, both with a
//! JSON `{ "message" }` body.

mod handlers;
mod state;

pub use state::AppState;

use axum::{Router, routing::get};
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::content::ContentSource;
use crate::error::{ArdoiseError, Result};
use crate::render::RenderContext;

/// Build the router. Exposed separately from [`serve`] for tests.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/templates", get(handlers::templates::list))
        .route("/api/daily/image", get(handlers::stories::daily_image))
        .route("/api/weekly/image", get(handlers::stories::weekly_image))
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(
    config: &ServerConfig,
    source: Arc<dyn ContentSource>,
    render: RenderContext,
) -> Result<()> {
    let app = router(Arc::new(AppState::new(source, render)));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            ArdoiseError::Server(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

    log::info!("Ardoise HTTP server listening on http://{}/", config.listen_addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| ArdoiseError::Server(format!("Server error: {}", e)))?;

    Ok(())
}
