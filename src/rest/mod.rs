// rest/mod.rs — Public REST API server.
//
// Axum HTTP server bridging the fortune service and the model catalog.
// Served permissive-CORS because the SPA calls it cross-origin from the CDN.
//
// Endpoints:
//   POST /api/v1/fortune
//   GET  /api/v1/models
//   GET  /api/v1/health

pub mod routes;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::AppContext;

pub async fn start_rest_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("REST API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        // Health (no gateway round-trip)
        .route("/api/v1/health", get(routes::health::health))
        // Fortune
        .route("/api/v1/fortune", post(routes::fortune::tell_fortune))
        // Model catalog
        .route("/api/v1/models", get(routes::models::list_models))
        // Everything else is a named 404
        .fallback(routes::not_found)
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}
