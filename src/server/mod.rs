//! Application state, router assembly and the serve loop

use crate::core::auth::AuthProvider;
use crate::products::handlers;
use crate::products::service::ProductService;
use anyhow::Result;
use axum::extract::FromRef;
use axum::routing::get;
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state. `FromRef` lets extractors pull the auth
/// provider out without seeing the rest.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub products: ProductService,
    pub auth: Arc<dyn AuthProvider>,
}

/// Assemble the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(handlers::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Bind the listener and run the server until it is shut down.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("server listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
