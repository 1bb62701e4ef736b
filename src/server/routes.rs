//! Router configuration for the web server.

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the router. `GET /` and `POST /` both trigger a crawl; preflight
/// requests are answered by the CORS layer.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::trigger_crawl).post(handlers::trigger_crawl),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
