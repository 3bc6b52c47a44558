use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use super::{download, handlers, middleware::metrics_middleware};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let static_dir = state.config().server.static_dir.clone();

    // API routes
    let api_routes = Router::new().route("/health", get(handlers::health));

    Router::new()
        .route("/download", post(download::download))
        .route("/metrics", get(handlers::metrics))
        .nest("/api/v1", api_routes)
        // Download form and assets; directories serve their index.html
        .fallback_service(ServeDir::new(static_dir))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
