use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::webhook::handlers;
use crate::webhook::state::AppState;

/// Builds the webhook router.
///
/// `GET /` answers a liveness text, `POST /query` carries chat messages and
/// anything else falls through to a plain 404.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/query", post(handlers::query))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
