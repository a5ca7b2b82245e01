use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{ingress, usage};
use crate::state::AppState;

/// Binds the two external endpoints onto the shared pool state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/event", post(ingress::ingest))
        .route("/v1/resources", get(usage::usage))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
