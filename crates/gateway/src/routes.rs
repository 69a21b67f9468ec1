//! Router assembly.

use std::sync::Arc;

use {
    axum::{
        Router,
        routing::get,
    },
    tower_http::trace::TraceLayer,
};

use crate::{graphql_routes, state::AppState};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/graphql",
            get(graphql_routes::graphql_get).post(graphql_routes::graphql_post),
        )
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
