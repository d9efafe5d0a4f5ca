pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::insights::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/_health", get(health::health_handler))
        // Insights CRUD
        .route(
            "/insights",
            get(handlers::handle_list).post(handlers::handle_create),
        )
        .route(
            "/insights/:id",
            get(handlers::handle_lookup).delete(handlers::handle_delete),
        )
        // Sentiment classification
        .route("/sentiment", post(handlers::handle_sentiment))
        .with_state(state)
}
