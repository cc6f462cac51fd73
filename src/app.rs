use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/charts", get(handlers::get_charts))
        .route("/api/charts/:id", get(handlers::get_chart))
        .route("/api/multiview", get(handlers::get_multiview))
        .route("/api/multiview/options", get(handlers::get_multiview_options))
        .route("/api/table", get(handlers::get_table))
        .route("/api/states", get(handlers::get_states))
        .route("/api/states/options", get(handlers::get_state_options))
        .with_state(state)
}
