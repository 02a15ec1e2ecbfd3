use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/state", get(handlers::get_state))
        .route("/api/action", post(handlers::apply_action))
        .with_state(state)
}
