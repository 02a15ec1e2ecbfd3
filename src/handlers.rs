use crate::controller::Action;
use crate::errors::AppError;
use crate::models::TrackerView;
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Html,
    Json,
};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let tracker = state.tracker.lock().await;
    Html(render_index(&tracker.view()))
}

pub async fn get_state(State(state): State<AppState>) -> Json<TrackerView> {
    let tracker = state.tracker.lock().await;
    Json(tracker.view())
}

pub async fn apply_action(
    State(state): State<AppState>,
    payload: Result<Json<Action>, JsonRejection>,
) -> Result<Json<TrackerView>, AppError> {
    let Json(action) = payload.map_err(|err| AppError::bad_request(err.body_text()))?;

    let mut tracker = state.tracker.lock().await;
    let view = tracker.apply(action).await?;
    Ok(Json(view))
}
