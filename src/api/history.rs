use axum::extract::State;
use axum::Json;

use crate::api::AppState;
use crate::domain::HistoryPoint;

/// Time series of periodic snapshots, oldest first.
pub async fn get_history(State(state): State<AppState>) -> Json<Vec<HistoryPoint>> {
    let engine = state.engine.lock().await;
    Json(engine.history().cloned().collect())
}
