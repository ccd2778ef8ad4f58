use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::AppState;
use crate::config::SimConfig;
use crate::engine::EngineSnapshot;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateResponse {
    pub running: bool,
    pub config: SimConfig,
    #[serde(flatten)]
    pub snapshot: EngineSnapshot,
}

/// Full ledger snapshot between ticks.
pub async fn get_state(State(state): State<AppState>) -> Json<StateResponse> {
    let engine = state.engine.lock().await;
    let snapshot = engine.snapshot();
    let config = engine.config().clone();
    drop(engine);

    Json(StateResponse {
        running: state.runner.is_running().await,
        config,
        snapshot,
    })
}
