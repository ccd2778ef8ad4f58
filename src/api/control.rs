use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::config::SimConfig;
use crate::engine::{Engine, TickAction};
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResponse {
    pub tick: u64,
    pub action: TickAction,
}

/// Advance exactly one tick.
pub async fn post_step(State(state): State<AppState>) -> Json<StepResponse> {
    let mut engine = state.engine.lock().await;
    let action = engine.step();
    Json(StepResponse {
        tick: engine.tick(),
        action,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub interval_ms: u64,
}

/// Start timer-driven stepping. Any running timer is stopped first.
pub async fn post_start(
    State(state): State<AppState>,
    Json(request): Json<StartRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if request.interval_ms == 0 {
        return Err(AppError::BadRequest("intervalMs must be >= 1".into()));
    }
    state.runner.start(request.interval_ms).await;
    Ok(Json(serde_json::json!({"running": true})))
}

pub async fn post_stop(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.runner.stop().await;
    Json(serde_json::json!({"running": false}))
}

/// Discard all state and reinitialize with only the system account.
pub async fn post_reset(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.runner.stop().await;
    let mut engine = state.engine.lock().await;
    engine.reset();
    Json(serde_json::json!({"tick": engine.tick()}))
}

pub async fn get_config(State(state): State<AppState>) -> Json<SimConfig> {
    Json(state.engine.lock().await.config().clone())
}

/// Replace the simulation configuration.
///
/// Validation fails fast without touching the running engine; a valid config
/// stops the timer and rebuilds the engine from scratch.
pub async fn post_config(
    State(state): State<AppState>,
    Json(config): Json<SimConfig>,
) -> Result<Json<SimConfig>, AppError> {
    let replacement = Engine::new(config)?;
    state.runner.stop().await;
    let mut engine = state.engine.lock().await;
    *engine = replacement;
    Ok(Json(engine.config().clone()))
}
