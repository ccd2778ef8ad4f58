use axum::extract::{Path, State};
use axum::Json;

use crate::api::AppState;
use crate::domain::NominationId;
use crate::engine::Nomination;
use crate::error::{AppError, EngineError};

/// All nominations, oldest first, regardless of state.
pub async fn get_nominations(State(state): State<AppState>) -> Json<Vec<Nomination>> {
    let engine = state.engine.lock().await;
    Json(engine.nominations().cloned().collect())
}

/// Confirm a proposed nomination.
///
/// The gateway must acknowledge before the ledger mutates; a gateway failure
/// surfaces as 503 and the nomination stays proposed, so the call is safe to
/// retry.
pub async fn post_confirm(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Nomination>, AppError> {
    let nomination_id = NominationId::new(id);
    state
        .gateway
        .confirm(&nomination_id)
        .await
        .map_err(EngineError::from)?;
    let mut engine = state.engine.lock().await;
    let nomination = engine.confirm_successor(&nomination_id)?;
    Ok(Json(nomination))
}

/// Decline a proposed nomination. Same gateway-first ordering as confirm.
pub async fn post_decline(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Nomination>, AppError> {
    let nomination_id = NominationId::new(id);
    state
        .gateway
        .decline(&nomination_id)
        .await
        .map_err(EngineError::from)?;
    let mut engine = state.engine.lock().await;
    let nomination = engine.decline_successor(&nomination_id)?;
    Ok(Json(nomination))
}
