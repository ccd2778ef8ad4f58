use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::AppState;
use crate::domain::{EventBody, LedgerEvent, TimeMs};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    pub id: uuid::Uuid,
    pub at: TimeMs,
    pub message: String,
    #[serde(flatten)]
    pub body: EventBody,
}

impl From<&LedgerEvent> for EventDto {
    fn from(event: &LedgerEvent) -> Self {
        Self {
            id: event.id,
            at: event.at,
            message: event.body.message(),
            body: event.body.clone(),
        }
    }
}

/// Bounded event log, newest first.
pub async fn get_events(State(state): State<AppState>) -> Json<Vec<EventDto>> {
    let engine = state.engine.lock().await;
    Json(engine.events().map(EventDto::from).collect())
}
