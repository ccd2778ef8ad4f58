pub mod control;
pub mod events;
pub mod health;
pub mod history;
pub mod nominations;
pub mod positions;
pub mod state;
pub mod tree;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

use crate::engine::Engine;
use crate::gateway::NominationGateway;
use crate::runner::Runner;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Mutex<Engine>>,
    pub runner: Arc<Runner>,
    pub gateway: Arc<dyn NominationGateway>,
}

impl AppState {
    pub fn new(engine: Arc<Mutex<Engine>>, gateway: Arc<dyn NominationGateway>) -> Self {
        let runner = Arc::new(Runner::new(Arc::clone(&engine)));
        Self {
            engine,
            runner,
            gateway,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/state", get(state::get_state))
        .route("/v1/step", post(control::post_step))
        .route("/v1/start", post(control::post_start))
        .route("/v1/stop", post(control::post_stop))
        .route("/v1/reset", post(control::post_reset))
        .route("/v1/config", get(control::get_config).post(control::post_config))
        .route("/v1/tree", get(tree::get_tree))
        .route("/v1/members/:id/positions", get(positions::get_member_positions))
        .route("/v1/events", get(events::get_events))
        .route("/v1/history", get(history::get_history))
        .route("/v1/nominations", get(nominations::get_nominations))
        .route(
            "/v1/nominations/:id/confirm",
            post(nominations::post_confirm),
        )
        .route(
            "/v1/nominations/:id/decline",
            post(nominations::post_decline),
        )
        .layer(cors)
        .with_state(state)
}
