//! Axum router wiring (HTTP -> WS upgrade).
//!
//! Two routes: `/v1/chat` for named tables, `/v1/match` for FIFO pairing.

use axum::{routing::get, Router};

use crate::{app_state::AppState, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/chat", get(transport::ws::chat_upgrade))
        .route("/v1/match", get(transport::ws::match_upgrade))
        .with_state(state)
}
