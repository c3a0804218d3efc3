//! Axum router wiring.

use axum::{
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/authorize", post(transport::http::authorize))
        .route("/v1/allowed-actions", get(transport::http::allowed_actions))
        .route("/v1/refresh", post(transport::http::refresh))
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .with_state(state)
}
