//! /status handler: health and registry size.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use rendezvous_core::Family;

use super::ApiState;

#[derive(Serialize)]
pub struct StatusResponse {
    pub version: &'static str,
    pub uptime_secs: u64,
    pub peers_v4: usize,
    pub peers_v6: usize,
    pub initial_ttl: u8,
    pub expire_period: u8,
}

pub async fn handle_status(State(state): State<ApiState>) -> Json<StatusResponse> {
    let registry = &state.registry;
    let config = registry.config();

    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: registry.clock().epoch().elapsed().as_secs(),
        peers_v4: registry.table(Family::V4).len().await,
        peers_v6: registry.table(Family::V6).len().await,
        initial_ttl: config.initial_ttl,
        expire_period: config.expire_period,
    })
}
