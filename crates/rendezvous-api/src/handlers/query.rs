//! /query handler: list live peers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use rendezvous_services::QueryParams;

use super::{error_response, ApiState};

#[derive(Serialize)]
pub struct QueryResponse {
    pub now: i32,
    pub peers: Vec<String>,
}

pub async fn handle_query(
    State(state): State<ApiState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<QueryResponse>, (StatusCode, String)> {
    let result = state.registry.query(&params).await.map_err(error_response)?;

    Ok(Json(QueryResponse {
        now: result.now,
        peers: result.peers.iter().map(|p| p.to_string()).collect(),
    }))
}
