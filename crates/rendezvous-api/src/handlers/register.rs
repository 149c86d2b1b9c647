//! /register handler: record the caller as a live peer.

use std::net::SocketAddr;

use axum::extract::rejection::FormRejection;
use axum::extract::{ConnectInfo, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::{Form, Json};
use serde::Serialize;

use rendezvous_core::Protocol;
use rendezvous_services::RegisterParams;

use super::{caller_ip, error_response, ApiState};

#[derive(Serialize)]
pub struct RegisterResponse {
    pub peer: String,
    pub timestamp: i32,
    pub ttl: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<Protocol>,
}

/// Parameters come from the query string, an urlencoded body, or both.
/// Body fields win over query fields.
pub async fn handle_register(
    State(state): State<ApiState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Query(query): Query<RegisterParams>,
    body: Result<Form<RegisterParams>, FormRejection>,
) -> Result<Json<RegisterResponse>, (StatusCode, String)> {
    let params = match body {
        Ok(Form(form)) => RegisterParams {
            port: form.port.or(query.port),
            protocol: form.protocol.or(query.protocol),
        },
        // No urlencoded body: the query string is all there is.
        Err(FormRejection::InvalidFormContentType(_)) => query,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected register body");
            return Err((rejection.status(), rejection.body_text()));
        }
    };

    let ip = caller_ip(&state, &headers, remote).map_err(error_response)?;

    let registration = state
        .registry
        .register(ip, &params)
        .await
        .map_err(error_response)?;

    Ok(Json(RegisterResponse {
        peer: registration.peer.to_string(),
        timestamp: registration.timestamp,
        ttl: registration.ttl,
        protocol: registration.protocol,
    }))
}
