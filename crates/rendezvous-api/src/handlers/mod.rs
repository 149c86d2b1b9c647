//! HTTP API handlers: expose the registry as JSON.

pub mod query;
pub mod register;
pub mod status;

use std::net::{IpAddr, SocketAddr};

use axum::http::{HeaderMap, HeaderName, StatusCode};

use rendezvous_core::RegistryError;
use rendezvous_services::SharedRegistry;

#[derive(Clone)]
pub struct ApiState {
    pub registry: SharedRegistry,
    /// When set, the caller address is read from this header rather than
    /// from the TCP peer.
    pub forwarded_header: Option<HeaderName>,
}

impl ApiState {
    pub fn new(registry: SharedRegistry) -> Self {
        Self {
            registry,
            forwarded_header: None,
        }
    }

    /// Trust `header` for the caller address. Fails if the name is not a
    /// valid HTTP header name.
    pub fn with_forwarded_header(mut self, header: &str) -> anyhow::Result<Self> {
        self.forwarded_header = Some(HeaderName::try_from(header)?);
        Ok(self)
    }
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Map a registry failure to a status code and message.
fn error_response(err: RegistryError) -> (StatusCode, String) {
    match &err {
        RegistryError::InvalidArgument(_) => {
            tracing::debug!(error = %err, "rejected request");
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        RegistryError::AddressResolution(_) => {
            tracing::error!(error = %err, "could not determine caller address");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

/// Resolve the caller's address from the forwarded header if configured,
/// otherwise from the connection.
fn caller_ip(
    state: &ApiState,
    headers: &HeaderMap,
    remote: SocketAddr,
) -> Result<IpAddr, RegistryError> {
    let Some(name) = &state.forwarded_header else {
        return Ok(remote.ip());
    };

    let value = headers
        .get(name)
        .ok_or_else(|| RegistryError::AddressResolution(format!("header '{name}' missing")))?;
    let value = value
        .to_str()
        .map_err(|_| RegistryError::AddressResolution(format!("header '{name}' is not text")))?;

    // X-Forwarded-For style lists put the original client first.
    let first = value.split(',').next().unwrap_or_default().trim();
    first.parse().map_err(|_| {
        RegistryError::AddressResolution(format!("'{first}' from header '{name}' is not an IP"))
    })
}

// Re-export handler functions for use in router setup.
pub use query::handle_query;
pub use register::handle_register;
pub use status::handle_status;
