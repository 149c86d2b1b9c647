pub mod handlers;

use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};

pub use handlers::ApiState;

/// Build the `/api` router.
pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/register", post(handlers::handle_register))
        .route("/query", get(handlers::handle_query))
        .route("/status", get(handlers::handle_status))
        .with_state(state);

    Router::new().nest("/api", api_routes).layer(cors)
}

/// Serve the API on `listener` until `shutdown` fires.
pub async fn serve(
    state: ApiState,
    listener: TcpListener,
    mut shutdown: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "API listening");

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        let _ = shutdown.recv().await;
    })
    .await?;

    tracing::info!("API stopped");
    Ok(())
}
