//! rendezvousd: peer rendezvous registry daemon.

use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, Result};
use tokio::net::TcpListener;

use rendezvous_core::config::RendezvousConfig;
use rendezvous_services::{decay_loop, Registry};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config
    if let Err(e) = RendezvousConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let config = RendezvousConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        RendezvousConfig::default()
    });
    config.validate().context("invalid configuration")?;

    tracing::info!(
        initial_ttl = config.registry.initial_ttl,
        expire_period = config.registry.expire_period,
        default_port = config.registry.default_port,
        "rendezvousd starting"
    );

    // Shared state
    let registry = Registry::shared(config.registry.clone());

    let mut state = rendezvous_api::ApiState::new(registry.clone());
    if let Some(header) = &config.network.forwarded_header {
        state = state
            .with_forwarded_header(header)
            .with_context(|| format!("invalid forwarded_header '{header}'"))?;
        tracing::warn!(header = %header, "caller addresses taken from request header");
    }

    let listen_ip: IpAddr = config
        .network
        .listen_addr
        .parse()
        .with_context(|| format!("invalid listen_addr '{}'", config.network.listen_addr))?;
    let listener = TcpListener::bind(SocketAddr::new(listen_ip, config.network.api_port))
        .await
        .context("failed to bind API listener")?;

    // ── Shutdown channel ─────────────────────────────────────────────────────
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::broadcast::channel::<()>(1);

    {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutdown signal received");
            let _ = shutdown.send(());
        });
    }

    // ── Spawn tasks ──────────────────────────────────────────────────────────

    let mut decay_task = tokio::spawn(decay_loop(registry.clone(), shutdown_tx.subscribe()));

    let mut api_task = {
        let shutdown = shutdown_tx.subscribe();
        tokio::spawn(async move {
            if let Err(e) = rendezvous_api::serve(state, listener, shutdown).await {
                tracing::error!(error = %e, "API server failed");
            }
        })
    };

    // ── Wait for exit ────────────────────────────────────────────────────────

    tokio::select! {
        biased;
        _ = shutdown_rx.recv()  => tracing::info!("shutting down"),
        r = &mut decay_task     => tracing::error!("decay task exited: {:?}", r),
        r = &mut api_task       => tracing::error!("API task exited: {:?}", r),
    }

    // Stop whichever task is still running.
    let _ = shutdown_tx.send(());
    for task in [decay_task, api_task] {
        if !task.is_finished() {
            let _ = task.await;
        }
    }

    tracing::info!("shut down");
    Ok(())
}
