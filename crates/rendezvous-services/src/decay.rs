//! Decay scheduler.
//!
//! One timer for the whole registry: every `expire_period` seconds each shard
//! loses `expire_period` of ttl. A late tick still subtracts only the nominal
//! period, so peers may outlive their ttl while the runtime is starved.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::SharedRegistry;

/// Sweep the registry every `expire_period` seconds until shutdown.
pub async fn decay_loop(registry: SharedRegistry, shutdown: broadcast::Receiver<()>) {
    let period = Duration::from_secs(registry.config().expire_period as u64);
    run(registry, period, shutdown).await
}

/// Sweep on a caller-chosen tick. Each tick still subtracts `expire_period`.
pub async fn run(registry: SharedRegistry, tick: Duration, mut shutdown: broadcast::Receiver<()>) {
    let mut interval = time::interval_at(time::Instant::now() + tick, tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(
        period_ms = tick.as_millis() as u64,
        delta = registry.config().expire_period,
        "decay scheduler starting"
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let expired = registry.sweep().await;
                if !expired.is_empty() {
                    tracing::debug!(removed = expired.len(), "expired registry entries");
                    for ip in &expired {
                        tracing::trace!(%ip, "peer expired");
                    }
                }
            }
            _ = shutdown.recv() => {
                tracing::info!("decay scheduler stopping");
                break;
            }
        }
    }
}
