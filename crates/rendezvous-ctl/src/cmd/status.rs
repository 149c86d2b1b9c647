//! Daemon status.

use anyhow::Result;
use serde::Deserialize;

use super::http::get_json;

#[derive(Deserialize)]
struct StatusResponse {
    version: String,
    uptime_secs: u64,
    peers_v4: usize,
    peers_v6: usize,
    initial_ttl: u8,
    expire_period: u8,
}

pub async fn cmd_status(base: &str) -> Result<()> {
    let resp: StatusResponse = get_json(&format!("{}/status", base), &[]).await?;

    println!("═══════════════════════════════════════");
    println!("  rendezvousd {}", resp.version);
    println!("═══════════════════════════════════════");
    println!("  Uptime        : {}s", resp.uptime_secs);
    println!("  IPv4 peers    : {}", resp.peers_v4);
    println!("  IPv6 peers    : {}", resp.peers_v6);
    println!("  Initial TTL   : {}s", resp.initial_ttl);
    println!("  Expire period : {}s", resp.expire_period);

    Ok(())
}
