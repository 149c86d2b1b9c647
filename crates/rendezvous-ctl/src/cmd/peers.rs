//! List peers known to the registry.

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use super::http::get_json;

#[derive(Deserialize)]
struct QueryResponse {
    now: i32,
    peers: Vec<String>,
}

/// Translate `--since`, `--prefer`, `--filter-port`, `--subnet4`, `--subnet6`
/// into query-string pairs.
pub fn parse_filters(args: &[&str]) -> Result<Vec<(&'static str, String)>> {
    let mut query = Vec::new();
    let mut i = 0;
    while i < args.len() {
        let key = match args[i] {
            "--since" => "since",
            "--prefer" => "prefer",
            "--filter-port" => "port",
            "--subnet4" => "subnet4",
            "--subnet6" => "subnet6",
            other => bail!("unknown peers option: {}", other),
        };
        i += 1;
        let value = args
            .get(i)
            .with_context(|| format!("{} requires a value", args[i - 1]))?;
        query.push((key, value.to_string()));
        i += 1;
    }
    Ok(query)
}

pub async fn cmd_peers(base: &str, args: &[&str]) -> Result<()> {
    let query = parse_filters(args)?;
    let resp: QueryResponse = get_json(&format!("{}/query", base), &query).await?;

    if resp.peers.is_empty() {
        println!("No live peers (server time t={}).", resp.now);
        return Ok(());
    }

    println!("═══════════════════════════════════════");
    println!("  Live Peers ({}) at t={}", resp.peers.len(), resp.now);
    println!("═══════════════════════════════════════");
    for peer in &resp.peers {
        println!("  {}", peer);
    }

    Ok(())
}
