//! Register this machine with the registry.

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use super::http::post_json;

#[derive(Deserialize)]
struct RegisterResponse {
    peer: String,
    timestamp: i32,
    ttl: u8,
    protocol: Option<String>,
}

/// Turn `[<port>] [--protocol <p>]` into register query pairs.
pub fn parse_register_args(args: &[&str]) -> Result<Vec<(&'static str, String)>> {
    let mut query = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i] {
            "--protocol" => {
                i += 1;
                let protocol = args.get(i).context("--protocol requires a value")?;
                query.push(("protocol", protocol.to_string()));
            }
            flag if flag.starts_with("--") => bail!("unknown register option: {flag}"),
            port => {
                if query.iter().any(|(k, _)| *k == "port") {
                    bail!("only one port may be declared");
                }
                let port: u16 = port
                    .parse()
                    .context("port must be a number between 0 and 65535")?;
                query.push(("port", port.to_string()));
            }
        }
        i += 1;
    }
    Ok(query)
}

pub async fn cmd_register(base: &str, args: &[&str]) -> Result<()> {
    let query = parse_register_args(args)?;

    let resp: RegisterResponse = post_json(&format!("{}/register", base), &query).await?;

    println!("✓ Registered as {}", resp.peer);
    println!("  seen since : t={}", resp.timestamp);
    println!("  ttl        : {}s", resp.ttl);
    if let Some(protocol) = resp.protocol {
        println!("  protocol   : {}", protocol);
    }

    Ok(())
}
