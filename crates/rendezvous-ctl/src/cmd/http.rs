//! Shared HTTP request helpers for CLI commands.

use anyhow::{bail, Context, Result};
use serde::Deserialize;

pub fn base_url(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("http://[{}]:{}/api", host, port)
    } else {
        format!("http://{}:{}/api", host, port)
    }
}

/// Decode a JSON body, surfacing the server's error text on non-2xx.
async fn read_json<T: for<'de> Deserialize<'de>>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        bail!("server returned {}: {}", status, text);
    }
    resp.json::<T>().await.context("failed to parse response")
}

pub async fn get_json<T: for<'de> Deserialize<'de>>(
    url: &str,
    query: &[(&str, String)],
) -> Result<T> {
    let resp = reqwest::Client::new()
        .get(url)
        .query(query)
        .send()
        .await
        .with_context(|| format!("failed to connect to rendezvousd at {}; is it running?", url))?;
    read_json(resp).await
}

pub async fn post_json<T: for<'de> Deserialize<'de>>(
    url: &str,
    query: &[(&str, String)],
) -> Result<T> {
    let resp = reqwest::Client::new()
        .post(url)
        .query(query)
        .send()
        .await
        .with_context(|| format!("failed to connect to rendezvousd at {}; is it running?", url))?;
    read_json(resp).await
}
