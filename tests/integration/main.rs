//! Rendezvous integration test harness.
//!
//! Each test starts the real HTTP API in-process on an ephemeral loopback
//! port and talks to it over TCP:
//!
//!   cargo test --test integration
//!
//! IPv6 cases need a usable `::1` and skip themselves otherwise.

mod lifecycle;

use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use rendezvous_api::ApiState;
use rendezvous_core::config::RegistryConfig;
use rendezvous_services::{Registry, SharedRegistry};

// ── Harness ───────────────────────────────────────────────────────────────────

/// A running API server. Dropping it signals shutdown.
pub struct TestServer {
    pub base: String,
    pub registry: SharedRegistry,
    pub shutdown: broadcast::Sender<()>,
    task: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Serve on 127.0.0.1 with default registry settings.
    pub async fn start() -> Result<Self> {
        Self::start_with("127.0.0.1", RegistryConfig::default(), None).await
    }

    /// Serve trusting `header` for caller addresses, so tests can register
    /// arbitrary IPv4 and IPv6 peers from loopback.
    pub async fn start_forwarded(header: &str) -> Result<Self> {
        Self::start_with("127.0.0.1", RegistryConfig::default(), Some(header)).await
    }

    pub async fn start_with(
        bind: &str,
        config: RegistryConfig,
        forwarded_header: Option<&str>,
    ) -> Result<Self> {
        let listener = TcpListener::bind((bind, 0))
            .await
            .with_context(|| format!("failed to bind {bind}"))?;
        let addr = listener.local_addr()?;

        let registry = Registry::shared(config);
        let mut state = ApiState::new(registry.clone());
        if let Some(header) = forwarded_header {
            state = state.with_forwarded_header(header)?;
        }

        let (shutdown, rx) = broadcast::channel(1);
        let task = tokio::spawn(async move {
            if let Err(e) = rendezvous_api::serve(state, listener, rx).await {
                eprintln!("test server failed: {e}");
            }
        });

        let base = match addr {
            std::net::SocketAddr::V4(_) => format!("http://{addr}/api"),
            std::net::SocketAddr::V6(v6) => format!("http://[{}]:{}/api", v6.ip(), v6.port()),
        };

        Ok(Self {
            base,
            registry,
            shutdown,
            task: Some(task),
        })
    }

    /// Signal shutdown and wait for the server task to finish.
    pub async fn stop(mut self) {
        let _ = self.shutdown.send(());
        if let Some(task) = self.task.take() {
            let _ = tokio::time::timeout(Duration::from_secs(5), task).await;
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// POST /register, optionally impersonating `from` via the forwarded header.
    pub async fn register(
        &self,
        port: Option<&str>,
        from: Option<(&str, &str)>,
    ) -> Result<(u16, String)> {
        let mut req = reqwest::Client::new().post(self.url("/register"));
        if let Some(port) = port {
            req = req.query(&[("port", port)]);
        }
        if let Some((header, ip)) = from {
            req = req.header(header, ip);
        }
        let resp = req.send().await.context("register request failed")?;
        Ok((resp.status().as_u16(), resp.text().await?))
    }

    /// GET /query with the given filters.
    pub async fn query(&self, filters: &[(&str, &str)]) -> Result<(u16, String)> {
        let resp = reqwest::Client::new()
            .get(self.url("/query"))
            .query(filters)
            .send()
            .await
            .context("query request failed")?;
        Ok((resp.status().as_u16(), resp.text().await?))
    }

    /// Peers from a successful query, in response order.
    pub async fn peers(&self, filters: &[(&str, &str)]) -> Result<Vec<String>> {
        let (status, body) = self.query(filters).await?;
        anyhow::ensure!(status == 200, "query failed with {status}: {body}");
        let json: Value = serde_json::from_str(&body)?;
        Ok(json["peers"]
            .as_array()
            .context("peers is not an array")?
            .iter()
            .filter_map(|p| p.as_str().map(str::to_string))
            .collect())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.shutdown.send(());
    }
}

/// Whether the host can bind the IPv6 loopback.
pub fn ipv6_loopback_available() -> bool {
    std::net::TcpListener::bind("[::1]:0").is_ok()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

/// The server comes up and reports an empty registry.
#[tokio::test]
async fn test_status_on_fresh_server() {
    let server = TestServer::start().await.expect("server should start");

    let json: Value = reqwest::get(server.url("/status"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(json["peers_v4"], 0);
    assert_eq!(json["peers_v6"], 0);
    assert_eq!(json["initial_ttl"], 60);
    assert_eq!(json["expire_period"], 10);
    assert!(json["version"].is_string());

    server.stop().await;
}

/// Unknown routes are not served.
#[tokio::test]
async fn test_unknown_route_is_404() {
    let server = TestServer::start().await.unwrap();
    let resp = reqwest::get(server.url("/broadcast")).await.unwrap();
    assert_eq!(resp.status().as_u16(), 404);
    server.stop().await;
}
