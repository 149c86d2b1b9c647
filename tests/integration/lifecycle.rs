use crate::*;

use rendezvous_core::Family;
use rendezvous_services::decay;

const XFF: &str = "x-forwarded-for";

/// Entries registered over HTTP disappear once the decay task has
/// subtracted their full ttl.
#[tokio::test]
async fn test_registered_peer_expires_via_decay_task() {
    let config = RegistryConfig {
        initial_ttl: 20,
        expire_period: 10,
        default_port: 443,
    };
    let server = TestServer::start_with("127.0.0.1", config, None).await.unwrap();
    server.register(None, None).await.unwrap();
    assert_eq!(server.peers(&[]).await.unwrap().len(), 1);

    // Tick fast; each tick still removes one expire_period of ttl.
    let decay_task = tokio::spawn(decay::run(
        server.registry.clone(),
        Duration::from_millis(20),
        server.shutdown.subscribe(),
    ));

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        if server.peers(&[]).await.unwrap().is_empty() {
            break;
        }
        assert!(tokio::time::Instant::now() < deadline, "peer never expired");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    server.stop().await;
    let _ = tokio::time::timeout(Duration::from_secs(1), decay_task).await;
}

/// Registration refreshes ttl, so a peer that keeps registering survives
/// sweeps that would otherwise expire it.
#[tokio::test]
async fn test_refresh_outlives_initial_ttl() {
    let config = RegistryConfig {
        initial_ttl: 20,
        expire_period: 10,
        default_port: 443,
    };
    let server = TestServer::start_with("127.0.0.1", config, Some(XFF)).await.unwrap();
    let from = Some((XFF, "203.0.113.7"));

    server.register(None, from).await.unwrap();
    for _ in 0..5 {
        server.registry.sweep().await;
        server.register(None, from).await.unwrap();
    }
    assert_eq!(server.peers(&[]).await.unwrap(), vec!["203.0.113.7:443"]);

    server.registry.sweep().await;
    server.registry.sweep().await;
    assert!(server.peers(&[]).await.unwrap().is_empty());

    server.stop().await;
}

/// Concurrent registrations from distinct addresses are all kept.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations() {
    let server = TestServer::start_forwarded(XFF).await.unwrap();
    let client = reqwest::Client::new();

    let mut handles = Vec::new();
    for i in 1..=50u8 {
        let client = client.clone();
        let url = server.url("/register");
        handles.push(tokio::spawn(async move {
            client
                .post(url)
                .header(XFF, format!("10.9.0.{i}"))
                .send()
                .await
                .map(|r| r.status().as_u16())
        }));
    }
    for h in handles {
        assert_eq!(h.await.unwrap().unwrap(), 200);
    }

    assert_eq!(server.registry.table(Family::V4).len().await, 50);
    assert_eq!(server.peers(&[("subnet4", "10.9.0.0/24")]).await.unwrap().len(), 50);

    server.stop().await;
}
