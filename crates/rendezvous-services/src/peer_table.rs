//! Peer table: one shard of the registry.
//!
//! Maps a [`PeerKey`] to a packed liveness record. Writers (`upsert`,
//! `decay`) hold the write lock for their whole operation; `list` holds the
//! read lock, so concurrent queries run in parallel and never observe a
//! half-applied sweep.

use std::collections::HashMap;

use tokio::sync::RwLock;

use rendezvous_core::record::{decode, encode};
use rendezvous_core::{Family, LivenessRecord, PeerKey, Subnet};

pub struct PeerTable {
    family: Family,
    entries: RwLock<HashMap<PeerKey, u64>>,
}

impl PeerTable {
    pub fn new(family: Family) -> Self {
        Self {
            family,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn family(&self) -> Family {
        self.family
    }

    /// Insert a new record or refresh an existing one.
    ///
    /// Same port: the stored timestamp is kept and only the ttl is reset.
    /// Different port (or new key): timestamp, port, and ttl are all replaced.
    /// Returns the timestamp left in the table.
    pub async fn upsert(&self, key: PeerKey, observed: i32, port: u16, initial_ttl: u8) -> i32 {
        let mut entries = self.entries.write().await;
        let timestamp = match entries.get(&key).map(|packed| decode(*packed)) {
            Some((since, stored_port, _)) if stored_port == port => since,
            _ => observed,
        };
        entries.insert(key, encode(timestamp, port, initial_ttl));
        timestamp
    }

    /// Subtract `delta` from every ttl and drop records that run out.
    ///
    /// Returns the keys that were removed.
    pub async fn decay(&self, delta: u8) -> Vec<PeerKey> {
        let mut expired = Vec::new();
        let mut entries = self.entries.write().await;
        entries.retain(|key, packed| {
            let (timestamp, port, ttl) = decode(*packed);
            if ttl <= delta {
                expired.push(*key);
                false
            } else {
                *packed = encode(timestamp, port, ttl - delta);
                true
            }
        });
        expired
    }

    /// Records with `timestamp >= since`, matching `port` (0 = any) and
    /// inside `subnet`. Order is unspecified.
    pub async fn list(&self, since: i32, port: u16, subnet: &Subnet) -> Vec<(PeerKey, u16)> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .filter_map(|(key, packed)| {
                let (timestamp, stored_port, _) = decode(*packed);
                let wanted = timestamp >= since
                    && (port == 0 || port == stored_port)
                    && (subnet.is_any() || subnet.contains(key));
                wanted.then_some((*key, stored_port))
            })
            .collect()
    }

    pub async fn get(&self, key: &PeerKey) -> Option<LivenessRecord> {
        self.entries
            .read()
            .await
            .get(key)
            .map(|packed| LivenessRecord::unpack(*packed))
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
