//! Registration and query handling over the two address-family shards.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use rendezvous_core::config::RegistryConfig;
use rendezvous_core::{Family, PeerKey, Protocol, RegistryError, Subnet};

use crate::{PeerTable, ServerClock};

/// The registry shared between the HTTP handlers and the decay task.
pub type SharedRegistry = Arc<Registry>;

/// Outcome of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    /// Rendered as `ip:port` or `[ip]:port`.
    pub peer: SocketAddr,
    /// Server time since which this (address, port) has been continuously seen.
    pub timestamp: i32,
    pub ttl: u8,
    /// Transport the peer declared, if any. Validated but not stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<Protocol>,
}

/// Raw registration parameters, validated by [`Registry::register`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterParams {
    pub port: Option<String>,
    pub protocol: Option<String>,
}

impl RegisterParams {
    pub fn with_port(port: &str) -> Self {
        Self {
            port: Some(port.to_string()),
            protocol: None,
        }
    }
}

/// Raw query-string filters. Every field is optional and validated by
/// [`Registry::query`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryParams {
    pub since: Option<String>,
    pub prefer: Option<String>,
    pub port: Option<String>,
    pub subnet4: Option<String>,
    pub subnet6: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryResult {
    /// Current server time.
    pub now: i32,
    /// Preferred family first, each family sorted by address.
    pub peers: Vec<SocketAddr>,
}

/// Filters after validation.
struct QueryFilter {
    since: i32,
    prefer: Family,
    port: u16,
    subnet4: Subnet,
    subnet6: Subnet,
}

pub struct Registry {
    v4: PeerTable,
    v6: PeerTable,
    clock: ServerClock,
    config: RegistryConfig,
}

impl Registry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            v4: PeerTable::new(Family::V4),
            v6: PeerTable::new(Family::V6),
            clock: ServerClock::start(),
            config,
        }
    }

    pub fn shared(config: RegistryConfig) -> SharedRegistry {
        Arc::new(Self::new(config))
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn clock(&self) -> &ServerClock {
        &self.clock
    }

    pub fn now(&self) -> i32 {
        self.clock.now()
    }

    pub fn table(&self, family: Family) -> &PeerTable {
        match family {
            Family::V4 => &self.v4,
            Family::V6 => &self.v6,
        }
    }

    /// Record `caller` as alive at the current server time.
    pub async fn register(
        &self,
        caller: IpAddr,
        params: &RegisterParams,
    ) -> Result<Registration, RegistryError> {
        self.register_at(caller, params, self.now()).await
    }

    /// Record `caller` as alive at server time `now`.
    pub async fn register_at(
        &self,
        caller: IpAddr,
        params: &RegisterParams,
        now: i32,
    ) -> Result<Registration, RegistryError> {
        let port = match params.port.as_deref() {
            Some(raw) => parse_port(raw)?,
            None => self.config.default_port,
        };
        let protocol = params
            .protocol
            .as_deref()
            .map(str::parse::<Protocol>)
            .transpose()?;

        let (family, key) = PeerKey::from_ip(caller);
        let ttl = self.config.initial_ttl;
        let timestamp = self.table(family).upsert(key, now, port, ttl).await;

        let peer = SocketAddr::new(key.to_ip(family), port);
        tracing::debug!(%peer, timestamp, ttl, ?protocol, "peer registered");

        Ok(Registration {
            peer,
            timestamp,
            ttl,
            protocol,
        })
    }

    /// List live peers matching `params`.
    pub async fn query(&self, params: &QueryParams) -> Result<QueryResult, RegistryError> {
        self.query_at(params, self.now()).await
    }

    /// Same as [`Registry::query`], reporting `now` as the server time.
    pub async fn query_at(
        &self,
        params: &QueryParams,
        now: i32,
    ) -> Result<QueryResult, RegistryError> {
        let filter = QueryFilter::parse(params)?;
        tracing::trace!(
            since = filter.since,
            prefer = %filter.prefer,
            port = filter.port,
            subnet4 = %filter.subnet4,
            subnet6 = %filter.subnet6,
            "query"
        );

        let mut peers = Vec::new();
        for family in [filter.prefer, filter.prefer.other()] {
            let subnet = match family {
                Family::V4 => &filter.subnet4,
                Family::V6 => &filter.subnet6,
            };
            let mut found = self.table(family).list(filter.since, filter.port, subnet).await;
            found.sort_unstable();
            peers.extend(
                found
                    .into_iter()
                    .map(|(key, port)| SocketAddr::new(key.to_ip(family), port)),
            );
        }

        Ok(QueryResult { now, peers })
    }

    /// Run one decay step of `expire_period` over both shards.
    ///
    /// Returns the addresses that expired.
    pub async fn sweep(&self) -> Vec<IpAddr> {
        let delta = self.config.expire_period;
        let mut expired = Vec::new();
        for table in [&self.v4, &self.v6] {
            let family = table.family();
            expired.extend(
                table
                    .decay(delta)
                    .await
                    .into_iter()
                    .map(|key| key.to_ip(family)),
            );
        }
        expired
    }
}

impl QueryFilter {
    fn parse(params: &QueryParams) -> Result<Self, RegistryError> {
        let since = match params.since.as_deref() {
            Some(raw) => raw
                .parse::<i32>()
                .map_err(|_| RegistryError::invalid(format!("'{raw}' is not a timestamp")))?,
            None => 0,
        };
        let prefer = match params.prefer.as_deref() {
            Some(raw) => raw.parse::<Family>()?,
            None => Family::V4,
        };
        let port = match params.port.as_deref() {
            Some(raw) => parse_port(raw)?,
            None => 0,
        };
        let subnet4 = match params.subnet4.as_deref() {
            Some(raw) => Subnet::parse(raw, Family::V4)?,
            None => Subnet::any(Family::V4),
        };
        let subnet6 = match params.subnet6.as_deref() {
            Some(raw) => Subnet::parse(raw, Family::V6)?,
            None => Subnet::any(Family::V6),
        };

        Ok(Self {
            since,
            prefer,
            port,
            subnet4,
            subnet6,
        })
    }
}

fn parse_port(raw: &str) -> Result<u16, RegistryError> {
    raw.parse::<u16>()
        .map_err(|_| RegistryError::invalid(format!("'{raw}' is not a port number")))
}
