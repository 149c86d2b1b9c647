//! Peer identity: an IP address in a fixed 16-byte field.
//!
//! IPv4 addresses occupy the first four bytes and leave the rest zero.
//! A key is only meaningful together with its [`Family`]; the registry keeps
//! one table per family so v4 bytes are never compared against v6 bytes.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use crate::RegistryError;

/// Address family of a peer, and the shard it lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    V4,
    V6,
}

impl Family {
    /// Address width in bits.
    pub fn bits(self) -> u8 {
        match self {
            Family::V4 => 32,
            Family::V6 => 128,
        }
    }

    pub fn other(self) -> Self {
        match self {
            Family::V4 => Family::V6,
            Family::V6 => Family::V4,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::V4 => f.write_str("4"),
            Family::V6 => f.write_str("6"),
        }
    }
}

impl FromStr for Family {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "4" => Ok(Family::V4),
            "6" => Ok(Family::V6),
            other => Err(RegistryError::invalid(format!(
                "expected address family '4' or '6', got '{other}'"
            ))),
        }
    }
}

/// Raw address bytes of a registered peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerKey([u8; 16]);

impl PeerKey {
    /// Build a key from an address, canonicalizing IPv4-mapped IPv6 first.
    pub fn from_ip(ip: IpAddr) -> (Family, Self) {
        match ip.to_canonical() {
            IpAddr::V4(v4) => (Family::V4, Self::from_v4(v4)),
            IpAddr::V6(v6) => (Family::V6, Self::from_v6(v6)),
        }
    }

    pub fn from_v4(ip: Ipv4Addr) -> Self {
        let mut bytes = [0u8; 16];
        bytes[..4].copy_from_slice(&ip.octets());
        Self(bytes)
    }

    pub fn from_v6(ip: Ipv6Addr) -> Self {
        Self(ip.octets())
    }

    /// Interpret the key in the given family.
    pub fn to_ip(&self, family: Family) -> IpAddr {
        match family {
            Family::V4 => IpAddr::V4(Ipv4Addr::new(
                self.0[0], self.0[1], self.0[2], self.0[3],
            )),
            Family::V6 => IpAddr::V6(Ipv6Addr::from(self.0)),
        }
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}
