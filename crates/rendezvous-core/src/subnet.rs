//! CIDR filters used to narrow query results.

use std::fmt;
use std::net::IpAddr;

use crate::{Family, PeerKey, RegistryError};

/// A family-scoped CIDR block. Never stored; only used at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subnet {
    family: Family,
    base: PeerKey,
    prefix: u8,
}

impl Subnet {
    /// The block covering the whole address space of `family`.
    pub fn any(family: Family) -> Self {
        let base = match family {
            Family::V4 => PeerKey::from_v4(std::net::Ipv4Addr::UNSPECIFIED),
            Family::V6 => PeerKey::from_v6(std::net::Ipv6Addr::UNSPECIFIED),
        };
        Self {
            family,
            base,
            prefix: 0,
        }
    }

    /// Parse `addr/prefix` and check it belongs to `family`.
    ///
    /// Host bits in the address are cleared, so `10.1.2.3/8` means `10.0.0.0/8`.
    pub fn parse(s: &str, family: Family) -> Result<Self, RegistryError> {
        let (addr, prefix) = s
            .split_once('/')
            .ok_or_else(|| RegistryError::invalid(format!("'{s}' is not in CIDR notation")))?;

        let ip: IpAddr = addr
            .parse()
            .map_err(|_| RegistryError::invalid(format!("'{addr}' is not an IP address")))?;
        let prefix: u8 = prefix
            .parse()
            .map_err(|_| RegistryError::invalid(format!("'{prefix}' is not a prefix length")))?;

        // No canonicalization here: ::ffff:a.b.c.d/120 is a v6 block.
        let (ip_family, key) = match ip {
            IpAddr::V4(v4) => (Family::V4, PeerKey::from_v4(v4)),
            IpAddr::V6(v6) => (Family::V6, PeerKey::from_v6(v6)),
        };
        if ip_family != family {
            return Err(RegistryError::invalid(format!(
                "subnet '{s}' is not an IPv{family} block"
            )));
        }
        if prefix > family.bits() {
            return Err(RegistryError::invalid(format!(
                "prefix /{prefix} exceeds {} bits",
                family.bits()
            )));
        }

        Ok(Self {
            family,
            base: mask(&key, prefix),
            prefix,
        })
    }

    /// True if this block matches every address of its family.
    pub fn is_any(&self) -> bool {
        self.prefix == 0
    }

    /// Does `key`, read in this subnet's family, fall inside the block?
    pub fn contains(&self, key: &PeerKey) -> bool {
        mask(key, self.prefix) == self.base
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base.to_ip(self.family), self.prefix)
    }
}

/// Clear every bit after the first `prefix` bits.
fn mask(key: &PeerKey, prefix: u8) -> PeerKey {
    let mut bytes = *key.as_bytes();
    for (i, byte) in bytes.iter_mut().enumerate() {
        let start = (i * 8) as u32;
        let keep = (prefix as u32).saturating_sub(start).min(8);
        *byte &= match keep {
            0 => 0,
            n => 0xffu8 << (8 - n),
        };
    }
    PeerKey::from_v6(bytes.into())
}
