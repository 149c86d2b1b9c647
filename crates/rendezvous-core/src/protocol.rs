//! Transport a registering peer says its service speaks.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::RegistryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tls,
    Tcp,
    Udp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tls => f.write_str("tls"),
            Protocol::Tcp => f.write_str("tcp"),
            Protocol::Udp => f.write_str("udp"),
        }
    }
}

impl FromStr for Protocol {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tls" => Ok(Protocol::Tls),
            "tcp" => Ok(Protocol::Tcp),
            "udp" => Ok(Protocol::Udp),
            other => Err(RegistryError::invalid(format!(
                "expected protocol 'tls', 'tcp', or 'udp', got '{other}'"
            ))),
        }
    }
}
