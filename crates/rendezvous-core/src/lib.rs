//! rendezvous-core: shared types, record codec, and configuration.
//! All other rendezvous crates depend on this one.

pub mod config;
pub mod error;
pub mod peer_key;
pub mod protocol;
pub mod record;
pub mod subnet;

pub use error::RegistryError;
pub use peer_key::{Family, PeerKey};
pub use protocol::Protocol;
pub use record::LivenessRecord;
pub use subnet::Subnet;
