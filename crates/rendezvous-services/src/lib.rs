//! rendezvous-services: the peer store and the operations built on it.

pub mod clock;
pub mod decay;
pub mod peer_table;
pub mod registry;

pub use clock::ServerClock;
pub use decay::decay_loop;
pub use peer_table::PeerTable;
pub use registry::{
    QueryParams, QueryResult, RegisterParams, Registration, Registry, SharedRegistry,
};
