//! Liveness record codec.
//!
//! Every table entry is stored as a single packed `u64`:
//!
//! ```text
//!   63            32 31      16 15     8 7      0
//!  +----------------+----------+--------+--------+
//!  |   timestamp    |   port   |  zero  |  ttl   |
//!  +----------------+----------+--------+--------+
//! ```
//!
//! The timestamp is an `i32` stored as its two's complement bits, so
//! negative values survive a round trip.

use static_assertions::const_assert_eq;

/// Width of the packed representation in bytes.
const PACKED_SIZE: usize = std::mem::size_of::<u64>();

const TIMESTAMP_SHIFT: u32 = 32;
const PORT_SHIFT: u32 = 16;
const TTL_MASK: u64 = 0xff;
const PORT_MASK: u64 = 0xffff;

// timestamp + port + reserved byte + ttl must fill the word exactly.
const_assert_eq!(4 + 2 + 1 + 1, PACKED_SIZE);

/// Decoded liveness state for one peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LivenessRecord {
    /// Seconds since the server epoch at which this (address, port) pairing
    /// was first observed.
    pub timestamp: i32,
    /// Last declared service port.
    pub port: u16,
    /// Remaining time-to-live, counted down by decay.
    pub ttl: u8,
}

impl LivenessRecord {
    pub fn new(timestamp: i32, port: u16, ttl: u8) -> Self {
        Self {
            timestamp,
            port,
            ttl,
        }
    }

    pub fn unpack(packed: u64) -> Self {
        let (timestamp, port, ttl) = decode(packed);
        Self {
            timestamp,
            port,
            ttl,
        }
    }
}

/// Pack a (timestamp, port, ttl) triple into one word.
pub fn encode(timestamp: i32, port: u16, ttl: u8) -> u64 {
    ((timestamp as u32 as u64) << TIMESTAMP_SHIFT) | ((port as u64) << PORT_SHIFT) | ttl as u64
}

/// Inverse of [`encode`].
pub fn decode(packed: u64) -> (i32, u16, u8) {
    let timestamp = (packed >> TIMESTAMP_SHIFT) as u32 as i32;
    let port = ((packed >> PORT_SHIFT) & PORT_MASK) as u16;
    let ttl = (packed & TTL_MASK) as u8;
    (timestamp, port, ttl)
}
