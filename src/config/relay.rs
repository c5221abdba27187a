//! Relay behavior configuration.

use super::defaults::{
    default_envelope_encoding, default_max_datagram_size, default_queue_capacity,
    default_read_timeout_secs, default_room, default_write_timeout_secs,
};
use crate::protocol::EnvelopeCodec;
use serde::{Deserialize, Serialize};

/// Fan-out, timeout, and datagram settings shared by both transports.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RelayConfig {
    /// Room used when a client or datagram names none
    #[serde(default = "default_room")]
    pub default_room: String,
    /// Bounded outbound queue depth per stream client
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Idle read deadline for stream clients (seconds)
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
    /// Per-frame write deadline for stream clients (seconds)
    #[serde(default = "default_write_timeout_secs")]
    pub write_timeout_secs: u64,
    /// Receive buffer size for the datagram bridge (bytes)
    #[serde(default = "default_max_datagram_size")]
    pub max_datagram_size: usize,
    /// Envelope wire encoding: "json" or "msgpack"
    #[serde(default = "default_envelope_encoding")]
    pub envelope_encoding: EnvelopeCodec,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            default_room: default_room(),
            queue_capacity: default_queue_capacity(),
            read_timeout_secs: default_read_timeout_secs(),
            write_timeout_secs: default_write_timeout_secs(),
            max_datagram_size: default_max_datagram_size(),
            envelope_encoding: default_envelope_encoding(),
        }
    }
}
