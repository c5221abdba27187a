//! Datagram (UDP) transport bridged into rooms.
//!
//! - header: optional `ROOM:..;USER:..` line parsing
//! - peers: per-room peer address table
//! - bridge: receive loop, peer forwarding and room injection

mod bridge;
mod header;
mod peers;

pub use bridge::{DatagramBridge, DatagramDispatch, DatagramError};
pub use header::{parse_frame, DatagramFrame};
pub use peers::{ForwardTargets, PeerEntry, PeerTable, TYPICAL_ROOM_SIZE};
