#![cfg_attr(not(test), deny(clippy::panic))]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

//! # Fanout Relay
//!
//! A best-effort, in-memory relay that fans out short binary messages among
//! clients grouped into named rooms, over WebSocket and UDP.
//!
//! No persistence, no delivery guarantees: a slow consumer loses messages
//! rather than stalling the room.

/// Server configuration and environment variables
pub mod config;

/// UDP transport bridged into rooms
pub mod datagram;

/// Room registry and fan-out
pub mod hub;

/// Structured logging configuration
pub mod logging;

/// Relay counters
pub mod metrics;

/// Envelope codec and identity types
pub mod protocol;

/// Shared relay state
pub mod server;

/// WebSocket transport
pub mod websocket;
