//! Default value functions for configuration fields.
//!
//! Used by serde's `#[serde(default = ...)]` attributes throughout the
//! configuration system.

use super::logging::LogFormat;
use crate::protocol::{EnvelopeCodec, DEFAULT_ROOM};

// =============================================================================
// Ports & Root Config
// =============================================================================

pub const fn default_port() -> u16 {
    8080
}

pub const fn default_udp_port() -> u16 {
    8081
}

pub fn default_allowed_origin() -> String {
    "*".to_string()
}

// =============================================================================
// Relay Defaults
// =============================================================================

pub fn default_room() -> String {
    DEFAULT_ROOM.to_string()
}

/// Per-client outbound queue depth; frames beyond this are dropped.
pub const fn default_queue_capacity() -> usize {
    256
}

/// Largest accepted per-client queue depth.
pub const MAX_QUEUE_CAPACITY: usize = 1 << 20;

pub const fn default_read_timeout_secs() -> u64 {
    60
}

pub const fn default_write_timeout_secs() -> u64 {
    10
}

/// Largest datagram the bridge will read (64 KiB).
pub const fn default_max_datagram_size() -> usize {
    64 * 1024
}

pub const fn default_envelope_encoding() -> EnvelopeCodec {
    EnvelopeCodec::Json
}

// =============================================================================
// Logging Defaults
// =============================================================================

pub fn default_log_dir() -> String {
    "logs".to_string()
}

pub fn default_log_filename() -> String {
    "relay.log".to_string()
}

pub fn default_rotation() -> String {
    "daily".to_string()
}

pub const fn default_enable_file_logging() -> bool {
    false
}

pub const fn default_log_format() -> LogFormat {
    LogFormat::Text
}
