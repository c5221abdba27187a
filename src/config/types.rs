//! Root configuration types.

use super::defaults::{default_allowed_origin, default_port, default_udp_port};
use super::logging::LoggingConfig;
use super::relay::RelayConfig;
use serde::{Deserialize, Serialize};

/// Root configuration struct for the relay.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Stream (HTTP/WebSocket) listen port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Datagram (UDP) listen port
    #[serde(default = "default_udp_port")]
    pub udp_port: u16,
    /// Allowed CORS origin(s): "*" or a comma-separated list
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            udp_port: default_udp_port(),
            allowed_origin: default_allowed_origin(),
            relay: RelayConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
