use std::sync::Arc;
use tokio::time::Duration;

use crate::config::defaults::MAX_QUEUE_CAPACITY;
use crate::config::Config;
use crate::hub::Hub;
use crate::metrics::RelayMetrics;
use crate::protocol::EnvelopeCodec;

/// Runtime relay settings consumed by both transports.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub queue_capacity: usize,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub max_datagram_size: usize,
    pub envelope_codec: EnvelopeCodec,
}

impl RelaySettings {
    pub fn from_config(config: &Config) -> Self {
        let relay = &config.relay;
        Self {
            queue_capacity: relay.queue_capacity.clamp(1, MAX_QUEUE_CAPACITY),
            read_timeout: Duration::from_secs(relay.read_timeout_secs),
            write_timeout: Duration::from_secs(relay.write_timeout_secs),
            max_datagram_size: relay.max_datagram_size,
            envelope_codec: relay.envelope_encoding,
        }
    }
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Process-wide relay state, built once at startup and passed explicitly to
/// the stream router and the datagram bridge.
#[derive(Debug)]
pub struct RelayServer {
    hub: Arc<Hub>,
    settings: RelaySettings,
    metrics: Arc<RelayMetrics>,
}

impl RelayServer {
    pub fn new(hub: Arc<Hub>, settings: RelaySettings) -> Arc<Self> {
        Arc::new(Self {
            hub,
            settings,
            metrics: Arc::new(RelayMetrics::new()),
        })
    }

    pub fn from_config(config: &Config) -> Arc<Self> {
        let hub = Arc::new(Hub::with_default_room(config.relay.default_room.trim()));
        Self::new(hub, RelaySettings::from_config(config))
    }

    pub fn hub(&self) -> &Arc<Hub> {
        &self.hub
    }

    pub fn settings(&self) -> &RelaySettings {
        &self.settings
    }

    pub fn metrics(&self) -> &Arc<RelayMetrics> {
        &self.metrics
    }
}
