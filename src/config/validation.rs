//! Configuration validation functions.

use super::defaults::MAX_QUEUE_CAPACITY;
use super::Config;

/// Reject settings the relay cannot run with.
pub fn validate_config(config: &Config) -> anyhow::Result<()> {
    let relay = &config.relay;

    if relay.default_room.trim().is_empty() {
        anyhow::bail!("relay.default_room must not be empty");
    }
    if relay.queue_capacity == 0 || relay.queue_capacity > MAX_QUEUE_CAPACITY {
        anyhow::bail!(
            "relay.queue_capacity must be between 1 and {MAX_QUEUE_CAPACITY} (configured: {})",
            relay.queue_capacity
        );
    }
    if relay.read_timeout_secs == 0 {
        anyhow::bail!("relay.read_timeout_secs must be at least 1 second");
    }
    if relay.write_timeout_secs == 0 {
        anyhow::bail!("relay.write_timeout_secs must be at least 1 second");
    }
    if relay.max_datagram_size == 0 || relay.max_datagram_size > 64 * 1024 {
        anyhow::bail!(
            "relay.max_datagram_size must be between 1 and 65536 bytes (configured: {})",
            relay.max_datagram_size
        );
    }
    if config.allowed_origin.trim().is_empty() {
        eprintln!("WARNING: allowed_origin is empty; CORS will fall back to permissive");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn zero_queue_capacity_is_rejected() {
        let mut config = Config::default();
        config.relay.queue_capacity = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("queue_capacity"));
    }

    #[test]
    fn oversized_queue_capacity_is_rejected() {
        let mut config = Config::default();
        config.relay.queue_capacity = usize::MAX;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("queue_capacity"));

        config.relay.queue_capacity = MAX_QUEUE_CAPACITY + 1;
        assert!(validate_config(&config).is_err());

        config.relay.queue_capacity = MAX_QUEUE_CAPACITY;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn zero_timeouts_are_rejected() {
        let mut config = Config::default();
        config.relay.read_timeout_secs = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.relay.write_timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn oversized_datagram_buffer_is_rejected() {
        let mut config = Config::default();
        config.relay.max_datagram_size = 70_000;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn blank_default_room_is_rejected() {
        let mut config = Config::default();
        config.relay.default_room = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }
}
