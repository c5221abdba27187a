use uuid::Uuid;

/// Room used when a client or datagram does not name one.
pub const DEFAULT_ROOM: &str = "global";

/// Unique identifier for a single stream connection.
pub type ClientId = Uuid;

/// Username assigned to a stream client that did not supply one.
#[must_use]
pub fn anonymous_username() -> String {
    format!("anon-{}", Uuid::new_v4().simple())
}

/// Username assigned to a datagram sender that did not supply one.
#[must_use]
pub fn ephemeral_datagram_username() -> String {
    format!("udp-{}", Uuid::new_v4().simple())
}

/// Current wall-clock time as nanoseconds since the Unix epoch.
#[must_use]
pub fn now_nanos() -> i64 {
    chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_usernames_are_prefixed_and_unique() {
        let a = anonymous_username();
        let b = anonymous_username();
        assert!(a.starts_with("anon-"));
        assert_ne!(a, b);

        let udp = ephemeral_datagram_username();
        assert!(udp.starts_with("udp-"));
    }

    #[test]
    fn now_nanos_is_monotonic_enough() {
        let first = now_nanos();
        let second = now_nanos();
        assert!(first > 0);
        assert!(second >= first);
    }
}
