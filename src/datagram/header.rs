//! Datagram framing.
//!
//! A datagram may start with one header line, `KEY:value;KEY:value\n`, naming
//! the room (`ROOM`) and sender (`USER`). Keys are case-insensitive and
//! unknown keys are ignored. Everything after the first line break is the
//! payload; a datagram without a line break is payload only.

/// A parsed datagram borrowing its payload from the receive buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatagramFrame<'a> {
    pub room: Option<String>,
    pub username: Option<String>,
    pub payload: &'a [u8],
}

pub fn parse_frame(datagram: &[u8]) -> DatagramFrame<'_> {
    let Some(newline) = datagram.iter().position(|&byte| byte == b'\n') else {
        return DatagramFrame {
            room: None,
            username: None,
            payload: datagram,
        };
    };

    let (header, rest) = datagram.split_at(newline);
    let payload = rest.get(1..).unwrap_or_default();

    let mut room = None;
    let mut username = None;
    for part in String::from_utf8_lossy(header).split(';') {
        let Some((key, value)) = part.trim().split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        match key.trim().to_ascii_uppercase().as_str() {
            "ROOM" => room = Some(value),
            "USER" => username = Some(value),
            _ => {}
        }
    }

    DatagramFrame {
        room: room.filter(|value| !value.is_empty()),
        username: username.filter(|value| !value.is_empty()),
        payload,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_header_is_parsed() {
        let frame = parse_frame(b"ROOM:alpha;USER:bob\n\x00\x01payload");
        assert_eq!(frame.room.as_deref(), Some("alpha"));
        assert_eq!(frame.username.as_deref(), Some("bob"));
        assert_eq!(frame.payload, b"\x00\x01payload");
    }

    #[test]
    fn keys_are_case_insensitive_and_whitespace_is_trimmed() {
        let frame = parse_frame(b" room : beta ; User:carol \r\nbody");
        assert_eq!(frame.room.as_deref(), Some("beta"));
        assert_eq!(frame.username.as_deref(), Some("carol"));
        assert_eq!(frame.payload, b"body");
    }

    #[test]
    fn missing_line_break_means_payload_only() {
        let frame = parse_frame(b"ROOM:alpha;USER:bob");
        assert_eq!(frame.room, None);
        assert_eq!(frame.username, None);
        assert_eq!(frame.payload, b"ROOM:alpha;USER:bob");
    }

    #[test]
    fn unknown_keys_and_malformed_parts_are_ignored() {
        let frame = parse_frame(b"TTL:5;garbage;USER:dave\nx");
        assert_eq!(frame.room, None);
        assert_eq!(frame.username.as_deref(), Some("dave"));
        assert_eq!(frame.payload, b"x");
    }

    #[test]
    fn empty_values_count_as_unspecified() {
        let frame = parse_frame(b"ROOM:alpha;ROOM:;USER:\n");
        assert_eq!(frame.room, None);
        assert_eq!(frame.username, None);
        assert!(frame.payload.is_empty());
    }

    #[test]
    fn only_first_line_is_header() {
        let frame = parse_frame(b"ROOM:a\nline one\nline two");
        assert_eq!(frame.room.as_deref(), Some("a"));
        assert_eq!(frame.payload, b"line one\nline two");
    }
}
