//! Envelope codec for relayed payloads.
//!
//! Every payload fanned out to a room is wrapped in an [`Envelope`] carrying the
//! room, the sender's username, and a capture timestamp in nanoseconds. The
//! payload itself is opaque and must survive a round trip byte-for-byte, so both
//! supported encodings are binary-safe:
//!
//! - `Json`: `{"room","username","ts","payload"}` with the payload as standard
//!   base64 (a `null` payload decodes as empty).
//! - `MessagePack`: the same named fields with the payload as a raw binary blob.
//!
//! Frames are encoded once per broadcast and shared as [`Bytes`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::now_nanos;

/// A decoded relay envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub room: String,
    pub username: String,
    /// Capture time in nanoseconds since the Unix epoch.
    pub ts: i64,
    pub payload: Bytes,
}

impl Envelope {
    /// Build an envelope stamped with the current time.
    pub fn new(room: impl Into<String>, username: impl Into<String>, payload: Bytes) -> Self {
        Self {
            room: room.into(),
            username: username.into(),
            ts: now_nanos(),
            payload,
        }
    }
}

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("invalid JSON envelope: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("failed to encode MessagePack envelope: {0}")]
    MessagePackEncode(#[from] rmp_serde::encode::Error),
    #[error("invalid MessagePack envelope: {0}")]
    MessagePackDecode(#[from] rmp_serde::decode::Error),
}

/// Wire encoding used for envelopes sent to stream clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeCodec {
    #[default]
    Json,
    #[serde(rename = "msgpack", alias = "messagepack")]
    MessagePack,
}

#[derive(Serialize)]
struct JsonWireRef<'a> {
    room: &'a str,
    username: &'a str,
    ts: i64,
    payload: String,
}

#[derive(Deserialize)]
struct JsonWire {
    room: String,
    username: String,
    ts: i64,
    #[serde(default)]
    payload: Option<String>,
}

#[derive(Serialize)]
struct BinaryWireRef<'a> {
    room: &'a str,
    username: &'a str,
    ts: i64,
    #[serde(with = "serde_bytes")]
    payload: &'a [u8],
}

#[derive(Deserialize)]
struct BinaryWire {
    room: String,
    username: String,
    ts: i64,
    payload: serde_bytes::ByteBuf,
}

impl EnvelopeCodec {
    /// Encode an envelope from its parts without building an owned [`Envelope`].
    pub fn encode_parts(
        self,
        room: &str,
        username: &str,
        ts: i64,
        payload: &[u8],
    ) -> Result<Bytes, EnvelopeError> {
        let encoded = match self {
            Self::Json => serde_json::to_vec(&JsonWireRef {
                room,
                username,
                ts,
                payload: STANDARD.encode(payload),
            })?,
            Self::MessagePack => rmp_serde::to_vec_named(&BinaryWireRef {
                room,
                username,
                ts,
                payload,
            })?,
        };
        Ok(Bytes::from(encoded))
    }

    pub fn encode(self, envelope: &Envelope) -> Result<Bytes, EnvelopeError> {
        self.encode_parts(
            &envelope.room,
            &envelope.username,
            envelope.ts,
            &envelope.payload,
        )
    }

    pub fn decode(self, frame: &[u8]) -> Result<Envelope, EnvelopeError> {
        match self {
            Self::Json => {
                let wire: JsonWire = serde_json::from_slice(frame)?;
                let payload = match wire.payload {
                    Some(encoded) => Bytes::from(STANDARD.decode(encoded)?),
                    None => Bytes::new(),
                };
                Ok(Envelope {
                    room: wire.room,
                    username: wire.username,
                    ts: wire.ts,
                    payload,
                })
            }
            Self::MessagePack => {
                let wire: BinaryWire = rmp_serde::from_slice(frame)?;
                Ok(Envelope {
                    room: wire.room,
                    username: wire.username,
                    ts: wire.ts,
                    payload: Bytes::from(wire.payload.into_vec()),
                })
            }
        }
    }

    /// Capture timestamp of a frame, or `None` when the frame does not decode.
    pub fn timestamp_of(self, frame: &[u8]) -> Option<i64> {
        self.decode(frame).ok().map(|envelope| envelope.ts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const CODECS: [EnvelopeCodec; 2] = [EnvelopeCodec::Json, EnvelopeCodec::MessagePack];

    #[test]
    fn json_wire_shape_uses_base64_payload() {
        let frame = EnvelopeCodec::Json
            .encode_parts("global", "alice", 42, b"ping")
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&frame).unwrap();
        assert_eq!(value["room"], "global");
        assert_eq!(value["username"], "alice");
        assert_eq!(value["ts"], 42);
        assert_eq!(value["payload"], "cGluZw==");
    }

    #[test]
    fn json_null_payload_decodes_as_empty() {
        let frame = br#"{"room":"r","username":"u","ts":7,"payload":null}"#;
        let envelope = EnvelopeCodec::Json.decode(frame).unwrap();
        assert!(envelope.payload.is_empty());
        assert_eq!(envelope.ts, 7);
    }

    #[test]
    fn empty_and_non_utf8_payloads_survive() {
        for codec in CODECS {
            for payload in [&b""[..], &[0xff, 0xfe, 0x00, 0x80][..]] {
                let envelope = Envelope::new("alpha", "bob", Bytes::copy_from_slice(payload));
                let decoded = codec.decode(&codec.encode(&envelope).unwrap()).unwrap();
                assert_eq!(decoded, envelope, "codec {codec:?}");
            }
        }
    }

    #[test]
    fn malformed_frames_report_no_timestamp() {
        for codec in CODECS {
            assert!(codec.decode(b"\x00not an envelope").is_err());
            assert_eq!(codec.timestamp_of(b"garbage"), None);
        }
        let bad_base64 = br#"{"room":"r","username":"u","ts":1,"payload":"***"}"#;
        assert!(matches!(
            EnvelopeCodec::Json.decode(bad_base64),
            Err(EnvelopeError::Base64(_))
        ));
    }

    #[test]
    fn timestamp_of_reads_capture_time() {
        let frame = EnvelopeCodec::MessagePack
            .encode_parts("r", "u", 1_700_000_000_000_000_000, b"x")
            .unwrap();
        assert_eq!(
            EnvelopeCodec::MessagePack.timestamp_of(&frame),
            Some(1_700_000_000_000_000_000)
        );
    }

    #[test]
    fn codec_names_deserialize() {
        let json: EnvelopeCodec = serde_json::from_str("\"json\"").unwrap();
        let msgpack: EnvelopeCodec = serde_json::from_str("\"msgpack\"").unwrap();
        assert_eq!(json, EnvelopeCodec::Json);
        assert_eq!(msgpack, EnvelopeCodec::MessagePack);
    }

    proptest! {
        #[test]
        fn arbitrary_payloads_round_trip(
            room in "[a-z]{1,12}",
            username in "\\PC{0,16}",
            ts in any::<i64>(),
            payload in proptest::collection::vec(any::<u8>(), 0..512),
            msgpack in any::<bool>(),
        ) {
            let codec = if msgpack { EnvelopeCodec::MessagePack } else { EnvelopeCodec::Json };
            let frame = codec.encode_parts(&room, &username, ts, &payload).unwrap();
            let decoded = codec.decode(&frame).unwrap();
            prop_assert_eq!(decoded.room, room);
            prop_assert_eq!(decoded.username, username);
            prop_assert_eq!(decoded.ts, ts);
            prop_assert_eq!(decoded.payload.as_ref(), payload.as_slice());
        }
    }
}
