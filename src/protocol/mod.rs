// Protocol module: envelope codec and shared identity types

pub mod envelope;
pub mod types;

pub use envelope::{Envelope, EnvelopeCodec, EnvelopeError};
pub use types::{
    anonymous_username, ephemeral_datagram_username, now_nanos, ClientId, DEFAULT_ROOM,
};
