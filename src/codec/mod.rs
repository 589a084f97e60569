//! Codec module - wire profiles for socket messages.
//!
//! Two profiles of the same protocol are deployed in the wild:
//!
//! - [`BinaryCodec`] - 16-byte big-endian header + body, with batch frames
//! - [`JsonCodec`] - JSON array-of-objects messages, no binary header
//!
//! The profile is selected per client via [`WireFormat`]; the connection
//! state machine is shared between both.
//!
//! # Example
//!
//! ```
//! use sublink_client::codec::WireFormat;
//! use sublink_client::protocol::ops;
//!
//! let bytes = WireFormat::Binary.encode(1, ops::HEARTBEAT, 1, b"").unwrap();
//! let frames = WireFormat::Binary.decode(&bytes).unwrap();
//! assert_eq!(frames[0].operation(), ops::HEARTBEAT);
//! ```

mod binary;
mod json;

pub use binary::BinaryCodec;
pub use json::JsonCodec;

use bytes::Bytes;

use crate::error::Result;
use crate::protocol::Frame;

/// Wire profile selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireFormat {
    /// Length-prefixed binary frames (the default profile).
    #[default]
    Binary,
    /// JSON array-of-objects messages.
    Json,
}

impl WireFormat {
    /// Encode one outbound frame in this profile.
    pub fn encode(&self, version: u16, operation: u32, sequence: u32, body: &[u8]) -> Result<Bytes> {
        match self {
            WireFormat::Binary => Ok(BinaryCodec::encode(version, operation, sequence, body)),
            WireFormat::Json => JsonCodec::encode(version, operation, sequence, body),
        }
    }

    /// Decode one inbound socket message into frames, in arrival order.
    pub fn decode(&self, buf: &[u8]) -> Result<Vec<Frame>> {
        match self {
            WireFormat::Binary => BinaryCodec::decode(buf),
            WireFormat::Json => JsonCodec::decode(buf),
        }
    }

    /// Whether frames in this profile travel as binary socket messages.
    pub fn is_binary(&self) -> bool {
        matches!(self, WireFormat::Binary)
    }
}
