//! JSON codec - array-of-objects socket messages.
//!
//! On this wire profile each socket message is a JSON array of objects
//! `{"ver", "op", "seq", "body"}` with the same operation-code semantics
//! as the binary profile but no binary header. Outbound frames are single
//! JSON objects.
//!
//! Decoded frames carry a synthetic header (`header_len` 0) so that the
//! rest of the engine is codec-agnostic; the frame body is the compact
//! re-serialization of the `body` value.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SublinkError};
use crate::protocol::{Frame, Header};

/// One frame on the JSON wire.
#[derive(Debug, Serialize, Deserialize)]
struct JsonFrame {
    ver: u16,
    op: u32,
    seq: u32,
    #[serde(default)]
    body: Value,
}

/// Codec for the JSON wire profile.
pub struct JsonCodec;

impl JsonCodec {
    /// Encode a single frame as a JSON object.
    ///
    /// `body` must be empty (encoded as `{}`) or valid JSON text.
    pub fn encode(version: u16, operation: u32, sequence: u32, body: &[u8]) -> Result<Bytes> {
        let body_value: Value = if body.is_empty() {
            Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_slice(body)?
        };

        let frame = JsonFrame {
            ver: version,
            op: operation,
            seq: sequence,
            body: body_value,
        };
        Ok(Bytes::from(serde_json::to_vec(&frame)?))
    }

    /// Decode one socket message (a JSON array) into frames.
    pub fn decode(buf: &[u8]) -> Result<Vec<Frame>> {
        let parsed: Vec<JsonFrame> = serde_json::from_slice(buf)
            .map_err(|e| SublinkError::MalformedFrame(format!("invalid JSON message: {}", e)))?;

        parsed
            .into_iter()
            .map(|jf| {
                let body = match &jf.body {
                    Value::Null => Bytes::new(),
                    value => Bytes::from(serde_json::to_vec(value)?),
                };
                let header = Header {
                    packet_len: body.len() as u32,
                    header_len: 0,
                    version: jf.ver,
                    operation: jf.op,
                    sequence: jf.seq,
                };
                Ok(Frame::new(header, body))
            })
            .collect()
    }
}
