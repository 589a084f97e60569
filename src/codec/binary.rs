//! Binary codec - 16-byte big-endian header + body.
//!
//! Each inbound socket message is assumed to carry whole frames; there is
//! no reassembly across messages. A frame whose declared `packet_len`
//! would read past the buffer end is a malformed-frame error, not a
//! partial read.
//!
//! Batching: if the first header's operation is [`ops::BATCH`], the buffer
//! is a concatenation of complete self-headered frames and is re-scanned
//! from offset 0 in `packet_len`-sized strides, yielding each embedded
//! frame in order.
//!
//! # Example
//!
//! ```
//! use sublink_client::codec::BinaryCodec;
//! use sublink_client::protocol::ops;
//!
//! let bytes = BinaryCodec::encode(1, ops::HEARTBEAT, 1, b"");
//! let frames = BinaryCodec::decode(&bytes).unwrap();
//! assert_eq!(frames.len(), 1);
//! assert_eq!(frames[0].operation(), ops::HEARTBEAT);
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Result, SublinkError};
use crate::protocol::{ops, Frame, Header, HEADER_SIZE};

/// Codec for the binary wire profile.
pub struct BinaryCodec;

impl BinaryCodec {
    /// Encode a single frame: 16-byte BE header followed by the body.
    pub fn encode(version: u16, operation: u32, sequence: u32, body: &[u8]) -> Bytes {
        let header = Header::for_body(version, operation, sequence, body.len());
        let mut buf = BytesMut::with_capacity(HEADER_SIZE + body.len());
        buf.put_slice(&header.encode());
        buf.put_slice(body);
        buf.freeze()
    }

    /// Decode one socket message into its constituent frames.
    ///
    /// Returns one frame for an ordinary message, or every embedded frame
    /// (in arrival order) when the message is a batch.
    pub fn decode(buf: &[u8]) -> Result<Vec<Frame>> {
        let first = Self::header_at(buf, 0)?;

        if first.operation == ops::BATCH {
            let mut frames = Vec::new();
            let mut offset = 0usize;
            while offset < buf.len() {
                let frame = Self::frame_at(buf, offset)?;
                offset += frame.header.packet_len as usize;
                frames.push(frame);
            }
            Ok(frames)
        } else {
            Ok(vec![Self::frame_at(buf, 0)?])
        }
    }

    /// Read and validate the header at `offset`.
    fn header_at(buf: &[u8], offset: usize) -> Result<Header> {
        let header = Header::decode(&buf[offset..]).ok_or_else(|| {
            SublinkError::MalformedFrame(format!(
                "truncated header at offset {}: {} bytes remaining",
                offset,
                buf.len().saturating_sub(offset)
            ))
        })?;

        let packet_len = header.packet_len as usize;
        let header_len = header.header_len as usize;

        if header_len > packet_len {
            return Err(SublinkError::MalformedFrame(format!(
                "header_len {} exceeds packet_len {}",
                header_len, packet_len
            )));
        }
        if header_len < HEADER_SIZE {
            return Err(SublinkError::MalformedFrame(format!(
                "header_len {} shorter than the fixed header",
                header_len
            )));
        }
        if offset + packet_len > buf.len() {
            return Err(SublinkError::MalformedFrame(format!(
                "packet_len {} at offset {} reads past buffer end {}",
                packet_len,
                offset,
                buf.len()
            )));
        }

        Ok(header)
    }

    /// Slice out the frame at `offset` (header + body).
    fn frame_at(buf: &[u8], offset: usize) -> Result<Frame> {
        let header = Self::header_at(buf, offset)?;
        let body_start = offset + header.header_len as usize;
        let body_end = offset + header.packet_len as usize;
        Ok(Frame::from_parts(header, &buf[body_start..body_end]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_roundtrip() {
        let bytes = BinaryCodec::encode(1, ops::SEND_MSG_REPLY, 42, b"hello");
        let frames = BinaryCodec::decode(&bytes).unwrap();

        assert_eq!(frames.len(), 1);
        let frame = &frames[0];
        assert_eq!(frame.version(), 1);
        assert_eq!(frame.operation(), ops::SEND_MSG_REPLY);
        assert_eq!(frame.sequence(), 42);
        assert_eq!(frame.body(), b"hello");
    }

    #[test]
    fn test_roundtrip_empty_body() {
        let bytes = BinaryCodec::encode(1, ops::HEARTBEAT, 1, b"");
        let frames = BinaryCodec::decode(&bytes).unwrap();

        assert_eq!(frames.len(), 1);
        assert!(frames[0].body().is_empty());
        assert_eq!(frames[0].header.packet_len, HEADER_SIZE as u32);
    }

    #[test]
    fn test_roundtrip_arbitrary_fields() {
        let body: Vec<u8> = (0..=255).collect();
        let bytes = BinaryCodec::encode(0xABCD, 1000, 0xDEADBEEF, &body);
        let frames = BinaryCodec::decode(&bytes).unwrap();

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].version(), 0xABCD);
        assert_eq!(frames[0].operation(), 1000);
        assert_eq!(frames[0].sequence(), 0xDEADBEEF);
        assert_eq!(frames[0].body(), &body[..]);
    }

    #[test]
    fn test_batch_decodes_each_embedded_frame() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&BinaryCodec::encode(1, ops::BATCH, 1, b"first"));
        buf.extend_from_slice(&BinaryCodec::encode(1, ops::SEND_MSG_REPLY, 2, b"second"));
        buf.extend_from_slice(&BinaryCodec::encode(1, ops::SEND_MSG_REPLY, 3, b"third"));

        let frames = BinaryCodec::decode(&buf).unwrap();

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].body(), b"first");
        assert_eq!(frames[0].sequence(), 1);
        assert_eq!(frames[1].body(), b"second");
        assert_eq!(frames[1].sequence(), 2);
        assert_eq!(frames[2].body(), b"third");
        assert_eq!(frames[2].sequence(), 3);
    }

    #[test]
    fn test_batch_strides_depend_on_declared_lengths() {
        // Uneven body sizes: the offset of frame N+1 comes from frame N's
        // declared packet_len.
        let mut buf = Vec::new();
        buf.extend_from_slice(&BinaryCodec::encode(1, ops::BATCH, 1, b""));
        buf.extend_from_slice(&BinaryCodec::encode(1, 5, 2, b"a much longer body here"));
        buf.extend_from_slice(&BinaryCodec::encode(1, 5, 3, b"x"));

        let frames = BinaryCodec::decode(&buf).unwrap();

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[1].body(), b"a much longer body here");
        assert_eq!(frames[2].body(), b"x");
    }

    #[test]
    fn test_non_batch_first_frame_is_the_whole_message() {
        let bytes = BinaryCodec::encode(1, ops::AUTH_REPLY, 1, b"{}");
        let frames = BinaryCodec::decode(&bytes).unwrap();

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].operation(), ops::AUTH_REPLY);
    }

    #[test]
    fn test_declared_length_past_buffer_end_is_malformed() {
        let mut bytes = BinaryCodec::encode(1, 5, 1, b"hello").to_vec();
        // Claim a packet larger than what was received.
        bytes[0..4].copy_from_slice(&1000u32.to_be_bytes());

        let err = BinaryCodec::decode(&bytes).unwrap_err();
        assert!(matches!(err, SublinkError::MalformedFrame(_)));
    }

    #[test]
    fn test_truncated_header_is_malformed() {
        let bytes = BinaryCodec::encode(1, 5, 1, b"hello");
        let err = BinaryCodec::decode(&bytes[..10]).unwrap_err();
        assert!(matches!(err, SublinkError::MalformedFrame(_)));
    }

    #[test]
    fn test_header_len_exceeding_packet_len_is_malformed() {
        let mut bytes = BinaryCodec::encode(1, 5, 1, b"").to_vec();
        bytes[4..6].copy_from_slice(&64u16.to_be_bytes());

        let err = BinaryCodec::decode(&bytes).unwrap_err();
        assert!(matches!(err, SublinkError::MalformedFrame(_)));
    }

    #[test]
    fn test_batch_with_truncated_tail_is_malformed() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&BinaryCodec::encode(1, ops::BATCH, 1, b"ok"));
        let second = BinaryCodec::encode(1, 5, 2, b"truncated");
        buf.extend_from_slice(&second[..second.len() - 3]);

        let err = BinaryCodec::decode(&buf).unwrap_err();
        assert!(matches!(err, SublinkError::MalformedFrame(_)));
    }

    #[test]
    fn test_empty_buffer_is_malformed() {
        let err = BinaryCodec::decode(&[]).unwrap_err();
        assert!(matches!(err, SublinkError::MalformedFrame(_)));
    }
}
