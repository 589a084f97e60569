//! Frame struct with typed accessors.
//!
//! Represents a complete protocol frame with header and body.
//! Uses `bytes::Bytes` for zero-copy body sharing.
//!
//! # Example
//!
//! ```
//! use sublink_client::protocol::{ops, Frame, Header};
//! use bytes::Bytes;
//!
//! let header = Header::for_body(1, ops::SEND_MSG_REPLY, 42, 5);
//! let body = Bytes::from_static(b"hello");
//! let frame = Frame::new(header, body);
//!
//! assert_eq!(frame.operation(), ops::SEND_MSG_REPLY);
//! assert_eq!(frame.body(), b"hello");
//! ```

use bytes::Bytes;

use super::wire_format::{Header, HEADER_SIZE};

/// A complete protocol frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Decoded header.
    pub header: Header,
    /// Body bytes (zero-copy via `bytes::Bytes`), typically UTF-8 JSON text.
    pub body: Bytes,
}

impl Frame {
    /// Create a new frame from header and body.
    pub fn new(header: Header, body: Bytes) -> Self {
        Self { header, body }
    }

    /// Create a frame from header and raw bytes (copies data).
    pub fn from_parts(header: Header, body: &[u8]) -> Self {
        Self {
            header,
            body: Bytes::copy_from_slice(body),
        }
    }

    /// Get a reference to the body bytes.
    #[inline]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Get the protocol version.
    #[inline]
    pub fn version(&self) -> u16 {
        self.header.version
    }

    /// Get the operation code.
    #[inline]
    pub fn operation(&self) -> u32 {
        self.header.operation
    }

    /// Get the sequence number.
    #[inline]
    pub fn sequence(&self) -> u32 {
        self.header.sequence
    }

    /// Check if this is a batch container frame.
    #[inline]
    pub fn is_batch(&self) -> bool {
        self.header.is_batch()
    }

    /// Check if this is control traffic (auth/heartbeat handshake).
    #[inline]
    pub fn is_control(&self) -> bool {
        self.header.is_control()
    }
}

/// Build a complete binary frame as a single byte vector.
///
/// Encodes the 16-byte header and appends the body into a contiguous buffer.
///
/// # Example
///
/// ```
/// use sublink_client::protocol::{build_frame, ops, Header};
///
/// let header = Header::for_body(1, ops::AUTH, 1, 5);
/// let bytes = build_frame(&header, b"hello");
/// assert_eq!(bytes.len(), 16 + 5); // header + body
/// ```
pub fn build_frame(header: &Header, body: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE + body.len());
    buf.extend_from_slice(&header.encode());
    buf.extend_from_slice(body);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ops;

    #[test]
    fn test_frame_creation() {
        let header = Header::for_body(1, ops::SEND_MSG_REPLY, 42, 5);
        let body = Bytes::from_static(b"hello");
        let frame = Frame::new(header, body);

        assert_eq!(frame.version(), 1);
        assert_eq!(frame.operation(), ops::SEND_MSG_REPLY);
        assert_eq!(frame.sequence(), 42);
        assert_eq!(frame.body(), b"hello");
    }

    #[test]
    fn test_frame_from_parts() {
        let header = Header::for_body(1, ops::AUTH_REPLY, 100, 4);
        let frame = Frame::from_parts(header, b"test");

        assert_eq!(frame.operation(), ops::AUTH_REPLY);
        assert_eq!(frame.body(), b"test");
        assert!(frame.is_control());
    }

    #[test]
    fn test_frame_empty_body() {
        let header = Header::for_body(1, ops::HEARTBEAT, 1, 0);
        let frame = Frame::new(header, Bytes::new());

        assert!(frame.body().is_empty());
        assert_eq!(frame.header.packet_len, HEADER_SIZE as u32);
    }

    #[test]
    fn test_build_frame() {
        let header = Header::for_body(1, ops::AUTH, 1, 5);
        let bytes = build_frame(&header, b"hello");

        assert_eq!(bytes.len(), HEADER_SIZE + 5);

        // Parse it back
        let parsed = Header::decode(&bytes[..HEADER_SIZE]).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(&bytes[HEADER_SIZE..], b"hello");
    }

    #[test]
    fn test_build_frame_empty_body() {
        let header = Header::for_body(1, ops::HEARTBEAT, 1, 0);
        let bytes = build_frame(&header, b"");

        assert_eq!(bytes.len(), HEADER_SIZE);
    }
}
