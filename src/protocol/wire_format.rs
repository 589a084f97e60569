//! Wire format encoding and decoding.
//!
//! Implements the 16-byte header format:
//! ```text
//! ┌────────────┬────────────┬──────────┬───────────┬──────────┐
//! │ Packet Len │ Header Len │ Version  │ Operation │ Sequence │
//! │ 4 bytes    │ 2 bytes    │ 2 bytes  │ 4 bytes   │ 4 bytes  │
//! │ uint32 BE  │ uint16 BE  │ uint16 BE│ uint32 BE │ uint32 BE│
//! └────────────┴────────────┴──────────┴───────────┴──────────┘
//! ```
//!
//! `packet_len` covers the whole frame (header + body); `header_len` is
//! always 16 on the binary wire. All multi-byte integers are Big Endian.

/// Header size in bytes (fixed, exactly 16 on the binary wire).
pub const HEADER_SIZE: usize = 16;

/// Protocol version sent in outbound frames.
pub const PROTOCOL_VERSION: u16 = 1;

/// Operation codes carried in the `operation` header field.
///
/// The code-to-meaning mapping is fixed by the server protocol. Codes not
/// listed here are application data and are forwarded to the subscriber.
pub mod ops {
    /// Client heartbeat request.
    pub const HEARTBEAT: u32 = 2;
    /// Server heartbeat acknowledgment.
    pub const HEARTBEAT_REPLY: u32 = 3;
    /// Client text message send.
    pub const SEND_MSG: u32 = 4;
    /// Server reply to a sent message (data on the JSON wire profile).
    pub const SEND_MSG_REPLY: u32 = 5;
    /// Server-initiated disconnect notice.
    pub const DISCONNECT_REPLY: u32 = 6;
    /// Client authentication request.
    pub const AUTH: u32 = 7;
    /// Server authentication acknowledgment.
    pub const AUTH_REPLY: u32 = 8;
    /// Batch container: the socket message is a concatenation of complete
    /// self-headered frames.
    pub const BATCH: u32 = 9;

    /// Check whether an operation is part of the control handshake
    /// (auth/heartbeat) rather than application data.
    #[inline]
    pub fn is_control(op: u32) -> bool {
        matches!(op, HEARTBEAT | HEARTBEAT_REPLY | AUTH | AUTH_REPLY)
    }
}

/// Decoded header from the binary wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Total frame length in bytes (header + body).
    pub packet_len: u32,
    /// Header length in bytes (16 on the binary wire, 0 on the JSON wire).
    pub header_len: u16,
    /// Protocol version.
    pub version: u16,
    /// Operation code (see [`ops`]).
    pub operation: u32,
    /// Sequence number.
    pub sequence: u32,
}

impl Header {
    /// Create a header for a binary frame with the given body length.
    pub fn for_body(version: u16, operation: u32, sequence: u32, body_len: usize) -> Self {
        Self {
            packet_len: (HEADER_SIZE + body_len) as u32,
            header_len: HEADER_SIZE as u16,
            version,
            operation,
            sequence,
        }
    }

    /// Encode header to bytes (Big Endian).
    ///
    /// # Example
    ///
    /// ```
    /// use sublink_client::protocol::{ops, Header};
    ///
    /// let header = Header::for_body(1, ops::HEARTBEAT, 1, 0);
    /// let bytes = header.encode();
    /// assert_eq!(bytes.len(), 16);
    /// ```
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        self.encode_into(&mut buf);
        buf
    }

    /// Encode header into an existing buffer.
    ///
    /// # Panics
    ///
    /// Panics if buffer is smaller than `HEADER_SIZE` (16 bytes).
    pub fn encode_into(&self, buf: &mut [u8]) {
        debug_assert!(buf.len() >= HEADER_SIZE);
        buf[0..4].copy_from_slice(&self.packet_len.to_be_bytes());
        buf[4..6].copy_from_slice(&self.header_len.to_be_bytes());
        buf[6..8].copy_from_slice(&self.version.to_be_bytes());
        buf[8..12].copy_from_slice(&self.operation.to_be_bytes());
        buf[12..16].copy_from_slice(&self.sequence.to_be_bytes());
    }

    /// Decode header from bytes (Big Endian).
    ///
    /// Returns `None` if buffer is too short.
    ///
    /// # Example
    ///
    /// ```
    /// use sublink_client::protocol::Header;
    ///
    /// let bytes = [0, 0, 0, 16, 0, 16, 0, 1, 0, 0, 0, 2, 0, 0, 0, 1];
    /// let header = Header::decode(&bytes).unwrap();
    /// assert_eq!(header.packet_len, 16);
    /// assert_eq!(header.operation, 2);
    /// ```
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_SIZE {
            return None;
        }
        Some(Self {
            packet_len: u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]),
            header_len: u16::from_be_bytes([buf[4], buf[5]]),
            version: u16::from_be_bytes([buf[6], buf[7]]),
            operation: u32::from_be_bytes([buf[8], buf[9], buf[10], buf[11]]),
            sequence: u32::from_be_bytes([buf[12], buf[13], buf[14], buf[15]]),
        })
    }

    /// Body length declared by this header.
    #[inline]
    pub fn body_len(&self) -> usize {
        (self.packet_len as usize).saturating_sub(self.header_len as usize)
    }

    /// Check if this frame is a batch container.
    #[inline]
    pub fn is_batch(&self) -> bool {
        self.operation == ops::BATCH
    }

    /// Check if this frame is an authentication acknowledgment.
    #[inline]
    pub fn is_auth_reply(&self) -> bool {
        self.operation == ops::AUTH_REPLY
    }

    /// Check if this frame is a heartbeat acknowledgment.
    #[inline]
    pub fn is_heartbeat_reply(&self) -> bool {
        self.operation == ops::HEARTBEAT_REPLY
    }

    /// Check if this frame is control traffic (auth/heartbeat handshake).
    #[inline]
    pub fn is_control(&self) -> bool {
        ops::is_control(self.operation)
    }
}
