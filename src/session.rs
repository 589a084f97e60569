//! Connection state machine.
//!
//! [`Session`] owns the protocol state for exactly one connection:
//! `Connecting → Authenticating → Authenticated → Closed`. It is a
//! synchronous core with no socket or timer of its own; the client loop
//! feeds it events (open, inbound message, heartbeat tick, close) and
//! writes out whatever frames each step produces. That keeps every
//! transition testable without sockets or real timers.
//!
//! A session instance is terminal once `Closed`; reconnection creates a
//! fresh one.

use bytes::Bytes;

use crate::codec::WireFormat;
use crate::config::AuthPayload;
use crate::dispatch::Message;
use crate::error::{Result, SublinkError};
use crate::protocol::{ops, Frame, PROTOCOL_VERSION};

/// Lifecycle states of one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    /// Socket not yet open.
    Connecting,
    /// Auth frame sent, waiting for the acknowledgment.
    Authenticating,
    /// Steady state: heartbeats flowing, data frames delivered.
    Authenticated,
    /// Socket closed; terminal for this session instance.
    Closed,
}

/// Output of one session step: frames to write and payloads to deliver.
#[derive(Debug, Default)]
pub struct Step {
    /// Encoded frames to write to the socket, in order.
    pub outbound: Vec<Bytes>,
    /// Decoded data payloads to hand to the subscriber, in arrival order.
    pub deliveries: Vec<Message>,
    /// Whether this step completed authentication.
    pub authenticated: bool,
}

/// Protocol state for one connection.
pub struct Session {
    state: ConnState,
    format: WireFormat,
    auth_body: Vec<u8>,
    sequence: u32,
}

impl Session {
    /// Create a session for a fresh connection attempt.
    pub fn new(format: WireFormat, auth: &AuthPayload) -> Result<Self> {
        Ok(Self {
            state: ConnState::Connecting,
            format,
            auth_body: serde_json::to_vec(auth)?,
            sequence: 0,
        })
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> ConnState {
        self.state
    }

    /// Whether the server has acknowledged authentication.
    #[inline]
    pub fn is_authenticated(&self) -> bool {
        self.state == ConnState::Authenticated
    }

    /// Socket opened: send the auth request.
    pub fn on_open(&mut self) -> Result<Step> {
        self.state = ConnState::Authenticating;
        self.sequence = self.sequence.wrapping_add(1);
        let frame =
            self.format
                .encode(PROTOCOL_VERSION, ops::AUTH, self.sequence, &self.auth_body)?;
        Ok(Step {
            outbound: vec![frame],
            ..Step::default()
        })
    }

    /// One inbound socket message.
    ///
    /// A malformed frame drops the remainder of this message (logged, not
    /// fatal); the connection stays up and later messages are processed.
    pub fn on_message(&mut self, data: &[u8]) -> Step {
        let frames = match self.format.decode(data) {
            Ok(frames) => frames,
            Err(e) => {
                tracing::warn!(error = %e, len = data.len(), "dropping malformed socket message");
                return Step::default();
            }
        };

        let mut step = Step::default();
        for frame in frames {
            self.on_frame(frame, &mut step);
        }
        step
    }

    fn on_frame(&mut self, frame: Frame, step: &mut Step) {
        match frame.operation() {
            ops::AUTH_REPLY => {
                if self.state == ConnState::Authenticating {
                    self.state = ConnState::Authenticated;
                    step.authenticated = true;
                    tracing::debug!("authenticated");
                    // One immediate heartbeat; the periodic timer takes over.
                    match self.encode(ops::HEARTBEAT, b"") {
                        Ok(hb) => step.outbound.push(hb),
                        Err(e) => tracing::error!(error = %e, "failed to encode heartbeat"),
                    }
                } else {
                    tracing::debug!(state = ?self.state, "ignoring auth reply");
                }
            }
            ops::HEARTBEAT_REPLY => {
                tracing::debug!(seq = frame.sequence(), "heartbeat reply");
            }
            op if ops::is_control(op) => {
                tracing::debug!(op, "ignoring control frame");
            }
            op => {
                if self.state == ConnState::Authenticated {
                    step.deliveries.push(Message {
                        version: frame.version(),
                        operation: op,
                        sequence: frame.sequence(),
                        body: frame.body,
                    });
                } else {
                    tracing::debug!(op, state = ?self.state, "ignoring data frame before auth");
                }
            }
        }
    }

    /// Heartbeat timer fired. Yields a frame only while authenticated.
    pub fn heartbeat(&mut self) -> Option<Bytes> {
        if self.state != ConnState::Authenticated {
            return None;
        }
        match self.encode(ops::HEARTBEAT, b"") {
            Ok(frame) => Some(frame),
            Err(e) => {
                tracing::error!(error = %e, "failed to encode heartbeat");
                None
            }
        }
    }

    /// Encode an application frame for sending; authenticated sessions only.
    pub fn encode_send(&mut self, operation: u32, body: &[u8]) -> Result<Bytes> {
        if self.state != ConnState::Authenticated {
            return Err(SublinkError::NotAuthenticated);
        }
        self.encode(operation, body)
    }

    /// Socket closed: terminal for this session.
    pub fn on_close(&mut self) {
        self.state = ConnState::Closed;
    }

    fn encode(&mut self, operation: u32, body: &[u8]) -> Result<Bytes> {
        self.sequence = self.sequence.wrapping_add(1);
        self.format
            .encode(PROTOCOL_VERSION, operation, self.sequence, body)
    }
}
