//! Client configuration and the authentication payload.
//!
//! Every setting is owned per client instance; nothing here is process
//! global. The endpoint URL and the subscriber/channel identifiers are
//! deployment contracts with the server, not protocol constants.

use std::time::Duration;

use serde::Serialize;

use crate::codec::WireFormat;

/// Default heartbeat cadence once authenticated.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Default window to receive an auth acknowledgment before force-closing.
pub const DEFAULT_AUTH_TIMEOUT: Duration = Duration::from_secs(10);

/// Default maximum reconnect attempts.
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 10;

/// Default delay before the first reconnect attempt; doubles per attempt.
pub const DEFAULT_INITIAL_RECONNECT_DELAY: Duration = Duration::from_millis(15_000);

/// Authentication payload sent in the body of the auth frame.
///
/// The schema is an external contract with the server; the codec treats
/// the serialized form as an opaque byte payload.
#[derive(Debug, Clone, Serialize)]
pub struct AuthPayload {
    /// Subscriber identifier.
    pub mid: i64,
    /// Room/channel identifier, e.g. `"live://1000"`.
    pub room_id: String,
    /// Platform tag.
    pub platform: String,
    /// Operation codes this subscriber accepts.
    pub accepts: Vec<i32>,
}

impl AuthPayload {
    /// Create an auth payload for the given subscriber and room.
    pub fn new(mid: i64, room_id: impl Into<String>) -> Self {
        Self {
            mid,
            room_id: room_id.into(),
            platform: "web".to_string(),
            accepts: Vec::new(),
        }
    }
}

/// Per-client connection configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint, e.g. `ws://127.0.0.1:3102/sub`.
    pub url: String,
    /// Authentication payload.
    pub auth: AuthPayload,
    /// Wire profile.
    pub wire_format: WireFormat,
    /// Heartbeat cadence while authenticated.
    pub heartbeat_interval: Duration,
    /// How long to wait for the auth acknowledgment.
    pub auth_timeout: Duration,
    /// Maximum automatic reconnect attempts.
    pub max_reconnect_attempts: u32,
    /// Delay before the first reconnect attempt.
    pub initial_reconnect_delay: Duration,
}

impl ClientConfig {
    /// Create a configuration with default timings for the given endpoint.
    pub fn new(url: impl Into<String>, auth: AuthPayload) -> Self {
        Self {
            url: url.into(),
            auth,
            wire_format: WireFormat::default(),
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            auth_timeout: DEFAULT_AUTH_TIMEOUT,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            initial_reconnect_delay: DEFAULT_INITIAL_RECONNECT_DELAY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_payload_serializes_to_token_schema() {
        let auth = AuthPayload {
            mid: 123,
            room_id: "live://1000".to_string(),
            platform: "web".to_string(),
            accepts: vec![1000, 1001, 1002],
        };

        let json = serde_json::to_value(&auth).unwrap();
        assert_eq!(json["mid"], 123);
        assert_eq!(json["room_id"], "live://1000");
        assert_eq!(json["platform"], "web");
        assert_eq!(json["accepts"], serde_json::json!([1000, 1001, 1002]));
    }

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::new("ws://127.0.0.1:3102/sub", AuthPayload::new(1, "live://1"));

        assert_eq!(config.heartbeat_interval, DEFAULT_HEARTBEAT_INTERVAL);
        assert_eq!(config.auth_timeout, DEFAULT_AUTH_TIMEOUT);
        assert_eq!(config.max_reconnect_attempts, 10);
        assert_eq!(config.initial_reconnect_delay, Duration::from_millis(15_000));
        assert_eq!(config.wire_format, WireFormat::Binary);
    }
}
