//! Client builder and connection loop.
//!
//! The [`ClientBuilder`] provides a fluent API for configuring the
//! endpoint, auth payload, wire profile and timings. [`Client::start`]
//! spawns the connection task which owns the whole lifecycle:
//! 1. Connect the WebSocket
//! 2. Send the auth request, wait for the acknowledgment
//! 3. Read socket messages, decode frames, deliver data payloads
//! 4. Keep the session alive with periodic heartbeats
//! 5. On close, reconnect with bounded exponential backoff
//!
//! One connection per client; the client is a single-writer object and is
//! not designed for concurrent connect/disconnect callers.
//!
//! # Example
//!
//! ```ignore
//! use sublink_client::{AuthPayload, Client};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::builder("ws://127.0.0.1:3102/sub")
//!         .auth(AuthPayload::new(123, "live://1000"))
//!         .subscriber(|message: sublink_client::Message| {
//!             println!("{}", message.body_text());
//!         })
//!         .start();
//!
//!     client.wait_for_shutdown().await?;
//!     Ok(())
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::{Sink, SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use crate::backoff::ReconnectPolicy;
use crate::codec::WireFormat;
use crate::config::{AuthPayload, ClientConfig};
use crate::dispatch::{self, ConnectionStatus, NullSubscriber, Subscriber};
use crate::error::{Result, SublinkError};
use crate::session::Session;

/// Capacity of the outbound application-message queue.
const OUTBOUND_CHANNEL_CAPACITY: usize = 64;

/// Builder for configuring and starting a sublink client.
pub struct ClientBuilder {
    config: ClientConfig,
    subscriber: Arc<dyn Subscriber>,
}

impl ClientBuilder {
    /// Create a builder for the given endpoint, e.g. `ws://host:3102/sub`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            config: ClientConfig::new(url, AuthPayload::new(0, "")),
            subscriber: Arc::new(NullSubscriber),
        }
    }

    /// Set the authentication payload.
    pub fn auth(mut self, auth: AuthPayload) -> Self {
        self.config.auth = auth;
        self
    }

    /// Select the wire profile. Default: binary.
    pub fn wire_format(mut self, format: WireFormat) -> Self {
        self.config.wire_format = format;
        self
    }

    /// Set the heartbeat cadence. Default: 30s.
    pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.config.heartbeat_interval = interval;
        self
    }

    /// Set the auth acknowledgment window. Default: 10s.
    pub fn auth_timeout(mut self, timeout: Duration) -> Self {
        self.config.auth_timeout = timeout;
        self
    }

    /// Set the maximum automatic reconnect attempts. Default: 10.
    pub fn max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.config.max_reconnect_attempts = attempts;
        self
    }

    /// Set the delay before the first reconnect attempt. Default: 15s.
    pub fn initial_reconnect_delay(mut self, delay: Duration) -> Self {
        self.config.initial_reconnect_delay = delay;
        self
    }

    /// Set the subscriber receiving payloads and status changes.
    pub fn subscriber(mut self, subscriber: impl Subscriber) -> Self {
        self.subscriber = Arc::new(subscriber);
        self
    }

    /// Spawn the connection task and return the running client.
    pub fn start(self) -> Client {
        Client::start(self.config, self.subscriber)
    }
}

/// A running sublink client.
///
/// Use `send()` to publish application frames, `disconnect()` to tear the
/// connection down, and `wait_for_shutdown()` to observe the terminal
/// outcome (clean disconnect or exhausted reconnect attempts).
pub struct Client {
    outbound_tx: mpsc::Sender<(u32, Vec<u8>)>,
    shutdown_tx: watch::Sender<bool>,
    authenticated: Arc<AtomicBool>,
    task: JoinHandle<Result<()>>,
}

impl Client {
    /// Create a new client builder.
    pub fn builder(url: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(url)
    }

    fn start(config: ClientConfig, subscriber: Arc<dyn Subscriber>) -> Self {
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_CHANNEL_CAPACITY);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let authenticated = Arc::new(AtomicBool::new(false));

        let task = tokio::spawn(run(
            config,
            subscriber,
            outbound_rx,
            shutdown_rx,
            authenticated.clone(),
        ));

        Self {
            outbound_tx,
            shutdown_tx,
            authenticated,
            task,
        }
    }

    /// Whether the current session has completed authentication.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::Acquire)
    }

    /// Send an application frame; only legal once authenticated.
    pub async fn send(&self, operation: u32, body: impl Into<Vec<u8>>) -> Result<()> {
        if !self.is_authenticated() {
            return Err(SublinkError::NotAuthenticated);
        }
        self.outbound_tx
            .send((operation, body.into()))
            .await
            .map_err(|_| SublinkError::ConnectionClosed)
    }

    /// Tear the connection down: close the socket, cancel the heartbeat
    /// and any pending reconnect, and stop the connection task.
    pub fn disconnect(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Wait for the connection task to end.
    ///
    /// Returns `Ok(())` after an explicit disconnect, or
    /// [`SublinkError::AttemptsExhausted`] when reconnection gave up.
    pub async fn wait_for_shutdown(self) -> Result<()> {
        self.task.await.map_err(|_| SublinkError::ConnectionClosed)?
    }
}

/// Why one session ended.
enum SessionEnd {
    /// Socket closed or errored; the reconnect policy takes over.
    Closed,
    /// Explicit disconnect; no reconnection.
    Shutdown,
}

/// Connect/reconnect loop; owns the reconnect policy.
async fn run(
    config: ClientConfig,
    subscriber: Arc<dyn Subscriber>,
    mut outbound_rx: mpsc::Receiver<(u32, Vec<u8>)>,
    mut shutdown_rx: watch::Receiver<bool>,
    authenticated: Arc<AtomicBool>,
) -> Result<()> {
    let mut policy = ReconnectPolicy::new(
        config.max_reconnect_attempts,
        config.initial_reconnect_delay,
    );

    loop {
        if *shutdown_rx.borrow() {
            return Ok(());
        }

        dispatch::report(&*subscriber, ConnectionStatus::Connecting);
        let end = match connect_async(config.url.as_str()).await {
            Ok((ws, _response)) => {
                tracing::debug!(url = %config.url, "connected");
                dispatch::report(&*subscriber, ConnectionStatus::Connected);
                run_session(
                    &config,
                    &*subscriber,
                    ws,
                    &mut outbound_rx,
                    &mut shutdown_rx,
                    &authenticated,
                )
                .await
            }
            Err(e) => {
                tracing::warn!(error = %e, url = %config.url, "connect failed");
                SessionEnd::Closed
            }
        };

        authenticated.store(false, Ordering::Release);
        dispatch::report(&*subscriber, ConnectionStatus::Closed);

        if let SessionEnd::Shutdown = end {
            return Ok(());
        }

        match policy.next_delay() {
            Some(delay) => {
                tracing::debug!(
                    ?delay,
                    remaining = policy.attempts_remaining(),
                    "scheduling reconnect"
                );
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = shutdown_rx.changed() => return Ok(()),
                }
            }
            None => {
                tracing::warn!("reconnect attempts exhausted, giving up");
                dispatch::report(&*subscriber, ConnectionStatus::Exhausted);
                return Err(SublinkError::AttemptsExhausted);
            }
        }
    }
}

/// Drive one session over an open socket until it closes.
async fn run_session<S>(
    config: &ClientConfig,
    subscriber: &dyn Subscriber,
    ws: S,
    outbound_rx: &mut mpsc::Receiver<(u32, Vec<u8>)>,
    shutdown_rx: &mut watch::Receiver<bool>,
    authenticated: &AtomicBool,
) -> SessionEnd
where
    S: Sink<WsMessage, Error = tokio_tungstenite::tungstenite::Error>
        + futures_util::Stream<
            Item = std::result::Result<WsMessage, tokio_tungstenite::tungstenite::Error>,
        > + Unpin,
{
    let mut session = match Session::new(config.wire_format, &config.auth) {
        Ok(session) => session,
        Err(e) => {
            tracing::error!(error = %e, "failed to build session");
            return SessionEnd::Closed;
        }
    };
    let (mut sink, mut stream) = ws.split();

    let step = match session.on_open() {
        Ok(step) => step,
        Err(e) => {
            tracing::error!(error = %e, "failed to encode auth request");
            return SessionEnd::Closed;
        }
    };
    if send_frames(&mut sink, config.wire_format, step.outbound)
        .await
        .is_err()
    {
        session.on_close();
        return SessionEnd::Closed;
    }

    let mut heartbeat = tokio::time::interval(config.heartbeat_interval);
    heartbeat.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let auth_deadline = tokio::time::sleep(config.auth_timeout);
    tokio::pin!(auth_deadline);
    let mut outbound_open = true;

    loop {
        tokio::select! {
            inbound = stream.next() => {
                let data = match inbound {
                    Some(Ok(WsMessage::Binary(data))) => data,
                    Some(Ok(WsMessage::Text(text))) => text.into_bytes(),
                    Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_))) => continue,
                    Some(Ok(WsMessage::Close(_))) | None => {
                        tracing::debug!("socket closed by server");
                        session.on_close();
                        return SessionEnd::Closed;
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "socket error");
                        session.on_close();
                        return SessionEnd::Closed;
                    }
                };

                let step = session.on_message(&data);
                if step.authenticated {
                    authenticated.store(true, Ordering::Release);
                    // Restart the cadence from the auth acknowledgment.
                    heartbeat.reset();
                    dispatch::report(subscriber, ConnectionStatus::Authenticated);
                }
                if send_frames(&mut sink, config.wire_format, step.outbound).await.is_err() {
                    session.on_close();
                    return SessionEnd::Closed;
                }
                for message in step.deliveries {
                    dispatch::deliver(subscriber, message);
                }
            }

            _ = heartbeat.tick(), if session.is_authenticated() => {
                if let Some(frame) = session.heartbeat() {
                    tracing::debug!("send heartbeat");
                    if send_frames(&mut sink, config.wire_format, vec![frame]).await.is_err() {
                        session.on_close();
                        return SessionEnd::Closed;
                    }
                }
            }

            _ = &mut auth_deadline, if !session.is_authenticated() => {
                tracing::warn!(timeout = ?config.auth_timeout, "no auth reply, closing");
                let _ = sink.send(WsMessage::Close(None)).await;
                session.on_close();
                return SessionEnd::Closed;
            }

            outbound = outbound_rx.recv(), if outbound_open => {
                match outbound {
                    Some((operation, body)) => match session.encode_send(operation, &body) {
                        Ok(frame) => {
                            if send_frames(&mut sink, config.wire_format, vec![frame]).await.is_err() {
                                session.on_close();
                                return SessionEnd::Closed;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, op = operation, "dropping outbound message");
                        }
                    },
                    None => outbound_open = false,
                }
            }

            _ = shutdown_rx.changed() => {
                tracing::debug!("disconnect requested");
                let _ = sink.send(WsMessage::Close(None)).await;
                session.on_close();
                return SessionEnd::Shutdown;
            }
        }
    }
}

/// Write encoded frames to the sink, binary or text per the wire profile.
async fn send_frames<S>(sink: &mut S, format: WireFormat, frames: Vec<Bytes>) -> Result<()>
where
    S: Sink<WsMessage, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    for frame in frames {
        let msg = if format.is_binary() {
            WsMessage::Binary(frame.to_vec())
        } else {
            WsMessage::Text(String::from_utf8_lossy(&frame).into_owned())
        };
        sink.send(msg).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = Client::builder("ws://127.0.0.1:3102/sub");

        assert_eq!(builder.config.url, "ws://127.0.0.1:3102/sub");
        assert_eq!(builder.config.wire_format, WireFormat::Binary);
        assert_eq!(builder.config.max_reconnect_attempts, 10);
    }

    #[test]
    fn test_builder_method_chaining() {
        let builder = Client::builder("ws://example.test/sub")
            .auth(AuthPayload::new(42, "live://7"))
            .wire_format(WireFormat::Json)
            .heartbeat_interval(Duration::from_secs(10))
            .auth_timeout(Duration::from_secs(3))
            .max_reconnect_attempts(5)
            .initial_reconnect_delay(Duration::from_secs(1));

        assert_eq!(builder.config.auth.mid, 42);
        assert_eq!(builder.config.auth.room_id, "live://7");
        assert_eq!(builder.config.wire_format, WireFormat::Json);
        assert_eq!(builder.config.heartbeat_interval, Duration::from_secs(10));
        assert_eq!(builder.config.auth_timeout, Duration::from_secs(3));
        assert_eq!(builder.config.max_reconnect_attempts, 5);
        assert_eq!(builder.config.initial_reconnect_delay, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_send_before_auth_is_rejected() {
        let client = Client::builder("ws://127.0.0.1:1/sub")
            .max_reconnect_attempts(0)
            .start();

        let err = client.send(4, b"{}".as_slice()).await.unwrap_err();
        assert!(matches!(err, SublinkError::NotAuthenticated));

        client.disconnect();
        let _ = client.wait_for_shutdown().await;
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_exhausts_attempts() {
        // Nothing listens on the endpoint; with zero reconnect attempts the
        // first failure is terminal.
        let client = Client::builder("ws://127.0.0.1:1/sub")
            .max_reconnect_attempts(0)
            .start();

        let err = client.wait_for_shutdown().await.unwrap_err();
        assert!(matches!(err, SublinkError::AttemptsExhausted));
    }

    #[tokio::test]
    async fn test_disconnect_during_backoff_stops_reconnection() {
        let client = Client::builder("ws://127.0.0.1:1/sub")
            .max_reconnect_attempts(3)
            .initial_reconnect_delay(Duration::from_secs(60))
            .start();

        // Give the first connect attempt time to fail and enter backoff.
        tokio::time::sleep(Duration::from_millis(200)).await;
        client.disconnect();

        assert!(client.wait_for_shutdown().await.is_ok());
    }
}
