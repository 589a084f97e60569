//! # sublink-client
//!
//! Rust client SDK for sublink persistent publish/subscribe streams.
//!
//! This crate maintains a long-lived WebSocket connection to a message
//! distribution server: it performs the authentication handshake, keeps
//! the session alive with periodic heartbeats, decodes the length-prefixed
//! binary frame format (including batched multi-frame payloads) and
//! recovers from disconnection with bounded exponential backoff.
//!
//! ## Architecture
//!
//! - **Frame codec** ([`codec`]): binary and JSON wire profiles behind one
//!   [`codec::WireFormat`] selector
//! - **Connection state machine** ([`session`]): sans-I/O core owning the
//!   `Connecting → Authenticating → Authenticated → Closed` lifecycle
//! - **Reconnect policy** ([`backoff`]): inspectable bounded-attempt
//!   exponential backoff
//! - **Dispatch** ([`dispatch`]): routes decoded payloads and status
//!   changes to the application's [`Subscriber`]
//!
//! ## Example
//!
//! ```ignore
//! use sublink_client::{AuthPayload, Client, Message};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = Client::builder("ws://127.0.0.1:3102/sub")
//!         .auth(AuthPayload::new(123, "live://1000"))
//!         .subscriber(|message: Message| println!("{}", message.body_text()))
//!         .start();
//!
//!     client.wait_for_shutdown().await.unwrap();
//! }
//! ```

pub mod backoff;
pub mod codec;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod protocol;
pub mod session;

mod client;

pub use client::{Client, ClientBuilder};
pub use config::{AuthPayload, ClientConfig};
pub use dispatch::{ConnectionStatus, Message, Subscriber};
pub use error::SublinkError;
