//! Broadcast WebSocket Chat Server Library
//!
//! A WebSocket chat server built with tokio-tungstenite where every
//! connected client sees every message.
//!
//! # Features
//! - Display names, sanitized and bounded
//! - Online count and join/leave notices
//! - Per-connection rate limiting (cooldown plus sliding window)
//! - Profanity filtering of broadcast text
//! - Plain HTTP liveness reply on the same port
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `ChatServer` is the central actor owning the `BroadcastHub`
//! - Each connection has a `handler` task communicating with the server
//! - No locks needed - all state access goes through message passing
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use tokio::sync::mpsc;
//! use broadcast_chat::{handle_connection, BroadcastHub, ChatServer, RateLimitConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = TcpListener::bind("127.0.0.1:3000").await.unwrap();
//!     let (cmd_tx, cmd_rx) = mpsc::channel(256);
//!
//!     let hub = BroadcastHub::new(RateLimitConfig::default());
//!     tokio::spawn(ChatServer::new(hub, cmd_rx).run());
//!
//!     while let Ok((stream, _)) = listener.accept().await {
//!         let cmd_tx = cmd_tx.clone();
//!         tokio::spawn(handle_connection(stream, cmd_tx, 64));
//!     }
//! }
//! ```

pub mod clock;
pub mod config;
pub mod connection;
pub mod error;
pub mod filter;
pub mod handler;
pub mod hub;
pub mod message;
pub mod presence;
pub mod rate_limit;
pub mod sanitize;
pub mod server;
pub mod types;

// Re-export main types for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ServerConfig;
pub use connection::Connection;
pub use error::{AppError, ConfigError, MessageRejected, RateLimitError, SendError};
pub use filter::{PassThrough, ProfanityFilter, WordListFilter};
pub use handler::handle_connection;
pub use hub::BroadcastHub;
pub use message::{ClientMessage, OutboundMessage, ServerMessage};
pub use presence::PresenceRegistry;
pub use rate_limit::{RateLimitConfig, RateLimiter};
pub use sanitize::{sanitize_username, trim_message};
pub use server::{ChatServer, ServerCommand};
pub use types::{ConnectionId, Millis};
