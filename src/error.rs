//! Error types for the chat server
//!
//! Defines fatal connection errors, outbox send errors and the soft
//! policy rejections reported back to a single client.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Application-level errors
///
/// All of these end the affected connection handler (or startup, for
/// configuration). None of them reach other connections.
#[derive(Debug, Error)]
pub enum AppError {
    /// WebSocket protocol error (fatal)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send error (fatal - internal channel broken)
    #[error("Channel send error")]
    ChannelSend,

    /// Invalid server configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Message send errors
///
/// Delivery to a connection is best-effort; these are logged and dropped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,

    /// The connection's outbox is full
    #[error("Outbox full")]
    Full,
}

/// Rate limiter rejections
///
/// The display text is the reason shown to the client.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum RateLimitError {
    /// Less than the cooldown elapsed since the previous accepted message
    #[error("Slow down.")]
    Cooldown,

    /// Too many accepted messages inside the sliding window
    #[error("You are sending messages too quickly.")]
    WindowExceeded,
}

/// Reasons a chat message is refused without being broadcast
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum MessageRejected {
    /// Trimmed message is longer than the limit
    #[error("Message too long (max {max} chars).")]
    TooLong { max: usize },

    /// Sender is over the rate limit
    #[error(transparent)]
    RateLimited(#[from] RateLimitError),
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable held something other than the expected number
    #[error("invalid value for {key}: {value:?}")]
    InvalidNumber { key: &'static str, value: String },

    /// A limit that must be positive was zero
    #[error("{key} must be greater than zero")]
    Zero { key: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_reasons() {
        assert_eq!(RateLimitError::Cooldown.to_string(), "Slow down.");
        assert_eq!(
            RateLimitError::WindowExceeded.to_string(),
            "You are sending messages too quickly."
        );
        assert_eq!(
            MessageRejected::TooLong { max: 300 }.to_string(),
            "Message too long (max 300 chars)."
        );
    }

    #[test]
    fn test_rate_limited_is_transparent() {
        let rejected: MessageRejected = RateLimitError::Cooldown.into();
        assert_eq!(rejected.to_string(), "Slow down.");
    }
}
