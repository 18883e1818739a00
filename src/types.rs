//! Basic type definitions for the chat server
//!
//! Provides the `ConnectionId` newtype and the timestamp representation
//! shared by the rate limiter and the outbound protocol.

use uuid::Uuid;

/// Milliseconds since the Unix epoch
pub type Millis = u64;

/// Number of hex characters used for fallback usernames
const SHORT_ID_LEN: usize = 4;

/// Unique connection identifier (newtype pattern)
///
/// Wraps a UUID v4 assigned when a socket is accepted.
/// Implements Hash and Eq for use as HashMap keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Short hex prefix of the identifier
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..SHORT_ID_LEN].to_string()
    }

    /// Display name used when a client announces an empty username
    pub fn fallback_username(&self) -> String {
        format!("user-{}", self.short())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_unique() {
        let id1 = ConnectionId::new();
        let id2 = ConnectionId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_short_is_uuid_prefix() {
        let id = ConnectionId(Uuid::parse_str("9f3a1c2e-0000-4000-8000-000000000000").unwrap());
        assert_eq!(id.short(), "9f3a");
        assert_eq!(id.fallback_username(), "user-9f3a");
    }
}
