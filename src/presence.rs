//! Presence registry
//!
//! Maps live connections to the username they announced. Its size is the
//! online count sent to clients.

use std::collections::HashMap;

use crate::types::ConnectionId;

/// Who is online
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    sessions: HashMap<ConnectionId, String>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session for a connection
    pub fn add(&mut self, id: ConnectionId, username: String) {
        self.sessions.insert(id, username);
    }

    /// Remove a session, returning its username if one was registered
    pub fn remove(&mut self, id: ConnectionId) -> Option<String> {
        self.sessions.remove(&id)
    }

    /// Number of named connections
    pub fn count(&self) -> usize {
        self.sessions.len()
    }

    pub fn username_of(&self, id: ConnectionId) -> Option<&str> {
        self.sessions.get(&id).map(String::as_str)
    }
}
