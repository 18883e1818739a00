//! BroadcastHub: presence, policy and fan-out
//!
//! Every connection moves through three states:
//! - registered but unnamed, after `connect`
//! - named, after `start` adds it to the presence registry
//! - terminated, after `disconnect` removes every trace of it
//!
//! Events for ids the hub does not know are ignored, which is how a
//! terminated connection stays terminated.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::connection::Connection;
use crate::error::MessageRejected;
use crate::filter::{ProfanityFilter, WordListFilter};
use crate::message::{OutboundMessage, ServerMessage};
use crate::presence::PresenceRegistry;
use crate::rate_limit::{RateLimitConfig, RateLimiter};
use crate::sanitize::{message_len, sanitize_username, trim_message, MAX_MESSAGE_CHARS};
use crate::types::{ConnectionId, Millis};

/// Name used for messages from connections that never sent `start`
pub const ANONYMOUS: &str = "anonymous";

/// Owns all shared chat state
pub struct BroadcastHub {
    /// Every live connection, named or not
    connections: HashMap<ConnectionId, Connection>,
    presence: PresenceRegistry,
    limiter: RateLimiter,
    filter: Box<dyn ProfanityFilter>,
    clock: Box<dyn Clock>,
}

impl BroadcastHub {
    /// Create a hub using the wall clock and the default word filter
    pub fn new(rate_limit: RateLimitConfig) -> Self {
        Self::with_parts(
            rate_limit,
            Box::new(WordListFilter::default()),
            Box::new(SystemClock),
        )
    }

    pub fn with_parts(
        rate_limit: RateLimitConfig,
        filter: Box<dyn ProfanityFilter>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            connections: HashMap::new(),
            presence: PresenceRegistry::new(),
            limiter: RateLimiter::new(rate_limit),
            filter,
            clock,
        }
    }

    /// Register a freshly accepted connection
    pub fn connect(&mut self, id: ConnectionId, sender: mpsc::Sender<ServerMessage>) {
        if self.connections.contains_key(&id) {
            warn!("Connection {} registered twice, ignoring", id);
            return;
        }
        self.connections.insert(id, Connection::new(id, sender));
        debug!("Total connections: {}", self.connections.len());
    }

    /// Handle a client announcing its display name
    pub fn start(&mut self, id: ConnectionId, requested: &str) {
        if !self.connections.contains_key(&id) {
            return;
        }
        if let Some(existing) = self.presence.username_of(id) {
            debug!("Connection {} already started as '{}', ignoring", id, existing);
            return;
        }

        let mut username = sanitize_username(requested);
        if username.is_empty() {
            username = id.fallback_username();
        }

        info!("Connection {} joined as '{}'", id, username);
        self.presence.add(id, username.clone());

        let now = self.clock.now_millis();
        self.broadcast_online_count();
        self.broadcast(ServerMessage::system(format!("{username} joined"), now));
    }

    /// Handle an incoming chat message
    pub fn message(&mut self, id: ConnectionId, raw: &str) {
        if !self.connections.contains_key(&id) {
            return;
        }

        let text = trim_message(raw);
        if text.is_empty() {
            return;
        }

        let now = self.clock.now_millis();
        if let Err(rejected) = self.admit(id, text, now) {
            debug!("Message from {} rejected: {}", id, rejected);
            self.send_to(id, rejected.into());
            return;
        }

        let username = self
            .presence
            .username_of(id)
            .unwrap_or(ANONYMOUS)
            .to_string();

        self.broadcast(ServerMessage::Message(OutboundMessage {
            username,
            text: self.filter.clean(text),
            sent_at: now,
        }));
    }

    /// Handle a closed socket
    pub fn disconnect(&mut self, id: ConnectionId) {
        if self.connections.remove(&id).is_none() {
            return;
        }
        self.limiter.remove(id);

        let now = self.clock.now_millis();
        match self.presence.remove(id) {
            Some(username) => {
                info!("Connection {} ('{}') left", id, username);
                self.broadcast(ServerMessage::system(format!("{username} left"), now));
            }
            None => info!("Connection {} left without joining", id),
        }
        self.broadcast_online_count();

        debug!("Total connections: {}", self.connections.len());
    }

    /// Apply length and rate policy, recording the message on success
    fn admit(&mut self, id: ConnectionId, text: &str, now: Millis) -> Result<(), MessageRejected> {
        if message_len(text) > MAX_MESSAGE_CHARS {
            return Err(MessageRejected::TooLong {
                max: MAX_MESSAGE_CHARS,
            });
        }
        self.limiter.check_and_record(id, now)?;
        Ok(())
    }

    fn broadcast_online_count(&self) {
        self.broadcast(ServerMessage::OnlineCount {
            count: self.presence.count(),
        });
    }

    /// Deliver to every connection; one failed delivery does not stop the rest
    fn broadcast(&self, msg: ServerMessage) {
        for conn in self.connections.values() {
            if let Err(e) = conn.send(msg.clone()) {
                warn!("Dropped broadcast to {}: {}", conn.id, e);
            }
        }
    }

    fn send_to(&self, id: ConnectionId, msg: ServerMessage) {
        if let Some(conn) = self.connections.get(&id) {
            if let Err(e) = conn.send(msg) {
                warn!("Dropped reply to {}: {}", id, e);
            }
        }
    }

    /// Number of named connections
    pub fn online_count(&self) -> usize {
        self.presence.count()
    }

    /// Number of live connections, named or not
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn username_of(&self, id: ConnectionId) -> Option<&str> {
        self.presence.username_of(id)
    }

    /// Number of connections holding rate limit state
    pub fn rate_limited_connections(&self) -> usize {
        self.limiter.tracked()
    }
}
