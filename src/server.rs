//! ChatServer Actor implementation
//!
//! The single task that owns the `BroadcastHub`. Connection handlers talk
//! to it through an mpsc channel, so hub state never needs a lock.

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::hub::BroadcastHub;
use crate::message::ServerMessage;
use crate::types::ConnectionId;

/// Commands sent from handlers to the ChatServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// New socket accepted
    Connect {
        connection_id: ConnectionId,
        sender: mpsc::Sender<ServerMessage>,
    },
    /// Client announced a display name
    Start {
        connection_id: ConnectionId,
        username: String,
    },
    /// Client sent a chat message
    Message {
        connection_id: ConnectionId,
        text: String,
    },
    /// Socket closed
    Disconnect {
        connection_id: ConnectionId,
    },
}

/// The main ChatServer actor
pub struct ChatServer {
    hub: BroadcastHub,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
}

impl ChatServer {
    /// Create a new ChatServer around a hub and a command receiver
    pub fn new(hub: BroadcastHub, receiver: mpsc::Receiver<ServerCommand>) -> Self {
        Self { hub, receiver }
    }

    /// Run the ChatServer event loop
    ///
    /// Continuously receives and processes commands until all senders are dropped.
    pub async fn run(mut self) {
        info!("ChatServer started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        info!("ChatServer shutting down");
    }

    /// Process a single command
    fn handle_command(&mut self, cmd: ServerCommand) {
        match cmd {
            ServerCommand::Connect {
                connection_id,
                sender,
            } => {
                debug!("Connect {}", connection_id);
                self.hub.connect(connection_id, sender);
            }
            ServerCommand::Start {
                connection_id,
                username,
            } => {
                self.hub.start(connection_id, &username);
            }
            ServerCommand::Message {
                connection_id,
                text,
            } => {
                self.hub.message(connection_id, &text);
            }
            ServerCommand::Disconnect { connection_id } => {
                debug!("Disconnect {}", connection_id);
                self.hub.disconnect(connection_id);
            }
        }
    }
}
