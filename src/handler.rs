//! WebSocket connection handler
//!
//! Handles individual client connections: liveness probes, WebSocket
//! handshake, message parsing, and bidirectional communication with the
//! ChatServer.

use futures_util::{SinkExt, StreamExt};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout, Duration};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::error::AppError;
use crate::message::{ClientMessage, ServerMessage};
use crate::server::ServerCommand;
use crate::types::ConnectionId;

/// Body returned to plain HTTP requests
pub const LIVENESS_BODY: &str = "Chat server is running";

/// Bytes inspected when deciding between HTTP and WebSocket
const PEEK_LEN: usize = 2048;

/// Time a client gets to finish sending its request head
const REQUEST_HEAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Pause between peeks while the request head is incomplete
const PEEK_INTERVAL: Duration = Duration::from_millis(10);

/// Handle a new TCP connection
///
/// Plain HTTP requests get the liveness reply. Everything else goes
/// through the WebSocket handshake and lives until the socket closes.
pub async fn handle_connection(
    stream: TcpStream,
    cmd_tx: mpsc::Sender<ServerCommand>,
    outbox_buffer: usize,
) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    debug!("New TCP connection from {}", peer_addr);

    let mut head = [0u8; PEEK_LEN];
    let n = match timeout(REQUEST_HEAD_TIMEOUT, peek_request_head(&stream, &mut head)).await {
        Ok(Ok(0)) => {
            debug!("{} closed before sending a request", peer_addr);
            return Ok(());
        }
        Ok(result) => result?,
        Err(_) => {
            debug!("{} timed out sending a request head", peer_addr);
            return Ok(());
        }
    };
    if !is_websocket_upgrade(&head[..n]) {
        debug!("Liveness request from {}", peer_addr);
        return respond_liveness(stream).await;
    }

    // WebSocket handshake
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let connection_id = ConnectionId::new();
    info!("Client {} connected from {}", connection_id, peer_addr);

    // Create channel for server -> client messages
    let (msg_tx, mut msg_rx) = mpsc::channel::<ServerMessage>(outbox_buffer);

    // Register with ChatServer
    if cmd_tx
        .send(ServerCommand::Connect {
            connection_id,
            sender: msg_tx,
        })
        .await
        .is_err()
    {
        error!("Failed to register client {} - server closed", connection_id);
        return Err(AppError::ChannelSend);
    }

    // Clone cmd_tx for read task
    let cmd_tx_read = cmd_tx.clone();

    // Spawn read task (WebSocket -> ServerCommand)
    let mut read_task = tokio::spawn(async move {
        while let Some(msg_result) = ws_receiver.next().await {
            match msg_result {
                Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => {
                        let cmd = client_message_to_command(connection_id, client_msg);
                        if cmd_tx_read.send(cmd).await.is_err() {
                            debug!("Server closed, ending read task for {}", connection_id);
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Invalid message from {}: {}", connection_id, e);
                    }
                },
                Ok(Message::Close(_)) => {
                    debug!("Client {} sent close frame", connection_id);
                    break;
                }
                Ok(_) => {
                    // Binary, ping and pong frames carry no chat events
                }
                Err(e) => {
                    error!("WebSocket error for {}: {}", connection_id, e);
                    break;
                }
            }
        }
        debug!("Read task ended for {}", connection_id);
    });

    // Spawn write task (ServerMessage -> WebSocket)
    let mut write_task = tokio::spawn(async move {
        while let Some(msg) = msg_rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json.into())).await.is_err() {
                        debug!("WebSocket send failed, ending write task");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize message: {}", e);
                }
            }
        }
        debug!("Write task ended for {}", connection_id);

        let _ = ws_sender.close().await;
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut read_task => {
            debug!("Read task completed for {}", connection_id);
        }
        _ = &mut write_task => {
            debug!("Write task completed for {}", connection_id);
        }
    }

    // The reader holds half of the socket; release it once writing is over
    read_task.abort();

    // Removing the connection drops its outbox, which ends the write task
    let _ = cmd_tx
        .send(ServerCommand::Disconnect { connection_id })
        .await;

    info!("Client {} disconnected", connection_id);

    Ok(())
}

/// Peek until the full request head has arrived
///
/// Returns the number of bytes available in `buf`, or 0 if the peer closed
/// without sending anything. Stops early when `buf` is full.
async fn peek_request_head(stream: &TcpStream, buf: &mut [u8]) -> std::io::Result<usize> {
    loop {
        let n = stream.peek(buf).await?;
        if n == 0 || n == buf.len() || has_head_terminator(&buf[..n]) {
            return Ok(n);
        }
        sleep(PEEK_INTERVAL).await;
    }
}

fn has_head_terminator(bytes: &[u8]) -> bool {
    bytes.windows(4).any(|w| w == b"\r\n\r\n")
}

/// Whether the request head asks for a WebSocket upgrade
fn is_websocket_upgrade(head: &[u8]) -> bool {
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();
    head.lines().any(|line| {
        line.split_once(':').is_some_and(|(name, value)| {
            name.trim() == "upgrade" && value.trim() == "websocket"
        })
    })
}

async fn respond_liveness(mut stream: TcpStream) -> Result<(), AppError> {
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        LIVENESS_BODY.len(),
        LIVENESS_BODY
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}

/// Convert a ClientMessage to a ServerCommand
fn client_message_to_command(connection_id: ConnectionId, msg: ClientMessage) -> ServerCommand {
    match msg {
        ClientMessage::Start { username } => ServerCommand::Start {
            connection_id,
            username,
        },
        ClientMessage::Message { text } => ServerCommand::Message {
            connection_id,
            text,
        },
    }
}
