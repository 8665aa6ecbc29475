//! Live Socket Session
//!
//! Drives one upgraded socket: forwards registry messages to the client until
//! either side closes or a newer connection takes over the identifier.

use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use super::{ConnectionRegistry, Registration};

/// Closes a socket that arrived without a usable identifier.
pub async fn reject(mut socket: WebSocket) {
    warn!("Rejecting live connection without userId");
    let frame = CloseFrame {
        code: close_code::POLICY,
        reason: "userId is required".into(),
    };
    let _ = socket.send(Message::Close(Some(frame))).await;
}

/// Runs the session for `user_id` until the connection ends.
pub async fn run(socket: WebSocket, registry: ConnectionRegistry, user_id: String) {
    let Registration { id, mut receiver } = registry.register(&user_id).await;
    let (mut sender, mut inbound) = socket.split();

    loop {
        tokio::select! {
            outbound = receiver.recv() => match outbound {
                Some(payload) => {
                    if let Err(e) = sender.send(Message::Text(payload)).await {
                        warn!(user_id = %user_id, error = %e, "Failed to push event");
                        break;
                    }
                }
                None => {
                    info!(user_id = %user_id, connection_id = id, "Connection superseded, closing");
                    let frame = CloseFrame {
                        code: close_code::NORMAL,
                        reason: "replaced by a newer connection".into(),
                    };
                    let _ = sender.send(Message::Close(Some(frame))).await;
                    break;
                }
            },
            incoming = inbound.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => {
                    debug!(user_id = %user_id, connection_id = id, "Client closed connection");
                    break;
                }
                Some(Err(e)) => {
                    warn!(user_id = %user_id, error = %e, "Live connection error");
                    break;
                }
                // Clients have nothing to say; pings are answered by the socket layer
                Some(Ok(_)) => {}
            },
        }
    }

    registry.unregister(&user_id, id).await;
}
