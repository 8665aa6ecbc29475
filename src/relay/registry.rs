//! Connection Registry Module
//!
//! Maps a caller-supplied user identifier to the one live socket that should
//! receive that user's events.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info};

/// Sending half kept in the registry for one live connection.
#[derive(Debug)]
struct ClientHandle {
    id: u64,
    tx: mpsc::UnboundedSender<String>,
}

/// Returned to a newly registered connection.
///
/// The receiver yields payloads to forward to the socket, and ends when the
/// registration is superseded or removed.
#[derive(Debug)]
pub struct Registration {
    pub id: u64,
    pub receiver: mpsc::UnboundedReceiver<String>,
}

// == Connection Registry ==
/// Shared, cloneable registry of live connections.
///
/// At most one connection per identifier; the newest registration wins.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    clients: Arc<RwLock<HashMap<String, ClientHandle>>>,
    next_id: Arc<AtomicU64>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // == Register ==
    /// Registers a connection for `user_id`.
    ///
    /// A previous connection under the same identifier loses its sender, which
    /// makes its session close the socket.
    pub async fn register(&self, user_id: &str) -> Registration {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, receiver) = mpsc::unbounded_channel();

        let previous = self
            .clients
            .write()
            .await
            .insert(user_id.to_string(), ClientHandle { id, tx });

        match previous {
            Some(old) => info!(user_id, old_id = old.id, new_id = id, "Replaced live connection"),
            None => info!(user_id, connection_id = id, "Registered live connection"),
        }

        Registration { id, receiver }
    }

    // == Unregister ==
    /// Removes the mapping for `user_id` if it still belongs to connection `id`.
    ///
    /// Returns false when a newer connection has taken over the identifier.
    pub async fn unregister(&self, user_id: &str, id: u64) -> bool {
        let mut clients = self.clients.write().await;
        match clients.get(user_id) {
            Some(handle) if handle.id == id => {
                clients.remove(user_id);
                info!(user_id, connection_id = id, "Unregistered live connection");
                true
            }
            _ => false,
        }
    }

    // == Deliver ==
    /// Pushes `payload` to the connection registered for `user_id`.
    ///
    /// Best effort: returns false when nobody is registered or the connection
    /// is no longer open. Nothing is queued for later.
    pub async fn deliver(&self, user_id: &str, payload: String) -> bool {
        let clients = self.clients.read().await;
        let Some(handle) = clients.get(user_id) else {
            debug!(user_id, "No live connection for user");
            return false;
        };
        if handle.tx.is_closed() {
            debug!(user_id, connection_id = handle.id, "Live connection already closed");
            return false;
        }
        handle.tx.send(payload).is_ok()
    }

    pub async fn is_connected(&self, user_id: &str) -> bool {
        self.clients
            .read()
            .await
            .get(user_id)
            .is_some_and(|handle| !handle.tx.is_closed())
    }

    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.clients.read().await.is_empty()
    }
}
