//! Room fan-out
//!
//! The gateway only talks to connections through the [`Room`] capability.
//! [`BroadcastRoom`] implements it with one unbounded queue per connection:
//! a publish writes straight into the queues of every addressed connection,
//! so nothing is dropped and each connection sees messages in publish order.

use crate::protocol::ServerMessage;
use crate::types::ConnectionId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

pub type ConnectionTx = mpsc::UnboundedSender<Arc<ServerMessage>>;
pub type ConnectionRx = mpsc::UnboundedReceiver<Arc<ServerMessage>>;

/// Outbound side of the "broadcast" room
pub trait Room: Send + Sync {
    /// Reply to one connection only
    fn send_to(&self, connection_id: &ConnectionId, msg: ServerMessage);

    /// Everyone in the room except `connection_id`
    fn broadcast_all_except(&self, connection_id: &ConnectionId, msg: ServerMessage);

    fn broadcast_all(&self, msg: ServerMessage);
}

/// Who a published message is addressed to
#[derive(Debug, Clone, PartialEq)]
pub enum Audience {
    All,
    AllExcept(ConnectionId),
    Only(ConnectionId),
}

impl Audience {
    pub fn includes(&self, connection_id: &str) -> bool {
        match self {
            Audience::All => true,
            Audience::AllExcept(excluded) => excluded != connection_id,
            Audience::Only(target) => target == connection_id,
        }
    }
}

#[derive(Debug, Default)]
pub struct BroadcastRoom {
    connections: Mutex<HashMap<ConnectionId, ConnectionTx>>,
}

impl BroadcastRoom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to the room and hand back its outbound queue
    pub fn register(&self, connection_id: ConnectionId) -> ConnectionRx {
        let (tx, rx) = mpsc::unbounded_channel();
        if self.connections().insert(connection_id.clone(), tx).is_some() {
            tracing::warn!("Connection {} registered twice", connection_id);
        }
        rx
    }

    /// Returns whether the connection was in the room
    pub fn unregister(&self, connection_id: &str) -> bool {
        self.connections().remove(connection_id).is_some()
    }

    pub fn connection_count(&self) -> usize {
        self.connections().len()
    }

    // A panic elsewhere cannot leave the map half-updated, so a poisoned
    // lock is still safe to use.
    fn connections(&self) -> MutexGuard<'_, HashMap<ConnectionId, ConnectionTx>> {
        self.connections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, audience: Audience, message: ServerMessage) {
        let message = Arc::new(message);
        for (connection_id, tx) in self.connections().iter() {
            if !audience.includes(connection_id) {
                continue;
            }
            // A closed queue belongs to a connection that is shutting down
            if tx.send(message.clone()).is_err() {
                tracing::debug!("Dropping message for closing connection {}", connection_id);
            }
        }
    }
}

impl Room for BroadcastRoom {
    fn send_to(&self, connection_id: &ConnectionId, msg: ServerMessage) {
        self.publish(Audience::Only(connection_id.clone()), msg);
    }

    fn broadcast_all_except(&self, connection_id: &ConnectionId, msg: ServerMessage) {
        self.publish(Audience::AllExcept(connection_id.clone()), msg);
    }

    fn broadcast_all(&self, msg: ServerMessage) {
        self.publish(Audience::All, msg);
    }
}
