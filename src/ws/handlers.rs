//! Event dispatch
//!
//! The gateway turns one parsed client event into a registry call and
//! publishes the result to the right audience. The registry lock is held
//! across both, so publish order always matches mutation order.

use crate::broadcast::Room;
use crate::protocol::{ClientMessage, ProtocolError};
use crate::state::SessionRegistry;
use crate::types::ConnectionId;
use tokio::sync::Mutex;

pub struct Gateway<R> {
    pub(super) registry: Mutex<SessionRegistry>,
    pub(super) room: R,
    /// Announce `dead` even when no player matched the id
    pub(super) always_emit_dead: bool,
}

impl<R: Room> Gateway<R> {
    pub fn new(registry: SessionRegistry, room: R, always_emit_dead: bool) -> Self {
        Self {
            registry: Mutex::new(registry),
            room,
            always_emit_dead,
        }
    }

    pub fn room(&self) -> &R {
        &self.room
    }

    /// Read-only view of the registry, mostly for tests and diagnostics
    pub async fn inspect<T>(&self, f: impl FnOnce(&SessionRegistry) -> T) -> T {
        f(&*self.registry.lock().await)
    }

    /// Handle one event from `from`. An error is meant for the sender only;
    /// nothing was changed or published when one is returned.
    pub async fn handle_message(
        &self,
        from: &ConnectionId,
        msg: ClientMessage,
    ) -> Result<(), ProtocolError> {
        match msg {
            ClientMessage::Join { id, color } => self.handle_join(from, id, color).await,
            ClientMessage::Segment(segment) => {
                self.handle_segment(from, segment).await;
                Ok(())
            }
            ClientMessage::Dead { id } => {
                self.handle_dead(from, id).await;
                Ok(())
            }
            ClientMessage::Start => {
                self.handle_start().await;
                Ok(())
            }
        }
    }
}
