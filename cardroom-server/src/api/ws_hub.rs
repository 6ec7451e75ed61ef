//! In-process WebSocket fan-out hub.
//!
//! This is the concrete, transport-side implementation of
//! `cardroom_core::events::RoomEmitter`: it holds one outbound channel per
//! live socket and the room/user indices needed to route a broadcast or a
//! unicast to the right sockets. `cardroom-core` never sees a `WebSocket`
//! directly — it only ever calls `emit_to_room`/`emit_to_user`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use cardroom_core::events::{RoomEmitter, RoomEnvelopeOrGame};
use cardroom_core::ids::{RoomId, SocketId, UserId};
use tokio::sync::{mpsc, oneshot, RwLock};

/// One live WebSocket connection as seen by the hub.
struct Connection {
    room_id: RoomId,
    user_id: UserId,
    outbox: mpsc::Sender<String>,
    kill: Option<oneshot::Sender<()>>,
}

#[derive(Default)]
struct Inner {
    by_socket: HashMap<SocketId, Connection>,
    by_room: HashMap<RoomId, Vec<SocketId>>,
    /// Latest socket registered for a user, process-wide. A user
    /// participates in one room at a time in practice, so this is enough
    /// to serve `RoomEmitter::emit_to_user`, which carries no room id.
    by_user: HashMap<UserId, SocketId>,
}

/// Cheap to clone; one instance is shared by the whole server process.
#[derive(Clone, Default)]
pub struct WsHub {
    inner: Arc<RwLock<Inner>>,
}

impl WsHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly upgraded socket. `kill` lets [`Self::force_close`]
    /// tell the connection's receive loop to stop, used when this socket
    /// gets superseded by a newer one for the same `(room, user)`.
    pub async fn register(
        &self,
        room_id: RoomId,
        user_id: UserId,
        socket_id: SocketId,
        outbox: mpsc::Sender<String>,
        kill: oneshot::Sender<()>,
    ) {
        let mut guard = self.inner.write().await;
        guard.by_room.entry(room_id).or_default().push(socket_id);
        guard.by_user.insert(user_id, socket_id);
        guard.by_socket.insert(
            socket_id,
            Connection {
                room_id,
                user_id,
                outbox,
                kill: Some(kill),
            },
        );
    }

    pub async fn unregister(&self, socket_id: SocketId) {
        let mut guard = self.inner.write().await;
        let Some(conn) = guard.by_socket.remove(&socket_id) else {
            return;
        };
        if let Some(list) = guard.by_room.get_mut(&conn.room_id) {
            list.retain(|s| *s != socket_id);
            if list.is_empty() {
                guard.by_room.remove(&conn.room_id);
            }
        }
        if guard.by_user.get(&conn.user_id) == Some(&socket_id) {
            guard.by_user.remove(&conn.user_id);
        }
    }

    /// Force a superseded socket's receive loop to exit. A no-op if the
    /// socket already disconnected on its own.
    pub async fn force_close(&self, socket_id: SocketId) {
        let mut guard = self.inner.write().await;
        if let Some(conn) = guard.by_socket.get_mut(&socket_id)
            && let Some(kill) = conn.kill.take()
        {
            let _ = kill.send(());
        }
    }

    /// Send a string directly to one socket, bypassing room/user routing.
    /// Used for acking a client's own request back to itself.
    pub async fn emit_direct(&self, socket_id: SocketId, text: String) {
        let guard = self.inner.read().await;
        if let Some(conn) = guard.by_socket.get(&socket_id) {
            let _ = conn.outbox.try_send(text);
        }
    }

    #[must_use]
    pub async fn connections_active(&self) -> usize {
        self.inner.read().await.by_socket.len()
    }

    #[must_use]
    pub async fn rooms_with_connections(&self) -> usize {
        self.inner.read().await.by_room.len()
    }
}

#[async_trait]
impl RoomEmitter for WsHub {
    async fn emit_to_room(&self, room_id: RoomId, envelope: RoomEnvelopeOrGame) {
        let Ok(json) = serde_json::to_string(&envelope) else {
            tracing::error!(room_id = %room_id, "failed to serialize room envelope");
            return;
        };
        let guard = self.inner.read().await;
        let Some(sockets) = guard.by_room.get(&room_id) else {
            return;
        };
        for socket_id in sockets {
            if let Some(conn) = guard.by_socket.get(socket_id) {
                let _ = conn.outbox.try_send(json.clone());
            }
        }
    }

    async fn emit_to_user(&self, user_id: UserId, envelope: RoomEnvelopeOrGame) {
        let Ok(json) = serde_json::to_string(&envelope) else {
            tracing::error!(user_id = %user_id, "failed to serialize game envelope");
            return;
        };
        let guard = self.inner.read().await;
        if let Some(socket_id) = guard.by_user.get(&user_id)
            && let Some(conn) = guard.by_socket.get(socket_id)
        {
            let _ = conn.outbox.try_send(json);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardroom_core::events::{Event, RoomEnvelope};
    use chrono::Utc;

    fn dummy_room_envelope() -> RoomEnvelopeOrGame {
        use cardroom_core::game::GameType;
        use cardroom_core::ids::{RoomCode, RoomId};
        use cardroom_core::room::lifecycle::new_room;
        use cardroom_core::user::User;
        let creator = User::new(UserId::new(), "alice".into());
        let room = new_room(RoomId::new(), RoomCode::normalize("AB12CD"), "room".into(), creator, Utc::now());
        let _ = GameType::Spades;
        RoomEnvelopeOrGame::Room(RoomEnvelope {
            event: Event::RoomCreated.topic(),
            room_state: room,
            timestamp: Utc::now(),
            custom_data: serde_json::Value::Null,
        })
    }

    #[tokio::test]
    async fn emit_to_room_reaches_every_registered_socket() {
        let hub = WsHub::new();
        let room_id = RoomId::new();
        let (tx1, mut rx1) = mpsc::channel(4);
        let (tx2, mut rx2) = mpsc::channel(4);
        let (kill1, _k1) = oneshot::channel();
        let (kill2, _k2) = oneshot::channel();
        hub.register(room_id, UserId::new(), SocketId::new(), tx1, kill1).await;
        hub.register(room_id, UserId::new(), SocketId::new(), tx2, kill2).await;

        hub.emit_to_room(room_id, dummy_room_envelope()).await;

        assert!(rx1.recv().await.is_some());
        assert!(rx2.recv().await.is_some());
    }

    #[tokio::test]
    async fn unregister_stops_further_delivery() {
        let hub = WsHub::new();
        let room_id = RoomId::new();
        let socket_id = SocketId::new();
        let (tx, mut rx) = mpsc::channel(4);
        let (kill, _k) = oneshot::channel();
        hub.register(room_id, UserId::new(), socket_id, tx, kill).await;
        hub.unregister(socket_id).await;

        hub.emit_to_room(room_id, dummy_room_envelope()).await;

        assert!(rx.try_recv().is_err());
        assert_eq!(hub.connections_active().await, 0);
    }

    #[tokio::test]
    async fn force_close_fires_the_kill_signal() {
        let hub = WsHub::new();
        let room_id = RoomId::new();
        let socket_id = SocketId::new();
        let (tx, _rx) = mpsc::channel(4);
        let (kill, kill_rx) = oneshot::channel();
        hub.register(room_id, UserId::new(), socket_id, tx, kill).await;

        hub.force_close(socket_id).await;

        assert!(kill_rx.await.is_ok());
    }
}
