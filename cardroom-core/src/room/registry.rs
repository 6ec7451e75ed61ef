//! Process-wide registry (spec §4.1 room-by-id/-by-code indices, §4.3
//! connection tracking, design note "model them as a single Registry
//! value with explicit lifecycle, not as free-standing singletons").
//!
//! `Registry` is the one shared, read-mostly structure in this crate.
//! Everything it guards — the room/code indices and the two connection
//! maps — is mutated under a single `RwLock`; actual room and game
//! mutation still happens inside each room's own actor task (spec §5).

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, RwLock};

use crate::error::{ConnectionError, CoreError, RoomError};
use crate::events::{Event, RoomEmitter, RoomEnvelope, RoomEnvelopeOrGame};
use crate::ids::{RoomCode, RoomId, SocketId, UserId};
use crate::user::User;

use super::actor::{self, ActorConfig, RoomHandle};
use super::lifecycle;
use super::messages::RoomMessage;

const CODE_COLLISION_RETRIES: usize = 20;

struct Inner {
    rooms_by_id: HashMap<RoomId, RoomHandle>,
    rooms_by_code: HashMap<RoomCode, RoomId>,
    /// `(room, user) -> socket`, the dedup half of spec §4.3/§5's
    /// duplicate-connection policy: at most one live socket per user
    /// per room.
    user_socket: HashMap<(RoomId, UserId), SocketId>,
    /// `socket -> (room, user)`, the reverse lookup a transport needs
    /// on disconnect, when all it has is the socket id.
    socket_user: HashMap<SocketId, (RoomId, UserId)>,
}

/// The result of registering a new transport connection (spec §4.3
/// "Register"): the caller must force-close `superseded` if present,
/// since the new socket has already won.
pub struct ConnectOutcome {
    pub room: RoomHandle,
    pub superseded: Option<SocketId>,
}

/// Process-wide room/code/connection index. Cheap to clone (an `Arc`
/// internally); construct one per server process.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RwLock<Inner>>,
    emitter: Arc<dyn RoomEmitter>,
    config: ActorConfig,
    closed_tx: mpsc::Sender<RoomId>,
}

impl Registry {
    #[must_use]
    pub fn new(emitter: Arc<dyn RoomEmitter>, config: ActorConfig) -> Self {
        let inner = Arc::new(RwLock::new(Inner {
            rooms_by_id: HashMap::new(),
            rooms_by_code: HashMap::new(),
            user_socket: HashMap::new(),
            socket_user: HashMap::new(),
        }));

        let (closed_tx, mut closed_rx) = mpsc::channel::<RoomId>(64);
        let reaper_inner = inner.clone();
        tokio::spawn(async move {
            while let Some(room_id) = closed_rx.recv().await {
                let mut guard = reaper_inner.write().await;
                if let Some(handle) = guard.rooms_by_id.remove(&room_id) {
                    guard.rooms_by_code.remove(handle.code());
                }
                guard.socket_user.retain(|_, (rid, _)| *rid != room_id);
                guard.user_socket.retain(|(rid, _), _| *rid != room_id);
            }
        });

        Self { inner, emitter, config, closed_tx }
    }

    /// Create a new room: draws a unique 6-character code, installs the
    /// creator as sole member and leader, spawns the owning actor, and
    /// indexes it by id and code (spec §4.1 "Create room").
    pub async fn create_room(
        &self,
        creator_id: UserId,
        creator_name: String,
        room_name: String,
    ) -> Result<RoomHandle, CoreError> {
        let mut guard = self.inner.write().await;
        let mut rng = rand::rng();

        let mut code = RoomCode::random(&mut rng);
        let mut tries = 0;
        while guard.rooms_by_code.contains_key(&code) {
            tries += 1;
            if tries >= CODE_COLLISION_RETRIES {
                return Err(RoomError::CodeCollision.into());
            }
            code = RoomCode::random(&mut rng);
        }

        let room_id = RoomId::new();
        let creator = User::new(creator_id, creator_name);
        let room = lifecycle::new_room(room_id, code.clone(), room_name, creator, Utc::now());

        let created_envelope = RoomEnvelope {
            event: Event::RoomCreated.topic(),
            room_state: room.clone(),
            timestamp: Utc::now(),
            custom_data: serde_json::Value::Null,
        };

        let handle = actor::spawn(room, self.emitter.clone(), self.config, self.closed_tx.clone());

        guard.rooms_by_id.insert(room_id, handle.clone());
        guard.rooms_by_code.insert(code, room_id);
        drop(guard);

        self.emitter
            .emit_to_room(room_id, RoomEnvelopeOrGame::Room(created_envelope))
            .await;

        Ok(handle)
    }

    #[must_use]
    pub async fn get(&self, room_id: RoomId) -> Option<RoomHandle> {
        self.inner.read().await.rooms_by_id.get(&room_id).cloned()
    }

    /// Look up a room by its public code. The caller is responsible for
    /// normalizing case before calling (spec §4.1: "normalize the code
    /// to upper-case before lookup").
    #[must_use]
    pub async fn get_by_code(&self, code: &RoomCode) -> Option<RoomHandle> {
        let guard = self.inner.read().await;
        let room_id = guard.rooms_by_code.get(code)?;
        guard.rooms_by_id.get(room_id).cloned()
    }

    #[must_use]
    pub async fn room_count(&self) -> usize {
        self.inner.read().await.rooms_by_id.len()
    }

    /// Register a new transport connection (spec §4.3 "Register"). The
    /// room-internal bookkeeping (roster `connected` flag, reconnect
    /// hook, pause-resume check) happens inside the room actor via the
    /// `Connect` message this issues; this layer only owns the
    /// socket-identity dedup that spans rooms.
    pub async fn connect(
        &self,
        socket_id: SocketId,
        room_id: RoomId,
        user_id: UserId,
    ) -> Result<ConnectOutcome, CoreError> {
        let room = self
            .get(room_id)
            .await
            .ok_or(ConnectionError::RoomNotFound)?;

        let superseded = {
            let mut guard = self.inner.write().await;
            let key = (room_id, user_id);
            let superseded = guard.user_socket.get(&key).copied();
            if let Some(old_socket) = superseded {
                guard.socket_user.remove(&old_socket);
            }
            guard.user_socket.insert(key, socket_id);
            guard.socket_user.insert(socket_id, (room_id, user_id));
            superseded
        };

        room.send(|respond_to| RoomMessage::Connect { user_id, respond_to })
            .await?;

        Ok(ConnectOutcome { room, superseded })
    }

    /// Handle a transport socket drop (spec §4.3 "Disconnect", spec §5
    /// duplicate-connection policy). Returns `None` if the socket was
    /// already superseded (its `user_socket` entry points elsewhere) —
    /// the caller must then skip any roster change, matching scenario 8.
    pub async fn disconnect(&self, socket_id: SocketId) -> Option<(RoomId, UserId)> {
        let removed = {
            let mut guard = self.inner.write().await;
            let Some((room_id, user_id)) = guard.socket_user.remove(&socket_id) else {
                return None;
            };
            let key = (room_id, user_id);
            if guard.user_socket.get(&key) == Some(&socket_id) {
                guard.user_socket.remove(&key);
                Some((room_id, user_id))
            } else {
                None
            }
        };

        if let Some((room_id, user_id)) = removed {
            if let Some(room) = self.get(room_id).await {
                let _ = room
                    .send(|respond_to| RoomMessage::Disconnect { user_id, respond_to })
                    .await;
            }
            Some((room_id, user_id))
        } else {
            None
        }
    }

    #[must_use]
    pub async fn socket_for(&self, room_id: RoomId, user_id: UserId) -> Option<SocketId> {
        self.inner.read().await.user_socket.get(&(room_id, user_id)).copied()
    }
}
