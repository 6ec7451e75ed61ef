//! # cardroom-core
//!
//! The session and game-engine layer for a realtime multiplayer
//! card-game server: room lifecycle, connection tracking and reconnect
//! orchestration, a pluggable game-module framework, and two shipped
//! games (Spades and block dominoes) built on it.
//!
//! This crate is transport-agnostic. It never touches a socket or an
//! HTTP request directly — it exposes a message-passing API per room
//! ([`room::actor::RoomHandle`]) plus a process-wide [`room::registry::Registry`],
//! and calls back into an [`events::RoomEmitter`] the transport crate
//! implements. See `cardroom-server` for the Axum/WebSocket transport
//! that drives this crate in production.
//!
//! ## Core modules
//!
//! - [`room`]: `Room` data, lifecycle operations, the per-room actor
//!   (the sole writer of a room's state and its active game), and the
//!   process-wide registry of rooms by id/code plus connection dedup.
//! - [`game`]: the game-module framework, card/tile helpers, and the
//!   Spades and Dominoes state machines.
//! - [`settings`]: per-game settings schemas, validation, and clamping.
//! - [`timer`]: the per-game turn-timer service (grace period,
//!   pause/resume across disconnects).
//! - [`events`]: the event fan-out contract the transport consumes.
//! - [`error`]: the error taxonomy shared across the crate.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use cardroom_core::events::NullEmitter;
//! use cardroom_core::ids::UserId;
//! use cardroom_core::room::actor::ActorConfig;
//! use cardroom_core::room::registry::Registry;
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = Registry::new(Arc::new(NullEmitter), ActorConfig::default());
//!     let room = registry
//!         .create_room(UserId::new(), "alice".into(), "table talk".into())
//!         .await
//!         .unwrap();
//!     assert_eq!(registry.room_count().await, 1);
//! }
//! ```

pub mod error;
pub mod events;
pub mod game;
pub mod ids;
pub mod limits;
pub mod rand_util;
pub mod room;
pub mod settings;
pub mod timer;
pub mod user;

pub use error::{CoreError, CoreResult, ErrorKind};
pub use room::registry::Registry;
