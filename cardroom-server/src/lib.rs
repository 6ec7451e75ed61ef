//! # cardroom-server
//!
//! The Axum HTTP/WebSocket transport for [`cardroom_core`]: a thin layer
//! that turns `Registry`/`RoomHandle` calls into REST responses and turns
//! room/game fan-out events into WebSocket frames.
//!
//! This crate owns everything [`cardroom_core`] deliberately doesn't:
//! configuration, logging, metrics, and the wire format. See [`api`] for
//! the HTTP routes and WebSocket handler, and the root `main.rs` for how
//! they're wired together.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
