//! Turn timer (spec §4.9).
//!
//! Timer callbacks never mutate state directly (spec §5 suspension
//! points): arming a timer spawns a task that, after the deadline,
//! sends a message back into the owning room's inbox. The room worker
//! is the only thing that ever touches game state.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::ids::GameId;
use crate::limits::TURN_TIMER_GRACE;
use crate::room::messages::RoomMessage;

/// One armed-or-idle turn clock. A room holds exactly one of these for
/// its currently active game.
#[derive(Default)]
pub struct TurnTimer {
    handle: Option<JoinHandle<()>>,
    armed_at: Option<Instant>,
    duration: Option<Duration>,
    paused_remaining: Option<Duration>,
}

impl TurnTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any existing timer, then arm a new one for
    /// `timeout_seconds*1000 + grace`.
    pub fn start_turn(
        &mut self,
        game_id: GameId,
        timeout_seconds: u64,
        inbox: mpsc::Sender<RoomMessage>,
    ) {
        self.cancel();
        let duration = Duration::from_secs(timeout_seconds) + TURN_TIMER_GRACE;
        self.arm(duration, game_id, inbox);
    }

    fn arm(&mut self, duration: Duration, game_id: GameId, inbox: mpsc::Sender<RoomMessage>) {
        self.duration = Some(duration);
        self.armed_at = Some(Instant::now());
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = inbox.send(RoomMessage::TurnTimeout { game_id }).await;
        }));
    }

    /// Idempotent: cancelling an already-idle timer is a no-op.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.armed_at = None;
        self.duration = None;
    }

    /// Records the paused instant and remaining duration, tearing down
    /// the OS timer. Leaves `paused_remaining` set for `resume_turn`.
    pub fn pause_turn(&mut self) {
        if let (Some(armed_at), Some(duration)) = (self.armed_at, self.duration) {
            let elapsed = armed_at.elapsed();
            self.paused_remaining = Some(duration.saturating_sub(elapsed));
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.armed_at = None;
        self.duration = None;
    }

    /// Rearms for exactly the remaining duration recorded by
    /// `pause_turn`. If the remaining time is zero, fires immediately.
    pub fn resume_turn(&mut self, game_id: GameId, inbox: mpsc::Sender<RoomMessage>) {
        let Some(remaining) = self.paused_remaining.take() else {
            return;
        };
        if remaining.is_zero() {
            let _ = inbox.try_send(RoomMessage::TurnTimeout { game_id });
        } else {
            self.arm(remaining, game_id, inbox);
        }
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for TurnTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
