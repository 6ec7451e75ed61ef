//! The per-room worker (spec §5): the sole writer of one room's state and
//! its active game. All mutation arrives through [`RoomMessage`]s drained
//! from a single inbox in arrival order; fan-out happens synchronously
//! after each mutation commits, before the next message is processed.

use std::sync::Arc;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use crate::error::{CoreError, GameError, RoomError};
use crate::events::{Event, GameEnvelope, RoomEmitter, RoomEnvelope, RoomEnvelopeOrGame};
use crate::game::{self, GameState, GameType};
use crate::ids::{GameId, RoomCode, RoomId, UserId};
use crate::limits::{DEFAULT_TURN_SECONDS, RECONNECT_TIMEOUT, ROOM_EMPTY_TTL};
use crate::settings::GameSettings;
use crate::timer::TurnTimer;

use super::join_requests::JoinRequestTable;
use super::messages::{RoomMessage, RoomResponse};
use super::{lifecycle, Room, RoomState};

/// Knobs the server crate derives from `ServerConfig` (spec §6
/// "Configuration"); `dev_mode` disables TTL deletion entirely.
#[derive(Clone, Copy, Debug)]
pub struct ActorConfig {
    pub room_empty_ttl: std::time::Duration,
    pub reconnect_timeout: std::time::Duration,
    pub dev_mode: bool,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            room_empty_ttl: ROOM_EMPTY_TTL,
            reconnect_timeout: RECONNECT_TIMEOUT,
            dev_mode: false,
        }
    }
}

/// A cheap, cloneable reference to a running room worker.
#[derive(Clone)]
pub struct RoomHandle {
    sender: mpsc::Sender<RoomMessage>,
    room_id: RoomId,
    code: RoomCode,
}

impl RoomHandle {
    #[must_use]
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    #[must_use]
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Send a request built from a fresh response channel, and await the
    /// reply. Returns an internal error if the actor has already shut
    /// down (its inbox or responder was dropped).
    pub async fn send(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<RoomResponse, CoreError>>) -> RoomMessage,
    ) -> Result<RoomResponse, CoreError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(build(tx))
            .await
            .map_err(|_| CoreError::Internal("room actor is closed".into()))?;
        rx.await
            .map_err(|_| CoreError::Internal("room actor dropped its response".into()))?
    }

    /// Deliver a message the actor doesn't reply to (internal timer
    /// callbacks). Silently dropped if the actor has shut down.
    pub fn notify(&self, message: RoomMessage) {
        let _ = self.sender.try_send(message);
    }
}

/// Owns one room's state and its active game. Created alongside a
/// [`RoomHandle`] by [`spawn`].
pub struct RoomActor {
    room: Room,
    game: Option<GameState>,
    join_requests: JoinRequestTable,
    timer: TurnTimer,
    deletion_timer: Option<tokio::task::JoinHandle<()>>,
    reconnect_abort_timer: Option<tokio::task::JoinHandle<()>>,
    inbox: mpsc::Receiver<RoomMessage>,
    self_handle: RoomHandle,
    emitter: Arc<dyn RoomEmitter>,
    rng: StdRng,
    config: ActorConfig,
    closed_notifier: mpsc::Sender<RoomId>,
}

/// Spawn a new room worker as a Tokio task and return its handle. The
/// caller (the registry) is expected to install `handle` under both
/// indices before returning it to transport code.
#[must_use]
pub fn spawn(
    room: Room,
    emitter: Arc<dyn RoomEmitter>,
    config: ActorConfig,
    closed_notifier: mpsc::Sender<RoomId>,
) -> RoomHandle {
    let (sender, inbox) = mpsc::channel(256);
    let handle = RoomHandle {
        sender,
        room_id: room.id,
        code: room.code.clone(),
    };
    let actor = RoomActor {
        room,
        game: None,
        join_requests: JoinRequestTable::new(),
        timer: TurnTimer::new(),
        deletion_timer: None,
        reconnect_abort_timer: None,
        inbox,
        self_handle: handle.clone(),
        emitter,
        rng: StdRng::from_rng(&mut rand::rng()),
        config,
        closed_notifier,
    };
    tokio::spawn(actor.run());
    handle
}

impl RoomActor {
    async fn run(mut self) {
        info!(room_id = %self.room.id, code = %self.room.code, "room actor starting");
        while let Some(message) = self.inbox.recv().await {
            if self.handle_message(message).await {
                break;
            }
        }
        self.cancel_all_timers();
        let _ = self.closed_notifier.send(self.room.id).await;
        info!(room_id = %self.room.id, "room actor stopped");
    }

    fn cancel_all_timers(&mut self) {
        self.timer.cancel();
        if let Some(h) = self.deletion_timer.take() {
            h.abort();
        }
        if let Some(h) = self.reconnect_abort_timer.take() {
            h.abort();
        }
    }

    /// Processes one inbox message and reports whether the actor should
    /// shut down afterward (leader-initiated close, or a due TTL deletion
    /// finding the room still empty).
    async fn handle_message(&mut self, message: RoomMessage) -> bool {
        let mut should_close = false;
        match message {
            RoomMessage::JoinRoom { user_id, name, bypass_private, respond_to } => {
                let result = self.handle_join(user_id, name, bypass_private).await;
                let _ = respond_to.send(result);
            }
            RoomMessage::Connect { user_id, respond_to } => {
                let result = self.handle_connect(user_id).await;
                let _ = respond_to.send(result);
            }
            RoomMessage::Disconnect { user_id, respond_to } => {
                let result = self.handle_disconnect(user_id).await;
                let _ = respond_to.send(result);
            }
            RoomMessage::LeaveGame { user_id, respond_to } => {
                let result = self.handle_leave_game(user_id).await;
                let _ = respond_to.send(result);
            }
            RoomMessage::ToggleReady { user_id, ready, respond_to } => {
                let result = lifecycle::set_ready(&mut self.room, user_id, ready)
                    .map(|()| self.room_response());
                if result.is_ok() {
                    self.emit_room(Event::UserReadyStateChanged, serde_json::Value::Null).await;
                }
                let _ = respond_to.send(result);
            }
            RoomMessage::KickUser { leader_id, target, respond_to } => {
                let result = self.handle_kick(leader_id, target).await;
                let _ = respond_to.send(result);
            }
            RoomMessage::PromoteLeader { leader_id, new_leader, respond_to } => {
                let result = self.handle_promote(leader_id, new_leader).await;
                let _ = respond_to.send(result);
            }
            RoomMessage::SetTeams { leader_id, teams, strict, respond_to } => {
                let result = self.require_leader(leader_id).and_then(|()| {
                    lifecycle::set_teams(&mut self.room, teams, strict).map(|()| self.room_response())
                });
                if result.is_ok() {
                    self.emit_room(Event::TeamsSet, serde_json::Value::Null).await;
                }
                let _ = respond_to.send(result);
            }
            RoomMessage::RandomizeTeams { leader_id, respond_to } => {
                let result = self.handle_randomize_teams(leader_id).await;
                let _ = respond_to.send(result);
            }
            RoomMessage::SelectGame { leader_id, game_type, respond_to } => {
                let result = self.require_leader(leader_id).map(|()| {
                    lifecycle::select_game(&mut self.room, game_type);
                    self.room_response()
                });
                if result.is_ok() {
                    self.emit_room(Event::GameSelected, serde_json::Value::Null).await;
                }
                let _ = respond_to.send(result);
            }
            RoomMessage::UpdateRoomSettings { leader_id, max_players, is_private, respond_to } => {
                let result = self.require_leader(leader_id).map(|()| {
                    lifecycle::update_room_settings(&mut self.room, max_players, is_private);
                    self.room_response()
                });
                if result.is_ok() {
                    self.emit_room(Event::RoomSettingsUpdated, serde_json::Value::Null).await;
                }
                let _ = respond_to.send(result);
            }
            RoomMessage::UpdateGameSettings { leader_id, game_type, raw, respond_to } => {
                let result = self.require_leader(leader_id).map(|()| {
                    lifecycle::update_game_settings(&mut self.room, game_type, &raw);
                    self.room_response()
                });
                if result.is_ok() {
                    self.emit_room(Event::GameSettingsUpdated, serde_json::Value::Null).await;
                }
                let _ = respond_to.send(result);
            }
            RoomMessage::StartGame { leader_id, respond_to } => {
                let result = self.handle_start_game(leader_id).await;
                let _ = respond_to.send(result);
            }
            RoomMessage::AbortGame { leader_id, respond_to } => {
                let result = self.handle_abort_game(leader_id).await;
                let _ = respond_to.send(result);
            }
            RoomMessage::CloseRoom { leader_id, respond_to } => {
                let result = self.require_leader(leader_id).map(|()| {
                    self.join_requests.clear();
                    RoomResponse::Unit
                });
                should_close = result.is_ok();
                let _ = respond_to.send(result);
            }
            RoomMessage::ClaimSlot { spectator_id, target, respond_to } => {
                let result = self.handle_claim_slot(spectator_id, target).await;
                let _ = respond_to.send(result);
            }
            RoomMessage::RequestJoin { user_id, name, respond_to } => {
                let result = self.handle_request_join(user_id, name).await;
                let _ = respond_to.send(result);
            }
            RoomMessage::AcceptJoin { leader_id, requester_id, respond_to } => {
                let result = self.handle_accept_join(leader_id, requester_id).await;
                let _ = respond_to.send(result);
            }
            RoomMessage::RejectJoin { leader_id, requester_id, respond_to } => {
                let result = self.require_leader(leader_id).and_then(|()| {
                    self.join_requests.reject(requester_id).map(|()| RoomResponse::Unit)
                });
                let _ = respond_to.send(result);
            }
            RoomMessage::PlaceBid { user_id, amount, blind, respond_to } => {
                let result = self
                    .handle_game_action(user_id, game::GameAction::PlaceBid { amount, blind })
                    .await;
                let _ = respond_to.send(result);
            }
            RoomMessage::PlayCard { user_id, card, respond_to } => {
                let result = self
                    .handle_game_action(user_id, game::GameAction::PlayCard { card })
                    .await;
                let _ = respond_to.send(result);
            }
            RoomMessage::PlaceTile { user_id, tile, side, respond_to } => {
                let result = self
                    .handle_game_action(user_id, game::GameAction::PlaceTile { tile, side })
                    .await;
                let _ = respond_to.send(result);
            }
            RoomMessage::Pass { user_id, respond_to } => {
                let result = self.handle_game_action(user_id, game::GameAction::Pass).await;
                let _ = respond_to.send(result);
            }
            RoomMessage::ContinueAfterTrickResult { user_id, respond_to } => {
                let result = self
                    .handle_game_action(user_id, game::GameAction::ContinueAfterTrickResult)
                    .await;
                let _ = respond_to.send(result);
            }
            RoomMessage::ContinueAfterRoundSummary { user_id, respond_to } => {
                let result = self
                    .handle_game_action(user_id, game::GameAction::ContinueAfterRoundSummary)
                    .await;
                let _ = respond_to.send(result);
            }
            RoomMessage::GetState { user_id, respond_to } => {
                let result = Ok(match (user_id, &self.game) {
                    (Some(uid), Some(game)) if game.participants().contains(&uid) => {
                        RoomResponse::PlayerGameState(game::get_player_state(game, uid))
                    }
                    _ => self.room_response(),
                });
                let _ = respond_to.send(result);
            }
            RoomMessage::TurnTimeout { game_id } => self.handle_turn_timeout(game_id).await,
            RoomMessage::ReconnectAbort { user_id: _ } => self.handle_reconnect_abort().await,
            RoomMessage::ScheduledDeletionDue => {
                should_close = self.handle_scheduled_deletion();
            }
        }
        should_close
    }

    fn room_response(&self) -> RoomResponse {
        RoomResponse::Room(Box::new(self.room.clone()))
    }

    fn require_leader(&self, user_id: UserId) -> Result<(), CoreError> {
        if self.room.is_leader(user_id) {
            Ok(())
        } else {
            Err(RoomError::NotLeader.into())
        }
    }

    async fn emit_room(&self, event: Event, custom_data: serde_json::Value) {
        let envelope = RoomEnvelope {
            event: event.topic(),
            room_state: self.room.clone(),
            timestamp: Utc::now(),
            custom_data,
        };
        self.emitter
            .emit_to_room(self.room.id, RoomEnvelopeOrGame::Room(envelope))
            .await;
    }

    async fn emit_game(&self, event: Event, custom_data: serde_json::Value) {
        let Some(game) = &self.game else { return };
        let public = GameEnvelope {
            event: event.topic(),
            game_id: game.game_id(),
            state: game::get_state(game),
            timestamp: Utc::now(),
            custom_data: custom_data.clone(),
        };
        self.emitter
            .emit_to_room(self.room.id, RoomEnvelopeOrGame::Game(public))
            .await;
        for &participant in game.participants() {
            let private = GameEnvelope {
                event: event.topic(),
                game_id: game.game_id(),
                state: game::get_player_state(game, participant),
                timestamp: Utc::now(),
                custom_data: custom_data.clone(),
            };
            self.emitter
                .emit_to_user(participant, RoomEnvelopeOrGame::Game(private))
                .await;
        }
    }

    async fn handle_join(
        &mut self,
        user_id: UserId,
        name: String,
        bypass_private: bool,
    ) -> Result<RoomResponse, CoreError> {
        let became_spectator =
            lifecycle::join_room(&mut self.room, user_id, name, Utc::now(), bypass_private)?;
        self.cancel_deletion_timer();
        if became_spectator {
            self.emit_room(Event::PlayerMovedToSpectators, serde_json::Value::Null).await;
        } else {
            self.emit_room(Event::UserJoined, serde_json::Value::Null).await;
        }
        Ok(self.room_response())
    }

    async fn handle_connect(&mut self, user_id: UserId) -> Result<RoomResponse, CoreError> {
        if self.room.kicked_user_ids.contains(&user_id) {
            return Err(RoomError::UserKicked.into());
        }
        if !self.room.is_member(user_id) {
            return Err(RoomError::NotAMember.into());
        }

        let was_disconnected = self
            .room
            .user(user_id)
            .is_some_and(|u| !u.connected);
        if let Some(user) = self.room.user_mut(user_id) {
            user.connected = true;
        }

        if was_disconnected {
            if let Some(game) = &mut self.game {
                game::on_reconnect(game, user_id);
            }
            self.emit_room(Event::UserReconnected, serde_json::Value::Null).await;
        }

        if self.room.is_paused && matches!(self.room.state, RoomState::InGame) {
            if let Some(game) = &self.game {
                let connected: Vec<UserId> = self.room.connected_user_ids();
                if game::check_minimum_players(game, &connected) {
                    self.room.is_paused = false;
                    self.room.paused_at = None;
                    self.room.timeout_at = None;
                    if let Some(h) = self.reconnect_abort_timer.take() {
                        h.abort();
                    }
                    self.timer.resume_turn(game.game_id(), self.self_handle_sender());
                    self.emit_room(Event::GameResumed, serde_json::Value::Null).await;
                }
            }
        }

        Ok(self.room_response())
    }

    async fn handle_disconnect(&mut self, user_id: UserId) -> Result<RoomResponse, CoreError> {
        if !self.room.is_member(user_id) {
            return Err(RoomError::NotAMember.into());
        }

        if matches!(self.room.state, RoomState::InGame) {
            if let Some(user) = self.room.user_mut(user_id) {
                user.connected = false;
            }
            if let Some(game) = &mut self.game {
                game::on_disconnect(game, user_id);
            }
            let connected = self.room.connected_user_ids();
            let below_minimum = self
                .game
                .as_ref()
                .is_some_and(|g| !game::check_minimum_players(g, &connected));
            if below_minimum {
                self.timer.pause_turn();
                self.room.is_paused = true;
                self.room.paused_at = Some(Utc::now());
                self.room.timeout_at = Some(Utc::now() + chrono::Duration::from_std(self.config.reconnect_timeout).unwrap_or_default());
                self.arm_reconnect_abort_timer();
                self.emit_room(Event::GamePaused, serde_json::Value::Null).await;
            }
            if self.room.leader_id == Some(user_id) {
                if let Some(successor) = lifecycle::pick_successor(&self.room, &self.room.connected_user_ids()) {
                    self.room.leader_id = Some(successor);
                    self.emit_room(Event::LeaderPromoted, serde_json::Value::Null).await;
                }
            }
            self.emit_room(Event::UserDisconnected, serde_json::Value::Null).await;
        } else {
            let successor_candidates: Vec<UserId> = self
                .room
                .users
                .iter()
                .map(|u| u.id)
                .filter(|&id| id != user_id)
                .collect();
            lifecycle::remove_from_roster(&mut self.room, user_id);
            if self.room.leader_id.is_none() {
                if let Some(successor) = lifecycle::pick_successor(&self.room, &successor_candidates) {
                    self.room.leader_id = Some(successor);
                    self.emit_room(Event::LeaderPromoted, serde_json::Value::Null).await;
                }
            }
            self.emit_room(Event::UserLeft, serde_json::Value::Null).await;
            if self.room.is_empty() {
                self.arm_deletion_timer();
            }
        }

        Ok(self.room_response())
    }

    async fn handle_leave_game(&mut self, user_id: UserId) -> Result<RoomResponse, CoreError> {
        if !self.room.is_member(user_id) {
            return Err(RoomError::NotAMember.into());
        }
        lifecycle::remove_from_roster(&mut self.room, user_id);
        if let Some(successor) = lifecycle::pick_successor(&self.room, &self.room.connected_user_ids()) {
            self.room.leader_id = Some(successor);
        }
        let connected = self.room.connected_user_ids();
        if let Some(game) = &self.game {
            if !game::check_minimum_players(game, &connected) && !self.room.is_paused {
                self.room.is_paused = true;
                self.room.paused_at = Some(Utc::now());
                self.arm_reconnect_abort_timer();
                self.emit_room(Event::GamePaused, serde_json::Value::Null).await;
            }
        }
        self.emit_room(Event::UserLeft, serde_json::Value::Null).await;
        Ok(self.room_response())
    }

    async fn handle_kick(&mut self, leader_id: UserId, target: UserId) -> Result<RoomResponse, CoreError> {
        self.require_leader(leader_id)?;
        let was_waiting_on_target = self.room.is_paused;
        lifecycle::kick_user(&mut self.room, target)?;
        if let Some(game) = &self.game {
            let connected = self.room.connected_user_ids();
            if !game::check_minimum_players(game, &connected) {
                self.abort_game(Event::GameAborted, "kicked_below_minimum").await;
            } else if was_waiting_on_target && game::check_minimum_players(game, &connected) {
                self.room.is_paused = false;
                self.room.paused_at = None;
                if let Some(h) = self.reconnect_abort_timer.take() {
                    h.abort();
                }
                self.emit_room(Event::GameResumed, serde_json::Value::Null).await;
            }
        }
        self.emit_room(Event::UserKicked, serde_json::Value::Null).await;
        Ok(self.room_response())
    }

    async fn handle_promote(&mut self, leader_id: UserId, new_leader: UserId) -> Result<RoomResponse, CoreError> {
        self.require_leader(leader_id)?;
        lifecycle::promote_leader(&mut self.room, new_leader)?;
        self.emit_room(Event::LeaderPromoted, serde_json::Value::Null).await;
        Ok(self.room_response())
    }

    async fn handle_randomize_teams(&mut self, leader_id: UserId) -> Result<RoomResponse, CoreError> {
        self.require_leader(leader_id)?;
        let meta = game::metadata(self.room.selected_game_type);
        let (num_teams, players_per_team) = (
            meta.num_teams.unwrap_or(2),
            meta.players_per_team.unwrap_or(2),
        );
        lifecycle::randomize_teams(&mut self.room, num_teams, players_per_team, &mut self.rng);
        self.emit_room(Event::TeamsSet, serde_json::Value::Null).await;
        Ok(self.room_response())
    }

    async fn handle_start_game(&mut self, leader_id: UserId) -> Result<RoomResponse, CoreError> {
        self.require_leader(leader_id)?;
        lifecycle::check_start_preconditions(&self.room)?;

        let game_type = self.room.selected_game_type;
        let settings = self
            .room
            .game_settings
            .get(&game_type)
            .cloned()
            .unwrap_or_else(|| GameSettings::default_for(game_type));
        let game_id = GameId::new();
        let state = game::init(game_type, &self.room, game_id, &settings, &mut self.rng, Utc::now())?;

        for user in &mut self.room.users {
            user.connected = true;
        }
        self.room.game_id = Some(game_id);
        self.room.state = RoomState::InGame;
        self.game = Some(state);

        self.emit_room(Event::GameStarted, serde_json::Value::Null).await;
        self.emit_game(Event::GameStarted, serde_json::Value::Null).await;
        self.maybe_start_turn_timer();
        Ok(self.room_response())
    }

    async fn handle_abort_game(&mut self, leader_id: UserId) -> Result<RoomResponse, CoreError> {
        self.require_leader(leader_id)?;
        if self.game.is_none() {
            return Err(GameError::WrongPhase.into());
        }
        self.abort_game(Event::GameAborted, "leader_aborted").await;
        Ok(self.room_response())
    }

    async fn abort_game(&mut self, event: Event, reason: &str) {
        self.timer.cancel();
        if let Some(h) = self.reconnect_abort_timer.take() {
            h.abort();
        }
        self.game = None;
        self.room.game_id = None;
        self.room.state = RoomState::Lobby;
        self.room.is_paused = false;
        self.room.paused_at = None;
        self.room.timeout_at = None;
        for ready in self.room.ready_states.values_mut() {
            *ready = false;
        }
        self.emit_room(event, serde_json::json!({ "reason": reason })).await;
    }

    async fn handle_claim_slot(&mut self, spectator_id: UserId, target: UserId) -> Result<RoomResponse, CoreError> {
        if !self.room.is_spectator(spectator_id) {
            return Err(RoomError::NotAMember.into());
        }
        let Some(game) = &mut self.game else {
            return Err(GameError::WrongPhase.into());
        };
        game::transfer_slot(game, target, spectator_id);
        self.room.spectators.retain(|&id| id != spectator_id);
        // `target` (the disconnected seat being claimed) is a distinct room
        // member from `spectator_id` (who already has their own roster
        // entry); drop their entry rather than renaming it onto the
        // spectator's, or the roster would carry the claimant twice.
        self.room.users.retain(|u| u.id != target);
        if let Some(user) = self.room.user_mut(spectator_id) {
            user.connected = true;
        }
        let ready = self.room.ready_states.remove(&target).unwrap_or(true);
        self.room.ready_states.insert(spectator_id, ready);
        if let Some(teams) = self.room.teams.as_mut() {
            for team in teams.iter_mut() {
                for slot in team.iter_mut() {
                    if *slot == Some(target) {
                        *slot = Some(spectator_id);
                    }
                }
            }
        }

        let connected = self.room.connected_user_ids();
        if game::check_minimum_players(self.game.as_ref().expect("checked above"), &connected) && self.room.is_paused {
            self.room.is_paused = false;
            self.room.paused_at = None;
            if let Some(h) = self.reconnect_abort_timer.take() {
                h.abort();
            }
            self.emit_room(Event::GameResumed, serde_json::Value::Null).await;
        }

        self.emit_room(Event::PlayerSlotClaimed, serde_json::Value::Null).await;
        Ok(self.room_response())
    }

    async fn handle_request_join(&mut self, user_id: UserId, name: String) -> Result<RoomResponse, CoreError> {
        if !self.room.settings.is_private {
            return Err(RoomError::NotLeader.into());
        }
        if self.room.is_member(user_id) {
            return Err(RoomError::NotAMember.into());
        }
        if self.room.kicked_user_ids.contains(&user_id) {
            return Err(RoomError::UserKicked.into());
        }
        self.join_requests.submit(user_id, name, Utc::now())?;
        self.emit_room(Event::JoinRequest, serde_json::Value::Null).await;
        Ok(RoomResponse::JoinRequests(self.join_requests.all().cloned().collect()))
    }

    async fn handle_accept_join(&mut self, leader_id: UserId, requester_id: UserId) -> Result<RoomResponse, CoreError> {
        self.require_leader(leader_id)?;
        let request = self.join_requests.accept(requester_id)?;
        let became_spectator = lifecycle::join_room(
            &mut self.room,
            requester_id,
            request.requester_name,
            Utc::now(),
            true,
        )?;
        self.cancel_deletion_timer();
        if became_spectator {
            self.emit_room(Event::PlayerMovedToSpectators, serde_json::Value::Null).await;
        } else {
            self.emit_room(Event::UserJoined, serde_json::Value::Null).await;
        }
        Ok(self.room_response())
    }

    async fn handle_game_action(&mut self, user_id: UserId, action: game::GameAction) -> Result<RoomResponse, CoreError> {
        let Some(game) = &self.game else {
            return Err(GameError::WrongPhase.into());
        };
        self.timer.cancel();
        let new_state = game::reduce(game, user_id, action, &mut self.rng, Utc::now())?;
        self.game = Some(new_state);
        self.emit_game(Event::Sync, serde_json::Value::Null).await;
        self.maybe_start_turn_timer();
        Ok(RoomResponse::PublicGameState(game::get_state(self.game.as_ref().expect("just set"))))
    }

    async fn handle_turn_timeout(&mut self, game_id: GameId) {
        let Some(game) = &self.game else { return };
        if game.game_id() != game_id {
            return;
        }
        let Some(action) = game::timeout_action(game) else {
            return;
        };
        let Some(user_id) = game.current_turn_user() else {
            return;
        };
        match game::reduce(game, user_id, action, &mut self.rng, Utc::now()) {
            Ok(new_state) => {
                self.game = Some(new_state);
                self.emit_room(Event::TurnTimeout, serde_json::Value::Null).await;
                self.emit_game(Event::Sync, serde_json::Value::Null).await;
                self.maybe_start_turn_timer();
            }
            Err(err) => {
                warn!(room_id = %self.room.id, %err, "turn timeout auto-action failed");
            }
        }
    }

    async fn handle_reconnect_abort(&mut self) {
        if !self.room.is_paused {
            return;
        }
        self.abort_game(Event::GameAborted, "reconnect_timeout").await;
        if self.room.connected_user_ids().is_empty() {
            self.room.users.clear();
            self.room.ready_states.clear();
            self.room.spectators.clear();
            self.room.teams = None;
            self.arm_deletion_timer();
        }
    }

    /// A scheduled room-empty TTL fired. Rather than looping a
    /// `CloseRoom` message back through our own inbox (which would
    /// deadlock — this actor is the only reader and it's busy running
    /// this very call), just report whether `run`'s loop should stop.
    fn handle_scheduled_deletion(&mut self) -> bool {
        if self.config.dev_mode {
            return false;
        }
        if self.room.is_empty() {
            self.join_requests.clear();
            true
        } else {
            false
        }
    }

    fn maybe_start_turn_timer(&mut self) {
        let Some(game) = &self.game else { return };
        if game.current_turn_user().is_none() {
            return;
        }
        self.timer.start_turn(game.game_id(), DEFAULT_TURN_SECONDS, self.self_handle_sender());
    }

    fn self_handle_sender(&self) -> mpsc::Sender<RoomMessage> {
        self.self_handle.sender.clone()
    }

    fn arm_reconnect_abort_timer(&mut self) {
        if let Some(h) = self.reconnect_abort_timer.take() {
            h.abort();
        }
        let sender = self.self_handle_sender();
        let duration = self.config.reconnect_timeout;
        self.reconnect_abort_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = sender
                .send(RoomMessage::ReconnectAbort { user_id: UserId::new() })
                .await;
        }));
    }

    fn arm_deletion_timer(&mut self) {
        if self.config.dev_mode {
            return;
        }
        if let Some(h) = self.deletion_timer.take() {
            h.abort();
        }
        let sender = self.self_handle_sender();
        let duration = self.config.room_empty_ttl;
        self.deletion_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = sender.send(RoomMessage::ScheduledDeletionDue).await;
        }));
    }

    fn cancel_deletion_timer(&mut self) {
        if let Some(h) = self.deletion_timer.take() {
            h.abort();
        }
    }
}
