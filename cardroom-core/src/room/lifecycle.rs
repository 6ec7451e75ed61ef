//! Room lifecycle operations (spec §4.1, §4.2): pure mutations of a
//! [`Room`] value. The owning actor is responsible for sequencing these
//! against the registry and for driving the associated game state.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde_json::Map;

use crate::error::{CoreError, RoomError};
use crate::game::{metadata, GameType};
use crate::ids::{RoomCode, RoomId, UserId};
use crate::rand_util::shuffle;
use crate::settings::{GameSettings, RoomSettings};
use crate::user::User;

use super::{Room, RoomState, TeamSlot};

#[must_use]
pub fn new_room(id: RoomId, code: RoomCode, name: String, creator: User, now: DateTime<Utc>) -> Room {
    let mut ready_states = std::collections::HashMap::new();
    ready_states.insert(creator.id, false);
    let leader_id = Some(creator.id);

    let mut game_settings = std::collections::HashMap::new();
    for &game_type in GameType::all() {
        game_settings.insert(game_type, GameSettings::default_for(game_type));
    }

    Room {
        id,
        code,
        name,
        users: vec![creator],
        leader_id,
        ready_states,
        state: RoomState::Lobby,
        game_id: None,
        selected_game_type: GameType::Spades,
        created_at: now,
        teams: None,
        settings: RoomSettings::default(),
        game_settings,
        is_paused: false,
        paused_at: None,
        timeout_at: None,
        spectators: Vec::new(),
        kicked_user_ids: HashSet::new(),
    }
}

/// Join (or rejoin) `room` by code. `bypass_private` is set only by the
/// accept-join-request path (spec §4.4). Returns whether the joiner
/// landed as a spectator: a room that is `in-game` and paused accepts new
/// joiners as spectators (spec §4.1 "replacement-player path"), who must
/// then `claimSlot` a disconnected player's seat (spec §4.3) to play.
pub fn join_room(
    room: &mut Room,
    user_id: UserId,
    name: String,
    now: DateTime<Utc>,
    bypass_private: bool,
) -> Result<bool, CoreError> {
    if room.kicked_user_ids.contains(&user_id) {
        return Err(RoomError::UserKicked.into());
    }
    if room.is_member(user_id) {
        // Idempotent: rejoining an existing member changes nothing here;
        // connection bookkeeping lives in §4.3.
        return Ok(room.is_spectator(user_id));
    }
    if room.settings.is_private && !bypass_private {
        return Err(RoomError::PrivateRoom.into());
    }
    let joins_as_spectator = matches!(room.state, RoomState::InGame);
    if joins_as_spectator && !room.is_paused {
        return Err(RoomError::GameAlreadyInProgress.into());
    }
    if let Some(max) = room.settings.max_players {
        if room.users.len() >= max {
            return Err(RoomError::RoomFull.into());
        }
    }

    room.users.push(User::new(user_id, name));
    if joins_as_spectator {
        room.spectators.push(user_id);
    } else {
        room.ready_states.insert(user_id, false);
    }
    room.timeout_at = None;
    Ok(joins_as_spectator)
}

/// Promote `new_leader`, who must already be a member.
pub fn promote_leader(room: &mut Room, new_leader: UserId) -> Result<(), CoreError> {
    if !room.is_member(new_leader) {
        return Err(RoomError::NotAMember.into());
    }
    room.leader_id = Some(new_leader);
    Ok(())
}

/// Pick the next leader per spec §4.1 succession rule: the first
/// remaining user from `candidates` in roster order. Returns `None` if
/// the room is now empty of candidates.
#[must_use]
pub fn pick_successor(room: &Room, candidates: &[UserId]) -> Option<UserId> {
    room.users
        .iter()
        .map(|u| u.id)
        .find(|id| candidates.contains(id))
}

pub fn set_ready(room: &mut Room, user_id: UserId, ready: bool) -> Result<(), CoreError> {
    if !room.is_member(user_id) {
        return Err(RoomError::NotAMember.into());
    }
    room.ready_states.insert(user_id, ready);
    Ok(())
}

/// Remove a user from the lobby roster entirely: users, ready-states, and
/// team slots (spec §4.3 disconnect-in-lobby path, and voluntary leave).
pub fn remove_from_roster(room: &mut Room, user_id: UserId) {
    room.users.retain(|u| u.id != user_id);
    room.ready_states.remove(&user_id);
    room.spectators.retain(|&id| id != user_id);
    if let Some(teams) = room.teams.as_mut() {
        for team in teams.iter_mut() {
            for slot in team.iter_mut() {
                if *slot == Some(user_id) {
                    *slot = None;
                }
            }
        }
    }
    if room.leader_id == Some(user_id) {
        room.leader_id = None;
    }
}

/// Kick: leader-only (enforced by the caller). Adds to the kick-list and
/// removes from the roster.
pub fn kick_user(room: &mut Room, target: UserId) -> Result<(), CoreError> {
    if !room.is_member(target) {
        return Err(RoomError::NotAMember.into());
    }
    room.kicked_user_ids.insert(target);
    remove_from_roster(room, target);
    Ok(())
}

/// Validate (and optionally apply) a team layout. `strict` requires every
/// slot in every team to be filled; permissive allows partial layouts for
/// UI edits. Duplicate ids across teams are always rejected, and every
/// assigned id must be a current member.
pub fn set_teams(
    room: &mut Room,
    teams: Vec<Vec<TeamSlot>>,
    strict: bool,
) -> Result<(), CoreError> {
    validate_teams(room, &teams, strict)?;
    room.teams = Some(teams);
    Ok(())
}

fn validate_teams(room: &Room, teams: &[Vec<TeamSlot>], strict: bool) -> Result<(), CoreError> {
    let mut seen = HashSet::new();
    for team in teams {
        for slot in team {
            if let Some(user_id) = slot {
                if !room.is_member(*user_id) {
                    return Err(RoomError::UnknownTeamMember.into());
                }
                if !seen.insert(*user_id) {
                    return Err(RoomError::DuplicateTeamSlot.into());
                }
            } else if strict {
                return Err(RoomError::IncompleteTeams.into());
            }
        }
    }
    Ok(())
}

/// Shuffle the member list and deal round-robin into `num_teams` teams of
/// `players_per_team` slots (spec §4.2 "randomize teams").
pub fn randomize_teams(
    room: &mut Room,
    num_teams: usize,
    players_per_team: usize,
    rng: &mut impl Rng,
) {
    let mut members: Vec<UserId> = room.users.iter().map(|u| u.id).collect();
    shuffle(&mut members, rng);

    let mut teams = vec![vec![None; players_per_team]; num_teams];
    for (i, user_id) in members.into_iter().take(num_teams * players_per_team).enumerate() {
        teams[i % num_teams][i / num_teams] = Some(user_id);
    }
    room.teams = Some(teams);
}

pub fn update_room_settings(room: &mut Room, max_players: Option<usize>, is_private: Option<bool>) {
    if let Some(max_players) = max_players {
        room.settings.max_players = Some(max_players);
    }
    if let Some(is_private) = is_private {
        room.settings.is_private = is_private;
    }
}

pub fn update_game_settings(room: &mut Room, game_type: GameType, raw: &Map<String, serde_json::Value>) {
    room.game_settings
        .insert(game_type, GameSettings::validate(game_type, raw));
}

pub fn select_game(room: &mut Room, game_type: GameType) {
    room.selected_game_type = game_type;
}

/// Preconditions for `startGame` that don't require initializing game
/// state: leader-only (checked by caller), everyone ready, and (for
/// team games) a strictly-valid team layout sized to the module's
/// requirements.
pub fn check_start_preconditions(room: &Room) -> Result<(), CoreError> {
    if room.users.is_empty() {
        return Err(RoomError::NotAllReady.into());
    }
    if !room.ready_states.values().all(|&ready| ready) {
        return Err(RoomError::NotAllReady.into());
    }

    let meta = metadata(room.selected_game_type);
    if room.users.len() < meta.min_players || room.users.len() > meta.max_players {
        return Err(RoomError::IncompleteTeams.into());
    }

    if meta.requires_teams {
        let teams = room.teams.as_ref().ok_or(RoomError::IncompleteTeams)?;
        if teams.len() != meta.num_teams.unwrap_or(0) {
            return Err(RoomError::IncompleteTeams.into());
        }
        for team in teams {
            if team.len() != meta.players_per_team.unwrap_or(0) || team.iter().any(Option::is_none) {
                return Err(RoomError::IncompleteTeams.into());
            }
        }
        validate_teams(room, teams, true)?;
    }

    Ok(())
}
