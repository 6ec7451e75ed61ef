//! Drives a full Spades round (bid -> play a trick -> continue) through
//! the `Registry`/`RoomHandle` surface, the same path the WebSocket
//! transport uses.

use std::sync::Arc;

use cardroom_core::events::NullEmitter;
use cardroom_core::game::spades::reducer::can_play_card;
use cardroom_core::game::spades::state::{SpadesPhase, SpadesPlayerState};
use cardroom_core::game::GameType;
use cardroom_core::ids::UserId;
use cardroom_core::room::actor::ActorConfig;
use cardroom_core::room::actor::RoomHandle;
use cardroom_core::room::messages::{RoomMessage, RoomResponse};
use cardroom_core::room::registry::Registry;

fn registry() -> Registry {
    Registry::new(Arc::new(NullEmitter), ActorConfig::default())
}

/// Seats four connected, ready players into two teams of two and selects
/// Spades, leaving the room ready for `StartGame`.
async fn four_player_spades_room() -> (RoomHandle, Vec<UserId>) {
    let reg = registry();
    let creator = UserId::new();
    let handle = reg.create_room(creator, "p0".into(), "spades night".into()).await.unwrap();

    let mut users = vec![creator];
    for i in 1..4 {
        let user_id = UserId::new();
        handle
            .send(|respond_to| RoomMessage::JoinRoom { user_id, name: format!("p{i}"), bypass_private: false, respond_to })
            .await
            .unwrap();
        users.push(user_id);
    }

    for &user_id in &users {
        handle.send(|respond_to| RoomMessage::ToggleReady { user_id, ready: true, respond_to }).await.unwrap();
    }

    handle
        .send(|respond_to| RoomMessage::SelectGame { leader_id: creator, game_type: GameType::Spades, respond_to })
        .await
        .unwrap();

    let teams = vec![vec![Some(users[0]), Some(users[1])], vec![Some(users[2]), Some(users[3])]];
    handle
        .send(|respond_to| RoomMessage::SetTeams { leader_id: creator, teams, strict: true, respond_to })
        .await
        .unwrap();

    (handle, users)
}

fn player_state(response: RoomResponse) -> SpadesPlayerState {
    match response {
        RoomResponse::PlayerGameState(value) => serde_json::from_value(value).unwrap(),
        other => panic!("expected PlayerGameState, got {other:?}"),
    }
}

async fn get_player_state(handle: &RoomHandle, user_id: UserId) -> SpadesPlayerState {
    let response = handle
        .send(|respond_to| RoomMessage::GetState { user_id: Some(user_id), respond_to })
        .await
        .unwrap();
    player_state(response)
}

#[tokio::test]
async fn start_game_deals_thirteen_cards_to_each_seat() {
    let (handle, users) = four_player_spades_room().await;

    handle.send(|respond_to| RoomMessage::StartGame { leader_id: users[0], respond_to }).await.unwrap();

    for &user_id in &users {
        let state = get_player_state(&handle, user_id).await;
        assert_eq!(state.hand.len(), 13);
        assert_eq!(state.public.phase, SpadesPhase::Bidding);
    }
}

#[tokio::test]
async fn four_bids_advance_the_round_to_the_playing_phase() {
    let (handle, users) = four_player_spades_room().await;
    handle.send(|respond_to| RoomMessage::StartGame { leader_id: users[0], respond_to }).await.unwrap();

    for _ in 0..4 {
        let state = get_player_state(&handle, users[0]).await;
        let turn = state.public.play_order[state.public.current_turn_index];
        handle
            .send(|respond_to| RoomMessage::PlaceBid { user_id: turn, amount: 3, blind: false, respond_to })
            .await
            .unwrap();
    }

    let state = get_player_state(&handle, users[0]).await;
    assert_eq!(state.public.phase, SpadesPhase::Playing);
    assert_eq!(state.public.bids.len(), 4);
}

#[tokio::test]
async fn a_full_trick_of_four_legal_plays_resolves_to_a_winner() {
    let (handle, users) = four_player_spades_room().await;
    handle.send(|respond_to| RoomMessage::StartGame { leader_id: users[0], respond_to }).await.unwrap();

    for _ in 0..4 {
        let state = get_player_state(&handle, users[0]).await;
        let turn = state.public.play_order[state.public.current_turn_index];
        handle
            .send(|respond_to| RoomMessage::PlaceBid { user_id: turn, amount: 3, blind: false, respond_to })
            .await
            .unwrap();
    }

    for _ in 0..4 {
        let state = get_player_state(&handle, users[0]).await;
        let turn = state.public.play_order[state.public.current_turn_index];
        let turn_state = get_player_state(&handle, turn).await;
        let card = *turn_state
            .hand
            .iter()
            .find(|&&c| can_play_card(&turn_state.hand, &turn_state.public.current_trick, turn_state.public.spades_broken, c))
            .expect("a connected player always has at least one legal card");

        handle.send(|respond_to| RoomMessage::PlayCard { user_id: turn, card, respond_to }).await.unwrap();
    }

    let state = get_player_state(&handle, users[0]).await;
    assert_eq!(state.public.phase, SpadesPhase::TrickResult);
    assert_eq!(state.public.completed_tricks_count, 1);
    assert!(state.public.last_trick_winner_id.is_some());
    assert_eq!(state.hand.len(), 12);
}
