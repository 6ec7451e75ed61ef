//! Drives a Dominoes round through the public `Registry`/`RoomHandle`
//! surface: the starting seat, a legal placement, and a pass when a hand
//! holds no matching tile.

use std::sync::Arc;

use cardroom_core::events::NullEmitter;
use cardroom_core::game::dominoes::board::Side;
use cardroom_core::game::dominoes::state::DominoesPlayerState;
use cardroom_core::game::GameType;
use cardroom_core::ids::UserId;
use cardroom_core::room::actor::{ActorConfig, RoomHandle};
use cardroom_core::room::messages::{RoomMessage, RoomResponse};
use cardroom_core::room::registry::Registry;

fn registry() -> Registry {
    Registry::new(Arc::new(NullEmitter), ActorConfig::default())
}

async fn four_player_dominoes_room() -> (RoomHandle, Vec<UserId>) {
    let reg = registry();
    let creator = UserId::new();
    let handle = reg.create_room(creator, "p0".into(), "dominoes night".into()).await.unwrap();

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
        .send(|respond_to| RoomMessage::SelectGame { leader_id: creator, game_type: GameType::Dominoes, respond_to })
        .await
        .unwrap();

    (handle, users)
}

fn player_state(response: RoomResponse) -> DominoesPlayerState {
    match response {
        RoomResponse::PlayerGameState(value) => serde_json::from_value(value).unwrap(),
        other => panic!("expected PlayerGameState, got {other:?}"),
    }
}

async fn get_player_state(handle: &RoomHandle, user_id: UserId) -> DominoesPlayerState {
    let response = handle
        .send(|respond_to| RoomMessage::GetState { user_id: Some(user_id), respond_to })
        .await
        .unwrap();
    player_state(response)
}

#[tokio::test]
async fn start_game_deals_seven_tiles_and_picks_a_starter() {
    let (handle, users) = four_player_dominoes_room().await;
    handle.send(|respond_to| RoomMessage::StartGame { leader_id: users[0], respond_to }).await.unwrap();

    for &user_id in &users {
        let state = get_player_state(&handle, user_id).await;
        assert_eq!(state.hand.len(), 7);
    }
}

#[tokio::test]
async fn first_placement_is_accepted_on_either_end_of_an_empty_board() {
    let (handle, users) = four_player_dominoes_room().await;
    handle.send(|respond_to| RoomMessage::StartGame { leader_id: users[0], respond_to }).await.unwrap();

    let state = get_player_state(&handle, users[0]).await;
    let starter = state.public.play_order[state.public.current_turn_index];
    let starter_state = get_player_state(&handle, starter).await;
    let tile = starter_state.hand[0];

    handle
        .send(|respond_to| RoomMessage::PlaceTile { user_id: starter, tile, side: Side::Left, respond_to })
        .await
        .unwrap();

    let state = get_player_state(&handle, starter).await;
    assert_eq!(state.public.board.chain.len(), 1);
    assert_eq!(state.hand.len(), 6);
}

#[tokio::test]
async fn passing_is_rejected_while_a_legal_move_exists() {
    let (handle, users) = four_player_dominoes_room().await;
    handle.send(|respond_to| RoomMessage::StartGame { leader_id: users[0], respond_to }).await.unwrap();

    let state = get_player_state(&handle, users[0]).await;
    let starter = state.public.play_order[state.public.current_turn_index];

    // Before any tile is on the board every tile is legal, so a pass must
    // be refused.
    let err = handle.send(|respond_to| RoomMessage::Pass { user_id: starter, respond_to }).await.unwrap_err();
    assert_eq!(err.kind(), cardroom_core::ErrorKind::BadRequest);
}
