//! End-to-end room lifecycle through the public `Registry`/`RoomHandle`
//! surface: creation, joining, leader actions, and connection bookkeeping.

use std::sync::Arc;
use std::time::Duration;

use cardroom_core::error::ErrorKind;
use cardroom_core::events::NullEmitter;
use cardroom_core::ids::{RoomCode, SocketId, UserId};
use cardroom_core::room::actor::ActorConfig;
use cardroom_core::room::messages::{RoomMessage, RoomResponse};
use cardroom_core::room::registry::Registry;
use cardroom_core::room::RoomState;

fn registry() -> Registry {
    Registry::new(Arc::new(NullEmitter), ActorConfig::default())
}

fn unwrap_room(response: RoomResponse) -> cardroom_core::room::Room {
    match response {
        RoomResponse::Room(room) => *room,
        other => panic!("expected RoomResponse::Room, got {other:?}"),
    }
}

#[tokio::test]
async fn create_room_seats_the_creator_as_sole_leader() {
    let reg = registry();
    let creator = UserId::new();
    let handle = reg.create_room(creator, "alice".into(), "game night".into()).await.unwrap();

    let response = handle.send(|respond_to| RoomMessage::GetState { user_id: None, respond_to }).await.unwrap();
    let room = unwrap_room(response);

    assert_eq!(room.users.len(), 1);
    assert_eq!(room.leader_id, Some(creator));
    assert_eq!(room.state, RoomState::Lobby);
    assert!(reg.get_by_code(&room.code).await.is_some());
}

#[tokio::test]
async fn join_by_code_normalizes_case_and_adds_member() {
    let reg = registry();
    let creator = UserId::new();
    let handle = reg.create_room(creator, "alice".into(), "game night".into()).await.unwrap();
    let code = handle.code().clone();
    let lowercased = RoomCode::normalize(&code.to_string().to_lowercase());

    let joiner_handle = reg.get_by_code(&lowercased).await.expect("code lookup is case-insensitive");
    let joiner = UserId::new();
    let response = joiner_handle
        .send(|respond_to| RoomMessage::JoinRoom { user_id: joiner, name: "bob".into(), bypass_private: false, respond_to })
        .await
        .unwrap();
    let room = unwrap_room(response);

    assert_eq!(room.users.len(), 2);
    assert!(room.is_member(joiner));
}

#[tokio::test]
async fn kicked_user_cannot_rejoin() {
    let reg = registry();
    let creator = UserId::new();
    let handle = reg.create_room(creator, "alice".into(), "game night".into()).await.unwrap();
    let target = UserId::new();
    handle
        .send(|respond_to| RoomMessage::JoinRoom { user_id: target, name: "bob".into(), bypass_private: false, respond_to })
        .await
        .unwrap();

    handle
        .send(|respond_to| RoomMessage::KickUser { leader_id: creator, target, respond_to })
        .await
        .unwrap();

    let err = handle
        .send(|respond_to| RoomMessage::JoinRoom { user_id: target, name: "bob".into(), bypass_private: false, respond_to })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[tokio::test]
async fn only_leader_can_promote_or_kick() {
    let reg = registry();
    let creator = UserId::new();
    let handle = reg.create_room(creator, "alice".into(), "game night".into()).await.unwrap();
    let member = UserId::new();
    handle
        .send(|respond_to| RoomMessage::JoinRoom { user_id: member, name: "bob".into(), bypass_private: false, respond_to })
        .await
        .unwrap();

    let err = handle
        .send(|respond_to| RoomMessage::PromoteLeader { leader_id: member, new_leader: member, respond_to })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let response = handle
        .send(|respond_to| RoomMessage::PromoteLeader { leader_id: creator, new_leader: member, respond_to })
        .await
        .unwrap();
    assert_eq!(unwrap_room(response).leader_id, Some(member));
}

#[tokio::test]
async fn second_connection_for_same_user_supersedes_the_first() {
    let reg = registry();
    let creator = UserId::new();
    let handle = reg.create_room(creator, "alice".into(), "game night".into()).await.unwrap();
    let room_id = handle.room_id();

    let s1 = SocketId::new();
    let outcome1 = reg.connect(s1, room_id, creator).await.unwrap();
    assert!(outcome1.superseded.is_none());

    let s2 = SocketId::new();
    let outcome2 = reg.connect(s2, room_id, creator).await.unwrap();
    assert_eq!(outcome2.superseded, Some(s1));
    assert_eq!(reg.socket_for(room_id, creator).await, Some(s2));
}

#[tokio::test]
async fn disconnect_after_being_superseded_does_not_clear_the_newer_socket() {
    let reg = registry();
    let creator = UserId::new();
    let handle = reg.create_room(creator, "alice".into(), "game night".into()).await.unwrap();
    let room_id = handle.room_id();

    let s1 = SocketId::new();
    reg.connect(s1, room_id, creator).await.unwrap();
    let s2 = SocketId::new();
    reg.connect(s2, room_id, creator).await.unwrap();

    // s1 was superseded; its disconnect must be a no-op for the roster.
    assert!(reg.disconnect(s1).await.is_none());
    assert_eq!(reg.socket_for(room_id, creator).await, Some(s2));
}

#[tokio::test]
async fn closing_a_room_removes_it_from_both_indices() {
    let reg = registry();
    let creator = UserId::new();
    let handle = reg.create_room(creator, "alice".into(), "game night".into()).await.unwrap();
    let code = handle.code().clone();
    let room_id = handle.room_id();

    handle.send(|respond_to| RoomMessage::CloseRoom { leader_id: creator, respond_to }).await.unwrap();

    // The reaper drains asynchronously; give it a moment.
    for _ in 0..50 {
        if reg.get(room_id).await.is_none() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert!(reg.get(room_id).await.is_none());
    assert!(reg.get_by_code(&code).await.is_none());
}

#[tokio::test]
async fn request_join_requires_leader_decision_before_membership() {
    let reg = registry();
    let creator = UserId::new();
    let handle = reg.create_room(creator, "alice".into(), "private room".into()).await.unwrap();
    handle
        .send(|respond_to| RoomMessage::UpdateRoomSettings { leader_id: creator, max_players: None, is_private: Some(true), respond_to })
        .await
        .unwrap();

    let requester = UserId::new();
    handle
        .send(|respond_to| RoomMessage::RequestJoin { user_id: requester, name: "carol".into(), respond_to })
        .await
        .unwrap();

    let response = handle
        .send(|respond_to| RoomMessage::AcceptJoin { leader_id: creator, requester_id: requester, respond_to })
        .await
        .unwrap();
    let room = unwrap_room(response);
    assert!(room.is_member(requester));
}
