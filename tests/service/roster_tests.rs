//! Roster invariants exercised through the ChatService contract.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use uuid::Uuid;

use chat_rooms::application::services::{
    ChatService, ChatView, CreateChatDto, JoinOutcome, RemovalOutcome,
};
use chat_rooms::domain::{ChatStore, MemberRole};
use chat_rooms::shared::error::AppError;

use crate::common::{test_service, users};

fn request(participants: &[Uuid], is_channel: bool) -> CreateChatDto {
    CreateChatDto {
        name: "room".into(),
        description: String::new(),
        participant_ids: participants.to_vec(),
        is_channel,
    }
}

async fn create(service: &Arc<dyn ChatService>, creator: Uuid, participants: &[Uuid]) -> ChatView {
    service
        .create_chat(creator, request(participants, false))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_create_then_get_round_trip() {
    let (service, _) = test_service();
    let creator = Uuid::new_v4();
    let participants = users(3);

    let created = create(&service, creator, &participants).await;
    let fetched = service.get_chat(participants[0], created.id).await.unwrap();

    assert_eq!(fetched, created);
    assert_eq!(fetched.members.len(), 4);
    assert_eq!(fetched.admins, vec![creator]);
}

#[tokio::test]
async fn test_channel_participants_start_as_readers() {
    let (service, _) = test_service();
    let creator = Uuid::new_v4();
    let participants = users(25);

    let channel = service
        .create_chat(creator, request(&participants, true))
        .await
        .unwrap();

    assert_eq!(channel.members.len(), 26);
    assert_eq!(channel.readers, participants);
    assert_eq!(channel.admins, vec![creator]);
}

#[tokio::test]
async fn test_cascade_delete_removes_chat_and_roster() {
    let (service, store) = test_service();
    let creator = Uuid::new_v4();
    let member = Uuid::new_v4();
    let chat = create(&service, creator, &[member]).await;

    let outcome = service.delete_users(creator, chat.id, &[member]).await.unwrap();

    assert_eq!(outcome, RemovalOutcome::ChatDeleted);
    assert!(matches!(
        service.get_chat(creator, chat.id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(store.list_memberships(chat.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_creator_removal_leaves_roster_unchanged() {
    let (service, _) = test_service();
    let creator = Uuid::new_v4();
    let participants = users(3);
    let chat = create(&service, creator, &participants).await;

    let result = service
        .delete_users(creator, chat.id, &[participants[0], creator])
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
    let after = service.get_chat(creator, chat.id).await.unwrap();
    assert_eq!(after.members, chat.members);
}

#[tokio::test]
async fn test_unmatched_ids_are_ignored() {
    let (service, _) = test_service();
    let creator = Uuid::new_v4();
    let chat = create(&service, creator, &users(2)).await;
    let strangers = users(2);

    assert_eq!(service.add_admins(creator, chat.id, &strangers).await.unwrap(), 0);
    assert_eq!(service.make_readers(creator, chat.id, &strangers).await.unwrap(), 0);
    assert_eq!(
        service.delete_users(creator, chat.id, &strangers).await.unwrap(),
        RemovalOutcome::MembersRemoved(0)
    );
    assert_eq!(service.get_chat(creator, chat.id).await.unwrap(), chat);
}

#[tokio::test]
async fn test_admin_and_reader_are_exclusive() {
    let (service, store) = test_service();
    let creator = Uuid::new_v4();
    let target = Uuid::new_v4();
    let chat = create(&service, creator, &[target, Uuid::new_v4()]).await;

    service.add_admins(creator, chat.id, &[target]).await.unwrap();
    service.make_readers(creator, chat.id, &[target]).await.unwrap();
    let muted = service.get_chat(creator, chat.id).await.unwrap();
    assert_eq!(muted.readers, vec![target]);
    assert!(!muted.admins.contains(&target));

    service.add_admins(creator, chat.id, &[target]).await.unwrap();
    let promoted = service.get_chat(creator, chat.id).await.unwrap();
    assert!(promoted.admins.contains(&target));
    assert!(promoted.readers.is_empty());

    let roster = store.list_memberships(chat.id).await.unwrap();
    let row = roster.iter().find(|m| m.user_id == target).unwrap();
    assert_eq!(row.role, MemberRole::Admin);
}

#[tokio::test]
async fn test_remove_admins_restores_member() {
    let (service, _) = test_service();
    let creator = Uuid::new_v4();
    let target = Uuid::new_v4();
    let chat = create(&service, creator, &[target]).await;

    service.add_admins(creator, chat.id, &[target]).await.unwrap();
    let changed = service.remove_admins(creator, chat.id, &[target, creator]).await.unwrap();

    assert_eq!(changed, 1);
    let after = service.get_chat(creator, chat.id).await.unwrap();
    assert_eq!(after.admins, vec![creator]);
    assert!(after.readers.is_empty());
}

#[tokio::test]
async fn test_repeat_join_keeps_role() {
    let (service, _) = test_service();
    let creator = Uuid::new_v4();
    let chat = create(&service, creator, &[Uuid::new_v4()]).await;
    let user = Uuid::new_v4();

    service.join_by_link(user, &chat.join_link).await.unwrap();
    service.make_readers(creator, chat.id, &[user]).await.unwrap();

    let repeat = service.join_by_link(user, &chat.join_link).await.unwrap();

    assert_eq!(repeat, JoinOutcome::AlreadyMember { chat_id: chat.id });
    let after = service.get_chat(creator, chat.id).await.unwrap();
    assert_eq!(after.readers, vec![user]);
}

#[tokio::test]
async fn test_add_users_cannot_exceed_cap() {
    let (service, _) = test_service();
    let creator = Uuid::new_v4();
    let chat = create(&service, creator, &users(17)).await;

    let result = service.add_users(creator, chat.id, &users(3)).await;

    assert!(matches!(result, Err(AppError::Capacity(_))));
    assert_eq!(service.get_chat(creator, chat.id).await.unwrap().members.len(), 18);
    assert_eq!(service.add_users(creator, chat.id, &users(2)).await.unwrap(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_respect_cap() {
    let (service, _) = test_service();
    let creator = Uuid::new_v4();
    let chat = create(&service, creator, &[Uuid::new_v4()]).await;

    let joins = users(40).into_iter().map(|user| {
        let service = Arc::clone(&service);
        let link = chat.join_link.clone();
        tokio::spawn(async move { service.join_by_link(user, &link).await })
    });
    let results = futures::future::join_all(joins).await;

    let joined = results
        .iter()
        .filter(|r| matches!(r, Ok(Ok(JoinOutcome::Joined { .. }))))
        .count();
    let rejected = results
        .iter()
        .filter(|r| matches!(r, Ok(Err(AppError::Capacity(_)))))
        .count();

    assert_eq!(joined, 18);
    assert_eq!(rejected, 22);
    assert_eq!(service.get_chat(creator, chat.id).await.unwrap().members.len(), 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_removals_cascade_once() {
    let (service, store) = test_service();
    let creator = Uuid::new_v4();
    let participants = users(3);
    let chat_id = create(&service, creator, &participants).await.id;

    let removals = participants.into_iter().map(|user| {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.delete_users(creator, chat_id, &[user]).await })
    });
    let results = futures::future::join_all(removals).await;

    // Whichever removal runs last finds two members left and cascades.
    let cascades = results
        .iter()
        .filter(|r| matches!(r, Ok(Ok(RemovalOutcome::ChatDeleted))))
        .count();
    assert_eq!(cascades, 1);
    assert_eq!(store.chat_count(), 0);
}
