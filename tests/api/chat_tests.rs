//! Chat API Tests

use axum::http::{header::SET_COOKIE, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use crate::common::{ids, json_body, users, TestApp};

#[tokio::test]
async fn test_create_chat_returns_roster() {
    // Arrange
    let app = TestApp::new();
    let creator = Uuid::new_v4();
    let participants = users(2);

    // Act
    let chat = app.create_chat(creator, &participants, false).await;

    // Assert
    assert_eq!(chat["creator_id"], creator.to_string());
    assert_eq!(
        ids(&chat["members"]),
        vec![creator, participants[0], participants[1]]
    );
    assert_eq!(ids(&chat["admins"]), vec![creator]);
    assert!(ids(&chat["readers"]).is_empty());
    assert_eq!(chat["join_link"].as_str().unwrap().len(), 16);
}

#[tokio::test]
async fn test_responses_carry_auth_cookie() {
    let app = TestApp::new();
    let creator = Uuid::new_v4();

    let response = app
        .send(
            "POST",
            "/chat/room",
            Some(creator),
            Some(json!({ "name": "room", "participants_ids": [Uuid::new_v4()] })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = response.headers()[SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("Authorization="));
    assert!(cookie.ends_with("; HttpOnly"));
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = TestApp::new();

    let response = app
        .send("GET", &format!("/chat/room?chatId={}", Uuid::new_v4()), None, None)
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_without_participants_is_rejected() {
    let app = TestApp::new();
    let creator = Uuid::new_v4();

    let response = app
        .send(
            "POST",
            "/chat/room",
            Some(creator),
            Some(json!({ "name": "lonely", "participants_ids": [creator] })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_over_cap_is_conflict() {
    let app = TestApp::new();

    let response = app
        .send(
            "POST",
            "/chat/room",
            Some(Uuid::new_v4()),
            Some(json!({ "name": "crowd", "participants_ids": users(20) })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(response).await["code"], 10006);
}

#[tokio::test]
async fn test_get_chat_requires_membership() {
    let app = TestApp::new();
    let creator = Uuid::new_v4();
    let member = Uuid::new_v4();
    let chat = app.create_chat(creator, &[member], false).await;
    let uri = format!("/chat/room?chatId={}", chat["id"].as_str().unwrap());

    let as_member = app.send("GET", &uri, Some(member), None).await;
    let as_stranger = app.send("GET", &uri, Some(Uuid::new_v4()), None).await;

    assert_eq!(as_member.status(), StatusCode::OK);
    assert_eq!(as_stranger.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_member_cannot_add_users_but_admin_can() {
    let app = TestApp::new();
    let creator = Uuid::new_v4();
    let (member, admin) = (Uuid::new_v4(), Uuid::new_v4());
    let chat = app.create_chat(creator, &[member, admin], false).await;
    let chat_id = chat["id"].clone();

    let promoted = app
        .send(
            "PUT",
            "/chat/room/admins",
            Some(creator),
            Some(json!({ "chat_id": chat_id, "admins_ids": [admin] })),
        )
        .await;
    assert_eq!(promoted.status(), StatusCode::OK);

    let body = json!({ "chat_id": chat_id, "users_ids": [Uuid::new_v4()] });
    let by_member = app
        .send("PUT", "/chat/room/users", Some(member), Some(body.clone()))
        .await;
    let by_admin = app
        .send("PUT", "/chat/room/users", Some(admin), Some(body))
        .await;

    assert_eq!(by_member.status(), StatusCode::FORBIDDEN);
    assert_eq!(by_admin.status(), StatusCode::OK);
    assert_eq!(json_body(by_admin).await["affected"], 1);
}

#[tokio::test]
async fn test_admin_cannot_manage_admins() {
    let app = TestApp::new();
    let creator = Uuid::new_v4();
    let (admin, member) = (Uuid::new_v4(), Uuid::new_v4());
    let chat = app.create_chat(creator, &[admin, member], false).await;
    let chat_id = chat["id"].clone();

    app.send(
        "PUT",
        "/chat/room/admins",
        Some(creator),
        Some(json!({ "chat_id": chat_id, "admins_ids": [admin] })),
    )
    .await;

    let response = app
        .send(
            "PUT",
            "/chat/room/admins",
            Some(admin),
            Some(json!({ "chat_id": chat_id, "admins_ids": [member] })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_removing_creator_is_forbidden() {
    let app = TestApp::new();
    let creator = Uuid::new_v4();
    let chat = app.create_chat(creator, &users(3), false).await;

    let response = app
        .send(
            "DELETE",
            "/chat/room/users",
            Some(creator),
            Some(json!({ "chat_id": chat["id"], "users_ids": [creator] })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_removal_below_minimum_deletes_chat() {
    let app = TestApp::new();
    let creator = Uuid::new_v4();
    let member = Uuid::new_v4();
    let chat = app.create_chat(creator, &[member], false).await;

    let response = app
        .send(
            "DELETE",
            "/chat/room/users",
            Some(creator),
            Some(json!({ "chat_id": chat["id"], "users_ids": [member] })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["chat_deleted"], true);

    let uri = format!("/chat/room?chatId={}", chat["id"].as_str().unwrap());
    let gone = app.send("GET", &uri, Some(creator), None).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reader_toggles() {
    let app = TestApp::new();
    let creator = Uuid::new_v4();
    let member = Uuid::new_v4();
    let chat = app.create_chat(creator, &[member], false).await;
    let chat_id = chat["id"].clone();
    let uri = format!("/chat/room?chatId={}", chat_id.as_str().unwrap());

    app.send(
        "PUT",
        "/chat/room/readers",
        Some(creator),
        Some(json!({ "chat_id": chat_id, "readers_ids": [member] })),
    )
    .await;
    let after_mute = json_body(app.send("GET", &uri, Some(creator), None).await).await;
    assert_eq!(ids(&after_mute["readers"]), vec![member]);

    app.send(
        "DELETE",
        "/chat/room/readers",
        Some(creator),
        Some(json!({ "chat_id": chat_id, "readers_ids": [member] })),
    )
    .await;
    let after_unmute = json_body(app.send("GET", &uri, Some(creator), None).await).await;
    assert!(ids(&after_unmute["readers"]).is_empty());
    assert_eq!(ids(&after_unmute["members"]), vec![creator, member]);
}

#[tokio::test]
async fn test_join_by_link() {
    let app = TestApp::new();
    let creator = Uuid::new_v4();
    let chat = app.create_chat(creator, &[Uuid::new_v4()], false).await;
    let uri = format!("/chat/room/{}", chat["join_link"].as_str().unwrap());
    let newcomer = Uuid::new_v4();

    let first = app.send("POST", &uri, Some(newcomer), None).await;
    assert_eq!(first.status(), StatusCode::OK);
    let first = json_body(first).await;
    assert_eq!(first["joined"], true);
    assert_eq!(first["role"], "member");

    let repeat = json_body(app.send("POST", &uri, Some(newcomer), None).await).await;
    assert_eq!(repeat["joined"], false);
}

#[tokio::test]
async fn test_unknown_join_link_is_not_found() {
    let app = TestApp::new();

    let response = app
        .send("POST", "/chat/room/doesnotexist", Some(Uuid::new_v4()), None)
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_chat() {
    let app = TestApp::new();
    let creator = Uuid::new_v4();
    let chat = app.create_chat(creator, &[Uuid::new_v4()], false).await;

    let response = app
        .send(
            "PUT",
            "/chat/room",
            Some(creator),
            Some(json!({
                "chat_id": chat["id"],
                "name": "renamed",
                "description": "new topic",
                "profile_pic": "media/abc",
            })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let updated = json_body(response).await;
    assert_eq!(updated["name"], "renamed");
    assert_eq!(updated["profile_pic"], "media/abc");
    assert_eq!(updated["join_link"], chat["join_link"]);
}

#[tokio::test]
async fn test_update_with_blank_name_is_rejected() {
    let app = TestApp::new();
    let creator = Uuid::new_v4();
    let chat = app.create_chat(creator, &[Uuid::new_v4()], false).await;

    let response = app
        .send(
            "PUT",
            "/chat/room",
            Some(creator),
            Some(json!({ "chat_id": chat["id"], "name": "   " })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_only_creator_deletes_chat() {
    let app = TestApp::new();
    let creator = Uuid::new_v4();
    let admin = Uuid::new_v4();
    let chat = app.create_chat(creator, &[admin, Uuid::new_v4()], false).await;
    let chat_id = chat["id"].as_str().unwrap().to_string();

    app.send(
        "PUT",
        "/chat/room/admins",
        Some(creator),
        Some(json!({ "chat_id": chat_id, "admins_ids": [admin] })),
    )
    .await;

    let uri = format!("/chat/room?chatId={}", chat_id);
    let by_admin = app.send("DELETE", &uri, Some(admin), None).await;
    assert_eq!(by_admin.status(), StatusCode::FORBIDDEN);

    let by_creator = app.send("DELETE", &uri, Some(creator), None).await;
    assert_eq!(by_creator.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.store.chat_count(), 0);
}

#[tokio::test]
async fn test_empty_id_list_is_bad_request() {
    let app = TestApp::new();
    let creator = Uuid::new_v4();
    let chat = app.create_chat(creator, &[Uuid::new_v4()], false).await;

    let response = app
        .send(
            "PUT",
            "/chat/room/users",
            Some(creator),
            Some(json!({ "chat_id": chat["id"], "users_ids": [] })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
