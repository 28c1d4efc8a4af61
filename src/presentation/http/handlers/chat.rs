//! Chat Handlers

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::request::{
    ChatIdQuery, CreateChatRequest, UpdateAdminsRequest, UpdateChatRequest, UpdateReadersRequest,
    UpdateUsersRequest,
};
use crate::application::dto::response::{ChatResponse, JoinResponse, RosterUpdateResponse};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

/// Create a chat owned by the caller
pub async fn create_chat(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateChatRequest>,
) -> Result<(StatusCode, Json<ChatResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let view = state.chat_service.create_chat(auth.user_id, body.into()).await?;

    Ok((StatusCode::CREATED, Json(ChatResponse::from(view))))
}

/// Get a chat and its roster
pub async fn get_chat(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ChatIdQuery>,
) -> Result<Json<ChatResponse>, AppError> {
    let view = state.chat_service.get_chat(auth.user_id, query.chat_id).await?;
    Ok(Json(ChatResponse::from(view)))
}

/// Update chat name, description and picture
pub async fn update_chat(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<UpdateChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let chat_id = body.chat_id;
    let view = state
        .chat_service
        .update_chat(auth.user_id, chat_id, body.into())
        .await?;

    Ok(Json(ChatResponse::from(view)))
}

/// Delete a chat
pub async fn delete_chat(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ChatIdQuery>,
) -> Result<StatusCode, AppError> {
    state
        .chat_service
        .delete_chat(auth.user_id, query.chat_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<UpdateUsersRequest>,
) -> Result<Json<RosterUpdateResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let added = state
        .chat_service
        .add_users(auth.user_id, body.chat_id, &body.user_ids)
        .await?;

    Ok(Json(RosterUpdateResponse::affected(body.chat_id, added)))
}

/// Remove users; may delete the chat if too few members remain
pub async fn delete_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<UpdateUsersRequest>,
) -> Result<Json<RosterUpdateResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let outcome = state
        .chat_service
        .delete_users(auth.user_id, body.chat_id, &body.user_ids)
        .await?;

    Ok(Json(RosterUpdateResponse::from_removal(body.chat_id, outcome)))
}

pub async fn add_admins(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<UpdateAdminsRequest>,
) -> Result<Json<RosterUpdateResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let changed = state
        .chat_service
        .add_admins(auth.user_id, body.chat_id, &body.admins_ids)
        .await?;

    Ok(Json(RosterUpdateResponse::affected(body.chat_id, changed)))
}

pub async fn remove_admins(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<UpdateAdminsRequest>,
) -> Result<Json<RosterUpdateResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let changed = state
        .chat_service
        .remove_admins(auth.user_id, body.chat_id, &body.admins_ids)
        .await?;

    Ok(Json(RosterUpdateResponse::affected(body.chat_id, changed)))
}

/// Make members read-only
pub async fn make_readers(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<UpdateReadersRequest>,
) -> Result<Json<RosterUpdateResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let changed = state
        .chat_service
        .make_readers(auth.user_id, body.chat_id, &body.readers_ids)
        .await?;

    Ok(Json(RosterUpdateResponse::affected(body.chat_id, changed)))
}

/// Restore readers to full members
pub async fn make_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<UpdateReadersRequest>,
) -> Result<Json<RosterUpdateResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let changed = state
        .chat_service
        .make_members(auth.user_id, body.chat_id, &body.readers_ids)
        .await?;

    Ok(Json(RosterUpdateResponse::affected(body.chat_id, changed)))
}

/// Join a chat through its join link
pub async fn join_chat(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(join_link): Path<String>,
) -> Result<Json<JoinResponse>, AppError> {
    let outcome = state
        .chat_service
        .join_by_link(auth.user_id, &join_link)
        .await?;

    Ok(Json(JoinResponse::from(outcome)))
}
