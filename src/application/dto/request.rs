//! Request DTOs
//!
//! Data structures for API request bodies and query strings.

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::application::services::{CreateChatDto, UpdateChatDto};

/// Create chat request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateChatRequest {
    #[validate(length(min = 1, max = 52, message = "Name must be 1-52 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 512, message = "Description must be at most 512 characters"))]
    pub description: String,

    #[serde(default, rename = "participants_ids")]
    pub participant_ids: Vec<Uuid>,

    #[serde(default)]
    pub is_channel: bool,
}

impl From<CreateChatRequest> for CreateChatDto {
    fn from(request: CreateChatRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            participant_ids: request.participant_ids,
            is_channel: request.is_channel,
        }
    }
}

/// Update chat request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateChatRequest {
    pub chat_id: Uuid,

    #[validate(length(min = 1, max = 52, message = "Name must be 1-52 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 512, message = "Description must be at most 512 characters"))]
    pub description: String,

    #[serde(default)]
    pub profile_pic: String,
}

impl From<UpdateChatRequest> for UpdateChatDto {
    fn from(request: UpdateChatRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            profile_pic: request.profile_pic,
        }
    }
}

/// Add or remove users
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUsersRequest {
    pub chat_id: Uuid,

    #[validate(length(min = 1, message = "At least one user id is required"))]
    #[serde(rename = "users_ids")]
    pub user_ids: Vec<Uuid>,
}

/// Promote or demote admins
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAdminsRequest {
    pub chat_id: Uuid,

    #[validate(length(min = 1, message = "At least one admin id is required"))]
    pub admins_ids: Vec<Uuid>,
}

/// Grant or revoke read-only status
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateReadersRequest {
    pub chat_id: Uuid,

    #[validate(length(min = 1, message = "At least one reader id is required"))]
    pub readers_ids: Vec<Uuid>,
}

/// `?chatId=` query parameter
#[derive(Debug, Deserialize)]
pub struct ChatIdQuery {
    #[serde(rename = "chatId")]
    pub chat_id: Uuid,
}
