//! Response DTOs
//!
//! Data structures for API response bodies.

use serde::Serialize;
use uuid::Uuid;

use crate::application::services::{ChatView, JoinOutcome, RemovalOutcome};

/// Chat response with its role-partitioned roster
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub name: String,
    pub description: String,
    pub is_channel: bool,
    pub join_link: String,
    pub profile_pic: String,
    pub members: Vec<Uuid>,
    pub admins: Vec<Uuid>,
    pub readers: Vec<Uuid>,
}

impl From<ChatView> for ChatResponse {
    fn from(view: ChatView) -> Self {
        Self {
            id: view.id,
            creator_id: view.creator_id,
            name: view.name,
            description: view.description,
            is_channel: view.is_channel,
            join_link: view.join_link,
            profile_pic: view.profile_pic,
            members: view.members,
            admins: view.admins,
            readers: view.readers,
        }
    }
}

/// Result of a roster mutation
#[derive(Debug, Serialize)]
pub struct RosterUpdateResponse {
    pub chat_id: Uuid,
    /// Number of memberships added, removed or retagged
    pub affected: usize,
    /// Set when a removal dropped the chat below its minimum size
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub chat_deleted: bool,
}

impl RosterUpdateResponse {
    pub fn affected(chat_id: Uuid, affected: usize) -> Self {
        Self {
            chat_id,
            affected,
            chat_deleted: false,
        }
    }

    pub fn from_removal(chat_id: Uuid, outcome: RemovalOutcome) -> Self {
        match outcome {
            RemovalOutcome::MembersRemoved(count) => Self::affected(chat_id, count),
            RemovalOutcome::ChatDeleted => Self {
                chat_id,
                affected: 0,
                chat_deleted: true,
            },
        }
    }
}

/// Join link response
#[derive(Debug, Serialize)]
pub struct JoinResponse {
    pub chat_id: Uuid,
    pub joined: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl From<JoinOutcome> for JoinResponse {
    fn from(outcome: JoinOutcome) -> Self {
        let chat_id = outcome.chat_id();
        match outcome {
            JoinOutcome::Joined { role, .. } => Self {
                chat_id,
                joined: true,
                role: Some(role.as_str().to_string()),
            },
            JoinOutcome::AlreadyMember { .. } => Self {
                chat_id,
                joined: false,
                role: None,
            },
        }
    }
}
