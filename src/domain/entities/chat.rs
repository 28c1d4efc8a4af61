//! Chat entity and the chat store contract.
//!
//! Maps to the `chats` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{ChatId, UserId};
use crate::shared::error::AppError;

use super::{Membership, RosterChangeset};

/// Default length of generated join links.
pub const DEFAULT_JOIN_LINK_LENGTH: usize = 16;

/// Represents a chat room: a bounded direct chat or an unbounded channel.
///
/// Maps to the `chats` table:
/// - id: UUID PRIMARY KEY
/// - name: VARCHAR(52) NOT NULL CHECK (name <> '')
/// - creator_id: UUID NOT NULL
/// - is_channel: BOOLEAN NOT NULL DEFAULT FALSE
/// - join_link: VARCHAR(64) NOT NULL UNIQUE CHECK (join_link <> '')
/// - description: TEXT NOT NULL DEFAULT ''
/// - profile_pic: TEXT NOT NULL DEFAULT ''
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// - updated_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: ChatId,

    /// Display name, 1-52 characters
    pub name: String,

    /// Creator, immutable after creation
    pub creator_id: UserId,

    /// Broadcast channel flag, immutable after creation
    pub is_channel: bool,

    /// Opaque self-admission token, unique and immutable
    pub join_link: String,

    pub description: String,

    /// Opaque reference into the media service
    pub profile_pic: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chat {
    /// Create a new chat with a fresh id.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        creator_id: UserId,
        is_channel: bool,
        join_link: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            creator_id,
            is_channel,
            join_link,
            description: description.into(),
            profile_pic: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Take the mutable fields from `other`. Identity fields are kept.
    pub fn overwrite_details(&mut self, other: Chat) {
        self.name = other.name;
        self.description = other.description;
        self.profile_pic = other.profile_pic;
        self.updated_at = other.updated_at;
    }

    pub fn is_creator(&self, user_id: UserId) -> bool {
        self.creator_id == user_id
    }

    /// Whether the membership cap and floor apply to this chat.
    pub fn is_bounded(&self) -> bool {
        !self.is_channel
    }

    /// Generate a random join link of `len` alphanumeric characters.
    pub fn generate_join_link(len: usize) -> String {
        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

        let mut rng = rand::rng();
        (0..len)
            .map(|_| {
                let idx = rng.random_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }
}

/// Storage contract for chats and their memberships.
///
/// Implemented in the infrastructure layer. Multi-step writes go through
/// [`ChatStore::commit`]; the single-item writes are conveniences on top of it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Find a chat by id.
    async fn find_chat(&self, chat_id: ChatId) -> Result<Option<Chat>, AppError>;

    /// Find the chat owning a join link.
    async fn find_chat_by_join_link(&self, join_link: &str) -> Result<Option<Chat>, AppError>;

    /// All memberships of a chat, in join order.
    async fn list_memberships(&self, chat_id: ChatId) -> Result<Vec<Membership>, AppError>;

    /// Apply every change in the changeset atomically.
    ///
    /// Returns `Conflict` when `expected_members` no longer matches the
    /// stored roster, or when a unique key would be violated.
    async fn commit(&self, changeset: RosterChangeset) -> Result<(), AppError>;

    /// Insert or overwrite a chat record.
    async fn save_chat(&self, chat: &Chat) -> Result<(), AppError> {
        self.commit(RosterChangeset::new(chat.id).save_chat(chat.clone()))
            .await
    }

    /// Delete a chat and all of its memberships.
    async fn delete_chat(&self, chat_id: ChatId) -> Result<(), AppError> {
        self.commit(RosterChangeset::new(chat_id).delete_chat()).await
    }

    /// Insert or overwrite a membership row.
    async fn upsert_membership(&self, membership: &Membership) -> Result<(), AppError> {
        self.commit(RosterChangeset::new(membership.chat_id).upsert(membership.clone()))
            .await
    }

    /// Delete a membership row.
    async fn delete_membership(&self, chat_id: ChatId, user_id: UserId) -> Result<(), AppError> {
        self.commit(RosterChangeset::new(chat_id).remove(user_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_join_link() {
        let link = Chat::generate_join_link(DEFAULT_JOIN_LINK_LENGTH);
        assert_eq!(link.len(), DEFAULT_JOIN_LINK_LENGTH);
        assert!(link.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(link, Chat::generate_join_link(DEFAULT_JOIN_LINK_LENGTH));
    }

    #[test]
    fn test_new_chat() {
        let creator = Uuid::new_v4();
        let chat = Chat::new("general", "talk", creator, true, "abc".into());

        assert!(chat.is_creator(creator));
        assert!(!chat.is_bounded());
        assert!(chat.profile_pic.is_empty());
        assert_eq!(chat.created_at, chat.updated_at);
    }
}
