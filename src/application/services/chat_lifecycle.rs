//! Chat Lifecycle
//!
//! Creates, updates, reads and deletes chat rooms. Creation seeds the initial
//! roster: the creator as admin, participants with the chat's default role.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::config::ChatSettings;
use crate::domain::{
    Chat, ChatId, ChatStore, MemberRole, Membership, Roster, RosterChangeset, UserId,
};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;
use crate::shared::validation::{validate_description, validate_display_name};

use super::chat_locks::ChatLocks;

/// Attempts at drawing a join link that no other chat owns.
const MAX_JOIN_LINK_ATTEMPTS: usize = 5;

/// Create chat request
#[derive(Debug, Clone)]
pub struct CreateChatDto {
    pub name: String,
    pub description: String,
    pub participant_ids: Vec<UserId>,
    pub is_channel: bool,
}

/// Update chat request. All mutable fields are overwritten.
#[derive(Debug, Clone)]
pub struct UpdateChatDto {
    pub name: String,
    pub description: String,
    pub profile_pic: String,
}

pub struct ChatLifecycle {
    store: Arc<dyn ChatStore>,
    locks: Arc<ChatLocks>,
    limits: ChatSettings,
}

impl ChatLifecycle {
    pub fn new(store: Arc<dyn ChatStore>, locks: Arc<ChatLocks>, limits: ChatSettings) -> Self {
        Self {
            store,
            locks,
            limits,
        }
    }

    /// Changeset deleting a chat together with its whole roster.
    pub fn deletion(chat_id: ChatId) -> RosterChangeset {
        RosterChangeset::new(chat_id).delete_chat()
    }

    /// Load a chat or fail with `NotFound`.
    pub async fn load(&self, chat_id: ChatId) -> Result<Chat, AppError> {
        self.store
            .find_chat(chat_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Chat {} not found", chat_id)))
    }

    /// Create a chat and seed its roster in one atomic write.
    pub async fn create(
        &self,
        creator_id: UserId,
        request: CreateChatDto,
    ) -> Result<(Chat, Roster), AppError> {
        validate_display_name(&request.name)?;
        validate_description(&request.description)?;

        let mut participants: Vec<UserId> = Vec::with_capacity(request.participant_ids.len());
        for id in request.participant_ids {
            if id != creator_id && !participants.contains(&id) {
                participants.push(id);
            }
        }

        if !request.is_channel {
            let total = participants.len() + 1;
            if total < self.limits.min_members {
                return Err(AppError::Validation(format!(
                    "a chat needs at least {} members including the creator",
                    self.limits.min_members
                )));
            }
            if total > self.limits.max_members {
                metrics::record_capacity_rejection();
                return Err(AppError::Capacity(format!(
                    "a chat holds at most {} members, {} requested",
                    self.limits.max_members, total
                )));
            }
        }

        let join_link = self.unique_join_link().await?;
        let chat = Chat::new(
            request.name,
            request.description,
            creator_id,
            request.is_channel,
            join_link,
        );

        let participant_role = MemberRole::default_for(chat.is_channel);
        let memberships: Vec<Membership> =
            std::iter::once(Membership::new(chat.id, creator_id, MemberRole::Admin))
                .chain(
                    participants
                        .iter()
                        .map(|&user_id| Membership::new(chat.id, user_id, participant_role)),
                )
                .collect();

        let changeset = memberships.iter().cloned().fold(
            RosterChangeset::new(chat.id).save_chat(chat.clone()),
            RosterChangeset::upsert,
        );
        self.store.commit(changeset).await?;

        info!(
            chat_id = %chat.id,
            creator_id = %creator_id,
            is_channel = chat.is_channel,
            members = memberships.len(),
            "Chat created"
        );
        metrics::record_roster_mutation("create_chat");

        Ok((chat, Roster::from_memberships(&memberships)))
    }

    /// Overwrite a chat's name, description and profile picture.
    pub async fn update(&self, chat_id: ChatId, update: UpdateChatDto) -> Result<Chat, AppError> {
        validate_display_name(&update.name)?;
        validate_description(&update.description)?;

        let _guard = self.locks.lock(chat_id).await;
        let mut chat = self.load(chat_id).await?;

        chat.name = update.name;
        chat.description = update.description;
        chat.profile_pic = update.profile_pic;
        chat.updated_at = Utc::now();

        // Update-only write: a chat deleted since `load` stays deleted.
        self.store
            .commit(RosterChangeset::new(chat_id).update_chat(chat.clone()))
            .await?;

        debug!(chat_id = %chat_id, "Chat updated");
        metrics::record_roster_mutation("update_chat");

        Ok(chat)
    }

    /// Delete a chat and every membership in it.
    pub async fn delete(&self, chat_id: ChatId) -> Result<(), AppError> {
        let _guard = self.locks.lock(chat_id).await;
        self.load(chat_id).await?;

        self.store.commit(Self::deletion(chat_id)).await?;

        info!(chat_id = %chat_id, "Chat deleted");
        metrics::record_roster_mutation("delete_chat");

        Ok(())
    }

    /// A chat and its role-partitioned roster.
    ///
    /// A chat without any membership rows is reported as not found.
    pub async fn get(&self, chat_id: ChatId) -> Result<(Chat, Roster), AppError> {
        let chat = self.load(chat_id).await?;
        let memberships = self.store.list_memberships(chat_id).await?;

        if memberships.is_empty() {
            return Err(AppError::NotFound(format!("Chat {} has no members", chat_id)));
        }

        Ok((chat, Roster::from_memberships(&memberships)))
    }

    async fn unique_join_link(&self) -> Result<String, AppError> {
        for _ in 0..MAX_JOIN_LINK_ATTEMPTS {
            let link = Chat::generate_join_link(self.limits.join_link_length);
            if self.store.find_chat_by_join_link(&link).await?.is_none() {
                return Ok(link);
            }
        }

        Err(AppError::Internal(
            "Failed to generate unique join link".to_string(),
        ))
    }
}
