//! Chat Service
//!
//! The public chat contract for an authenticated actor. Every call derives
//! the actor's role in the target chat, checks it against
//! [`AccessControlPolicy`] and then delegates to the lifecycle, membership or
//! join-link component.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::config::ChatSettings;
use crate::domain::services::AccessControlPolicy;
use crate::domain::{Chat, ChatAction, ChatId, ChatRole, ChatStore, Roster, UserId};
use crate::shared::error::AppError;

use super::chat_lifecycle::{ChatLifecycle, CreateChatDto, UpdateChatDto};
use super::chat_locks::ChatLocks;
use super::join_link_resolver::{JoinLinkResolver, JoinOutcome};
use super::membership_manager::{MembershipManager, RemovalOutcome};

/// Chat service trait
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Create a chat owned by `actor`.
    async fn create_chat(&self, actor: UserId, request: CreateChatDto) -> Result<ChatView, AppError>;

    /// Get a chat with its roster. Participants only.
    async fn get_chat(&self, actor: UserId, chat_id: ChatId) -> Result<ChatView, AppError>;

    /// Update chat name, description and picture.
    async fn update_chat(
        &self,
        actor: UserId,
        chat_id: ChatId,
        update: UpdateChatDto,
    ) -> Result<ChatView, AppError>;

    /// Delete a chat. Creator only.
    async fn delete_chat(&self, actor: UserId, chat_id: ChatId) -> Result<(), AppError>;

    async fn add_users(
        &self,
        actor: UserId,
        chat_id: ChatId,
        user_ids: &[UserId],
    ) -> Result<usize, AppError>;

    async fn delete_users(
        &self,
        actor: UserId,
        chat_id: ChatId,
        user_ids: &[UserId],
    ) -> Result<RemovalOutcome, AppError>;

    async fn make_readers(
        &self,
        actor: UserId,
        chat_id: ChatId,
        user_ids: &[UserId],
    ) -> Result<usize, AppError>;

    async fn make_members(
        &self,
        actor: UserId,
        chat_id: ChatId,
        user_ids: &[UserId],
    ) -> Result<usize, AppError>;

    async fn add_admins(
        &self,
        actor: UserId,
        chat_id: ChatId,
        user_ids: &[UserId],
    ) -> Result<usize, AppError>;

    async fn remove_admins(
        &self,
        actor: UserId,
        chat_id: ChatId,
        user_ids: &[UserId],
    ) -> Result<usize, AppError>;

    /// Join the chat owning `join_link`. Needs no prior membership.
    async fn join_by_link(&self, actor: UserId, join_link: &str) -> Result<JoinOutcome, AppError>;
}

/// A chat as seen by one of its participants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatView {
    pub id: ChatId,
    pub creator_id: UserId,
    pub name: String,
    pub description: String,
    pub is_channel: bool,
    pub join_link: String,
    pub profile_pic: String,
    pub members: Vec<UserId>,
    pub admins: Vec<UserId>,
    pub readers: Vec<UserId>,
}

impl ChatView {
    pub fn new(chat: Chat, roster: Roster) -> Self {
        Self {
            id: chat.id,
            creator_id: chat.creator_id,
            name: chat.name,
            description: chat.description,
            is_channel: chat.is_channel,
            join_link: chat.join_link,
            profile_pic: chat.profile_pic,
            members: roster.members,
            admins: roster.admins,
            readers: roster.readers,
        }
    }
}

/// ChatService implementation
pub struct ChatServiceImpl {
    store: Arc<dyn ChatStore>,
    lifecycle: ChatLifecycle,
    membership: MembershipManager,
    joins: JoinLinkResolver,
}

impl ChatServiceImpl {
    /// Wire every component against one store and one lock registry.
    pub fn new(store: Arc<dyn ChatStore>, limits: ChatSettings) -> Self {
        let locks = Arc::new(ChatLocks::new());
        Self {
            lifecycle: ChatLifecycle::new(Arc::clone(&store), Arc::clone(&locks), limits.clone()),
            membership: MembershipManager::new(
                Arc::clone(&store),
                Arc::clone(&locks),
                limits.clone(),
            ),
            joins: JoinLinkResolver::new(Arc::clone(&store), locks, limits),
            store,
        }
    }

    /// Resolve the actor's role in `chat_id` and check it against `action`.
    async fn authorize(
        &self,
        actor: UserId,
        chat_id: ChatId,
        action: ChatAction,
    ) -> Result<(), AppError> {
        let chat = self.lifecycle.load(chat_id).await?;
        let roster = self.store.list_memberships(chat_id).await?;
        let role = ChatRole::of(&chat, actor, &roster);

        AccessControlPolicy::authorize(role, action)?;
        debug!(chat_id = %chat_id, actor = %actor, action = %action, "Authorized");

        Ok(())
    }
}

#[async_trait]
impl ChatService for ChatServiceImpl {
    async fn create_chat(&self, actor: UserId, request: CreateChatDto) -> Result<ChatView, AppError> {
        let (chat, roster) = self.lifecycle.create(actor, request).await?;
        Ok(ChatView::new(chat, roster))
    }

    async fn get_chat(&self, actor: UserId, chat_id: ChatId) -> Result<ChatView, AppError> {
        self.authorize(actor, chat_id, ChatAction::ViewChat).await?;

        let (chat, roster) = self.lifecycle.get(chat_id).await?;
        Ok(ChatView::new(chat, roster))
    }

    async fn update_chat(
        &self,
        actor: UserId,
        chat_id: ChatId,
        update: UpdateChatDto,
    ) -> Result<ChatView, AppError> {
        self.authorize(actor, chat_id, ChatAction::UpdateChat).await?;
        self.lifecycle.update(chat_id, update).await?;

        let (chat, roster) = self.lifecycle.get(chat_id).await?;
        Ok(ChatView::new(chat, roster))
    }

    async fn delete_chat(&self, actor: UserId, chat_id: ChatId) -> Result<(), AppError> {
        self.authorize(actor, chat_id, ChatAction::DeleteChat).await?;
        self.lifecycle.delete(chat_id).await
    }

    async fn add_users(
        &self,
        actor: UserId,
        chat_id: ChatId,
        user_ids: &[UserId],
    ) -> Result<usize, AppError> {
        self.authorize(actor, chat_id, ChatAction::ManageMembership).await?;
        self.membership.add_users(chat_id, user_ids).await
    }

    async fn delete_users(
        &self,
        actor: UserId,
        chat_id: ChatId,
        user_ids: &[UserId],
    ) -> Result<RemovalOutcome, AppError> {
        self.authorize(actor, chat_id, ChatAction::ManageMembership).await?;
        self.membership.delete_users(chat_id, user_ids).await
    }

    async fn make_readers(
        &self,
        actor: UserId,
        chat_id: ChatId,
        user_ids: &[UserId],
    ) -> Result<usize, AppError> {
        self.authorize(actor, chat_id, ChatAction::ManageMembership).await?;
        self.membership.make_users_readers(chat_id, user_ids).await
    }

    async fn make_members(
        &self,
        actor: UserId,
        chat_id: ChatId,
        user_ids: &[UserId],
    ) -> Result<usize, AppError> {
        self.authorize(actor, chat_id, ChatAction::ManageMembership).await?;
        self.membership.make_readers_users(chat_id, user_ids).await
    }

    async fn add_admins(
        &self,
        actor: UserId,
        chat_id: ChatId,
        user_ids: &[UserId],
    ) -> Result<usize, AppError> {
        self.authorize(actor, chat_id, ChatAction::ManageAdmins).await?;
        self.membership.add_admins(chat_id, user_ids).await
    }

    async fn remove_admins(
        &self,
        actor: UserId,
        chat_id: ChatId,
        user_ids: &[UserId],
    ) -> Result<usize, AppError> {
        self.authorize(actor, chat_id, ChatAction::ManageAdmins).await?;
        self.membership.remove_admins(chat_id, user_ids).await
    }

    async fn join_by_link(&self, actor: UserId, join_link: &str) -> Result<JoinOutcome, AppError> {
        self.joins.join(join_link, actor).await
    }
}
