//! Join Link Resolver
//!
//! Admits a user into the chat that owns a join link.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::ChatSettings;
use crate::domain::{ChatId, ChatStore, MemberRole, Membership, RosterChangeset, UserId};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

use super::chat_locks::ChatLocks;

/// Result of a join attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined { chat_id: ChatId, role: MemberRole },
    /// The user was already on the roster; nothing changed.
    AlreadyMember { chat_id: ChatId },
}

impl JoinOutcome {
    pub fn chat_id(&self) -> ChatId {
        match self {
            JoinOutcome::Joined { chat_id, .. } | JoinOutcome::AlreadyMember { chat_id } => *chat_id,
        }
    }
}

pub struct JoinLinkResolver {
    store: Arc<dyn ChatStore>,
    locks: Arc<ChatLocks>,
    limits: ChatSettings,
}

impl JoinLinkResolver {
    pub fn new(store: Arc<dyn ChatStore>, locks: Arc<ChatLocks>, limits: ChatSettings) -> Self {
        Self {
            store,
            locks,
            limits,
        }
    }

    pub async fn join(&self, join_link: &str, user_id: UserId) -> Result<JoinOutcome, AppError> {
        let chat_id = self
            .store
            .find_chat_by_join_link(join_link)
            .await?
            .map(|chat| chat.id)
            .ok_or_else(|| AppError::NotFound("Join link not found".into()))?;

        let _guard = self.locks.lock(chat_id).await;

        // The chat may have been deleted while we waited for the lock.
        let chat = self
            .store
            .find_chat(chat_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Join link not found".into()))?;
        let roster = self.store.list_memberships(chat_id).await?;

        if roster.iter().any(|m| m.user_id == user_id) {
            debug!(chat_id = %chat_id, user_id = %user_id, "User already in chat");
            return Ok(JoinOutcome::AlreadyMember { chat_id });
        }

        if chat.is_bounded() && roster.len() >= self.limits.max_members {
            warn!(
                chat_id = %chat_id,
                user_id = %user_id,
                max = self.limits.max_members,
                "Join rejected, chat is full"
            );
            metrics::record_capacity_rejection();
            return Err(AppError::Capacity(format!(
                "chat {} already holds {} members",
                chat_id, self.limits.max_members
            )));
        }

        let role = MemberRole::default_for(chat.is_channel);
        self.store
            .commit(
                RosterChangeset::new(chat_id)
                    .expecting_members(roster.len())
                    .upsert(Membership::new(chat_id, user_id, role)),
            )
            .await?;

        info!(chat_id = %chat_id, user_id = %user_id, role = role.as_str(), "User joined via link");
        metrics::record_roster_mutation("join");

        Ok(JoinOutcome::Joined { chat_id, role })
    }
}
