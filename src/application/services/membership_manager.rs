//! Membership Manager
//!
//! Roster mutations: adding and removing members, promoting and demoting
//! admins, toggling read-only status.
//!
//! Every operation holds the chat's lock, reads the roster once and commits a
//! single changeset computed from that snapshot. Ids that are not on the
//! roster are ignored by the role toggles, and the creator's own row is never
//! retagged.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::ChatSettings;
use crate::domain::{Chat, ChatId, ChatStore, MemberRole, Membership, RosterChangeset, UserId};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

use super::chat_lifecycle::ChatLifecycle;
use super::chat_locks::ChatLocks;

/// Result of a member removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// This many memberships were removed.
    MembersRemoved(usize),
    /// The removal would have left too few members, so the chat was deleted.
    ChatDeleted,
}

pub struct MembershipManager {
    store: Arc<dyn ChatStore>,
    locks: Arc<ChatLocks>,
    limits: ChatSettings,
}

impl MembershipManager {
    pub fn new(store: Arc<dyn ChatStore>, locks: Arc<ChatLocks>, limits: ChatSettings) -> Self {
        Self {
            store,
            locks,
            limits,
        }
    }

    async fn load(&self, chat_id: ChatId) -> Result<Chat, AppError> {
        self.store
            .find_chat(chat_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Chat {} not found", chat_id)))
    }

    /// Add users with the chat's default role. Returns how many were added.
    ///
    /// Users already on the roster keep their current role.
    pub async fn add_users(&self, chat_id: ChatId, user_ids: &[UserId]) -> Result<usize, AppError> {
        let _guard = self.locks.lock(chat_id).await;
        let chat = self.load(chat_id).await?;
        let roster = self.store.list_memberships(chat_id).await?;

        let present: HashSet<UserId> = roster.iter().map(|m| m.user_id).collect();
        let mut seen = HashSet::new();
        let new_ids: Vec<UserId> = user_ids
            .iter()
            .copied()
            .filter(|id| !present.contains(id) && seen.insert(*id))
            .collect();

        if new_ids.is_empty() {
            debug!(chat_id = %chat_id, "No new users to add");
            return Ok(0);
        }

        if chat.is_bounded() && roster.len() + new_ids.len() > self.limits.max_members {
            warn!(
                chat_id = %chat_id,
                current = roster.len(),
                requested = new_ids.len(),
                max = self.limits.max_members,
                "Chat is full"
            );
            metrics::record_capacity_rejection();
            return Err(AppError::Capacity(format!(
                "chat {} holds {} of {} members, cannot add {}",
                chat_id,
                roster.len(),
                self.limits.max_members,
                new_ids.len()
            )));
        }

        let role = MemberRole::default_for(chat.is_channel);
        let changeset = new_ids.iter().fold(
            RosterChangeset::new(chat_id).expecting_members(roster.len()),
            |cs, &user_id| cs.upsert(Membership::new(chat_id, user_id, role)),
        );
        self.store.commit(changeset).await?;

        debug!(chat_id = %chat_id, added = new_ids.len(), "Users added");
        metrics::record_roster_mutation("add_users");

        Ok(new_ids.len())
    }

    /// Remove users from a chat.
    ///
    /// The creator can never be removed. For a non-channel chat, a removal that
    /// would leave fewer than the minimum members deletes the chat instead.
    pub async fn delete_users(
        &self,
        chat_id: ChatId,
        user_ids: &[UserId],
    ) -> Result<RemovalOutcome, AppError> {
        let _guard = self.locks.lock(chat_id).await;
        let chat = self.load(chat_id).await?;

        if user_ids.iter().any(|&id| chat.is_creator(id)) {
            return Err(AppError::Forbidden(
                "the chat creator cannot be removed".into(),
            ));
        }

        let roster = self.store.list_memberships(chat_id).await?;
        let targets: HashSet<UserId> = user_ids.iter().copied().collect();
        let matched: Vec<UserId> = roster
            .iter()
            .map(|m| m.user_id)
            .filter(|id| targets.contains(id))
            .collect();

        if matched.is_empty() {
            debug!(chat_id = %chat_id, "No matching members to remove");
            return Ok(RemovalOutcome::MembersRemoved(0));
        }

        let remaining = roster.len() - matched.len();
        if chat.is_bounded() && remaining < self.limits.min_members {
            self.store
                .commit(ChatLifecycle::deletion(chat_id).expecting_members(roster.len()))
                .await?;

            info!(
                chat_id = %chat_id,
                remaining,
                min = self.limits.min_members,
                "Chat deleted after membership fell below minimum"
            );
            metrics::record_cascade_delete();
            metrics::record_roster_mutation("delete_chat");
            return Ok(RemovalOutcome::ChatDeleted);
        }

        let changeset = matched.iter().fold(
            RosterChangeset::new(chat_id).expecting_members(roster.len()),
            |cs, &user_id| cs.remove(user_id),
        );
        self.store.commit(changeset).await?;

        debug!(chat_id = %chat_id, removed = matched.len(), "Users removed");
        metrics::record_roster_mutation("delete_users");

        Ok(RemovalOutcome::MembersRemoved(matched.len()))
    }

    /// Make members read-only. Admins among them are demoted.
    pub async fn make_users_readers(
        &self,
        chat_id: ChatId,
        user_ids: &[UserId],
    ) -> Result<usize, AppError> {
        self.retag(chat_id, user_ids, "make_readers", |_| Some(MemberRole::Reader))
            .await
    }

    /// Restore readers to full members. Admins are left as they are.
    pub async fn make_readers_users(
        &self,
        chat_id: ChatId,
        user_ids: &[UserId],
    ) -> Result<usize, AppError> {
        self.retag(chat_id, user_ids, "make_members", |role| {
            (role == MemberRole::Reader).then_some(MemberRole::Member)
        })
        .await
    }

    /// Promote members to admin. Readers lose their read-only status.
    pub async fn add_admins(&self, chat_id: ChatId, user_ids: &[UserId]) -> Result<usize, AppError> {
        self.retag(chat_id, user_ids, "add_admins", |_| Some(MemberRole::Admin))
            .await
    }

    /// Demote admins to full members.
    pub async fn remove_admins(
        &self,
        chat_id: ChatId,
        user_ids: &[UserId],
    ) -> Result<usize, AppError> {
        self.retag(chat_id, user_ids, "remove_admins", |role| {
            (role == MemberRole::Admin).then_some(MemberRole::Member)
        })
        .await
    }

    /// Apply `transition` to every matching, non-creator membership.
    /// Returns the number of rows whose role actually changed.
    async fn retag<F>(
        &self,
        chat_id: ChatId,
        user_ids: &[UserId],
        operation: &'static str,
        transition: F,
    ) -> Result<usize, AppError>
    where
        F: Fn(MemberRole) -> Option<MemberRole> + Send,
    {
        let _guard = self.locks.lock(chat_id).await;
        let chat = self.load(chat_id).await?;
        let roster = self.store.list_memberships(chat_id).await?;

        let targets: HashSet<UserId> = user_ids.iter().copied().collect();
        let mut changeset = RosterChangeset::new(chat_id).expecting_members(roster.len());

        for membership in roster
            .iter()
            .filter(|m| targets.contains(&m.user_id) && !chat.is_creator(m.user_id))
        {
            match transition(membership.role) {
                Some(role) if role != membership.role => {
                    changeset = changeset.upsert(membership.with_role(role));
                }
                _ => {}
            }
        }

        if changeset.is_empty() {
            debug!(chat_id = %chat_id, operation, "No roles changed");
            return Ok(0);
        }

        let changed = changeset.len();
        self.store.commit(changeset).await?;

        debug!(chat_id = %chat_id, operation, changed, "Roles updated");
        metrics::record_roster_mutation(operation);

        Ok(changed)
    }
}
