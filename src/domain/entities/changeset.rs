//! Atomic batches of chat and roster writes.
//!
//! Every multi-step mutation builds a [`RosterChangeset`] from one roster
//! snapshot and hands it to [`ChatStore::commit`](super::ChatStore::commit),
//! which applies all changes or none.

use crate::domain::value_objects::{ChatId, UserId};

use super::{Chat, Membership};

/// A single write within a changeset.
#[derive(Debug, Clone, PartialEq)]
pub enum RosterChange {
    /// Insert or overwrite the chat record.
    SaveChat(Chat),
    /// Overwrite the mutable fields of an existing chat. Fails with
    /// `NotFound` if the chat is gone.
    UpdateChat(Chat),
    /// Delete the chat record together with all of its memberships.
    DeleteChat,
    /// Insert or overwrite a membership row.
    UpsertMembership(Membership),
    /// Delete a membership row. Missing rows are ignored.
    DeleteMembership(UserId),
}

/// Ordered list of writes against one chat.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterChangeset {
    pub chat_id: ChatId,
    /// Roster size the changeset was computed against.
    ///
    /// Stores that can lock the chat row re-count the roster before applying
    /// and reject the changeset with `Conflict` if the size moved.
    pub expected_members: Option<usize>,
    pub changes: Vec<RosterChange>,
}

impl RosterChangeset {
    pub fn new(chat_id: ChatId) -> Self {
        Self {
            chat_id,
            expected_members: None,
            changes: Vec::new(),
        }
    }

    pub fn expecting_members(mut self, count: usize) -> Self {
        self.expected_members = Some(count);
        self
    }

    pub fn save_chat(mut self, chat: Chat) -> Self {
        self.changes.push(RosterChange::SaveChat(chat));
        self
    }

    pub fn update_chat(mut self, chat: Chat) -> Self {
        self.changes.push(RosterChange::UpdateChat(chat));
        self
    }

    pub fn delete_chat(mut self) -> Self {
        self.changes.push(RosterChange::DeleteChat);
        self
    }

    pub fn upsert(mut self, membership: Membership) -> Self {
        self.changes.push(RosterChange::UpsertMembership(membership));
        self
    }

    pub fn remove(mut self, user_id: UserId) -> Self {
        self.changes.push(RosterChange::DeleteMembership(user_id));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }
}
