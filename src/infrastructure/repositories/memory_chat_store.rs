//! In-memory ChatStore.
//!
//! Backs local runs and tests. A changeset is applied to a copy of the state
//! and swapped in only if every change succeeds.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::{Chat, ChatId, ChatStore, Membership, RosterChange, RosterChangeset};
use crate::shared::error::AppError;

#[derive(Debug, Clone, Default)]
struct State {
    chats: HashMap<ChatId, Chat>,
    join_links: HashMap<String, ChatId>,
    /// Rosters in join order
    memberships: HashMap<ChatId, Vec<Membership>>,
}

impl State {
    fn apply(&mut self, chat_id: ChatId, change: RosterChange) -> Result<(), AppError> {
        match change {
            RosterChange::SaveChat(chat) => {
                if let Some(owner) = self.join_links.get(&chat.join_link) {
                    if *owner != chat.id {
                        return Err(AppError::Conflict("Join link already in use".into()));
                    }
                }

                match self.chats.get_mut(&chat.id) {
                    Some(existing) => existing.overwrite_details(chat),
                    None => {
                        self.join_links.insert(chat.join_link.clone(), chat.id);
                        self.chats.insert(chat.id, chat);
                    }
                }
            }
            RosterChange::UpdateChat(chat) => match self.chats.get_mut(&chat.id) {
                Some(existing) => existing.overwrite_details(chat),
                None => return Err(AppError::NotFound(format!("Chat {} not found", chat.id))),
            },
            RosterChange::DeleteChat => {
                if let Some(chat) = self.chats.remove(&chat_id) {
                    self.join_links.remove(&chat.join_link);
                }
                self.memberships.remove(&chat_id);
            }
            RosterChange::UpsertMembership(membership) => {
                if !self.chats.contains_key(&chat_id) {
                    return Err(AppError::NotFound(format!("Chat {} not found", chat_id)));
                }

                let roster = self.memberships.entry(chat_id).or_default();
                match roster.iter_mut().find(|m| m.user_id == membership.user_id) {
                    Some(existing) => existing.role = membership.role,
                    None => roster.push(Membership {
                        chat_id,
                        ..membership
                    }),
                }
            }
            RosterChange::DeleteMembership(user_id) => {
                if let Some(roster) = self.memberships.get_mut(&chat_id) {
                    roster.retain(|m| m.user_id != user_id);
                }
            }
        }

        Ok(())
    }
}

/// Chat store holding everything in process memory.
#[derive(Default)]
pub struct InMemoryChatStore {
    state: RwLock<State>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored chats.
    pub fn chat_count(&self) -> usize {
        self.state.read().chats.len()
    }
}

#[async_trait]
impl ChatStore for InMemoryChatStore {
    async fn find_chat(&self, chat_id: ChatId) -> Result<Option<Chat>, AppError> {
        Ok(self.state.read().chats.get(&chat_id).cloned())
    }

    async fn find_chat_by_join_link(&self, join_link: &str) -> Result<Option<Chat>, AppError> {
        let state = self.state.read();
        Ok(state
            .join_links
            .get(join_link)
            .and_then(|id| state.chats.get(id))
            .cloned())
    }

    async fn list_memberships(&self, chat_id: ChatId) -> Result<Vec<Membership>, AppError> {
        Ok(self
            .state
            .read()
            .memberships
            .get(&chat_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn commit(&self, changeset: RosterChangeset) -> Result<(), AppError> {
        let mut state = self.state.write();
        let chat_id = changeset.chat_id;

        if let Some(expected) = changeset.expected_members {
            if !state.chats.contains_key(&chat_id) {
                return Err(AppError::NotFound(format!("Chat {} not found", chat_id)));
            }
            let current = state.memberships.get(&chat_id).map_or(0, Vec::len);
            if current != expected {
                return Err(AppError::Conflict(format!(
                    "roster of chat {} changed concurrently ({} members, expected {})",
                    chat_id, current, expected
                )));
            }
        }

        let mut next = state.clone();
        for change in changeset.changes {
            next.apply(chat_id, change)?;
        }
        *state = next;

        Ok(())
    }
}
