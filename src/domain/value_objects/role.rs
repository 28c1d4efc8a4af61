//! Chat roles and the actions they may be checked against.

use serde::{Deserialize, Serialize};

use crate::domain::entities::{Chat, MemberRole, Membership};

use super::UserId;

/// Role a user holds in a chat, derived at read time.
///
/// `Creator` comes from the chat's `creator_id`, never from the stored
/// membership role. The other variants mirror [`MemberRole`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    Creator,
    Admin,
    Member,
    Reader,
}

impl ChatRole {
    /// Derive the role of `user_id` in `chat` from the chat's roster.
    ///
    /// Returns `None` for users without a membership row.
    pub fn of(chat: &Chat, user_id: UserId, roster: &[Membership]) -> Option<Self> {
        if chat.is_creator(user_id) {
            return Some(ChatRole::Creator);
        }

        roster
            .iter()
            .find(|m| m.user_id == user_id)
            .map(|m| ChatRole::from(m.role))
    }

    /// Whether this role carries management rights (creator or admin).
    pub fn is_manager(self) -> bool {
        matches!(self, ChatRole::Creator | ChatRole::Admin)
    }
}

impl From<MemberRole> for ChatRole {
    fn from(role: MemberRole) -> Self {
        match role {
            MemberRole::Admin => ChatRole::Admin,
            MemberRole::Member => ChatRole::Member,
            MemberRole::Reader => ChatRole::Reader,
        }
    }
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ChatRole::Creator => "creator",
            ChatRole::Admin => "admin",
            ChatRole::Member => "member",
            ChatRole::Reader => "reader",
        };
        f.write_str(name)
    }
}

/// Action classes checked by the access-control policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatAction {
    /// Promote or demote admins.
    ManageAdmins,
    /// Add or remove members, toggle reader status.
    ManageMembership,
    /// Rename, describe or re-picture the chat.
    UpdateChat,
    DeleteChat,
    ViewChat,
}

impl ChatAction {
    pub const ALL: [ChatAction; 5] = [
        ChatAction::ManageAdmins,
        ChatAction::ManageMembership,
        ChatAction::UpdateChat,
        ChatAction::DeleteChat,
        ChatAction::ViewChat,
    ];
}

impl std::fmt::Display for ChatAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ChatAction::ManageAdmins => "manage admins",
            ChatAction::ManageMembership => "manage membership",
            ChatAction::UpdateChat => "update chat",
            ChatAction::DeleteChat => "delete chat",
            ChatAction::ViewChat => "view chat",
        };
        f.write_str(name)
    }
}
