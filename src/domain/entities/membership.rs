//! Chat membership entity and role-partitioned roster view.
//!
//! Maps to the `chat_memberships` table in the database schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{ChatId, UserId};

/// Role stored on a membership row.
///
/// A single field rather than independent admin/reader flags, so a member can
/// never be admin and read-only at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Admin,
    Member,
    Reader,
}

impl MemberRole {
    /// Default role for a user entering a chat.
    ///
    /// Channel participants start read-only, direct-chat participants start
    /// as full members.
    pub fn default_for(is_channel: bool) -> Self {
        if is_channel {
            MemberRole::Reader
        } else {
            MemberRole::Member
        }
    }

    /// Database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Admin => "admin",
            MemberRole::Member => "member",
            MemberRole::Reader => "reader",
        }
    }
}

impl std::str::FromStr for MemberRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(MemberRole::Admin),
            "member" => Ok(MemberRole::Member),
            "reader" => Ok(MemberRole::Reader),
            other => Err(format!("unknown member role: {}", other)),
        }
    }
}

/// A user's membership in a chat.
///
/// Maps to the `chat_memberships` table:
/// - chat_id: UUID NOT NULL REFERENCES chats(id) ON DELETE CASCADE (composite PK)
/// - user_id: UUID NOT NULL (composite PK)
/// - role: VARCHAR(16) NOT NULL ('admin' | 'member' | 'reader')
/// - joined_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(chat_id: ChatId, user_id: UserId, role: MemberRole) -> Self {
        Self {
            chat_id,
            user_id,
            role,
            joined_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == MemberRole::Admin
    }

    /// Read-only members may not post.
    pub fn is_reader(&self) -> bool {
        self.role == MemberRole::Reader
    }

    /// Copy of this membership with a different role.
    pub fn with_role(&self, role: MemberRole) -> Self {
        Self {
            role,
            ..self.clone()
        }
    }
}

/// Role-partitioned identifier lists derived from one scan of a roster.
///
/// Every participant is listed in `members`; admins and readers are also
/// listed in their own partition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Roster {
    pub members: Vec<UserId>,
    pub admins: Vec<UserId>,
    pub readers: Vec<UserId>,
}

impl Roster {
    pub fn from_memberships(memberships: &[Membership]) -> Self {
        let mut roster = Roster {
            members: Vec::with_capacity(memberships.len()),
            ..Default::default()
        };

        for membership in memberships {
            roster.members.push(membership.user_id);
            if membership.is_admin() {
                roster.admins.push(membership.user_id);
            } else if membership.is_reader() {
                roster.readers.push(membership.user_id);
            }
        }

        roster
    }
}
