//! # Domain Entities
//!
//! Core domain entities of the chat-room service.
//!
//! - **Chat**: a room, either a bounded direct chat or an unbounded channel
//! - **Membership**: a user's participation in a chat and its stored role
//! - **RosterChangeset**: an atomic batch of chat and membership writes
//!
//! ## Store Trait
//!
//! [`ChatStore`] is the data access contract for both entities. It is
//! implemented in the infrastructure layer, following the dependency
//! inversion principle.

mod changeset;
mod chat;
mod membership;

pub use changeset::{RosterChange, RosterChangeset};
pub use chat::{Chat, ChatStore, DEFAULT_JOIN_LINK_LENGTH};
pub use membership::{MemberRole, Membership, Roster};

#[cfg(test)]
pub use chat::MockChatStore;
