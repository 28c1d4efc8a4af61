//! # Value Objects
//!
//! Immutable types used across the domain: identifiers, derived roles and
//! action classes.

mod role;

pub use role::{ChatAction, ChatRole};

/// Chat identifier.
pub type ChatId = uuid::Uuid;

/// User identifier, as issued by the auth service.
pub type UserId = uuid::Uuid;
