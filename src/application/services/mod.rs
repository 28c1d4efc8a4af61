//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **ChatService**: Authorized entry point for every chat operation
//! - **ChatLifecycle**: Create, read, update and delete chats
//! - **MembershipManager**: Roster mutations and role toggles
//! - **JoinLinkResolver**: Self-admission through join links
//! - **AuthProvider**: Bearer token verification and refresh

pub mod auth_service;
pub mod chat_lifecycle;
pub mod chat_locks;
pub mod chat_service;
pub mod join_link_resolver;
pub mod membership_manager;

pub use auth_service::{AuthProvider, AuthSession, Claims, JwtAuthProvider};
pub use chat_lifecycle::{ChatLifecycle, CreateChatDto, UpdateChatDto};
pub use chat_locks::{ChatLockGuard, ChatLocks};
pub use chat_service::{ChatService, ChatServiceImpl, ChatView};
pub use join_link_resolver::{JoinLinkResolver, JoinOutcome};
pub use membership_manager::{MembershipManager, RemovalOutcome};

#[cfg(test)]
pub use auth_service::MockAuthProvider;
