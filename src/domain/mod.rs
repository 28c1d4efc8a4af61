//! # Domain Layer
//!
//! The domain layer contains the core rules of the chat-room service.
//! It is independent of any external frameworks or infrastructure concerns.
//!
//! ## Structure
//!
//! - **entities**: Chat, Membership, roster changesets and the store trait
//! - **value_objects**: Identifiers, derived chat roles and action classes
//! - **services**: The access-control policy
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Store traits define data access contracts
//! - Roles are derived at read time, never cached

pub mod entities;
pub mod services;
pub mod value_objects;

// Re-export commonly used types
pub use entities::*;
pub use value_objects::*;
