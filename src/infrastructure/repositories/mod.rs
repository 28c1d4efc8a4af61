//! Store Implementations
//!
//! Concrete implementations of the [`ChatStore`](crate::domain::ChatStore)
//! trait defined in the domain layer.
//!
//! ## Available Stores
//!
//! - **PgChatStore** - PostgreSQL, one transaction per changeset
//! - **InMemoryChatStore** - process memory, for local runs and tests
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sqlx::PgPool;
//! use crate::domain::ChatStore;
//! use crate::infrastructure::repositories::{InMemoryChatStore, PgChatStore};
//!
//! fn select_store(pool: Option<PgPool>) -> Arc<dyn ChatStore> {
//!     match pool {
//!         Some(pool) => Arc::new(PgChatStore::new(pool)),
//!         None => Arc::new(InMemoryChatStore::new()),
//!     }
//! }
//! ```

pub mod memory_chat_store;
pub mod pg_chat_store;

pub use memory_chat_store::InMemoryChatStore;
pub use pg_chat_store::PgChatStore;
