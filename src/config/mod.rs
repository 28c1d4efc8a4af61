//! # Configuration Module
//!
//! This module handles application configuration loading and management.
//! Configuration can be loaded from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default.toml, config/{environment}.toml)
//! - .env files (via dotenvy)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chat_rooms::config::Settings;
//!
//! let settings = Settings::load()?;
//! println!("Chats hold at most {} members", settings.chat.max_members);
//! ```

mod settings;

pub use settings::*;
