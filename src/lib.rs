//! # Chat Rooms Library
//!
//! This crate provides the chat-room membership service:
//! - Chat lifecycle (create, read, update, delete)
//! - Roster management with member caps and cascade deletion
//! - Role-based access control (creator, admin, member, reader)
//! - Self-admission through join links
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Chats, memberships, roles and the store trait
//! - **Application Layer**: Chat services and DTOs
//! - **Infrastructure Layer**: PostgreSQL and in-memory stores, metrics
//! - **Presentation Layer**: HTTP handlers and middleware
//!
//! ## Module Structure
//!
//! ```text
//! chat_rooms/
//! +-- config/         Configuration management
//! +-- domain/         Domain entities, value objects, and policy
//! +-- application/    Application services and DTOs
//! +-- infrastructure/ Stores, database pool and metrics
//! +-- presentation/   HTTP routes and middleware
//! +-- shared/         Errors and validation
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
