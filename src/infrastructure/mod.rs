//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - Database connection pool and migrations (PostgreSQL)
//! - Chat store implementations
//! - Prometheus metrics

pub mod database;
pub mod metrics;
pub mod repositories;
