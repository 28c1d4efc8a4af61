//! # Domain Services
//!
//! Domain services encapsulate business rules that don't naturally belong to
//! a single entity.
//!
//! ## Services
//!
//! - **AccessControlPolicy**: which chat role may perform which action

mod access_control;

pub use access_control::*;
