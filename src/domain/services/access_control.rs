//! Access-control domain service.

use crate::domain::value_objects::{ChatAction, ChatRole};
use crate::shared::error::AppError;

/// Stateless policy mapping (actor role, action) to allow/deny.
///
/// Callers evaluate the policy before invoking a mutator; the lifecycle and
/// membership components do not re-check it.
pub struct AccessControlPolicy;

impl AccessControlPolicy {
    /// Whether `role` may perform `action`. `None` means "not a participant".
    pub fn is_allowed(role: Option<ChatRole>, action: ChatAction) -> bool {
        let Some(role) = role else {
            return false;
        };

        match action {
            ChatAction::ManageAdmins | ChatAction::DeleteChat => role == ChatRole::Creator,
            ChatAction::ManageMembership | ChatAction::UpdateChat => role.is_manager(),
            ChatAction::ViewChat => true,
        }
    }

    /// Like [`is_allowed`](Self::is_allowed), but returns `Forbidden` on denial.
    pub fn authorize(role: Option<ChatRole>, action: ChatAction) -> Result<(), AppError> {
        if Self::is_allowed(role, action) {
            return Ok(());
        }

        let actor = role
            .map(|r| r.to_string())
            .unwrap_or_else(|| "non-participant".into());
        Err(AppError::Forbidden(format!(
            "{} may not {}",
            actor, action
        )))
    }
}
