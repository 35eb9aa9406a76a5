// Privacy rules - object-level access control evaluated before any mutation
// Authentication itself is handled by the viewer context middleware.

use crate::entities::{EntPost, EntProfile};
use crate::error::{AppError, AppResult};
use crate::infrastructure::viewer::viewer::ViewerContext;

/// Operations that can be controlled by privacy rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivacyOperation {
    Read,
    Update,
    Delete,
    UploadImage,
}

impl PrivacyOperation {
    /// Read-only operations are open to every authenticated viewer.
    pub fn is_safe(self) -> bool {
        matches!(self, PrivacyOperation::Read)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivacyResult {
    Allow,
    Deny,
}

pub trait PrivacyRule<T>: Send + Sync {
    fn evaluate(&self, vc: &ViewerContext, operation: PrivacyOperation, subject: &T)
        -> PrivacyResult;

    fn name(&self) -> &'static str;
}

/// A profile may only be changed by the identity it belongs to.
pub struct ProfileOwnerOrReadOnly;

impl PrivacyRule<EntProfile> for ProfileOwnerOrReadOnly {
    fn evaluate(
        &self,
        vc: &ViewerContext,
        operation: PrivacyOperation,
        profile: &EntProfile,
    ) -> PrivacyResult {
        if operation.is_safe() || profile.user_id == vc.user_id {
            PrivacyResult::Allow
        } else {
            PrivacyResult::Deny
        }
    }

    fn name(&self) -> &'static str {
        "profile_owner_or_read_only"
    }
}

/// A post may only be changed by the identity behind its author profile.
pub struct PostOwnerOrReadOnly;

impl PrivacyRule<EntPost> for PostOwnerOrReadOnly {
    fn evaluate(
        &self,
        vc: &ViewerContext,
        operation: PrivacyOperation,
        post: &EntPost,
    ) -> PrivacyResult {
        if operation.is_safe() || vc.profile_id == Some(post.author_id) {
            PrivacyResult::Allow
        } else {
            PrivacyResult::Deny
        }
    }

    fn name(&self) -> &'static str {
        "post_owner_or_read_only"
    }
}

/// Evaluate `rule` and turn a denial into a 403.
pub fn enforce<T, R>(
    rule: &R,
    vc: &ViewerContext,
    operation: PrivacyOperation,
    subject: &T,
) -> AppResult<()>
where
    R: PrivacyRule<T>,
{
    match rule.evaluate(vc, operation, subject) {
        PrivacyResult::Allow => Ok(()),
        PrivacyResult::Deny => {
            tracing::info!(
                request_id = %vc.request_id,
                "{} denied {:?} for user {}",
                rule.name(),
                operation,
                vc.user_id
            );
            Err(AppError::forbidden())
        }
    }
}
