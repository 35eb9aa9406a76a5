use crate::core::{ProfileId, UserId};
use crate::error::{AppError, AppResult};
use crate::infrastructure::identity::Identity;

/// Request-scoped view of who is calling.
///
/// Built once by the viewer context middleware; handlers pass the acting
/// profile on to services explicitly instead of reading it from ambient state.
#[derive(Debug, Clone)]
pub struct ViewerContext {
    pub user_id: UserId,
    pub email: String,
    pub profile_id: Option<ProfileId>,
    pub request_id: String,
}

impl ViewerContext {
    pub fn authenticated(identity: Identity, request_id: String) -> Self {
        Self {
            user_id: identity.user_id,
            email: identity.email,
            profile_id: identity.profile_id,
            request_id,
        }
    }

    /// The viewer's own profile, required by follow, like, comment and post creation.
    pub fn require_profile(&self) -> AppResult<ProfileId> {
        self.profile_id
            .ok_or_else(|| AppError::BadRequest("You need to create a profile first.".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(profile_id: Option<i64>) -> Identity {
        Identity {
            user_id: UserId(1),
            email: "viewer@example.com".to_string(),
            profile_id: profile_id.map(ProfileId),
        }
    }

    #[test]
    fn test_require_profile() {
        let vc = ViewerContext::authenticated(identity(Some(4)), "req-1".into());
        assert_eq!(vc.require_profile().unwrap(), ProfileId(4));

        let vc = ViewerContext::authenticated(identity(None), "req-2".into());
        assert!(matches!(vc.require_profile(), Err(AppError::BadRequest(_))));
    }
}
