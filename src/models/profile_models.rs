use serde::{Deserialize, Serialize};

use super::image_url;
use super::validation::{check_text, TextRule};
use crate::core::ProfileId;
use crate::entities::{ent_profile::ProfileFields, EntProfile};
use crate::error::{AppResult, FieldErrors};
use crate::infrastructure::MediaStorage;
use crate::services::ProfileSummary;

pub const USERNAME: TextRule = TextRule::required(255);
pub const NAME: TextRule = TextRule::optional(255);
pub const BIO: TextRule = TextRule::optional(2000);

/// Body of create, update and partial update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePayload {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
}

impl ProfilePayload {
    /// Validate against `current` (None on create). Absent fields keep their
    /// current value; a full update still requires `username`.
    pub fn into_fields(
        self,
        current: Option<&ProfileFields>,
        partial: bool,
    ) -> AppResult<ProfileFields> {
        let mut errors = FieldErrors::new();
        let keep = |select: fn(&ProfileFields) -> &String| current.map(|c| select(c).clone());

        let username_fallback = if partial { keep(|c| &c.username) } else { None };
        let fields = ProfileFields {
            username: check_text(
                &mut errors,
                "username",
                self.username,
                username_fallback,
                USERNAME,
            ),
            first_name: check_text(
                &mut errors,
                "first_name",
                self.first_name,
                keep(|c| &c.first_name),
                NAME,
            ),
            last_name: check_text(
                &mut errors,
                "last_name",
                self.last_name,
                keep(|c| &c.last_name),
                NAME,
            ),
            bio: check_text(&mut errors, "bio", self.bio, keep(|c| &c.bio), BIO),
        };

        errors.into_result()?;
        Ok(fields)
    }
}

/// Create/update response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileView {
    pub id: ProfileId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
}

impl From<&EntProfile> for ProfileView {
    fn from(profile: &EntProfile) -> Self {
        Self {
            id: profile.id,
            username: profile.username.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            bio: profile.bio.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileListItem {
    pub id: ProfileId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub followers_count: i64,
    pub image: Option<String>,
}

impl ProfileListItem {
    pub fn new(summary: ProfileSummary, media: &MediaStorage) -> Self {
        Self {
            image: image_url(media, summary.image.as_deref()),
            id: summary.id,
            username: summary.username,
            first_name: summary.first_name,
            last_name: summary.last_name,
            followers_count: summary.followers_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileDetail {
    pub id: ProfileId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub followings: Vec<String>,
    pub followers: Vec<String>,
    pub image: Option<String>,
}

impl ProfileDetail {
    pub fn new(
        profile: EntProfile,
        followings: Vec<String>,
        followers: Vec<String>,
        media: &MediaStorage,
    ) -> Self {
        Self {
            image: image_url(media, profile.image.as_deref()),
            id: profile.id,
            username: profile.username,
            first_name: profile.first_name,
            last_name: profile.last_name,
            bio: profile.bio,
            followings,
            followers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::validation::REQUIRED;

    fn current() -> ProfileFields {
        ProfileFields {
            username: "alice".into(),
            first_name: "Alice".into(),
            last_name: "Liddell".into(),
            bio: "down the hole".into(),
        }
    }

    #[test]
    fn test_create_defaults_optional_fields() {
        let payload = ProfilePayload { username: Some("alice".into()), ..Default::default() };
        let fields = payload.into_fields(None, false).unwrap();
        assert_eq!(fields.username, "alice");
        assert_eq!(fields.first_name, "");
        assert_eq!(fields.bio, "");
    }

    #[test]
    fn test_full_update_requires_username() {
        let payload = ProfilePayload { bio: Some("new".into()), ..Default::default() };
        match payload.into_fields(Some(&current()), false).unwrap_err() {
            AppError::Validation(errors) => {
                assert_eq!(errors.get("username").unwrap(), &[REQUIRED.to_string()])
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_partial_update_keeps_absent_fields() {
        let payload = ProfilePayload { bio: Some("new".into()), ..Default::default() };
        let fields = payload.into_fields(Some(&current()), true).unwrap();
        assert_eq!(fields.username, "alice");
        assert_eq!(fields.last_name, "Liddell");
        assert_eq!(fields.bio, "new");
    }

    #[test]
    fn test_collects_every_field_error() {
        let payload = ProfilePayload {
            username: Some("".into()),
            first_name: Some("x".repeat(256)),
            ..Default::default()
        };
        match payload.into_fields(None, false).unwrap_err() {
            AppError::Validation(errors) => {
                assert!(errors.get("username").is_some());
                assert!(errors.get("first_name").is_some());
                assert!(errors.get("bio").is_none());
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
