// EntProfile - application-level user record, 1:1 with an identity

use sqlx::FromRow;

use super::Entity;
use crate::core::{ProfileId, UserId};
use crate::error::{AppError, AppResult, FieldErrors};
use crate::infrastructure::database::{is_unique_violation, SocialDatabase};

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct EntProfile {
    pub id: ProfileId,
    pub user_id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    /// Relative media path
    pub image: Option<String>,
}

/// Validated writable fields
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileFields {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
}

impl Entity for EntProfile {
    const ENTITY_TYPE: &'static str = "profile";
    const TABLE: &'static str = "profiles";
    type Id = ProfileId;
}

fn username_taken_error() -> AppError {
    AppError::Validation(FieldErrors::single(
        "username",
        "profile with this username already exists.",
    ))
}

impl EntProfile {
    pub async fn gen_for_user(db: &SocialDatabase, user_id: UserId) -> AppResult<Option<Self>> {
        let profile = sqlx::query_as::<_, Self>("SELECT * FROM profiles WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&db.pool)
            .await?;
        Ok(profile)
    }

    pub async fn username_taken(
        db: &SocialDatabase,
        username: &str,
        except: Option<ProfileId>,
    ) -> AppResult<bool> {
        let row = sqlx::query("SELECT 1 FROM profiles WHERE username = ? AND id IS NOT ?")
            .bind(username)
            .bind(except)
            .fetch_optional(&db.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Attach a new profile to `user_id`. An identity owns at most one profile.
    pub async fn create(
        db: &SocialDatabase,
        user_id: UserId,
        fields: &ProfileFields,
    ) -> AppResult<Self> {
        if Self::gen_for_user(db, user_id).await?.is_some() {
            return Err(AppError::BadRequest(
                "A profile already exists for this account.".to_string(),
            ));
        }
        if Self::username_taken(db, &fields.username, None).await? {
            return Err(username_taken_error());
        }

        let profile = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO profiles (user_id, username, first_name, last_name, bio)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&fields.username)
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.bio)
        .fetch_one(&db.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                username_taken_error()
            } else {
                AppError::from(e)
            }
        })?;

        tracing::info!(
            "created profile {} ({}) for user {}",
            profile.id,
            profile.username,
            user_id
        );
        Ok(profile)
    }

    pub async fn update(&mut self, db: &SocialDatabase, fields: ProfileFields) -> AppResult<()> {
        if Self::username_taken(db, &fields.username, Some(self.id)).await? {
            return Err(username_taken_error());
        }

        sqlx::query(
            "UPDATE profiles SET username = ?, first_name = ?, last_name = ?, bio = ? WHERE id = ?",
        )
        .bind(&fields.username)
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.bio)
        .bind(self.id)
        .execute(&db.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                username_taken_error()
            } else {
                AppError::from(e)
            }
        })?;

        self.username = fields.username;
        self.first_name = fields.first_name;
        self.last_name = fields.last_name;
        self.bio = fields.bio;
        Ok(())
    }

    /// Point the profile at a new image; returns the path it replaced.
    pub async fn set_image(
        &mut self,
        db: &SocialDatabase,
        image: String,
    ) -> AppResult<Option<String>> {
        sqlx::query("UPDATE profiles SET image = ? WHERE id = ?")
            .bind(&image)
            .bind(self.id)
            .execute(&db.pool)
            .await?;
        Ok(self.image.replace(image))
    }

    pub fn fields(&self) -> ProfileFields {
        ProfileFields {
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            bio: self.bio.clone(),
        }
    }
}
