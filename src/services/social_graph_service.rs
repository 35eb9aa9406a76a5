// SocialGraphService - the asymmetric follow graph between profiles
// Follow and unfollow are guarded check-then-mutate operations, not toggles.

use crate::{
    core::ProfileId,
    entities::EntProfile,
    error::{AppError, AppResult},
    infrastructure::database::SocialDatabase,
};

#[derive(Clone)]
pub struct SocialGraphService {
    db: SocialDatabase,
}

impl SocialGraphService {
    pub fn new(db: SocialDatabase) -> Self {
        Self { db }
    }

    pub async fn is_following(&self, follower: ProfileId, following: ProfileId) -> AppResult<bool> {
        let row = sqlx::query(
            "SELECT 1 FROM profile_followings WHERE follower_id = ? AND following_id = ?",
        )
        .bind(follower)
        .bind(following)
        .fetch_optional(&self.db.pool)
        .await?;
        Ok(row.is_some())
    }

    /// Add the edge `actor -> target`; returns the success message.
    pub async fn follow(&self, actor: ProfileId, target: &EntProfile) -> AppResult<String> {
        if actor == target.id || self.is_following(actor, target.id).await? {
            tracing::debug!("profile {} cannot follow {}", actor, target.id);
            return Err(AppError::BadRequest(format!(
                "You have already followed {}!",
                target.username
            )));
        }

        sqlx::query(
            "INSERT OR IGNORE INTO profile_followings (follower_id, following_id) VALUES (?, ?)",
        )
        .bind(actor)
        .bind(target.id)
        .execute(&self.db.pool)
        .await?;

        tracing::info!("profile {} followed {}", actor, target.id);
        Ok(format!("You have successfully followed {}.", target.username))
    }

    /// Remove the edge `actor -> target`; returns the success message.
    pub async fn unfollow(&self, actor: ProfileId, target: &EntProfile) -> AppResult<String> {
        if actor == target.id || !self.is_following(actor, target.id).await? {
            tracing::debug!("profile {} is not following {}", actor, target.id);
            return Err(AppError::BadRequest(format!(
                "You have not followed {} yet!",
                target.username
            )));
        }

        sqlx::query("DELETE FROM profile_followings WHERE follower_id = ? AND following_id = ?")
            .bind(actor)
            .bind(target.id)
            .execute(&self.db.pool)
            .await?;

        tracing::info!("profile {} unfollowed {}", actor, target.id);
        Ok(format!("You have successfully unfollowed {}.", target.username))
    }

    /// Usernames `profile` follows, alphabetical.
    pub async fn followings_of(&self, profile: ProfileId) -> AppResult<Vec<String>> {
        let usernames = sqlx::query_scalar::<_, String>(
            r#"
            SELECT p.username FROM profile_followings f
            JOIN profiles p ON p.id = f.following_id
            WHERE f.follower_id = ?
            ORDER BY p.username
            "#,
        )
        .bind(profile)
        .fetch_all(&self.db.pool)
        .await?;
        Ok(usernames)
    }

    /// Usernames following `profile`, alphabetical.
    pub async fn followers_of(&self, profile: ProfileId) -> AppResult<Vec<String>> {
        let usernames = sqlx::query_scalar::<_, String>(
            r#"
            SELECT p.username FROM profile_followings f
            JOIN profiles p ON p.id = f.follower_id
            WHERE f.following_id = ?
            ORDER BY p.username
            "#,
        )
        .bind(profile)
        .fetch_all(&self.db.pool)
        .await?;
        Ok(usernames)
    }
}
