// EngagementService - likes and comments on posts

use crate::{
    core::{PostId, ProfileId},
    entities::{EntComment, EntPost},
    error::AppResult,
    infrastructure::database::SocialDatabase,
    models::validation::{validate_text, TextRule},
};

pub const COMMENT_ADDED: &str = "Your comment has been successfully added to the post.";

/// Result of a like toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    Liked,
    Unliked,
}

impl LikeOutcome {
    pub fn message(self) -> &'static str {
        match self {
            LikeOutcome::Liked => "You have successfully liked the post.",
            LikeOutcome::Unliked => "Your like was successfully removed.",
        }
    }
}

pub const COMMENT_CONTENT: TextRule = TextRule::required(2000);

#[derive(Clone)]
pub struct EngagementService {
    db: SocialDatabase,
}

impl EngagementService {
    pub fn new(db: SocialDatabase) -> Self {
        Self { db }
    }

    pub async fn has_liked(&self, actor: ProfileId, post: PostId) -> AppResult<bool> {
        let row = sqlx::query("SELECT 1 FROM post_likes WHERE post_id = ? AND profile_id = ?")
            .bind(post)
            .bind(actor)
            .fetch_optional(&self.db.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Flip `actor`'s like on `post`.
    pub async fn like_unlike(&self, actor: ProfileId, post: &EntPost) -> AppResult<LikeOutcome> {
        let outcome = if self.has_liked(actor, post.id).await? {
            sqlx::query("DELETE FROM post_likes WHERE post_id = ? AND profile_id = ?")
                .bind(post.id)
                .bind(actor)
                .execute(&self.db.pool)
                .await?;
            LikeOutcome::Unliked
        } else {
            sqlx::query("INSERT OR IGNORE INTO post_likes (post_id, profile_id) VALUES (?, ?)")
                .bind(post.id)
                .bind(actor)
                .execute(&self.db.pool)
                .await?;
            LikeOutcome::Liked
        };

        tracing::info!("profile {} {:?} post {}", actor, outcome, post.id);
        Ok(outcome)
    }

    /// Validate `content` and attach a new comment by `actor` to `post`.
    pub async fn add_comment(
        &self,
        actor: ProfileId,
        post: &EntPost,
        content: Option<String>,
    ) -> AppResult<EntComment> {
        let content = validate_text("content", content, COMMENT_CONTENT)?;
        let comment = EntComment::create(&self.db, actor, post.id, &content).await?;
        tracing::info!("profile {} commented on post {} ({})", actor, post.id, comment.id);
        Ok(comment)
    }

    /// Usernames of profiles that liked `post`, alphabetical.
    pub async fn likers_of(&self, post: PostId) -> AppResult<Vec<String>> {
        let usernames = sqlx::query_scalar::<_, String>(
            r#"
            SELECT p.username FROM post_likes l
            JOIN profiles p ON p.id = l.profile_id
            WHERE l.post_id = ?
            ORDER BY p.username
            "#,
        )
        .bind(post)
        .fetch_all(&self.db.pool)
        .await?;
        Ok(usernames)
    }
}
