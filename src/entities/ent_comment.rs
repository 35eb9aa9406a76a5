// EntComment - a profile's comment on a post, listed newest-first

use sqlx::FromRow;

use super::Entity;
use crate::core::{CommentId, PostId, ProfileId, Timestamp};
use crate::error::AppResult;
use crate::infrastructure::database::SocialDatabase;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct EntComment {
    pub id: CommentId,
    pub author_id: ProfileId,
    pub post_id: PostId,
    pub content: String,
    pub created_at: Timestamp,
}

impl Entity for EntComment {
    const ENTITY_TYPE: &'static str = "comment";
    const TABLE: &'static str = "comments";
    type Id = CommentId;
}

impl EntComment {
    /// Content is expected to be validated already.
    pub async fn create(
        db: &SocialDatabase,
        author_id: ProfileId,
        post_id: PostId,
        content: &str,
    ) -> AppResult<Self> {
        let comment = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO comments (author_id, post_id, content, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(author_id)
        .bind(post_id)
        .bind(content)
        .bind(Timestamp::now())
        .fetch_one(&db.pool)
        .await?;
        Ok(comment)
    }

    pub async fn count_for_post(db: &SocialDatabase, post_id: PostId) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE post_id = ?")
            .bind(post_id)
            .fetch_one(&db.pool)
            .await?;
        Ok(count)
    }
}
