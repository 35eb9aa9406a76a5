// EntPost - authored post with hashtags; created_at is written once on insert

use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection};

use super::{EntHashtag, Entity};
use crate::core::{HashtagId, PostId, ProfileId, Timestamp};
use crate::error::{AppResult, FieldErrors};
use crate::infrastructure::database::SocialDatabase;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct EntPost {
    pub id: PostId,
    pub author_id: ProfileId,
    pub title: String,
    pub content: String,
    pub created_at: Timestamp,
    /// Relative media path
    pub image: Option<String>,
}

/// Validated writable fields
#[derive(Debug, Clone, PartialEq)]
pub struct PostFields {
    pub title: String,
    pub content: String,
    pub hashtags: Vec<HashtagId>,
}

impl Entity for EntPost {
    const ENTITY_TYPE: &'static str = "post";
    const TABLE: &'static str = "posts";
    type Id = PostId;
}

async fn replace_hashtags(
    conn: &mut SqliteConnection,
    post_id: PostId,
    hashtags: &[HashtagId],
) -> AppResult<()> {
    sqlx::query("DELETE FROM post_hashtags WHERE post_id = ?")
        .bind(post_id)
        .execute(&mut *conn)
        .await?;

    if hashtags.is_empty() {
        return Ok(());
    }

    let mut qb =
        QueryBuilder::<Sqlite>::new("INSERT OR IGNORE INTO post_hashtags (post_id, hashtag_id) ");
    qb.push_values(hashtags, |mut row, hashtag_id| {
        row.push_bind(post_id).push_bind(*hashtag_id);
    });
    qb.build().execute(&mut *conn).await?;
    Ok(())
}

async fn ensure_hashtags_exist(db: &SocialDatabase, hashtags: &[HashtagId]) -> AppResult<()> {
    let missing = EntHashtag::missing_ids(db, hashtags).await?;
    let mut errors = FieldErrors::new();
    for id in missing {
        errors.add("hashtags", format!("Invalid pk \"{}\" - object does not exist.", id));
    }
    errors.into_result()
}

impl EntPost {
    pub async fn create(
        db: &SocialDatabase,
        author_id: ProfileId,
        fields: &PostFields,
    ) -> AppResult<Self> {
        ensure_hashtags_exist(db, &fields.hashtags).await?;

        let mut tx = db.pool.begin().await?;
        let post = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO posts (author_id, title, content, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(author_id)
        .bind(&fields.title)
        .bind(&fields.content)
        .bind(Timestamp::now())
        .fetch_one(&mut *tx)
        .await?;

        replace_hashtags(&mut *tx, post.id, &fields.hashtags).await?;
        tx.commit().await?;

        tracing::info!("profile {} created post {}", author_id, post.id);
        Ok(post)
    }

    /// Rewrite title, content and hashtags. `created_at` and `author_id` never change.
    pub async fn update(&mut self, db: &SocialDatabase, fields: PostFields) -> AppResult<()> {
        ensure_hashtags_exist(db, &fields.hashtags).await?;

        let mut tx = db.pool.begin().await?;
        sqlx::query("UPDATE posts SET title = ?, content = ? WHERE id = ?")
            .bind(&fields.title)
            .bind(&fields.content)
            .bind(self.id)
            .execute(&mut *tx)
            .await?;
        replace_hashtags(&mut *tx, self.id, &fields.hashtags).await?;
        tx.commit().await?;

        self.title = fields.title;
        self.content = fields.content;
        Ok(())
    }

    pub async fn hashtag_ids(&self, db: &SocialDatabase) -> AppResult<Vec<HashtagId>> {
        let ids = sqlx::query_scalar::<_, HashtagId>(
            r#"
            SELECT h.id FROM post_hashtags ph
            JOIN hashtags h ON h.id = ph.hashtag_id
            WHERE ph.post_id = ?
            ORDER BY h.name
            "#,
        )
        .bind(self.id)
        .fetch_all(&db.pool)
        .await?;
        Ok(ids)
    }

    pub async fn fields(&self, db: &SocialDatabase) -> AppResult<PostFields> {
        Ok(PostFields {
            title: self.title.clone(),
            content: self.content.clone(),
            hashtags: self.hashtag_ids(db).await?,
        })
    }

    /// Point the post at a new image; returns the path it replaced.
    pub async fn set_image(
        &mut self,
        db: &SocialDatabase,
        image: String,
    ) -> AppResult<Option<String>> {
        sqlx::query("UPDATE posts SET image = ? WHERE id = ?")
            .bind(&image)
            .bind(self.id)
            .execute(&db.pool)
            .await?;
        Ok(self.image.replace(image))
    }
}
