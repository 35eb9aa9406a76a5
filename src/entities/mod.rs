// Entities - persisted rows and their direct persistence operations

pub mod ent_comment;
pub mod ent_hashtag;
pub mod ent_post;
pub mod ent_profile;

pub use ent_comment::EntComment;
pub use ent_hashtag::EntHashtag;
pub use ent_post::EntPost;
pub use ent_profile::EntProfile;

use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, FromRow};

use crate::error::{AppError, AppResult};
use crate::infrastructure::database::SocialDatabase;

/// Common load/delete operations shared by every table-backed entity.
#[async_trait]
pub trait Entity: for<'r> FromRow<'r, SqliteRow> + Send + Sync + Unpin + Sized {
    /// Entity type name used in logs
    const ENTITY_TYPE: &'static str;
    const TABLE: &'static str;

    type Id: Into<i64> + Copy + Send + Sync + std::fmt::Display + 'static;

    /// Load entity - returns None if not found
    async fn gen_nullable(db: &SocialDatabase, id: Self::Id) -> AppResult<Option<Self>> {
        let sql = format!("SELECT * FROM {} WHERE id = ?", Self::TABLE);
        let entity = sqlx::query_as::<_, Self>(&sql)
            .bind(id.into())
            .fetch_optional(&db.pool)
            .await?;
        Ok(entity)
    }

    /// Load entity with enforcement - 404 if not found
    async fn gen_enforce(db: &SocialDatabase, id: Self::Id) -> AppResult<Self> {
        Self::gen_nullable(db, id).await?.ok_or_else(|| {
            tracing::debug!("{} {} not found", Self::ENTITY_TYPE, id);
            AppError::not_found()
        })
    }

    async fn exists(db: &SocialDatabase, id: Self::Id) -> AppResult<bool> {
        let sql = format!("SELECT 1 FROM {} WHERE id = ?", Self::TABLE);
        let row = sqlx::query(&sql)
            .bind(id.into())
            .fetch_optional(&db.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Delete by id; dependent rows go with it through ON DELETE CASCADE.
    async fn delete(db: &SocialDatabase, id: Self::Id) -> AppResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?", Self::TABLE);
        let result = sqlx::query(&sql).bind(id.into()).execute(&db.pool).await?;
        if result.rows_affected() > 0 {
            tracing::info!("deleted {} {}", Self::ENTITY_TYPE, id);
        }
        Ok(result.rows_affected() > 0)
    }
}
