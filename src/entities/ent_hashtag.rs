// EntHashtag - unique, name-ordered tag attached to posts

use sqlx::{FromRow, QueryBuilder, Sqlite};
use std::collections::HashSet;

use super::Entity;
use crate::core::HashtagId;
use crate::error::{AppError, AppResult, FieldErrors};
use crate::infrastructure::database::{is_unique_violation, SocialDatabase};

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct EntHashtag {
    pub id: HashtagId,
    pub name: String,
}

impl Entity for EntHashtag {
    const ENTITY_TYPE: &'static str = "hashtag";
    const TABLE: &'static str = "hashtags";
    type Id = HashtagId;
}

fn name_taken_error() -> AppError {
    AppError::Validation(FieldErrors::single("name", "hashtag with this name already exists."))
}

fn map_write_error(err: sqlx::Error) -> AppError {
    if is_unique_violation(&err) {
        name_taken_error()
    } else {
        AppError::from(err)
    }
}

impl EntHashtag {
    pub async fn create(db: &SocialDatabase, name: &str) -> AppResult<Self> {
        let sql = "INSERT INTO hashtags (name) VALUES (?) RETURNING *";
        let hashtag = sqlx::query_as::<_, Self>(sql)
            .bind(name)
            .fetch_one(&db.pool)
            .await
            .map_err(map_write_error)?;
        tracing::info!("created hashtag {} ({})", hashtag.id, hashtag.name);
        Ok(hashtag)
    }

    pub async fn rename(&mut self, db: &SocialDatabase, name: String) -> AppResult<()> {
        sqlx::query("UPDATE hashtags SET name = ? WHERE id = ?")
            .bind(&name)
            .bind(self.id)
            .execute(&db.pool)
            .await
            .map_err(map_write_error)?;
        self.name = name;
        Ok(())
    }

    pub async fn count(db: &SocialDatabase, name: Option<&str>) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM hashtags WHERE ? IS NULL OR name = ?",
        )
            .bind(name)
            .bind(name)
            .fetch_one(&db.pool)
            .await?;
        Ok(count)
    }

    /// One page of hashtags ordered by name, optionally matching `name` exactly.
    pub async fn list(
        db: &SocialDatabase,
        name: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Self>> {
        let hashtags = sqlx::query_as::<_, Self>(
            "SELECT * FROM hashtags WHERE ? IS NULL OR name = ? ORDER BY name LIMIT ? OFFSET ?",
        )
        .bind(name)
        .bind(name)
        .bind(limit)
        .bind(offset)
        .fetch_all(&db.pool)
        .await?;
        Ok(hashtags)
    }

    /// Ids from `ids` that don't exist, in request order.
    pub async fn missing_ids(db: &SocialDatabase, ids: &[HashtagId]) -> AppResult<Vec<HashtagId>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT id FROM hashtags WHERE id IN (");
        let mut separated = qb.separated(",");
        for id in ids {
            separated.push_bind(*id);
        }
        qb.push(")");

        let found: HashSet<HashtagId> = qb
            .build_query_scalar::<HashtagId>()
            .fetch_all(&db.pool)
            .await?
            .into_iter()
            .collect();

        Ok(ids.iter().copied().filter(|id| !found.contains(id)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_rename_and_uniqueness() {
        let db = SocialDatabase::new_in_memory().await.unwrap();
        let mut rust = EntHashtag::create(&db, "rust").await.unwrap();
        EntHashtag::create(&db, "sqlite").await.unwrap();

        let err = EntHashtag::create(&db, "rust").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = rust.rename(&db, "sqlite".into()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        rust.rename(&db, "rustlang".into()).await.unwrap();
        assert_eq!(EntHashtag::gen_enforce(&db, rust.id).await.unwrap().name, "rustlang");
    }

    #[tokio::test]
    async fn test_list_ordered_by_name() {
        let db = SocialDatabase::new_in_memory().await.unwrap();
        for name in ["zeta", "alpha", "mu"] {
            EntHashtag::create(&db, name).await.unwrap();
        }

        let names: Vec<String> = EntHashtag::list(&db, None, 2, 0)
            .await
            .unwrap()
            .into_iter()
            .map(|h| h.name)
            .collect();
        assert_eq!(names, vec!["alpha", "mu"]);
        assert_eq!(EntHashtag::count(&db, None).await.unwrap(), 3);
        assert_eq!(EntHashtag::count(&db, Some("mu")).await.unwrap(), 1);
        assert_eq!(EntHashtag::list(&db, Some("mu"), 10, 0).await.unwrap()[0].name, "mu");
    }

    #[tokio::test]
    async fn test_missing_ids() {
        let db = SocialDatabase::new_in_memory().await.unwrap();
        let tag = EntHashtag::create(&db, "rust").await.unwrap();

        let missing = EntHashtag::missing_ids(&db, &[tag.id, HashtagId(99)]).await.unwrap();
        assert_eq!(missing, vec![HashtagId(99)]);
        assert!(EntHashtag::missing_ids(&db, &[]).await.unwrap().is_empty());
    }
}
