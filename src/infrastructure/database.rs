use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};

/// Relational store for identities, profiles, hashtags, posts, comments and the
/// three edge tables (follows, likes, post hashtags).
///
/// Edges are persisted rows queried per operation; nothing here caches the graph.
#[derive(Clone)]
pub struct SocialDatabase {
    pub pool: SqlitePool,
}

const SCHEMA: &[(&str, &str)] = &[
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            date_joined TEXT NOT NULL
        )
        "#,
    ),
    (
        "auth_tokens",
        r#"
        CREATE TABLE IF NOT EXISTS auth_tokens (
            key TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
            created TEXT NOT NULL
        )
        "#,
    ),
    (
        "profiles",
        r#"
        CREATE TABLE IF NOT EXISTS profiles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
            username TEXT NOT NULL UNIQUE,
            first_name TEXT NOT NULL DEFAULT '',
            last_name TEXT NOT NULL DEFAULT '',
            bio TEXT NOT NULL DEFAULT '',
            image TEXT
        )
        "#,
    ),
    (
        "profile_followings",
        r#"
        CREATE TABLE IF NOT EXISTS profile_followings (
            follower_id INTEGER NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            following_id INTEGER NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            PRIMARY KEY (follower_id, following_id),
            CHECK (follower_id <> following_id)
        )
        "#,
    ),
    (
        "hashtags",
        r#"
        CREATE TABLE IF NOT EXISTS hashtags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )
        "#,
    ),
    (
        "posts",
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            author_id INTEGER NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at TEXT NOT NULL,
            image TEXT
        )
        "#,
    ),
    (
        "post_hashtags",
        r#"
        CREATE TABLE IF NOT EXISTS post_hashtags (
            post_id INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            hashtag_id INTEGER NOT NULL REFERENCES hashtags(id) ON DELETE CASCADE,
            PRIMARY KEY (post_id, hashtag_id)
        )
        "#,
    ),
    (
        "post_likes",
        r#"
        CREATE TABLE IF NOT EXISTS post_likes (
            post_id INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            profile_id INTEGER NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            PRIMARY KEY (post_id, profile_id)
        )
        "#,
    ),
    (
        "comments",
        r#"
        CREATE TABLE IF NOT EXISTS comments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            author_id INTEGER NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            post_id INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            content TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    ),
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_followings_following ON profile_followings(following_id)",
    "CREATE INDEX IF NOT EXISTS idx_posts_created ON posts(created_at DESC, id DESC)",
    "CREATE INDEX IF NOT EXISTS idx_posts_author ON posts(author_id)",
    "CREATE INDEX IF NOT EXISTS idx_post_likes_profile ON post_likes(profile_id)",
    "CREATE INDEX IF NOT EXISTS idx_post_hashtags_hashtag ON post_hashtags(hashtag_id)",
    "CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id, created_at DESC)",
];

impl SocialDatabase {
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| {
                AppError::ConfigurationError(format!("Invalid DATABASE_URL {}: {}", config.url, e))
            })?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to connect to {}: {}", config.url, e))
            })?;

        let db = Self { pool };
        db.initialize().await?;
        Ok(db)
    }

    /// Single-connection in-memory database; every pooled connection to
    /// `sqlite::memory:` would otherwise see its own empty schema.
    pub async fn new_in_memory() -> AppResult<Self> {
        Self::connect(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        })
        .await
    }

    pub async fn initialize(&self) -> AppResult<()> {
        for (table, ddl) in SCHEMA {
            sqlx::query(ddl).execute(&self.pool).await.map_err(|e| {
                AppError::DatabaseError(format!("Failed to create {} table: {}", table, e))
            })?;
        }

        for ddl in INDEXES {
            sqlx::query(ddl)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to create index: {}", e)))?;
        }

        tracing::debug!("schema initialized ({} tables)", SCHEMA.len());
        Ok(())
    }
}

/// True when `err` is a UNIQUE constraint violation, used to turn races on
/// usernames and hashtag names into validation errors.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Row;

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let db = SocialDatabase::new_in_memory().await.unwrap();
        db.initialize().await.unwrap();

        let tables: Vec<String> = sqlx::query(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&db.pool)
        .await
        .unwrap()
        .into_iter()
        .map(|row| row.get::<String, _>("name"))
        .collect();

        assert_eq!(
            tables,
            vec![
                "auth_tokens",
                "comments",
                "hashtags",
                "post_hashtags",
                "post_likes",
                "posts",
                "profile_followings",
                "profiles",
                "users",
            ]
        );
    }

    #[tokio::test]
    async fn test_self_follow_rejected_by_storage() {
        let db = SocialDatabase::new_in_memory().await.unwrap();
        sqlx::query("INSERT INTO users (email, date_joined) VALUES ('a@example.com', '')")
            .execute(&db.pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO profiles (user_id, username) VALUES (1, 'alice')")
            .execute(&db.pool)
            .await
            .unwrap();

        let result =
            sqlx::query("INSERT INTO profile_followings (follower_id, following_id) VALUES (1, 1)")
                .execute(&db.pool)
                .await;
        assert!(result.is_err());
    }
}
