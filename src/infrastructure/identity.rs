// Identity seam - the external identity provider as seen by this service.
// Tokens are only validated here; issuing them belongs to the provider.

use async_trait::async_trait;
use rand::RngCore;
use sqlx::Row;

use crate::core::{ProfileId, Timestamp, UserId};
use crate::error::{AppError, AppResult};
use crate::infrastructure::database::{is_unique_violation, SocialDatabase};

/// An authenticated identity record and the profile attached to it, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user_id: UserId,
    pub email: String,
    pub profile_id: Option<ProfileId>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a token to its identity; `None` for unknown tokens.
    async fn authenticate(&self, token: &str) -> AppResult<Option<Identity>>;
}

pub struct SqliteIdentityProvider {
    db: SocialDatabase,
}

impl SqliteIdentityProvider {
    pub fn new(db: SocialDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl IdentityProvider for SqliteIdentityProvider {
    async fn authenticate(&self, token: &str) -> AppResult<Option<Identity>> {
        let row = sqlx::query(
            r#"
            SELECT u.id AS user_id, u.email AS email, p.id AS profile_id
            FROM auth_tokens t
            JOIN users u ON u.id = t.user_id
            LEFT JOIN profiles p ON p.user_id = u.id
            WHERE t.key = ?
            "#,
        )
        .bind(token)
        .fetch_optional(&self.db.pool)
        .await?;

        Ok(row.map(|row| Identity {
            user_id: row.get("user_id"),
            email: row.get("email"),
            profile_id: row.get("profile_id"),
        }))
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; 20];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Create an identity record with a fresh token. Development and test tooling only.
pub async fn register_identity(db: &SocialDatabase, email: &str) -> AppResult<(Identity, String)> {
    let now = Timestamp::now();
    let mut tx = db.pool.begin().await?;

    let user_id: UserId = sqlx::query(
        "INSERT INTO users (email, date_joined) VALUES (?, ?) RETURNING id",
    )
    .bind(email)
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::BadRequest(format!("An identity for {} already exists.", email))
        } else {
            AppError::from(e)
        }
    })?
    .get("id");

    let token = generate_token();
    sqlx::query("INSERT INTO auth_tokens (key, user_id, created) VALUES (?, ?, ?)")
        .bind(&token)
        .bind(user_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    tracing::info!("registered identity {} ({})", user_id, email);

    Ok((
        Identity {
            user_id,
            email: email.to_string(),
            profile_id: None,
        },
        token,
    ))
}
