// ProfileQueryService - filtered, follower-annotated profile listings

use sqlx::{FromRow, QueryBuilder, Sqlite};

use crate::{
    core::ProfileId,
    error::AppResult,
    infrastructure::database::SocialDatabase,
};

/// Exact-match filters for the profile collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileFilter {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// List row; `followers_count` is computed per query, never stored.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ProfileSummary {
    pub id: ProfileId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub followers_count: i64,
    pub image: Option<String>,
}

fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &ProfileFilter) {
    qb.push(" WHERE 1 = 1");
    if let Some(username) = &filter.username {
        qb.push(" AND p.username = ").push_bind(username.clone());
    }
    if let Some(first_name) = &filter.first_name {
        qb.push(" AND p.first_name = ").push_bind(first_name.clone());
    }
    if let Some(last_name) = &filter.last_name {
        qb.push(" AND p.last_name = ").push_bind(last_name.clone());
    }
}

#[derive(Clone)]
pub struct ProfileQueryService {
    db: SocialDatabase,
}

impl ProfileQueryService {
    pub fn new(db: SocialDatabase) -> Self {
        Self { db }
    }

    pub async fn count(&self, filter: &ProfileFilter) -> AppResult<i64> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM profiles p");
        push_filter(&mut qb, filter);
        let count = qb.build_query_scalar::<i64>().fetch_one(&self.db.pool).await?;
        Ok(count)
    }

    /// One page of profiles ordered by username.
    pub async fn list(
        &self,
        filter: &ProfileFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<ProfileSummary>> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT p.id, p.username, p.first_name, p.last_name, p.image,
                (SELECT COUNT(*) FROM profile_followings f
                    WHERE f.following_id = p.id) AS followers_count
            FROM profiles p
            "#,
        );
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY p.username LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let profiles = qb
            .build_query_as::<ProfileSummary>()
            .fetch_all(&self.db.pool)
            .await?;
        Ok(profiles)
    }
}
