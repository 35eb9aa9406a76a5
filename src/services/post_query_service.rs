// PostQueryService - newest-first post listings annotated with like and comment counts

use sqlx::{FromRow, QueryBuilder, Sqlite};
use std::collections::HashMap;

use crate::{
    core::{CommentId, HashtagId, PostId, ProfileId, Timestamp},
    error::AppResult,
    infrastructure::database::SocialDatabase,
};

/// Filters for the post collection. `hashtags` matches posts carrying any of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostFilter {
    pub title: Option<String>,
    pub created_at: Option<Timestamp>,
    pub author: Option<ProfileId>,
    pub hashtags: Vec<HashtagId>,
    /// Posts liked by this profile
    pub liked_by: Option<ProfileId>,
    /// Posts authored by anyone this profile follows
    pub followed_by: Option<ProfileId>,
}

impl PostFilter {
    pub fn favorites_of(profile: ProfileId) -> Self {
        Self { liked_by: Some(profile), ..Default::default() }
    }

    pub fn subscriptions_of(profile: ProfileId) -> Self {
        Self { followed_by: Some(profile), ..Default::default() }
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
struct PostRow {
    id: PostId,
    author: String,
    title: String,
    content: String,
    created_at: Timestamp,
    likes_count: i64,
    comments_count: i64,
    image: Option<String>,
}

/// List row with its hashtag names resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct PostSummary {
    pub id: PostId,
    pub author: String,
    pub title: String,
    pub content: String,
    pub created_at: Timestamp,
    pub hashtags: Vec<String>,
    pub likes_count: i64,
    pub comments_count: i64,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CommentSummary {
    pub id: CommentId,
    pub author: String,
    pub content: String,
    pub created_at: Timestamp,
}

fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &PostFilter) {
    qb.push(" WHERE 1 = 1");
    if let Some(title) = &filter.title {
        qb.push(" AND p.title = ").push_bind(title.clone());
    }
    if let Some(created_at) = filter.created_at {
        qb.push(" AND p.created_at = ").push_bind(created_at);
    }
    if let Some(author) = filter.author {
        qb.push(" AND p.author_id = ").push_bind(author);
    }
    if !filter.hashtags.is_empty() {
        qb.push(" AND p.id IN (SELECT post_id FROM post_hashtags WHERE hashtag_id IN (");
        let mut separated = qb.separated(", ");
        for hashtag in &filter.hashtags {
            separated.push_bind(*hashtag);
        }
        qb.push("))");
    }
    if let Some(profile) = filter.liked_by {
        qb.push(" AND p.id IN (SELECT post_id FROM post_likes WHERE profile_id = ")
            .push_bind(profile)
            .push(")");
    }
    if let Some(profile) = filter.followed_by {
        qb.push(" AND p.author_id IN ")
            .push("(SELECT following_id FROM profile_followings WHERE follower_id = ")
            .push_bind(profile)
            .push(")");
    }
}

#[derive(Clone)]
pub struct PostQueryService {
    db: SocialDatabase,
}

impl PostQueryService {
    pub fn new(db: SocialDatabase) -> Self {
        Self { db }
    }

    pub async fn count(&self, filter: &PostFilter) -> AppResult<i64> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM posts p");
        push_filter(&mut qb, filter);
        let count = qb.build_query_scalar::<i64>().fetch_one(&self.db.pool).await?;
        Ok(count)
    }

    /// Matching posts, newest first. `window` is `(limit, offset)`; `None` returns every match.
    pub async fn list(
        &self,
        filter: &PostFilter,
        window: Option<(i64, i64)>,
    ) -> AppResult<Vec<PostSummary>> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT p.id, a.username AS author, p.title, p.content, p.created_at, p.image,
                (SELECT COUNT(*) FROM post_likes l WHERE l.post_id = p.id) AS likes_count,
                (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comments_count
            FROM posts p
            JOIN profiles a ON a.id = p.author_id
            "#,
        );
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY p.created_at DESC, p.id DESC");
        if let Some((limit, offset)) = window {
            qb.push(" LIMIT ").push_bind(limit).push(" OFFSET ").push_bind(offset);
        }

        let rows = qb.build_query_as::<PostRow>().fetch_all(&self.db.pool).await?;
        let ids: Vec<PostId> = rows.iter().map(|row| row.id).collect();
        let mut hashtags = self.hashtag_names(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| PostSummary {
                hashtags: hashtags.remove(&row.id).unwrap_or_default(),
                id: row.id,
                author: row.author,
                title: row.title,
                content: row.content,
                created_at: row.created_at,
                likes_count: row.likes_count,
                comments_count: row.comments_count,
                image: row.image,
            })
            .collect())
    }

    /// Hashtag names per post, each list ordered by name.
    pub async fn hashtag_names(&self, posts: &[PostId]) -> AppResult<HashMap<PostId, Vec<String>>> {
        let mut names: HashMap<PostId, Vec<String>> = HashMap::new();
        if posts.is_empty() {
            return Ok(names);
        }

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT ph.post_id, h.name FROM post_hashtags ph \
             JOIN hashtags h ON h.id = ph.hashtag_id WHERE ph.post_id IN (",
        );
        let mut separated = qb.separated(", ");
        for post in posts {
            separated.push_bind(*post);
        }
        qb.push(") ORDER BY h.name");

        let rows = qb
            .build_query_as::<(PostId, String)>()
            .fetch_all(&self.db.pool)
            .await?;
        for (post, name) in rows {
            names.entry(post).or_default().push(name);
        }
        Ok(names)
    }

    /// Comments on `post` with author usernames, newest first.
    pub async fn comments_of(&self, post: PostId) -> AppResult<Vec<CommentSummary>> {
        let comments = sqlx::query_as::<_, CommentSummary>(
            r#"
            SELECT c.id, a.username AS author, c.content, c.created_at
            FROM comments c
            JOIN profiles a ON a.id = c.author_id
            WHERE c.post_id = ?
            ORDER BY c.created_at DESC, c.id DESC
            "#,
        )
        .bind(post)
        .fetch_all(&self.db.pool)
        .await?;
        Ok(comments)
    }
}
