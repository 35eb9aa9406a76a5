use serde::{Deserialize, Serialize};

use super::image_url;
use super::validation::{check_text, TextRule};
use crate::core::{CommentId, HashtagId, PostId, Timestamp};
use crate::entities::{ent_post::PostFields, EntPost};
use crate::error::{AppResult, FieldErrors};
use crate::infrastructure::MediaStorage;
use crate::services::{CommentSummary, PostSummary};

pub const TITLE: TextRule = TextRule::required(255);
pub const CONTENT: TextRule = TextRule::required(25000);

/// Body of create, update and partial update. `hashtags` are hashtag ids.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostPayload {
    pub title: Option<String>,
    pub content: Option<String>,
    pub hashtags: Option<Vec<HashtagId>>,
}

impl PostPayload {
    /// Validate against `current` (None on create). Absent fields keep their
    /// current value; a full update still requires `title` and `content`.
    /// Hashtag existence is checked when the post is written.
    pub fn into_fields(self, current: Option<&PostFields>, partial: bool) -> AppResult<PostFields> {
        let mut errors = FieldErrors::new();
        let required = |value: Option<&String>| if partial { value.cloned() } else { None };

        let title = check_text(
            &mut errors,
            "title",
            self.title,
            required(current.map(|c| &c.title)),
            TITLE,
        );
        let content = check_text(
            &mut errors,
            "content",
            self.content,
            required(current.map(|c| &c.content)),
            CONTENT,
        );
        let mut hashtags = self
            .hashtags
            .or_else(|| current.map(|c| c.hashtags.clone()))
            .unwrap_or_default();
        hashtags.sort();
        hashtags.dedup();

        errors.into_result()?;
        Ok(PostFields { title, content, hashtags })
    }
}

/// Body of add-comment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentPayload {
    pub content: Option<String>,
}

/// Create/update response; hashtags as ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostView {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub created_at: Timestamp,
    pub hashtags: Vec<HashtagId>,
}

impl PostView {
    pub fn new(post: &EntPost, hashtags: Vec<HashtagId>) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            content: post.content.clone(),
            created_at: post.created_at,
            hashtags,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostListItem {
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

impl PostListItem {
    pub fn new(summary: PostSummary, media: &MediaStorage) -> Self {
        Self {
            image: image_url(media, summary.image.as_deref()),
            id: summary.id,
            author: summary.author,
            title: summary.title,
            content: summary.content,
            created_at: summary.created_at,
            hashtags: summary.hashtags,
            likes_count: summary.likes_count,
            comments_count: summary.comments_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentView {
    pub id: CommentId,
    pub author: String,
    pub content: String,
    pub created_at: Timestamp,
}

impl From<CommentSummary> for CommentView {
    fn from(comment: CommentSummary) -> Self {
        Self {
            id: comment.id,
            author: comment.author,
            content: comment.content,
            created_at: comment.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostDetail {
    pub id: PostId,
    pub author: String,
    pub title: String,
    pub content: String,
    pub created_at: Timestamp,
    pub hashtags: Vec<String>,
    pub likes: Vec<String>,
    pub comments: Vec<CommentView>,
    pub image: Option<String>,
}

/// Everything the detail view shows besides the post row itself.
#[derive(Debug, Clone, Default)]
pub struct PostRelations {
    pub author: String,
    pub hashtags: Vec<String>,
    pub likes: Vec<String>,
    pub comments: Vec<CommentSummary>,
}

impl PostDetail {
    pub fn new(post: EntPost, relations: PostRelations, media: &MediaStorage) -> Self {
        Self {
            image: image_url(media, post.image.as_deref()),
            id: post.id,
            author: relations.author,
            title: post.title,
            content: post.content,
            created_at: post.created_at,
            hashtags: relations.hashtags,
            likes: relations.likes,
            comments: relations.comments.into_iter().map(CommentView::from).collect(),
        }
    }
}
