// Post collection: CRUD, likes, comments, personal feeds and image upload

use axum::{
    extract::{multipart::MultipartRejection, Multipart, OriginalUri, Query, State},
    http::StatusCode,
    Json,
};

use super::extract::{read_image_field, ApiJson, IdPath, QueryParams};
use super::pagination::{Page, PageWindow};
use crate::{
    app_state::AppState,
    core::{HashtagId, PostId, ProfileId, Timestamp},
    entities::{EntHashtag, EntPost, EntProfile, Entity},
    error::{AppResult, FieldErrors},
    infrastructure::{
        media_storage::ImageOwner,
        middleware::Vc,
        privacy::{enforce, PostOwnerOrReadOnly, PrivacyOperation},
    },
    models::{
        image_url,
        post_models::{
            CommentPayload, PostDetail, PostListItem, PostPayload, PostRelations, PostView,
        },
        DetailMessage, ImageView,
    },
    services::{engagement_service::COMMENT_ADDED, PostFilter},
};

const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Parse the collection filters; unknown ids and malformed values are field errors.
async fn post_filter(state: &AppState, params: &QueryParams) -> AppResult<PostFilter> {
    let mut errors = FieldErrors::new();
    let mut filter = PostFilter { title: params.text("title"), ..Default::default() };

    if let Some(raw) = params.get("created_at") {
        match Timestamp::parse(raw) {
            Some(created_at) => filter.created_at = Some(created_at),
            None => errors.add("created_at", "Enter a valid date/time."),
        }
    }

    if let Some(raw) = params.get("author") {
        let author = raw.parse::<i64>().ok().map(ProfileId);
        let found = match author {
            Some(author) => EntProfile::exists(&state.db, author).await?,
            None => false,
        };
        if found {
            filter.author = author;
        } else {
            errors.add("author", INVALID_CHOICE);
        }
    }

    let mut hashtags = Vec::new();
    for raw in params.list("hashtags") {
        match raw.parse::<i64>() {
            Ok(id) => hashtags.push(HashtagId(id)),
            Err(_) => errors.add(
                "hashtags",
                format!("Select a valid choice. {} is not one of the available choices.", raw),
            ),
        }
    }
    for missing in EntHashtag::missing_ids(&state.db, &hashtags).await? {
        errors.add(
            "hashtags",
            format!("Select a valid choice. {} is not one of the available choices.", missing),
        );
    }
    filter.hashtags = hashtags;

    errors.into_result()?;
    Ok(filter)
}

pub async fn list(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<QueryParams>,
) -> AppResult<Json<Page<PostListItem>>> {
    let filter = post_filter(&state, &params).await?;

    let count = state.post_queries.count(&filter).await?;
    let page_size = state.config.pagination.post_page_size;
    let window = PageWindow::resolve(params.get("page"), count, page_size)?;
    let results = state
        .post_queries
        .list(&filter, Some((window.limit, window.offset)))
        .await?
        .into_iter()
        .map(|summary| PostListItem::new(summary, &state.media))
        .collect();

    Ok(Json(Page::new(&uri, window, count, results)))
}

async fn unpaginated(state: &AppState, filter: PostFilter) -> AppResult<Json<Vec<PostListItem>>> {
    let posts = state
        .post_queries
        .list(&filter, None)
        .await?
        .into_iter()
        .map(|summary| PostListItem::new(summary, &state.media))
        .collect();
    Ok(Json(posts))
}

/// Posts the requester liked.
pub async fn favorite(State(state): State<AppState>, vc: Vc) -> AppResult<Json<Vec<PostListItem>>> {
    let actor = vc.require_profile()?;
    unpaginated(&state, PostFilter::favorites_of(actor)).await
}

/// Posts by profiles the requester follows.
pub async fn subscriptions_only(
    State(state): State<AppState>,
    vc: Vc,
) -> AppResult<Json<Vec<PostListItem>>> {
    let actor = vc.require_profile()?;
    unpaginated(&state, PostFilter::subscriptions_of(actor)).await
}

pub async fn create(
    State(state): State<AppState>,
    vc: Vc,
    ApiJson(payload): ApiJson<PostPayload>,
) -> AppResult<(StatusCode, Json<PostView>)> {
    let author = vc.require_profile()?;
    let fields = payload.into_fields(None, false)?;
    let post = EntPost::create(&state.db, author, &fields).await?;
    let hashtags = post.hashtag_ids(&state.db).await?;
    Ok((StatusCode::CREATED, Json(PostView::new(&post, hashtags))))
}

pub async fn retrieve(
    State(state): State<AppState>,
    vc: Vc,
    IdPath(id): IdPath<PostId>,
) -> AppResult<Json<PostDetail>> {
    let post = EntPost::gen_enforce(&state.db, id).await?;
    enforce(&PostOwnerOrReadOnly, &vc, PrivacyOperation::Read, &post)?;
    let ids = [post.id];
    let (author, mut hashtags, likes, comments) = futures::try_join!(
        EntProfile::gen_enforce(&state.db, post.author_id),
        state.post_queries.hashtag_names(&ids),
        state.engagement.likers_of(post.id),
        state.post_queries.comments_of(post.id),
    )?;

    let relations = PostRelations {
        author: author.username,
        hashtags: hashtags.remove(&post.id).unwrap_or_default(),
        likes,
        comments,
    };
    Ok(Json(PostDetail::new(post, relations, &state.media)))
}

async fn apply_update(
    state: &AppState,
    vc: &Vc,
    id: PostId,
    payload: PostPayload,
    partial: bool,
) -> AppResult<PostView> {
    let mut post = EntPost::gen_enforce(&state.db, id).await?;
    enforce(&PostOwnerOrReadOnly, vc, PrivacyOperation::Update, &post)?;

    let current = post.fields(&state.db).await?;
    let fields = payload.into_fields(Some(&current), partial)?;
    post.update(&state.db, fields).await?;
    tracing::info!(request_id = %vc.request_id, "updated post {}", post.id);

    let hashtags = post.hashtag_ids(&state.db).await?;
    Ok(PostView::new(&post, hashtags))
}

pub async fn update(
    State(state): State<AppState>,
    vc: Vc,
    IdPath(id): IdPath<PostId>,
    ApiJson(payload): ApiJson<PostPayload>,
) -> AppResult<Json<PostView>> {
    apply_update(&state, &vc, id, payload, false).await.map(Json)
}

pub async fn partial_update(
    State(state): State<AppState>,
    vc: Vc,
    IdPath(id): IdPath<PostId>,
    ApiJson(payload): ApiJson<PostPayload>,
) -> AppResult<Json<PostView>> {
    apply_update(&state, &vc, id, payload, true).await.map(Json)
}

pub async fn destroy(
    State(state): State<AppState>,
    vc: Vc,
    IdPath(id): IdPath<PostId>,
) -> AppResult<StatusCode> {
    let post = EntPost::gen_enforce(&state.db, id).await?;
    enforce(&PostOwnerOrReadOnly, &vc, PrivacyOperation::Delete, &post)?;
    EntPost::delete(&state.db, post.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn like_unlike(
    State(state): State<AppState>,
    vc: Vc,
    IdPath(id): IdPath<PostId>,
) -> AppResult<Json<DetailMessage>> {
    let post = EntPost::gen_enforce(&state.db, id).await?;
    let actor = vc.require_profile()?;
    let outcome = state.engagement.like_unlike(actor, &post).await?;
    Ok(Json(DetailMessage::new(outcome.message())))
}

pub async fn add_comment(
    State(state): State<AppState>,
    vc: Vc,
    IdPath(id): IdPath<PostId>,
    ApiJson(payload): ApiJson<CommentPayload>,
) -> AppResult<Json<DetailMessage>> {
    let post = EntPost::gen_enforce(&state.db, id).await?;
    let actor = vc.require_profile()?;
    state.engagement.add_comment(actor, &post, payload.content).await?;
    Ok(Json(DetailMessage::new(COMMENT_ADDED)))
}

pub async fn upload_image(
    State(state): State<AppState>,
    vc: Vc,
    IdPath(id): IdPath<PostId>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<ImageView>> {
    let mut post = EntPost::gen_enforce(&state.db, id).await?;
    enforce(&PostOwnerOrReadOnly, &vc, PrivacyOperation::UploadImage, &post)?;

    let upload = match multipart {
        Ok(multipart) => read_image_field(multipart).await?,
        Err(_) => None,
    };
    let path = state.media.store(ImageOwner::Post, &post.title, upload.as_ref()).await?;
    let committed = post.set_image(&state.db, path.clone()).await;
    state.media.finish_replace(&path, committed).await?;

    Ok(Json(ImageView {
        id: post.id.value(),
        image: image_url(&state.media, post.image.as_deref()),
    }))
}
