// Hashtag collection: open to every authenticated viewer, no ownership

use axum::{
    extract::{OriginalUri, Query, State},
    http::StatusCode,
    Json,
};

use super::extract::{ApiJson, IdPath, QueryParams};
use super::pagination::{Page, PageWindow};
use crate::{
    app_state::AppState,
    core::HashtagId,
    entities::{EntHashtag, Entity},
    error::AppResult,
    infrastructure::middleware::Vc,
    models::hashtag_models::{HashtagPayload, HashtagView},
};

pub async fn list(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<QueryParams>,
) -> AppResult<Json<Page<HashtagView>>> {
    let name = params.get("name");
    let count = EntHashtag::count(&state.db, name).await?;
    let page_size = state.config.pagination.hashtag_page_size;
    let window = PageWindow::resolve(params.get("page"), count, page_size)?;
    let results = EntHashtag::list(&state.db, name, window.limit, window.offset)
        .await?
        .into_iter()
        .map(HashtagView::from)
        .collect();

    Ok(Json(Page::new(&uri, window, count, results)))
}

pub async fn create(
    State(state): State<AppState>,
    vc: Vc,
    ApiJson(payload): ApiJson<HashtagPayload>,
) -> AppResult<(StatusCode, Json<HashtagView>)> {
    let name = payload.into_name(None, false)?;
    let hashtag = EntHashtag::create(&state.db, &name).await?;
    tracing::debug!(
        request_id = %vc.request_id,
        "hashtag {} created by user {}",
        hashtag.id,
        vc.user_id
    );
    Ok((StatusCode::CREATED, Json(HashtagView::from(hashtag))))
}

pub async fn retrieve(
    State(state): State<AppState>,
    IdPath(id): IdPath<HashtagId>,
) -> AppResult<Json<HashtagView>> {
    let hashtag = EntHashtag::gen_enforce(&state.db, id).await?;
    Ok(Json(HashtagView::from(hashtag)))
}

async fn apply_update(
    state: &AppState,
    id: HashtagId,
    payload: HashtagPayload,
    partial: bool,
) -> AppResult<HashtagView> {
    let mut hashtag = EntHashtag::gen_enforce(&state.db, id).await?;
    let name = payload.into_name(Some(&hashtag.name), partial)?;
    hashtag.rename(&state.db, name).await?;
    Ok(HashtagView::from(hashtag))
}

pub async fn update(
    State(state): State<AppState>,
    IdPath(id): IdPath<HashtagId>,
    ApiJson(payload): ApiJson<HashtagPayload>,
) -> AppResult<Json<HashtagView>> {
    apply_update(&state, id, payload, false).await.map(Json)
}

pub async fn partial_update(
    State(state): State<AppState>,
    IdPath(id): IdPath<HashtagId>,
    ApiJson(payload): ApiJson<HashtagPayload>,
) -> AppResult<Json<HashtagView>> {
    apply_update(&state, id, payload, true).await.map(Json)
}

pub async fn destroy(
    State(state): State<AppState>,
    IdPath(id): IdPath<HashtagId>,
) -> AppResult<StatusCode> {
    let hashtag = EntHashtag::gen_enforce(&state.db, id).await?;
    EntHashtag::delete(&state.db, hashtag.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
