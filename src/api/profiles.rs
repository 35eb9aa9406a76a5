// Profile collection: CRUD, follow/unfollow and image upload

use axum::{
    extract::{multipart::MultipartRejection, Multipart, OriginalUri, Query, State},
    http::StatusCode,
    Json,
};

use super::extract::{read_image_field, ApiJson, IdPath, QueryParams};
use super::pagination::{Page, PageWindow};
use crate::{
    app_state::AppState,
    core::ProfileId,
    entities::{EntProfile, Entity},
    error::AppResult,
    infrastructure::{
        media_storage::ImageOwner,
        middleware::Vc,
        privacy::{enforce, PrivacyOperation, ProfileOwnerOrReadOnly},
    },
    models::{
        image_url,
        profile_models::{ProfileDetail, ProfileListItem, ProfilePayload, ProfileView},
        DetailMessage, ImageView,
    },
    services::ProfileFilter,
};

pub async fn list(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<QueryParams>,
) -> AppResult<Json<Page<ProfileListItem>>> {
    let filter = ProfileFilter {
        username: params.text("username"),
        first_name: params.text("first_name"),
        last_name: params.text("last_name"),
    };

    let count = state.profile_queries.count(&filter).await?;
    let page_size = state.config.pagination.profile_page_size;
    let window = PageWindow::resolve(params.get("page"), count, page_size)?;
    let results = state
        .profile_queries
        .list(&filter, window.limit, window.offset)
        .await?
        .into_iter()
        .map(|summary| ProfileListItem::new(summary, &state.media))
        .collect();

    Ok(Json(Page::new(&uri, window, count, results)))
}

pub async fn create(
    State(state): State<AppState>,
    vc: Vc,
    ApiJson(payload): ApiJson<ProfilePayload>,
) -> AppResult<(StatusCode, Json<ProfileView>)> {
    let fields = payload.into_fields(None, false)?;
    let profile = EntProfile::create(&state.db, vc.user_id, &fields).await?;
    Ok((StatusCode::CREATED, Json(ProfileView::from(&profile))))
}

pub async fn retrieve(
    State(state): State<AppState>,
    vc: Vc,
    IdPath(id): IdPath<ProfileId>,
) -> AppResult<Json<ProfileDetail>> {
    let profile = EntProfile::gen_enforce(&state.db, id).await?;
    enforce(&ProfileOwnerOrReadOnly, &vc, PrivacyOperation::Read, &profile)?;
    let (followings, followers) = futures::try_join!(
        state.social_graph.followings_of(profile.id),
        state.social_graph.followers_of(profile.id),
    )?;
    Ok(Json(ProfileDetail::new(profile, followings, followers, &state.media)))
}

async fn apply_update(
    state: &AppState,
    vc: &Vc,
    id: ProfileId,
    payload: ProfilePayload,
    partial: bool,
) -> AppResult<ProfileView> {
    let mut profile = EntProfile::gen_enforce(&state.db, id).await?;
    enforce(&ProfileOwnerOrReadOnly, vc, PrivacyOperation::Update, &profile)?;

    let fields = payload.into_fields(Some(&profile.fields()), partial)?;
    profile.update(&state.db, fields).await?;
    tracing::info!(request_id = %vc.request_id, "updated profile {}", profile.id);
    Ok(ProfileView::from(&profile))
}

pub async fn update(
    State(state): State<AppState>,
    vc: Vc,
    IdPath(id): IdPath<ProfileId>,
    ApiJson(payload): ApiJson<ProfilePayload>,
) -> AppResult<Json<ProfileView>> {
    apply_update(&state, &vc, id, payload, false).await.map(Json)
}

pub async fn partial_update(
    State(state): State<AppState>,
    vc: Vc,
    IdPath(id): IdPath<ProfileId>,
    ApiJson(payload): ApiJson<ProfilePayload>,
) -> AppResult<Json<ProfileView>> {
    apply_update(&state, &vc, id, payload, true).await.map(Json)
}

pub async fn destroy(
    State(state): State<AppState>,
    vc: Vc,
    IdPath(id): IdPath<ProfileId>,
) -> AppResult<StatusCode> {
    let profile = EntProfile::gen_enforce(&state.db, id).await?;
    enforce(&ProfileOwnerOrReadOnly, &vc, PrivacyOperation::Delete, &profile)?;
    EntProfile::delete(&state.db, profile.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn follow(
    State(state): State<AppState>,
    vc: Vc,
    IdPath(id): IdPath<ProfileId>,
) -> AppResult<Json<DetailMessage>> {
    let target = EntProfile::gen_enforce(&state.db, id).await?;
    let actor = vc.require_profile()?;
    let message = state.social_graph.follow(actor, &target).await?;
    Ok(Json(DetailMessage::new(message)))
}

pub async fn unfollow(
    State(state): State<AppState>,
    vc: Vc,
    IdPath(id): IdPath<ProfileId>,
) -> AppResult<Json<DetailMessage>> {
    let target = EntProfile::gen_enforce(&state.db, id).await?;
    let actor = vc.require_profile()?;
    let message = state.social_graph.unfollow(actor, &target).await?;
    Ok(Json(DetailMessage::new(message)))
}

pub async fn upload_image(
    State(state): State<AppState>,
    vc: Vc,
    IdPath(id): IdPath<ProfileId>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<ImageView>> {
    let mut profile = EntProfile::gen_enforce(&state.db, id).await?;
    enforce(&ProfileOwnerOrReadOnly, &vc, PrivacyOperation::UploadImage, &profile)?;

    let upload = match multipart {
        Ok(multipart) => read_image_field(multipart).await?,
        Err(_) => None,
    };
    let path = state.media.store(ImageOwner::Profile, &profile.username, upload.as_ref()).await?;
    let committed = profile.set_image(&state.db, path.clone()).await;
    state.media.finish_replace(&path, committed).await?;

    Ok(Json(ImageView {
        id: profile.id.value(),
        image: image_url(&state.media, profile.image.as_deref()),
    }))
}
