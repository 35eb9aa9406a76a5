// HTTP surface: the authenticated API router and the application around it

pub mod extract;
pub mod hashtags;
pub mod pagination;
pub mod posts;
pub mod profiles;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::app_state::AppState;
use crate::infrastructure::middleware::viewer_context_middleware;

/// Room for multipart boundaries and headers on top of the image itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub const API_PREFIX: &str = "/api/social_media";

/// Every route here requires an authenticated viewer.
pub fn create_api_router(state: AppState) -> Router {
    let body_limit = state.config.media.max_upload_bytes + MULTIPART_OVERHEAD;

    Router::new()
        // Profiles
        .route("/profiles", get(profiles::list).post(profiles::create))
        .route(
            "/profiles/{id}",
            get(profiles::retrieve)
                .put(profiles::update)
                .patch(profiles::partial_update)
                .delete(profiles::destroy),
        )
        .route("/profiles/{id}/follow", post(profiles::follow))
        .route("/profiles/{id}/unfollow", post(profiles::unfollow))
        .route("/profiles/{id}/upload-image", post(profiles::upload_image))
        // Hashtags
        .route("/hashtags", get(hashtags::list).post(hashtags::create))
        .route(
            "/hashtags/{id}",
            get(hashtags::retrieve)
                .put(hashtags::update)
                .patch(hashtags::partial_update)
                .delete(hashtags::destroy),
        )
        // Posts
        .route("/posts", get(posts::list).post(posts::create))
        .route("/posts/favorite", get(posts::favorite))
        .route("/posts/subscriptions-only", get(posts::subscriptions_only))
        .route(
            "/posts/{id}",
            get(posts::retrieve)
                .put(posts::update)
                .patch(posts::partial_update)
                .delete(posts::destroy),
        )
        .route("/posts/{id}/like-unlike", post(posts::like_unlike))
        .route("/posts/{id}/add-comment", post(posts::add_comment))
        .route("/posts/{id}/upload-image", post(posts::upload_image))
        .layer(DefaultBodyLimit::max(body_limit))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            viewer_context_middleware::<AppState>,
        ))
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "social_media_api",
    }))
}

/// API under its prefix, uploaded media under the media URL, plus `/health`.
pub fn build_app(state: AppState) -> Router {
    let media = ServeDir::new(state.media.root());
    let media_mount = state.config.media.url.trim_end_matches('/').to_string();

    let app = Router::new()
        .route("/health", get(health_check))
        .nest(API_PREFIX, create_api_router(state));

    let app = if media_mount.is_empty() {
        app.fallback_service(media)
    } else {
        app.nest_service(&media_mount, media)
    };

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
