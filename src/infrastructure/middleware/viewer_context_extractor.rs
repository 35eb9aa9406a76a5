// ViewerContext Extractor - handler-side access to the authenticated viewer

use crate::error::AppError;
use crate::infrastructure::viewer::viewer::ViewerContext;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;

/// Cheap-to-clone handle on the request's [`ViewerContext`].
///
/// ```ignore
/// async fn handler(vc: Vc, Path(id): Path<PostId>) -> AppResult<Json<Detail>> {
///     let actor = vc.require_profile()?;
///     ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Vc(Arc<ViewerContext>);

impl std::ops::Deref for Vc {
    type Target = ViewerContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// Routes without the middleware layer have no viewer; that is a wiring bug, not a client error.
impl<S> FromRequestParts<S> for Vc
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Arc<ViewerContext>>()
            .map(|vc| Vc(vc.clone()))
            .ok_or_else(|| AppError::Internal("viewer context missing from request".to_string()))
    }
}
