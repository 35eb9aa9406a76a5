// Wire models - request payloads and the per-action response shapes

pub mod hashtag_models;
pub mod post_models;
pub mod profile_models;
pub mod validation;

use serde::{Deserialize, Serialize};

use crate::infrastructure::MediaStorage;

/// Human-readable outcome of a domain action, `{"detail": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailMessage {
    pub detail: String,
}

impl DetailMessage {
    pub fn new(detail: impl Into<String>) -> Self {
        Self { detail: detail.into() }
    }
}

/// Response of the upload-image actions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageView {
    pub id: i64,
    pub image: Option<String>,
}

/// Public URL for an optional stored path.
pub fn image_url(media: &MediaStorage, path: Option<&str>) -> Option<String> {
    path.map(|path| media.url_for(path))
}
