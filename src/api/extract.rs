// Request extractors that reject with the API's error shapes

use axum::{
    extract::{multipart::MultipartError, FromRequest, FromRequestParts, Multipart, Path, Request},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{AppError, AppResult, FieldErrors};
use crate::infrastructure::media_storage::ImageUpload;

/// Object id from the URL. Anything that isn't a valid id is simply not found.
#[derive(Debug, Clone, Copy)]
pub struct IdPath<T>(pub T);

impl<S, T> FromRequestParts<S> for IdPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(id)| IdPath(id))
            .map_err(|_| AppError::not_found())
    }
}

/// JSON body; syntax and type errors become a 400 `{"detail": ...}`.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| ApiJson(value))
            .map_err(|rejection| {
                AppError::BadRequest(format!("JSON parse error - {}", rejection.body_text()))
            })
    }
}

/// Raw query pairs, kept in request order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Last non-empty value for `key`; empty filter values are ignored.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(k, v)| k == key && !v.is_empty())
            .map(|(_, v)| v.as_str())
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    /// Every value for `key`, with comma-separated lists flattened.
    pub fn list(&self, key: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .flat_map(|(_, v)| v.split(','))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect()
    }
}

/// Pull the `image` file out of a multipart form; other fields are ignored.
pub async fn read_image_field(mut multipart: Multipart) -> AppResult<Option<ImageUpload>> {
    let multipart_error = |e: MultipartError| {
        tracing::debug!("multipart read failed: {}", e);
        let message = if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            "The submitted file is too large."
        } else {
            "The submitted data was not a file. Check the encoding type on the form."
        };
        AppError::Validation(FieldErrors::single("image", message))
    };

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("image") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(Some(ImageUpload { file_name, bytes: bytes.to_vec() }));
    }
    Ok(None)
}
