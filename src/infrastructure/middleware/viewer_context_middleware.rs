// ViewerContext Middleware - authenticates the bearer token and injects the viewer
// into request extensions. Anonymous requests never reach a handler.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    infrastructure::{identity::IdentityProvider, viewer::viewer::ViewerContext},
};

/// Credentials as presented by the client, before validation
#[derive(Debug, Clone, PartialEq)]
pub enum Credentials {
    Missing,
    Token(String),
    Malformed,
}

/// Trait for application state that can validate credentials
pub trait HasIdentityProvider {
    fn identity_provider(&self) -> &Arc<dyn IdentityProvider>;
}

pub async fn viewer_context_middleware<T>(
    State(app_state): State<T>,
    mut request: Request,
    next: Next,
) -> AppResult<Response>
where
    T: HasIdentityProvider + Clone + Send + Sync + 'static,
{
    let token = match extract_credentials(request.headers()) {
        Credentials::Token(token) => token,
        Credentials::Missing => {
            tracing::debug!("rejecting {} {}: no credentials", request.method(), request.uri());
            return Err(AppError::Unauthorized(
                "Authentication credentials were not provided.".to_string(),
            ));
        }
        Credentials::Malformed => {
            return Err(AppError::Unauthorized("Invalid token header.".to_string()));
        }
    };

    let identity = app_state
        .identity_provider()
        .authenticate(&token)
        .await?
        .ok_or_else(|| {
            tracing::warn!("rejecting {} {}: unknown token", request.method(), request.uri());
            AppError::Unauthorized("Invalid token.".to_string())
        })?;

    let request_id = format!("req-{}", Uuid::new_v4());
    let viewer_context = Arc::new(ViewerContext::authenticated(identity, request_id));
    request.extensions_mut().insert(viewer_context);

    Ok(next.run(request).await)
}

/// Accepts `Bearer <key>` and `Token <key>` authorization schemes
fn extract_credentials(headers: &HeaderMap) -> Credentials {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Credentials::Missing;
    };
    let Ok(value) = value.to_str() else {
        return Credentials::Malformed;
    };

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None)
            if scheme.eq_ignore_ascii_case("bearer") || scheme.eq_ignore_ascii_case("token") =>
        {
            Credentials::Token(token.to_string())
        }
        _ => Credentials::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer token123"));
        assert_eq!(extract_credentials(&headers), Credentials::Token("token123".into()));
    }

    #[test]
    fn test_extract_token_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Token abc"));
        assert_eq!(extract_credentials(&headers), Credentials::Token("abc".into()));
    }

    #[test]
    fn test_extract_malformed() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(extract_credentials(&headers), Credentials::Malformed);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer a b"));
        assert_eq!(extract_credentials(&headers), Credentials::Malformed);
    }

    #[test]
    fn test_extract_anonymous() {
        assert_eq!(extract_credentials(&HeaderMap::new()), Credentials::Missing);
    }
}
