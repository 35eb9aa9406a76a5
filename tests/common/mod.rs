#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use social_media_api::{
    api::build_app,
    app_state::AppState,
    config::Config,
    core::{ProfileId, UserId},
    entities::{ent_profile::ProfileFields, EntProfile},
    infrastructure::{database::SocialDatabase, identity::register_identity},
};

pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01";

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub media: TempDir,
}

pub struct TestUser {
    pub token: String,
    pub user_id: UserId,
    pub profile_id: ProfileId,
}

impl TestApp {
    pub async fn new() -> Self {
        let media = tempfile::tempdir().unwrap();
        let config = Config::for_testing(media.path().to_string_lossy().into_owned());
        let db = SocialDatabase::new_in_memory().await.unwrap();
        let state = AppState::with_database(db, config);
        Self { app: build_app(state.clone()), state, media }
    }

    /// Identity with a token but no profile yet.
    pub async fn identity(&self, email: &str) -> (UserId, String) {
        let (identity, token) = register_identity(&self.state.db, email).await.unwrap();
        (identity.user_id, token)
    }

    pub async fn user(&self, username: &str) -> TestUser {
        let (user_id, token) = self.identity(&format!("{}@test.com", username)).await;
        let profile = EntProfile::create(
            &self.state.db,
            user_id,
            &ProfileFields {
                username: username.to_string(),
                first_name: "First Name".to_string(),
                last_name: "Last Name".to_string(),
                bio: "Bio".to_string(),
            },
        )
        .await
        .unwrap();
        TestUser { token, user_id, profile_id: profile.id }
    }

    pub async fn request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Token {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.request(request).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), body).await
    }

    /// Multipart upload with a single `image` file field.
    pub async fn upload(
        &self,
        uri: &str,
        token: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> (StatusCode, Value) {
        let boundary = "social-media-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary))
            .body(Body::from(body))
            .unwrap();
        self.request(request).await
    }
}
