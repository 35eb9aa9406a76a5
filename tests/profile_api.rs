mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{TestApp, PNG};
use social_media_api::{entities::EntProfile, services::SocialGraphService};

const PROFILES: &str = "/api/social_media/profiles";

#[tokio::test]
async fn test_auth_required() {
    let app = TestApp::new().await;

    let (status, body) = app.send(Method::GET, PROFILES, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"detail": "Authentication credentials were not provided."}));

    let (status, body) = app.get(PROFILES, "not-a-real-token").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"detail": "Invalid token."}));
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new().await;
    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_list_profiles_paginated_by_username() {
    let app = TestApp::new().await;
    let mut users = Vec::new();
    for i in 0..11 {
        users.push(app.user(&format!("test_user{:02}", i)).await);
    }
    let graph = SocialGraphService::new(app.state.db.clone());
    let first = EntProfile::gen_for_user(&app.state.db, users[0].user_id)
        .await
        .unwrap()
        .unwrap();
    graph.follow(users[1].profile_id, &first).await.unwrap();

    let (status, body) = app.get(PROFILES, &users[0].token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 11);
    assert_eq!(body["previous"], json!(null));
    assert_eq!(body["next"], json!("/api/social_media/profiles?page=2"));

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 10);
    assert_eq!(
        results[0],
        json!({
            "id": users[0].profile_id,
            "username": "test_user00",
            "first_name": "First Name",
            "last_name": "Last Name",
            "followers_count": 1,
            "image": null,
        })
    );
    assert_eq!(results[9]["username"], "test_user09");

    let (status, body) = app.get(&format!("{}?page=last", PROFILES), &users[0].token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["username"], "test_user10");
    assert_eq!(body["previous"], json!("/api/social_media/profiles"));

    let (status, body) = app.get(&format!("{}?page=3", PROFILES), &users[0].token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"detail": "Invalid page."}));
}

#[tokio::test]
async fn test_filter_profiles_exact_match() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    app.user("alicia").await;

    let (_, body) = app.get(&format!("{}?username=alice", PROFILES), &alice.token).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["username"], "alice");

    let (_, body) = app.get(&format!("{}?username=ali", PROFILES), &alice.token).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_retrieve_profile_detail() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;

    app.post(&format!("{}/{}/follow", PROFILES, bob.profile_id), &alice.token, None).await;

    let (status, body) = app.get(&format!("{}/{}", PROFILES, bob.profile_id), &alice.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "id": bob.profile_id,
            "username": "bob",
            "first_name": "First Name",
            "last_name": "Last Name",
            "bio": "Bio",
            "followings": [],
            "followers": ["alice"],
            "image": null,
        })
    );

    let (status, _) = app.get(&format!("{}/999", PROFILES), &alice.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get(&format!("{}/abc", PROFILES), &alice.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_profile_for_requester() {
    let app = TestApp::new().await;
    let (_, token) = app.identity("new@test.com").await;

    let (status, body) = app
        .post(PROFILES, &token, Some(json!({"username": "newbie", "bio": "hi"})))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "newbie");
    assert_eq!(body["first_name"], "");
    assert_eq!(body["bio"], "hi");

    let (status, body) = app.post(PROFILES, &token, Some(json!({"username": "again"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"detail": "A profile already exists for this account."}));
}

#[tokio::test]
async fn test_create_profile_validation() {
    let app = TestApp::new().await;
    app.user("taken").await;
    let (_, token) = app.identity("new@test.com").await;

    let (status, body) = app.post(PROFILES, &token, Some(json!({"bio": "no name"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"username": ["This field is required."]}));

    let (status, body) = app.post(PROFILES, &token, Some(json!({"username": "taken"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"username": ["profile with this username already exists."]}));
}

#[tokio::test]
async fn test_follow_user() {
    let app = TestApp::new().await;
    let me = app.user("test_user").await;
    let other = app.user("test_user0").await;
    let url = format!("{}/{}/follow", PROFILES, other.profile_id);

    let (status, body) = app.post(&url, &me.token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"detail": "You have successfully followed test_user0."}));

    let (status, body) = app.post(&url, &me.token, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"detail": "You have already followed test_user0!"}));

    let graph = SocialGraphService::new(app.state.db.clone());
    assert_eq!(graph.followings_of(me.profile_id).await.unwrap(), vec!["test_user0"]);
}

#[tokio::test]
async fn test_unfollow_user() {
    let app = TestApp::new().await;
    let me = app.user("test_user").await;
    let other = app.user("test_user0").await;
    let unfollow = format!("{}/{}/unfollow", PROFILES, other.profile_id);

    let (status, body) = app.post(&unfollow, &me.token, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"detail": "You have not followed test_user0 yet!"}));

    app.post(&format!("{}/{}/follow", PROFILES, other.profile_id), &me.token, None).await;
    let (status, body) = app.post(&unfollow, &me.token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"detail": "You have successfully unfollowed test_user0."}));

    let graph = SocialGraphService::new(app.state.db.clone());
    assert!(!graph.is_following(me.profile_id, other.profile_id).await.unwrap());
}

#[tokio::test]
async fn test_self_follow_rejected() {
    let app = TestApp::new().await;
    let me = app.user("test_user").await;

    let follow = format!("{}/{}/follow", PROFILES, me.profile_id);
    let (status, _) = app.post(&follow, &me.token, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let unfollow = format!("{}/{}/unfollow", PROFILES, me.profile_id);
    let (status, _) = app.post(&unfollow, &me.token, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_follow_requires_own_profile() {
    let app = TestApp::new().await;
    let other = app.user("test_user0").await;
    let (_, token) = app.identity("noprofile@test.com").await;

    let follow = format!("{}/{}/follow", PROFILES, other.profile_id);
    let (status, body) = app.post(&follow, &token, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"detail": "You need to create a profile first."}));
}

#[tokio::test]
async fn test_only_owner_mutates_profile() {
    let app = TestApp::new().await;
    let owner = app.user("owner").await;
    let stranger = app.user("stranger").await;
    let url = format!("{}/{}", PROFILES, owner.profile_id);

    let (status, body) = app
        .send(Method::PATCH, &url, Some(&stranger.token), Some(json!({"bio": "hacked"})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({"detail": "You do not have permission to perform this action."}));

    let (status, _) = app.send(Method::DELETE, &url, Some(&stranger.token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(Method::PATCH, &url, Some(&owner.token), Some(json!({"bio": "updated"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bio"], "updated");
    assert_eq!(body["username"], "owner");

    let (status, body) = app
        .send(Method::PUT, &url, Some(&owner.token), Some(json!({"first_name": "Only"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"username": ["This field is required."]}));

    let (status, body) = app.send(Method::DELETE, &url, Some(&owner.token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, json!(null));
    let (status, _) = app.get(&url, &stranger.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_profile_image() {
    let app = TestApp::new().await;
    let owner = app.user("Test User").await;
    let stranger = app.user("stranger").await;
    let url = format!("{}/{}/upload-image", PROFILES, owner.profile_id);

    let (status, _) = app.upload(&url, &stranger.token, "me.png", PNG).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.upload(&url, &owner.token, "Me.PNG", PNG).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], json!(owner.profile_id));
    let image = body["image"].as_str().unwrap();
    assert!(image.starts_with("/media/uploads/profiles/test-user-"));
    assert!(image.ends_with(".png"));

    let stored = app.media.path().join(image.trim_start_matches("/media/"));
    assert_eq!(std::fs::read(&stored).unwrap(), PNG);

    let (status, body) = app.upload(&url, &owner.token, "notes.txt", b"plain text").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"image": ["Upload a valid image. The file you uploaded was either not an image or a corrupted image."]})
    );

    let (_, body) = app.upload(&url, &owner.token, "again.png", PNG).await;
    assert_ne!(body["image"].as_str().unwrap(), image);
    assert!(!stored.exists());
}

#[tokio::test]
async fn test_upload_rejects_non_image_extension() {
    let app = TestApp::new().await;
    let owner = app.user("owner").await;
    let url = format!("{}/{}/upload-image", PROFILES, owner.profile_id);

    let mut disguised = PNG.to_vec();
    disguised.extend_from_slice(b"<script>alert(1)</script>");
    let (status, body) = app.upload(&url, &owner.token, "x.html", &disguised).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["image"][0].as_str().unwrap();
    assert!(message.starts_with("File extension \u{201c}html\u{201d} is not allowed."));

    let (_, detail) = app.get(&format!("{}/{}", PROFILES, owner.profile_id), &owner.token).await;
    assert_eq!(detail["image"], json!(null));
    let uploads = app.media.path().join("uploads/profiles");
    assert!(!uploads.exists() || std::fs::read_dir(&uploads).unwrap().next().is_none());

    let (status, body) = app.upload(&url, &owner.token, "photo.jpg", PNG).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["image"].as_str().unwrap().ends_with(".png"));
}

#[tokio::test]
async fn test_upload_too_large() {
    let app = TestApp::new().await;
    let owner = app.user("owner").await;
    let url = format!("{}/{}/upload-image", PROFILES, owner.profile_id);
    let limit = app.state.config.media.max_upload_bytes;
    let too_large = json!({"image": ["The submitted file is too large."]});

    let mut just_over = PNG.to_vec();
    just_over.resize(limit + 1, 0);
    let (status, body) = app.upload(&url, &owner.token, "big.png", &just_over).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, too_large);

    let mut far_over = PNG.to_vec();
    far_over.resize(limit + limit / 8, 0);
    let (status, body) = app.upload(&url, &owner.token, "huge.png", &far_over).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, too_large);
}

#[tokio::test]
async fn test_profile_fields_are_trimmed() {
    let app = TestApp::new().await;
    app.user("alice").await;
    let (_, token) = app.identity("new@test.com").await;

    let (status, body) = app
        .post(PROFILES, &token, Some(json!({"username": " alice "})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"username": ["profile with this username already exists."]}));

    let (status, body) = app
        .post(PROFILES, &token, Some(json!({"username": "  bob\n", "bio": " hi "})))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "bob");
    assert_eq!(body["bio"], "hi");
}
