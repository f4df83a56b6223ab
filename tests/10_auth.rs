mod common;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use chrono::{Duration, Utc};
use serde_json::json;

use common::{TestApp, PASSWORD};
use edulingo_api::auth::TokenService;
use edulingo_api::database::models::Role;
use edulingo_api::services::UserPatch;

#[tokio::test]
async fn health_and_descriptor_are_public() -> Result<()> {
    let app = TestApp::new()?;

    let res = app.get("/health", None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["database"], "ok");

    let res = app.get("/", None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["name"], "EduLingo API");
    Ok(())
}

#[tokio::test]
async fn register_creates_a_learner_without_exposing_the_hash() -> Result<()> {
    let app = TestApp::new()?;

    let res = app
        .post(
            "/api/auth/register",
            None,
            json!({
                "full_name": "Lan Pham",
                "email": "  Lan@Example.com ",
                "password": "pw123456",
                "role": "admin"
            }),
        )
        .await?;

    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.data()["role"], "learner");
    assert_eq!(res.data()["user"]["email"], "lan@example.com");
    assert!(res.data()["user"].get("password").is_none());
    Ok(())
}

#[tokio::test]
async fn register_rejects_missing_fields_and_duplicates() -> Result<()> {
    let app = TestApp::new()?;

    let res = app
        .post("/api/auth/register", None, json!({ "email": "a@b.com", "password": "pw" }))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.message(), "full_name, email, and password are required");

    let body = json!({ "full_name": "A", "email": "dup@b.com", "password": "pw" });
    assert_eq!(app.post("/api/auth/register", None, body).await?.status, StatusCode::CREATED);

    let res = app
        .post(
            "/api/auth/register",
            None,
            json!({ "full_name": "B", "email": "DUP@b.com", "password": "other" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.message(), "Email already exists");
    Ok(())
}

#[tokio::test]
async fn login_issues_a_token_that_opens_the_profile() -> Result<()> {
    let app = TestApp::new()?;
    let (teacher, _) = app.teacher("teacher@edulingo.test").await?;

    let res = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "Teacher@Edulingo.test", "password": PASSWORD }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["role"], "teacher");
    assert_eq!(res.data()["expires_in"], 24 * 3600);

    let token = res.data()["token"].as_str().unwrap_or_default().to_string();
    let res = app.get("/api/users/profile", Some(&token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["id"], teacher.id.to_string());
    assert!(res.data().get("password").is_none());
    Ok(())
}

#[tokio::test]
async fn bad_credentials_are_indistinguishable() -> Result<()> {
    let app = TestApp::new()?;
    app.learner("learner@edulingo.test").await?;

    let wrong_password = app
        .post("/api/auth/login", None, json!({ "email": "learner@edulingo.test", "password": "nope" }))
        .await?;
    let unknown_email = app
        .post("/api/auth/login", None, json!({ "email": "ghost@edulingo.test", "password": "nope" }))
        .await?;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.message(), unknown_email.message());

    let missing = app.post("/api/auth/login", None, json!({ "email": "x@y.com" })).await?;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.message(), "Email and password are required");
    Ok(())
}

#[tokio::test]
async fn inactive_accounts_cannot_log_in_or_use_old_tokens() -> Result<()> {
    let app = TestApp::new()?;
    let (learner, token) = app.learner("sleepy@edulingo.test").await?;

    app.state
        .users
        .update(
            learner.id,
            UserPatch {
                status: Some("suspended".into()),
                ..UserPatch::default()
            },
        )
        .await?;

    let res = app
        .post("/api/auth/login", None, json!({ "email": "sleepy@edulingo.test", "password": PASSWORD }))
        .await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app.get("/api/users/profile", Some(&token)).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn gate_rejects_missing_malformed_foreign_and_expired_tokens() -> Result<()> {
    let app = TestApp::new()?;
    let (learner, _) = app.learner("gate@edulingo.test").await?;

    let res = app.get("/api/users/profile", None).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/users/profile")
        .header(header::AUTHORIZATION, "Token abc")
        .body(Body::empty())?;
    assert_eq!(app.raw(request).await?.status, StatusCode::UNAUTHORIZED);

    assert_eq!(
        app.get("/api/users/profile", Some("not.a.jwt")).await?.status,
        StatusCode::UNAUTHORIZED
    );

    let foreign = TokenService::new("some-other-secret", Duration::hours(24))?;
    let token = foreign.issue(&learner)?.token;
    assert_eq!(app.get("/api/users/profile", Some(&token)).await?.status, StatusCode::UNAUTHORIZED);

    let expired = app.state.tokens.issue_at(&learner, Utc::now() - Duration::hours(25))?.token;
    assert_eq!(app.get("/api/users/profile", Some(&expired)).await?.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn tokens_of_deleted_users_stop_working() -> Result<()> {
    let app = TestApp::new()?;
    let (admin, _) = app.admin().await?;
    let (learner, token) = app.learner("gone@edulingo.test").await?;

    app.state.users.delete(&admin, learner.id).await?;

    let res = app.get("/api/users/profile", Some(&token)).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn role_changes_apply_to_existing_tokens() -> Result<()> {
    let app = TestApp::new()?;
    let (learner, token) = app.learner("promoted@edulingo.test").await?;

    assert_eq!(app.get("/api/courses", Some(&token)).await?.status, StatusCode::FORBIDDEN);

    app.state
        .users
        .update(
            learner.id,
            UserPatch {
                role: Some(Role::Teacher.as_str().into()),
                ..UserPatch::default()
            },
        )
        .await?;

    assert_eq!(app.get("/api/courses", Some(&token)).await?.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn logout_and_malformed_bodies() -> Result<()> {
    let app = TestApp::new()?;

    let res = app.send(Method::POST, "/api/auth/logout", None, None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], true);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))?;
    let res = app.raw(request).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["code"], "INVALID_JSON");
    Ok(())
}
