#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use edulingo_api::app::{app, AppState};
use edulingo_api::config::AppConfig;
use edulingo_api::database::models::{Role, User};
use edulingo_api::database::Store;
use edulingo_api::services::NewUser;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "s3cret-pass";

/// Router over a fresh in-memory store.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub struct Response {
    pub status: StatusCode,
    pub body: Value,
}

impl Response {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}

impl TestApp {
    pub fn new() -> Result<Self> {
        let config = AppConfig::for_tests(TEST_SECRET);
        let state = AppState::new(config, Store::memory()).context("failed to build app state")?;
        Ok(Self {
            router: app(state.clone()),
            state,
        })
    }

    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<Response> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };
        self.raw(request).await
    }

    pub async fn raw(&self, request: Request<Body>) -> Result<Response> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("response body is not JSON")?
        };
        Ok(Response { status, body })
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<Response> {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Result<Response> {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> Result<Response> {
        self.send(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> Result<Response> {
        self.send(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Result<Response> {
        self.send(Method::DELETE, uri, token, None).await
    }

    /// Account created through the identity service, plus a token for it.
    pub async fn seed(&self, role: Role, email: &str) -> Result<(User, String)> {
        let user = self
            .state
            .users
            .create(NewUser {
                full_name: Some(format!("{} user", role)),
                email: Some(email.to_string()),
                password: Some(PASSWORD.to_string()),
                role: Some(role.as_str().to_string()),
                ..NewUser::default()
            })
            .await?;
        let token = self.state.tokens.issue(&user)?.token;
        Ok((user, token))
    }

    pub async fn admin(&self) -> Result<(User, String)> {
        self.seed(Role::Admin, "admin@edulingo.test").await
    }

    pub async fn teacher(&self, email: &str) -> Result<(User, String)> {
        self.seed(Role::Teacher, email).await
    }

    pub async fn learner(&self, email: &str) -> Result<(User, String)> {
        self.seed(Role::Learner, email).await
    }
}

pub fn question(text: &str, correct: &str) -> Value {
    json!({
        "questionText": text,
        "options": { "A": "one", "B": "two", "C": "three", "D": "four" },
        "correctAnswer": correct
    })
}
