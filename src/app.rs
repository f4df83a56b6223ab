use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use thiserror::Error;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{PasswordHasher, TokenError, TokenService};
use crate::config::{AppConfig, ConfigError, Environment};
use crate::database::Store;
use crate::error::ApiError;
use crate::handlers::{elevated, protected, public};
use crate::middleware::auth_middleware;
use crate::services::UserService;

/// Shared per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Store,
    pub tokens: Arc<TokenService>,
    pub users: UserService,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl AppState {
    pub fn new(config: AppConfig, store: Store) -> Result<Self, StartupError> {
        let ttl = config.security.token_ttl()?;
        let tokens = Arc::new(TokenService::new(&config.security.jwt_secret, ttl)?);
        let hasher = PasswordHasher::new(config.security.bcrypt_cost);
        let users = UserService::new(store.users.clone(), hasher, tokens.clone());

        Ok(Self {
            config: Arc::new(config),
            store,
            tokens,
            users,
        })
    }
}

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let body_limit = state.config.api.max_request_size_bytes;

    Router::new()
        // Public
        .merge(public_routes())
        // Everything below passes the authentication gate first
        .merge(
            protected_routes()
                .merge(elevated_routes())
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::system::root))
        .route("/health", get(public::system::health))
        .route("/api/auth/login", post(public::auth::login))
        .route("/api/auth/register", post(public::auth::register))
        .route("/api/auth/logout", post(public::auth::logout))
        .route("/api/courses/catalog", get(public::catalog::catalog_list))
        .route("/api/courses/catalog/:id", get(public::catalog::catalog_get))
        .route("/api/quizzes", get(public::quizzes::quiz_list))
        .route("/api/quizzes/:id", get(public::quizzes::quiz_get))
}

fn protected_routes() -> Router<AppState> {
    use protected::{certificates, courses, feedbacks, profile};

    Router::new()
        .route("/api/users/profile", get(profile::profile_get))
        // Courses: teacher or admin
        .route("/api/courses", get(courses::course_list))
        .route("/api/courses/create", post(courses::course_create))
        .route("/api/courses/:id", get(courses::course_get))
        .route("/api/courses/:id/update", put(courses::course_update))
        .route("/api/courses/:id/delete", delete(courses::course_delete))
        // Certificates
        .route(
            "/api/certificates",
            get(certificates::certificate_list).post(certificates::certificate_create),
        )
        .route(
            "/api/certificates/:id",
            get(certificates::certificate_get)
                .put(certificates::certificate_update)
                .delete(certificates::certificate_delete),
        )
        // Feedback
        .route("/api/feedbacks/create", post(feedbacks::feedback_create))
        .route("/api/feedbacks/my-feedbacks", get(feedbacks::feedback_mine))
        .route(
            "/api/feedbacks/:id",
            put(feedbacks::feedback_update).delete(feedbacks::feedback_delete),
        )
}

fn elevated_routes() -> Router<AppState> {
    use elevated::{coupons, questions, quizzes, users};

    Router::new()
        // Users
        .route("/api/users", get(users::user_list))
        .route("/api/users/create", post(users::user_create))
        .route("/api/users/:id", get(users::user_get))
        .route("/api/users/:id/update", put(users::user_update))
        .route("/api/users/:id/delete", delete(users::user_delete))
        // Quizzes
        .route("/api/quizzes/create", post(quizzes::quiz_create))
        .route("/api/quizzes/:id/update", put(quizzes::quiz_update))
        .route("/api/quizzes/:id/delete", delete(quizzes::quiz_delete))
        .route("/api/quizzes/:id/questions", post(questions::question_add))
        .route(
            "/api/quizzes/:id/questions/:index",
            put(questions::question_replace)
                .patch(questions::question_patch)
                .delete(questions::question_delete),
        )
        // Coupons
        .route(
            "/api/coupons",
            get(coupons::coupon_list).post(coupons::coupon_create),
        )
        .route(
            "/api/coupons/:id",
            get(coupons::coupon_get)
                .put(coupons::coupon_update)
                .delete(coupons::coupon_delete),
        )
}

/// Development allows any origin; other profiles use the configured list.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = &config.security.cors_origins;
    if config.environment == Environment::Development || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
