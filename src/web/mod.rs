use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{Method, StatusCode},
    middleware as axum_middleware,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::db::models::PublicUser;
use crate::server::config::ServerConfig;
use crate::services::auth_service::{self, AuthKeys};
use crate::web::{
    middleware::auth,
    models::{LoginRequest, LoginResponse, RegisterRequest},
    routes::*,
};

pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;

pub use error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: DatabaseConnection,
    pub auth_keys: AuthKeys,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db_pool: DatabaseConnection, config: Arc<ServerConfig>) -> Self {
        let auth_keys = AuthKeys::from_secret(&config.jwt_secret, config.token_ttl_hours);
        AppState {
            db_pool,
            auth_keys,
            config,
        }
    }
}

async fn register_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PublicUser>), AppError> {
    let Json(payload) = payload?;
    let user =
        auth_service::register_user(&app_state.db_pool, payload, app_state.config.bcrypt_cost)
            .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn login_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(payload) = payload?;
    let login_response =
        auth_service::login_user(&app_state.db_pool, payload, &app_state.auth_keys).await?;
    Ok(Json(login_response))
}

async fn health_check_handler() -> &'static str {
    "OK"
}

pub fn create_axum_router(app_state: AppState) -> Router {
    let request_timeout = Duration::from_secs(app_state.config.request_timeout_secs);
    let app_state = Arc::new(app_state);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_check_handler))
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .route(
            "/api/auth/me",
            get(auth_service::me)
                .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)),
        )
        .nest(
            "/api/bookmarks",
            bookmark_routes::create_bookmarks_router()
                .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)),
        )
        .nest(
            "/api/tags",
            tag_routes::create_tags_router()
                .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)),
        )
        .with_state(app_state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
