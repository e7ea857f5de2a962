use axum::{Extension, Json, extract::State};
use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{debug, info};
use validator::ValidateEmail;

use crate::db::entities::user;
use crate::db::models::PublicUser;
use crate::db::services;
use crate::web::AppState;
use crate::web::error::AppError;
use crate::web::models::{AuthenticatedUser, Claims, LoginRequest, LoginResponse, RegisterRequest};

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 50;
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Signing material derived once from the configured secret and shared
/// read-only by every request.
#[derive(Clone)]
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    token_ttl: Duration,
}

impl AuthKeys {
    pub fn from_secret(secret: &str, token_ttl_hours: i64) -> Self {
        AuthKeys {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl: Duration::hours(token_ttl_hours),
        }
    }
}

/// Trims and checks the registration fields.
pub fn validate_registration(req: &RegisterRequest) -> Result<(String, String), AppError> {
    let username = req.username.trim();
    let username_len = username.chars().count();
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&username_len) {
        return Err(AppError::InvalidInput(format!(
            "Username must be between {MIN_USERNAME_LENGTH} and {MAX_USERNAME_LENGTH} characters"
        )));
    }

    let email = req.email.trim();
    if !email.validate_email() {
        return Err(AppError::InvalidInput(format!("Invalid email address: {email}")));
    }

    if req.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok((username.to_string(), email.to_string()))
}

pub async fn register_user(
    pool: &DatabaseConnection,
    req: RegisterRequest,
    bcrypt_cost: u32,
) -> Result<PublicUser, AppError> {
    let (username, email) = validate_registration(&req)?;

    let password_hash = hash(&req.password, bcrypt_cost)
        .map_err(|e| AppError::PasswordHashingError(e.to_string()))?;

    let user_model = services::create_user(pool, &username, &email, &password_hash)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => {
                AppError::Conflict("Username or email is already in use.".to_string())
            }
            other => other,
        })?;

    info!(user_id = user_model.id, "User registered.");
    Ok(user_model.into())
}

pub async fn login_user(
    pool: &DatabaseConnection,
    req: LoginRequest,
    keys: &AuthKeys,
) -> Result<LoginResponse, AppError> {
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::InvalidInput(
            "Username and password must not be empty.".to_string(),
        ));
    }

    // Unknown user and wrong password answer identically.
    let user = services::get_user_by_username(pool, req.username.trim())
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let valid_password = verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::InternalServerError(format!("Password verification failed: {e}")))?;

    if !valid_password {
        return Err(AppError::InvalidCredentials);
    }

    let token = create_jwt_for_user(&user, keys)?;
    Ok(LoginResponse {
        user: user.into(),
        token,
    })
}

pub fn create_jwt_for_user(user: &user::Model, keys: &AuthKeys) -> Result<String, AppError> {
    let expiration = (Utc::now() + keys.token_ttl).timestamp() as usize;

    let claims = Claims {
        sub: user.id.to_string(),
        exp: Some(expiration),
    };

    encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
        .map_err(|e| AppError::TokenCreationError(e.to_string()))
}

/// Verifies a bearer credential and returns the user id from its subject.
///
/// Only HS256 with the configured secret is accepted. `exp` is checked when
/// present; `sub` is required and must be a decimal user id.
pub fn verify_token(token: &str, keys: &AuthKeys) -> Result<i32, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["sub"]);

    let token_data = decode::<Claims>(token, &keys.decoding, &validation).map_err(|e| {
        debug!(error = ?e, "Rejected bearer credential.");
        AppError::Unauthorized("Invalid token".to_string())
    })?;

    token_data
        .claims
        .sub
        .parse::<i32>()
        .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))
}

pub async fn me(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<PublicUser>, AppError> {
    let user_model = services::get_user_by_id(&app_state.db_pool, user.id)
        .await?
        .ok_or(AppError::InvalidCredentials)?;
    Ok(Json(user_model.into()))
}
