use axum::{
    body::Body as AxumBody,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::services::auth_service::verify_token;
use crate::web::models::AuthenticatedUser;
use crate::web::{AppState, error::AppError};

/// Resolves the caller from `Authorization: Bearer <token>` and stores it as
/// an `AuthenticatedUser` request extension.
pub async fn auth(
    State(state): State<Arc<AppState>>,
    mut req: Request<AxumBody>,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing or malformed bearer token".to_string()))?;

    let user_id = verify_token(token, &state.auth_keys)?;

    req.extensions_mut().insert(AuthenticatedUser { id: user_id });
    Ok(next.run(req).await)
}
