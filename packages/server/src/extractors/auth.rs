use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Caller identity resolved by [`require_auth`].
///
/// Add this as a handler parameter on routes behind the auth middleware.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

/// Resolve the caller from an `Authorization: Bearer <token>` header.
pub fn authenticate(headers: &HeaderMap, jwt_secret: &str) -> Result<AuthUser, AppError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::TokenMissing)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::TokenInvalid)?;

    let claims = jwt::verify(token, jwt_secret).map_err(|_| AppError::TokenInvalid)?;
    let user_id = claims.user_id().map_err(|_| AppError::TokenInvalid)?;

    Ok(AuthUser {
        user_id,
        email: claims.email,
    })
}

/// Route layer for protected routes: rejects the request before the handler
/// runs unless it carries a valid, unexpired token.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_user = authenticate(req.headers(), &state.config.auth.jwt_secret)?;
    req.extensions_mut().insert(auth_user);
    Ok(next.run(req).await)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AppError::TokenMissing)
    }
}
