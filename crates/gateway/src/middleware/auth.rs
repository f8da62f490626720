//! Bearer token authentication middleware.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use auth_service_lib::SessionClaims;
use common::{AppError, AppResult};
use domain::{AccountRole, BEARER_TOKEN_PREFIX};

use crate::state::AppState;

/// Authenticated account attached to the request by `auth_middleware`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentAccount {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub role: AccountRole,
}

impl From<SessionClaims> for CurrentAccount {
    fn from(claims: SessionClaims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            username: claims.username,
            role: claims.role,
        }
    }
}

/// Bearer token authentication middleware.
///
/// Validates the session token from the Authorization header and injects
/// a `CurrentAccount` into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or(AppError::MissingCredential)?;

    let token = bearer_token(header.to_str().map_err(|_| AppError::MalformedCredential)?)?;

    let claims = state.tokens.validate(token)?;
    tracing::debug!(account_id = claims.sub, "Request authenticated");

    request.extensions_mut().insert(CurrentAccount::from(claims));

    Ok(next.run(request).await)
}

/// Role requirement middleware. Must run after `auth_middleware`.
pub async fn role_middleware(
    State(required): State<AccountRole>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let account = request
        .extensions()
        .get::<CurrentAccount>()
        .ok_or(AppError::Unauthorized)?;

    require_role(account, required)?;

    Ok(next.run(request).await)
}

/// Check that the caller holds the required role.
pub fn require_role(account: &CurrentAccount, required: AccountRole) -> AppResult<()> {
    if account.role.can_access(required) {
        Ok(())
    } else {
        Err(AppError::InsufficientRole(required))
    }
}

fn bearer_token(header: &str) -> AppResult<&str> {
    match header.strip_prefix(BEARER_TOKEN_PREFIX) {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AppError::MalformedCredential),
    }
}
