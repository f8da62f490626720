//! Account handlers.

use axum::{
    extract::{Extension, State},
    middleware,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::{Validate, ValidateEmail};

use common::{ApiResponse, AppError, AppResult};
use domain::{AccountPatch, AccountResponse, AccountRole};

use crate::extractors::{AccountId, ValidatedJson};
use crate::middleware::{require_role, role_middleware, CurrentAccount};
use crate::state::AppState;

/// Account update request. Empty strings are treated as absent.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAccountRequest {
    #[validate(length(max = 255, message = "Username is too long"))]
    #[schema(example = "jdoe")]
    pub username: Option<String>,
    #[validate(length(max = 255, message = "First name is too long"))]
    #[schema(example = "Jane")]
    pub first_name: Option<String>,
    #[validate(length(max = 255, message = "Last name is too long"))]
    #[schema(example = "Doe")]
    pub last_name: Option<String>,
    #[validate(length(max = 255, message = "Email is too long"))]
    #[schema(example = "jane@example.com")]
    pub email: Option<String>,
    /// New role (admin only)
    #[schema(example = "admin")]
    pub role: Option<String>,
}

impl UpdateAccountRequest {
    /// Normalize into a storage patch, rejecting bad email and role values.
    pub fn into_patch(self) -> AppResult<AccountPatch> {
        let email = present(self.email);
        if let Some(ref email) = email {
            if !email.validate_email() {
                return Err(AppError::validation("Invalid email format"));
            }
        }

        let role = present(self.role)
            .map(|r| r.parse::<AccountRole>())
            .transpose()?;

        Ok(AccountPatch {
            username: present(self.username),
            email,
            first_name: present(self.first_name),
            last_name: present(self.last_name),
            role,
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Create account routes. Listing requires the admin role.
pub fn user_routes() -> Router<AppState> {
    let admin_only = Router::new()
        .route("/", get(list_users))
        .route_layer(middleware::from_fn_with_state(
            AccountRole::Admin,
            role_middleware,
        ));

    Router::new()
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .merge(admin_only)
}

/// Get the caller's own account
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current account", body = AccountResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Account no longer exists")
    )
)]
pub async fn profile(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<AccountResponse>> {
    let account = state.user_service.get_account(current.id).await?;
    Ok(ApiResponse::success(AccountResponse::from(account)))
}

/// List all accounts, newest first (admin only)
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All accounts", body = Vec<AccountResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<AccountResponse>>> {
    let accounts = state.user_service.list_accounts().await?;
    Ok(ApiResponse::success(
        accounts.into_iter().map(AccountResponse::from).collect(),
    ))
}

/// Get an account by ID
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Account ID")
    ),
    responses(
        (status = 200, description = "Account", body = AccountResponse),
        (status = 400, description = "Invalid user ID format"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    AccountId(id): AccountId,
) -> AppResult<ApiResponse<AccountResponse>> {
    let account = state.user_service.get_account(id).await?;
    Ok(ApiResponse::success(AccountResponse::from(account)))
}

/// Update an account (self, or any account as admin)
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Account ID")
    ),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Account updated", body = AccountResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Account not found"),
        (status = 409, description = "Email or username already taken")
    )
)]
pub async fn update_user(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    AccountId(id): AccountId,
    ValidatedJson(payload): ValidatedJson<UpdateAccountRequest>,
) -> AppResult<ApiResponse<AccountResponse>> {
    if current.id != id {
        require_role(&current, AccountRole::Admin)?;
    }

    let patch = payload.into_patch()?;

    // Role changes are admin-only, including on one's own account
    if patch.role.is_some() {
        require_role(&current, AccountRole::Admin)?;
    }

    let account = state.user_service.update_account(id, patch).await?;
    tracing::info!(account_id = id, updated_by = current.id, "Account updated");

    Ok(ApiResponse::with_message(
        AccountResponse::from(account),
        "User updated successfully",
    ))
}

/// Delete an account (admin only, never one's own)
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Account ID")
    ),
    responses(
        (status = 200, description = "Account deleted"),
        (status = 400, description = "Cannot delete your own account"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn delete_user(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
    AccountId(id): AccountId,
) -> AppResult<ApiResponse<()>> {
    if current.id == id {
        return Err(AppError::validation("You cannot delete your own account"));
    }
    require_role(&current, AccountRole::Admin)?;

    state.user_service.delete_account(id).await?;
    tracing::info!(account_id = id, deleted_by = current.id, "Account deleted");

    Ok(ApiResponse::message("User deleted successfully"))
}
