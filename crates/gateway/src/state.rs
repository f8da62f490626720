//! Application state for dependency injection.

use std::sync::Arc;

use auth_service_lib::{AuthService, Authenticator, TokenService};
use common::JwtConfig;
use user_service_lib::repository::AccountRepository;
use user_service_lib::service::{UserManager, UserService};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    /// Wire the services over one account repository.
    pub fn from_repository(repo: Arc<dyn AccountRepository>, jwt: &JwtConfig) -> Self {
        Self::with_tokens(repo, Arc::new(TokenService::new(jwt)))
    }

    /// Same as `from_repository`, with a preconfigured token service.
    pub fn with_tokens(repo: Arc<dyn AccountRepository>, tokens: Arc<TokenService>) -> Self {
        Self {
            auth_service: Arc::new(Authenticator::new(repo.clone(), tokens.clone())),
            user_service: Arc::new(UserManager::new(repo)),
            tokens,
        }
    }
}
