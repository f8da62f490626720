//! Authentication service - signup, login and token refresh.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use common::{AppError, AppResult};
use domain::{Account, AccountRole, NewAccount, Password};
use user_service_lib::repository::AccountRepository;

use crate::token::TokenService;

/// Signup input after request-level validation.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// An authenticated account together with a fresh token pair.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub account: Account,
    pub token: String,
    pub refresh_token: String,
}

/// Auth service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create a `user` account and open a session for it
    async fn signup(&self, registration: Registration) -> AppResult<AuthSession>;

    /// Verify email and password and open a session
    async fn login(&self, email: &str, password: &str) -> AppResult<AuthSession>;

    /// Exchange a refresh token for a new token pair
    async fn refresh(&self, refresh_token: &str) -> AppResult<AuthSession>;
}

/// Concrete implementation of AuthService over the account directory.
pub struct Authenticator {
    repo: Arc<dyn AccountRepository>,
    tokens: Arc<TokenService>,
}

impl Authenticator {
    pub fn new(repo: Arc<dyn AccountRepository>, tokens: Arc<TokenService>) -> Self {
        Self { repo, tokens }
    }

    fn open_session(&self, account: Account) -> AppResult<AuthSession> {
        let token = self.tokens.issue_session(
            account.id,
            &account.email,
            &account.username,
            account.role,
        )?;
        let refresh_token = self.tokens.issue_refresh(account.id)?;

        Ok(AuthSession {
            account,
            token,
            refresh_token,
        })
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn signup(&self, registration: Registration) -> AppResult<AuthSession> {
        let password = Password::new(&registration.password)?;

        let existing = self
            .repo
            .find_by_email_or_username(&registration.email, &registration.username)
            .await?;
        if existing.is_some() {
            return Err(AppError::conflict("User with this email or username"));
        }

        let account = self
            .repo
            .insert(NewAccount {
                username: registration.username,
                email: registration.email,
                first_name: registration.first_name,
                last_name: registration.last_name,
                password_hash: password.into_string(),
                role: AccountRole::User,
            })
            .await?;

        info!(account_id = account.id, "Account created");
        self.open_session(account)
    }

    async fn login(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let Some(account) = self.repo.find_by_email(email).await? else {
            // Same hashing cost as a real verification
            let _ = Password::hash(password);
            return Err(AppError::InvalidCredentials);
        };

        if !Password::from_hash(account.password_hash.as_str()).verify(password)? {
            warn!(account_id = account.id, "Login rejected: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        info!(account_id = account.id, "Login succeeded");
        self.open_session(account)
    }

    async fn refresh(&self, refresh_token: &str) -> AppResult<AuthSession> {
        let claims = self.tokens.validate_refresh(refresh_token)?;

        let account = self
            .repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;

        self.open_session(account)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use common::{JwtConfig, TokenError};
    use user_service_lib::repository::MockAccountRepository;

    use super::*;

    fn tokens() -> Arc<TokenService> {
        Arc::new(TokenService::new(&JwtConfig::new(
            "test-secret-key-for-testing-only-32chars",
        )))
    }

    fn stored(id: i32, new: NewAccount) -> Account {
        Account {
            id,
            username: new.username,
            email: new.email,
            first_name: new.first_name,
            last_name: new.last_name,
            password_hash: new.password_hash,
            role: new.role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn existing_account(password: &str) -> Account {
        stored(
            7,
            NewAccount {
                username: "a".to_string(),
                email: "a@x.com".to_string(),
                first_name: None,
                last_name: None,
                password_hash: Password::hash(password).unwrap().into_string(),
                role: AccountRole::User,
            },
        )
    }

    fn registration() -> Registration {
        Registration {
            username: "a".to_string(),
            email: "a@x.com".to_string(),
            password: "secret123".to_string(),
            first_name: None,
            last_name: None,
        }
    }

    #[tokio::test]
    async fn test_signup_issues_tokens_for_new_account() {
        let mut repo = MockAccountRepository::new();
        repo.expect_find_by_email_or_username()
            .returning(|_, _| Ok(None));
        repo.expect_insert()
            .withf(|new| new.role == AccountRole::User && new.password_hash != "secret123")
            .times(1)
            .returning(|new| Ok(stored(1, new)));

        let tokens = tokens();
        let auth = Authenticator::new(Arc::new(repo), tokens.clone());

        let session = auth.signup(registration()).await.unwrap();

        assert_eq!(session.account.id, 1);
        assert_eq!(session.account.role, AccountRole::User);
        assert_eq!(tokens.validate(&session.token).unwrap().sub, 1);
        assert_eq!(tokens.validate_refresh(&session.refresh_token).unwrap().sub, 1);
    }

    #[tokio::test]
    async fn test_signup_stores_verifiable_hash() {
        let mut repo = MockAccountRepository::new();
        repo.expect_find_by_email_or_username()
            .returning(|_, _| Ok(None));
        repo.expect_insert().returning(|new| Ok(stored(1, new)));

        let auth = Authenticator::new(Arc::new(repo), tokens());
        let session = auth.signup(registration()).await.unwrap();

        let hash = Password::from_hash(session.account.password_hash);
        assert!(hash.verify("secret123").unwrap());
    }

    #[tokio::test]
    async fn test_signup_duplicate_is_conflict() {
        // No insert expectation: a second row would panic the mock
        let mut repo = MockAccountRepository::new();
        repo.expect_find_by_email_or_username()
            .returning(|_, _| Ok(Some(existing_account("secret123"))));

        let auth = Authenticator::new(Arc::new(repo), tokens());
        let result = auth.signup(registration()).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_signup_short_password_is_rejected_before_lookup() {
        // No expectations: the password is checked before storage is touched,
        // so a taken email with a short password is still a validation error
        let repo = MockAccountRepository::new();

        let auth = Authenticator::new(Arc::new(repo), tokens());
        let result = auth
            .signup(Registration {
                password: "short".to_string(),
                ..registration()
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_login_success() {
        let mut repo = MockAccountRepository::new();
        repo.expect_find_by_email()
            .returning(|_| Ok(Some(existing_account("secret123"))));

        let tokens = tokens();
        let auth = Authenticator::new(Arc::new(repo), tokens.clone());
        let session = auth.login("a@x.com", "secret123").await.unwrap();

        let claims = tokens.validate(&session.token).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let mut repo = MockAccountRepository::new();
        repo.expect_find_by_email()
            .returning(|_| Ok(Some(existing_account("secret123"))));

        let auth = Authenticator::new(Arc::new(repo), tokens());
        let result = auth.login("a@x.com", "wrongpass").await;

        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_email_matches_wrong_password() {
        let mut repo = MockAccountRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));

        let auth = Authenticator::new(Arc::new(repo), tokens());
        let result = auth.login("ghost@x.com", "secret123").await;

        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_refresh_issues_new_pair() {
        let mut repo = MockAccountRepository::new();
        repo.expect_find_by_id()
            .with(mockall::predicate::eq(7))
            .returning(|_| Ok(Some(existing_account("secret123"))));

        let tokens = tokens();
        let refresh_token = tokens.issue_refresh(7).unwrap();
        let auth = Authenticator::new(Arc::new(repo), tokens.clone());

        let session = auth.refresh(&refresh_token).await.unwrap();

        assert_eq!(tokens.validate(&session.token).unwrap().sub, 7);
    }

    #[tokio::test]
    async fn test_refresh_rejects_session_token() {
        let repo = MockAccountRepository::new();
        let tokens = tokens();
        let session_token = tokens
            .issue_session(7, "a@x.com", "a", AccountRole::User)
            .unwrap();
        let auth = Authenticator::new(Arc::new(repo), tokens);

        let result = auth.refresh(&session_token).await;

        assert!(matches!(
            result,
            Err(AppError::Token(TokenError::Malformed))
        ));
    }

    #[tokio::test]
    async fn test_refresh_for_deleted_account() {
        let mut repo = MockAccountRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let tokens = tokens();
        let refresh_token = tokens.issue_refresh(7).unwrap();
        let auth = Authenticator::new(Arc::new(repo), tokens);

        let result = auth.refresh(&refresh_token).await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }
}
