//! User service - account lookups and administration.
//!
//! Caller authorization (self vs. admin) is decided by the HTTP handlers,
//! which own the request identity. This layer enforces data rules only.

use async_trait::async_trait;
use std::sync::Arc;

use common::{AppError, AppResult, OptionExt};
use domain::{Account, AccountPatch, AccountRole};

use crate::repository::AccountRepository;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get account by ID
    async fn get_account(&self, id: i32) -> AppResult<Account>;

    /// List all accounts, newest first
    async fn list_accounts(&self) -> AppResult<Vec<Account>>;

    /// Apply a partial update and return the stored result
    async fn update_account(&self, id: i32, patch: AccountPatch) -> AppResult<Account>;

    /// Permanently delete an account
    async fn delete_account(&self, id: i32) -> AppResult<()>;

    /// Promote the account with this email to admin
    async fn grant_admin(&self, email: &str) -> AppResult<Account>;

    /// Check that storage is reachable
    async fn health_check(&self) -> AppResult<()>;
}

/// Concrete implementation of UserService using repository.
pub struct UserManager {
    repo: Arc<dyn AccountRepository>,
}

impl UserManager {
    /// Create new user service instance with repository
    pub fn new(repo: Arc<dyn AccountRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn get_account(&self, id: i32) -> AppResult<Account> {
        self.repo.find_by_id(id).await?.ok_or_not_found()
    }

    async fn list_accounts(&self) -> AppResult<Vec<Account>> {
        self.repo.list_all().await
    }

    async fn update_account(&self, id: i32, patch: AccountPatch) -> AppResult<Account> {
        if patch.is_empty() {
            return Err(AppError::validation(
                "At least one field must be provided for update",
            ));
        }

        if self.repo.update(id, patch).await? == 0 {
            return Err(AppError::NotFound);
        }

        self.get_account(id).await
    }

    async fn delete_account(&self, id: i32) -> AppResult<()> {
        match self.repo.delete(id).await? {
            0 => Err(AppError::NotFound),
            _ => Ok(()),
        }
    }

    async fn grant_admin(&self, email: &str) -> AppResult<Account> {
        let account = self.repo.find_by_email(email).await?.ok_or_not_found()?;

        if account.is_admin() {
            return Ok(account);
        }

        let patch = AccountPatch {
            role: Some(AccountRole::Admin),
            ..Default::default()
        };
        self.update_account(account.id, patch).await
    }

    async fn health_check(&self) -> AppResult<()> {
        self.repo.ping().await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use mockall::predicate::eq;

    use super::*;
    use crate::repository::MockAccountRepository;

    fn create_test_account(id: i32) -> Account {
        Account {
            id,
            username: format!("user{}", id),
            email: format!("user{}@example.com", id),
            first_name: Some("Test".to_string()),
            last_name: None,
            password_hash: "hashed".to_string(),
            role: AccountRole::User,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn service(repo: MockAccountRepository) -> UserManager {
        UserManager::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn test_get_account_success() {
        let mut repo = MockAccountRepository::new();
        repo.expect_find_by_id()
            .with(eq(4))
            .returning(|id| Ok(Some(create_test_account(id))));

        let account = service(repo).get_account(4).await.unwrap();

        assert_eq!(account.id, 4);
    }

    #[tokio::test]
    async fn test_get_account_not_found() {
        let mut repo = MockAccountRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let result = service(repo).get_account(99).await;

        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_list_accounts() {
        let mut repo = MockAccountRepository::new();
        repo.expect_list_all()
            .returning(|| Ok(vec![create_test_account(2), create_test_account(1)]));

        let accounts = service(repo).list_accounts().await.unwrap();

        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].id, 2);
    }

    #[tokio::test]
    async fn test_update_with_empty_patch_never_touches_storage() {
        // No expectations: any repository call would panic
        let repo = MockAccountRepository::new();

        let result = service(repo)
            .update_account(1, AccountPatch::default())
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_passes_patch_through() {
        let patch = AccountPatch {
            first_name: Some("Grace".to_string()),
            ..Default::default()
        };

        let mut repo = MockAccountRepository::new();
        repo.expect_update()
            .with(eq(3), eq(patch.clone()))
            .times(1)
            .returning(|_, _| Ok(1));
        repo.expect_find_by_id().returning(|id| {
            let mut account = create_test_account(id);
            account.first_name = Some("Grace".to_string());
            Ok(Some(account))
        });

        let account = service(repo).update_account(3, patch).await.unwrap();

        assert_eq!(account.first_name.as_deref(), Some("Grace"));
    }

    #[tokio::test]
    async fn test_update_missing_account() {
        let mut repo = MockAccountRepository::new();
        repo.expect_update().returning(|_, _| Ok(0));

        let patch = AccountPatch {
            username: Some("renamed".to_string()),
            ..Default::default()
        };
        let result = service(repo).update_account(42, patch).await;

        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_update_conflict_is_propagated() {
        let mut repo = MockAccountRepository::new();
        repo.expect_update()
            .returning(|_, _| Err(AppError::conflict("User with this email or username")));

        let patch = AccountPatch {
            email: Some("taken@example.com".to_string()),
            ..Default::default()
        };
        let result = service(repo).update_account(1, patch).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_delete_account() {
        let mut repo = MockAccountRepository::new();
        repo.expect_delete().with(eq(5)).returning(|_| Ok(1));

        assert!(service(repo).delete_account(5).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_missing_account() {
        let mut repo = MockAccountRepository::new();
        repo.expect_delete().returning(|_| Ok(0));

        let result = service(repo).delete_account(5).await;

        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_grant_admin_promotes_account() {
        let mut repo = MockAccountRepository::new();
        repo.expect_find_by_email()
            .returning(|_| Ok(Some(create_test_account(8))));
        repo.expect_update()
            .withf(|id, patch| *id == 8 && patch.role == Some(AccountRole::Admin))
            .returning(|_, _| Ok(1));
        repo.expect_find_by_id().returning(|id| {
            let mut account = create_test_account(id);
            account.role = AccountRole::Admin;
            Ok(Some(account))
        });

        let account = service(repo).grant_admin("user8@example.com").await.unwrap();

        assert!(account.is_admin());
    }

    #[tokio::test]
    async fn test_grant_admin_unknown_email() {
        let mut repo = MockAccountRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));

        let result = service(repo).grant_admin("ghost@example.com").await;

        assert!(matches!(result, Err(AppError::NotFound)));
    }
}
