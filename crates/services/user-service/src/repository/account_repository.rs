//! Account repository backed by the `users` table.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr, Statement,
};

use super::entities::account::{self, ActiveModel, Entity as AccountEntity};
use common::{AppError, AppResult};
use domain::{Account, AccountPatch, NewAccount};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Account storage boundary.
///
/// Writes are single statements. Uniqueness of email and username is enforced
/// by the table's unique constraints; violations surface as `AppError::Conflict`.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find account by ID
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Account>>;

    /// Find account by email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>>;

    /// Find any account holding either the email or the username
    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> AppResult<Option<Account>>;

    /// Insert a new account
    async fn insert(&self, account: NewAccount) -> AppResult<Account>;

    /// Apply a partial update, returning the number of rows affected
    async fn update(&self, id: i32, patch: AccountPatch) -> AppResult<u64>;

    /// Delete by ID, returning the number of rows affected
    async fn delete(&self, id: i32) -> AppResult<u64>;

    /// List all accounts, newest first
    async fn list_all(&self) -> AppResult<Vec<Account>>;

    /// Check storage connectivity
    async fn ping(&self) -> AppResult<()>;
}

/// Postgres implementation of AccountRepository
pub struct AccountStore {
    db: DatabaseConnection,
}

impl AccountStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Map write failures, turning unique-constraint violations into conflicts.
fn write_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            tracing::debug!("Unique constraint violated: {}", detail);
            AppError::conflict("User with this email or username")
        }
        _ => AppError::from(err),
    }
}

#[async_trait]
impl AccountRepository for AccountStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Account>> {
        let result = AccountEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Account::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let result = AccountEntity::find()
            .filter(account::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Account::from))
    }

    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> AppResult<Option<Account>> {
        let result = AccountEntity::find()
            .filter(
                Condition::any()
                    .add(account::Column::Email.eq(email))
                    .add(account::Column::Username.eq(username)),
            )
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Account::from))
    }

    async fn insert(&self, account: NewAccount) -> AppResult<Account> {
        let now = Utc::now();
        let active_model = ActiveModel {
            username: Set(account.username),
            first_name: Set(account.first_name),
            last_name: Set(account.last_name),
            email: Set(account.email),
            password_hash: Set(account.password_hash),
            role: Set(account.role.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await.map_err(write_error)?;
        Ok(Account::from(model))
    }

    async fn update(&self, id: i32, patch: AccountPatch) -> AppResult<u64> {
        let mut query = AccountEntity::update_many()
            .col_expr(account::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(account::Column::Id.eq(id));

        if let Some(username) = patch.username {
            query = query.col_expr(account::Column::Username, Expr::value(username));
        }
        if let Some(email) = patch.email {
            query = query.col_expr(account::Column::Email, Expr::value(email));
        }
        if let Some(first_name) = patch.first_name {
            query = query.col_expr(account::Column::FirstName, Expr::value(first_name));
        }
        if let Some(last_name) = patch.last_name {
            query = query.col_expr(account::Column::LastName, Expr::value(last_name));
        }
        if let Some(role) = patch.role {
            query = query.col_expr(account::Column::Role, Expr::value(role.as_str()));
        }

        let result = query.exec(&self.db).await.map_err(write_error)?;
        Ok(result.rows_affected)
    }

    async fn delete(&self, id: i32) -> AppResult<u64> {
        let result = AccountEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected)
    }

    async fn list_all(&self) -> AppResult<Vec<Account>> {
        let models = AccountEntity::find()
            .order_by_desc(account::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Account::from).collect())
    }

    async fn ping(&self) -> AppResult<()> {
        self.db
            .execute(Statement::from_string(
                self.db.get_database_backend(),
                "SELECT 1".to_string(),
            ))
            .await
            .map_err(AppError::from)?;
        Ok(())
    }
}
