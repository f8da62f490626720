//! Grant-admin command - Promotes an existing account to admin.
//!
//! Signup always creates `user` accounts; this is how the first admin is made.

use std::sync::Arc;

use common::{AppError, AppResult};
use user_service_lib::{AccountStore, Database, UserManager, UserService};

use crate::cli::GrantAdminArgs;
use crate::config::GatewayConfig;

/// Execute the grant-admin command
pub async fn execute(args: GrantAdminArgs, config: GatewayConfig) -> AppResult<()> {
    let db = Database::connect(&config.database)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    let users = UserManager::new(Arc::new(AccountStore::new(db.get_connection())));
    let account = users.grant_admin(&args.email).await?;

    println!("{} ({}) is now an admin", account.username, account.email);
    Ok(())
}
