//! Account domain entity and related types.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{ROLE_ADMIN, ROLE_USER};
use crate::error::DomainError;

/// Account roles enumeration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    #[default]
    User,
    Admin,
}

impl AccountRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, AccountRole::Admin)
    }

    /// Check if this role satisfies a required role
    pub fn can_access(&self, required: AccountRole) -> bool {
        match self {
            AccountRole::Admin => true,
            AccountRole::User => required == AccountRole::User,
        }
    }

    /// Canonical string form, as stored and as carried in token claims
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountRole::Admin => ROLE_ADMIN,
            AccountRole::User => ROLE_USER,
        }
    }
}

/// Lenient conversion for trusted values (rows written by this service).
/// Unknown values fall back to the least privileged role.
impl From<&str> for AccountRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_ADMIN => AccountRole::Admin,
            _ => AccountRole::User,
        }
    }
}

/// Strict parsing for untrusted input.
impl FromStr for AccountRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(AccountRole::Admin),
            ROLE_USER => Ok(AccountRole::User),
            _ => Err(DomainError::validation(
                "Invalid role. Must be 'user' or 'admin'",
            )),
        }
    }
}

impl From<AccountRole> for String {
    fn from(role: AccountRole) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for AccountRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: AccountRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Check if account has admin role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Data for inserting a new account. The password is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password_hash: String,
    pub role: AccountRole,
}

/// Sparse partial update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<AccountRole>,
}

impl AccountPatch {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.role.is_none()
    }
}

/// Account response (safe to return to client)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AccountResponse {
    /// Unique account identifier
    pub id: i32,
    /// Unique username
    pub username: String,
    /// Given name
    pub first_name: Option<String>,
    /// Family name
    pub last_name: Option<String>,
    /// Unique email address
    pub email: String,
    /// Account role
    pub role: AccountRole,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            first_name: account.first_name,
            last_name: account.last_name,
            email: account.email,
            role: account.role,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}
