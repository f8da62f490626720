//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Account Roles
// =============================================================================

/// Default role assigned to new accounts
pub const ROLE_USER: &str = "user";

/// Administrator role with elevated privileges
pub const ROLE_ADMIN: &str = "admin";

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;

// =============================================================================
// Authentication
// =============================================================================

/// Session token lifetime in hours
pub const SESSION_TOKEN_HOURS: i64 = 24;

/// Refresh token lifetime in hours (7 days)
pub const REFRESH_TOKEN_HOURS: i64 = 24 * 7;

/// Marker carried in the `type` claim of refresh tokens
pub const REFRESH_TOKEN_TYPE: &str = "refresh";

/// Minimum JWT secret length before a startup warning is logged
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Authorization header prefix for Bearer tokens
pub const BEARER_TOKEN_PREFIX: &str = "Bearer ";
