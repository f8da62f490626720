//! Middleware for authentication and role checks.

mod auth;

pub use auth::{auth_middleware, require_role, role_middleware, CurrentAccount};
