//! Auth Service Library
//!
//! Credential verification and stateless session tokens: signup, login and
//! refresh on top of the account directory, plus the HS256 token service
//! the HTTP access filter validates against.

pub mod service;
pub mod token;

pub use service::{AuthService, AuthSession, Authenticator, Registration};
pub use token::{RefreshClaims, SessionClaims, TokenService};
