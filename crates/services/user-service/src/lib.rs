//! User Service Library
//!
//! The account directory: the `users` table, its repository, and the
//! account administration use cases built on top of it.

pub mod infra;
pub mod repository;
pub mod service;

pub use infra::Database;
pub use repository::{AccountRepository, AccountStore};
pub use service::{UserManager, UserService};
