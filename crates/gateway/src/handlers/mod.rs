//! HTTP request handlers.

pub mod auth_handler;
pub mod health_handler;
pub mod user_handler;

pub use auth_handler::{auth_routes, logout};
pub use health_handler::health_check;
pub use user_handler::{profile, user_routes};
