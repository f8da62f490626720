//! Common utilities shared across all service crates.
//!
//! This crate provides:
//! - Unified error handling mapped to HTTP responses
//! - Token validation failure kinds
//! - Configuration structures loaded from the environment
//! - The success response envelope

pub mod config;
pub mod error;
pub mod response;

pub use config::*;
pub use error::{AppError, AppResult, OptionExt, TokenError};
pub use response::{ApiResponse, Created};
