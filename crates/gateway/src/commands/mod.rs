//! Command implementations.

pub mod grant_admin;
pub mod migrate;
pub mod serve;
