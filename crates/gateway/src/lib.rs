//! Account API Gateway Library
//!
//! The HTTP surface of the account service: router, bearer-token
//! middleware, handlers, OpenAPI docs and the CLI commands.

pub mod cli;
pub mod commands;
pub mod config;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use config::GatewayConfig;
pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
