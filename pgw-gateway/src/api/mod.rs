//! HTTP API handlers for pgw-gateway

pub mod assets;
pub mod auth;
pub mod health;
pub mod logging;

pub use assets::{delete_assets, get_assets};
pub use auth::auth_middleware;
pub use health::health_routes;
pub use logging::{request_logging, REQUEST_ID_HEADER};
