//! HTTP handlers.

pub mod branch_handler;
pub mod health_handler;
pub mod upload_handler;

pub use branch_handler::branch_routes;
pub use health_handler::health_routes;
pub use upload_handler::upload_routes;
