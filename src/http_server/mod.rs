//! # HTTP Server Module
//!
//! JSON API over the student store, built on axum.
//!
//! # Endpoints
//!
//! - `/api/health` - Liveness check
//! - `/api/students` - List and create
//! - `/api/students/:id` - Fetch, replace and delete

pub mod config;
pub mod envelope;
pub mod errors;
pub mod health_routes;
pub mod server;
pub mod student_routes;

pub use config::HttpServerConfig;
pub use envelope::Envelope;
pub use errors::{ApiError, ApiResult, Operation};
pub use server::HttpServer;
pub use student_routes::StudentState;
