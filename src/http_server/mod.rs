//! # Students HTTP Server Module
//!
//! Axum server exposing the student endpoints.
//!
//! # Endpoints
//!
//! - `/` - Welcome text
//! - `/health` - Health check
//! - `/api/students` - Create and list students
//! - `/api/students/:id` - Fetch one student

pub mod config;
pub mod errors;
pub mod observability_routes;
pub mod server;
pub mod student_routes;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use server::{shutdown_signal, HttpServer};
pub use student_routes::{student_routes, CreatedResponse, NewStudent};
