//! students-api - CRUD HTTP service for student records
//!
//! Storage is pluggable (SQLite or MySQL) behind a single trait.

pub mod cli;
pub mod config;
pub mod http_server;
pub mod model;
pub mod observability;
pub mod storage;
