//! Student storage
//!
//! A single capability interface, [`Storage`], implemented in full by every
//! backend. [`new`] picks the backend from `db.driver` and hands back a shared
//! trait object; the HTTP layer only ever sees that trait object.
//!
//! # Backends
//!
//! - `sqlite` - [`SqliteStorage`], a file (or in-memory) database
//! - `mysql` - [`MySqlStorage`], a server database created on first start
//!
//! Both pools are internally synchronized; no backend keeps any other
//! mutable state.

mod config;
mod errors;
mod mysql;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;

use crate::model::Student;

pub use config::{DbConfig, MYSQL_DEFAULT_PORT, MYSQL_DRIVER, SQLITE_DRIVER};
pub use errors::{Severity, StorageError, StorageResult};
pub use mysql::MySqlStorage;
pub use sqlite::SqliteStorage;

/// Student persistence operations
#[async_trait]
pub trait Storage: Send + Sync {
    /// Insert a student and return the id the database assigned
    async fn create_student(&self, name: &str, email: &str, age: i32) -> StorageResult<i64>;

    /// Fetch one student; [`StorageError::NotFound`] when no row has `id`
    async fn get_student_by_id(&self, id: i64) -> StorageResult<Student>;

    /// Fetch every student ordered by id (empty when the table is empty)
    async fn get_students(&self) -> StorageResult<Vec<Student>>;
}

/// Shared storage reference
pub type SharedStorage = Arc<dyn Storage>;

/// Construct the backend named by `config.driver`.
///
/// Any connection or schema failure is returned; callers must treat it as
/// fatal and not start serving.
pub async fn new(config: &DbConfig) -> StorageResult<SharedStorage> {
    config.validate()?;

    match config.driver.as_str() {
        SQLITE_DRIVER => Ok(Arc::new(SqliteStorage::connect(config).await?)),
        MYSQL_DRIVER => Ok(Arc::new(MySqlStorage::connect(config).await?)),
        other => Err(StorageError::UnknownDriver(other.to_string())),
    }
}
