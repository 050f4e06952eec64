//! SQLite backend
//!
//! Opens (and creates if missing) the database file named by
//! `db.storage_path` and makes sure the `students` table exists.

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use super::config::DbConfig;
use super::errors::{StorageError, StorageResult};
use super::Storage;
use crate::model::Student;

const IN_MEMORY_PATH: &str = ":memory:";

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS students (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT,
        email TEXT,
        age INTEGER
    )
"#;

/// SQLite storage
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Open the database at `config.storage_path` and ensure the schema
    pub async fn connect(config: &DbConfig) -> StorageResult<Self> {
        let pool = if config.storage_path == IN_MEMORY_PATH {
            Self::open_in_memory().await?
        } else {
            Self::open_file(Path::new(&config.storage_path)).await?
        };

        sqlx::query(CREATE_TABLE)
            .execute(&pool)
            .await
            .map_err(StorageError::schema("create table"))?;

        info!(path = %config.storage_path, "sqlite storage ready");

        Ok(Self { pool })
    }

    /// Fresh in-memory database
    pub async fn in_memory() -> StorageResult<Self> {
        Self::connect(&DbConfig::sqlite_in_memory()).await
    }

    async fn open_file(path: &Path) -> StorageResult<SqlitePool> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StorageError::StoragePath {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(StorageError::connection("open"))
    }

    // Every connection to ":memory:" is its own database, so the pool is pinned
    // to one connection that never expires.
    async fn open_in_memory() -> StorageResult<SqlitePool> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(StorageError::connection("open"))?;

        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(StorageError::connection("open"))
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn create_student(&self, name: &str, email: &str, age: i32) -> StorageResult<i64> {
        let result = sqlx::query("INSERT INTO students (name, email, age) VALUES (?, ?, ?)")
            .bind(name)
            .bind(email)
            .bind(age)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    async fn get_student_by_id(&self, id: i64) -> StorageResult<Student> {
        let sql = format!("SELECT {} FROM students WHERE id = ? LIMIT 1", Student::COLUMNS);

        sqlx::query_as::<_, Student>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::NotFound(id))
    }

    async fn get_students(&self) -> StorageResult<Vec<Student>> {
        let sql = format!("SELECT {} FROM students ORDER BY id", Student::COLUMNS);

        let students = sqlx::query_as::<_, Student>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(students)
    }
}
