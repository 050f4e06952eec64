//! MySQL backend
//!
//! Construction runs in two phases:
//!
//! 1. Connect to the server without selecting a database, ping it and run
//!    `CREATE DATABASE IF NOT EXISTS <name>`, then close that connection.
//! 2. Open a pool bound to `<name>`, ping it and create the `students` table.
//!
//! Each step fails with its own stage label. A failure in phase 2 leaves the
//! database from phase 1 in place; that is reported, never hidden.

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlPool, MySqlPoolOptions};
use sqlx::Connection;
use tracing::{error, info};

use super::config::DbConfig;
use super::errors::{StorageError, StorageResult};
use super::Storage;
use crate::model::Student;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS students (
        id INT AUTO_INCREMENT PRIMARY KEY,
        name VARCHAR(255),
        email VARCHAR(255),
        age INT
    )
"#;

/// MySQL storage
#[derive(Debug, Clone)]
pub struct MySqlStorage {
    pool: MySqlPool,
}

impl MySqlStorage {
    /// Create the database if needed, then connect to it and ensure the schema
    pub async fn connect(config: &DbConfig) -> StorageResult<Self> {
        let server = server_options(config)?;

        Self::ensure_database(&server, &config.name).await?;

        let pool = MySqlPoolOptions::new()
            .connect_with(server.database(&config.name))
            .await
            .map_err(StorageError::connection("reconnect"))?;

        pool.acquire()
            .await
            .map_err(StorageError::connection("reconnect"))?
            .ping()
            .await
            .map_err(StorageError::connection("ping database"))?;

        if let Err(source) = sqlx::query(CREATE_TABLE).execute(&pool).await {
            error!(
                database = %config.name,
                error = %source,
                "students table creation failed; database was created and left in place"
            );
            return Err(StorageError::Schema {
                stage: "create table",
                source,
            });
        }

        info!(host = %config.host, database = %config.name, "mysql storage ready");

        Ok(Self { pool })
    }

    async fn ensure_database(server: &MySqlConnectOptions, name: &str) -> StorageResult<()> {
        let mut conn = MySqlConnection::connect_with(server)
            .await
            .map_err(StorageError::connection("connect"))?;

        conn.ping()
            .await
            .map_err(StorageError::connection("ping server"))?;

        // `name` was checked to be a plain identifier by DbConfig::validate
        let create_database = format!("CREATE DATABASE IF NOT EXISTS `{}`", name);
        sqlx::query(&create_database)
            .execute(&mut conn)
            .await
            .map_err(StorageError::schema("create database"))?;

        conn.close()
            .await
            .map_err(StorageError::connection("close server connection"))
    }
}

/// Connection options for the server, without a database selected
fn server_options(config: &DbConfig) -> StorageResult<MySqlConnectOptions> {
    let (host, port) = config.mysql_host_port()?;

    let mut options = MySqlConnectOptions::new()
        .host(host)
        .port(port)
        .username(&config.user);
    if !config.password.is_empty() {
        options = options.password(&config.password);
    }

    Ok(options)
}

#[async_trait]
impl Storage for MySqlStorage {
    async fn create_student(&self, name: &str, email: &str, age: i32) -> StorageResult<i64> {
        let result = sqlx::query("INSERT INTO students (name, email, age) VALUES (?, ?, ?)")
            .bind(name)
            .bind(email)
            .bind(age)
            .execute(&self.pool)
            .await?;

        i64::try_from(result.last_insert_id()).map_err(|_| {
            StorageError::Query(sqlx::Error::Protocol(format!(
                "insert id {} out of range",
                result.last_insert_id()
            )))
        })
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
