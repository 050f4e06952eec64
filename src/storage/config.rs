//! Database Configuration
//!
//! The `db` section of the service config. Which fields matter depends on
//! `driver`: SQLite reads `storage_path`, MySQL reads the server fields.

use serde::{Deserialize, Serialize};

use super::errors::{StorageError, StorageResult};

/// Driver name selecting the SQLite backend
pub const SQLITE_DRIVER: &str = "sqlite";

/// Driver name selecting the MySQL backend
pub const MYSQL_DRIVER: &str = "mysql";

/// Default MySQL port when `host` carries none
pub const MYSQL_DEFAULT_PORT: u16 = 3306;

/// Database configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbConfig {
    /// Backend selector: "sqlite" or "mysql"
    #[serde(default)]
    pub driver: String,

    /// SQLite database file (":memory:" for an in-memory database)
    #[serde(default)]
    pub storage_path: String,

    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub password: String,

    /// MySQL server as "host" or "host:port"
    #[serde(default)]
    pub host: String,

    /// MySQL database name, created on startup if missing
    #[serde(default)]
    pub name: String,
}

impl DbConfig {
    /// SQLite config for the given database file
    pub fn sqlite(storage_path: impl Into<String>) -> Self {
        Self {
            driver: SQLITE_DRIVER.to_string(),
            storage_path: storage_path.into(),
            ..Default::default()
        }
    }

    /// In-memory SQLite config
    pub fn sqlite_in_memory() -> Self {
        Self::sqlite(":memory:")
    }

    /// Label used in startup logs: `<driver>:<database>`
    pub fn connected_db(&self) -> String {
        match self.driver.as_str() {
            SQLITE_DRIVER => format!("{}:{}", self.driver, self.storage_path),
            _ => format!("{}:{}", self.driver, self.name),
        }
    }

    /// Check the fields the selected driver needs.
    ///
    /// Unknown drivers pass here and are rejected by [`super::new`].
    pub fn validate(&self) -> StorageResult<()> {
        match self.driver.as_str() {
            "" => Err(StorageError::InvalidConfig("db.driver is required".to_string())),
            SQLITE_DRIVER => {
                if self.storage_path.is_empty() {
                    return Err(StorageError::InvalidConfig(
                        "db.storage_path is required for sqlite".to_string(),
                    ));
                }
                Ok(())
            }
            MYSQL_DRIVER => {
                for (field, value) in [
                    ("db.host", &self.host),
                    ("db.user", &self.user),
                    ("db.name", &self.name),
                ] {
                    if value.is_empty() {
                        return Err(StorageError::InvalidConfig(format!(
                            "{} is required for mysql",
                            field
                        )));
                    }
                }
                // The name is spliced into CREATE DATABASE, which cannot take a bind parameter
                if !is_plain_identifier(&self.name) {
                    return Err(StorageError::InvalidConfig(format!(
                        "db.name '{}' must contain only letters, digits, '_' or '$'",
                        self.name
                    )));
                }
                self.mysql_host_port().map(|_| ())
            }
            _ => Ok(()),
        }
    }

    /// Split `host` into host name and port.
    ///
    /// IPv6 literals take the bracketed form (`[::1]:3306`); the brackets are
    /// stripped from the returned host.
    pub fn mysql_host_port(&self) -> StorageResult<(&str, u16)> {
        let invalid = || StorageError::InvalidConfig(format!("invalid db.host '{}'", self.host));

        let (host, port) = match self.host.strip_prefix('[') {
            Some(bracketed) => {
                let (host, rest) = bracketed.split_once(']').ok_or_else(invalid)?;
                match rest {
                    "" => (host, None),
                    _ => (host, Some(rest.strip_prefix(':').ok_or_else(invalid)?)),
                }
            }
            // A bare IPv6 literal has no room for a port
            None if self.host.matches(':').count() > 1 => (self.host.as_str(), None),
            None => match self.host.rsplit_once(':') {
                Some((host, port)) => (host, Some(port)),
                None => (self.host.as_str(), None),
            },
        };

        if host.is_empty() {
            return Err(invalid());
        }

        let port = match port {
            Some(port) => port.parse::<u16>().map_err(|_| {
                StorageError::InvalidConfig(format!("invalid port in db.host '{}'", self.host))
            })?,
            None => MYSQL_DEFAULT_PORT,
        };

        Ok((host, port))
    }
}

fn is_plain_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
