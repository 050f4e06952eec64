//! Student record
//!
//! The single entity persisted by every storage backend. `id` is assigned by
//! the database at insert time and never changes afterwards.

use serde::{Deserialize, Serialize};

/// A persisted student row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Student {
    /// Backend-assigned identifier (auto-increment / rowid)
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: i32,
}

impl Student {
    /// Column list shared by every backend's SELECT statements
    pub const COLUMNS: &'static str = "id, name, email, age";
}
