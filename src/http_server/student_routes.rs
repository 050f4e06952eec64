//! Student HTTP Routes
//!
//! - `POST /api/students` - create a student, answers `201 {"id": <id>}`
//! - `GET /api/students/:id` - fetch one student
//! - `GET /api/students` - list all students
//!
//! Handlers only translate between HTTP and [`Storage`]; they never look at
//! which backend is behind the trait object.
//!
//! [`Storage`]: crate::storage::Storage

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::{Validate, ValidationErrors};

use super::errors::{ApiError, ApiResult};
use crate::model::Student;
use crate::storage::SharedStorage;

// ==================
// Request/Response Types
// ==================

/// Body of `POST /api/students`.
///
/// Fields are optional so a missing field reaches validation instead of
/// failing deserialization. Zero age counts as missing.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct NewStudent {
    #[validate(required, length(min = 1))]
    pub name: Option<String>,

    #[validate(required, length(min = 1))]
    pub email: Option<String>,

    #[validate(required, range(min = 1))]
    pub age: Option<i32>,
}

impl NewStudent {
    /// Decode a raw request body
    pub fn from_body(body: &[u8]) -> ApiResult<Self> {
        if body.is_empty() {
            return Err(ApiError::EmptyBody);
        }
        serde_json::from_slice(body).map_err(|e| ApiError::InvalidBody(e.to_string()))
    }

    /// Validate and unwrap into `(name, email, age)`
    pub fn into_fields(self) -> ApiResult<(String, String, i32)> {
        let messages = self
            .validate()
            .err()
            .map(|errors| violations(&errors))
            .unwrap_or_default();

        match (self.name, self.email, self.age) {
            (Some(name), Some(email), Some(age)) if messages.is_empty() => Ok((name, email, age)),
            _ => Err(ApiError::Validation(messages)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: i64,
}

fn required_message(field: &str) -> String {
    format!("field {} is required", field)
}

// One message per offending field, sorted for stable output
fn violations(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .keys()
        .map(|field| required_message(field))
        .collect();
    messages.sort();
    messages
}

// ==================
// Student Routes
// ==================

/// Create student routes bound to `storage`
pub fn student_routes(storage: SharedStorage) -> Router {
    Router::new()
        .route(
            "/api/students",
            get(list_students_handler).post(create_student_handler),
        )
        .route("/api/students/:id", get(get_student_handler))
        .with_state(storage)
}

// ==================
// Handlers
// ==================

async fn create_student_handler(
    State(storage): State<SharedStorage>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let (name, email, age) = NewStudent::from_body(&body)?.into_fields()?;

    let id = storage.create_student(&name, &email, age).await?;
    info!(id, "student created");

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

async fn get_student_handler(
    State(storage): State<SharedStorage>,
    Path(id): Path<String>,
) -> ApiResult<Json<Student>> {
    let id: i64 = id.parse().map_err(|_| ApiError::InvalidId(id.clone()))?;

    let student = storage.get_student_by_id(id).await?;
    Ok(Json(student))
}

async fn list_students_handler(
    State(storage): State<SharedStorage>,
) -> ApiResult<Json<Vec<Student>>> {
    let students = storage.get_students().await?;
    Ok(Json(students))
}
