//! Student HTTP Routes
//!
//! CRUD endpoints over the record store, mounted under `/api`:
//!
//! - `GET    /students`     list, newest first
//! - `GET    /students/:id` fetch one
//! - `POST   /students`     create
//! - `PUT    /students/:id` full update
//! - `DELETE /students/:id` delete

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use super::envelope::Envelope;
use super::errors::{method_not_allowed, ApiError, ApiResult, Operation};
use crate::store::{StoreError, StoreResult, StudentStore};
use crate::student::{Student, StudentId, StudentInput};

// ==================
// Shared State
// ==================

/// Store handle shared across handlers
pub struct StudentState {
    pub store: Arc<dyn StudentStore>,
}

impl StudentState {
    pub fn new(store: Arc<dyn StudentStore>) -> Self {
        Self { store }
    }

    /// Runs a store call on the blocking pool; file-backed writes fsync.
    async fn run<T, F>(&self, operation: Operation, call: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn StudentStore) -> StoreResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let result = tokio::task::spawn_blocking(move || call(store.as_ref()))
            .await
            .map_err(|e| {
                tracing::error!(?operation, error = %e, "store task failed");
                ApiError::Internal(operation)
            })?;

        result.map_err(|e: StoreError| ApiError::from_store(operation, e))
    }
}

// ==================
// Student Routes
// ==================

pub fn student_routes(state: Arc<StudentState>) -> Router {
    Router::new()
        .route(
            "/students",
            get(list_students_handler)
                .post(create_student_handler)
                .fallback(method_not_allowed),
        )
        .route(
            "/students/:id",
            get(get_student_handler)
                .put(update_student_handler)
                .delete(delete_student_handler)
                .fallback(method_not_allowed),
        )
        .with_state(state)
}

fn parse_body(body: Result<Json<StudentInput>, JsonRejection>) -> ApiResult<StudentInput> {
    body.map(|Json(input)| input)
        .map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))
}

// ==================
// Handlers
// ==================

async fn list_students_handler(
    State(state): State<Arc<StudentState>>,
) -> ApiResult<Json<Envelope<Vec<Student>>>> {
    let students = state.run(Operation::List, |store| store.list_all()).await?;
    Ok(Json(Envelope::list(students)))
}

async fn get_student_handler(
    State(state): State<Arc<StudentState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<Student>>> {
    let id = StudentId::parse(&id)?;
    let student = state
        .run(Operation::Get, move |store| store.get_by_id(&id))
        .await?;
    Ok(Json(Envelope::data(student)))
}

async fn create_student_handler(
    State(state): State<Arc<StudentState>>,
    body: Result<Json<StudentInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Envelope<Student>>)> {
    let input = parse_body(body)?;
    let student = state
        .run(Operation::Create, move |store| store.insert(&input))
        .await?;

    tracing::info!(student_id = %student.id, "student created");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::data_with_message(
            student,
            "Student created successfully",
        )),
    ))
}

async fn update_student_handler(
    State(state): State<Arc<StudentState>>,
    Path(id): Path<String>,
    body: Result<Json<StudentInput>, JsonRejection>,
) -> ApiResult<Json<Envelope<Student>>> {
    let id = StudentId::parse(&id)?;
    let input = parse_body(body)?;
    let student = state
        .run(Operation::Update, move |store| store.update_by_id(&id, &input))
        .await?;

    tracing::info!(student_id = %id, "student updated");
    Ok(Json(Envelope::data_with_message(
        student,
        "Student updated successfully",
    )))
}

async fn delete_student_handler(
    State(state): State<Arc<StudentState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<Student>>> {
    let id = StudentId::parse(&id)?;
    let student = state
        .run(Operation::Delete, move |store| store.delete_by_id(&id))
        .await?;

    tracing::info!(student_id = %id, "student deleted");
    Ok(Json(Envelope::data_with_message(
        student,
        "Student deleted successfully",
    )))
}
