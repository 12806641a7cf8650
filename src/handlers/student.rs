//! Student handlers: create, list, read, update, delete.
//!
//! Each handler makes exactly one gateway call. Responses always carry the
//! read view, so the stored password hash never leaves the process.

use crate::error::AppError;
use crate::extractors::ValidatedJson;
use crate::password::hash_password_async;
use crate::response::{acknowledged, success, success_many};
use crate::schema::{Patch, StudentCreate, StudentRead, StudentUpdate};
use crate::state::AppState;
use crate::validation::RequestValidator;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};

pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<StudentCreate>,
) -> Result<impl IntoResponse, AppError> {
    RequestValidator::validate_create(&body)?;
    let hash = hash_password_async(body.password.clone()).await?;
    let student = state.store.create(body.into_student(hash)).await?;
    tracing::info!(matric_number = %student.matric_number(), "student created");
    Ok(success(StudentRead::from(student)))
}

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let students = state.store.list().await?;
    Ok(success_many(
        students.into_iter().map(StudentRead::from).collect(),
    ))
}

pub async fn read(
    State(state): State<AppState>,
    Path(matric_number): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let student = state
        .store
        .get(&matric_number)
        .await?
        .ok_or_else(AppError::student_not_found)?;
    Ok(success(StudentRead::from(student)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(matric_number): Path<String>,
    ValidatedJson(body): ValidatedJson<StudentUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let password = match body.password {
        Patch::Value(p) => Patch::Value(hash_password_async(p).await?),
        other => other,
    };
    let body = StudentUpdate { password, ..body };
    let changes = body.into_changes();
    let student = state
        .store
        .update(&matric_number, &changes)
        .await?
        .ok_or_else(AppError::student_not_found)?;
    tracing::info!(%matric_number, fields = changes.len(), "student updated");
    Ok(success(StudentRead::from(student)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(matric_number): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state
        .store
        .delete(&matric_number)
        .await?
        .ok_or_else(AppError::student_not_found)?;
    tracing::info!(%matric_number, "student deleted");
    Ok(acknowledged())
}
