//! Response helpers. Successful responses carry the payload itself, no envelope.

use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Acknowledgment returned by delete.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub ok: bool,
}

pub fn success<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::OK, Json(data))
}

pub fn success_many<T: Serialize>(data: Vec<T>) -> (StatusCode, Json<Vec<T>>) {
    (StatusCode::OK, Json(data))
}

pub fn acknowledged() -> (StatusCode, Json<Ack>) {
    (StatusCode::OK, Json(Ack { ok: true }))
}
