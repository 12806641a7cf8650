//! Student CRUD routes.

use crate::handlers::student::{create, delete as delete_handler, list, read, update};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

pub fn student_routes(state: AppState) -> Router {
    Router::new()
        .route("/student", post(create))
        .route("/students", get(list))
        .route(
            "/students/:matric_number",
            get(read).patch(update).delete(delete_handler),
        )
        .with_state(state)
}
