//! Persistence gateway for student rows.
//!
//! Every operation is atomic on its own: no caller can observe a half-applied
//! update or delete. Absence of a key is reported as `Ok(None)`, never as an error.

mod memory;
mod postgres;

pub use memory::MemoryStudentStore;
pub use postgres::{PgStudentStore, STUDENTS_TABLE};

use crate::error::AppError;
use crate::schema::{FieldChange, Student};
use async_trait::async_trait;

#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Insert a new row. Fails with `AppError::Conflict` when the key already exists.
    async fn create(&self, student: Student) -> Result<Student, AppError>;

    /// All rows ordered by matric number.
    async fn list(&self) -> Result<Vec<Student>, AppError>;

    async fn get(&self, matric_number: &str) -> Result<Option<Student>, AppError>;

    /// Apply only the given changes. Returns `None` when the key does not exist.
    async fn update(
        &self,
        matric_number: &str,
        changes: &[FieldChange],
    ) -> Result<Option<Student>, AppError>;

    /// Remove a row and return what was removed.
    async fn delete(&self, matric_number: &str) -> Result<Option<Student>, AppError>;

    /// Readiness probe of the backing store.
    async fn ping(&self) -> Result<(), AppError>;
}
