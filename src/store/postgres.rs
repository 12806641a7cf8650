//! PostgreSQL implementation of [`StudentStore`].

use super::StudentStore;
use crate::error::AppError;
use crate::schema::{FieldChange, Student, StudentFields};
use crate::sql::{self, QueryBuf};
use async_trait::async_trait;
use sqlx::error::ErrorKind;
use sqlx::postgres::{PgArguments, PgDatabaseError, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row};

pub const STUDENTS_TABLE: &str = "students";

#[derive(Clone)]
pub struct PgStudentStore {
    pool: PgPool,
    table: String,
}

impl PgStudentStore {
    /// Store over `"<schema>"."students"`. The table must already exist
    /// (see [`crate::migration::ensure_students_table`]).
    pub fn new(pool: PgPool, schema: &str) -> Self {
        PgStudentStore {
            pool,
            table: sql::qualified_table(schema, STUDENTS_TABLE),
        }
    }

    fn bind(q: &QueryBuf) -> Query<'_, Postgres, PgArguments> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.value.as_deref());
        }
        query
    }

    /// Turn constraint violations into client errors; everything else stays a database error.
    fn classify(err: sqlx::Error, matric_number: &str) -> AppError {
        if let Some(db) = err.as_database_error() {
            match db.kind() {
                ErrorKind::UniqueViolation => return AppError::duplicate_student(matric_number),
                ErrorKind::NotNullViolation => {
                    let column = db
                        .try_downcast_ref::<PgDatabaseError>()
                        .and_then(|pg| pg.column())
                        .unwrap_or("column")
                        .to_string();
                    return AppError::null_column(&column);
                }
                _ => {}
            }
        }
        AppError::Db(err)
    }
}

fn student_from_row(row: &PgRow) -> Result<Student, sqlx::Error> {
    Ok(Student {
        fields: StudentFields {
            matric_number: row.try_get("matric_number")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            email: row.try_get("email")?,
        },
        password: row.try_get("password")?,
    })
}

#[async_trait]
impl StudentStore for PgStudentStore {
    async fn create(&self, student: Student) -> Result<Student, AppError> {
        let q = sql::insert(&self.table, &student);
        let row = Self::bind(&q)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Self::classify(e, student.matric_number()))?;
        Ok(student_from_row(&row)?)
    }

    async fn list(&self) -> Result<Vec<Student>, AppError> {
        let q = sql::select_all(&self.table);
        let rows = Self::bind(&q).fetch_all(&self.pool).await?;
        let students = rows
            .iter()
            .map(student_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(students)
    }

    async fn get(&self, matric_number: &str) -> Result<Option<Student>, AppError> {
        let q = sql::select_by_key(&self.table, matric_number, false);
        let row = Self::bind(&q).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(student_from_row).transpose()?)
    }

    async fn update(
        &self,
        matric_number: &str,
        changes: &[FieldChange],
    ) -> Result<Option<Student>, AppError> {
        let mut tx = self.pool.begin().await?;
        let lock = sql::select_by_key(&self.table, matric_number, true);
        let Some(current) = Self::bind(&lock).fetch_optional(&mut *tx).await? else {
            // Dropping the transaction rolls it back.
            return Ok(None);
        };
        let row = if changes.is_empty() {
            current
        } else {
            let q = sql::update(&self.table, matric_number, changes);
            Self::bind(&q)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| Self::classify(e, matric_number))?
        };
        tx.commit().await?;
        Ok(Some(student_from_row(&row)?))
    }

    async fn delete(&self, matric_number: &str) -> Result<Option<Student>, AppError> {
        let q = sql::delete(&self.table, matric_number);
        let row = Self::bind(&q).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(student_from_row).transpose()?)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}
