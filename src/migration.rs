//! Startup DDL: create the database if missing, then the schema and students table.

use crate::error::{AppError, ConfigError};
use crate::sql::{qualified_table, quoted};
use crate::store::STUDENTS_TABLE;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

/// DDL for the students table. Idempotent.
pub fn students_table_ddl(schema: &str) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            matric_number TEXT PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT,
            password TEXT NOT NULL
        )
        "#,
        qualified_table(schema, STUDENTS_TABLE)
    )
}

/// Create `schema` if not exists, then the students table inside it.
pub async fn ensure_students_table(pool: &PgPool, schema: &str) -> Result<(), AppError> {
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quoted(schema)))
        .execute(pool)
        .await?;
    sqlx::query(&students_table_ddl(schema)).execute(pool).await?;
    tracing::info!(schema, "students table ready");
    Ok(())
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| ConfigError::Invalid {
            key: "DATABASE_URL",
            // The URL itself may carry credentials.
            value: e.to_string(),
            reason: "not a PostgreSQL connection URL",
        })?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quoted(&db_name)))
            .execute(&mut conn)
            .await?;
        tracing::info!(database = %db_name, "created database");
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), ConfigError> {
    let path_start = url.rfind('/').ok_or_else(|| ConfigError::Invalid {
        key: "DATABASE_URL",
        value: url.to_string(),
        reason: "expected a database name path",
    })? + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = format!("{}postgres", base);
    Ok((admin_url, db_name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_database_name() {
        let (admin, name) = parse_db_name_from_url("postgres://u:p@localhost:5432/students?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://u:p@localhost:5432/postgres");
        assert_eq!(name, "students");
    }

    #[test]
    fn url_without_path_is_a_config_error() {
        let err = parse_db_name_from_url("localhost").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DATABASE_URL", .. }));
        assert_eq!(
            AppError::from(err).status(),
            (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "config_error")
        );
    }

    #[tokio::test]
    async fn unparsable_url_is_a_config_error() {
        let err = ensure_database_exists("postgres://localhost:notaport/students").await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Config(ConfigError::Invalid { key: "DATABASE_URL", .. })
        ));
    }

    #[test]
    fn ddl_targets_schema_qualified_table() {
        let ddl = students_table_ddl("registry");
        assert!(ddl.contains("CREATE TABLE IF NOT EXISTS \"registry\".\"students\""));
        assert!(ddl.contains("matric_number TEXT PRIMARY KEY"));
        assert!(ddl.contains("email TEXT,"));
        assert!(ddl.contains("password TEXT NOT NULL"));
    }
}
