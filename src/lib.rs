//! Student registry: CRUD over student records stored in PostgreSQL.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod password;
pub mod response;
pub mod routes;
pub mod schema;
pub mod sql;
pub mod state;
pub mod store;
pub mod validation;

pub use config::{ServerConfig, StoreKind};
pub use error::{AppError, ConfigError};
pub use migration::{ensure_database_exists, ensure_students_table};
pub use routes::{app, common_routes, student_routes};
pub use schema::{Patch, Student, StudentCreate, StudentFields, StudentRead, StudentUpdate};
pub use state::AppState;
pub use store::{MemoryStudentStore, PgStudentStore, StudentStore};
