//! HTTP handlers for student records.

pub mod student;
pub use student::*;
