//! Parameterized SQL for the students table.

mod builder;

pub use builder::*;
