//! Semantic checks applied after a payload has been deserialized into its view.

use crate::error::AppError;
use crate::schema::StudentCreate;

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a creation payload. Shape and required fields are already enforced by serde.
    pub fn validate_create(body: &StudentCreate) -> Result<(), AppError> {
        if body.fields.matric_number.trim().is_empty() {
            return Err(AppError::Validation("matric_number must not be blank".into()));
        }
        Ok(())
    }
}
