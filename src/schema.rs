//! Student entity and its three projections: creation input, read output, update input.
//!
//! All projections are built from one canonical field set, [`StudentFields`].
//! The stored [`Student`] is the only type that carries the password. It is
//! not `Serialize`, so it cannot end up in a response body.

use serde::{Deserialize, Deserializer, Serialize};

/// Base fields shared by every projection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentFields {
    pub matric_number: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Stored row. `password` holds the PHC hash string, never the plain text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Student {
    pub fields: StudentFields,
    pub password: String,
}

/// Creation view: base fields plus password.
#[derive(Clone, Debug, Deserialize)]
pub struct StudentCreate {
    #[serde(flatten)]
    pub fields: StudentFields,
    pub password: String,
}

/// Read view: base fields only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRead {
    #[serde(flatten)]
    pub fields: StudentFields,
}

/// A field of an update payload. `Missing` means the key was absent from the
/// payload; `Null` means the caller sent an explicit `null`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Patch<T> {
    Missing,
    Null,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Missing
    }
}

impl<T> Patch<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Patch::Missing)
    }

    /// `None` when missing, otherwise the value to write (`Some(None)` for null).
    pub fn into_write(self) -> Option<Option<T>> {
        match self {
            Patch::Missing => None,
            Patch::Null => Some(None),
            Patch::Value(v) => Some(Some(v)),
        }
    }
}

// Only called for keys present in the payload; absent keys fall back to
// `Default` through `#[serde(default)]`.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}

/// Update view: every mutable field optional. `matric_number` is the key and
/// cannot be changed; a `matric_number` key in the payload is ignored.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct StudentUpdate {
    #[serde(default)]
    pub first_name: Patch<String>,
    #[serde(default)]
    pub last_name: Patch<String>,
    #[serde(default)]
    pub email: Patch<String>,
    #[serde(default)]
    pub password: Patch<String>,
}

/// Columns of the students table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Column {
    MatricNumber,
    FirstName,
    LastName,
    Email,
    Password,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::MatricNumber,
        Column::FirstName,
        Column::LastName,
        Column::Email,
        Column::Password,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::MatricNumber => "matric_number",
            Column::FirstName => "first_name",
            Column::LastName => "last_name",
            Column::Email => "email",
            Column::Password => "password",
        }
    }

    pub fn is_secret(self) -> bool {
        matches!(self, Column::Password)
    }
}

/// One explicitly supplied field of a partial update. `value: None` is an explicit null.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldChange {
    pub column: Column,
    pub value: Option<String>,
}

impl StudentUpdate {
    /// The fields the caller actually sent, in column order.
    pub fn into_changes(self) -> Vec<FieldChange> {
        let supplied = [
            (Column::FirstName, self.first_name),
            (Column::LastName, self.last_name),
            (Column::Email, self.email),
            (Column::Password, self.password),
        ];
        supplied
            .into_iter()
            .filter_map(|(column, patch)| patch.into_write().map(|value| FieldChange { column, value }))
            .collect()
    }
}

impl StudentCreate {
    /// Build the stored entity, replacing the plain password with its hash.
    pub fn into_student(self, password_hash: String) -> Student {
        Student {
            fields: self.fields,
            password: password_hash,
        }
    }
}

impl Student {
    pub fn matric_number(&self) -> &str {
        &self.fields.matric_number
    }

    /// Overwrite one column. Nulls on non-nullable columns are refused the same
    /// way the database refuses them.
    pub fn apply(&mut self, change: &FieldChange) -> Result<(), crate::error::AppError> {
        let column = change.column;
        match (column, change.value.clone()) {
            (Column::Email, value) => self.fields.email = value,
            (_, None) => return Err(crate::error::AppError::null_column(column.name())),
            (Column::MatricNumber, Some(v)) => self.fields.matric_number = v,
            (Column::FirstName, Some(v)) => self.fields.first_name = v,
            (Column::LastName, Some(v)) => self.fields.last_name = v,
            (Column::Password, Some(v)) => self.password = v,
        }
        Ok(())
    }
}

impl From<Student> for StudentRead {
    fn from(student: Student) -> Self {
        StudentRead {
            fields: student.fields,
        }
    }
}
