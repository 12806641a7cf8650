//! In-process store. Holds the lock for the whole of each call, so every
//! operation is atomic with respect to the others.

use super::StudentStore;
use crate::error::AppError;
use crate::schema::{FieldChange, Student};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

#[derive(Default)]
pub struct MemoryStudentStore {
    rows: Mutex<BTreeMap<String, Student>>,
}

impl MemoryStudentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StudentStore for MemoryStudentStore {
    async fn create(&self, student: Student) -> Result<Student, AppError> {
        let mut rows = self.rows.lock().await;
        if rows.contains_key(student.matric_number()) {
            return Err(AppError::duplicate_student(student.matric_number()));
        }
        rows.insert(student.fields.matric_number.clone(), student.clone());
        Ok(student)
    }

    async fn list(&self) -> Result<Vec<Student>, AppError> {
        Ok(self.rows.lock().await.values().cloned().collect())
    }

    async fn get(&self, matric_number: &str) -> Result<Option<Student>, AppError> {
        Ok(self.rows.lock().await.get(matric_number).cloned())
    }

    async fn update(
        &self,
        matric_number: &str,
        changes: &[FieldChange],
    ) -> Result<Option<Student>, AppError> {
        let mut rows = self.rows.lock().await;
        let Some(current) = rows.get_mut(matric_number) else {
            return Ok(None);
        };
        // Apply to a copy so a refused change leaves the row untouched.
        let mut updated = current.clone();
        for change in changes {
            updated.apply(change)?;
        }
        *current = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, matric_number: &str) -> Result<Option<Student>, AppError> {
        Ok(self.rows.lock().await.remove(matric_number))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, StudentFields};

    fn student(matric: &str, first: &str) -> Student {
        Student {
            fields: StudentFields {
                matric_number: matric.into(),
                first_name: first.into(),
                last_name: "Odufuwa".into(),
                email: Some("adeboladuf@gmail.com".into()),
            },
            password: "hash".into(),
        }
    }

    #[tokio::test]
    async fn create_then_get() {
        let store = MemoryStudentStore::new();
        let created = store.create(student("21cg029882", "Adebola")).await.unwrap();
        let fetched = store.get("21cg029882").await.unwrap().unwrap();
        assert_eq!(created, fetched);
    }

    #[tokio::test]
    async fn duplicate_key_is_a_conflict_and_keeps_the_original() {
        let store = MemoryStudentStore::new();
        store.create(student("21cg029882", "Adebola")).await.unwrap();
        let err = store
            .create(student("21cg029882", "Someone"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        let kept = store.get("21cg029882").await.unwrap().unwrap();
        assert_eq!(kept.fields.first_name, "Adebola");
    }

    #[tokio::test]
    async fn list_is_ordered_by_key() {
        let store = MemoryStudentStore::new();
        store.create(student("21cg029883", "Oluwaferanmi")).await.unwrap();
        store.create(student("21cg029882", "Adebola")).await.unwrap();
        let keys: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.fields.matric_number)
            .collect();
        assert_eq!(keys, vec!["21cg029882", "21cg029883"]);
    }

    #[tokio::test]
    async fn update_changes_exactly_the_supplied_fields() {
        let store = MemoryStudentStore::new();
        let before = store.create(student("21cg029882", "Adebola")).await.unwrap();
        let changes = vec![FieldChange {
            column: Column::LastName,
            value: Some("Ade".into()),
        }];
        let after = store.update("21cg029882", &changes).await.unwrap().unwrap();
        assert_eq!(after.fields.last_name, "Ade");
        assert_eq!(after.fields.first_name, before.fields.first_name);
        assert_eq!(after.fields.email, before.fields.email);
        assert_eq!(after.password, before.password);
    }

    #[tokio::test]
    async fn refused_update_leaves_row_untouched() {
        let store = MemoryStudentStore::new();
        store.create(student("21cg029882", "Adebola")).await.unwrap();
        let changes = vec![
            FieldChange {
                column: Column::Email,
                value: None,
            },
            FieldChange {
                column: Column::FirstName,
                value: None,
            },
        ];
        let err = store.update("21cg029882", &changes).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let row = store.get("21cg029882").await.unwrap().unwrap();
        assert_eq!(row.fields.email.as_deref(), Some("adeboladuf@gmail.com"));
    }

    #[tokio::test]
    async fn missing_key_reports_absence() {
        let store = MemoryStudentStore::new();
        assert!(store.get("nope").await.unwrap().is_none());
        assert!(store.update("nope", &[]).await.unwrap().is_none());
        assert!(store.delete("nope").await.unwrap().is_none());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_is_final() {
        let store = MemoryStudentStore::new();
        store.create(student("21cg029882", "Adebola")).await.unwrap();
        let removed = store.delete("21cg029882").await.unwrap().unwrap();
        assert_eq!(removed.fields.first_name, "Adebola");
        assert!(store.get("21cg029882").await.unwrap().is_none());
    }
}
