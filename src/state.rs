//! Application context built once at startup and shared with every handler.

use crate::store::{MemoryStudentStore, StudentStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StudentStore>,
}

impl AppState {
    pub fn new<S: StudentStore + 'static>(store: S) -> Self {
        AppState {
            store: Arc::new(store),
        }
    }

    /// State over a fresh, empty in-process store.
    pub fn in_memory() -> Self {
        Self::new(MemoryStudentStore::new())
    }
}
