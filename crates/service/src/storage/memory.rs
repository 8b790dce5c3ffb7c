use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use models::GradeDocument;
use tokio::sync::RwLock;

use super::{DocumentStore, StoreError};

/// In-memory document store for tests and ephemeral runs.
///
/// `load` hands out a clone, so callers never share the stored document, the
/// same as reading a file would. Failures can be switched on to exercise the
/// storage error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    doc: RwLock<GradeDocument>,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(doc: GradeDocument) -> Self {
        Self { doc: RwLock::new(doc), ..Self::default() }
    }

    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Current persisted document, bypassing failure switches.
    pub async fn snapshot(&self) -> GradeDocument {
        self.doc.read().await.clone()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn load(&self) -> Result<GradeDocument, StoreError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store: load disabled".into()));
        }
        Ok(self.doc.read().await.clone())
    }

    async fn save(&self, document: &GradeDocument) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store: save disabled".into()));
        }
        *self.doc.write().await = document.clone();
        Ok(())
    }
}
