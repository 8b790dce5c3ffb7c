use std::path::PathBuf;

use async_trait::async_trait;
use models::GradeDocument;
use tokio::fs;
use tracing::{debug, info};

use super::{DocumentStore, StoreError};

/// Grade document persisted as one pretty-printed JSON file.
///
/// Every `load` reads the file again and every `save` overwrites it in full.
/// There is no lock here: two stores pointed at the same path race, and the
/// last writer wins. Serialization of writers is the service's job.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    file_path: PathBuf,
}

impl JsonFileStore {
    /// Point a store at `path` without touching the filesystem.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { file_path: path.into() }
    }

    /// Open the store, creating the parent directory and seeding an empty
    /// document (`nextId: 1`) when the file is missing.
    pub async fn open_or_create<P: Into<PathBuf>>(path: P) -> Result<Self, StoreError> {
        let store = Self::new(path);
        if let Some(parent) = store.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| StoreError::Unavailable(e.to_string()))?;
            }
        }
        if fs::metadata(&store.file_path).await.is_err() {
            store.save(&GradeDocument::default()).await?;
            info!(path = %store.file_path.display(), "seeded empty grades document");
        }
        Ok(store)
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn load(&self) -> Result<GradeDocument, StoreError> {
        let bytes = fs::read(&self.file_path)
            .await
            .map_err(|e| StoreError::Unavailable(format!("{}: {}", self.file_path.display(), e)))?;
        let doc: GradeDocument = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Corrupt(format!("{}: {}", self.file_path.display(), e)))?;
        debug!(records = doc.grades.len(), next_id = doc.next_id, "grades document loaded");
        Ok(doc)
    }

    async fn save(&self, document: &GradeDocument) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(document).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        fs::write(&self.file_path, data)
            .await
            .map_err(|e| StoreError::Unavailable(format!("{}: {}", self.file_path.display(), e)))?;
        debug!(records = document.grades.len(), next_id = document.next_id, "grades document saved");
        Ok(())
    }
}
