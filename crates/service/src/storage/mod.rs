//! Storage abstractions for the service layer
//!
//! The grade document is always loaded and saved whole. Implementations keep
//! no state between calls beyond what is persisted.

pub mod json_file_store;
pub mod memory;

use async_trait::async_trait;
use models::GradeDocument;
use thiserror::Error;

pub use json_file_store::JsonFileStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The medium could not be read or written.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// The content could not be parsed as a grade document.
    #[error("corrupt document: {0}")]
    Corrupt(String),
}

/// Whole-document persistence for the grade collection.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn load(&self) -> Result<GradeDocument, StoreError>;
    async fn save(&self, document: &GradeDocument) -> Result<(), StoreError>;
}
