//! Document metadata store trait

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::types::SourceDocument;

/// Trait for the `{id, title, file_path, processed}` document registry
///
/// Implementations:
/// - `SqliteDocumentStore`: SQLite table
#[async_trait]
pub trait DocumentStoreProvider: Send + Sync {
    /// Register a new document
    async fn create(&self, document: &SourceDocument) -> Result<()>;

    /// Look up a document by ID
    async fn get(&self, id: &Uuid) -> Result<Option<SourceDocument>>;

    /// Flag a document as indexed; `NotFound` if it does not exist
    async fn mark_processed(&self, id: &Uuid) -> Result<()>;

    /// All documents, oldest first
    async fn list(&self) -> Result<Vec<SourceDocument>>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
