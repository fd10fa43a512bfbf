//! Storage module for persistent data storage
//!
//! SQLite persistence for vectors and the document registry, plus the
//! filesystem upload directory.

mod documents;
mod files;
mod vectors;

pub use documents::SqliteDocumentStore;
pub use files::{is_pdf, UploadStore};
pub use vectors::SqliteVectorStore;
