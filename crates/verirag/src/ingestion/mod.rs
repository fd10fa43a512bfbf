//! Document ingestion: PDF extraction, chunking and the indexing pipeline

mod chunker;
mod pdf;
mod pipeline;

pub use chunker::TextChunker;
pub use pdf::{clean_page_text, PdfExtractor, PdfTextExtractor};
pub use pipeline::IngestionPipeline;
