pub mod attribute;
pub mod document;
pub mod types;

pub use document::{document_name, extract_schema, process_document, DocumentOutcome, PageLayout};
