use crate::document::DocumentId;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Registry has no documents")]
    Empty,

    #[error("Document id must not be empty")]
    EmptyId,

    #[error("Duplicate document id: {0}")]
    DuplicateId(DocumentId),

    #[error("Evidence '{label}' in document {document} has invalid page {page}")]
    InvalidPage {
        document: DocumentId,
        label: String,
        page: u32,
    },

    #[error("Evidence '{label}' in document {document} has invalid rect: {reason}")]
    InvalidRect {
        document: DocumentId,
        label: String,
        reason: String,
    },

    #[error("Invalid option {name}: {reason}")]
    InvalidOption { name: &'static str, reason: String },
}

#[derive(Error, Debug, PartialEq)]
pub enum ViewerError {
    #[error("Unknown document: {0}")]
    UnknownDocument(DocumentId),

    #[error("Document {document} has no evidence at index {index}")]
    UnknownEvidence { document: DocumentId, index: usize },

    #[error("No document is active")]
    NoActiveDocument,

    #[error("Page numbers start at 1, got {0}")]
    InvalidPage(u32),

    #[error("Page {page} is out of range (document has {page_count} pages)")]
    PageOutOfRange { page: u32, page_count: u32 },
}
