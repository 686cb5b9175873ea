//! Error types for canvas operations.

use thiserror::Error;

use crate::ElementId;

/// Result type for canvas operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// A rejected operation. The model is left untouched whenever one of these
/// is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Attempted to delete the only remaining page.
    #[error("Cannot delete the only page")]
    LastPage,

    /// Page index does not exist.
    #[error("Page index {index} out of range (document has {len} pages)")]
    PageOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of pages in the document.
        len: usize,
    },

    /// Element not found on the active page.
    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),

    /// Template name was empty or whitespace.
    #[error("Template name is required")]
    EmptyTemplateName,
}

/// Failure reported by the template storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// No template with that identifier.
    #[error("Template not found: {0}")]
    NotFound(String),

    /// The backend refused the request (bad input, quota, ...).
    #[error("Template rejected: {0}")]
    Rejected(String),

    /// Transport or storage failure.
    #[error("Storage backend failure: {0}")]
    Backend(String),
}

/// Errors that can occur in canvas operations.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// Operation rejected by model validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Storage collaborator failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Document JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
