//! Bidirectional codec between a [`Document`](crate::Document) and a
//! standalone markup + stylesheet pair.
//!
//! [`serialize`] wraps each page in `<div class="page-<n>">` and gives each
//! element an inline style plus a `#element-<id>` stylesheet rule.
//! [`parse`] reads that output back (or any reasonable hand-written HTML)
//! into an equivalent document with fresh element IDs.

mod markup;
mod parse;
mod serialize;
mod stylesheet;

use serde::{Deserialize, Serialize};

pub use parse::{parse, TRACKED_PROPERTIES};
pub use serialize::serialize;

/// Serialized form of a document, as handed to storage and the preview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkupBundle {
    /// Page wrappers and element tags.
    pub html: String,
    /// Page and element rules.
    pub css: String,
}

impl MarkupBundle {
    /// Parse this bundle back into a document.
    #[must_use]
    pub fn to_document(&self) -> crate::Document {
        parse(&self.html, &self.css)
    }
}
