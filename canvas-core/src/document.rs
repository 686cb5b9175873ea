//! The document: an ordered, never-empty sequence of pages.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::{CanvasError, CanvasResult, ElementId, Page};

/// Ordered sequence of pages. Always holds at least one page, and element
/// IDs are unique across all of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "DocumentData")]
pub struct Document {
    pages: Vec<Page>,
}

#[derive(Deserialize)]
struct DocumentData {
    #[serde(default)]
    pages: Vec<Page>,
}

impl From<DocumentData> for Document {
    fn from(data: DocumentData) -> Self {
        Self::from_pages(data.pages)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Name given to the page at `index` (zero-based).
#[must_use]
pub fn page_name(index: usize) -> String {
    format!("Page {}", index + 1)
}

impl Document {
    /// Create a document with one empty page.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pages: vec![Page::new(page_name(0))],
        }
    }

    /// Build a document from pages.
    ///
    /// An empty list yields the default single page. Element IDs repeated
    /// across or within pages are regenerated so every ID stays unique.
    #[must_use]
    pub fn from_pages(pages: Vec<Page>) -> Self {
        if pages.is_empty() {
            return Self::new();
        }
        let mut doc = Self { pages };
        doc.ensure_unique_ids();
        doc
    }

    fn ensure_unique_ids(&mut self) {
        let mut seen: HashSet<ElementId> = HashSet::new();
        for page in &mut self.pages {
            page.regenerate_duplicate_ids(&mut seen);
        }
    }

    /// All pages in order.
    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub(crate) fn pages_mut(&mut self) -> &mut [Page] {
        &mut self.pages
    }

    /// Get a page by index.
    #[must_use]
    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// Get a mutable page by index.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::PageOutOfRange`] for a bad index.
    pub fn page_mut(&mut self, index: usize) -> Result<&mut Page, ValidationError> {
        let len = self.pages.len();
        self.pages
            .get_mut(index)
            .ok_or(ValidationError::PageOutOfRange { index, len })
    }

    /// Number of pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Append a page and return its index.
    pub fn push_page(&mut self, page: Page) -> usize {
        self.pages.push(page);
        self.pages.len() - 1
    }

    /// Remove a page.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::LastPage`] if it is the only page, or
    /// [`ValidationError::PageOutOfRange`] for a bad index.
    pub fn remove_page(&mut self, index: usize) -> Result<Page, ValidationError> {
        let len = self.pages.len();
        if index >= len {
            return Err(ValidationError::PageOutOfRange { index, len });
        }
        if len <= 1 {
            return Err(ValidationError::LastPage);
        }
        Ok(self.pages.remove(index))
    }

    /// Index of the page holding an element.
    #[must_use]
    pub fn page_of(&self, id: ElementId) -> Option<usize> {
        self.pages.iter().position(|p| p.contains(id))
    }

    /// Total number of elements across all pages.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.pages.iter().map(Page::element_count).sum()
    }

    /// Serialize the document to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CanvasResult<String> {
        serde_json::to_string(self).map_err(CanvasError::Serialization)
    }

    /// Deserialize a document from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        serde_json::from_str(json).map_err(CanvasError::Serialization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Element, ElementType};

    #[test]
    fn test_new_has_one_default_page() {
        let doc = Document::new();
        assert_eq!(doc.page_count(), 1);
        let page = doc.page(0).expect("page");
        assert_eq!(page.name, "Page 1");
        assert_eq!(page.background_color, "#ffffff");
        assert!(page.is_empty());
    }

    #[test]
    fn test_from_empty_pages_inserts_default() {
        let doc = Document::from_pages(Vec::new());
        assert_eq!(doc.page_count(), 1);
    }

    #[test]
    fn test_remove_last_page_rejected() {
        let mut doc = Document::new();
        assert_eq!(doc.remove_page(0), Err(ValidationError::LastPage));
        assert_eq!(doc.page_count(), 1);
    }

    #[test]
    fn test_remove_page_out_of_range() {
        let mut doc = Document::new();
        doc.push_page(Page::new(page_name(1)));
        assert_eq!(
            doc.remove_page(5),
            Err(ValidationError::PageOutOfRange { index: 5, len: 2 })
        );
    }

    #[test]
    fn test_duplicate_ids_regenerated() {
        let element = Element::new(ElementType::Text);
        let mut first = Page::new("Page 1");
        first.add_element(element.clone());
        let mut second = Page::new("Page 2");
        second.add_element(element.clone());
        second.add_element(element.clone());

        let doc = Document::from_pages(vec![first, second]);

        let ids: HashSet<_> = doc
            .pages()
            .iter()
            .flat_map(|p| p.elements().iter().map(|e| e.id))
            .collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(doc.page(0).and_then(|p| p.elements().first()).map(|e| e.id), Some(element.id));
    }

    #[test]
    fn test_json_round_trip() {
        let mut doc = Document::new();
        doc.page_mut(0)
            .expect("page")
            .add_element(Element::new(ElementType::Heading));

        let json = doc.to_json().expect("to_json");
        let back = Document::from_json(&json).expect("from_json");
        assert_eq!(back, doc);
    }

    #[test]
    fn test_json_without_pages_gets_default_page() {
        let doc = Document::from_json(r#"{"pages":[]}"#).expect("from_json");
        assert_eq!(doc.page_count(), 1);
    }

    #[test]
    fn test_json_geometry_clamped_before_serializing() {
        let json = format!(
            r##"{{"pages":[{{"id":"{}","name":"Page 1","backgroundColor":"#ffffff","elements":[
                {{"id":"{}","type":"button","content":"Go","position":{{"x":-50,"y":0}},"size":{{"width":1,"height":1}},"zIndex":1}}
            ]}}]}}"##,
            uuid::Uuid::new_v4(),
            uuid::Uuid::new_v4()
        );

        let doc = Document::from_json(&json).expect("from_json");
        let element = &doc.pages()[0].elements()[0];
        assert_eq!(element.position.x, 0.0);
        assert_eq!(element.size.width, crate::element::MIN_SIZE);

        let bundle = crate::serialize(&doc);
        assert!(!bundle.html.contains("left:-50px"));
        assert!(bundle.html.contains("left:0px; top:0px; width:10px; height:10px"));
    }
}
