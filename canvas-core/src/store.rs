//! Document store: the pages, the active page index, and the selection.
//!
//! Element operations on [`DocumentStore`] always target the active page.
//! Rejected operations are logged and returned as [`ValidationError`]s; the
//! model is left unchanged.

use crate::document::page_name;
use crate::error::ValidationError;
use crate::selection::Selection;
use crate::{Document, Element, ElementId, ElementPatch, ElementType, Page, Position};

/// Log a rejected operation and pass the result through.
fn reported<T>(op: &str, result: Result<T, ValidationError>) -> Result<T, ValidationError> {
    if let Err(err) = &result {
        tracing::warn!("{op} rejected: {err}");
    }
    result
}

/// In-memory editing state for one document.
///
/// # Example
///
/// ```
/// use canvas_core::{DocumentStore, ElementType, Position};
///
/// let mut store = DocumentStore::new();
/// let id = store.create_element(ElementType::Button, Position::new(50.0, 75.0));
/// assert_eq!(store.selection(), Some(id));
/// assert!(store.delete_page(0).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    pub(crate) document: Document,
    pub(crate) active: usize,
    pub(crate) selection: Option<Selection>,
}

impl DocumentStore {
    /// Create a store holding a fresh single-page document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store around an existing document.
    #[must_use]
    pub fn with_document(document: Document) -> Self {
        let mut store = Self::new();
        store.replace_document(document);
        store
    }

    /// Swap in a whole document (e.g. after a load). The first page becomes
    /// active and its first element, if any, is selected.
    pub fn replace_document(&mut self, document: Document) {
        self.document = document;
        self.active = 0;
        self.selection = self
            .active_page()
            .elements()
            .first()
            .map(|e| Selection::new(0, e.id));
        tracing::debug!(
            "Document replaced ({} pages, {} elements)",
            self.document.page_count(),
            self.document.element_count()
        );
    }

    /// The document being edited.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Consume the store, returning the document.
    #[must_use]
    pub fn into_document(self) -> Document {
        self.document
    }

    /// Index of the active page.
    #[must_use]
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// The active page.
    #[must_use]
    pub fn active_page(&self) -> &Page {
        // `active` is kept in range by every page operation.
        &self.document.pages()[self.active]
    }

    fn active_page_mut(&mut self) -> &mut Page {
        &mut self.document.pages_mut()[self.active]
    }

    // -----------------------------------------------------------------------
    // Pages
    // -----------------------------------------------------------------------

    /// Append an empty page named `Page <n>` and make it active.
    ///
    /// Returns the new page's index.
    pub fn add_page(&mut self) -> usize {
        let index = self
            .document
            .push_page(Page::new(page_name(self.document.page_count())));
        self.switch_to(index);
        tracing::debug!("Added page {}", index + 1);
        index
    }

    /// Delete a page.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::LastPage`] when only one page remains and
    /// [`ValidationError::PageOutOfRange`] for a bad index.
    pub fn delete_page(&mut self, index: usize) -> Result<(), ValidationError> {
        reported("delete_page", self.document.remove_page(index))?;
        if self.active >= index {
            self.active = self.active.saturating_sub(1);
        }
        self.selection = None;
        tracing::debug!("Deleted page {}", index + 1);
        Ok(())
    }

    /// Make another page active.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::PageOutOfRange`] for a bad index.
    pub fn switch_page(&mut self, index: usize) -> Result<(), ValidationError> {
        let len = self.document.page_count();
        if index >= len {
            return reported(
                "switch_page",
                Err(ValidationError::PageOutOfRange { index, len }),
            );
        }
        self.switch_to(index);
        Ok(())
    }

    fn switch_to(&mut self, index: usize) {
        if index != self.active {
            self.selection = None;
        }
        self.active = index;
    }

    /// Set the active page's background colour.
    pub fn set_page_background(&mut self, color: impl Into<String>) {
        let page = self.active_page_mut();
        page.background_color = color.into();
        tracing::debug!("Page background set to {}", page.background_color);
    }

    /// Remove every element from the active page and reset its background.
    pub fn clear_page(&mut self) {
        let page = self.active_page_mut();
        page.clear();
        page.background_color = crate::page::DEFAULT_BACKGROUND.to_string();
        self.selection = None;
        tracing::debug!("Cleared page {}", self.active + 1);
    }

    // -----------------------------------------------------------------------
    // Elements (active page)
    // -----------------------------------------------------------------------

    /// Get an element on the active page.
    #[must_use]
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.active_page().get_element(id)
    }

    /// Create an element from the default table and select it.
    pub fn create_element(&mut self, kind: ElementType, position: Position) -> ElementId {
        let id = self.active_page_mut().create_element(kind, position);
        self.selection = Some(Selection::new(self.active, id));
        id
    }

    /// Merge a partial patch into an element. `id` and `type` are preserved.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ElementNotFound`] if the element is not on
    /// the active page.
    pub fn update_element(
        &mut self,
        id: ElementId,
        patch: ElementPatch,
    ) -> Result<(), ValidationError> {
        reported("update_element", self.active_page_mut().update_element(id, patch))
    }

    /// Duplicate an element and select the copy.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ElementNotFound`] if the element is not on
    /// the active page.
    pub fn duplicate_element(&mut self, id: ElementId) -> Result<ElementId, ValidationError> {
        let copy = reported("duplicate_element", self.active_page_mut().duplicate_element(id))?;
        self.selection = Some(Selection::new(self.active, copy));
        Ok(copy)
    }

    /// Delete an element, clearing the selection if it pointed at it.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ElementNotFound`] if the element is not on
    /// the active page.
    pub fn delete_element(&mut self, id: ElementId) -> Result<Element, ValidationError> {
        let removed = reported("delete_element", self.active_page_mut().remove_element(id))?;
        if self.selection.is_some_and(|s| s.element() == id) {
            self.selection = None;
        }
        Ok(removed)
    }

    /// Raise an element above all others on the active page.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ElementNotFound`] if the element is not on
    /// the active page.
    pub fn bring_to_front(&mut self, id: ElementId) -> Result<i32, ValidationError> {
        reported("bring_to_front", self.active_page_mut().bring_to_front(id))
    }

    /// Lower an element below all others on the active page.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ElementNotFound`] if the element is not on
    /// the active page.
    pub fn send_to_back(&mut self, id: ElementId) -> Result<i32, ValidationError> {
        reported("send_to_back", self.active_page_mut().send_to_back(id))
    }

    /// Active page elements in paint order.
    #[must_use]
    pub fn paint_order(&self) -> Vec<&Element> {
        self.active_page().paint_order()
    }

    /// Topmost element of the active page under a point.
    #[must_use]
    pub fn element_at(&self, x: f64, y: f64) -> Option<ElementId> {
        self.active_page().element_at(x, y)
    }
}
