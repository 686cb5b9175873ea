//! Selection bridge between the store and the property panel.
//!
//! The panel only ever edits the selected element. Every call here is a
//! no-op returning `None` when nothing is selected.

use crate::{DocumentStore, Element, ElementId, ElementPatch, ValidationError};

/// The element currently targeted by the property panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    page: usize,
    element: ElementId,
}

impl Selection {
    pub(crate) fn new(page: usize, element: ElementId) -> Self {
        Self { page, element }
    }

    /// Index of the page the element lives on.
    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    /// The selected element's ID.
    #[must_use]
    pub fn element(&self) -> ElementId {
        self.element
    }
}

impl DocumentStore {
    /// Select an element on the active page.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ElementNotFound`] if the element is not on
    /// the active page; the previous selection is kept.
    pub fn select(&mut self, id: ElementId) -> Result<(), ValidationError> {
        if !self.active_page().contains(id) {
            tracing::warn!("select rejected: element {id} not on active page");
            return Err(ValidationError::ElementNotFound(id));
        }
        self.selection = Some(Selection::new(self.active, id));
        Ok(())
    }

    /// Drop the selection.
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// ID of the selected element.
    #[must_use]
    pub fn selection(&self) -> Option<ElementId> {
        self.selection.map(|s| s.element())
    }

    /// The selected element, as shown in the property panel.
    #[must_use]
    pub fn selected_element(&self) -> Option<&Element> {
        let selection = self.selection?;
        self.document
            .page(selection.page())?
            .get_element(selection.element())
    }

    /// Apply a property-panel edit to the selected element.
    ///
    /// Returns the ID of the element that was patched.
    pub fn update_selected(&mut self, patch: ElementPatch) -> Option<ElementId> {
        let id = self.selection()?;
        self.update_element(id, patch).ok().map(|()| id)
    }

    /// Delete the selected element.
    pub fn delete_selected(&mut self) -> Option<Element> {
        let id = self.selection()?;
        self.delete_element(id).ok()
    }

    /// Duplicate the selected element; the copy becomes the selection.
    pub fn duplicate_selected(&mut self) -> Option<ElementId> {
        let id = self.selection()?;
        self.duplicate_element(id).ok()
    }
}
