//! Pages: flat, z-ordered element lists with their own background.
//!
//! Every element operation here is scoped to one page, so callers choose
//! the page explicitly and the operations stay independently testable.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::element::DUPLICATE_OFFSET;
use crate::error::ValidationError;
use crate::{Element, ElementId, ElementPatch, ElementType, Position};

/// Background colour of a new page.
pub const DEFAULT_BACKGROUND: &str = "#ffffff";

/// Minimum rendered page height, in pixels.
pub const PAGE_MIN_HEIGHT: f64 = 800.0;

/// Unique identifier for a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageId(Uuid);

impl PageId {
    /// Create a new unique page ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named canvas holding an ordered element list.
///
/// List order is insertion order and is what the serializer emits;
/// `z_index` only decides paint order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Unique identifier.
    pub id: PageId,
    /// Display name, e.g. `Page 1`.
    pub name: String,
    #[serde(default)]
    elements: Vec<Element>,
    /// CSS colour painted behind the elements.
    pub background_color: String,
}

impl Page {
    /// Create an empty page with the default background.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PageId::new(),
            name: name.into(),
            elements: Vec::new(),
            background_color: DEFAULT_BACKGROUND.to_string(),
        }
    }

    /// Set the background colour.
    #[must_use]
    pub fn with_background(mut self, color: impl Into<String>) -> Self {
        self.background_color = color.into();
        self
    }

    /// Elements in list (insertion) order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Get an element by ID.
    #[must_use]
    pub fn get_element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    fn get_element_mut(&mut self, id: ElementId) -> Result<&mut Element, ValidationError> {
        self.elements
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(ValidationError::ElementNotFound(id))
    }

    /// Whether the page holds this element.
    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.get_element(id).is_some()
    }

    /// Number of elements on the page.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Check if the page is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Highest z-index on the page.
    #[must_use]
    pub fn max_z_index(&self) -> Option<i32> {
        self.elements.iter().map(|e| e.z_index).max()
    }

    /// Lowest z-index on the page.
    #[must_use]
    pub fn min_z_index(&self) -> Option<i32> {
        self.elements.iter().map(|e| e.z_index).min()
    }

    /// Claim a z-index above every element: one above the current maximum,
    /// or 1 on an empty page. At the top of the `i32` range the page is
    /// renumbered first.
    fn claim_top_z(&mut self) -> i32 {
        match self.max_z_index() {
            None => 1,
            Some(max) => max
                .checked_add(1)
                .unwrap_or_else(|| self.compact_z_indices().saturating_add(1)),
        }
    }

    /// Claim a z-index below every element: one below the current minimum.
    /// At the bottom of the `i32` range the page is renumbered first.
    fn claim_bottom_z(&mut self) -> i32 {
        match self.min_z_index() {
            None => 0,
            Some(min) => min.checked_sub(1).unwrap_or_else(|| {
                self.compact_z_indices();
                0
            }),
        }
    }

    /// Renumber z-indices as 1, 2, 3... in paint order, so paint order is
    /// unchanged. Returns the new maximum.
    fn compact_z_indices(&mut self) -> i32 {
        let mut order: Vec<usize> = (0..self.elements.len()).collect();
        order.sort_by_key(|&idx| self.elements[idx].z_index);
        let mut z = 0_i32;
        for idx in order {
            z = z.saturating_add(1);
            self.elements[idx].z_index = z;
        }
        tracing::debug!("Renumbered z-indices on page {} (max {z})", self.id);
        z
    }

    /// Append an element. Its position and size are clamped; everything
    /// else is kept as given.
    pub fn add_element(&mut self, mut element: Element) -> ElementId {
        element.clamp_geometry();
        let id = element.id;
        self.elements.push(element);
        id
    }

    /// Create an element from the default table at `position` and append it
    /// on top of everything else.
    pub fn create_element(&mut self, kind: ElementType, position: Position) -> ElementId {
        let element = Element::new(kind)
            .with_position(position)
            .with_z_index(self.claim_top_z());
        tracing::debug!(
            "Created {kind} element {} at ({}, {})",
            element.id,
            element.position.x,
            element.position.y
        );
        self.add_element(element)
    }

    /// Merge a partial patch into an element.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ElementNotFound`] if the element is not on
    /// this page; nothing is modified.
    pub fn update_element(
        &mut self,
        id: ElementId,
        patch: ElementPatch,
    ) -> Result<(), ValidationError> {
        self.get_element_mut(id)?.apply(patch);
        Ok(())
    }

    /// Clone an element under a new ID, offset by (+20, +20) and placed on
    /// top.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ElementNotFound`] if the element is not on
    /// this page.
    pub fn duplicate_element(&mut self, id: ElementId) -> Result<ElementId, ValidationError> {
        let mut copy = self
            .get_element(id)
            .cloned()
            .ok_or(ValidationError::ElementNotFound(id))?;
        copy.id = ElementId::new();
        copy.position = copy
            .position
            .offset(DUPLICATE_OFFSET, DUPLICATE_OFFSET)
            .clamped();
        copy.z_index = self.claim_top_z();
        tracing::debug!("Duplicated element {id} as {}", copy.id);
        Ok(self.add_element(copy))
    }

    /// Remove an element from the page.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ElementNotFound`] if the element is not on
    /// this page.
    pub fn remove_element(&mut self, id: ElementId) -> Result<Element, ValidationError> {
        let idx = self
            .elements
            .iter()
            .position(|e| e.id == id)
            .ok_or(ValidationError::ElementNotFound(id))?;
        tracing::debug!("Removed element {id}");
        Ok(self.elements.remove(idx))
    }

    /// Raise an element above every other element on the page.
    ///
    /// Returns the new z-index. If the page already uses `i32::MAX`, its
    /// z-indices are renumbered first; relative paint order is kept.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ElementNotFound`] if the element is not on
    /// this page.
    pub fn bring_to_front(&mut self, id: ElementId) -> Result<i32, ValidationError> {
        if !self.contains(id) {
            return Err(ValidationError::ElementNotFound(id));
        }
        let z = self.claim_top_z();
        self.get_element_mut(id)?.z_index = z;
        tracing::debug!("Element {id} brought to front (z={z})");
        Ok(z)
    }

    /// Lower an element below every other element on the page.
    ///
    /// Returns the new z-index. If the page already uses `i32::MIN`, its
    /// z-indices are renumbered first; relative paint order is kept.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ElementNotFound`] if the element is not on
    /// this page.
    pub fn send_to_back(&mut self, id: ElementId) -> Result<i32, ValidationError> {
        if !self.contains(id) {
            return Err(ValidationError::ElementNotFound(id));
        }
        let z = self.claim_bottom_z();
        self.get_element_mut(id)?.z_index = z;
        tracing::debug!("Element {id} sent to back (z={z})");
        Ok(z)
    }

    /// Elements in paint order: ascending z-index, ties kept in list order.
    #[must_use]
    pub fn paint_order(&self) -> Vec<&Element> {
        let mut ordered: Vec<&Element> = self.elements.iter().collect();
        // sort_by_key is stable
        ordered.sort_by_key(|e| e.z_index);
        ordered
    }

    /// Find the element at the given page coordinates.
    /// Returns the ID of the topmost element in paint order.
    #[must_use]
    pub fn element_at(&self, x: f64, y: f64) -> Option<ElementId> {
        self.paint_order()
            .into_iter()
            .rev()
            .find(|e| e.contains_point(x, y))
            .map(|e| e.id)
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub(crate) fn regenerate_duplicate_ids(&mut self, seen: &mut HashSet<ElementId>) {
        for element in &mut self.elements {
            if !seen.insert(element.id) {
                tracing::debug!("Regenerating duplicate element id {}", element.id);
                element.id = ElementId::new();
                seen.insert(element.id);
            }
        }
    }
}
