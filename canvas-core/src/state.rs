//! Editor state: one open template and everything needed to edit it.

use crate::codec::{self, MarkupBundle};
use crate::drag::{DragController, DragOutcome, DragState};
use crate::event::{InputEvent, KeyModifiers, PointerEvent, PressTarget};
use crate::persist::{self, TemplateBackend};
use crate::{CanvasResult, Document, DocumentStore};

/// The complete editor state for one template.
#[derive(Debug, Clone, Default)]
pub struct EditorState {
    store: DocumentStore,
    drag: DragController,
    template_id: Option<String>,
    /// Template display name.
    pub name: String,
    has_local_changes: bool,
}

impl EditorState {
    /// Editor for a new, unsaved template.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The document store.
    #[must_use]
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Run a mutation against the store. Marks the editor as changed.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut DocumentStore) -> R) -> R {
        self.has_local_changes = true;
        f(&mut self.store)
    }

    /// Current drag state.
    #[must_use]
    pub fn drag_state(&self) -> DragState {
        self.drag.state()
    }

    /// Storage id, once saved or loaded.
    #[must_use]
    pub fn template_id(&self) -> Option<&str> {
        self.template_id.as_deref()
    }

    /// Whether there are edits not yet saved.
    #[must_use]
    pub fn has_local_changes(&self) -> bool {
        self.has_local_changes
    }

    /// Serialized form of the current document, for preview.
    #[must_use]
    pub fn bundle(&self) -> MarkupBundle {
        codec::serialize(self.store.document())
    }

    /// Process an input event. Returns whether the document changed.
    pub fn process_event(&mut self, event: &InputEvent) -> bool {
        let changed = match event {
            InputEvent::Pointer(pointer) => self.pointer(*pointer).changed_document(),
            InputEvent::Key {
                key,
                pressed,
                modifiers,
            } => *pressed && self.key(key, *modifiers),
        };
        if changed {
            self.has_local_changes = true;
        }
        changed
    }

    /// Feed a pointer event to the drag controller.
    pub fn pointer(&mut self, event: PointerEvent) -> DragOutcome {
        let outcome = self.drag.handle(&mut self.store, event);
        if outcome.changed_document() {
            self.has_local_changes = true;
        }
        outcome
    }

    /// Press at canvas coordinates, resolving the target by hit test.
    pub fn press_at(&mut self, x: f64, y: f64) -> DragOutcome {
        let target = self
            .store
            .element_at(x, y)
            .map_or(PressTarget::Canvas, PressTarget::Element);
        self.pointer(PointerEvent::Press { x, y, target })
    }

    fn key(&mut self, key: &str, modifiers: KeyModifiers) -> bool {
        match key {
            "Escape" => {
                if self.drag.is_dragging() {
                    self.drag.handle(&mut self.store, PointerEvent::Cancel);
                }
                false
            }
            "Delete" | "Backspace" => self.store.delete_selected().is_some(),
            "d" | "D" if modifiers.command() => self.store.duplicate_selected().is_some(),
            _ => false,
        }
    }

    /// Drop the current template and start from an empty document.
    pub fn new_template(&mut self) {
        *self = Self::new();
        tracing::debug!("Started a new template");
    }

    /// Save through the backend. On success the template id is recorded
    /// and the change flag cleared; on failure nothing changes.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name, or the backend's error.
    pub fn save<B: TemplateBackend + ?Sized>(&mut self, backend: &B) -> CanvasResult<String> {
        let id = persist::save(
            self.store.document(),
            self.template_id.as_deref(),
            &self.name,
            backend,
        )?;
        self.template_id = Some(id.clone());
        self.has_local_changes = false;
        Ok(id)
    }

    /// Load a template through the backend, replacing the open document.
    ///
    /// # Errors
    ///
    /// Returns the backend's error; the open document is kept.
    pub fn load<B: TemplateBackend + ?Sized>(&mut self, id: &str, backend: &B) -> CanvasResult<()> {
        let (stored, document) = persist::load(id, backend)?;
        self.open(stored.id, stored.name, document);
        Ok(())
    }

    /// Open an already-parsed document.
    pub fn open(&mut self, id: impl Into<String>, name: impl Into<String>, document: Document) {
        self.store.replace_document(document);
        self.drag = DragController::new();
        self.template_id = Some(id.into());
        self.name = name.into();
        self.has_local_changes = false;
    }
}
