//! Persistence boundary: the storage collaborator and the save/load glue.
//!
//! The core never performs I/O itself. [`save`] serializes synchronously
//! and hands the result to a [`TemplateBackend`]; a failed write is
//! surfaced to the caller and the in-memory document stays authoritative.

use serde::{Deserialize, Serialize};

use crate::codec::{self, MarkupBundle};
use crate::error::{PersistenceError, ValidationError};
use crate::{CanvasResult, Document};

/// What the core hands to storage on save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDraft {
    /// Existing template to update, or `None` to create one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name. Never blank.
    pub name: String,
    /// Serialized document.
    #[serde(flatten)]
    pub bundle: MarkupBundle,
}

/// A template as returned by storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTemplate {
    /// Storage identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Serialized document.
    #[serde(flatten)]
    pub bundle: MarkupBundle,
}

/// The template storage collaborator.
pub trait TemplateBackend {
    /// Create (draft without id) or update a template. Returns its id.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] if storage refuses or fails.
    fn save(&self, draft: TemplateDraft) -> Result<String, PersistenceError>;

    /// Fetch a template.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::NotFound`] for an unknown id, or another
    /// [`PersistenceError`] if storage fails.
    fn load(&self, id: &str) -> Result<StoredTemplate, PersistenceError>;
}

/// Serialize `document` and store it under `name`.
///
/// Returns the template id assigned (or confirmed) by the backend.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyTemplateName`] for a blank name, before
/// the backend is contacted, or the backend's [`PersistenceError`].
pub fn save<B: TemplateBackend + ?Sized>(
    document: &Document,
    id: Option<&str>,
    name: &str,
    backend: &B,
) -> CanvasResult<String> {
    let name = name.trim();
    if name.is_empty() {
        tracing::warn!("Save rejected: template name is empty");
        return Err(ValidationError::EmptyTemplateName.into());
    }

    let draft = TemplateDraft {
        id: id.map(str::to_string),
        name: name.to_string(),
        bundle: codec::serialize(document),
    };
    match backend.save(draft) {
        Ok(saved) => {
            tracing::debug!("Saved template {saved} ({name})");
            Ok(saved)
        }
        Err(err) => {
            tracing::warn!("Saving template {name} failed: {err}");
            Err(err.into())
        }
    }
}

/// Fetch a template and parse it into a document.
///
/// # Errors
///
/// Returns the backend's [`PersistenceError`].
pub fn load<B: TemplateBackend + ?Sized>(
    id: &str,
    backend: &B,
) -> CanvasResult<(StoredTemplate, Document)> {
    let stored = backend.load(id).map_err(|err| {
        tracing::warn!("Loading template {id} failed: {err}");
        err
    })?;
    let document = stored.bundle.to_document();
    tracing::debug!(
        "Loaded template {} with {} pages",
        stored.id,
        document.page_count()
    );
    Ok((stored, document))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;
    use crate::{CanvasError, ElementType, Position};

    #[derive(Default)]
    struct MemoryBackend {
        templates: RefCell<HashMap<String, StoredTemplate>>,
        fail: bool,
    }

    impl TemplateBackend for MemoryBackend {
        fn save(&self, draft: TemplateDraft) -> Result<String, PersistenceError> {
            if self.fail {
                return Err(PersistenceError::Backend("disk full".into()));
            }
            let mut templates = self.templates.borrow_mut();
            let id = draft.id.unwrap_or_else(|| format!("t{}", templates.len() + 1));
            templates.insert(
                id.clone(),
                StoredTemplate {
                    id: id.clone(),
                    name: draft.name,
                    bundle: draft.bundle,
                },
            );
            Ok(id)
        }

        fn load(&self, id: &str) -> Result<StoredTemplate, PersistenceError> {
            self.templates
                .borrow()
                .get(id)
                .cloned()
                .ok_or_else(|| PersistenceError::NotFound(id.to_string()))
        }
    }

    fn document_with_button() -> Document {
        let mut doc = Document::new();
        doc.page_mut(0)
            .expect("page")
            .create_element(ElementType::Button, Position::new(50.0, 75.0));
        doc
    }

    #[test]
    fn test_blank_name_rejected_before_backend() {
        let backend = MemoryBackend::default();
        let err = save(&Document::new(), None, "   ", &backend).expect_err("blank");

        assert!(matches!(
            err,
            CanvasError::Validation(ValidationError::EmptyTemplateName)
        ));
        assert!(backend.templates.borrow().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let backend = MemoryBackend::default();
        let doc = document_with_button();

        let id = save(&doc, None, "  Landing  ", &backend).expect("save");
        let (stored, loaded) = load(&id, &backend).expect("load");

        assert_eq!(stored.name, "Landing");
        assert_eq!(loaded.element_count(), 1);
        let button = &loaded.pages()[0].elements()[0];
        assert_eq!(button.kind, ElementType::Button);
        assert_eq!(button.position, Position::new(50.0, 75.0));
    }

    #[test]
    fn test_save_with_id_updates() {
        let backend = MemoryBackend::default();
        let id = save(&Document::new(), None, "A", &backend).expect("create");
        let again = save(&document_with_button(), Some(&id), "B", &backend).expect("update");

        assert_eq!(again, id);
        assert_eq!(backend.templates.borrow().len(), 1);
        assert_eq!(backend.load(&id).expect("load").name, "B");
    }

    #[test]
    fn test_backend_failure_surfaces() {
        let backend = MemoryBackend {
            fail: true,
            ..MemoryBackend::default()
        };
        let doc = document_with_button();
        let before = doc.clone();

        let err = save(&doc, None, "x", &backend).expect_err("fails");
        assert!(matches!(err, CanvasError::Persistence(PersistenceError::Backend(_))));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_load_missing() {
        let backend = MemoryBackend::default();
        let err = load("nope", &backend).expect_err("missing");
        assert!(matches!(err, CanvasError::Persistence(PersistenceError::NotFound(_))));
    }

    #[test]
    fn test_draft_json_is_flat() {
        let draft = TemplateDraft {
            id: None,
            name: "n".into(),
            bundle: MarkupBundle {
                html: "<p>x</p>".into(),
                css: String::new(),
            },
        };
        let json = serde_json::to_value(&draft).expect("json");
        assert_eq!(json, serde_json::json!({"name": "n", "html": "<p>x</p>", "css": ""}));
    }
}
