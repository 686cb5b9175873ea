//! Template storage.
//!
//! A thread-safe [`TemplateStore`] holding every saved template in memory,
//! optionally mirrored to a data directory as one `<id>.json` file per
//! template.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use canvas_core::{MarkupBundle, PersistenceError, StoredTemplate, TemplateBackend, TemplateDraft};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::{self, ValidationError};

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested template does not exist.
    #[error("Template not found: {0}")]
    NotFound(String),
    /// The template body failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    /// An I/O error occurred during persistence.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A stored template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Unique identifier.
    pub id: String,
    /// Display name, trimmed.
    pub name: String,
    /// Page markup.
    pub html: String,
    /// Page stylesheet.
    pub css: String,
    /// Creation time, ms since the Unix epoch.
    pub created_at: u64,
    /// Last update time, ms since the Unix epoch.
    pub updated_at: u64,
}

impl Template {
    /// The markup pair, for the codec.
    #[must_use]
    pub fn bundle(&self) -> MarkupBundle {
        MarkupBundle {
            html: self.html.clone(),
            css: self.css.clone(),
        }
    }
}

impl From<Template> for StoredTemplate {
    fn from(template: Template) -> Self {
        Self {
            id: template.id,
            name: template.name,
            bundle: MarkupBundle {
                html: template.html,
                css: template.css,
            },
        }
    }
}

/// Thread-safe template storage shared across HTTP handlers.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    templates: Arc<RwLock<HashMap<String, Template>>>,
    /// Optional data directory for filesystem persistence.
    data_dir: Option<PathBuf>,
}

impl TemplateStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with filesystem persistence and load every template
    /// already in `data_dir`. The directory is created if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created or read.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        let store = Self {
            templates: Arc::default(),
            data_dir: Some(data_dir),
        };
        let loaded = store.load_from_dir()?;
        tracing::info!("Loaded {loaded} templates from disk");
        Ok(store)
    }

    /// Data directory, if persistence is enabled.
    #[must_use]
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// Number of stored templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the store holds no templates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether no writer has panicked while holding the store lock. Reads
    /// still succeed after that, but the map may hold a partial update.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        !self.templates.is_poisoned()
    }

    /// Poison the store lock by panicking while it is held.
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let templates = Arc::clone(&self.templates);
        let _ = std::thread::spawn(move || {
            let _guard = templates.write();
            panic!("writer panicked");
        })
        .join();
    }

    /// Create a template with a fresh id.
    ///
    /// Creation timestamps are strictly increasing within a store, so
    /// [`list`](Self::list) order is stable even for same-millisecond creates.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] for a bad body, or a persistence error.
    pub fn create(&self, name: &str, html: &str, css: &str) -> Result<Template, StoreError> {
        validation::validate_template(name, html, css)?;

        let mut templates = self.write();
        let newest = templates.values().map(|t| t.created_at).max().unwrap_or(0);
        let now = current_timestamp_ms().max(newest + 1);
        let template = Template {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            html: html.to_string(),
            css: css.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.persist(&template)?;
        templates.insert(template.id.clone(), template.clone());
        tracing::debug!("Created template {} ({})", template.id, template.name);
        Ok(template)
    }

    /// All templates, newest first.
    #[must_use]
    pub fn list(&self) -> Vec<Template> {
        let mut all: Vec<Template> = self.read().values().cloned().collect();
        all.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        all
    }

    /// Get a template by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Template> {
        self.read().get(id).cloned()
    }

    /// Replace a template's name, html and css.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id,
    /// [`StoreError::Invalid`] for a bad body, or a persistence error.
    pub fn update(
        &self,
        id: &str,
        name: &str,
        html: &str,
        css: &str,
    ) -> Result<Template, StoreError> {
        validation::validate_template(name, html, css)?;

        let mut templates = self.write();
        let existing = templates
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let updated = Template {
            name: name.trim().to_string(),
            html: html.to_string(),
            css: css.to_string(),
            updated_at: current_timestamp_ms().max(existing.updated_at),
            ..existing.clone()
        };
        self.persist(&updated)?;
        templates.insert(id.to_string(), updated.clone());
        tracing::debug!("Updated template {id}");
        Ok(updated)
    }

    /// Remove a template, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id, or
    /// [`StoreError::Io`] if its file cannot be removed.
    pub fn delete(&self, id: &str) -> Result<Template, StoreError> {
        let mut templates = self.write();
        if !templates.contains_key(id) {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.remove_file(id)?;
        let removed = templates
            .remove(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        tracing::debug!("Deleted template {id}");
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Load every `*.json` template in the data directory into memory.
    ///
    /// Unreadable or malformed files are skipped with a warning. Returns the
    /// number of templates loaded; zero without a data directory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory can't be read.
    pub fn load_from_dir(&self) -> Result<usize, StoreError> {
        let Some(ref data_dir) = self.data_dir else {
            return Ok(0);
        };
        let mut loaded = Vec::new();
        for entry in std::fs::read_dir(data_dir)? {
            let path = entry?.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            match read_template(&path) {
                Ok(template) => loaded.push(template),
                Err(e) => tracing::warn!("Skipping template file {}: {e}", path.display()),
            }
        }

        let count = loaded.len();
        let mut templates = self.write();
        for template in loaded {
            templates.insert(template.id.clone(), template);
        }
        Ok(count)
    }

    fn file_path(&self, id: &str) -> Option<PathBuf> {
        self.data_dir
            .as_ref()
            .map(|dir| dir.join(format!("{id}.json")))
    }

    /// Write a template to disk. No-op without a data directory.
    fn persist(&self, template: &Template) -> Result<(), StoreError> {
        let Some(path) = self.file_path(&template.id) else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(template)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        std::fs::write(&path, json).map_err(|e| {
            tracing::warn!("Failed to persist template {} to {}: {e}", template.id, path.display());
            StoreError::Io(e)
        })
    }

    fn remove_file(&self, id: &str) -> Result<(), StoreError> {
        let Some(path) = self.file_path(id) else {
            return Ok(());
        };
        match std::fs::remove_file(&path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                tracing::warn!("Failed to delete template file {}: {e}", path.display());
                Err(StoreError::Io(e))
            }
            _ => Ok(()),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Template>> {
        self.templates
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Template>> {
        self.templates
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl TemplateBackend for TemplateStore {
    fn save(&self, draft: TemplateDraft) -> Result<String, PersistenceError> {
        let MarkupBundle { html, css } = draft.bundle;
        let result = match draft.id {
            Some(id) => self.update(&id, &draft.name, &html, &css),
            None => self.create(&draft.name, &html, &css),
        };
        result.map(|t| t.id).map_err(PersistenceError::from)
    }

    fn load(&self, id: &str) -> Result<StoredTemplate, PersistenceError> {
        self.get(id)
            .map(StoredTemplate::from)
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))
    }
}

impl From<StoreError> for PersistenceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::Invalid(e) => Self::Rejected(e.to_string()),
            other => Self::Backend(other.to_string()),
        }
    }
}

fn read_template(path: &Path) -> Result<Template, StoreError> {
    let contents = std::fs::read_to_string(path)?;
    let template: Template =
        serde_json::from_str(&contents).map_err(|e| StoreError::Serialization(e.to_string()))?;
    validation::validate_template_id(&template.id)?;
    Ok(template)
}

/// Get the current Unix timestamp in milliseconds.
fn current_timestamp_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| {
        #[allow(clippy::cast_possible_truncation)]
        {
            d.as_millis() as u64
        }
    })
}
