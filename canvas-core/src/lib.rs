//! # Canvas Core
//!
//! The visual canvas document engine behind the template editor: the
//! page/element model, its mutation operations, the markup codec and the
//! pointer-drag state machine.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 EditorState                 │
//! ├──────────────────────┬──────────────────────┤
//! │  DragController      │  Selection bridge    │
//! │  - Idle              │  - selected element  │
//! │  - DraggingNew       │  - patch / delete    │
//! │  - DraggingExisting  │  - duplicate         │
//! ├──────────────────────┴──────────────────────┤
//! │  DocumentStore  (pages, active page, ops)   │
//! ├──────────────────────┬──────────────────────┤
//! │  codec::serialize    │  codec::parse        │
//! │  Document → html+css │  html+css → Document │
//! └──────────────────────┴──────────────────────┘
//! ```
//!
//! All mutation is synchronous. Storage is reached only through the
//! [`TemplateBackend`] trait.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod codec;
pub mod document;
pub mod drag;
pub mod element;
pub mod error;
pub mod event;
pub mod page;
pub mod persist;
pub mod selection;
pub mod state;
pub mod store;
pub mod style;

pub use codec::{parse, serialize, MarkupBundle};
pub use document::Document;
pub use drag::{ActiveDrag, DragController, DragOutcome, DragState, DROP_ANCHOR};
pub use element::{
    Element, ElementId, ElementPatch, ElementType, Position, Size, DUPLICATE_OFFSET, MIN_SIZE,
};
pub use error::{CanvasError, CanvasResult, PersistenceError, ValidationError};
pub use event::{DropTarget, InputEvent, KeyModifiers, PointerEvent, PressTarget};
pub use page::{Page, PageId};
pub use persist::{StoredTemplate, TemplateBackend, TemplateDraft};
pub use selection::Selection;
pub use state::EditorState;
pub use store::DocumentStore;
pub use style::StyleMap;

/// Canvas core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
