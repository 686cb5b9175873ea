//! Input events forwarded by the rendering surface.
//!
//! Coordinates are canvas-relative page pixels. The surface resolves what
//! lies under a press before forwarding it, so the core never needs to know
//! about the palette or any widget outside the canvas.

use serde::{Deserialize, Serialize};

use crate::{ElementId, ElementType};

/// What a press landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum PressTarget {
    /// A palette item for a new element of this type.
    Palette(ElementType),
    /// An element already placed on the active page.
    Element(ElementId),
    /// Empty canvas.
    Canvas,
    /// Anywhere else.
    Outside,
}

/// Where a release happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropTarget {
    /// Over the canvas drop area.
    Canvas,
    /// Not over any valid drop target.
    Outside,
}

/// Pointer (mouse or single touch) event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "lowercase")]
#[allow(missing_docs)] // Variant fields documented at variant level
pub enum PointerEvent {
    /// Button down at (x, y) over `target`.
    Press { x: f64, y: f64, target: PressTarget },
    /// Pointer moved to (x, y).
    Move { x: f64, y: f64 },
    /// Button up at (x, y) over `over`.
    Release { x: f64, y: f64, over: DropTarget },
    /// The gesture was aborted by the surface.
    Cancel,
}

impl PointerEvent {
    /// Press on a palette item.
    #[must_use]
    pub fn press_palette(kind: ElementType, x: f64, y: f64) -> Self {
        Self::Press {
            x,
            y,
            target: PressTarget::Palette(kind),
        }
    }

    /// Press on a placed element.
    #[must_use]
    pub fn press_element(id: ElementId, x: f64, y: f64) -> Self {
        Self::Press {
            x,
            y,
            target: PressTarget::Element(id),
        }
    }

    /// Pointer move.
    #[must_use]
    pub fn move_to(x: f64, y: f64) -> Self {
        Self::Move { x, y }
    }

    /// Release over the canvas.
    #[must_use]
    pub fn drop_on_canvas(x: f64, y: f64) -> Self {
        Self::Release {
            x,
            y,
            over: DropTarget::Canvas,
        }
    }

    /// Release outside any drop target.
    #[must_use]
    pub fn drop_outside(x: f64, y: f64) -> Self {
        Self::Release {
            x,
            y,
            over: DropTarget::Outside,
        }
    }
}

/// All input events the editor can receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InputEvent {
    /// Pointer event.
    Pointer(PointerEvent),

    /// Keyboard event.
    Key {
        /// Key name, as reported by the surface (`"Delete"`, `"d"`, ...).
        key: String,
        /// Whether the key is pressed.
        pressed: bool,
        /// Active modifier keys.
        modifiers: KeyModifiers,
    },
}

impl InputEvent {
    /// Key press with no modifiers.
    #[must_use]
    pub fn key(key: impl Into<String>) -> Self {
        Self::Key {
            key: key.into(),
            pressed: true,
            modifiers: KeyModifiers::default(),
        }
    }

    /// Key press with modifiers.
    #[must_use]
    pub fn key_with(key: impl Into<String>, modifiers: KeyModifiers) -> Self {
        Self::Key {
            key: key.into(),
            pressed: true,
            modifiers,
        }
    }
}

impl From<PointerEvent> for InputEvent {
    fn from(event: PointerEvent) -> Self {
        Self::Pointer(event)
    }
}

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeyModifiers {
    /// Shift key pressed.
    pub shift: bool,
    /// Control key pressed.
    pub ctrl: bool,
    /// Alt/Option key pressed.
    pub alt: bool,
    /// Meta/Command key pressed.
    pub meta: bool,
}

impl KeyModifiers {
    /// Only Ctrl held.
    #[must_use]
    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::default()
        }
    }

    /// Ctrl on most platforms, Cmd on macOS.
    #[must_use]
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}
