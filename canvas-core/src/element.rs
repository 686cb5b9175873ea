//! Canvas elements - the building blocks of pages.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::style::StyleMap;

/// Smallest width or height an element may have, in pixels.
pub const MIN_SIZE: f64 = 10.0;

/// Offset applied to a duplicated element's position, in pixels.
pub const DUPLICATE_OFFSET: f64 = 20.0;

/// Unique identifier for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse an element ID from its string form.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid UUID.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The five kinds of element a page can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// Level-one heading.
    Heading,
    /// Paragraph of text.
    Text,
    /// Clickable button.
    Button,
    /// Image; `content` holds the source URL.
    Image,
    /// Generic block.
    Container,
}

impl ElementType {
    /// All element types, in palette order.
    pub const ALL: [Self; 5] = [
        Self::Heading,
        Self::Text,
        Self::Button,
        Self::Image,
        Self::Container,
    ];

    /// Lower-case name as used by the palette and the JSON shape.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Heading => "heading",
            Self::Text => "text",
            Self::Button => "button",
            Self::Image => "image",
            Self::Container => "container",
        }
    }

    /// Default content for a freshly created element.
    #[must_use]
    pub const fn default_content(self) -> &'static str {
        match self {
            Self::Heading => "Your Heading Here",
            Self::Text => "Your text content goes here. Click to edit this text.",
            Self::Button => "Click Me",
            Self::Image => "/placeholder.svg?height=200&width=300",
            Self::Container => "",
        }
    }

    /// Default size for a freshly created element.
    #[must_use]
    pub const fn default_size(self) -> Size {
        let (width, height) = match self {
            Self::Heading => (300.0, 50.0),
            Self::Text => (400.0, 100.0),
            Self::Button => (120.0, 44.0),
            Self::Image => (300.0, 200.0),
            Self::Container => (400.0, 200.0),
        };
        Size { width, height }
    }

    /// Default style set for a freshly created element.
    #[must_use]
    pub fn default_styles(self) -> StyleMap {
        let pairs: &[(&str, &str)] = match self {
            Self::Heading => &[
                ("font-size", "32px"),
                ("font-weight", "bold"),
                ("color", "#1f2937"),
                ("padding", "8px 16px"),
                ("margin", "0"),
                ("background-color", "transparent"),
            ],
            Self::Text => &[
                ("font-size", "16px"),
                ("line-height", "1.6"),
                ("color", "#374151"),
                ("padding", "8px 16px"),
                ("margin", "0"),
                ("background-color", "transparent"),
            ],
            Self::Button => &[
                ("background-color", "#3b82f6"),
                ("color", "white"),
                ("border", "none"),
                ("border-radius", "6px"),
                ("padding", "12px 24px"),
                ("font-size", "16px"),
                ("font-weight", "500"),
                ("cursor", "pointer"),
                ("margin", "0"),
            ],
            Self::Image => &[("border-radius", "4px"), ("margin", "0")],
            Self::Container => &[
                ("border", "2px dashed #d1d5db"),
                ("background-color", "#f9fafb"),
                ("border-radius", "8px"),
                ("padding", "20px"),
                ("margin", "0"),
            ],
        };
        pairs.iter().copied().collect()
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-left corner of an element, in page pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Pixels from the left edge.
    pub x: f64,
    /// Pixels from the top edge.
    pub y: f64,
}

impl Position {
    /// Create a position.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamp both axes at zero.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            x: clamp_min(self.x, 0.0),
            y: clamp_min(self.y, 0.0),
        }
    }

    /// Translate by a delta.
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Width and height of an element, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels. Rendered as automatic for images.
    pub height: f64,
}

impl Size {
    /// Create a size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Clamp both dimensions at [`MIN_SIZE`].
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            width: clamp_min(self.width, MIN_SIZE),
            height: clamp_min(self.height, MIN_SIZE),
        }
    }
}

// NaN collapses to the floor as well.
fn clamp_min(value: f64, floor: f64) -> f64 {
    if value >= floor {
        value
    } else {
        floor
    }
}

fn clamped_position<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Position, D::Error> {
    Position::deserialize(deserializer).map(Position::clamped)
}

fn clamped_size<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Size, D::Error> {
    Size::deserialize(deserializer).map(Size::clamped)
}

/// A positioned, sized, styled unit on a page.
///
/// This is the only shape that crosses the property-editing boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Unique identifier within the document.
    pub id: ElementId,
    /// Element kind. Never changes after creation.
    #[serde(rename = "type")]
    pub kind: ElementType,
    /// Text content, or image source for [`ElementType::Image`].
    pub content: String,
    /// Style declarations in emission order.
    #[serde(default)]
    pub styles: StyleMap,
    /// Top-left corner.
    #[serde(deserialize_with = "clamped_position")]
    pub position: Position,
    /// Width and height.
    #[serde(deserialize_with = "clamped_size")]
    pub size: Size,
    /// Paint order key; higher paints later.
    pub z_index: i32,
}

impl Element {
    /// Create an element of the given type from the default table.
    #[must_use]
    pub fn new(kind: ElementType) -> Self {
        Self {
            id: ElementId::new(),
            kind,
            content: kind.default_content().to_string(),
            styles: kind.default_styles(),
            position: Position::default(),
            size: kind.default_size(),
            z_index: 0,
        }
    }

    /// Set the position (clamped).
    #[must_use]
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position.clamped();
        self
    }

    /// Set the size (clamped).
    #[must_use]
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size.clamped();
        self
    }

    /// Set the paint order key.
    #[must_use]
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Set the content.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Clamp position and size into their valid ranges.
    pub fn clamp_geometry(&mut self) {
        self.position = self.position.clamped();
        self.size = self.size.clamped();
    }

    /// Check if a point (in page coordinates) is within this element.
    #[must_use]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        let p = &self.position;
        let s = &self.size;
        x >= p.x && x <= p.x + s.width && y >= p.y && y <= p.y + s.height
    }

    /// Merge a partial patch. `id` and `kind` are never touched.
    pub fn apply(&mut self, patch: ElementPatch) {
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(styles) = patch.styles {
            self.styles = styles;
        }
        if let Some(position) = patch.position {
            self.position = position.clamped();
        }
        if let Some(size) = patch.size {
            self.size = size.clamped();
        }
        if let Some(z_index) = patch.z_index {
            self.z_index = z_index;
        }
    }
}

/// Partial update for an [`Element`]. Absent fields are left unchanged;
/// `id` and `type` cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPatch {
    /// New content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Replacement style map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<StyleMap>,
    /// New position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// New size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    /// New paint order key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
}

impl ElementPatch {
    /// Patch that only moves the element.
    #[must_use]
    pub fn position(position: Position) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    /// Patch that only changes the paint order key.
    #[must_use]
    pub fn z_index(z_index: i32) -> Self {
        Self {
            z_index: Some(z_index),
            ..Self::default()
        }
    }

    /// Patch that only changes the content.
    #[must_use]
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let heading = Element::new(ElementType::Heading);
        assert_eq!(heading.size, Size::new(300.0, 50.0));
        assert_eq!(heading.styles.get("font-weight"), Some("bold"));
        assert_eq!(heading.styles.get("font-size"), Some("32px"));

        let button = Element::new(ElementType::Button);
        assert_eq!(button.content, "Click Me");
        assert_eq!(button.size, Size::new(120.0, 44.0));
        assert!(button.styles.get("background-color").is_some());

        let image = Element::new(ElementType::Image);
        assert_eq!(image.size, Size::new(300.0, 200.0));
        assert!(image.content.starts_with("/placeholder.svg"));

        let container = Element::new(ElementType::Container);
        assert_eq!(container.size, Size::new(400.0, 200.0));
        assert!(container
            .styles
            .get("border")
            .is_some_and(|b| b.contains("dashed")));
    }

    #[test]
    fn test_clamping() {
        assert_eq!(Position::new(-5.0, 3.0).clamped(), Position::new(0.0, 3.0));
        assert_eq!(Size::new(2.0, 50.0).clamped(), Size::new(MIN_SIZE, 50.0));
        assert_eq!(Size::new(f64::NAN, 50.0).clamped().width, MIN_SIZE);
    }

    #[test]
    fn test_apply_patch_preserves_identity() {
        let mut element = Element::new(ElementType::Text);
        let id = element.id;

        element.apply(ElementPatch {
            content: Some("Hello".to_string()),
            position: Some(Position::new(-10.0, 25.0)),
            size: Some(Size::new(5.0, 5.0)),
            ..ElementPatch::default()
        });

        assert_eq!(element.id, id);
        assert_eq!(element.kind, ElementType::Text);
        assert_eq!(element.content, "Hello");
        assert_eq!(element.position, Position::new(0.0, 25.0));
        assert_eq!(element.size, Size::new(MIN_SIZE, MIN_SIZE));
    }

    #[test]
    fn test_contains_point() {
        let element = Element::new(ElementType::Button).with_position(Position::new(100.0, 100.0));
        assert!(element.contains_point(150.0, 120.0));
        assert!(!element.contains_point(50.0, 50.0));
    }

    #[test]
    fn test_boundary_json_shape() {
        let element = Element::new(ElementType::Button).with_z_index(3);
        let value = serde_json::to_value(&element).expect("serialize");

        assert_eq!(value["type"], "button");
        assert_eq!(value["zIndex"], 3);
        assert_eq!(value["size"]["width"], 120.0);
        assert_eq!(value["styles"]["cursor"], "pointer");
        assert!(value.get("kind").is_none());
    }

    #[test]
    fn test_patch_from_json() {
        let patch: ElementPatch =
            serde_json::from_str(r#"{"position":{"x":5,"y":6},"zIndex":9}"#).expect("parse");
        assert_eq!(patch.position, Some(Position::new(5.0, 6.0)));
        assert_eq!(patch.z_index, Some(9));
        assert!(patch.content.is_none());
    }

    #[test]
    fn test_json_geometry_is_clamped() {
        let json = format!(
            r#"{{"id":"{}","type":"text","content":"x","position":{{"x":-50,"y":12}},"size":{{"width":1,"height":40}},"zIndex":1}}"#,
            ElementId::new()
        );
        let element: Element = serde_json::from_str(&json).expect("parse");
        assert_eq!(element.position, Position::new(0.0, 12.0));
        assert_eq!(element.size, Size::new(MIN_SIZE, 40.0));
    }
}
