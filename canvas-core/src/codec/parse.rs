//! Markup + stylesheet → document.
//!
//! The parser never fails. Unknown tags are skipped, missing values fall
//! back to the element type's defaults, and a page without any recognised
//! element is still produced, empty.

use super::markup::{parse_markup, ElementNode};
use super::stylesheet::Stylesheet;
use crate::document::page_name;
use crate::page::DEFAULT_BACKGROUND;
use crate::style::{parse_declarations, parse_px, StyleMap};
use crate::{Document, Element, ElementType, Page, Position, Size};

/// Style properties carried over from markup into an element's style map.
pub const TRACKED_PROPERTIES: [&str; 9] = [
    "font-size",
    "font-weight",
    "color",
    "background-color",
    "padding",
    "margin",
    "border",
    "border-radius",
    "text-align",
];

/// Parse a markup + stylesheet pair back into a document.
///
/// Element IDs are freshly generated; they do not survive a round trip.
#[must_use]
pub fn parse(html: &str, css: &str) -> Document {
    let root = parse_markup(html);
    let sheet = Stylesheet::parse(css);
    let scope = root.find("body").unwrap_or(&root);

    let mut wrappers: Vec<&ElementNode> = Vec::new();
    scope.walk(&mut |el| {
        if page_class_of(el).is_some() {
            wrappers.push(el);
            return false;
        }
        true
    });

    let pages: Vec<Page> = if wrappers.is_empty() {
        tracing::debug!("No page wrappers found; treating body as a single page");
        let background = sheet
            .property("body", "background-color")
            .unwrap_or_else(|| DEFAULT_BACKGROUND.to_string());
        vec![parse_page(scope, 0, background, &sheet)]
    } else {
        wrappers
            .iter()
            .enumerate()
            .map(|(index, wrapper)| {
                let background = page_class_of(wrapper)
                    .and_then(|class| sheet.property(&format!(".{class}"), "background-color"))
                    .unwrap_or_else(|| DEFAULT_BACKGROUND.to_string());
                parse_page(wrapper, index, background, &sheet)
            })
            .collect()
    };

    tracing::debug!(
        "Parsed {} pages from {} html bytes and {} stylesheet rules",
        pages.len(),
        html.len(),
        sheet.len()
    );
    Document::from_pages(pages)
}

/// The `page-<n>` class of a page wrapper `<div>`.
fn page_class_of(el: &ElementNode) -> Option<&str> {
    if el.name != "div" {
        return None;
    }
    el.classes().find(|c| c.len() > "page-".len() && c.starts_with("page-"))
}

fn element_type_for(tag: &str) -> Option<ElementType> {
    match tag {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => Some(ElementType::Heading),
        "p" | "span" => Some(ElementType::Text),
        "button" => Some(ElementType::Button),
        "img" => Some(ElementType::Image),
        "div" => Some(ElementType::Container),
        _ => None,
    }
}

fn parse_page(scope: &ElementNode, index: usize, background: String, sheet: &Stylesheet) -> Page {
    let mut elements = Vec::new();
    let mut next_z = 1_i32;

    scope.walk(&mut |el| {
        if page_class_of(el).is_some() {
            return true;
        }
        match element_type_for(&el.name) {
            Some(kind) => {
                elements.push(parse_element(el, kind, sheet, next_z));
                next_z = next_z.saturating_add(1);
            }
            None => tracing::debug!("Skipping unrecognised <{}>", el.name),
        }
        true
    });

    let mut page = Page::new(page_name(index)).with_background(background);
    for element in elements {
        page.add_element(element);
    }
    page
}

fn parse_element(
    el: &ElementNode,
    kind: ElementType,
    sheet: &Stylesheet,
    counter_z: i32,
) -> Element {
    let rule = el
        .attr("id")
        .filter(|id| !id.is_empty())
        .map(|id| sheet.declarations_for(&format!("#{id}")))
        .unwrap_or_default();

    // Rule first, inline on top, as a browser would compute it.
    let mut rendered = rule.clone();
    for (name, value) in parse_declarations(el.attr("style").unwrap_or_default()).iter() {
        rendered.insert(name, value);
    }

    let mut styles = kind.default_styles();
    for property in TRACKED_PROPERTIES {
        if let Some(value) = rendered.get(property) {
            styles.insert(property, value);
        }
    }

    let defaults = kind.default_size();
    let position = Position::new(
        px_or(&rendered, "left", 0.0),
        px_or(&rendered, "top", 0.0),
    );
    let size = Size::new(
        px_or(&rendered, "width", defaults.width),
        px_or(&rendered, "height", defaults.height),
    );

    let z_index = rule
        .get("z-index")
        .and_then(|z| z.trim().parse::<i32>().ok())
        .unwrap_or(counter_z);

    let content = match kind {
        ElementType::Image => el.attr("src").unwrap_or_default().to_string(),
        _ => el.text_content(),
    };

    let mut element = Element::new(kind)
        .with_content(content)
        .with_position(position)
        .with_size(size)
        .with_z_index(z_index);
    element.styles = styles;
    element
}

fn px_or(styles: &StyleMap, name: &str, fallback: f64) -> f64 {
    match styles.get(name).and_then(parse_px) {
        Some(value) => value,
        None => {
            tracing::debug!("No usable `{name}`; using {fallback}");
            fallback
        }
    }
}
