//! Document → markup + stylesheet.

use std::fmt::Write as _;

use super::markup::escape;
use super::MarkupBundle;
use crate::page::PAGE_MIN_HEIGHT;
use crate::style::{escape_value, format_px, is_property_name};
use crate::{Document, Element, ElementType, Page};

/// Class naming a page wrapper; `index` is zero-based.
pub(crate) fn page_class(index: usize) -> String {
    format!("page-{}", index + 1)
}

/// Id attribute of an element tag; also keys its stylesheet rule.
pub(crate) fn element_anchor(element: &Element) -> String {
    format!("element-{}", element.id)
}

/// Serialize a document. Output depends only on page order, element list
/// order and field values.
#[must_use]
pub fn serialize(document: &Document) -> MarkupBundle {
    let mut html = String::new();
    let mut css = String::new();

    for (index, page) in document.pages().iter().enumerate() {
        let class = page_class(index);
        if index > 0 {
            html.push('\n');
        }
        write_page_markup(&mut html, &class, page);
        write_page_rules(&mut css, &class, page);
    }

    tracing::debug!(
        "Serialized {} pages ({} html bytes, {} css bytes)",
        document.page_count(),
        html.len(),
        css.len()
    );
    MarkupBundle { html, css }
}

fn write_page_markup(out: &mut String, class: &str, page: &Page) {
    let _ = writeln!(out, "<div class=\"{class}\">");
    for element in page.elements() {
        let anchor = element_anchor(element);
        let style = escape(&inline_style(element));
        let _ = match element.kind {
            ElementType::Image => writeln!(
                out,
                "<img id=\"{anchor}\" src=\"{}\" style=\"{style}\" alt=\"Canvas image\" />",
                escape(&element.content)
            ),
            kind => {
                let tag = tag_for(kind);
                writeln!(
                    out,
                    "<{tag} id=\"{anchor}\" style=\"{style}\">{}</{tag}>",
                    escape(&element.content)
                )
            }
        };
    }
    out.push_str("</div>");
}

fn tag_for(kind: ElementType) -> &'static str {
    match kind {
        ElementType::Heading => "h1",
        ElementType::Text => "p",
        ElementType::Button => "button",
        ElementType::Image => "img",
        ElementType::Container => "div",
    }
}

/// Positioning declarations, in emission order.
fn positioning(element: &Element) -> [(&'static str, String); 6] {
    [
        ("position", "absolute".to_string()),
        ("left", format_px(element.position.x)),
        ("top", format_px(element.position.y)),
        ("width", format_px(element.size.width)),
        ("height", format_px(element.size.height)),
        ("z-index", element.z_index.to_string()),
    ]
}

/// Style declarations ready for emission: values escaped, entries whose
/// name is not a property name skipped.
fn emitted_styles(element: &Element) -> impl Iterator<Item = (&str, String)> {
    element.styles.iter().filter_map(move |(name, value)| {
        if is_property_name(name) {
            Some((name, escape_value(value)))
        } else {
            tracing::debug!("Skipping style {name:?} on element {}", element.id);
            None
        }
    })
}

/// The element's styles followed by its positioning. Positioning comes
/// last so it overrides same-named style keys.
fn inline_style(element: &Element) -> String {
    emitted_styles(element)
        .map(|(name, value)| format!("{name}:{value}"))
        .chain(
            positioning(element)
                .into_iter()
                .map(|(name, value)| format!("{name}:{value}")),
        )
        .collect::<Vec<_>>()
        .join("; ")
}

fn write_page_rules(out: &mut String, class: &str, page: &Page) {
    let _ = writeln!(out, ".{class} {{");
    let _ = writeln!(
        out,
        "  background-color:{};",
        escape_value(&page.background_color)
    );
    let _ = writeln!(out, "  min-height:{};", format_px(PAGE_MIN_HEIGHT));
    let _ = writeln!(out, "  position:relative;");
    out.push_str("}\n");

    for element in page.elements() {
        let _ = writeln!(out, "\n#{} {{", element_anchor(element));
        for (name, value) in emitted_styles(element) {
            let _ = writeln!(out, "  {name}:{value};");
        }
        for (name, value) in positioning(element) {
            let _ = writeln!(out, "  {name}:{value};");
        }
        out.push_str("}\n");
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Position, StyleMap};

    #[test]
    fn empty_page_serializes_wrapper_and_rule() {
        let bundle = serialize(&Document::new());

        assert_eq!(bundle.html, "<div class=\"page-1\">\n</div>");
        assert!(bundle.css.contains(".page-1 {"));
        assert!(bundle.css.contains("background-color:#ffffff;"));
        assert!(bundle.css.contains("min-height:800px;"));
    }

    #[test]
    fn element_markup_has_styles_then_positioning() {
        let mut doc = Document::new();
        let page = doc.page_mut(0).expect("page");
        let id = page.create_element(ElementType::Button, Position::new(50.0, 75.5));

        let bundle = serialize(&doc);

        let line = bundle
            .html
            .lines()
            .find(|l| l.starts_with("<button"))
            .expect("button line");
        assert!(line.contains(&format!("id=\"element-{id}\"")));
        assert!(line.ends_with(">Click Me</button>"));
        let style_start = line.find("style=\"").expect("style");
        let style = &line[style_start..];
        let bg = style.find("background-color:").expect("bg");
        let pos = style.find("position:absolute").expect("positioning");
        assert!(bg < pos);
        assert!(style.contains("left:50px; top:75.5px; width:120px; height:44px; z-index:1"));

        assert!(bundle.css.contains(&format!("#element-{id} {{")));
        assert!(bundle.css.contains("  z-index:1;"));
    }

    #[test]
    fn positioning_overrides_conflicting_style_key() {
        let mut doc = Document::new();
        let page = doc.page_mut(0).expect("page");
        let mut element =
            Element::new(ElementType::Container).with_position(Position::new(7.0, 8.0));
        element.styles = StyleMap::from_iter([("left", "999px")]);
        page.add_element(element);

        let bundle = serialize(&doc);
        let style = bundle
            .html
            .lines()
            .find(|l| l.starts_with("<div id="))
            .expect("container");
        let left_999 = style.find("left:999px").expect("style key");
        let left_7 = style.find("left:7px").expect("positioning");
        assert!(left_999 < left_7);
    }

    #[test]
    fn image_is_self_closing_with_escaped_src() {
        let mut doc = Document::new();
        let page = doc.page_mut(0).expect("page");
        page.add_element(Element::new(ElementType::Image).with_content("/a.png?x=1&y=\"2\""));

        let bundle = serialize(&doc);
        assert!(bundle.html.contains("src=\"/a.png?x=1&amp;y=&quot;2&quot;\""));
        assert!(bundle.html.contains("alt=\"Canvas image\" />"));
        assert!(!bundle.html.contains("</img>"));
    }

    #[test]
    fn serialization_is_deterministic_and_in_list_order() {
        let mut doc = Document::new();
        let page = doc.page_mut(0).expect("page");
        let first = page.create_element(ElementType::Text, Position::default());
        let second = page.create_element(ElementType::Heading, Position::default());
        page.send_to_back(second).expect("reorder");

        let a = serialize(&doc);
        let b = serialize(&doc);
        assert_eq!(a, b);

        let first_at = a.html.find(&first.to_string()).expect("first");
        let second_at = a.html.find(&second.to_string()).expect("second");
        assert!(first_at < second_at);
    }

    #[test]
    fn pages_are_numbered_in_order() {
        let mut doc = Document::new();
        doc.push_page(Page::new("Page 2").with_background("#000000"));

        let bundle = serialize(&doc);
        assert!(bundle.html.contains("<div class=\"page-1\">"));
        assert!(bundle.html.contains("<div class=\"page-2\">"));
        assert!(bundle.css.contains(".page-2 {\n  background-color:#000000;"));
    }

    #[test]
    fn structural_characters_in_styles_are_escaped() {
        let mut doc = Document::new();
        let page = doc.page_mut(0).expect("page");
        let mut element = Element::new(ElementType::Text).with_z_index(7);
        element.styles = StyleMap::from_iter([("font-family", "x}"), ("bad}name", "1")]);
        let id = page.add_element(element);
        page.background_color = "#fff}".to_string();

        let bundle = serialize(&doc);

        assert!(bundle.css.contains("  font-family:x\\};"));
        assert!(bundle.css.contains("background-color:#fff\\};"));
        assert!(!bundle.css.contains("bad}name"));
        assert!(!bundle.html.contains("bad}name"));
        let rule_start = bundle.css.find(&format!("#element-{id} {{")).expect("rule");
        assert!(bundle.css[rule_start..].contains("  z-index:7;"));
    }
}
