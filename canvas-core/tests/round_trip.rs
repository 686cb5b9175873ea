//! Codec Round-Trip Tests
//!
//! Serializing a document and parsing the result must give back the same
//! pages, and per page the same elements in the same order with the same
//! type, content, position and size. IDs are regenerated.

use canvas_core::{
    parse, serialize, Document, Element, ElementType, Page, Position, Size, StyleMap,
};
use proptest::prelude::*;

/// What must survive a round trip, per element.
type Shape = (ElementType, String, Position, Size);

fn shapes(document: &Document) -> Vec<Vec<Shape>> {
    document
        .pages()
        .iter()
        .map(|page| {
            page.elements()
                .iter()
                .map(|e| (e.kind, e.content.clone(), e.position, e.size))
                .collect()
        })
        .collect()
}

fn z_indices(document: &Document) -> Vec<Vec<i32>> {
    document
        .pages()
        .iter()
        .map(|page| page.elements().iter().map(|e| e.z_index).collect())
        .collect()
}

fn arb_kind() -> impl Strategy<Value = ElementType> {
    prop::sample::select(ElementType::ALL.to_vec())
}

fn arb_element() -> impl Strategy<Value = Element> {
    (
        arb_kind(),
        "[ -~éü]{0,40}",
        0.0f64..2000.0,
        0.0f64..2000.0,
        10.0f64..1000.0,
        10.0f64..1000.0,
        -50i32..50,
    )
        .prop_map(|(kind, content, x, y, width, height, z)| {
            Element::new(kind)
                .with_content(content)
                .with_position(Position::new(x, y))
                .with_size(Size::new(width, height))
                .with_z_index(z)
        })
}

fn arb_page() -> impl Strategy<Value = Page> {
    (
        prop::collection::vec(arb_element(), 0..8),
        "#[0-9a-f]{6}",
    )
        .prop_map(|(elements, background)| {
            let mut page = Page::new("Page").with_background(background);
            for element in elements {
                page.add_element(element);
            }
            page
        })
}

fn arb_document() -> impl Strategy<Value = Document> {
    prop::collection::vec(arb_page(), 1..4).prop_map(Document::from_pages)
}

proptest! {
    #[test]
    fn prop_parse_inverts_serialize(doc in arb_document()) {
        let bundle = serialize(&doc);
        let parsed = parse(&bundle.html, &bundle.css);

        prop_assert_eq!(parsed.page_count(), doc.page_count());
        prop_assert_eq!(shapes(&parsed), shapes(&doc));
        for (original, back) in doc.pages().iter().zip(parsed.pages()) {
            prop_assert_eq!(&back.background_color, &original.background_color);
        }
    }

    #[test]
    fn prop_reserialize_is_equivalent(doc in arb_document()) {
        let once = parse(&serialize(&doc).html, &serialize(&doc).css);
        let bundle = serialize(&once);
        let twice = parse(&bundle.html, &bundle.css);

        prop_assert_eq!(shapes(&twice), shapes(&doc));
        prop_assert_eq!(z_indices(&once), z_indices(&twice));
    }

    #[test]
    fn prop_serialize_is_deterministic(doc in arb_document()) {
        prop_assert_eq!(serialize(&doc), serialize(&doc.clone()));
    }

    #[test]
    fn prop_style_values_cannot_break_rules(
        values in prop::collection::vec("[!-~]([ -~]{0,18}[!-~])?", 1..5),
        background in "[!-~]{1,12}",
    ) {
        let mut page = Page::new("Page 1").with_background(background.clone());
        for (z, value) in (0_i32..).zip(&values) {
            let mut element = Element::new(ElementType::Text).with_z_index(100 - z * 7);
            element.styles = StyleMap::from_iter([
                ("font-family", value.as_str()),
                ("color", value.as_str()),
            ]);
            page.add_element(element);
        }
        let doc = Document::from_pages(vec![page]);

        let bundle = serialize(&doc);
        let parsed = parse(&bundle.html, &bundle.css);

        let back = &parsed.pages()[0];
        prop_assert_eq!(&back.background_color, &background);
        prop_assert_eq!(back.element_count(), values.len());
        for (original, parsed) in doc.pages()[0].elements().iter().zip(back.elements()) {
            prop_assert_eq!(parsed.z_index, original.z_index);
            prop_assert_eq!(parsed.styles.get("color"), original.styles.get("color"));
        }
    }
}

#[test]
fn test_ids_are_regenerated() {
    let mut doc = Document::new();
    let id = doc
        .page_mut(0)
        .expect("page")
        .create_element(ElementType::Text, Position::default());

    let bundle = serialize(&doc);
    let parsed = parse(&bundle.html, &bundle.css);

    let back = &parsed.pages()[0].elements()[0];
    assert_ne!(back.id, id);
}

#[test]
fn test_page_without_elements_survives() {
    let mut doc = Document::new();
    doc.push_page(Page::new("Page 2"));
    doc.page_mut(1)
        .expect("page")
        .create_element(ElementType::Image, Position::new(1.0, 2.0));
    doc.push_page(Page::new("Page 3"));

    let bundle = serialize(&doc);
    let parsed = parse(&bundle.html, &bundle.css);

    let counts: Vec<_> = parsed.pages().iter().map(Page::element_count).collect();
    assert_eq!(counts, vec![0, 1, 0]);
}

#[test]
fn test_hand_written_markup_degrades_gracefully() {
    let html = r#"
        <!DOCTYPE html>
        <html>
          <head><title>Promo</title><style>.x { color: red }</style></head>
          <body>
            <h3 style="left: 40px; top: 10px; font-size: 20px">Sale</h3>
            <marquee>ignored</marquee>
            <img src="/hero.png" style="width: 640px">
            <div style="left: oops">Box</div>
          </body>
        </html>
    "#;

    let doc = parse(html, "body { background-color: #fafafa; }");

    assert_eq!(doc.page_count(), 1);
    let page = &doc.pages()[0];
    assert_eq!(page.background_color, "#fafafa");
    let elements = page.elements();
    assert_eq!(elements.len(), 3);

    assert_eq!(elements[0].kind, ElementType::Heading);
    assert_eq!(elements[0].styles.get("font-size"), Some("20px"));
    assert_eq!(elements[0].position, Position::new(40.0, 10.0));

    assert_eq!(elements[1].kind, ElementType::Image);
    assert_eq!(elements[1].content, "/hero.png");
    assert_eq!(elements[1].size.width, 640.0);

    assert_eq!(elements[2].kind, ElementType::Container);
    assert_eq!(elements[2].position, Position::new(0.0, 0.0));
    assert_eq!(elements.iter().map(|e| e.z_index).collect::<Vec<_>>(), vec![1, 2, 3]);
}

#[test]
fn test_closing_brace_in_style_keeps_later_z_indices() {
    let mut page = Page::new("Page 1");
    let mut styled = Element::new(ElementType::Heading).with_z_index(7);
    styled.styles.insert("font-family", "x}");
    styled.styles.insert("color", "red}");
    page.add_element(styled);
    page.add_element(Element::new(ElementType::Button).with_z_index(-3));
    let doc = Document::from_pages(vec![page]);

    let bundle = serialize(&doc);
    let parsed = parse(&bundle.html, &bundle.css);

    let elements = parsed.pages()[0].elements();
    let z: Vec<_> = elements.iter().map(|e| e.z_index).collect();
    assert_eq!(z, vec![7, -3]);
    assert_eq!(elements[0].styles.get("color"), Some("red}"));
}
