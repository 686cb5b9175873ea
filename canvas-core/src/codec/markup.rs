//! Lenient HTML scanner producing a small node tree.
//!
//! Only what the codec needs: tags, attributes, text, void elements and
//! entity decoding. Comments, doctypes, processing instructions and the
//! contents of `<script>`/`<style>` are dropped. Malformed input never
//! fails; stray end tags are ignored and unclosed elements are closed at
//! end of input.

/// Element node of the scanned tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ElementNode {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// Any node of the scanned tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
    Element(ElementNode),
    Text(String),
}

impl ElementNode {
    fn new(name: String, attrs: Vec<(String, String)>) -> Self {
        Self {
            name,
            attrs,
            children: Vec::new(),
        }
    }

    /// Attribute value by (lower-case) name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whitespace-separated class tokens.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    /// Concatenated text of every descendant text node.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// First descendant element with the given name, depth first.
    pub fn find(&self, name: &str) -> Option<&ElementNode> {
        self.children.iter().find_map(|child| match child {
            Node::Element(el) if el.name == name => Some(el),
            Node::Element(el) => el.find(name),
            Node::Text(_) => None,
        })
    }

    /// Visit descendant elements in document order. `visit` returns whether
    /// to descend into the element it was given.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a ElementNode) -> bool) {
        for child in &self.children {
            if let Node::Element(el) = child {
                if visit(el) {
                    el.walk(visit);
                }
            }
        }
    }
}

fn collect_text(node: &ElementNode, out: &mut String) {
    for child in &node.children {
        match child {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => collect_text(el, out),
        }
    }
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Scan markup into a tree rooted at a synthetic `#root` element.
pub(crate) fn parse_markup(input: &str) -> ElementNode {
    let bytes = input.as_bytes();
    let mut stack = vec![ElementNode::new("#root".to_string(), Vec::new())];
    let mut idx = 0_usize;

    while idx < bytes.len() {
        if bytes[idx] != b'<' {
            let next = find_byte(bytes, idx, b'<').unwrap_or(bytes.len());
            push_text(&mut stack, &input[idx..next]);
            idx = next;
            continue;
        }

        if starts_with(bytes, idx, b"<!--") {
            idx = skip_comment(bytes, idx);
            continue;
        }

        if starts_with(bytes, idx, b"<!") {
            idx = skip_to_gt(bytes, idx.saturating_add(2));
            continue;
        }

        if starts_with(bytes, idx, b"<?") {
            idx = skip_processing_instruction(bytes, idx);
            continue;
        }

        let Some((tag, next_idx)) = parse_tag(input, idx) else {
            push_text(&mut stack, "<");
            idx = idx.saturating_add(1);
            continue;
        };
        idx = next_idx;

        if tag.is_end {
            close_element(&mut stack, &tag.name);
            continue;
        }

        if !tag.self_closing && (tag.name == "script" || tag.name == "style") {
            idx = skip_raw_text(bytes, idx, tag.name.as_bytes());
            continue;
        }

        let element = ElementNode::new(tag.name, tag.attrs);
        if tag.self_closing || is_void(&element.name) {
            append(&mut stack, Node::Element(element));
        } else {
            stack.push(element);
        }
    }

    while stack.len() > 1 {
        pop_into_parent(&mut stack);
    }
    stack.pop().unwrap_or_default()
}

fn append(stack: &mut [ElementNode], node: Node) {
    if let Some(top) = stack.last_mut() {
        top.children.push(node);
    }
}

fn push_text(stack: &mut [ElementNode], raw: &str) {
    if raw.is_empty() {
        return;
    }
    append(stack, Node::Text(decode_entities(raw)));
}

fn pop_into_parent(stack: &mut Vec<ElementNode>) {
    if stack.len() < 2 {
        return;
    }
    if let Some(done) = stack.pop() {
        append(stack, Node::Element(done));
    }
}

fn close_element(stack: &mut Vec<ElementNode>, name: &str) {
    // Index 0 is the synthetic root and never closes.
    let Some(open_at) = stack.iter().skip(1).rposition(|el| el.name == name) else {
        return;
    };
    let open_at = open_at + 1;
    while stack.len() > open_at {
        pop_into_parent(stack);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ParsedTag {
    name: String,
    attrs: Vec<(String, String)>,
    is_end: bool,
    self_closing: bool,
}

fn parse_tag(input: &str, start: usize) -> Option<(ParsedTag, usize)> {
    let bytes = input.as_bytes();
    if bytes.get(start).copied() != Some(b'<') {
        return None;
    }

    let mut idx = start.saturating_add(1);
    let mut is_end = false;
    if bytes.get(idx).copied() == Some(b'/') {
        is_end = true;
        idx = idx.saturating_add(1);
    }

    let name_start = idx;
    while idx < bytes.len() && is_tag_name_char(bytes[idx]) {
        idx = idx.saturating_add(1);
    }
    if idx == name_start {
        return None;
    }
    let name = input[name_start..idx].to_ascii_lowercase();

    let mut attrs = Vec::new();
    let mut self_closing = false;
    loop {
        idx = skip_spaces(bytes, idx);
        match bytes.get(idx).copied() {
            None => return None,
            Some(b'>') => break,
            Some(b'/') => {
                self_closing = true;
                idx = idx.saturating_add(1);
                continue;
            }
            Some(_) => {}
        }
        self_closing = false;

        let attr_start = idx;
        while idx < bytes.len()
            && !bytes[idx].is_ascii_whitespace()
            && !matches!(bytes[idx], b'=' | b'>' | b'/')
        {
            idx = idx.saturating_add(1);
        }
        if idx == attr_start {
            // Lone `=` or similar junk.
            idx = idx.saturating_add(1);
            continue;
        }
        let attr_name = input[attr_start..idx].to_ascii_lowercase();

        idx = skip_spaces(bytes, idx);
        if bytes.get(idx).copied() != Some(b'=') {
            attrs.push((attr_name, String::new()));
            continue;
        }
        idx = skip_spaces(bytes, idx.saturating_add(1));

        let value = match bytes.get(idx).copied() {
            Some(quote @ (b'"' | b'\'')) => {
                let value_start = idx.saturating_add(1);
                let end = find_byte(bytes, value_start, quote)?;
                idx = end.saturating_add(1);
                &input[value_start..end]
            }
            _ => {
                let value_start = idx;
                while idx < bytes.len() && !bytes[idx].is_ascii_whitespace() && bytes[idx] != b'>' {
                    idx = idx.saturating_add(1);
                }
                &input[value_start..idx]
            }
        };
        attrs.push((attr_name, decode_entities(value)));
    }

    Some((
        ParsedTag {
            name,
            attrs,
            is_end,
            self_closing,
        },
        idx.saturating_add(1),
    ))
}

fn skip_raw_text(bytes: &[u8], start: usize, tag_name: &[u8]) -> usize {
    let mut idx = start;
    while idx < bytes.len() {
        if bytes[idx] == b'<'
            && bytes.get(idx.saturating_add(1)).copied() == Some(b'/')
            && starts_with_ignore_ascii_case(bytes, idx.saturating_add(2), tag_name)
            && tag_name_boundary(bytes, idx.saturating_add(2 + tag_name.len()))
        {
            return skip_to_gt(bytes, idx);
        }
        idx = idx.saturating_add(1);
    }
    bytes.len()
}

/// Escape text or an attribute value for inclusion in markup.
pub(crate) fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Decode named (`amp lt gt quot apos nbsp`) and numeric character
/// references. Unknown references are left as written.
pub(crate) fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_reference(&rest[1..semi]).map(|ch| (ch, semi)));
        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    }
}

fn skip_comment(bytes: &[u8], start: usize) -> usize {
    find_subslice(bytes, start.saturating_add(4), b"-->")
        .map_or(bytes.len(), |end| end.saturating_add(3))
}

fn skip_processing_instruction(bytes: &[u8], start: usize) -> usize {
    if let Some(end) = find_subslice(bytes, start.saturating_add(2), b"?>") {
        return end.saturating_add(2);
    }
    skip_to_gt(bytes, start.saturating_add(2))
}

fn skip_to_gt(bytes: &[u8], from: usize) -> usize {
    find_byte(bytes, from, b'>').map_or(bytes.len(), |gt| gt.saturating_add(1))
}

fn tag_name_boundary(bytes: &[u8], idx: usize) -> bool {
    match bytes.get(idx).copied() {
        None => true,
        Some(byte) => byte.is_ascii_whitespace() || byte == b'>' || byte == b'/',
    }
}

fn skip_spaces(bytes: &[u8], mut idx: usize) -> usize {
    while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
        idx = idx.saturating_add(1);
    }
    idx
}

fn is_tag_name_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b':')
}

fn starts_with(bytes: &[u8], idx: usize, pattern: &[u8]) -> bool {
    bytes
        .get(idx..idx.saturating_add(pattern.len()))
        .is_some_and(|window| window == pattern)
}

fn starts_with_ignore_ascii_case(bytes: &[u8], idx: usize, pattern: &[u8]) -> bool {
    bytes
        .get(idx..idx.saturating_add(pattern.len()))
        .is_some_and(|window| window.eq_ignore_ascii_case(pattern))
}

fn find_subslice(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| from + offset)
}

fn find_byte(bytes: &[u8], from: usize, byte: u8) -> Option<usize> {
    bytes
        .get(from..)?
        .iter()
        .position(|candidate| *candidate == byte)
        .map(|offset| from + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_element(root: &ElementNode) -> &ElementNode {
        root.children
            .iter()
            .find_map(|n| match n {
                Node::Element(el) => Some(el),
                Node::Text(_) => None,
            })
            .expect("element")
    }

    #[test]
    fn parses_nested_elements_and_attributes() {
        let root = parse_markup(
            r#"<div class="page-1"><p id=x style='color: red'>Hi <b>there</b></p></div>"#,
        );
        let page = first_element(&root);
        assert_eq!(page.name, "div");
        assert_eq!(page.attr("class"), Some("page-1"));

        let p = page.find("p").expect("p");
        assert_eq!(p.attr("id"), Some("x"));
        assert_eq!(p.attr("style"), Some("color: red"));
        assert_eq!(p.text_content(), "Hi there");
    }

    #[test]
    fn void_and_self_closing_elements_have_no_children() {
        let root = parse_markup(r#"<div><img src="a.png"><img src="b.png" /><p>x</p></div>"#);
        let div = first_element(&root);
        let names: Vec<_> = div
            .children
            .iter()
            .filter_map(|n| match n {
                Node::Element(el) => Some(el.name.as_str()),
                Node::Text(_) => None,
            })
            .collect();
        assert_eq!(names, vec!["img", "img", "p"]);
    }

    #[test]
    fn skips_comments_doctype_script_and_style() {
        let root = parse_markup(
            "<!DOCTYPE html><!-- <p>no</p> --><body><script>if (a < b) {}</script><style>p{}</style><p>yes</p></body>",
        );
        let body = root.find("body").expect("body");
        assert_eq!(body.text_content(), "yes");
        assert!(body.find("script").is_none());
    }

    #[test]
    fn tolerates_stray_and_missing_end_tags() {
        let root = parse_markup("</span><div><p>open");
        let div = first_element(&root);
        assert_eq!(div.text_content(), "open");
    }

    #[test]
    fn decodes_entities() {
        assert_eq!(decode_entities("a &amp; b &lt;c&gt; &#39;&#x41;&quot;"), "a & b <c> 'A\"");
        assert_eq!(decode_entities("&unknown; & alone"), "&unknown; & alone");
        assert_eq!(decode_entities("&nbsp;"), "\u{a0}");
    }

    #[test]
    fn escape_then_decode_is_identity() {
        let raw = r#"<b>"Tom" & 'Jerry'</b>"#;
        assert_eq!(decode_entities(&escape(raw)), raw);
    }

    #[test]
    fn walk_respects_descend_flag() {
        let root = parse_markup("<div class=page-1><p>a</p></div><div class=page-2><p>b</p></div>");
        let mut seen = Vec::new();
        root.walk(&mut |el| {
            seen.push(el.name.clone());
            el.name != "div"
        });
        assert_eq!(seen, vec!["div", "div"]);
    }
}
