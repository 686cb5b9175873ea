//! Ordered style maps and CSS declaration parsing.
//!
//! Style extraction never touches a live rendering engine: inline `style`
//! attributes and stylesheet rule bodies are both read through
//! [`parse_declarations`], which is a pure function over the declaration text.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Ordered mapping of CSS property name to value.
///
/// Insertion order is preserved and is the order declarations are emitted
/// in. Re-inserting an existing property replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleMap(Vec<(String, String)>);

impl StyleMap {
    /// Create an empty style map.
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Set a property, returning the previous value if there was one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.0.iter_mut().find(|(n, _)| *n == name) {
            return Some(std::mem::replace(&mut slot.1, value));
        }
        self.0.push((name, value));
        None
    }

    /// Look up a property value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Remove a property.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let idx = self.0.iter().position(|(n, _)| n == name)?;
        Some(self.0.remove(idx).1)
    }

    /// Iterate over `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map has no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as `name:value` declarations joined by `; `.
    #[must_use]
    pub fn to_declarations(&self) -> String {
        self.iter()
            .map(|(n, v)| format!("{n}:{v}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StyleMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Serialize for StyleMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StyleMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StyleMapVisitor;

        impl<'de> Visitor<'de> for StyleMapVisitor {
            type Value = StyleMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of style property names to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<StyleMap, A::Error> {
                let mut map = StyleMap::new();
                while let Some((k, v)) = access.next_entry::<String, String>()? {
                    map.insert(k, v);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(StyleMapVisitor)
    }
}

/// Parse a CSS declaration block (`a: 1; b: 2`) into a [`StyleMap`].
///
/// Property names are lower-cased. Later declarations override earlier ones
/// with the same name. Declarations without a colon, or with an empty name
/// or value, are dropped. Escapes written by [`escape_value`] are undone.
#[must_use]
pub fn parse_declarations(input: &str) -> StyleMap {
    let mut map = StyleMap::new();
    for chunk in split_top_level(input, b';') {
        let Some((name, value)) = chunk.split_once(':') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        let value = value.trim();
        if name.is_empty() || value.is_empty() {
            continue;
        }
        map.insert(name, unescape_value(value));
    }
    map
}

/// Parse a pixel length such as `40px`, `12.5px` or a bare `40`.
#[must_use]
pub fn parse_px(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let number = trimmed
        .strip_suffix("px")
        .or_else(|| trimmed.strip_suffix("PX"))
        .unwrap_or(trimmed)
        .trim();
    number.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Format a length as `<n>px` using the shortest round-trip decimal form.
#[must_use]
pub fn format_px(value: f64) -> String {
    format!("{value}px")
}

/// Whether `name` can be emitted as a property name.
pub(crate) fn is_property_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Characters [`escape_value`] may put a backslash in front of.
const ESCAPABLE: [char; 9] = ['{', '}', ';', '\\', '(', ')', '"', '\'', '*'];

/// Backslash-escape a declaration value so it cannot end its declaration
/// or its rule early.
///
/// Outside quoted strings, `{`, `}`, `;` and `\` are escaped, as are a `*`
/// that would open a comment and any quote or parenthesis left unbalanced.
/// Quoted strings are copied untouched.
pub(crate) fn escape_value(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut escaped = vec![false; chars.len()];
    let mut open_parens: Vec<usize> = Vec::new();
    let mut idx = 0_usize;

    while idx < chars.len() {
        match chars[idx] {
            q @ ('"' | '\'') => match closing_quote(&chars, idx + 1, q) {
                Some(end) => {
                    idx = end + 1;
                    continue;
                }
                None => escaped[idx] = true,
            },
            '(' => open_parens.push(idx),
            ')' => {
                if open_parens.pop().is_none() {
                    escaped[idx] = true;
                }
            }
            '{' | '}' | ';' | '\\' => escaped[idx] = true,
            '*' if idx > 0 && chars[idx - 1] == '/' => escaped[idx] = true,
            _ => {}
        }
        idx += 1;
    }
    for unmatched in open_parens {
        escaped[unmatched] = true;
    }

    let mut out = String::with_capacity(value.len());
    for (ch, esc) in chars.into_iter().zip(escaped) {
        if esc {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn closing_quote(chars: &[char], from: usize, quote: char) -> Option<usize> {
    let mut escape = false;
    for (idx, &ch) in chars.iter().enumerate().skip(from) {
        if escape {
            escape = false;
        } else if ch == '\\' {
            escape = true;
        } else if ch == quote {
            return Some(idx);
        }
    }
    None
}

/// Undo [`escape_value`]. Other backslash sequences are kept verbatim.
fn unescape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut quote: Option<char> = None;
    let mut chars = value.chars();

    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            out.push(ch);
            if ch == '\\' {
                out.extend(chars.next());
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '\\' => match chars.next() {
                Some(next) if ESCAPABLE.contains(&next) => out.push(next),
                Some(next) => {
                    out.push(ch);
                    out.push(next);
                }
                None => out.push(ch),
            },
            '"' | '\'' => {
                quote = Some(ch);
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Split on `sep` where it is not inside quotes or parentheses.
pub(crate) fn split_top_level(input: &str, sep: u8) -> Vec<&str> {
    let bytes = input.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0_usize;
    let mut paren_depth = 0_u32;
    let mut quote: Option<u8> = None;
    let mut escape = false;

    for (idx, &byte) in bytes.iter().enumerate() {
        if escape {
            escape = false;
            continue;
        }
        if byte == b'\\' {
            escape = true;
            continue;
        }
        if let Some(q) = quote {
            if byte == q {
                quote = None;
            }
            continue;
        }

        match byte {
            b'\'' | b'"' => quote = Some(byte),
            b'(' => paren_depth = paren_depth.saturating_add(1),
            b')' => paren_depth = paren_depth.saturating_sub(1),
            _ if byte == sep && paren_depth == 0 => {
                parts.push(&input[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut map = StyleMap::new();
        map.insert("color", "red");
        map.insert("margin", "0");
        let old = map.insert("color", "blue");

        assert_eq!(old.as_deref(), Some("red"));
        let pairs: Vec<_> = map.iter().collect();
        assert_eq!(pairs, vec![("color", "blue"), ("margin", "0")]);
    }

    #[test]
    fn test_parse_declarations_basic() {
        let map = parse_declarations("font-size: 32px; Color:#fff;; margin:0");
        assert_eq!(map.get("font-size"), Some("32px"));
        assert_eq!(map.get("color"), Some("#fff"));
        assert_eq!(map.get("margin"), Some("0"));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_parse_declarations_later_wins() {
        let map = parse_declarations("left:5px; position:absolute; left:40px");
        assert_eq!(map.get("left"), Some("40px"));
    }

    #[test]
    fn test_parse_declarations_respects_quotes_and_parens() {
        let map = parse_declarations(
            "font-family: \"a;b\", serif; background-image: url(data:x;base64,AAA)",
        );
        assert_eq!(map.get("font-family"), Some("\"a;b\", serif"));
        assert_eq!(map.get("background-image"), Some("url(data:x;base64,AAA)"));
    }

    #[test]
    fn test_parse_declarations_drops_garbage() {
        let map = parse_declarations("nonsense; :novalue; empty:  ;  ");
        assert!(map.is_empty());
    }

    #[test]
    fn test_parse_px() {
        assert_eq!(parse_px("40px"), Some(40.0));
        assert_eq!(parse_px(" 12.5px "), Some(12.5));
        assert_eq!(parse_px("7"), Some(7.0));
        assert_eq!(parse_px("auto"), None);
        assert_eq!(parse_px("NaNpx"), None);
    }

    #[test]
    fn test_format_px_shortest_form() {
        assert_eq!(format_px(40.0), "40px");
        assert_eq!(format_px(40.5), "40.5px");
        assert_eq!(parse_px(&format_px(0.1 + 0.2)), Some(0.1 + 0.2));
    }

    #[test]
    fn test_style_map_json_preserves_order() {
        let map: StyleMap = [("z", "1"), ("a", "2")].into_iter().collect();
        let json = serde_json::to_string(&map).expect("serialize");
        assert_eq!(json, r#"{"z":"1","a":"2"}"#);

        let back: StyleMap = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, map);
    }

    #[test]
    fn test_escaped_values_survive_declaration_parsing() {
        let values = [
            "x}",
            "a; b",
            "{weird}",
            "url(x",
            "y)",
            "\"open",
            "back\\slash",
            "a/*b",
            "\"quoted } ; kept\", serif",
        ];
        for value in values {
            let block = format!("font-family:{}; z-index:7", escape_value(value));
            let map = parse_declarations(&block);
            assert_eq!(map.get("font-family"), Some(value), "value {value:?}");
            assert_eq!(map.get("z-index"), Some("7"), "value {value:?}");
        }
    }

    #[test]
    fn test_escape_leaves_plain_values_alone() {
        assert_eq!(escape_value("2px dashed #d1d5db"), "2px dashed #d1d5db");
        assert_eq!(escape_value("url(a.png)"), "url(a.png)");
        assert_eq!(escape_value("\"a;b\", serif"), "\"a;b\", serif");
        assert_eq!(escape_value("x}"), "x\\}");
    }

    #[test]
    fn test_unknown_escapes_kept_verbatim() {
        let map = parse_declarations("font-family: \\5FAE");
        assert_eq!(map.get("font-family"), Some("\\5FAE"));
    }

    #[test]
    fn test_property_names() {
        assert!(is_property_name("font-size"));
        assert!(is_property_name("--brand_color"));
        assert!(!is_property_name(""));
        assert!(!is_property_name("a}b"));
        assert!(!is_property_name("a:b"));
    }
}
