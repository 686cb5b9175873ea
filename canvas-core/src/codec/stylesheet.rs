//! Stylesheet parsing into selector → declaration rules.

use crate::style::{parse_declarations, split_top_level, StyleMap};

/// One style rule with a single (already split) selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Rule {
    pub selector: String,
    pub declarations: StyleMap,
}

/// Parsed stylesheet, rules in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Stylesheet {
    rules: Vec<Rule>,
}

impl Stylesheet {
    /// Parse stylesheet text. Never fails; unparseable blocks are skipped.
    pub fn parse(input: &str) -> Self {
        let sanitized = strip_comments(input);
        let mut rules = Vec::new();
        parse_rules_recursive(&sanitized, &mut rules);
        Self { rules }
    }

    /// Declarations of every rule whose selector is exactly `selector`,
    /// merged in source order (later wins).
    pub fn declarations_for(&self, selector: &str) -> StyleMap {
        let mut merged = StyleMap::new();
        for rule in self.rules.iter().filter(|r| r.selector == selector) {
            for (name, value) in rule.declarations.iter() {
                merged.insert(name, value);
            }
        }
        merged
    }

    /// Value of one property for `selector`, if any rule sets it.
    pub fn property(&self, selector: &str, name: &str) -> Option<String> {
        self.rules
            .iter()
            .rev()
            .filter(|r| r.selector == selector)
            .find_map(|r| r.declarations.get(name))
            .map(str::to_string)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

fn parse_rules_recursive(input: &str, out: &mut Vec<Rule>) {
    let mut cursor = 0_usize;

    while let Some((selector_raw, body_raw, next_cursor)) = next_rule_block(input, cursor) {
        cursor = next_cursor;

        let selector = normalize_ws(selector_raw);
        if selector.is_empty() {
            continue;
        }

        if is_grouping_at_rule(&selector) {
            parse_rules_recursive(body_raw, out);
            continue;
        }
        if selector.starts_with('@') {
            continue;
        }

        let declarations = parse_declarations(body_raw);
        if declarations.is_empty() {
            continue;
        }

        for single in split_top_level(&selector, b',') {
            let single = single.trim();
            if !single.is_empty() {
                out.push(Rule {
                    selector: single.to_string(),
                    declarations: declarations.clone(),
                });
            }
        }
    }
}

fn next_rule_block(input: &str, from: usize) -> Option<(&str, &str, usize)> {
    let start = skip_rule_separators(input, from);
    if start >= input.len() {
        return None;
    }

    let open = find_top_level_open_brace(input, start)?;
    let Some(close) = find_matching_brace(input, open) else {
        // Unterminated block runs to end of input.
        return Some((&input[start..open], &input[open + 1..], input.len()));
    };
    Some((&input[start..open], &input[open + 1..close], close + 1))
}

fn skip_rule_separators(input: &str, mut idx: usize) -> usize {
    let bytes = input.as_bytes();
    while idx < bytes.len() && (bytes[idx].is_ascii_whitespace() || bytes[idx] == b';') {
        idx = idx.saturating_add(1);
    }
    idx
}

fn find_top_level_open_brace(input: &str, from: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    let mut quote: Option<u8> = None;
    let mut escape = false;
    let mut paren_depth = 0_u32;

    for (idx, &byte) in bytes.iter().enumerate().skip(from) {
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
            b'{' if paren_depth == 0 => return Some(idx),
            _ => {}
        }
    }
    None
}

fn find_matching_brace(input: &str, open_brace: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    if bytes.get(open_brace).copied() != Some(b'{') {
        return None;
    }

    let mut quote: Option<u8> = None;
    let mut escape = false;
    let mut depth = 1_u32;

    for (idx, &byte) in bytes.iter().enumerate().skip(open_brace + 1) {
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
            b'{' => depth = depth.saturating_add(1),
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

fn is_grouping_at_rule(selector: &str) -> bool {
    let lower = selector.to_ascii_lowercase();
    lower.starts_with("@media") || lower.starts_with("@supports") || lower.starts_with("@layer")
}

fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut quote: Option<char> = None;
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            out.push(ch);
            out.extend(chars.next());
            continue;
        }
        if let Some(q) = quote {
            out.push(ch);
            if ch == q {
                quote = None;
            }
            continue;
        }

        if ch == '/' && chars.peek() == Some(&'*') {
            chars.next();
            let mut prev = '\0';
            for inner in chars.by_ref() {
                if prev == '*' && inner == '/' {
                    break;
                }
                prev = inner;
            }
            continue;
        }

        if ch == '\'' || ch == '"' {
            quote = Some(ch);
        }
        out.push(ch);
    }
    out
}

fn normalize_ws(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}
