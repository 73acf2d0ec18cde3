//! Line parser: one outline line in, one node descriptor out.
//!
//! The upstream snapshot generator is loosely structured by design, so
//! parsing is best-effort: a line either matches
//! `[ws]* "- " <kind> [text] ["[ref=" id "]"]` and yields a descriptor, or
//! it is skipped. Nothing here is an error.

use crate::kind::ElementKind;

/// A parsed outline line, not yet attached to a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    /// Declared role of the element.
    pub kind: ElementKind,
    /// Stable re-targeting id from a trailing `[ref=…]` marker.
    pub reference_id: Option<String>,
    /// Visible text between the role token and the reference marker,
    /// trimmed and unquoted.
    pub inline_text: Option<String>,
    /// Count of leading whitespace characters.
    pub indent: usize,
    /// Zero-based index of the line in the input document.
    pub line_number: usize,
}

/// Parse a whole outline document into ordered line descriptors.
///
/// Blank and malformed lines contribute nothing; the descriptors keep
/// their original line numbers for diagnostics and range labeling.
pub fn parse_outline(text: &str) -> Vec<ParsedLine> {
    text.lines()
        .enumerate()
        .filter_map(|(number, line)| parse_line(line, number))
        .collect()
}

/// Parse a single outline line.
///
/// Returns `None` for blank lines and for lines without a recognizable
/// `- kind` prefix.
pub fn parse_line(line: &str, line_number: usize) -> Option<ParsedLine> {
    let indent = line.chars().take_while(|c| c.is_whitespace()).count();
    let body = line.trim_start();
    if body.is_empty() {
        return None;
    }

    // The element marker is a literal "- " (a bare "-" with nothing after
    // it carries no role and is dropped like any other malformed line).
    let rest = body.strip_prefix("- ")?;

    let mut rest = rest.trim();
    // Lines with children end in a colon in some generator dialects.
    rest = rest.strip_suffix(':').unwrap_or(rest).trim_end();

    let token_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let token = &rest[..token_end];
    if token.is_empty() {
        return None;
    }
    let kind = ElementKind::from_token(token);

    let remainder = rest[token_end..].trim();

    // The reference marker trails the line; everything before it is text.
    if let Some(open) = remainder.rfind("[ref=") {
        if let Some(close) = remainder[open..].find(']') {
            let id = &remainder[open + "[ref=".len()..open + close];
            let before = &remainder[..open];
            let after = &remainder[open + close + 1..];
            return Some(ParsedLine {
                kind,
                reference_id: (!id.is_empty()).then(|| id.to_string()),
                inline_text: clean_text(&format!("{before}{after}")),
                indent,
                line_number,
            });
        }
    }

    Some(ParsedLine {
        kind,
        reference_id: None,
        inline_text: clean_text(remainder),
        indent,
        line_number,
    })
}

/// Trim a text segment and strip one pair of surrounding double quotes.
fn clean_text(raw: &str) -> Option<String> {
    let mut text = raw.trim();
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        text = &text[1..text.len() - 1];
    }
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
