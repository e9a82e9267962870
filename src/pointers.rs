//! JSON Pointer and value path utilities
//!
//! Schema locations and `$ref` targets are fragment pointers such as
//! `#/properties/foo/items/1`; instance paths use the dotted/bracketed form
//! `foo[2].bar`.

use percent_encoding::percent_decode_str;

use crate::documents::{JsonNode, JsonValue};

/// Unescapes a JSON Pointer path component.
pub fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    component.replace("~1", "/").replace("~0", "~")
}

/// Escapes a JSON Pointer path component.
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    component.replace('~', "~0").replace('/', "~1")
}

/// Split a `#`-fragment reference into unescaped segments.
///
/// Returns `None` when the reference is not a fragment pointer (i.e. it is
/// an id). Empty segments are skipped, so `#` and `#/` both address the root.
pub fn parse_fragment(reference: &str) -> Option<Vec<String>> {
    let fragment = reference.strip_prefix('#')?;
    let decoded = percent_decode_str(fragment).decode_utf8_lossy();
    Some(
        decoded
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(unescape_component)
            .collect(),
    )
}

/// Format segments as a schema location (`#`, `#/a/b`).
pub fn format_location(segments: &[String]) -> String {
    let mut out = String::from("#");
    for segment in segments {
        out.push('/');
        out.push_str(&escape_component(segment));
    }
    out
}

/// Walk `segments` down from `root`.
///
/// Object segments are member names; array segments must be non-negative
/// integers within bounds.
pub fn evaluate<'a>(root: &'a JsonNode, segments: &[String]) -> Option<&'a JsonNode> {
    let mut current = root;
    for segment in segments {
        current = match &current.value {
            JsonValue::Object(map) => map.get(segment.as_str())?,
            JsonValue::Array(items) => {
                let index: usize = segment.parse().ok()?;
                items.get(index)?
            }
            _ => return None,
        };
    }
    Some(current)
}

/// Append a property name to an instance path.
pub fn join_property(parent: &str, name: &str) -> String {
    if is_plain_name(name) {
        if parent.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", parent, name)
        }
    } else {
        format!("{}['{}']", parent, name.replace('\\', "\\\\").replace('\'', "\\'"))
    }
}

/// Append an array index to an instance path.
pub fn join_index(parent: &str, index: usize) -> String {
    format!("{}[{}]", parent, index)
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && !name.chars().any(|c| {
            c.is_whitespace()
                || c.is_control()
                || matches!(c, '.' | '[' | ']' | '(' | ')' | '\'' | '"' | '/' | '\\')
        })
}
