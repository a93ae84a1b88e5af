//! Re-emitting JSON text for nodes whose source span is stale.

use std::fmt::Write as _;

use super::{Children, Link, Node, NodeKind, Text};
use crate::value::{Value, write_escaped_string};

/// Compact text of a container, reusing the text of clean children as is.
pub(super) fn render(node: Node<'_>) -> Vec<u8> {
    let slot = node.slot();
    let mut out = Vec::new();
    match &slot.children {
        Children::Array(_) => {
            out.push(b'[');
            for (i, child) in node.children().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                out.extend_from_slice(child.source());
            }
            out.push(b']');
        }
        Children::Object(_) => {
            out.push(b'{');
            for (i, (key, child)) in node.entries().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                out.extend_from_slice(quote(key).as_bytes());
                out.push(b':');
                out.extend_from_slice(child.source());
            }
            out.push(b'}');
        }
        Children::Leaf => match &slot.text {
            Text::Span(start, end) => out.extend_from_slice(&node.doc.source[*start..*end]),
            Text::Owned(text) => out.extend_from_slice(text),
            Text::None => out.extend_from_slice(b"null"),
        },
    }
    out
}

pub(super) fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    // writing into a String cannot fail
    let _ = write_escaped_string(s, &mut out);
    out.push('"');
    out
}

/// Kind and raw text for a node built from `value`. Containers get no text
/// of their own; non-finite numbers become `null`.
pub(super) fn content(value: &Value) -> (NodeKind, Text) {
    match value.kind() {
        kind @ (NodeKind::Array | NodeKind::Object) => (kind, Text::None),
        kind => (kind, Text::Owned(value.to_string().into_bytes().into_boxed_slice())),
    }
}

pub(super) fn push_path_link(out: &mut String, link: &Link) {
    match link {
        Link::Root => {}
        Link::Index(i) => {
            let _ = write!(out, "[{i}]");
        }
        Link::Key(key) => {
            out.push_str("['");
            for c in key.chars() {
                if matches!(c, '\'' | '\\') {
                    out.push('\\');
                }
                out.push(c);
            }
            out.push_str("']");
        }
    }
}
