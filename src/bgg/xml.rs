//! Lookup helpers over parsed XML.
//!
//! Upstream items are sparse: any element may be missing and numeric
//! attributes occasionally hold text such as `Not Ranked`. [`Field`] keeps
//! the three outcomes apart so callers decide what each one means.

use std::str::FromStr;

use roxmltree::{Document, Node};

use crate::{bgg::BggError, warning};

/// Result of looking up one optional value.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    Present(T),
    Absent,
    /// The value exists but does not parse; carries the raw text.
    Malformed(String),
}

impl<T> Field<T> {
    /// Collapses to an `Option`, warning about malformed values.
    pub fn into_option(self, item_id: u32, field: &str) -> Option<T> {
        match self {
            Field::Present(value) => Some(value),
            Field::Absent => None,
            Field::Malformed(raw) => {
                warning!(
                    "Ignoring malformed {} {:?} for item {}",
                    field,
                    raw,
                    item_id
                );
                None
            }
        }
    }

    /// Collapses to an `Option`, treating malformed values as absent.
    pub fn ok(self) -> Option<T> {
        match self {
            Field::Present(value) => Some(value),
            _ => None,
        }
    }
}

impl<T: FromStr> Field<T> {
    /// Parses an optional raw string.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None => Field::Absent,
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(value) => Field::Present(value),
                Err(_) => Field::Malformed(raw.to_string()),
            },
        }
    }
}

pub fn parse(body: &str) -> Result<Document<'_>, BggError> {
    Ok(Document::parse(body)?)
}

/// First descendant element named `tag`, not counting `node` itself.
pub fn find<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.descendants()
        .skip(1)
        .find(|n| n.is_element() && n.tag_name().name() == tag)
}

/// All descendant elements named `tag`, in document order.
pub fn find_all<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.descendants()
        .skip(1)
        .filter(move |n| n.is_element() && n.tag_name().name() == tag)
}

/// Concatenated text of an element and all its descendants.
pub fn text_of(node: Node) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

/// `attr` of the first descendant named `tag`.
pub fn attr_field<T: FromStr>(node: Node, tag: &str, attr: &str) -> Field<T> {
    Field::parse(find(node, tag).and_then(|n| n.attribute(attr)))
}

/// Text content of the first descendant named `tag`.
pub fn text_field<T: FromStr>(node: Node, tag: &str) -> Field<T> {
    let text = find(node, tag).map(text_of);
    Field::parse(text.as_deref())
}

/// Extracts the message of an upstream error payload, if `body` is one.
///
/// Recognises `<errors><error><message>..</message></error></errors>`,
/// `<error>text</error>` and `<error message=".."/>`.
pub fn upstream_error(body: &str) -> Option<String> {
    let doc = Document::parse(body).ok()?;
    let root = doc.root_element();
    let error = if root.tag_name().name() == "error" {
        root
    } else {
        find(root, "error")?
    };

    if let Some(message) = error.attribute("message") {
        return Some(message.trim().to_string());
    }

    let text = text_of(error).trim().to_string();
    if text.is_empty() {
        Some("Unknown upstream error".to_string())
    } else {
        Some(text)
    }
}
