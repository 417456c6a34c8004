// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::{TextRange, TextSize};

/// Location of a CST node in the source text.
/// `line` and `column` are one-based when known and zero otherwise.
/// `start` and `end` are byte offsets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CstSpan {
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
    #[serde(default)]
    pub start: u32,
    #[serde(default)]
    pub end: u32,
}

impl CstSpan {
    pub fn new(line: u32, column: u32, start: u32, end: u32) -> CstSpan {
        CstSpan {
            line,
            column,
            start,
            end,
        }
    }

    /// A span carrying only line and column.
    pub fn at(line: u32, column: u32) -> CstSpan {
        CstSpan {
            line,
            column,
            start: 0,
            end: 0,
        }
    }

    /// Byte range of the span. `end` before `start` is clamped to an empty range.
    pub fn range(&self) -> TextRange {
        let start = TextSize::from(self.start);
        let end = TextSize::from(self.end.max(self.start));
        TextRange::new(start, end)
    }
}

/// A child of a `CstNode`, optionally tagged with the grammar's field name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CstChild {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<SmolStr>,
    pub node: CstNode,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CstNode {
    kind: SmolStr,
    #[serde(default, skip_serializing_if = "SmolStr::is_empty")]
    text: SmolStr,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<CstChild>,
    #[serde(default)]
    span: CstSpan,
}

impl CstNode {
    pub fn new<T: AsRef<str>>(kind: T) -> CstNode {
        CstNode {
            kind: SmolStr::new(kind),
            text: SmolStr::default(),
            children: Vec::new(),
            span: CstSpan::default(),
        }
    }

    /// A leaf node holding `text`, for example an identifier or a literal.
    pub fn leaf<T: AsRef<str>, U: AsRef<str>>(kind: T, text: U) -> CstNode {
        CstNode {
            text: SmolStr::new(text),
            ..CstNode::new(kind)
        }
    }

    /// Decode a tree from its JSON dump.
    pub fn from_json(json: &str) -> Result<CstNode, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn with_span(mut self, span: CstSpan) -> CstNode {
        self.span = span;
        self
    }

    pub fn with_child(mut self, node: CstNode) -> CstNode {
        self.children.push(CstChild { field: None, node });
        self
    }

    pub fn with_field<T: AsRef<str>>(mut self, field: T, node: CstNode) -> CstNode {
        self.children.push(CstChild {
            field: Some(SmolStr::new(field)),
            node,
        });
        self
    }

    /// Like `with_field` but does nothing for `None`.
    pub fn with_optional_field<T: AsRef<str>>(self, field: T, node: Option<CstNode>) -> CstNode {
        match node {
            Some(node) => self.with_field(field, node),
            None => self,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn span(&self) -> CstSpan {
        self.span
    }

    /// All children in order, with their field names.
    pub fn all_children(&self) -> &[CstChild] {
        &self.children
    }

    /// Children that carry no field name.
    pub fn children(&self) -> impl Iterator<Item = &CstNode> {
        self.children
            .iter()
            .filter(|child| child.field.is_none())
            .map(|child| &child.node)
    }

    /// The first child stored under `field`.
    pub fn field(&self, field: &str) -> Option<&CstNode> {
        self.fields(field).next()
    }

    /// All children stored under `field`, in order.
    pub fn fields<'a, 'f>(&'a self, field: &'f str) -> impl Iterator<Item = &'a CstNode> + use<'a, 'f> {
        self.children
            .iter()
            .filter(move |child| child.field.as_deref() == Some(field))
            .map(|child| &child.node)
    }

    /// Text of the leaf stored under `field`.
    pub fn field_text(&self, field: &str) -> Option<&str> {
        self.field(field).map(CstNode::text)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.field(field).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_range_is_clamped() {
        let span = CstSpan::new(1, 1, 10, 4);
        assert!(span.range().is_empty());
        assert_eq!(u32::from(span.range().start()), 10);
    }

    #[test]
    fn fields_keep_order() {
        let node = CstNode::new("enum_declaration")
            .with_field("name", CstNode::leaf("identifier", "Color"))
            .with_field("member", CstNode::leaf("identifier", "Red"))
            .with_field("member", CstNode::leaf("identifier", "Green"));
        let members: Vec<_> = node.fields("member").map(CstNode::text).collect();
        assert_eq!(members, vec!["Red", "Green"]);
        assert_eq!(node.field_text("name"), Some("Color"));
        assert_eq!(node.children().count(), 0);
    }
}
