// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

use expect_test::expect;
use shade_syntax::{field, kind, CstNode, CstSpan};

#[test]
fn test_leaf_to_json() {
    let node = CstNode::leaf(kind::IDENTIFIER, "x").with_span(CstSpan::new(1, 2, 1, 2));
    let json = node.to_json().unwrap();
    expect![[r#"{"kind":"identifier","text":"x","span":{"line":1,"column":2,"start":1,"end":2}}"#]]
        .assert_eq(&json);
}

#[test]
fn test_from_json_with_fields() {
    let json = r#"
{
  "kind": "alias_declaration",
  "children": [
    { "field": "name", "node": { "kind": "identifier", "text": "Foo" } },
    { "field": "type", "node": {
        "kind": "type",
        "children": [ { "field": "name", "node": { "kind": "identifier", "text": "f32" } } ]
    } }
  ],
  "span": { "line": 3, "column": 1 }
}
"#;
    let node = CstNode::from_json(json).unwrap();
    assert_eq!(node.kind(), kind::ALIAS_DECLARATION);
    assert_eq!(node.field_text(field::NAME), Some("Foo"));
    let ty = node.field(field::TYPE).unwrap();
    assert_eq!(ty.field_text(field::NAME), Some("f32"));
    assert_eq!(node.span(), CstSpan::at(3, 1));
}

#[test]
fn test_from_json_rejects_missing_kind() {
    assert!(CstNode::from_json(r#"{ "text": "x" }"#).is_err());
}

#[test]
fn test_round_trip_keeps_unnamed_children() {
    let node = CstNode::new(kind::BLOCK)
        .with_child(CstNode::new(kind::BREAK_STATEMENT))
        .with_child(CstNode::new(kind::CONTINUE_STATEMENT));
    let decoded = CstNode::from_json(&node.to_json().unwrap()).unwrap();
    assert_eq!(decoded, node);
    assert_eq!(decoded.children().count(), 2);
}
