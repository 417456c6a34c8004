// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

use shade_semantics::ast::{Ast, Node};
use shade_semantics::builder::{build, build_module};
use shade_semantics::trace::Trace;
use shade_syntax::{field, kind, CstNode, CstSpan};

fn ident(text: &str) -> CstNode {
    CstNode::leaf(kind::IDENTIFIER, text)
}

fn type_named(name: &str) -> CstNode {
    CstNode::new(kind::TYPE).with_field(field::NAME, ident(name))
}

fn alias(name: &str, target: &str) -> CstNode {
    CstNode::new(kind::ALIAS_DECLARATION)
        .with_field(field::NAME, ident(name))
        .with_field(field::TYPE, type_named(target))
}

fn function(name: &str, statements: Vec<CstNode>) -> CstNode {
    let body = statements
        .into_iter()
        .fold(CstNode::new(kind::BLOCK), CstNode::with_child);
    CstNode::new(kind::FUNCTION_DECLARATION)
        .with_field(field::NAME, ident(name))
        .with_field(field::BODY, body)
}

fn source_file(declarations: Vec<CstNode>) -> CstNode {
    declarations
        .into_iter()
        .fold(CstNode::new(kind::SOURCE_FILE), CstNode::with_child)
}

fn build_and_trace(cst: &CstNode) -> (Ast, Trace) {
    let mut ast = Ast::new();
    let mut trace = Trace::new();
    build_module(cst, &mut ast, &mut trace);
    ast.trace(&mut trace);
    (ast, trace)
}

#[test]
fn test_unknown_declaration_is_reported_and_skipped() {
    let cst = source_file(vec![
        CstNode::new("macro_definition").with_span(CstSpan::at(2, 1)),
        alias("Scalar", "f32"),
    ]);
    let (ast, trace) = build_and_trace(&cst);
    assert_eq!(
        trace.incidents().messages(),
        vec!["Unexpected CST node \"macro_definition\"."]
    );
    assert_eq!(ast.declarations().len(), 1);
    let diagnostics = trace.diagnostics(&ast);
    assert_eq!((diagnostics[0].line, diagnostics[0].column), (2, 1));
}

#[test]
fn test_missing_field() {
    let broken = CstNode::new(kind::ALIAS_DECLARATION)
        .with_field(field::NAME, ident("Scalar"))
        .with_span(CstSpan::at(1, 1));
    let cst = source_file(vec![broken, alias("Other", "u32")]);
    let (ast, trace) = build_and_trace(&cst);
    assert_eq!(
        trace.incidents().messages(),
        vec!["Malformed CST node \"alias_declaration\": missing field \"type\"."]
    );
    assert_eq!(ast.declarations().len(), 1);
}

#[test]
fn test_positions_reach_diagnostics() {
    // fn f() { if 1 {} }
    let condition = CstNode::leaf(kind::INT_LITERAL, "1").with_span(CstSpan::new(3, 9, 40, 41));
    let stmt = CstNode::new(kind::IF_STATEMENT)
        .with_field(field::CONDITION, condition)
        .with_field(field::CONSEQUENCE, CstNode::new(kind::BLOCK));
    let cst = source_file(vec![function("f", vec![stmt])]);
    let (ast, trace) = build_and_trace(&cst);
    let diagnostics = trace.diagnostics(&ast);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].message,
        "Condition must be of type bool, found abstract-int."
    );
    assert_eq!((diagnostics[0].line, diagnostics[0].column), (3, 9));
    assert_eq!(u32::from(diagnostics[0].range.start()), 40);
}

#[test]
fn test_bad_statement_does_not_stop_the_block() {
    // fn f() { 1; let x = 2; }
    let bad = CstNode::new(kind::EXPRESSION_STATEMENT)
        .with_field(field::EXPRESSION, CstNode::leaf(kind::INT_LITERAL, "1"));
    let good = CstNode::new(kind::LET_DECLARATION)
        .with_field(field::NAME, ident("x"))
        .with_field(field::VALUE, CstNode::leaf(kind::INT_LITERAL, "2"));
    let cst = source_file(vec![function("f", vec![bad, good])]);
    let (ast, trace) = build_and_trace(&cst);
    assert_eq!(
        trace.incidents().messages(),
        vec!["Malformed CST node \"expression_statement\": expression statement must be a function call."]
    );
    let Node::Function(f) = ast.node(ast.declarations()[0]) else {
        panic!("expected a function");
    };
    let Node::Block(body) = ast.node(f.body) else {
        panic!("expected a block");
    };
    assert_eq!(body.statements.len(), 1);
}

#[test]
fn test_build_unknown_kind() {
    let mut ast = Ast::new();
    let mut trace = Trace::new();
    assert_eq!(build(&CstNode::new("comment"), &mut ast, &mut trace), None);
    assert!(!trace.has_incidents());
    assert!(ast.is_empty());
}

#[test]
fn test_build_single_expression() {
    // a + 1u
    let cst = CstNode::new(kind::BINARY_EXPRESSION)
        .with_field(field::LEFT, ident("a"))
        .with_field(field::OPERATOR, CstNode::leaf(kind::OPERATOR, "+"))
        .with_field(field::RIGHT, CstNode::leaf(kind::INT_LITERAL, "1u"));
    let mut ast = Ast::new();
    let mut trace = Trace::new();
    let id = build(&cst, &mut ast, &mut trace).unwrap();
    assert!(matches!(ast.node(id), Node::Binary(_)));
    assert_eq!(ast.len(), 3);
}

#[test]
fn test_unknown_operator() {
    let cst = CstNode::new(kind::BINARY_EXPRESSION)
        .with_field(field::LEFT, ident("a"))
        .with_field(field::OPERATOR, CstNode::leaf(kind::OPERATOR, "<=>"))
        .with_field(field::RIGHT, ident("b"));
    let mut ast = Ast::new();
    let mut trace = Trace::new();
    assert_eq!(build(&cst, &mut ast, &mut trace), None);
    assert_eq!(
        trace.incidents().messages(),
        vec!["Malformed CST node \"binary_expression\": unknown operator \"<=>\"."]
    );
}

#[test]
fn test_construct_without_type_parameters_is_a_call() {
    let plain = CstNode::new(kind::CONSTRUCT_EXPRESSION)
        .with_field(field::TYPE, type_named("f32"))
        .with_field(field::ARGUMENT, CstNode::leaf(kind::INT_LITERAL, "1"));
    let generic = CstNode::new(kind::CONSTRUCT_EXPRESSION)
        .with_field(
            field::TYPE,
            type_named("vec2").with_field(field::ARGUMENT, type_named("f32")),
        )
        .with_field(field::ARGUMENT, CstNode::leaf(kind::FLOAT_LITERAL, "1.0"));
    let mut ast = Ast::new();
    let mut trace = Trace::new();
    let plain = build(&plain, &mut ast, &mut trace).unwrap();
    let generic = build(&generic, &mut ast, &mut trace).unwrap();
    match ast.node(plain) {
        Node::Call(call) => assert_eq!(call.function, "f32"),
        other => panic!("expected a call, found {}", other.kind_name()),
    }
    assert!(matches!(ast.node(generic), Node::Construct(_)));
}

#[test]
fn test_invalid_array_length() {
    let cst = CstNode::new(kind::TYPE)
        .with_field(field::NAME, ident("array"))
        .with_field(field::ARGUMENT, type_named("f32"))
        .with_field(field::LENGTH, CstNode::leaf(kind::INT_LITERAL, "0"));
    let mut ast = Ast::new();
    let mut trace = Trace::new();
    assert_eq!(build(&cst, &mut ast, &mut trace), None);
    assert_eq!(
        trace.incidents().messages(),
        vec!["Malformed CST node \"type\": invalid array length \"0\"."]
    );
}

#[test]
fn test_unknown_attribute_on_module_variable() {
    // @group(0) @binding(0) @shiny var<uniform> u: f32;
    let attribute = |name: &str, argument: Option<&str>| {
        CstNode::new(kind::ATTRIBUTE)
            .with_field(field::NAME, ident(name))
            .with_optional_field(field::ARGUMENT, argument.map(|a| CstNode::leaf(kind::INT_LITERAL, a)))
    };
    let var = CstNode::new(kind::GLOBAL_VARIABLE_DECLARATION)
        .with_field(field::ATTRIBUTE, attribute("group", Some("0")))
        .with_field(field::ATTRIBUTE, attribute("binding", Some("0")))
        .with_field(field::ATTRIBUTE, attribute("shiny", None))
        .with_field(field::ADDRESS_SPACE, CstNode::leaf(kind::KEYWORD, "uniform"))
        .with_field(field::NAME, ident("u"))
        .with_field(field::TYPE, type_named("f32"))
        .with_span(CstSpan::at(4, 1));
    let (ast, trace) = build_and_trace(&source_file(vec![var]));
    assert_eq!(
        trace.incidents().messages(),
        vec!["Unknown attribute \"@shiny\"."]
    );
    assert_eq!(trace.diagnostics(&ast)[0].line, 4);
    assert_eq!(trace.bindings().binding_index("0", "0"), Some(0));
}

#[test]
fn test_switch_case_without_values() {
    let case = CstNode::new(kind::SWITCH_CASE).with_field(field::BODY, CstNode::new(kind::BLOCK));
    let cst = CstNode::new(kind::SWITCH_STATEMENT)
        .with_field(field::SUBJECT, ident("x"))
        .with_field(field::CASE, case);
    let mut ast = Ast::new();
    let mut trace = Trace::new();
    assert_eq!(build(&cst, &mut ast, &mut trace), None);
    assert_eq!(
        trace.incidents().messages(),
        vec!["Malformed CST node \"switch_case\": case has neither values nor default."]
    );
}

#[test]
fn test_module_from_json() {
    let json = r#"
{
  "kind": "source_file",
  "children": [
    { "node": {
      "kind": "function_declaration",
      "children": [
        { "field": "name", "node": { "kind": "identifier", "text": "brightness" } },
        { "field": "parameter", "node": {
          "kind": "parameter",
          "children": [
            { "field": "name", "node": { "kind": "identifier", "text": "c" } },
            { "field": "type", "node": { "kind": "type", "children": [
              { "field": "name", "node": { "kind": "identifier", "text": "vec3f" } } ] } }
          ]
        } },
        { "field": "return_type", "node": { "kind": "type", "children": [
          { "field": "name", "node": { "kind": "identifier", "text": "f32" } } ] } },
        { "field": "body", "node": {
          "kind": "block",
          "children": [
            { "node": {
              "kind": "return_statement",
              "children": [
                { "field": "value", "node": {
                  "kind": "call_expression",
                  "children": [
                    { "field": "function", "node": { "kind": "identifier", "text": "dot" } },
                    { "field": "argument", "node": { "kind": "identifier", "text": "c" } },
                    { "field": "argument", "node": { "kind": "identifier", "text": "c" } }
                  ]
                } }
              ],
              "span": { "line": 2, "column": 5 }
            } }
          ]
        } }
      ],
      "span": { "line": 1, "column": 1 }
    } }
  ]
}
"#;
    let cst = CstNode::from_json(json).unwrap();
    let (ast, trace) = build_and_trace(&cst);
    assert!(!trace.has_incidents());
    let decl = ast.declarations()[0];
    assert_eq!(ast.position(decl).line, 1);
    assert_eq!(trace.declared_type(decl).map(ToString::to_string), Some("f32".to_string()));
}
