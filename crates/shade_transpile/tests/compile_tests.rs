// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use shade_semantics::ast::AddressSpace;
use shade_syntax::{field, kind, CstNode, CstSpan};
use shade_transpile::{compile, CompileOptions, TranspileOptions};

fn ident(text: &str) -> CstNode {
    CstNode::leaf(kind::IDENTIFIER, text)
}

fn int(text: &str) -> CstNode {
    CstNode::leaf(kind::INT_LITERAL, text)
}

fn type_named(name: &str) -> CstNode {
    CstNode::new(kind::TYPE).with_field(field::NAME, ident(name))
}

fn attribute(name: &str, argument: &str) -> CstNode {
    CstNode::new(kind::ATTRIBUTE)
        .with_field(field::NAME, ident(name))
        .with_field(field::ARGUMENT, int(argument))
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

/// `for (let i = 0; i < 10; i++) { }`
fn counting_loop() -> CstNode {
    let init = CstNode::new(kind::LET_DECLARATION)
        .with_field(field::NAME, ident("i"))
        .with_field(field::VALUE, int("0"));
    let condition = CstNode::new(kind::BINARY_EXPRESSION)
        .with_field(field::LEFT, ident("i"))
        .with_field(field::OPERATOR, CstNode::leaf(kind::OPERATOR, "<"))
        .with_field(field::RIGHT, int("10"));
    let update = CstNode::new(kind::UPDATE_STATEMENT)
        .with_field(field::OPERAND, ident("i"))
        .with_field(field::OPERATOR, CstNode::leaf(kind::OPERATOR, "++"));
    CstNode::new(kind::FOR_STATEMENT)
        .with_field(field::INITIALIZER, init)
        .with_field(field::CONDITION, condition)
        .with_field(field::UPDATE, update)
        .with_field(field::BODY, CstNode::new(kind::BLOCK))
}

#[test]
fn test_compile_from_cst() {
    let cst = source_file(vec![function("f", vec![counting_loop()])]);
    let result = compile(&cst, &CompileOptions::new());
    assert!(!result.any_incidents());
    let output = result.output().unwrap();
    assert_eq!(
        output.code,
        "fn f() { var i = 0; loop { if !(i<10) { break; } {} continuing { i++; } } }"
    );
    assert!(output.source_map.is_none());
}

#[test]
fn test_compile_reports_bindings() {
    // @group(0) @binding(3) var<uniform> time: f32;
    let var = CstNode::new(kind::GLOBAL_VARIABLE_DECLARATION)
        .with_field(field::ATTRIBUTE, attribute("group", "0"))
        .with_field(field::ATTRIBUTE, attribute("binding", "3"))
        .with_field(field::ADDRESS_SPACE, CstNode::leaf(kind::KEYWORD, "uniform"))
        .with_field(field::NAME, ident("time"))
        .with_field(field::TYPE, type_named("f32"));
    let result = compile(&source_file(vec![var]), &CompileOptions::new());
    assert_eq!(
        result.code(),
        Some("@group(0) @binding(0) var<uniform> time: f32;")
    );
    let bindings = result.bindings();
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].name, "time");
    assert_eq!((bindings[0].group, bindings[0].binding), (0, 0));
    assert_eq!(bindings[0].address_space, AddressSpace::Uniform);
    assert!(result.parameters().is_empty());
}

#[test]
fn test_compile_with_incidents() {
    // fn f() { continue; }
    let stmt = CstNode::new(kind::CONTINUE_STATEMENT).with_span(CstSpan::new(1, 10, 9, 18));
    let cst = source_file(vec![function("f", vec![stmt])]);
    let options = CompileOptions::new()
        .with_path("loop.shade")
        .with_transpile_options(TranspileOptions::new().with_header(true));
    let result = compile(&cst, &options);
    assert!(result.any_incidents());
    assert_eq!(result.code(), None);
    assert_eq!(result.path(), Path::new("loop.shade"));
    let diagnostics = result.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].message,
        "Continue statement can only be used within loops."
    );
    assert_eq!((diagnostics[0].line, diagnostics[0].column), (1, 10));
    assert!(result.bindings().is_empty());
}

#[test]
fn test_unknown_top_level_node() {
    let cst = source_file(vec![
        CstNode::new("preprocessor_directive").with_span(CstSpan::at(1, 1)),
        function("f", vec![]),
    ]);
    let result = compile(&cst, &CompileOptions::new());
    assert_eq!(
        result.trace().incidents().messages(),
        vec!["Unexpected CST node \"preprocessor_directive\"."]
    );
    assert!(result.output().is_none());
    assert_eq!(result.ast().declarations().len(), 1);
}
