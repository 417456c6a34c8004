// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

use shade_semantics::ast::{Ast, Attribute, BinaryOp, NodeId};
use shade_semantics::trace::Trace;
use shade_semantics::types::Type;

fn trace_ast(ast: &Ast) -> Trace {
    let mut trace = Trace::new();
    ast.trace(&mut trace);
    trace
}

/// Trace a module holding a single function `f` with body `statements`, and return
/// the incident messages.
fn function_messages(ast: &mut Ast, statements: Vec<NodeId>) -> Vec<String> {
    let body = ast.block(statements);
    let f = ast.function(vec![], "f", vec![], None, body);
    ast.module(vec![f]);
    trace_ast(ast).incidents().messages()
}

#[test]
fn test_if_condition_must_be_bool() {
    let mut ast = Ast::new();
    let one = ast.int("1");
    let then_block = ast.block(vec![]);
    let stmt = ast.if_stmt(one, then_block, None);
    assert_eq!(
        function_messages(&mut ast, vec![stmt]),
        vec!["Condition must be of type bool, found abstract-int."]
    );
}

#[test]
fn test_else_if_chain() {
    let mut ast = Ast::new();
    let t = ast.boolean(true);
    let f = ast.boolean(false);
    let inner_then = ast.block(vec![]);
    let else_block = ast.block(vec![]);
    let else_if = ast.if_stmt(f, inner_then, Some(else_block));
    let then_block = ast.block(vec![]);
    let stmt = ast.if_stmt(t, then_block, Some(else_if));
    assert!(function_messages(&mut ast, vec![stmt]).is_empty());
}

#[test]
fn test_while_condition_must_be_bool() {
    let mut ast = Ast::new();
    let cond = ast.float("1.0");
    let brk = ast.break_stmt();
    let body = ast.block(vec![brk]);
    let stmt = ast.while_loop(cond, body);
    assert_eq!(
        function_messages(&mut ast, vec![stmt]),
        vec!["Condition must be of type bool, found abstract-float."]
    );
}

#[test]
fn test_break_outside_loop() {
    let mut ast = Ast::new();
    let brk = ast.break_stmt();
    assert_eq!(
        function_messages(&mut ast, vec![brk]),
        vec!["Break statement can only be used within loops or switch statements."]
    );
}

#[test]
fn test_continue_inside_do_while_marks_loop() {
    let mut ast = Ast::new();
    let cont = ast.continue_stmt();
    let body = ast.block(vec![cont]);
    let cond = ast.boolean(true);
    let stmt = ast.do_while(body, cond);
    let block = ast.block(vec![stmt]);
    let f = ast.function(vec![], "f", vec![], None, block);
    ast.module(vec![f]);
    let trace = trace_ast(&ast);
    assert!(!trace.has_incidents());
    assert!(trace.is_continued(stmt));
    assert!(trace.block(body).has_continue);
}

#[test]
fn test_for_loop() {
    // for (let i = 0; i < 10; i++) { }
    let mut ast = Ast::new();
    let zero = ast.int("0");
    let init = ast.let_decl("i", None, Some(zero));
    let i = ast.ident("i");
    let ten = ast.int("10");
    let cond = ast.binary(BinaryOp::Less, i, ten);
    let i2 = ast.ident("i");
    let update = ast.increment(i2);
    let body = ast.block(vec![]);
    let stmt = ast.for_loop(Some(init), Some(cond), Some(update), body);
    assert!(function_messages(&mut ast, vec![stmt]).is_empty());
}

#[test]
fn test_for_loop_variable_does_not_leak() {
    let mut ast = Ast::new();
    let zero = ast.int("0");
    let init = ast.let_decl("i", None, Some(zero));
    let body = ast.block(vec![]);
    let stmt = ast.for_loop(Some(init), None, None, body);
    let i = ast.ident("i");
    let one = ast.int("1");
    let assign = ast.assign(i, one);
    assert_eq!(
        function_messages(&mut ast, vec![stmt, assign]),
        vec!["Variable \"i\" is not defined."]
    );
}

/// `for (let {name} = 0; ; ) { }`
fn counting_for(ast: &mut Ast, name: &str) -> NodeId {
    let zero = ast.int("0");
    let init = ast.let_decl(name, None, Some(zero));
    let body = ast.block(vec![]);
    ast.for_loop(Some(init), None, None, body)
}

#[test]
fn test_for_variable_collides_with_enclosing_variable() {
    // let i = 5; for (let i = 0; ; ) { }
    let mut ast = Ast::new();
    let five = ast.int("5");
    let outer = ast.let_decl("i", None, Some(five));
    let stmt = counting_for(&mut ast, "i");
    assert_eq!(
        function_messages(&mut ast, vec![outer, stmt]),
        vec!["Variable with name \"i\" already defined."]
    );
}

#[test]
fn test_sequential_for_loops_share_the_enclosing_block() {
    let mut ast = Ast::new();
    let first = counting_for(&mut ast, "i");
    let second = counting_for(&mut ast, "i");
    let five = ast.int("5");
    let after = ast.let_decl("i", None, Some(five));
    assert_eq!(
        function_messages(&mut ast, vec![first, second, after]),
        vec![
            "Variable with name \"i\" already defined.",
            "Variable with name \"i\" already defined."
        ]
    );
}

#[test]
fn test_for_variables_in_nested_blocks() {
    // { for (let i = 0; ; ) { } } for (let i = 0; ; ) { }
    let mut ast = Ast::new();
    let first = counting_for(&mut ast, "i");
    let block = ast.block(vec![first]);
    let second = counting_for(&mut ast, "i");
    let j = counting_for(&mut ast, "j");
    assert!(function_messages(&mut ast, vec![block, second, j]).is_empty());
}

#[test]
fn test_for_init_must_be_mutable() {
    let mut ast = Ast::new();
    let zero = ast.int("0");
    let init = ast.const_decl("i", None, Some(zero));
    let body = ast.block(vec![]);
    let stmt = ast.for_loop(Some(init), None, None, body);
    assert_eq!(
        function_messages(&mut ast, vec![stmt]),
        vec!["For loop initializer must be a mutable variable declaration."]
    );
}

#[test]
fn test_for_update_must_be_a_statement_with_effect() {
    let mut ast = Ast::new();
    let body = ast.block(vec![]);
    let brk = ast.break_stmt();
    let stmt = ast.for_loop(None, None, Some(brk), body);
    assert_eq!(
        function_messages(&mut ast, vec![stmt]),
        vec!["For loop update must be an assignment, increment, decrement or function call."]
    );
}

fn switch_on(ast: &mut Ast, subject_type: &str, cases: Vec<NodeId>) -> Vec<String> {
    let ty = ast.type_ref(subject_type);
    let param = ast.parameter("x", ty, vec![]);
    let subject = ast.ident("x");
    let stmt = ast.switch(subject, cases);
    let body = ast.block(vec![stmt]);
    let f = ast.function(vec![], "f", vec![param], None, body);
    ast.module(vec![f]);
    trace_ast(ast).incidents().messages()
}

#[test]
fn test_duplicate_case_value() {
    // switch x { case 1, 2: {} case 2: {} default: {} }
    let mut ast = Ast::new();
    let one = ast.int("1");
    let two = ast.int("2");
    let b1 = ast.block(vec![]);
    let c1 = ast.case(vec![one, two], b1);
    let two_again = ast.int("2");
    let b2 = ast.block(vec![]);
    let c2 = ast.case(vec![two_again], b2);
    let b3 = ast.block(vec![]);
    let c3 = ast.default_case(b3);
    assert_eq!(
        switch_on(&mut ast, "u32", vec![c1, c2, c3]),
        vec!["Duplicate case value found."]
    );
}

#[test]
fn test_switch_subject_must_be_integer() {
    let mut ast = Ast::new();
    let body = ast.block(vec![]);
    let default = ast.default_case(body);
    assert_eq!(
        switch_on(&mut ast, "f32", vec![default]),
        vec!["Switch subject must be an unsigned integer or an enum, found f32."]
    );
}

#[test]
fn test_switch_subject_must_be_unsigned() {
    // switch x { case 1: {} default: {} } with x: i32
    let mut ast = Ast::new();
    let one = ast.int("1");
    let b1 = ast.block(vec![]);
    let c1 = ast.case(vec![one], b1);
    let b2 = ast.block(vec![]);
    let c2 = ast.default_case(b2);
    assert_eq!(
        switch_on(&mut ast, "i32", vec![c1, c2]),
        vec!["Switch subject must be an unsigned integer or an enum, found i32."]
    );
}

#[test]
fn test_switch_on_literal() {
    // switch 2 { case 1: {} default: {} }
    let mut ast = Ast::new();
    let subject = ast.int("2");
    let one = ast.int("1");
    let b1 = ast.block(vec![]);
    let c1 = ast.case(vec![one], b1);
    let b2 = ast.block(vec![]);
    let c2 = ast.default_case(b2);
    let stmt = ast.switch(subject, vec![c1, c2]);
    assert!(function_messages(&mut ast, vec![stmt]).is_empty());
}

#[test]
fn test_switch_multiple_defaults() {
    let mut ast = Ast::new();
    let b1 = ast.block(vec![]);
    let d1 = ast.default_case(b1);
    let b2 = ast.block(vec![]);
    let d2 = ast.default_case(b2);
    assert_eq!(
        switch_on(&mut ast, "u32", vec![d1, d2]),
        vec!["Switch statement has more than one default case."]
    );
}

#[test]
fn test_case_value_must_be_constant() {
    let mut ast = Ast::new();
    let y = ast.ident("x");
    let body = ast.block(vec![]);
    let case = ast.case(vec![y], body);
    assert_eq!(
        switch_on(&mut ast, "u32", vec![case]),
        vec!["Case value must be a compile-time constant."]
    );
}

#[test]
fn test_switch_on_enum() {
    // enum Mode { Off, On } fn f(x: Mode) { switch x { case Mode.Off: {} default: {} } }
    let mut ast = Ast::new();
    let mode = ast.enum_decl("Mode", &["Off", "On"]);
    let ty = ast.type_ref("Mode");
    let param = ast.parameter("x", ty, vec![]);
    let subject = ast.ident("x");
    let mode_ref = ast.ident("Mode");
    let off = ast.member(mode_ref, "Off");
    let b1 = ast.block(vec![]);
    let c1 = ast.case(vec![off], b1);
    let b2 = ast.block(vec![]);
    let c2 = ast.default_case(b2);
    let stmt = ast.switch(subject, vec![c1, c2]);
    let body = ast.block(vec![stmt]);
    let f = ast.function(vec![], "f", vec![param], None, body);
    ast.module(vec![mode, f]);
    let trace = trace_ast(&ast);
    assert!(!trace.has_incidents());
    assert_eq!(trace.expression(off).ty(), &Type::Enum("Mode".into()));
    assert_eq!(
        trace.expression(off).constant_value(),
        Some(shade_semantics::constant::ConstantValue::Int(0))
    );
}

#[test]
fn test_assign_to_constant() {
    let mut ast = Ast::new();
    let one = ast.int("1");
    let decl = ast.const_decl("c", None, Some(one));
    let c = ast.ident("c");
    let two = ast.int("2");
    let assign = ast.assign(c, two);
    assert_eq!(
        function_messages(&mut ast, vec![decl, assign]),
        vec!["Cannot modify a constant value."]
    );
}

#[test]
fn test_assign_to_literal_reports_both() {
    let mut ast = Ast::new();
    let one = ast.int("1");
    let two = ast.int("2");
    let assign = ast.assign(one, two);
    assert_eq!(
        function_messages(&mut ast, vec![assign]),
        vec![
            "Cannot modify a value that is not a storage location.",
            "Cannot modify a constant value."
        ]
    );
}

#[test]
fn test_increment_parameter() {
    let mut ast = Ast::new();
    let ty = ast.type_ref("i32");
    let param = ast.parameter("a", ty, vec![]);
    let a = ast.ident("a");
    let inc = ast.increment(a);
    let body = ast.block(vec![inc]);
    let f = ast.function(vec![], "f", vec![param], None, body);
    ast.module(vec![f]);
    assert_eq!(
        trace_ast(&ast).incidents().messages(),
        vec!["Cannot modify a constant value."]
    );
}

#[test]
fn test_assignment_type_mismatch() {
    // let x: u32 = 1u; let y: i32 = 2i; x = y;
    let mut ast = Ast::new();
    let u32_ty = ast.type_ref("u32");
    let one = ast.int("1u");
    let x_decl = ast.let_decl("x", Some(u32_ty), Some(one));
    let i32_ty = ast.type_ref("i32");
    let two = ast.int("2i");
    let y_decl = ast.let_decl("y", Some(i32_ty), Some(two));
    let x = ast.ident("x");
    let y = ast.ident("y");
    let assign = ast.assign(x, y);
    assert_eq!(
        function_messages(&mut ast, vec![x_decl, y_decl, assign]),
        vec!["Expected a value of type u32, found i32."]
    );
}

#[test]
fn test_compound_assignment() {
    // let v = vec3f(); v *= 2.0; v += 1i;
    let mut ast = Ast::new();
    let init = ast.call("vec3f", vec![]);
    let decl = ast.let_decl("v", None, Some(init));
    let v = ast.ident("v");
    let two = ast.float("2.0");
    let scale = ast.compound_assign(BinaryOp::Mul, v, two);
    let v2 = ast.ident("v");
    let one = ast.int("1i");
    let add = ast.compound_assign(BinaryOp::Add, v2, one);
    assert_eq!(
        function_messages(&mut ast, vec![decl, scale, add]),
        vec!["Operator \"+=\" cannot be applied to vec3<f32> and i32."]
    );
}

#[test]
fn test_phony_assignment() {
    // fn g() -> f32 { return 1.0; } fn f() { _ = g(); }
    let mut ast = Ast::new();
    let one = ast.float("1.0");
    let ret = ast.return_stmt(Some(one));
    let g_body = ast.block(vec![ret]);
    let ret_ty = ast.type_ref("f32");
    let g = ast.function(vec![], "g", vec![], Some(ret_ty), g_body);
    let phony = ast.ident("_");
    let call = ast.call("g", vec![]);
    let assign = ast.assign(phony, call);
    let f_body = ast.block(vec![assign]);
    let f = ast.function(vec![], "f", vec![], None, f_body);
    ast.module(vec![g, f]);
    assert!(!trace_ast(&ast).has_incidents());
}

#[test]
fn test_missing_return() {
    let mut ast = Ast::new();
    let body = ast.block(vec![]);
    let ret_ty = ast.type_ref("f32");
    let f = ast.function(vec![], "f", vec![], Some(ret_ty), body);
    ast.module(vec![f]);
    assert_eq!(
        trace_ast(&ast).incidents().messages(),
        vec!["Function \"f\" must return a value of type f32."]
    );
}

#[test]
fn test_return_from_both_branches() {
    // fn f(c: bool) -> i32 { if (c) { return 1; } else { return 2; } }
    let mut ast = Ast::new();
    let bool_ty = ast.type_ref("bool");
    let param = ast.parameter("c", bool_ty, vec![]);
    let c = ast.ident("c");
    let one = ast.int("1");
    let r1 = ast.return_stmt(Some(one));
    let then_block = ast.block(vec![r1]);
    let two = ast.int("2");
    let r2 = ast.return_stmt(Some(two));
    let else_block = ast.block(vec![r2]);
    let stmt = ast.if_stmt(c, then_block, Some(else_block));
    let body = ast.block(vec![stmt]);
    let ret_ty = ast.type_ref("i32");
    let f = ast.function(vec![], "f", vec![param], Some(ret_ty), body);
    ast.module(vec![f]);
    let trace = trace_ast(&ast);
    assert!(!trace.has_incidents());
    assert_eq!(trace.block(then_block).return_type, Some(Type::abstract_int()));
}

#[test]
fn test_return_type_mismatch() {
    let mut ast = Ast::new();
    let t = ast.boolean(true);
    let ret = ast.return_stmt(Some(t));
    let body = ast.block(vec![ret]);
    let ret_ty = ast.type_ref("u32");
    let f = ast.function(vec![], "f", vec![], Some(ret_ty), body);
    ast.module(vec![f]);
    assert_eq!(
        trace_ast(&ast).incidents().messages(),
        vec!["Function must return a value of type u32, found bool."]
    );
}

#[test]
fn test_return_value_from_void_function() {
    let mut ast = Ast::new();
    let one = ast.int("1");
    let ret = ast.return_stmt(Some(one));
    assert_eq!(
        function_messages(&mut ast, vec![ret]),
        vec!["Function must return a value of type void, found abstract-int."]
    );
}

fn discard_in(attributes: Vec<Attribute>) -> Vec<String> {
    let mut ast = Ast::new();
    let discard = ast.discard();
    let body = ast.block(vec![discard]);
    let f = ast.function(attributes, "f", vec![], None, body);
    ast.module(vec![f]);
    trace_ast(&ast).incidents().messages()
}

#[test]
fn test_discard() {
    assert!(discard_in(vec![Attribute::new("fragment", &[])]).is_empty());
    assert!(discard_in(vec![]).is_empty());
    assert_eq!(
        discard_in(vec![Attribute::new("vertex", &[])]),
        vec!["Discard statement can only be used within fragment functions."]
    );
}

#[test]
fn test_unknown_function_attribute() {
    let mut ast = Ast::new();
    let body = ast.block(vec![]);
    let f = ast.function(vec![Attribute::new("inline", &[])], "f", vec![], None, body);
    ast.module(vec![f]);
    assert_eq!(
        trace_ast(&ast).incidents().messages(),
        vec!["Unknown attribute \"@inline\"."]
    );
}

#[test]
fn test_constant_without_initializer() {
    let mut ast = Ast::new();
    let ty = ast.type_ref("f32");
    let decl = ast.const_decl("c", Some(ty), None);
    assert_eq!(
        function_messages(&mut ast, vec![decl]),
        vec!["Constant \"c\" must be initialized."]
    );
}

#[test]
fn test_cannot_infer_type() {
    let mut ast = Ast::new();
    let decl = ast.let_decl("x", None, None);
    assert_eq!(
        function_messages(&mut ast, vec![decl]),
        vec!["Cannot infer the type of \"x\" without a type or an initializer."]
    );
}

#[test]
fn test_duplicate_parameter() {
    let mut ast = Ast::new();
    let t1 = ast.type_ref("f32");
    let p1 = ast.parameter("a", t1, vec![]);
    let t2 = ast.type_ref("f32");
    let p2 = ast.parameter("a", t2, vec![]);
    let body = ast.block(vec![]);
    let f = ast.function(vec![], "f", vec![p1, p2], None, body);
    ast.module(vec![f]);
    assert_eq!(
        trace_ast(&ast).incidents().messages(),
        vec!["Parameter with name \"a\" already defined."]
    );
}
