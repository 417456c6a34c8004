// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

use shade_semantics::ast::{AccessMode, AddressSpace, Ast, Attribute, ModuleVariable, Node};
use shade_semantics::trace::Trace;

fn trace_ast(ast: &Ast) -> Trace {
    let mut trace = Trace::new();
    ast.trace(&mut trace);
    trace
}

#[test]
fn test_duplicate_struct_property() {
    let mut ast = Ast::new();
    let t1 = ast.type_ref("f32");
    let a1 = ast.property("a", t1, vec![]);
    let t2 = ast.type_ref("u32");
    let a2 = ast.property("a", t2, vec![]);
    let s = ast.struct_decl("S", vec![a1, a2]);
    ast.module(vec![s]);
    let trace = trace_ast(&ast);
    assert_eq!(
        trace.incidents().messages(),
        vec!["Property with name \"a\" already defined."]
    );
    assert_eq!(trace.struct_property("S", "a"), Some(a1));
}

#[test]
fn test_same_property_name_in_different_structs() {
    let mut ast = Ast::new();
    let t1 = ast.type_ref("f32");
    let a1 = ast.property("a", t1, vec![]);
    let s = ast.struct_decl("S", vec![a1]);
    let t2 = ast.type_ref("f32");
    let a2 = ast.property("a", t2, vec![]);
    let t = ast.struct_decl("T", vec![a2]);
    ast.module(vec![s, t]);
    assert!(!trace_ast(&ast).has_incidents());
}

#[test]
fn test_duplicate_enum_member() {
    let mut ast = Ast::new();
    let e = ast.enum_decl("Mode", &["Off", "On", "Off"]);
    ast.module(vec![e]);
    assert_eq!(
        trace_ast(&ast).incidents().messages(),
        vec!["Member with name \"Off\" already defined."]
    );
}

#[test]
fn test_duplicate_function() {
    let mut ast = Ast::new();
    let b1 = ast.block(vec![]);
    let f1 = ast.function(vec![], "f", vec![], None, b1);
    let b2 = ast.block(vec![]);
    let f2 = ast.function(vec![], "f", vec![], None, b2);
    ast.module(vec![f1, f2]);
    let trace = trace_ast(&ast);
    assert_eq!(
        trace.incidents().messages(),
        vec!["Function with name \"f\" already defined."]
    );
    assert_eq!(trace.function("f"), Some(f1));
    assert_eq!(trace.incidents()[0].node(), Some(f2));
}

#[test]
fn test_duplicate_module_variable() {
    let mut ast = Ast::new();
    let t1 = ast.type_ref("f32");
    let v1 = ast.private_var("x", Some(t1), None);
    let one = ast.int("1");
    let v2 = ast.module_const("x", None, Some(one));
    ast.module(vec![v1, v2]);
    assert_eq!(
        trace_ast(&ast).incidents().messages(),
        vec!["Variable with name \"x\" already defined."]
    );
}

#[test]
fn test_struct_and_alias_registries_are_separate() {
    let mut ast = Ast::new();
    let t = ast.type_ref("f32");
    let a = ast.property("a", t, vec![]);
    let s = ast.struct_decl("S", vec![a]);
    let target = ast.type_ref("f32");
    let alias = ast.alias("Scalar", target);
    ast.module(vec![s, alias]);
    let trace = trace_ast(&ast);
    assert!(!trace.has_incidents());
    assert_eq!(trace.struct_decl("S"), Some(s));
    assert_eq!(trace.alias("Scalar"), Some(alias));
    assert_eq!(trace.struct_decl("Scalar"), None);
}

#[test]
fn test_locations_are_counted_per_owner() {
    // struct VsOut { @location(color) c: vec4f, @location(uv) uv: vec2f }
    // @fragment fn fs(@location(uv) uv: vec2f) {}
    let mut ast = Ast::new();
    let t1 = ast.type_ref("vec4f");
    let c = ast.property("c", t1, vec![Attribute::new("location", &["color"])]);
    let t2 = ast.type_ref("vec2f");
    let uv = ast.property("uv", t2, vec![Attribute::new("location", &["uv"])]);
    let s = ast.struct_decl("VsOut", vec![c, uv]);
    let t3 = ast.type_ref("vec2f");
    let param = ast.parameter("uv", t3, vec![Attribute::new("location", &["uv"])]);
    let body = ast.block(vec![]);
    let fs = ast.function(vec![Attribute::new("fragment", &[])], "fs", vec![param], None, body);
    ast.module(vec![s, fs]);
    let trace = trace_ast(&ast);
    assert!(!trace.has_incidents());
    let locations = trace.locations();
    assert_eq!(locations.location_index("VsOut", "color"), Some(0));
    assert_eq!(locations.location_index("VsOut", "uv"), Some(1));
    assert_eq!(locations.location_index("fs", "uv"), Some(0));
    assert_eq!(locations.location_index("fs", "color"), None);
}

#[test]
fn test_unknown_property_attribute() {
    let mut ast = Ast::new();
    let t = ast.type_ref("f32");
    let a = ast.property("a", t, vec![Attribute::new("shiny", &[])]);
    let s = ast.struct_decl("S", vec![a]);
    ast.module(vec![s]);
    assert_eq!(
        trace_ast(&ast).incidents().messages(),
        vec!["Unknown attribute \"@shiny\"."]
    );
}

#[test]
fn test_binding_indices_follow_first_appearance() {
    let mut ast = Ast::new();
    let t1 = ast.type_ref("f32");
    let a = ast.bound_var("frame", "time", AddressSpace::Uniform, None, "time", t1);
    let t2 = ast.type_ref("u32");
    let b = ast.bound_var("scene", "count", AddressSpace::Uniform, None, "count", t2);
    let element = ast.type_ref("f32");
    let t3 = ast.array_type(element, None);
    let c = ast.bound_var(
        "frame",
        "data",
        AddressSpace::Storage,
        Some(AccessMode::ReadWrite),
        "data",
        t3,
    );
    ast.module(vec![a, b, c]);
    let trace = trace_ast(&ast);
    assert!(!trace.has_incidents());
    let bindings = trace.bindings();
    assert_eq!(bindings.number_of_groups(), 2);
    assert_eq!(bindings.group_index("scene"), Some(1));
    assert_eq!(bindings.binding_index("frame", "data"), Some(1));
    assert_eq!(bindings.binding_index("scene", "count"), Some(0));
}

#[test]
fn test_initializer_not_allowed_for_workgroup() {
    let mut ast = Ast::new();
    let t = ast.type_ref("f32");
    let one = ast.float("1.0");
    let var = ast.add(Node::ModuleVariable(ModuleVariable {
        group: None,
        binding: None,
        address_space: Some(AddressSpace::Workgroup),
        access: None,
        name: "shared".into(),
        ty: Some(t),
        initializer: Some(one),
    }));
    let t = ast.type_ref("f32");
    let two = ast.float("2.0");
    let private = ast.private_var("p", Some(t), Some(two));
    ast.module(vec![var, private]);
    assert_eq!(
        trace_ast(&ast).incidents().messages(),
        vec!["Variable \"shared\" in the workgroup address space cannot have an initializer."]
    );
}
