// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

use shade_semantics::ast::AddressSpace;
use shade_semantics::types::{is_implicit_castable_into, unify, unify_scalars, Type};

#[test]
fn test_identical_types_cast() {
    let ty = Type::vector(3, Type::Float);
    assert!(is_implicit_castable_into(&ty, &ty.clone()));
    assert!(is_implicit_castable_into(&Type::Void, &Type::Void));
    assert!(is_implicit_castable_into(
        &Type::Struct("Light".into()),
        &Type::Struct("Light".into())
    ));
}

#[test]
fn test_signed_and_unsigned_do_not_cast() {
    assert!(!is_implicit_castable_into(&Type::Int, &Type::UInt));
    assert!(!is_implicit_castable_into(&Type::UInt, &Type::Int));
    assert!(!is_implicit_castable_into(&Type::Int, &Type::Float));
}

#[test]
fn test_abstract_int_casts_into_either_integer() {
    let abstract_int = Type::abstract_int();
    assert!(is_implicit_castable_into(&abstract_int, &Type::Int));
    assert!(is_implicit_castable_into(&abstract_int, &Type::UInt));
    assert!(!is_implicit_castable_into(&abstract_int, &Type::Bool));
}

#[test]
fn test_abstract_float_casts_into_f32_only() {
    let abstract_float = Type::abstract_float();
    assert!(is_implicit_castable_into(&abstract_float, &Type::Float));
    assert!(!is_implicit_castable_into(&abstract_float, &Type::Int));
}

#[test]
fn test_abstract_composites_cast_component_wise() {
    let source = Type::vector(2, Type::abstract_float());
    assert!(is_implicit_castable_into(&source, &Type::vector(2, Type::Float)));
    assert!(!is_implicit_castable_into(&source, &Type::vector(3, Type::Float)));
    let concrete = Type::vector(2, Type::Int);
    assert!(!is_implicit_castable_into(&concrete, &Type::vector(2, Type::UInt)));
}

#[test]
fn test_pointers_cast_within_one_address_space() {
    let private = Type::pointer(AddressSpace::Private, Type::Float);
    let function = Type::pointer(AddressSpace::Function, Type::Float);
    assert!(is_implicit_castable_into(&private, &private.clone()));
    assert!(!is_implicit_castable_into(&private, &function));
}

#[test]
fn test_void_only_casts_into_void() {
    assert!(!is_implicit_castable_into(&Type::Void, &Type::Float));
    assert!(!is_implicit_castable_into(&Type::Float, &Type::Void));
}

#[test]
fn test_unify_scalars() {
    assert_eq!(unify_scalars(&Type::abstract_int(), &Type::UInt), Some(Type::UInt));
    assert_eq!(unify_scalars(&Type::abstract_int(), &Type::Float), Some(Type::Float));
    assert_eq!(unify_scalars(&Type::abstract_float(), &Type::Int), None);
    assert_eq!(unify_scalars(&Type::Int, &Type::UInt), None);
    assert_eq!(unify_scalars(&Type::Bool, &Type::Bool), None);
}

#[test]
fn test_unify_vectors() {
    let v = Type::vector(3, Type::Float);
    assert_eq!(unify(&v, &Type::vector(3, Type::abstract_float())), Some(v.clone()));
    assert_eq!(unify(&v, &Type::vector(2, Type::Float)), None);
}

#[test]
fn test_target_spelling() {
    assert_eq!(Type::vector(4, Type::Float).target_spelling(), "vec4<f32>");
    assert_eq!(Type::matrix(4, 3, Type::Float).target_spelling(), "mat4x3<f32>");
    assert_eq!(Type::array(Type::UInt, Some(8)).target_spelling(), "array<u32, 8>");
    assert_eq!(Type::array(Type::Float, None).target_spelling(), "array<f32>");
    assert_eq!(Type::abstract_float().target_spelling(), "f32");
    assert_eq!(Type::Enum("Mode".into()).target_spelling(), "u32");
    assert_eq!(
        Type::pointer(AddressSpace::Function, Type::Int).target_spelling(),
        "ptr<function, i32>"
    );
    assert_eq!(
        Type::pointer(AddressSpace::Workgroup, Type::UInt).target_spelling(),
        "ptr<workgroup, u32>"
    );
}

#[test]
fn test_display() {
    assert_eq!(Type::abstract_int().to_string(), "abstract-int");
    assert_eq!(Type::vector(3, Type::Float).to_string(), "vec3<f32>");
    assert_eq!(Type::Enum("Mode".into()).to_string(), "Mode");
}
