// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

// Builtin functions and their overloads.
//
// Each builtin is matched by shape rather than by an explicit overload table: "a float
// scalar or vector", "two numeric values of the same shape" and so on. Abstract
// arguments are accepted wherever a concrete type they cast into is, and results are
// concretized.

use crate::types::{unify, Type};

#[derive(Clone, Debug, PartialEq)]
pub enum BuiltinMatch {
    /// Not the name of a builtin.
    Unknown,
    /// A builtin with no overload for these arguments.
    NoOverload,
    Matched(Type),
}

/// Names of the builtins, sorted.
pub const BUILTIN_FUNCTIONS: &[&str] = &[
    "abs",
    "acos",
    "all",
    "any",
    "asin",
    "atan",
    "atan2",
    "ceil",
    "clamp",
    "cos",
    "cross",
    "degrees",
    "determinant",
    "distance",
    "dot",
    "exp",
    "exp2",
    "floor",
    "fract",
    "inverseSqrt",
    "length",
    "log",
    "log2",
    "max",
    "min",
    "mix",
    "normalize",
    "pow",
    "radians",
    "reflect",
    "round",
    "saturate",
    "select",
    "sign",
    "sin",
    "smoothstep",
    "sqrt",
    "step",
    "tan",
    "transpose",
    "trunc",
];

pub fn is_builtin(name: &str) -> bool {
    BUILTIN_FUNCTIONS.binary_search(&name).is_ok()
}

pub fn resolve_builtin(name: &str, arguments: &[Type]) -> BuiltinMatch {
    if !is_builtin(name) {
        return BuiltinMatch::Unknown;
    }
    if arguments.iter().any(Type::is_undefined) {
        return BuiltinMatch::Matched(Type::Undefined);
    }
    let result = match name {
        "acos" | "asin" | "atan" | "ceil" | "cos" | "degrees" | "exp" | "exp2" | "floor"
        | "fract" | "inverseSqrt" | "log" | "log2" | "radians" | "round" | "saturate" | "sin"
        | "sqrt" | "tan" | "trunc" => match arguments {
            [x] => float_shape(x),
            _ => None,
        },
        "atan2" | "pow" | "step" => match arguments {
            [x, y] => same_float_shape(&[x, y]),
            _ => None,
        },
        "smoothstep" => match arguments {
            [low, high, x] => same_float_shape(&[low, high, x]),
            _ => None,
        },
        "mix" => match arguments {
            [x, y, t] => same_float_shape(&[x, y, t]).or_else(|| {
                // mix(vec, vec, scalar)
                let shape = same_float_shape(&[x, y])?;
                let scalar = float_shape(t)?;
                (matches!(shape, Type::Vector(..)) && scalar == Type::Float).then_some(shape)
            }),
            _ => None,
        },
        "abs" | "sign" => match arguments {
            [x] => numeric_shape(x).filter(|t| name == "abs" || signed(t)),
            _ => None,
        },
        "min" | "max" => match arguments {
            [x, y] => unify(x, y).and_then(|t| numeric_shape(&t)),
            _ => None,
        },
        "clamp" => match arguments {
            [x, low, high] => unify(x, low)
                .and_then(|t| unify(&t, high))
                .and_then(|t| numeric_shape(&t)),
            _ => None,
        },
        "normalize" => match arguments {
            [v @ Type::Vector(..)] => float_shape(v),
            _ => None,
        },
        "length" => match arguments {
            [x] => float_shape(x).map(|_| Type::Float),
            _ => None,
        },
        "distance" => match arguments {
            [x, y] => same_float_shape(&[x, y]).map(|_| Type::Float),
            _ => None,
        },
        "dot" => match arguments {
            [x @ Type::Vector(..), y @ Type::Vector(..)] => match unify(x, y) {
                Some(Type::Vector(_, component)) if component.is_numeric_scalar() => {
                    Some(component.concretize())
                }
                _ => None,
            },
            _ => None,
        },
        "cross" => match arguments {
            [x, y] => same_float_shape(&[x, y]).filter(|t| *t == Type::vector(3, Type::Float)),
            _ => None,
        },
        "reflect" => match arguments {
            [x @ Type::Vector(..), y] => same_float_shape(&[x, y]),
            _ => None,
        },
        "select" => match arguments {
            [f, t, Type::Bool] => unify(f, t)
                .map(|ty| ty.concretize())
                .or_else(|| (f == t).then(|| f.clone())),
            _ => None,
        },
        "all" | "any" => match arguments {
            [Type::Bool] => Some(Type::Bool),
            [Type::Vector(_, component)] if **component == Type::Bool => Some(Type::Bool),
            _ => None,
        },
        "transpose" => match arguments {
            [Type::Matrix(c, r, component)] => Some(Type::Matrix(*r, *c, component.clone())),
            _ => None,
        },
        "determinant" => match arguments {
            [Type::Matrix(c, r, component)] if c == r => Some((**component).clone()),
            _ => None,
        },
        _ => None,
    };
    match result {
        Some(ty) => BuiltinMatch::Matched(ty),
        None => BuiltinMatch::NoOverload,
    }
}

/// The concrete float type of the same shape as `ty`, if `ty` is a float scalar or
/// vector. Abstract numbers of either kind count as floats here.
fn float_shape(ty: &Type) -> Option<Type> {
    match ty {
        Type::Float | Type::Abstract(_) => Some(Type::Float),
        Type::Vector(n, component) => match **component {
            Type::Float | Type::Abstract(_) => Some(Type::vector(*n, Type::Float)),
            _ => None,
        },
        _ => None,
    }
}

fn same_float_shape(arguments: &[&Type]) -> Option<Type> {
    let shapes = arguments
        .iter()
        .map(|ty| float_shape(ty))
        .collect::<Option<Vec<_>>>()?;
    let first = shapes.first()?;
    shapes.iter().all(|shape| shape == first).then(|| first.clone())
}

/// The concretized type, if `ty` is a numeric scalar or vector.
fn numeric_shape(ty: &Type) -> Option<Type> {
    match ty {
        t if t.is_numeric_scalar() => Some(t.concretize()),
        Type::Vector(_, component) if component.is_numeric_scalar() => Some(ty.concretize()),
        _ => None,
    }
}

fn signed(ty: &Type) -> bool {
    !matches!(ty.scalar_component(), Some(Type::UInt))
}

#[test]
fn test_builtin_names_sorted() {
    let mut sorted = BUILTIN_FUNCTIONS.to_vec();
    sorted.sort_unstable();
    assert_eq!(sorted, BUILTIN_FUNCTIONS);
}

#[test]
fn test_resolve_float_builtins() {
    let v3 = Type::vector(3, Type::Float);
    assert_eq!(resolve_builtin("sin", &[Type::Float]), BuiltinMatch::Matched(Type::Float));
    assert_eq!(
        resolve_builtin("sqrt", &[Type::abstract_int()]),
        BuiltinMatch::Matched(Type::Float)
    );
    assert_eq!(resolve_builtin("length", &[v3.clone()]), BuiltinMatch::Matched(Type::Float));
    assert_eq!(
        resolve_builtin("dot", &[v3.clone(), v3.clone()]),
        BuiltinMatch::Matched(Type::Float)
    );
    assert_eq!(resolve_builtin("cross", &[v3.clone(), v3]), BuiltinMatch::Matched(Type::vector(3, Type::Float)));
    assert_eq!(resolve_builtin("sin", &[Type::Bool]), BuiltinMatch::NoOverload);
    assert_eq!(resolve_builtin("frobnicate", &[]), BuiltinMatch::Unknown);
}

#[test]
fn test_resolve_generic_builtins() {
    assert_eq!(
        resolve_builtin("max", &[Type::UInt, Type::abstract_int()]),
        BuiltinMatch::Matched(Type::UInt)
    );
    assert_eq!(resolve_builtin("sign", &[Type::UInt]), BuiltinMatch::NoOverload);
    assert_eq!(
        resolve_builtin("select", &[Type::Int, Type::Int, Type::Bool]),
        BuiltinMatch::Matched(Type::Int)
    );
}
