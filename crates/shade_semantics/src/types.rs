// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

// Defines the data structures representing the types attached to expressions and
// declarations in the traced AST.
// This file should hold all code that manipulates types on their own: implicit casts,
// unification of operand types for binary operators, and the spelling of a type in the
// target dialect. Anything that needs the registries (alias chains, struct layouts) lives
// in `type_resolution`.

use std::fmt;

use boolenum::BoolEnum;
use smol_str::SmolStr;

use crate::ast::AddressSpace;

/// Whether an expression denotes a place that can be written through or have its address taken.
#[derive(BoolEnum, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IsStorage {
    True,
    False,
}

/// Flavor of an abstract (untyped) numeric literal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AbstractKind {
    Int,
    Float,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    /// Type of an unsuffixed numeric literal before it is pinned to a concrete scalar.
    Abstract(AbstractKind),
    Float,
    Int,
    UInt,
    Bool,
    String,
    Void,
    /// Component count and component type.
    Vector(u8, Box<Type>),
    /// Columns, rows and component type.
    Matrix(u8, u8, Box<Type>),
    /// Element type and length. `None` is a runtime-sized array.
    Array(Box<Type>, Option<u32>),
    Struct(SmolStr),
    Enum(SmolStr),
    /// Address space and pointee type.
    Pointer(AddressSpace, Box<Type>),
    // Undefined is the type of something that failed to resolve, an unbound identifier
    // or a call with bad arguments. It casts to and from everything so that one mistake
    // is reported once.
    Undefined,
}

impl Type {
    pub fn abstract_int() -> Type {
        Type::Abstract(AbstractKind::Int)
    }

    pub fn abstract_float() -> Type {
        Type::Abstract(AbstractKind::Float)
    }

    pub fn vector(size: u8, component: Type) -> Type {
        Type::Vector(size, Box::new(component))
    }

    pub fn matrix(columns: u8, rows: u8, component: Type) -> Type {
        Type::Matrix(columns, rows, Box::new(component))
    }

    pub fn array(element: Type, length: Option<u32>) -> Type {
        Type::Array(Box::new(element), length)
    }

    pub fn pointer(space: AddressSpace, pointee: Type) -> Type {
        Type::Pointer(space, Box::new(pointee))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Type::Undefined)
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self, Type::Abstract(..))
    }

    /// `true` for abstract numbers, `f32`, `i32` and `u32`.
    pub fn is_numeric_scalar(&self) -> bool {
        matches!(
            self,
            Type::Abstract(..) | Type::Float | Type::Int | Type::UInt
        )
    }

    pub fn is_integer_scalar(&self) -> bool {
        matches!(
            self,
            Type::Abstract(AbstractKind::Int) | Type::Int | Type::UInt
        )
    }

    /// Numeric scalars and `bool`.
    pub fn is_scalar(&self) -> bool {
        self.is_numeric_scalar() || matches!(self, Type::Bool)
    }

    /// The component type of a vector, or the type itself for a scalar.
    pub fn scalar_component(&self) -> Option<&Type> {
        match self {
            Type::Vector(_, component) => Some(component),
            ty if ty.is_scalar() => Some(ty),
            _ => None,
        }
    }

    /// Replace abstract numbers, also inside composites, by the concrete type they take
    /// when nothing else constrains them.
    pub fn concretize(&self) -> Type {
        match self {
            Type::Abstract(AbstractKind::Int) => Type::Int,
            Type::Abstract(AbstractKind::Float) => Type::Float,
            Type::Vector(n, t) => Type::vector(*n, t.concretize()),
            Type::Matrix(c, r, t) => Type::matrix(*c, *r, t.concretize()),
            Type::Array(t, len) => Type::array(t.concretize(), *len),
            other => other.clone(),
        }
    }

    /// `true` if this type, or a component of it, is abstract.
    pub fn contains_abstract(&self) -> bool {
        match self {
            Type::Abstract(..) => true,
            Type::Vector(_, t) | Type::Matrix(_, _, t) | Type::Array(t, _) => t.contains_abstract(),
            _ => false,
        }
    }

    /// Spelling of the type in generated WGSL.
    pub fn target_spelling(&self) -> String {
        match self {
            Type::Abstract(AbstractKind::Int) | Type::Int => "i32".to_string(),
            Type::Abstract(AbstractKind::Float) | Type::Float => "f32".to_string(),
            Type::UInt => "u32".to_string(),
            Type::Bool => "bool".to_string(),
            Type::String => "string".to_string(),
            Type::Void => "void".to_string(),
            Type::Vector(n, t) => format!("vec{n}<{}>", t.target_spelling()),
            Type::Matrix(c, r, t) => format!("mat{c}x{r}<{}>", t.target_spelling()),
            Type::Array(t, Some(len)) => format!("array<{}, {len}>", t.target_spelling()),
            Type::Array(t, None) => format!("array<{}>", t.target_spelling()),
            Type::Struct(name) => name.to_string(),
            // Enum members are lowered to their index.
            Type::Enum(_) => "u32".to_string(),
            Type::Pointer(space, t) => format!("ptr<{}, {}>", space.as_str(), t.target_spelling()),
            Type::Undefined => "<undefined>".to_string(),
        }
    }
}

/// Spelling used in diagnostics.
impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Abstract(AbstractKind::Int) => write!(f, "abstract-int"),
            Type::Abstract(AbstractKind::Float) => write!(f, "abstract-float"),
            Type::Float => write!(f, "f32"),
            Type::Int => write!(f, "i32"),
            Type::UInt => write!(f, "u32"),
            Type::Bool => write!(f, "bool"),
            Type::String => write!(f, "string"),
            Type::Void => write!(f, "void"),
            Type::Vector(n, t) => write!(f, "vec{n}<{t}>"),
            Type::Matrix(c, r, t) => write!(f, "mat{c}x{r}<{t}>"),
            Type::Array(t, Some(len)) => write!(f, "array<{t}, {len}>"),
            Type::Array(t, None) => write!(f, "array<{t}>"),
            Type::Struct(name) | Type::Enum(name) => write!(f, "{name}"),
            Type::Pointer(space, t) => write!(f, "ptr<{}, {t}>", space.as_str()),
            Type::Undefined => write!(f, "undefined"),
        }
    }
}

/// Return `true` if a value of type `source` may be used where `target` is expected
/// without an explicit conversion.
///
/// Identical types always cast. Pointers cast only into pointers to the same address
/// space. An abstract integer casts into `i32` or `u32`, an
/// abstract float into `f32`, and composites of abstract numbers cast component-wise
/// into composites of the same shape.
pub fn is_implicit_castable_into(source: &Type, target: &Type) -> bool {
    use Type::*;
    if source == target {
        return true;
    }
    match (source, target) {
        (Undefined, _) | (_, Undefined) => true,
        (Abstract(AbstractKind::Int), Int | UInt) => true,
        (Abstract(AbstractKind::Float), Float) => true,
        (Vector(n, s), Vector(m, t)) => n == m && s.is_abstract() && is_implicit_castable_into(s, t),
        (Matrix(c1, r1, s), Matrix(c2, r2, t)) => {
            c1 == c2 && r1 == r2 && s.is_abstract() && is_implicit_castable_into(s, t)
        }
        (Array(s, n), Array(t, m)) => {
            n == m && s.contains_abstract() && is_implicit_castable_into(s, t)
        }
        _ => false,
    }
}

//
// Unification
//

/// The common type of two numeric scalars, as used by arithmetic and comparison.
/// Two abstract numbers stay abstract, an abstract number meets a concrete scalar
/// if it casts into it.
pub fn unify_scalars(ty1: &Type, ty2: &Type) -> Option<Type> {
    use Type::*;
    if !ty1.is_numeric_scalar() || !ty2.is_numeric_scalar() {
        return None;
    }
    if ty1 == ty2 {
        return Some(ty1.clone());
    }
    match (ty1, ty2) {
        (Abstract(_), Abstract(_)) => Some(Type::abstract_float()),
        // Inside an expression an abstract int may meet an f32 operand.
        (Abstract(kind), concrete) | (concrete, Abstract(kind)) => match (kind, concrete) {
            (AbstractKind::Int, Int | UInt | Float) | (AbstractKind::Float, Float) => {
                Some(concrete.clone())
            }
            _ => None,
        },
        _ => None,
    }
}

/// Like `unify_scalars` but also accepts two vectors of the same size, or two
/// matrices of the same shape, unifying their components.
pub fn unify(ty1: &Type, ty2: &Type) -> Option<Type> {
    match (ty1, ty2) {
        (Type::Vector(n, s), Type::Vector(m, t)) if n == m => {
            unify_scalars(s, t).map(|c| Type::vector(*n, c))
        }
        (Type::Matrix(c1, r1, s), Type::Matrix(c2, r2, t)) if c1 == c2 && r1 == r2 => {
            unify_scalars(s, t).map(|c| Type::matrix(*c1, *r1, c))
        }
        _ => unify_scalars(ty1, ty2),
    }
}

#[test]
fn test_concretize_composite() {
    let t = Type::vector(3, Type::abstract_float());
    assert_eq!(t.concretize(), Type::vector(3, Type::Float));
    assert!(t.contains_abstract());
    assert!(!t.concretize().contains_abstract());
}

#[test]
fn test_enum_spelled_as_index() {
    let t = Type::Enum(SmolStr::new("Color"));
    assert_eq!(t.target_spelling(), "u32");
    assert_eq!(t.to_string(), "Color");
}

#[test]
fn test_unify_mixed_abstract() {
    assert_eq!(
        unify_scalars(&Type::abstract_int(), &Type::abstract_float()),
        Some(Type::abstract_float())
    );
    assert_eq!(unify_scalars(&Type::abstract_int(), &Type::UInt), Some(Type::UInt));
    assert_eq!(unify_scalars(&Type::Int, &Type::UInt), None);
    assert_eq!(unify_scalars(&Type::Bool, &Type::Bool), None);
}
