// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

// Resolution of written types (`TypeReference` nodes) to `Type`.
//
// Builtin names (`f32`, `vec3`, `mat4x4f`, `array`, ...) are recognized here. Any other
// name is looked up among registered structs, enums and aliases. Alias chains are
// followed with a visited set so that a cycle is reported instead of recursing forever.
//
// A problem inside an alias chain is reported once, on the alias where it occurs, and is
// silent at every use of the alias.

use hashbrown::HashSet;
use smol_str::SmolStr;

use crate::ast::{AddressSpace, Ast, Node, NodeId, TypeReference};
use crate::incident::IncidentKind;
use crate::trace::Trace;
use crate::types::Type;

enum Failure {
    /// The reference itself is wrong.
    Here(IncidentKind),
    /// Something further down an alias chain is wrong.
    InAlias(IncidentKind),
}

impl Failure {
    fn into_alias(self) -> Failure {
        match self {
            Failure::Here(kind) | Failure::InAlias(kind) => Failure::InAlias(kind),
        }
    }

    fn into_kind(self) -> IncidentKind {
        match self {
            Failure::Here(kind) | Failure::InAlias(kind) => kind,
        }
    }
}

fn type_reference(ast: &Ast, node: NodeId) -> &TypeReference {
    match ast.node(node) {
        Node::TypeReference(reference) => reference,
        other => panic!("expected a type reference, found {}", other.kind_name()),
    }
}

/// Resolve the `TypeReference` at `node` without recording anything in `trace`.
pub fn resolve_type(ast: &Ast, trace: &Trace, node: NodeId) -> Result<Type, IncidentKind> {
    resolve_with(ast, trace, node, &mut HashSet::new()).map_err(Failure::into_kind)
}

/// Resolve a bare type name such as `f32`, `vec3f` or a struct or alias name.
/// Returns `None` if `name` does not name a type.
pub fn resolve_type_name(ast: &Ast, trace: &Trace, name: &SmolStr) -> Option<Type> {
    let reference = TypeReference {
        name: name.clone(),
        parameters: Vec::new(),
        length: None,
    };
    construct_type(ast, trace, &reference, &[], &mut HashSet::new()).ok()
}

/// The address space of `ptr<space, T>`. `ptr<T>` points into the function address space.
fn pointer_space(ast: &Ast, reference: &TypeReference) -> Option<AddressSpace> {
    if reference.name != "ptr" {
        return None;
    }
    let [space, _] = reference.parameters.as_slice() else {
        return None;
    };
    let space = type_reference(ast, *space);
    if !space.parameters.is_empty() {
        return None;
    }
    AddressSpace::from_keyword(&space.name)
}

/// The parameters of `reference` that are types.
fn type_parameters<'a>(ast: &Ast, reference: &'a TypeReference) -> &'a [NodeId] {
    match pointer_space(ast, reference) {
        Some(_) => &reference.parameters[1..],
        None => &reference.parameters,
    }
}

fn resolve_with(
    ast: &Ast,
    trace: &Trace,
    node: NodeId,
    visited: &mut HashSet<SmolStr>,
) -> Result<Type, Failure> {
    let reference = type_reference(ast, node);
    let parameters = type_parameters(ast, reference)
        .iter()
        .map(|param| resolve_with(ast, trace, *param, visited))
        .collect::<Result<Vec<_>, _>>()?;
    construct_type(ast, trace, reference, &parameters, visited)
}

/// Trace the `TypeReference` at `node` and its parameters, recording the resolved types
/// and reporting problems as incidents. Returns the resolved type, `Undefined` on failure.
pub(crate) fn trace_type_reference(ast: &Ast, node: NodeId, trace: &mut Trace) -> Type {
    let reference = type_reference(ast, node);
    let parameters: Vec<Type> = type_parameters(ast, reference)
        .iter()
        .map(|param| trace_type_reference(ast, *param, trace))
        .collect();
    let ty = match construct_type(ast, trace, reference, &parameters, &mut HashSet::new()) {
        Ok(ty) => ty,
        Err(Failure::Here(kind)) => {
            trace.add_incident(kind, node);
            Type::Undefined
        }
        Err(Failure::InAlias(_)) => Type::Undefined,
    };
    tracing::trace!(%node, name = %reference.name, %ty, "resolved type");
    trace.set_resolved_type(node, ty.clone());
    ty
}

/// Check whether the alias declared at `alias_node` leads back to itself. An alias that
/// merely leads into a cycle of other aliases is not itself circular.
pub(crate) fn alias_is_circular(ast: &Ast, trace: &Trace, alias_node: NodeId) -> bool {
    let Node::Alias(alias) = ast.node(alias_node) else {
        panic!("expected an alias declaration");
    };
    let mut visited = HashSet::new();
    visited.insert(alias.name.clone());
    match resolve_with(ast, trace, alias.target, &mut visited) {
        Err(failure) => matches!(
            failure.into_kind(),
            IncidentKind::CircularAlias(name) if name == alias.name
        ),
        Ok(_) => false,
    }
}

fn expect_parameters(reference: &TypeReference, parameters: &[Type], expected: usize) -> Result<(), Failure> {
    if parameters.len() == expected {
        return Ok(());
    }
    Err(Failure::Here(IncidentKind::TypeParameterCount {
        name: reference.name.clone(),
        expected,
        found: parameters.len(),
    }))
}

fn construct_type(
    ast: &Ast,
    trace: &Trace,
    reference: &TypeReference,
    parameters: &[Type],
    visited: &mut HashSet<SmolStr>,
) -> Result<Type, Failure> {
    let name = reference.name.as_str();
    if parameters.iter().any(Type::is_undefined) {
        return Ok(Type::Undefined);
    }
    if let Some(ty) = predeclared_type(name) {
        expect_parameters(reference, parameters, 0)?;
        return Ok(ty);
    }
    let invalid_component = |component: &Type| {
        Failure::Here(IncidentKind::InvalidComponentType {
            name: reference.name.clone(),
            component: component.clone(),
        })
    };
    if let Some(size) = vector_size(name) {
        expect_parameters(reference, parameters, 1)?;
        let component = &parameters[0];
        if !component.is_scalar() || component.is_abstract() {
            return Err(invalid_component(component));
        }
        return Ok(Type::vector(size, component.clone()));
    }
    if let Some((columns, rows)) = matrix_shape(name) {
        expect_parameters(reference, parameters, 1)?;
        let component = &parameters[0];
        if *component != Type::Float {
            return Err(invalid_component(component));
        }
        return Ok(Type::matrix(columns, rows, Type::Float));
    }
    match name {
        "array" => {
            expect_parameters(reference, parameters, 1)?;
            let element = &parameters[0];
            if matches!(element, Type::Void | Type::String) || element.is_abstract() {
                return Err(invalid_component(element));
            }
            Ok(Type::array(element.clone(), reference.length))
        }
        "ptr" => {
            expect_parameters(reference, parameters, 1)?;
            let space = pointer_space(ast, reference).unwrap_or(AddressSpace::Function);
            Ok(Type::pointer(space, parameters[0].clone()))
        }
        _ => user_type(ast, trace, reference, parameters, visited),
    }
}

fn user_type(
    ast: &Ast,
    trace: &Trace,
    reference: &TypeReference,
    parameters: &[Type],
    visited: &mut HashSet<SmolStr>,
) -> Result<Type, Failure> {
    let name = &reference.name;
    if trace.struct_decl(name).is_some() {
        expect_parameters(reference, parameters, 0)?;
        return Ok(Type::Struct(name.clone()));
    }
    if trace.enum_decl(name).is_some() {
        expect_parameters(reference, parameters, 0)?;
        return Ok(Type::Enum(name.clone()));
    }
    if let Some(alias_node) = trace.alias(name) {
        expect_parameters(reference, parameters, 0)?;
        if !visited.insert(name.clone()) {
            return Err(Failure::Here(IncidentKind::CircularAlias(name.clone())));
        }
        let Node::Alias(alias) = ast.node(alias_node) else {
            panic!("alias registry entry \"{name}\" is not an alias declaration");
        };
        return resolve_with(ast, trace, alias.target, visited).map_err(Failure::into_alias);
    }
    Err(Failure::Here(IncidentKind::UndefinedType(name.clone())))
}

/// Types that need no declaration and take no parameters.
fn predeclared_type(name: &str) -> Option<Type> {
    let ty = match name {
        "f32" => Type::Float,
        "i32" => Type::Int,
        "u32" => Type::UInt,
        "bool" => Type::Bool,
        "void" => Type::Void,
        "string" => Type::String,
        _ => return shorthand_type(name),
    };
    Some(ty)
}

/// `vec3f`, `vec2u`, `mat4x4f` and friends.
fn shorthand_type(name: &str) -> Option<Type> {
    let (stem, component) = match name.as_bytes().last()? {
        b'f' => (&name[..name.len() - 1], Type::Float),
        b'i' => (&name[..name.len() - 1], Type::Int),
        b'u' => (&name[..name.len() - 1], Type::UInt),
        _ => return None,
    };
    if let Some(size) = vector_size(stem) {
        return Some(Type::vector(size, component));
    }
    match (matrix_shape(stem), component) {
        (Some((columns, rows)), Type::Float) => Some(Type::matrix(columns, rows, Type::Float)),
        _ => None,
    }
}

fn dimension(byte: u8) -> Option<u8> {
    matches!(byte, b'2'..=b'4').then(|| byte - b'0')
}

pub(crate) fn vector_size(name: &str) -> Option<u8> {
    match name.strip_prefix("vec")?.as_bytes() {
        [n] => dimension(*n),
        _ => None,
    }
}

fn matrix_shape(name: &str) -> Option<(u8, u8)> {
    match name.strip_prefix("mat")?.as_bytes() {
        [c, b'x', r] => Some((dimension(*c)?, dimension(*r)?)),
        _ => None,
    }
}

#[test]
fn test_shorthand_types() {
    assert_eq!(predeclared_type("vec3f"), Some(Type::vector(3, Type::Float)));
    assert_eq!(predeclared_type("vec2u"), Some(Type::vector(2, Type::UInt)));
    assert_eq!(predeclared_type("mat4x4f"), Some(Type::matrix(4, 4, Type::Float)));
    assert_eq!(predeclared_type("mat4x4i"), None);
    assert_eq!(predeclared_type("vec5f"), None);
    assert_eq!(predeclared_type("Light"), None);
    assert_eq!(predeclared_type("void"), Some(Type::Void));
    assert_eq!(predeclared_type("string"), Some(Type::String));
}
