// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

use itertools::Itertools;
use smol_str::SmolStr;

use crate::ast::*;
use crate::builtins::{resolve_builtin, BuiltinMatch};
use crate::constant::{fold_binary, fold_unary, ConstantValue};
use crate::incident::IncidentKind;
use crate::trace::{ExpressionTrace, Trace};
use crate::type_resolution::{resolve_type, resolve_type_name, trace_type_reference, vector_size};
use crate::types::{is_implicit_castable_into, unify, unify_scalars, AbstractKind, Type};

/// Trace the expression at `id` and its operands, record the result and return a copy of it.
pub fn trace_expression(ast: &Ast, id: NodeId, trace: &mut Trace) -> ExpressionTrace {
    let result = match ast.node(id) {
        Node::IntLiteral(literal) => int_literal(id, literal, trace),
        Node::FloatLiteral(literal) => {
            let ty = if literal.suffixed {
                Type::Float
            } else {
                Type::abstract_float()
            };
            ExpressionTrace::constant(ty, Some(ConstantValue::Float(literal.value)))
        }
        Node::BoolLiteral(value) => {
            ExpressionTrace::constant(Type::Bool, Some(ConstantValue::Bool(*value)))
        }
        Node::Identifier(name) => identifier(id, name, trace),
        Node::Binary(expr) => binary(ast, id, expr, trace),
        Node::Unary(expr) => unary(ast, id, expr, trace),
        Node::Parenthesized(inner) => trace_expression(ast, *inner, trace),
        Node::Call(call) => call_expression(ast, id, call, trace),
        Node::Construct(construct) => {
            let ty = trace_type_reference(ast, construct.ty, trace);
            let arguments = trace_arguments(ast, &construct.arguments, trace);
            construct_value(ast, id, &ty, &arguments, trace)
        }
        Node::Member(member) => member_access(ast, id, member, trace),
        Node::Index(index) => index_access(ast, index, trace),
        other => panic!("{} {id} is not an expression", other.kind_name()),
    };
    trace.register_expression(id, result.clone());
    result
}

fn int_literal(id: NodeId, literal: &IntLiteral, trace: &mut Trace) -> ExpressionTrace {
    let (ty, max) = match literal.suffix {
        None => (Type::abstract_int(), i64::MAX as u64),
        // The magnitude of i32::MIN is allowed so that it can be negated.
        Some(IntSuffix::I) => (Type::Int, 1 << 31),
        Some(IntSuffix::U) => (Type::UInt, u32::MAX as u64),
    };
    if literal.value > max {
        trace.add_incident(IncidentKind::IntegerOutOfRange(literal.text.clone()), id);
        return ExpressionTrace::constant(ty, None);
    }
    ExpressionTrace::constant(ty, Some(ConstantValue::Int(literal.value as i64)))
}

fn identifier(id: NodeId, name: &SmolStr, trace: &mut Trace) -> ExpressionTrace {
    if let Some(value) = trace.get_value(name) {
        return value.clone();
    }
    let kind = if trace.module_variable(name).is_some() {
        IncidentKind::UsedBeforeDeclaration(name.clone())
    } else {
        IncidentKind::UndefinedVariable(name.clone())
    };
    trace.add_incident(kind, id);
    ExpressionTrace::undefined()
}

fn binary(ast: &Ast, id: NodeId, expr: &Binary, trace: &mut Trace) -> ExpressionTrace {
    let left = trace_expression(ast, expr.left, trace);
    let right = trace_expression(ast, expr.right, trace);
    if left.ty().is_undefined() || right.ty().is_undefined() {
        return ExpressionTrace::undefined();
    }
    let Some(ty) = binary_result_type(expr.op, left.ty(), right.ty()) else {
        trace.add_incident(
            IncidentKind::InvalidOperands {
                op: expr.op.as_str(),
                left: left.ty().clone(),
                right: right.ty().clone(),
            },
            id,
        );
        return ExpressionTrace::undefined();
    };
    if !(left.is_constant() && right.is_constant()) {
        return ExpressionTrace::value(ty);
    }
    let folded = match (left.constant_value(), right.constant_value()) {
        (Some(l), Some(r)) => fold_binary(expr.op, l, r),
        _ => None,
    };
    ExpressionTrace::constant(ty, folded)
}

/// Result type of `left op right`, or `None` if the operator does not apply.
pub(super) fn binary_result_type(op: BinaryOp, left: &Type, right: &Type) -> Option<Type> {
    use Type::*;
    if op.is_logical() {
        let both_bool = is_implicit_castable_into(left, &Bool) && is_implicit_castable_into(right, &Bool);
        return both_bool.then_some(Bool);
    }
    if op.is_shift() {
        fn shift_amount(ty: &Type) -> bool {
            matches!(ty, Type::UInt | Type::Abstract(AbstractKind::Int))
        }
        return match (left, right) {
            (Vector(n, l), Vector(m, r)) if n == m && l.is_integer_scalar() && shift_amount(r) => {
                Some(left.clone())
            }
            (l, r) if l.is_integer_scalar() && shift_amount(r) => Some(left.clone()),
            _ => None,
        };
    }
    if op.is_comparison() {
        let equality = matches!(op, BinaryOp::Eq | BinaryOp::NotEq);
        return match (left, right) {
            (Enum(a), Enum(b)) if equality && a == b => Some(Bool),
            (Bool, Bool) if equality => Some(Bool),
            (Vector(n, l), Vector(m, r)) if n == m => {
                let bools = **l == Bool && **r == Bool && equality;
                (bools || unify_scalars(l, r).is_some()).then(|| Type::vector(*n, Bool))
            }
            _ => unify_scalars(left, right).map(|_| Bool),
        };
    }
    if op.is_bitwise() {
        if let (Bool, Bool) = (left, right) {
            return Some(Bool);
        }
        let ty = unify(left, right)?;
        return ty.scalar_component()?.is_integer_scalar().then_some(ty);
    }
    // Arithmetic
    let multiply = op == BinaryOp::Mul;
    match (left, right) {
        (Vector(..), Vector(..)) => unify(left, right),
        (Vector(n, c), s) | (s, Vector(n, c)) if s.is_numeric_scalar() => {
            unify_scalars(c, s).map(|c| Type::vector(*n, c))
        }
        (Matrix(..), Matrix(..)) if matches!(op, BinaryOp::Add | BinaryOp::Sub) => unify(left, right),
        (Matrix(c1, r1, t1), Matrix(c2, r2, t2)) if multiply && c1 == r2 => {
            unify_scalars(t1, t2).map(|t| Type::matrix(*c2, *r1, t))
        }
        (Matrix(c, r, t), Vector(n, v)) if multiply && c == n => {
            unify_scalars(t, v).map(|t| Type::vector(*r, t))
        }
        (Vector(n, v), Matrix(c, r, t)) if multiply && n == r => {
            unify_scalars(v, t).map(|t| Type::vector(*c, t))
        }
        (Matrix(c, r, t), s) | (s, Matrix(c, r, t)) if multiply && s.is_numeric_scalar() => {
            unify_scalars(t, s).map(|t| Type::matrix(*c, *r, t))
        }
        _ => unify_scalars(left, right),
    }
}

fn unary(ast: &Ast, id: NodeId, expr: &Unary, trace: &mut Trace) -> ExpressionTrace {
    let operand = trace_expression(ast, expr.operand, trace);
    let ty = operand.ty().clone();
    if ty.is_undefined() {
        return ExpressionTrace::undefined();
    }
    let invalid = |trace: &mut Trace| {
        trace.add_incident(
            IncidentKind::InvalidOperand {
                op: expr.op.as_str(),
                operand: operand.ty().clone(),
            },
            id,
        );
        ExpressionTrace::undefined()
    };
    let applies = match expr.op {
        UnaryOp::Negate => match &ty {
            Type::Matrix(..) => true,
            other => other
                .scalar_component()
                .is_some_and(|c| c.is_numeric_scalar() && *c != Type::UInt),
        },
        UnaryOp::Not => ty.scalar_component() == Some(&Type::Bool),
        UnaryOp::BitNot => ty.scalar_component().is_some_and(Type::is_integer_scalar),
        UnaryOp::AddressOf => {
            // Parameters and constants are storage without an address space.
            let space = match operand.address_space() {
                Some(space) if operand.is_storage() => space,
                _ => {
                    trace.add_incident(IncidentKind::NotAddressable, id);
                    return ExpressionTrace::undefined();
                }
            };
            return ExpressionTrace::value(Type::pointer(space, ty.concretize()));
        }
        UnaryOp::Deref => {
            return match ty {
                Type::Pointer(space, pointee) => {
                    let fixed_state = match space {
                        AddressSpace::Uniform => crate::trace::FixedState::Constant,
                        _ => crate::trace::FixedState::Variable,
                    };
                    ExpressionTrace::storage(*pointee, fixed_state, Some(space))
                }
                other => {
                    trace.add_incident(IncidentKind::NotAPointer(other), id);
                    ExpressionTrace::undefined()
                }
            };
        }
    };
    if !applies {
        return invalid(trace);
    }
    if operand.is_constant() {
        let folded = operand.constant_value().and_then(|v| fold_unary(expr.op, v));
        return ExpressionTrace::constant(ty, folded);
    }
    ExpressionTrace::value(ty)
}

fn trace_arguments(ast: &Ast, arguments: &[NodeId], trace: &mut Trace) -> Vec<(NodeId, ExpressionTrace)> {
    arguments
        .iter()
        .map(|arg| (*arg, trace_expression(ast, *arg, trace)))
        .collect()
}

fn argument_list(arguments: &[(NodeId, ExpressionTrace)]) -> String {
    arguments.iter().map(|(_, arg)| arg.ty()).join(", ")
}

/// A call result: constant if every argument is.
fn call_result(ty: Type, arguments: &[(NodeId, ExpressionTrace)]) -> ExpressionTrace {
    if arguments.iter().all(|(_, arg)| arg.is_constant()) {
        ExpressionTrace::constant(ty, None)
    } else {
        ExpressionTrace::value(ty)
    }
}

fn call_expression(ast: &Ast, id: NodeId, call: &Call, trace: &mut Trace) -> ExpressionTrace {
    let arguments = trace_arguments(ast, &call.arguments, trace);
    let name = &call.function;

    if let Some(function_node) = trace.function(name) {
        trace.set_call_target(id, name.clone());
        return user_function_call(ast, id, name, function_node, &arguments, trace);
    }

    let argument_types: Vec<Type> = arguments.iter().map(|(_, arg)| arg.ty().clone()).collect();
    let any_undefined = argument_types.iter().any(Type::is_undefined);
    match resolve_builtin(name, &argument_types) {
        BuiltinMatch::Matched(Type::Undefined) => {
            trace.set_call_target(id, name.clone());
            return ExpressionTrace::undefined();
        }
        BuiltinMatch::Matched(ty) => {
            trace.set_call_target(id, name.clone());
            return call_result(ty, &arguments);
        }
        BuiltinMatch::NoOverload => {
            trace.add_incident(
                IncidentKind::NoMatchingOverload {
                    function: name.clone(),
                    arguments: argument_list(&arguments),
                },
                id,
            );
            trace.set_call_target(id, name.clone());
            return ExpressionTrace::undefined();
        }
        BuiltinMatch::Unknown => {}
    }

    if any_undefined && vector_size(name).is_some() {
        return ExpressionTrace::undefined();
    }
    let constructed = resolve_type_name(ast, trace, name).or_else(|| inferred_vector(name, &argument_types));
    if let Some(ty) = constructed {
        trace.set_call_target(id, SmolStr::new(ty.target_spelling()));
        return construct_value(ast, id, &ty, &arguments, trace);
    }

    trace.add_incident(IncidentKind::UndefinedFunction(name.clone()), id);
    ExpressionTrace::undefined()
}

fn user_function_call(
    ast: &Ast,
    id: NodeId,
    name: &SmolStr,
    function_node: NodeId,
    arguments: &[(NodeId, ExpressionTrace)],
    trace: &mut Trace,
) -> ExpressionTrace {
    let Node::Function(function) = ast.node(function_node) else {
        panic!("function registry entry \"{name}\" is not a function declaration");
    };
    // The callee may not be traced yet, so its types are resolved here without reporting.
    let parameters: Vec<Type> = function
        .parameters
        .iter()
        .map(|param| match ast.node(*param) {
            Node::FunctionParameter(param) => resolve_type(ast, trace, param.ty).unwrap_or(Type::Undefined),
            _ => Type::Undefined,
        })
        .collect();
    if parameters.len() != arguments.len() {
        trace.add_incident(
            IncidentKind::ArgumentCount {
                function: name.clone(),
                expected: parameters.len(),
                found: arguments.len(),
            },
            id,
        );
    } else {
        for (index, (expected, (arg_node, arg))) in parameters.iter().zip(arguments).enumerate() {
            if !is_implicit_castable_into(arg.ty(), expected) {
                trace.add_incident(
                    IncidentKind::ArgumentType {
                        function: name.clone(),
                        index: index + 1,
                        expected: expected.clone(),
                        found: arg.ty().clone(),
                    },
                    *arg_node,
                );
            }
        }
    }
    let return_type = match function.return_type {
        Some(ty) => resolve_type(ast, trace, ty).unwrap_or(Type::Undefined),
        None => Type::Void,
    };
    ExpressionTrace::value(return_type)
}

/// `vec3(1.0, 2.0, 3.0)`: a vector constructor whose component type is taken from its arguments.
fn inferred_vector(name: &str, arguments: &[Type]) -> Option<Type> {
    let size = vector_size(name)?;
    let (first, rest) = arguments.split_first()?;
    let mut component = first.scalar_component()?.clone();
    for arg in rest {
        let next = arg.scalar_component()?;
        if component == Type::Bool && *next == Type::Bool {
            continue;
        }
        component = unify_scalars(&component, next)?;
    }
    Some(Type::vector(size, component.concretize()))
}

/// A component argument of a constructor. Besides implicit casts, an abstract integer
/// may stand for a float component.
fn fits_component(arg: &Type, component: &Type) -> bool {
    is_implicit_castable_into(arg, component)
        || (*arg == Type::abstract_int() && *component == Type::Float)
}

/// Number of components `arguments` contribute to a vector or matrix of `component`s,
/// or `None` if one of them does not fit.
fn component_count(arguments: &[Type], component: &Type) -> Option<usize> {
    arguments.iter().try_fold(0, |count, arg| match arg {
        Type::Vector(n, c) if fits_component(c, component) => Some(count + *n as usize),
        scalar if scalar.is_scalar() && fits_component(scalar, component) => Some(count + 1),
        _ => None,
    })
}

fn constructible(ast: &Ast, trace: &Trace, ty: &Type, arguments: &[Type]) -> bool {
    use Type::*;
    if arguments.is_empty() {
        // Zero value.
        return !matches!(ty, Void | String | Pointer(..) | Enum(_) | Array(_, None));
    }
    match ty {
        Float | Int | UInt | Bool => matches!(arguments, [arg] if arg.is_scalar()),
        Vector(n, component) => match arguments {
            [arg] if arg.is_scalar() => fits_component(arg, component),
            [Vector(m, _)] => m == n,
            _ => component_count(arguments, component) == Some(*n as usize),
        },
        Matrix(columns, rows, component) => match arguments {
            [Matrix(c, r, _)] => c == columns && r == rows,
            _ if arguments.iter().all(|arg| matches!(arg, Vector(..))) => {
                arguments.len() == *columns as usize
                    && arguments.iter().all(|arg| {
                        matches!(arg, Vector(n, c) if n == rows && fits_component(c, component))
                    })
            }
            _ => component_count(arguments, component) == Some((*columns * *rows) as usize),
        },
        Array(element, Some(length)) => {
            arguments.len() == *length as usize
                && arguments.iter().all(|arg| is_implicit_castable_into(arg, element))
        }
        Struct(name) => {
            let Some(Node::Struct(decl)) = trace.struct_decl(name).map(|id| ast.node(id)) else {
                return false;
            };
            decl.properties.len() == arguments.len()
                && decl.properties.iter().zip(arguments).all(|(property, arg)| {
                    let expected = match ast.node(*property) {
                        Node::StructProperty(property) => {
                            resolve_type(ast, trace, property.ty).unwrap_or(Type::Undefined)
                        }
                        _ => Type::Undefined,
                    };
                    is_implicit_castable_into(arg, &expected)
                })
        }
        _ => false,
    }
}

fn construct_value(
    ast: &Ast,
    id: NodeId,
    ty: &Type,
    arguments: &[(NodeId, ExpressionTrace)],
    trace: &mut Trace,
) -> ExpressionTrace {
    if ty.is_undefined() || arguments.iter().any(|(_, arg)| arg.ty().is_undefined()) {
        return ExpressionTrace::undefined();
    }
    let argument_types: Vec<Type> = arguments.iter().map(|(_, arg)| arg.ty().clone()).collect();
    if !constructible(ast, trace, ty, &argument_types) {
        trace.add_incident(
            IncidentKind::NotConstructible {
                ty: ty.clone(),
                arguments: argument_list(arguments),
            },
            id,
        );
        return ExpressionTrace::undefined();
    }
    let result = call_result(ty.clone(), arguments);
    // Scalar conversions of constants fold.
    match (ty, arguments) {
        (Type::Float | Type::Int | Type::UInt | Type::Bool, [(_, arg)]) if result.is_constant() => {
            let folded = arg.constant_value().and_then(|value| convert_constant(ty, value));
            result.with_constant(folded)
        }
        _ => result,
    }
}

fn convert_constant(ty: &Type, value: ConstantValue) -> Option<ConstantValue> {
    use ConstantValue::*;
    let converted = match (ty, value) {
        (Type::Float, Int(v)) => Float(v as f64),
        (Type::Float, Float(v)) => Float(v),
        (Type::Int | Type::UInt, Int(v)) => Int(v),
        (Type::Int | Type::UInt, Float(v)) => Int(v.trunc() as i64),
        (Type::Int | Type::UInt | Type::Float, Bool(v)) => Int(v as i64),
        (Type::Bool, Bool(v)) => Bool(v),
        (Type::Bool, Int(v)) => Bool(v != 0),
        (Type::Bool, Float(v)) => Bool(v != 0.0),
        _ => return None,
    };
    Some(converted)
}

fn member_access(ast: &Ast, id: NodeId, member: &Member, trace: &mut Trace) -> ExpressionTrace {
    // `Color.Red` where `Color` is an enum and not shadowed by a value.
    if let Node::Identifier(name) = ast.node(member.object) {
        if trace.get_value(name).is_none() {
            if let Some(enum_node) = trace.enum_decl(name) {
                return enum_member(ast, id, member, name, enum_node, trace);
            }
        }
    }
    let object = trace_expression(ast, member.object, trace);
    let unknown_member = |trace: &mut Trace, ty: &Type| {
        trace.add_incident(
            IncidentKind::UnknownMember {
                ty: ty.clone(),
                member: member.member.clone(),
            },
            id,
        );
        ExpressionTrace::undefined()
    };
    match object.ty() {
        Type::Undefined => ExpressionTrace::undefined(),
        Type::Struct(name) => match trace.struct_property(name, &member.member) {
            Some(property) => {
                let ty = match ast.node(property) {
                    Node::StructProperty(property) => {
                        resolve_type(ast, trace, property.ty).unwrap_or(Type::Undefined)
                    }
                    _ => Type::Undefined,
                };
                object.clone().with_type(ty).with_constant(None)
            }
            None => unknown_member(trace, object.ty()),
        },
        Type::Vector(size, component) => match swizzle_len(&member.member, *size) {
            Some(1) => object.clone().with_type((**component).clone()).with_constant(None),
            Some(len) => {
                let ty = Type::vector(len, (**component).clone());
                if object.is_constant() {
                    ExpressionTrace::constant(ty, None)
                } else {
                    ExpressionTrace::value(ty)
                }
            }
            None => unknown_member(trace, object.ty()),
        },
        other => unknown_member(trace, other),
    }
}

fn enum_member(
    ast: &Ast,
    id: NodeId,
    member: &Member,
    name: &SmolStr,
    enum_node: NodeId,
    trace: &mut Trace,
) -> ExpressionTrace {
    let enum_ty = Type::Enum(name.clone());
    trace.register_expression(member.object, ExpressionTrace::constant(enum_ty.clone(), None));
    let Node::Enum(decl) = ast.node(enum_node) else {
        panic!("enum registry entry \"{name}\" is not an enum declaration");
    };
    match decl.member_index(&member.member) {
        Some(index) => ExpressionTrace::constant(enum_ty, Some(ConstantValue::Int(index as i64))),
        None => {
            trace.add_incident(
                IncidentKind::UnknownMember {
                    ty: enum_ty,
                    member: member.member.clone(),
                },
                id,
            );
            ExpressionTrace::undefined()
        }
    }
}

/// Length of a swizzle such as `xy` or `rgba` on a vector of `size` components.
fn swizzle_len(member: &str, size: u8) -> Option<u8> {
    const SETS: [&str; 2] = ["xyzw", "rgba"];
    if member.is_empty() || member.len() > 4 {
        return None;
    }
    let valid = SETS.iter().any(|set| {
        member
            .chars()
            .all(|c| set.find(c).is_some_and(|i| i < size as usize))
    });
    valid.then_some(member.len() as u8)
}

fn index_access(ast: &Ast, index: &Index, trace: &mut Trace) -> ExpressionTrace {
    let object = trace_expression(ast, index.object, trace);
    let position = trace_expression(ast, index.index, trace);
    if !position.ty().is_undefined() && !position.ty().is_integer_scalar() {
        trace.add_incident(IncidentKind::IndexNotInteger(position.ty().clone()), index.index);
    }
    let constant_index = position.constant_value().and_then(|v| v.as_int());
    let (element, bound) = match object.ty() {
        Type::Undefined => return ExpressionTrace::undefined(),
        Type::Array(element, length) => ((**element).clone(), *length),
        Type::Vector(size, component) => ((**component).clone(), Some(*size as u32)),
        Type::Matrix(columns, rows, component) => {
            (Type::vector(*rows, (**component).clone()), Some(*columns as u32))
        }
        other => {
            trace.add_incident(IncidentKind::NotIndexable(other.clone()), index.object);
            return ExpressionTrace::undefined();
        }
    };
    if let (Some(i), Some(bound)) = (constant_index, bound) {
        if i < 0 || i >= bound as i64 {
            trace.add_incident(
                IncidentKind::IndexOutOfBounds {
                    index: i,
                    ty: object.ty().clone(),
                },
                index.index,
            );
        }
    }
    object.with_type(element).with_constant(None)
}
