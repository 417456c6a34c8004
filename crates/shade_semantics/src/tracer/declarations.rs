// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

use hashbrown::HashSet;
use smol_str::SmolStr;

use super::{settle_declared_type, statements, trace_expression, trace_node};
use crate::ast::*;
use crate::incident::{IncidentKind, SymbolKind};
use crate::scope::ScopeKind;
use crate::trace::{FixedState, Trace, ValueTrace};
use crate::type_resolution::{alias_is_circular, trace_type_reference};
use crate::types::{is_implicit_castable_into, Type};

const FUNCTION_ATTRIBUTES: &[&str] = &["vertex", "fragment", "compute", "workgroup_size", "must_use"];
const IO_ATTRIBUTES: &[&str] = &["location", "builtin", "interpolate", "invariant", "size", "align"];

fn is_module_value(node: &Node) -> bool {
    matches!(
        node,
        Node::ModuleVariable(_) | Node::ModuleConstant(_) | Node::ShaderParameter(_)
    )
}

pub(super) fn trace_module(ast: &Ast, id: NodeId, module: &Module, trace: &mut Trace) {
    trace.new_scope(ScopeKind::Global, Some(id), |trace| {
        for decl in &module.declarations {
            register_declaration(ast, *decl, trace);
        }
        // Module values first, so that function bodies see all of them.
        let (values, others): (Vec<NodeId>, Vec<NodeId>) = module
            .declarations
            .iter()
            .copied()
            .partition(|decl| is_module_value(ast.node(*decl)));
        for decl in values.into_iter().chain(others) {
            trace_node(ast, decl, trace);
        }
    });
}

fn register_declaration(ast: &Ast, id: NodeId, trace: &mut Trace) {
    match ast.node(id) {
        Node::Alias(alias) => {
            trace.register_alias(&alias.name, id);
        }
        Node::Enum(decl) => {
            if trace.register_enum(&decl.name, id) {
                let mut seen = HashSet::new();
                for member in &decl.members {
                    if !seen.insert(member) {
                        trace.add_incident(
                            IncidentKind::AlreadyDefined {
                                kind: SymbolKind::Member,
                                name: member.clone(),
                            },
                            id,
                        );
                    }
                }
            }
        }
        Node::Struct(decl) => {
            if trace.register_struct(&decl.name, id) {
                for property in &decl.properties {
                    if let Some(name) = ast.name_of(*property) {
                        trace.register_struct_property(&decl.name, name, *property);
                    }
                }
            }
        }
        Node::Function(function) => {
            trace.register_function(&function.name, id);
        }
        Node::ModuleVariable(var) => {
            if trace.register_module_variable(&var.name, id) {
                if let (Some(group), Some(binding)) = (&var.group, &var.binding) {
                    let (group_index, binding_index) = trace.bindings_mut().resolve(group, binding);
                    tracing::debug!(
                        name = %var.name,
                        group = group_index,
                        binding = binding_index,
                        "resolved binding"
                    );
                }
            }
        }
        Node::ModuleConstant(constant) => {
            trace.register_module_variable(&constant.name, id);
        }
        Node::ShaderParameter(param) => {
            trace.register_module_variable(&param.name, id);
        }
        _ => {}
    }
}

pub(super) fn trace_alias(ast: &Ast, id: NodeId, alias: &Alias, trace: &mut Trace) {
    trace_type_reference(ast, alias.target, trace);
    if alias_is_circular(ast, trace, id) {
        trace.add_incident(IncidentKind::CircularAlias(alias.name.clone()), id);
    }
}

pub(super) fn trace_struct(ast: &Ast, decl: &StructDecl, trace: &mut Trace) {
    for property_id in &decl.properties {
        let Node::StructProperty(property) = ast.node(*property_id) else {
            trace_node(ast, *property_id, trace);
            continue;
        };
        let ty = trace_type_reference(ast, property.ty, trace);
        trace.set_declared_type(*property_id, ty);
        trace_io_attributes(&property.attributes, &decl.name, *property_id, trace);
    }
}

/// Check attributes of struct properties and function parameters, and resolve their locations
/// in the namespace of `owner`.
fn trace_io_attributes(attributes: &[Attribute], owner: &SmolStr, node: NodeId, trace: &mut Trace) {
    for attribute in attributes {
        if !IO_ATTRIBUTES.contains(&attribute.name.as_str()) {
            trace.add_incident(IncidentKind::UnknownAttribute(attribute.name.clone()), node);
            continue;
        }
        if attribute.name == "location" {
            if let Some(location) = attribute.first_argument() {
                trace.locations_mut().resolve(owner, location);
            }
        }
    }
}

pub(super) fn trace_function(ast: &Ast, id: NodeId, function: &Function, trace: &mut Trace) {
    for attribute in &function.attributes {
        if !FUNCTION_ATTRIBUTES.contains(&attribute.name.as_str()) {
            trace.add_incident(IncidentKind::UnknownAttribute(attribute.name.clone()), id);
        }
    }
    let return_type = match function.return_type {
        Some(ty) => trace_type_reference(ast, ty, trace),
        None => Type::Void,
    };
    trace.set_declared_type(id, return_type.clone());

    let mut parameters = Vec::with_capacity(function.parameters.len());
    for param_id in &function.parameters {
        let Node::FunctionParameter(param) = ast.node(*param_id) else {
            panic!("function \"{}\" has a parameter that is not a parameter node", function.name);
        };
        let ty = trace_type_reference(ast, param.ty, trace);
        trace.set_declared_type(*param_id, ty.clone());
        trace_io_attributes(&param.attributes, &function.name, *param_id, trace);
        parameters.push((*param_id, &param.name, ty));
    }

    trace.new_scope(ScopeKind::Function, Some(id), |trace| {
        for (param_id, name, ty) in parameters {
            if trace.current_scope().contains_name(name) {
                trace.add_incident(
                    IncidentKind::AlreadyDefined {
                        kind: SymbolKind::Parameter,
                        name: name.clone(),
                    },
                    param_id,
                );
                continue;
            }
            trace.add_value(name, ValueTrace::storage(ty, FixedState::Constant, None), param_id);
        }
        trace_node(ast, function.body, trace);
    });

    if !matches!(return_type, Type::Void | Type::Undefined)
        && !statements::always_returns(ast, function.body, trace)
    {
        trace.add_incident(
            IncidentKind::MissingReturn {
                function: function.name.clone(),
                ty: return_type,
            },
            id,
        );
    }
}

pub(super) fn trace_module_variable(ast: &Ast, id: NodeId, var: &ModuleVariable, trace: &mut Trace) {
    let declared = var.ty.map(|ty| trace_type_reference(ast, ty, trace));
    let initializer = var
        .initializer
        .map(|init| (init, trace_expression(ast, init, trace)));
    let space = var.space();
    if space == AddressSpace::Function {
        trace.add_incident(IncidentKind::FunctionSpaceAtModuleScope(var.name.clone()), id);
    }
    if space.needs_binding() && (var.group.is_none() || var.binding.is_none()) {
        trace.add_incident(IncidentKind::MissingBinding(var.name.clone()), id);
    }
    if initializer.is_some() && !matches!(space, AddressSpace::Private | AddressSpace::Function) {
        trace.add_incident(
            IncidentKind::UnexpectedInitializer {
                name: var.name.clone(),
                space: space.as_str(),
            },
            id,
        );
    }
    let ty = settle_declared_type(
        trace,
        id,
        &var.name,
        declared,
        initializer.as_ref().map(|(node, init)| (*node, init)),
        false,
    );
    let fixed_state = match (space, var.access_mode()) {
        (AddressSpace::Uniform, _) | (AddressSpace::Storage, Some(AccessMode::Read)) => {
            FixedState::Constant
        }
        _ => FixedState::Variable,
    };
    trace.set_declared_type(id, ty.clone());
    trace.add_module_value(&var.name, ValueTrace::storage(ty, fixed_state, Some(space)));
}

pub(super) fn trace_module_constant(ast: &Ast, id: NodeId, constant: &ModuleConstant, trace: &mut Trace) {
    let declared = constant.ty.map(|ty| trace_type_reference(ast, ty, trace));
    let value = constant
        .value
        .map(|value| (value, trace_expression(ast, value, trace)));
    let ty = match &value {
        None => {
            trace.add_incident(IncidentKind::ConstantWithoutInitializer(constant.name.clone()), id);
            declared.unwrap_or(Type::Undefined)
        }
        Some((value_id, value)) => {
            if !value.is_constant() {
                trace.add_incident(IncidentKind::NotConstantExpression(constant.name.clone()), *value_id);
            }
            settle_declared_type(trace, id, &constant.name, declared, Some((*value_id, value)), true)
        }
    };
    let folded = value.and_then(|(_, value)| value.constant_value());
    trace.set_declared_type(id, ty.clone());
    trace.add_module_value(
        &constant.name,
        ValueTrace::storage(ty, FixedState::Constant, None).with_constant(folded),
    );
}

pub(super) fn trace_shader_parameter(ast: &Ast, id: NodeId, param: &ShaderParameter, trace: &mut Trace) {
    let ty = trace_type_reference(ast, param.ty, trace);
    if !ty.is_undefined() && !ty.is_scalar() {
        trace.add_incident(
            IncidentKind::InvalidParameterType {
                name: param.name.clone(),
                ty: ty.clone(),
            },
            id,
        );
    }
    if let Some(default) = param.default {
        let value = trace_expression(ast, default, trace);
        if !is_implicit_castable_into(value.ty(), &ty) {
            trace.add_incident(
                IncidentKind::TypeMismatch {
                    expected: ty.clone(),
                    found: value.ty().clone(),
                },
                default,
            );
        }
    }
    trace.set_declared_type(id, ty.clone());
    trace.add_module_value(&param.name, ValueTrace::storage(ty, FixedState::Constant, None));
}
