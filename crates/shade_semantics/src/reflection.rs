// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

// Queries for the host application: which resources a shader binds, and which
// parameters it can be specialized with. Both are only meaningful for a unit that
// traced without incidents, and are empty otherwise.

use smol_str::SmolStr;

use crate::ast::{AccessMode, AddressSpace, Ast, Node};
use crate::trace::Trace;
use crate::types::Type;

/// A module variable bound to a resource slot, with its dense indices.
#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
    pub name: SmolStr,
    pub group: u32,
    pub binding: u32,
    pub ty: Type,
    pub address_space: AddressSpace,
    pub access: Option<AccessMode>,
}

/// A shader parameter, set by the host when the pipeline is created.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    pub name: SmolStr,
    pub ty: Type,
}

/// Module variables with `@group` and `@binding`, in declaration order.
pub fn bindings(ast: &Ast, trace: &Trace) -> Vec<Binding> {
    if trace.has_incidents() {
        return Vec::new();
    }
    ast.declarations()
        .iter()
        .filter_map(|decl| {
            let Node::ModuleVariable(var) = ast.node(*decl) else {
                return None;
            };
            let (group, binding) = (var.group.as_ref()?, var.binding.as_ref()?);
            Some(Binding {
                name: var.name.clone(),
                group: trace.bindings().group_index(group)?,
                binding: trace.bindings().binding_index(group, binding)?,
                ty: trace.declared_type(*decl).cloned().unwrap_or(Type::Undefined),
                address_space: var.space(),
                access: var.access_mode(),
            })
        })
        .collect()
}

/// Shader parameters, in declaration order.
pub fn parameters(ast: &Ast, trace: &Trace) -> Vec<Parameter> {
    if trace.has_incidents() {
        return Vec::new();
    }
    ast.declarations()
        .iter()
        .filter_map(|decl| match ast.node(*decl) {
            Node::ShaderParameter(param) => Some(Parameter {
                name: param.name.clone(),
                ty: trace.declared_type(*decl).cloned().unwrap_or(Type::Undefined),
            }),
            _ => None,
        })
        .collect()
}
