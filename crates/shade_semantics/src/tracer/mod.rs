// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

// Semantic analysis of an `Ast`, recording its results in a `Trace`.
//
// Every node kind has one tracing routine. The dispatcher `trace_node` is an exhaustive
// match so that adding a node kind without a tracing routine does not compile.
//
// The module is traced in two passes. The first registers every top-level declaration,
// so that functions and types may be used before the point where they are declared.
// The second traces module values, then types and functions, inside the global scope.

mod declarations;
mod expressions;
mod statements;

use smol_str::SmolStr;

use crate::ast::{Ast, Node, NodeId};
use crate::incident::IncidentKind;
use crate::trace::{ExpressionTrace, Trace};
use crate::type_resolution::trace_type_reference;
use crate::types::{is_implicit_castable_into, Type};

pub use expressions::trace_expression;

impl Ast {
    /// Trace the whole AST, starting at its root module.
    pub fn trace(&self, trace: &mut Trace) {
        if let Some(root) = self.root() {
            trace_node(self, root, trace);
        }
    }
}

/// Trace the subtree at `node`.
pub fn trace_node(ast: &Ast, node: NodeId, trace: &mut Trace) {
    tracing::trace!(%node, kind = ast.node(node).kind_name(), "trace");
    match ast.node(node) {
        Node::Module(module) => declarations::trace_module(ast, node, module, trace),
        Node::Alias(alias) => declarations::trace_alias(ast, node, alias, trace),
        // Members are checked when the enum is registered.
        Node::Enum(_) => {}
        Node::Struct(decl) => declarations::trace_struct(ast, decl, trace),
        Node::StructProperty(property) => {
            let ty = trace_type_reference(ast, property.ty, trace);
            trace.set_declared_type(node, ty);
        }
        Node::Function(function) => declarations::trace_function(ast, node, function, trace),
        Node::FunctionParameter(param) => {
            let ty = trace_type_reference(ast, param.ty, trace);
            trace.set_declared_type(node, ty);
        }
        Node::ModuleVariable(var) => declarations::trace_module_variable(ast, node, var, trace),
        Node::ModuleConstant(constant) => {
            declarations::trace_module_constant(ast, node, constant, trace)
        }
        Node::ShaderParameter(param) => {
            declarations::trace_shader_parameter(ast, node, param, trace)
        }
        Node::TypeReference(_) => {
            trace_type_reference(ast, node, trace);
        }

        Node::Block(block) => statements::trace_block(ast, node, block, trace),
        Node::VariableDeclaration(decl) => {
            statements::trace_variable_declaration(ast, node, decl, trace)
        }
        Node::If(stmt) => statements::trace_if(ast, stmt, trace),
        Node::While(stmt) => statements::trace_while(ast, node, stmt, trace),
        Node::DoWhile(stmt) => statements::trace_do_while(ast, node, stmt, trace),
        Node::For(stmt) => statements::trace_for(ast, node, stmt, trace),
        Node::Switch(stmt) => statements::trace_switch(ast, node, stmt, trace),
        Node::SwitchCase(_) => panic!("switch case {node} traced outside of its switch"),
        Node::Break => statements::trace_break(node, trace),
        Node::Continue => statements::trace_continue(node, trace),
        Node::Discard => statements::trace_discard(ast, node, trace),
        Node::Return(stmt) => statements::trace_return(ast, node, stmt, trace),
        Node::Assignment(stmt) => statements::trace_assignment(ast, node, stmt, trace),
        Node::IncrementDecrement(stmt) => {
            let target = trace_expression(ast, stmt.target, trace);
            statements::check_writable(&target, stmt.target, trace);
        }
        Node::FunctionCallStatement(stmt) => {
            trace_expression(ast, stmt.call, trace);
        }

        Node::IntLiteral(_)
        | Node::FloatLiteral(_)
        | Node::BoolLiteral(_)
        | Node::Identifier(_)
        | Node::Binary(_)
        | Node::Unary(_)
        | Node::Parenthesized(_)
        | Node::Call(_)
        | Node::Construct(_)
        | Node::Member(_)
        | Node::Index(_) => {
            trace_expression(ast, node, trace);
        }
    }
}

/// Settle the type of a declaration from its written type and its initializer.
///
/// With both, the initializer must cast into the written type. With only an initializer,
/// the initializer's type is taken, concretized unless `keep_abstract`. With neither,
/// the type cannot be inferred.
fn settle_declared_type(
    trace: &mut Trace,
    node: NodeId,
    name: &SmolStr,
    declared: Option<Type>,
    initializer: Option<(NodeId, &ExpressionTrace)>,
    keep_abstract: bool,
) -> Type {
    match (declared, initializer) {
        (Some(ty), Some((init_node, init))) => {
            if !is_implicit_castable_into(init.ty(), &ty) {
                trace.add_incident(
                    IncidentKind::TypeMismatch {
                        expected: ty.clone(),
                        found: init.ty().clone(),
                    },
                    init_node,
                );
            }
            ty
        }
        (Some(ty), None) => ty,
        (None, Some((_, init))) if keep_abstract => init.ty().clone(),
        (None, Some((_, init))) => init.ty().concretize(),
        (None, None) => {
            trace.add_incident(IncidentKind::CannotInferType(name.clone()), node);
            Type::Undefined
        }
    }
}
