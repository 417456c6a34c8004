// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

use super::expressions::binary_result_type;
use super::{settle_declared_type, trace_expression, trace_node};
use crate::ast::*;
use crate::constant::ConstantValue;
use crate::incident::IncidentKind;
use crate::scope::ScopeKind;
use crate::trace::{BlockTrace, ExpressionTrace, FixedState, Trace, ValueTrace};
use crate::types::{is_implicit_castable_into, Type};

pub(super) fn trace_block(ast: &Ast, id: NodeId, block: &Block, trace: &mut Trace) {
    let summary = trace.new_scope(ScopeKind::Block, Some(id), |trace| {
        let mut summary = BlockTrace::default();
        for stmt in &block.statements {
            trace_node(ast, *stmt, trace);
            match ast.node(*stmt) {
                Node::Return(ret) if summary.return_type.is_none() => {
                    let ty = match ret.value {
                        Some(value) => trace.expression(value).ty().clone(),
                        None => Type::Void,
                    };
                    summary.return_type = Some(ty);
                }
                Node::Break => summary.has_break = true,
                Node::Continue => summary.has_continue = true,
                _ => {}
            }
        }
        summary
    });
    trace.set_block(id, summary);
}

/// `true` if every path through the traced block at `id` ends in a return.
pub(super) fn always_returns(ast: &Ast, id: NodeId, trace: &Trace) -> bool {
    if trace.block(id).return_type.is_some() {
        return true;
    }
    let Node::Block(block) = ast.node(id) else {
        return false;
    };
    block
        .statements
        .iter()
        .any(|stmt| statement_returns(ast, *stmt, trace))
}

fn statement_returns(ast: &Ast, id: NodeId, trace: &Trace) -> bool {
    match ast.node(id) {
        Node::Block(_) => always_returns(ast, id, trace),
        Node::If(stmt) => match stmt.else_branch {
            Some(alternative) => {
                always_returns(ast, stmt.then_block, trace) && statement_returns(ast, alternative, trace)
            }
            None => false,
        },
        Node::Switch(stmt) => {
            let mut has_default = false;
            let all_return = stmt.cases.iter().all(|case_id| match ast.node(*case_id) {
                Node::SwitchCase(case) => {
                    has_default |= case.is_default;
                    always_returns(ast, case.body, trace)
                }
                _ => false,
            });
            has_default && all_return
        }
        _ => false,
    }
}

pub(super) fn trace_variable_declaration(
    ast: &Ast,
    id: NodeId,
    decl: &VariableDeclaration,
    trace: &mut Trace,
) {
    let declared = decl.ty.map(|ty| super::trace_type_reference(ast, ty, trace));
    let initializer = decl
        .initializer
        .map(|init| (init, trace_expression(ast, init, trace)));
    let is_const = decl.mutability == Mutability::Const;
    let ty = if is_const && initializer.is_none() {
        trace.add_incident(IncidentKind::ConstantWithoutInitializer(decl.name.clone()), id);
        declared.unwrap_or(Type::Undefined)
    } else {
        settle_declared_type(
            trace,
            id,
            &decl.name,
            declared,
            initializer.as_ref().map(|(node, init)| (*node, init)),
            is_const,
        )
    };
    trace.set_declared_type(id, ty.clone());
    let value = match decl.mutability {
        Mutability::Let => {
            ValueTrace::storage(ty, FixedState::Variable, Some(AddressSpace::Function))
        }
        Mutability::Const => ValueTrace::storage(ty, FixedState::Constant, None)
            .with_constant(initializer.and_then(|(_, init)| init.constant_value())),
    };
    trace.add_value(&decl.name, value, id);
}

fn check_condition(ast: &Ast, condition: NodeId, trace: &mut Trace) {
    let traced = trace_expression(ast, condition, trace);
    if !is_implicit_castable_into(traced.ty(), &Type::Bool) {
        trace.add_incident(IncidentKind::ConditionNotBool(traced.ty().clone()), condition);
    }
}

pub(super) fn trace_if(ast: &Ast, stmt: &If, trace: &mut Trace) {
    check_condition(ast, stmt.condition, trace);
    trace_node(ast, stmt.then_block, trace);
    if let Some(alternative) = stmt.else_branch {
        trace_node(ast, alternative, trace);
    }
}

pub(super) fn trace_while(ast: &Ast, id: NodeId, stmt: &While, trace: &mut Trace) {
    check_condition(ast, stmt.condition, trace);
    trace.new_scope(ScopeKind::Loop, Some(id), |trace| {
        trace_node(ast, stmt.body, trace)
    });
}

pub(super) fn trace_do_while(ast: &Ast, id: NodeId, stmt: &DoWhile, trace: &mut Trace) {
    trace.new_scope(ScopeKind::Loop, Some(id), |trace| {
        trace_node(ast, stmt.body, trace)
    });
    check_condition(ast, stmt.condition, trace);
}

pub(super) fn trace_for(ast: &Ast, id: NodeId, stmt: &For, trace: &mut Trace) {
    // The initializer is emitted before the loop, in the enclosing block.
    if let Some(init) = stmt.init {
        if let Node::VariableDeclaration(decl) = ast.node(init) {
            trace.hoist_value(&decl.name, init);
        }
    }
    trace.new_scope(ScopeKind::Loop, Some(id), |trace| {
        if let Some(init) = stmt.init {
            let mutable = matches!(
                ast.node(init),
                Node::VariableDeclaration(decl) if decl.mutability == Mutability::Let
            );
            if !mutable {
                trace.add_incident(IncidentKind::ForInitNotMutable, init);
            }
            trace_node(ast, init, trace);
        }
        if let Some(condition) = stmt.condition {
            check_condition(ast, condition, trace);
        }
        if let Some(update) = stmt.update {
            let valid = matches!(
                ast.node(update),
                Node::Assignment(_) | Node::IncrementDecrement(_) | Node::FunctionCallStatement(_)
            );
            if !valid {
                trace.add_incident(IncidentKind::InvalidForUpdate, update);
            }
            trace_node(ast, update, trace);
        }
        trace_node(ast, stmt.body, trace);
    });
}

pub(super) fn trace_switch(ast: &Ast, id: NodeId, stmt: &Switch, trace: &mut Trace) {
    let subject = trace_expression(ast, stmt.subject, trace);
    let subject_ty = subject.ty().clone();
    let valid_subject =
        is_implicit_castable_into(&subject_ty, &Type::UInt) || matches!(subject_ty, Type::Enum(_));
    if !valid_subject && !subject_ty.is_undefined() {
        trace.add_incident(IncidentKind::InvalidSwitchSubject(subject_ty.clone()), stmt.subject);
    }
    trace.new_scope(ScopeKind::Switch, Some(id), |trace| {
        let mut seen: Vec<ConstantValue> = Vec::new();
        let mut has_default = false;
        for case_id in &stmt.cases {
            let Node::SwitchCase(case) = ast.node(*case_id) else {
                panic!("switch {id} has a case that is not a case node");
            };
            if case.is_default {
                if has_default {
                    trace.add_incident(IncidentKind::MultipleDefaults, *case_id);
                }
                has_default = true;
            }
            for selector in &case.selectors {
                let value = trace_expression(ast, *selector, trace);
                let constant = match value.constant_value() {
                    Some(constant) if value.is_constant() => constant,
                    _ => {
                        if !value.ty().is_undefined() {
                            trace.add_incident(IncidentKind::CaseNotConstant, *selector);
                        }
                        continue;
                    }
                };
                if valid_subject && !is_implicit_castable_into(value.ty(), &subject_ty) {
                    trace.add_incident(
                        IncidentKind::CaseTypeMismatch {
                            expected: subject_ty.clone(),
                            found: value.ty().clone(),
                        },
                        *selector,
                    );
                }
                if seen.contains(&constant) {
                    trace.add_incident(IncidentKind::DuplicateCase, *selector);
                } else {
                    seen.push(constant);
                }
            }
            trace_node(ast, case.body, trace);
        }
    });
}

pub(super) fn trace_break(id: NodeId, trace: &mut Trace) {
    if !trace.has_scope(ScopeKind::Loop) && !trace.has_scope(ScopeKind::Switch) {
        trace.add_incident(IncidentKind::BreakOutsideLoop, id);
    }
}

pub(super) fn trace_continue(id: NodeId, trace: &mut Trace) {
    match trace.scope_owner(ScopeKind::Loop) {
        Some(loop_node) => trace.mark_continued(loop_node),
        None => trace.add_incident(IncidentKind::ContinueOutsideLoop, id),
    }
}

pub(super) fn trace_discard(ast: &Ast, id: NodeId, trace: &mut Trace) {
    let stage = match trace.scope_owner(ScopeKind::Function).map(|f| ast.node(f)) {
        Some(Node::Function(function)) => Ok(function.stage()),
        _ => Err(()),
    };
    // Helpers called from a fragment entry point may discard too.
    if !matches!(stage, Ok(None | Some(ShaderStage::Fragment))) {
        trace.add_incident(IncidentKind::DiscardOutsideFragment, id);
    }
}

pub(super) fn trace_return(ast: &Ast, id: NodeId, stmt: &Return, trace: &mut Trace) {
    let value = stmt
        .value
        .map(|value| (value, trace_expression(ast, value, trace)));
    let Some(function) = trace.scope_owner(ScopeKind::Function) else {
        trace.add_incident(IncidentKind::ReturnOutsideFunction, id);
        return;
    };
    let expected = trace.declared_type(function).cloned().unwrap_or(Type::Void);
    let mismatch = match &value {
        None => (!matches!(expected, Type::Void | Type::Undefined)).then_some(Type::Void),
        Some((_, value)) if value.ty().is_undefined() => None,
        Some((_, value)) if expected == Type::Void => Some(value.ty().clone()),
        Some((_, value)) if !is_implicit_castable_into(value.ty(), &expected) => {
            Some(value.ty().clone())
        }
        Some(_) => None,
    };
    if let Some(found) = mismatch {
        let node = value.map_or(id, |(value, _)| value);
        trace.add_incident(IncidentKind::ReturnTypeMismatch { expected, found }, node);
    }
}

/// Report `target` if it cannot be written through.
pub(super) fn check_writable(target: &ExpressionTrace, node: NodeId, trace: &mut Trace) {
    if target.ty().is_undefined() {
        return;
    }
    if !target.is_storage() {
        trace.add_incident(IncidentKind::NotStorage, node);
    }
    if target.fixed_state() == FixedState::Constant {
        trace.add_incident(IncidentKind::NotVariable, node);
    }
}

pub(super) fn trace_assignment(ast: &Ast, id: NodeId, stmt: &Assignment, trace: &mut Trace) {
    // `_ = f();` evaluates and discards.
    let phony = matches!(ast.node(stmt.target), Node::Identifier(name) if name == "_");
    let target = if phony {
        trace.register_expression(stmt.target, ExpressionTrace::undefined());
        ExpressionTrace::undefined()
    } else {
        trace_expression(ast, stmt.target, trace)
    };
    let value = trace_expression(ast, stmt.value, trace);
    check_writable(&target, stmt.target, trace);
    if target.ty().is_undefined() || value.ty().is_undefined() {
        return;
    }
    match stmt.operator {
        AssignOp::Assign => {
            if !is_implicit_castable_into(value.ty(), target.ty()) {
                trace.add_incident(
                    IncidentKind::TypeMismatch {
                        expected: target.ty().clone(),
                        found: value.ty().clone(),
                    },
                    stmt.value,
                );
            }
        }
        AssignOp::Compound(op) => {
            let fits = binary_result_type(op, target.ty(), value.ty())
                .is_some_and(|result| is_implicit_castable_into(&result, target.ty()));
            if !fits {
                trace.add_incident(
                    IncidentKind::InvalidOperands {
                        op: stmt.operator.as_str(),
                        left: target.ty().clone(),
                        right: value.ty().clone(),
                    },
                    id,
                );
            }
        }
    }
}
