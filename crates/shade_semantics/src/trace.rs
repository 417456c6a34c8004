// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

// The `Trace` is the state threaded through semantic analysis. It holds
// * the stack of lexical scopes,
// * the global registries of aliases, enums, structs, functions and module variables,
// * a write-once cache of expression traces, keyed by node,
// * resolved types, block summaries and call targets, read back by the transpiler,
// * the list of incidents.
//
// Side tables are keyed by `NodeId`. Reading an entry that was never written is a bug in
// the caller and panics. Writing an entry twice keeps the first value.

use std::panic::{self, AssertUnwindSafe};

use hashbrown::{HashMap, HashSet};
use smol_str::SmolStr;

use crate::ast::{AddressSpace, Ast, NodeId, Position};
use crate::constant::ConstantValue;
use crate::incident::{Diagnostic, IncidentKind, IncidentList, SymbolKind};
use crate::resolver::{BindingResolver, LocationResolver};
use crate::scope::{Scope, ScopeKind, ScopeStack};
use crate::types::{IsStorage, Type};

/// Whether a value can be reassigned after its declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FixedState {
    Constant,
    Variable,
}

/// Semantic facts about one expression.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpressionTrace {
    ty: Type,
    is_storage: IsStorage,
    fixed_state: FixedState,
    address_space: Option<AddressSpace>,
    constant: Option<ConstantValue>,
}

/// Facts about a named value. A reference to the name is traced with a copy of these.
pub type ValueTrace = ExpressionTrace;

impl ExpressionTrace {
    /// A computed value: not a storage location, not constant.
    pub fn value(ty: Type) -> ExpressionTrace {
        ExpressionTrace {
            ty,
            is_storage: IsStorage::False,
            fixed_state: FixedState::Variable,
            address_space: None,
            constant: None,
        }
    }

    /// A value known at compile time.
    pub fn constant(ty: Type, constant: Option<ConstantValue>) -> ExpressionTrace {
        ExpressionTrace {
            fixed_state: FixedState::Constant,
            constant,
            ..ExpressionTrace::value(ty)
        }
    }

    /// A storage location, as declared by a variable, constant or parameter.
    pub fn storage(ty: Type, fixed_state: FixedState, address_space: Option<AddressSpace>) -> ExpressionTrace {
        ExpressionTrace {
            ty,
            is_storage: IsStorage::True,
            fixed_state,
            address_space,
            constant: None,
        }
    }

    /// Type of something that failed to resolve. Treated as a writable location so
    /// that follow-up checks stay quiet.
    pub fn undefined() -> ExpressionTrace {
        ExpressionTrace::storage(Type::Undefined, FixedState::Variable, None)
    }

    pub fn with_constant(mut self, constant: Option<ConstantValue>) -> ExpressionTrace {
        self.constant = constant;
        self
    }

    pub fn with_type(mut self, ty: Type) -> ExpressionTrace {
        self.ty = ty;
        self
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn is_storage(&self) -> bool {
        matches!(self.is_storage, IsStorage::True)
    }

    pub fn fixed_state(&self) -> FixedState {
        self.fixed_state
    }

    pub fn is_constant(&self) -> bool {
        self.fixed_state == FixedState::Constant
    }

    pub fn address_space(&self) -> Option<AddressSpace> {
        self.address_space
    }

    /// The compile-time value, if it could be computed.
    pub fn constant_value(&self) -> Option<ConstantValue> {
        self.constant
    }
}

/// Summary of one traced block.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BlockTrace {
    /// Type of the first return statement directly in the block. `Void` for a bare `return;`.
    pub return_type: Option<Type>,
    pub has_break: bool,
    pub has_continue: bool,
}

/// A resolved `TypeReference`.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedType {
    ty: Type,
    spelling: String,
}

impl ResolvedType {
    pub fn new(ty: Type) -> ResolvedType {
        let spelling = ty.target_spelling();
        ResolvedType { ty, spelling }
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// The type written in the target dialect.
    pub fn spelling(&self) -> &str {
        &self.spelling
    }
}

#[derive(Clone, Debug, Default)]
pub struct Trace {
    scopes: ScopeStack,

    aliases: HashMap<SmolStr, NodeId>,
    enums: HashMap<SmolStr, NodeId>,
    structs: HashMap<SmolStr, NodeId>,
    struct_properties: HashMap<(SmolStr, SmolStr), NodeId>,
    functions: HashMap<SmolStr, NodeId>,
    module_variables: HashMap<SmolStr, NodeId>,
    /// Module variables, constants and shader parameters that have been traced.
    module_values: HashMap<SmolStr, ValueTrace>,

    expressions: HashMap<NodeId, ExpressionTrace>,
    types: HashMap<NodeId, ResolvedType>,
    /// Types of declarations: variables, parameters, and the return type of functions.
    declared_types: HashMap<NodeId, Type>,
    blocks: HashMap<NodeId, BlockTrace>,
    call_targets: HashMap<NodeId, SmolStr>,
    continued_loops: HashSet<NodeId>,

    incidents: IncidentList,
    bindings: BindingResolver,
    locations: LocationResolver,
}

impl Trace {
    pub fn new() -> Trace {
        Trace::default()
    }

    //
    // Scopes
    //

    /// Run `action` inside a new scope. The scope is closed when `action` returns and
    /// also when it panics.
    pub fn new_scope<R>(
        &mut self,
        kind: ScopeKind,
        owner: Option<NodeId>,
        action: impl FnOnce(&mut Trace) -> R,
    ) -> R {
        self.scopes.push(kind, owner);
        tracing::trace!(?kind, depth = self.scopes.depth(), "enter scope");
        let result = panic::catch_unwind(AssertUnwindSafe(|| action(self)));
        self.scopes.pop();
        match result {
            Ok(value) => value,
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    /// The innermost open scope. Panics if no scope is open.
    pub fn current_scope(&self) -> &Scope {
        match self.scopes.current() {
            Some(scope) => scope,
            None => panic!("no scope is open"),
        }
    }

    pub fn scope_depth(&self) -> usize {
        self.scopes.depth()
    }

    pub fn has_scope(&self, kind: ScopeKind) -> bool {
        self.scopes.innermost(kind).is_some()
    }

    /// Owner of the innermost open scope of `kind`.
    pub fn scope_owner(&self, kind: ScopeKind) -> Option<NodeId> {
        self.scopes.innermost(kind).and_then(Scope::owner)
    }

    /// Bind `name` in the current scope. A second binding of the same name in the
    /// same scope is an incident and leaves the first binding in place.
    pub fn add_value(&mut self, name: &SmolStr, value: ValueTrace, node: NodeId) -> bool {
        let inserted = self.scopes.insert(name.clone(), value);
        if !inserted {
            self.add_incident(
                IncidentKind::AlreadyDefined {
                    kind: SymbolKind::Variable,
                    name: name.clone(),
                },
                node,
            );
        }
        inserted
    }

    /// Take `name` in the current scope for a declaration that is emitted there but
    /// traced in an inner scope, such as a `for` initializer.
    pub fn hoist_value(&mut self, name: &SmolStr, node: NodeId) -> bool {
        let hoisted = self.scopes.hoist(name.clone());
        if !hoisted {
            self.add_incident(
                IncidentKind::AlreadyDefined {
                    kind: SymbolKind::Variable,
                    name: name.clone(),
                },
                node,
            );
        }
        hoisted
    }

    /// Look `name` up through the open scopes, then among traced module values.
    pub fn get_value(&self, name: &str) -> Option<&ValueTrace> {
        self.scopes
            .lookup(name)
            .or_else(|| self.module_values.get(name))
    }

    //
    // Registries
    //

    fn register(
        registry: &mut HashMap<SmolStr, NodeId>,
        incidents: &mut IncidentList,
        kind: SymbolKind,
        name: &SmolStr,
        node: NodeId,
    ) -> bool {
        if registry.contains_key(name) {
            incidents.insert(
                IncidentKind::AlreadyDefined {
                    kind,
                    name: name.clone(),
                },
                node,
            );
            return false;
        }
        registry.insert(name.clone(), node);
        true
    }

    pub fn register_alias(&mut self, name: &SmolStr, node: NodeId) -> bool {
        Trace::register(&mut self.aliases, &mut self.incidents, SymbolKind::Alias, name, node)
    }

    pub fn register_enum(&mut self, name: &SmolStr, node: NodeId) -> bool {
        Trace::register(&mut self.enums, &mut self.incidents, SymbolKind::Enum, name, node)
    }

    pub fn register_struct(&mut self, name: &SmolStr, node: NodeId) -> bool {
        Trace::register(&mut self.structs, &mut self.incidents, SymbolKind::Struct, name, node)
    }

    pub fn register_function(&mut self, name: &SmolStr, node: NodeId) -> bool {
        Trace::register(&mut self.functions, &mut self.incidents, SymbolKind::Function, name, node)
    }

    pub fn register_module_variable(&mut self, name: &SmolStr, node: NodeId) -> bool {
        Trace::register(
            &mut self.module_variables,
            &mut self.incidents,
            SymbolKind::Variable,
            name,
            node,
        )
    }

    pub fn register_struct_property(&mut self, owner: &SmolStr, name: &SmolStr, node: NodeId) -> bool {
        let key = (owner.clone(), name.clone());
        if self.struct_properties.contains_key(&key) {
            self.add_incident(
                IncidentKind::AlreadyDefined {
                    kind: SymbolKind::Property,
                    name: name.clone(),
                },
                node,
            );
            return false;
        }
        self.struct_properties.insert(key, node);
        true
    }

    pub fn alias(&self, name: &str) -> Option<NodeId> {
        self.aliases.get(name).copied()
    }

    pub fn enum_decl(&self, name: &str) -> Option<NodeId> {
        self.enums.get(name).copied()
    }

    pub fn struct_decl(&self, name: &str) -> Option<NodeId> {
        self.structs.get(name).copied()
    }

    pub fn struct_property(&self, owner: &str, name: &str) -> Option<NodeId> {
        self.struct_properties
            .get(&(SmolStr::new(owner), SmolStr::new(name)))
            .copied()
    }

    pub fn function(&self, name: &str) -> Option<NodeId> {
        self.functions.get(name).copied()
    }

    pub fn module_variable(&self, name: &str) -> Option<NodeId> {
        self.module_variables.get(name).copied()
    }

    pub(crate) fn add_module_value(&mut self, name: &SmolStr, value: ValueTrace) {
        self.module_values.entry(name.clone()).or_insert(value);
    }

    //
    // Write-once side tables
    //

    pub fn register_expression(&mut self, node: NodeId, trace: ExpressionTrace) {
        if self.expressions.contains_key(&node) {
            tracing::warn!(%node, "expression traced twice, keeping the first trace");
            return;
        }
        self.expressions.insert(node, trace);
    }

    /// The trace of an expression. Panics if `node` was not traced.
    pub fn expression(&self, node: NodeId) -> &ExpressionTrace {
        match self.expressions.get(&node) {
            Some(trace) => trace,
            None => panic!("expression {node} read before it was traced"),
        }
    }

    pub fn try_expression(&self, node: NodeId) -> Option<&ExpressionTrace> {
        self.expressions.get(&node)
    }

    pub(crate) fn set_resolved_type(&mut self, node: NodeId, ty: Type) {
        self.types.entry(node).or_insert_with(|| ResolvedType::new(ty));
    }

    /// The resolved type of a `TypeReference`. Panics if `node` was not traced.
    pub fn resolved_type(&self, node: NodeId) -> &ResolvedType {
        match self.types.get(&node) {
            Some(resolved) => resolved,
            None => panic!("type {node} read before it was traced"),
        }
    }

    pub(crate) fn set_declared_type(&mut self, node: NodeId, ty: Type) {
        self.declared_types.entry(node).or_insert(ty);
    }

    /// Type of a declaration after tracing: the written type, or the type inferred from
    /// its initializer. For a function, its return type.
    pub fn declared_type(&self, node: NodeId) -> Option<&Type> {
        self.declared_types.get(&node)
    }

    pub(crate) fn set_block(&mut self, node: NodeId, block: BlockTrace) {
        self.blocks.entry(node).or_insert(block);
    }

    /// The summary of a traced block. Panics if `node` was not traced.
    pub fn block(&self, node: NodeId) -> &BlockTrace {
        match self.blocks.get(&node) {
            Some(block) => block,
            None => panic!("block {node} read before it was traced"),
        }
    }

    pub(crate) fn set_call_target(&mut self, node: NodeId, callee: SmolStr) {
        self.call_targets.entry(node).or_insert(callee);
    }

    /// The callee of a `Call` as spelled in the target dialect.
    pub fn call_target(&self, node: NodeId) -> Option<&SmolStr> {
        self.call_targets.get(&node)
    }

    pub(crate) fn mark_continued(&mut self, loop_node: NodeId) {
        self.continued_loops.insert(loop_node);
    }

    /// `true` if a `continue` targets the loop `node`.
    pub fn is_continued(&self, node: NodeId) -> bool {
        self.continued_loops.contains(&node)
    }

    //
    // Incidents
    //

    pub fn add_incident(&mut self, kind: IncidentKind, node: NodeId) {
        self.incidents.insert(kind, node);
    }

    /// Record an incident found on a fragment that has no node.
    pub fn add_incident_at(&mut self, kind: IncidentKind, position: Position) {
        self.incidents.insert_at(kind, position);
    }

    pub fn incidents(&self) -> &IncidentList {
        &self.incidents
    }

    pub fn has_incidents(&self) -> bool {
        self.incidents.any_incidents()
    }

    pub fn diagnostics(&self, ast: &Ast) -> Vec<Diagnostic> {
        self.incidents.diagnostics(ast)
    }

    //
    // Binding and location indices
    //

    pub fn bindings(&self) -> &BindingResolver {
        &self.bindings
    }

    pub(crate) fn bindings_mut(&mut self) -> &mut BindingResolver {
        &mut self.bindings
    }

    pub fn locations(&self) -> &LocationResolver {
        &self.locations
    }

    pub(crate) fn locations_mut(&mut self) -> &mut LocationResolver {
        &mut self.locations
    }
}
