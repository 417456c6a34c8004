// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

// Lexical scopes of the trace.
//
// * A name is visible from its declaration to the end of the scope it was declared in.
// * A name may be declared once per scope. An inner scope may shadow an outer one.

use hashbrown::{HashMap, HashSet};
use smol_str::SmolStr;

use crate::ast::NodeId;
use crate::trace::ValueTrace;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// Top-level. Module variables are not stored here, see `Trace::get_value`.
    Global,
    /// Body of a function, holding its parameters.
    Function,
    /// A braced block.
    Block,
    /// Around the body of `while`, `do`-`while` and `for`, and the header of `for`.
    Loop,
    /// Around the cases of a `switch`.
    Switch,
}

#[derive(Clone, Debug)]
pub struct Scope {
    kind: ScopeKind,
    /// The node that opened the scope.
    owner: Option<NodeId>,
    values: HashMap<SmolStr, ValueTrace>,
    /// Names of `for` initializers emitted into this scope. Not visible here, but taken.
    hoisted: HashSet<SmolStr>,
}

impl Scope {
    pub(crate) fn new(kind: ScopeKind, owner: Option<NodeId>) -> Scope {
        Scope {
            kind,
            owner,
            values: HashMap::new(),
            hoisted: HashSet::new(),
        }
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ValueTrace> {
        self.values.get(name)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.values.contains_key(name) || self.hoisted.contains(name)
    }
}

/// A stack each of whose elements is a scope mapping names to value traces.
#[derive(Clone, Debug, Default)]
pub(crate) struct ScopeStack {
    stack: Vec<Scope>,
}

impl ScopeStack {
    pub(crate) fn push(&mut self, kind: ScopeKind, owner: Option<NodeId>) {
        if kind == ScopeKind::Global && !self.stack.is_empty() {
            panic!("The unique global scope must be the first scope.")
        }
        self.stack.push(Scope::new(kind, owner));
    }

    pub(crate) fn pop(&mut self) {
        if self.stack.pop().is_none() {
            panic!("popped a scope that was never opened");
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.stack.len()
    }

    pub(crate) fn current(&self) -> Option<&Scope> {
        self.stack.last()
    }

    /// Bind `name` in the current scope. Returns `false`, binding nothing, if the
    /// current scope already has `name`.
    pub(crate) fn insert(&mut self, name: SmolStr, value: ValueTrace) -> bool {
        let Some(scope) = self.stack.last_mut() else {
            panic!("no scope is open to bind \"{name}\" in");
        };
        if scope.contains_name(&name) {
            return false;
        }
        scope.values.insert(name, value);
        true
    }

    /// Take `name` in the current scope without making it visible there. Returns `false`
    /// if the current scope already has `name`.
    pub(crate) fn hoist(&mut self, name: SmolStr) -> bool {
        let Some(scope) = self.stack.last_mut() else {
            panic!("no scope is open to hoist \"{name}\" into");
        };
        if scope.contains_name(&name) {
            return false;
        }
        scope.hoisted.insert(name)
    }

    /// Look `name` up from the innermost scope outwards.
    pub(crate) fn lookup(&self, name: &str) -> Option<&ValueTrace> {
        self.stack.iter().rev().find_map(|scope| scope.get(name))
    }

    /// The innermost open scope of `kind`.
    pub(crate) fn innermost(&self, kind: ScopeKind) -> Option<&Scope> {
        self.stack.iter().rev().find(|scope| scope.kind == kind)
    }
}
