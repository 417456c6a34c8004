// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

// Incidents are the semantic errors found while building and tracing an AST.
// They never abort the trace: each one is recorded against the node it was found on
// and the walk continues.

use std::fmt;

use smol_str::SmolStr;
use thiserror::Error;

use crate::ast::{Ast, NodeId, Position};
use crate::types::Type;
use crate::TextRange;

/// What kind of symbol a redeclaration collided with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Alias,
    Enum,
    Struct,
    Function,
    Variable,
    Property,
    Member,
    Parameter,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SymbolKind::Alias => "Alias",
            SymbolKind::Enum => "Enum",
            SymbolKind::Struct => "Struct",
            SymbolKind::Function => "Function",
            SymbolKind::Variable => "Variable",
            SymbolKind::Property => "Property",
            SymbolKind::Member => "Member",
            SymbolKind::Parameter => "Parameter",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum IncidentKind {
    #[error("{kind} with name \"{name}\" already defined.")]
    AlreadyDefined { kind: SymbolKind, name: SmolStr },
    #[error("Type \"{0}\" is not defined.")]
    UndefinedType(SmolStr),
    #[error("Alias \"{0}\" is circular.")]
    CircularAlias(SmolStr),
    #[error("Type \"{name}\" expects {expected} type parameter(s), found {found}.")]
    TypeParameterCount {
        name: SmolStr,
        expected: usize,
        found: usize,
    },
    #[error("Type \"{name}\" cannot have components of type {component}.")]
    InvalidComponentType { name: SmolStr, component: Type },
    #[error("Variable \"{0}\" is not defined.")]
    UndefinedVariable(SmolStr),
    #[error("Variable \"{0}\" is used before its declaration.")]
    UsedBeforeDeclaration(SmolStr),
    #[error("Function \"{0}\" is not defined.")]
    UndefinedFunction(SmolStr),

    // Control flow
    #[error("Condition must be of type bool, found {0}.")]
    ConditionNotBool(Type),
    #[error("For loop initializer must be a mutable variable declaration.")]
    ForInitNotMutable,
    #[error("For loop update must be an assignment, increment, decrement or function call.")]
    InvalidForUpdate,
    #[error("Switch subject must be an unsigned integer or an enum, found {0}.")]
    InvalidSwitchSubject(Type),
    #[error("Case value must be a compile-time constant.")]
    CaseNotConstant,
    #[error("Case value of type {found} does not match switch subject of type {expected}.")]
    CaseTypeMismatch { expected: Type, found: Type },
    #[error("Duplicate case value found.")]
    DuplicateCase,
    #[error("Switch statement has more than one default case.")]
    MultipleDefaults,
    #[error("Break statement can only be used within loops or switch statements.")]
    BreakOutsideLoop,
    #[error("Continue statement can only be used within loops.")]
    ContinueOutsideLoop,
    #[error("Discard statement can only be used within fragment functions.")]
    DiscardOutsideFragment,
    #[error("Return statement can only be used within functions.")]
    ReturnOutsideFunction,
    #[error("Function must return a value of type {expected}, found {found}.")]
    ReturnTypeMismatch { expected: Type, found: Type },
    #[error("Function \"{function}\" must return a value of type {ty}.")]
    MissingReturn { function: SmolStr, ty: Type },

    // Values
    #[error("Cannot modify a value that is not a storage location.")]
    NotStorage,
    #[error("Cannot modify a constant value.")]
    NotVariable,
    #[error("Expected a value of type {expected}, found {found}.")]
    TypeMismatch { expected: Type, found: Type },
    #[error("Constant \"{0}\" must be initialized.")]
    ConstantWithoutInitializer(SmolStr),
    #[error("Constant \"{0}\" must be initialized with a constant expression.")]
    NotConstantExpression(SmolStr),
    #[error("Cannot infer the type of \"{0}\" without a type or an initializer.")]
    CannotInferType(SmolStr),
    #[error("Variable \"{0}\" requires @group and @binding annotations.")]
    MissingBinding(SmolStr),
    #[error("Module variable \"{0}\" cannot be in the function address space.")]
    FunctionSpaceAtModuleScope(SmolStr),
    #[error("Variable \"{name}\" in the {space} address space cannot have an initializer.")]
    UnexpectedInitializer { name: SmolStr, space: &'static str },
    #[error("Shader parameter \"{name}\" must have a scalar type, found {ty}.")]
    InvalidParameterType { name: SmolStr, ty: Type },
    #[error("Unknown attribute \"@{0}\".")]
    UnknownAttribute(SmolStr),
    #[error("Integer literal \"{0}\" is out of range.")]
    IntegerOutOfRange(SmolStr),

    // Expressions
    #[error("Function \"{function}\" expects {expected} argument(s), found {found}.")]
    ArgumentCount {
        function: SmolStr,
        expected: usize,
        found: usize,
    },
    #[error("Argument {index} of \"{function}\" must be of type {expected}, found {found}.")]
    ArgumentType {
        function: SmolStr,
        index: usize,
        expected: Type,
        found: Type,
    },
    #[error("No overload of \"{function}\" accepts arguments ({arguments}).")]
    NoMatchingOverload { function: SmolStr, arguments: String },
    #[error("Cannot construct {ty} from ({arguments}).")]
    NotConstructible { ty: Type, arguments: String },
    #[error("Operator \"{op}\" cannot be applied to {left} and {right}.")]
    InvalidOperands {
        op: &'static str,
        left: Type,
        right: Type,
    },
    #[error("Operator \"{op}\" cannot be applied to {operand}.")]
    InvalidOperand { op: &'static str, operand: Type },
    #[error("Cannot take the address of a value that is not a storage location.")]
    NotAddressable,
    #[error("Cannot dereference a value of type {0}.")]
    NotAPointer(Type),
    #[error("Type {ty} has no member \"{member}\".")]
    UnknownMember { ty: Type, member: SmolStr },
    #[error("Type {0} cannot be indexed.")]
    NotIndexable(Type),
    #[error("Index must be an integer, found {0}.")]
    IndexNotInteger(Type),
    #[error("Index {index} is out of bounds for {ty}.")]
    IndexOutOfBounds { index: i64, ty: Type },

    // Building
    #[error("Unexpected CST node \"{0}\".")]
    UnexpectedCstNode(SmolStr),
    #[error("Malformed CST node \"{kind}\": {detail}.")]
    MalformedCstNode { kind: SmolStr, detail: String },
}

/// Where an incident was found: on an AST node, or, for fragments that never became
/// nodes, at a source position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    Node(NodeId),
    Source(Position),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Incident {
    kind: IncidentKind,
    origin: Origin,
}

impl Incident {
    pub fn new(kind: IncidentKind, node: NodeId) -> Incident {
        Incident {
            kind,
            origin: Origin::Node(node),
        }
    }

    pub fn at(kind: IncidentKind, position: Position) -> Incident {
        Incident {
            kind,
            origin: Origin::Source(position),
        }
    }

    pub fn kind(&self) -> &IncidentKind {
        &self.kind
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// The node the incident was found on, if it has one.
    pub fn node(&self) -> Option<NodeId> {
        match self.origin {
            Origin::Node(node) => Some(node),
            Origin::Source(_) => None,
        }
    }

    pub fn position(&self, ast: &Ast) -> Position {
        match self.origin {
            Origin::Node(node) => ast.position(node),
            Origin::Source(position) => position,
        }
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl fmt::Display for Incident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.origin {
            Origin::Node(node) => write!(f, "{} ({node})", self.kind),
            Origin::Source(pos) => write!(f, "{} ({}:{})", self.kind, pos.line, pos.column),
        }
    }
}

/// A user-facing message with the position of the offending node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub line: u32,
    pub column: u32,
    pub range: TextRange,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

/// Incidents in the order they were found.
#[derive(Clone, Debug, Default)]
pub struct IncidentList {
    list: Vec<Incident>,
}

impl std::ops::Deref for IncidentList {
    type Target = Vec<Incident>;

    fn deref(&self) -> &Self::Target {
        &self.list
    }
}

impl IncidentList {
    pub fn new() -> IncidentList {
        IncidentList::default()
    }

    pub fn insert(&mut self, kind: IncidentKind, node: NodeId) {
        tracing::debug!(%node, "incident: {kind}");
        self.list.push(Incident::new(kind, node));
    }

    pub fn insert_at(&mut self, kind: IncidentKind, position: Position) {
        tracing::debug!(line = position.line, column = position.column, "incident: {kind}");
        self.list.push(Incident::at(kind, position));
    }

    pub fn any_incidents(&self) -> bool {
        !self.list.is_empty()
    }

    /// Resolve each incident's node to its source position.
    pub fn diagnostics(&self, ast: &Ast) -> Vec<Diagnostic> {
        self.list
            .iter()
            .map(|incident| {
                let position = incident.position(ast);
                Diagnostic {
                    message: incident.message(),
                    line: position.line,
                    column: position.column,
                    range: position.range,
                }
            })
            .collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.list.iter().map(Incident::message).collect()
    }
}
