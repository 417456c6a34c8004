// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

// Build the AST defined in ast.rs from the CST fragments of shade_syntax.
//
// The builder does no semantic checking; it only checks that fragments have the
// shape the grammar promises. A fragment that cannot be built becomes one incident,
// and building continues with its siblings. Unknown fragment kinds at the top level
// are reported by the document driver `build_module`.

use smol_str::SmolStr;
use thiserror::Error;

use shade_syntax::{field, kind, CstNode, CstSpan};

use crate::ast::*;
use crate::incident::IncidentKind;
use crate::make::{parse_float_literal, parse_int_literal};
use crate::trace::Trace;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("Unexpected CST node \"{kind}\".")]
    Unrecognized { kind: SmolStr, span: CstSpan },
    #[error("Malformed CST node \"{kind}\": {detail}.")]
    Malformed {
        kind: SmolStr,
        detail: String,
        span: CstSpan,
    },
}

impl BuildError {
    fn unrecognized(cst: &CstNode) -> BuildError {
        BuildError::Unrecognized {
            kind: SmolStr::new(cst.kind()),
            span: cst.span(),
        }
    }

    fn malformed(cst: &CstNode, detail: impl Into<String>) -> BuildError {
        BuildError::Malformed {
            kind: SmolStr::new(cst.kind()),
            detail: detail.into(),
            span: cst.span(),
        }
    }

    fn into_incident(self) -> (IncidentKind, Position) {
        match self {
            BuildError::Unrecognized { kind, span } => (IncidentKind::UnexpectedCstNode(kind), position(span)),
            BuildError::Malformed { kind, detail, span } => {
                (IncidentKind::MalformedCstNode { kind, detail }, position(span))
            }
        }
    }
}

type BuildResult<T> = Result<T, BuildError>;

fn position(span: CstSpan) -> Position {
    Position::new(span.line, span.column, span.range())
}

/// Build the AST node for a single CST fragment.
///
/// Returns `None` if the kind of `cst` is not one the builder knows. Failures inside a
/// known fragment are recorded as incidents in `trace`, and `None` is returned.
/// `const_declaration` is built as a module constant.
pub fn build(cst: &CstNode, ast: &mut Ast, trace: &mut Trace) -> Option<NodeId> {
    let mut builder = Builder { ast, trace };
    let result = match cst.kind() {
        kind::SOURCE_FILE => Ok(builder.module(cst)),
        _ if is_declaration(cst.kind()) => builder.declaration(cst),
        kind::TYPE => builder.type_reference(cst),
        _ if is_statement(cst.kind()) => builder.statement(cst),
        _ if is_expression(cst.kind()) => builder.expression(cst),
        _ => return None,
    };
    match result {
        Ok(id) => Some(id),
        Err(error) => {
            builder.report(error);
            None
        }
    }
}

/// Build the module for a `source_file` fragment and make it the root of `ast`.
/// Declarations that cannot be built are reported and left out.
pub fn build_module(cst: &CstNode, ast: &mut Ast, trace: &mut Trace) -> NodeId {
    Builder { ast, trace }.module(cst)
}

fn is_declaration(kind: &str) -> bool {
    matches!(
        kind,
        kind::ALIAS_DECLARATION
            | kind::ENUM_DECLARATION
            | kind::STRUCT_DECLARATION
            | kind::FUNCTION_DECLARATION
            | kind::GLOBAL_VARIABLE_DECLARATION
            | kind::CONST_DECLARATION
            | kind::PARAMETER_DECLARATION
    )
}

fn is_statement(kind: &str) -> bool {
    matches!(
        kind,
        kind::BLOCK
            | kind::LET_DECLARATION
            | kind::CONST_DECLARATION
            | kind::IF_STATEMENT
            | kind::WHILE_STATEMENT
            | kind::DO_WHILE_STATEMENT
            | kind::FOR_STATEMENT
            | kind::SWITCH_STATEMENT
            | kind::BREAK_STATEMENT
            | kind::CONTINUE_STATEMENT
            | kind::DISCARD_STATEMENT
            | kind::RETURN_STATEMENT
            | kind::ASSIGNMENT_STATEMENT
            | kind::UPDATE_STATEMENT
            | kind::EXPRESSION_STATEMENT
    )
}

fn is_expression(kind: &str) -> bool {
    matches!(
        kind,
        kind::INT_LITERAL
            | kind::FLOAT_LITERAL
            | kind::BOOL_LITERAL
            | kind::IDENTIFIER
            | kind::BINARY_EXPRESSION
            | kind::UNARY_EXPRESSION
            | kind::PARENTHESIZED_EXPRESSION
            | kind::CALL_EXPRESSION
            | kind::CONSTRUCT_EXPRESSION
            | kind::MEMBER_EXPRESSION
            | kind::INDEX_EXPRESSION
    )
}

fn required<'c>(cst: &'c CstNode, name: &str) -> BuildResult<&'c CstNode> {
    cst.field(name)
        .ok_or_else(|| BuildError::malformed(cst, format!("missing field \"{name}\"")))
}

/// Text of the leaf under `name`, which must be present and non-empty.
fn required_text(cst: &CstNode, name: &str) -> BuildResult<SmolStr> {
    let text = required(cst, name)?.text();
    if text.is_empty() {
        return Err(BuildError::malformed(cst, format!("field \"{name}\" is empty")));
    }
    Ok(SmolStr::new(text))
}

struct Builder<'a> {
    ast: &'a mut Ast,
    trace: &'a mut Trace,
}

impl Builder<'_> {
    fn alloc(&mut self, node: Node, cst: &CstNode) -> NodeId {
        self.ast.alloc(node, position(cst.span()))
    }

    fn report(&mut self, error: BuildError) {
        let (kind, position) = error.into_incident();
        self.trace.add_incident_at(kind, position);
    }

    fn module(&mut self, cst: &CstNode) -> NodeId {
        let mut declarations = Vec::new();
        for child in cst.children() {
            match self.declaration(child) {
                Ok(id) => declarations.push(id),
                Err(error) => self.report(error),
            }
        }
        tracing::debug!(declarations = declarations.len(), "built module");
        let id = self.alloc(Node::Module(Module { declarations }), cst);
        self.ast.set_root(id);
        id
    }

    //
    // Declarations
    //

    fn declaration(&mut self, cst: &CstNode) -> BuildResult<NodeId> {
        let node = match cst.kind() {
            kind::ALIAS_DECLARATION => Node::Alias(Alias {
                name: required_text(cst, field::NAME)?,
                target: self.type_reference(required(cst, field::TYPE)?)?,
            }),
            kind::ENUM_DECLARATION => Node::Enum(EnumDecl {
                name: required_text(cst, field::NAME)?,
                members: cst.fields(field::MEMBER).map(|m| SmolStr::new(m.text())).collect(),
            }),
            kind::STRUCT_DECLARATION => {
                let name = required_text(cst, field::NAME)?;
                let properties = cst
                    .fields(field::PROPERTY)
                    .map(|property| self.struct_property(property))
                    .collect::<BuildResult<Vec<_>>>()?;
                Node::Struct(StructDecl { name, properties })
            }
            kind::FUNCTION_DECLARATION => self.function(cst)?,
            kind::GLOBAL_VARIABLE_DECLARATION => self.module_variable(cst)?,
            kind::CONST_DECLARATION => Node::ModuleConstant(ModuleConstant {
                name: required_text(cst, field::NAME)?,
                ty: self.optional_type(cst)?,
                value: self.optional_expression(cst, field::VALUE)?,
            }),
            kind::PARAMETER_DECLARATION => Node::ShaderParameter(ShaderParameter {
                name: required_text(cst, field::NAME)?,
                ty: self.type_reference(required(cst, field::TYPE)?)?,
                default: self.optional_expression(cst, field::VALUE)?,
            }),
            _ => return Err(BuildError::unrecognized(cst)),
        };
        Ok(self.alloc(node, cst))
    }

    fn attributes(&self, cst: &CstNode) -> BuildResult<Vec<Attribute>> {
        cst.fields(field::ATTRIBUTE)
            .map(|attribute| {
                if attribute.kind() != kind::ATTRIBUTE {
                    return Err(BuildError::unrecognized(attribute));
                }
                Ok(Attribute {
                    name: required_text(attribute, field::NAME)?,
                    arguments: attribute
                        .fields(field::ARGUMENT)
                        .map(|arg| SmolStr::new(arg.text()))
                        .collect(),
                })
            })
            .collect()
    }

    fn struct_property(&mut self, cst: &CstNode) -> BuildResult<NodeId> {
        if cst.kind() != kind::STRUCT_PROPERTY {
            return Err(BuildError::unrecognized(cst));
        }
        let property = StructProperty {
            attributes: self.attributes(cst)?,
            name: required_text(cst, field::NAME)?,
            ty: self.type_reference(required(cst, field::TYPE)?)?,
        };
        Ok(self.alloc(Node::StructProperty(property), cst))
    }

    fn function(&mut self, cst: &CstNode) -> BuildResult<Node> {
        let attributes = self.attributes(cst)?;
        let name = required_text(cst, field::NAME)?;
        let mut parameters = Vec::new();
        for param in cst.fields(field::PARAMETER) {
            if param.kind() != kind::PARAMETER {
                return Err(BuildError::unrecognized(param));
            }
            let parameter = FunctionParameter {
                attributes: self.attributes(param)?,
                name: required_text(param, field::NAME)?,
                ty: self.type_reference(required(param, field::TYPE)?)?,
            };
            parameters.push(self.alloc(Node::FunctionParameter(parameter), param));
        }
        let return_type = match cst.field(field::RETURN_TYPE) {
            Some(ty) => Some(self.type_reference(ty)?),
            None => None,
        };
        let body = self.block(required(cst, field::BODY)?)?;
        Ok(Node::Function(Function {
            attributes,
            name,
            parameters,
            return_type,
            body,
        }))
    }

    fn module_variable(&mut self, cst: &CstNode) -> BuildResult<Node> {
        let mut group = None;
        let mut binding = None;
        for attribute in self.attributes(cst)? {
            let slot = match attribute.name.as_str() {
                "group" => &mut group,
                "binding" => &mut binding,
                _ => {
                    let position = position(cst.span());
                    self.trace
                        .add_incident_at(IncidentKind::UnknownAttribute(attribute.name.clone()), position);
                    continue;
                }
            };
            match attribute.first_argument() {
                Some(argument) => *slot = Some(argument.clone()),
                None => {
                    return Err(BuildError::malformed(
                        cst,
                        format!("attribute \"@{}\" needs an argument", attribute.name),
                    ))
                }
            }
        }
        let address_space = match cst.field_text(field::ADDRESS_SPACE) {
            Some(text) => Some(AddressSpace::from_keyword(text).ok_or_else(|| {
                BuildError::malformed(cst, format!("unknown address space \"{text}\""))
            })?),
            None => None,
        };
        let access = match cst.field_text(field::ACCESS) {
            Some(text) => Some(AccessMode::from_keyword(text).ok_or_else(|| {
                BuildError::malformed(cst, format!("unknown access mode \"{text}\""))
            })?),
            None => None,
        };
        Ok(Node::ModuleVariable(ModuleVariable {
            group,
            binding,
            address_space,
            access,
            name: required_text(cst, field::NAME)?,
            ty: self.optional_type(cst)?,
            initializer: self.optional_expression(cst, field::VALUE)?,
        }))
    }

    fn optional_type(&mut self, cst: &CstNode) -> BuildResult<Option<NodeId>> {
        cst.field(field::TYPE)
            .map(|ty| self.type_reference(ty))
            .transpose()
    }

    fn type_reference(&mut self, cst: &CstNode) -> BuildResult<NodeId> {
        if cst.kind() != kind::TYPE {
            return Err(BuildError::unrecognized(cst));
        }
        let name = required_text(cst, field::NAME)?;
        let parameters = cst
            .fields(field::ARGUMENT)
            .map(|param| self.type_reference(param))
            .collect::<BuildResult<Vec<_>>>()?;
        let length = match cst.field(field::LENGTH) {
            Some(length) => {
                let parsed = parse_int_literal(length.text())
                    .and_then(|literal| u32::try_from(literal.value).ok())
                    .filter(|value| *value > 0);
                match parsed {
                    Some(value) => Some(value),
                    None => {
                        return Err(BuildError::malformed(
                            cst,
                            format!("invalid array length \"{}\"", length.text()),
                        ))
                    }
                }
            }
            None => None,
        };
        let reference = TypeReference {
            name,
            parameters,
            length,
        };
        Ok(self.alloc(Node::TypeReference(reference), cst))
    }

    //
    // Statements
    //

    fn block(&mut self, cst: &CstNode) -> BuildResult<NodeId> {
        if cst.kind() != kind::BLOCK {
            return Err(BuildError::malformed(cst, "expected a block"));
        }
        let mut statements = Vec::new();
        for child in cst.children() {
            match self.statement(child) {
                Ok(id) => statements.push(id),
                Err(error) => self.report(error),
            }
        }
        Ok(self.alloc(Node::Block(Block { statements }), cst))
    }

    fn statement(&mut self, cst: &CstNode) -> BuildResult<NodeId> {
        let node = match cst.kind() {
            kind::BLOCK => return self.block(cst),
            kind::LET_DECLARATION | kind::CONST_DECLARATION => {
                let mutability = if cst.kind() == kind::LET_DECLARATION {
                    Mutability::Let
                } else {
                    Mutability::Const
                };
                Node::VariableDeclaration(VariableDeclaration {
                    mutability,
                    name: required_text(cst, field::NAME)?,
                    ty: self.optional_type(cst)?,
                    initializer: self.optional_expression(cst, field::VALUE)?,
                })
            }
            kind::IF_STATEMENT => {
                let condition = self.expression(required(cst, field::CONDITION)?)?;
                let then_block = self.block(required(cst, field::CONSEQUENCE)?)?;
                let else_branch = match cst.field(field::ALTERNATIVE) {
                    Some(alternative) if alternative.kind() == kind::BLOCK => Some(self.block(alternative)?),
                    Some(alternative) if alternative.kind() == kind::IF_STATEMENT => {
                        Some(self.statement(alternative)?)
                    }
                    Some(_) => return Err(BuildError::malformed(cst, "else branch must be a block or an if")),
                    None => None,
                };
                Node::If(If {
                    condition,
                    then_block,
                    else_branch,
                })
            }
            kind::WHILE_STATEMENT => Node::While(While {
                condition: self.expression(required(cst, field::CONDITION)?)?,
                body: self.block(required(cst, field::BODY)?)?,
            }),
            kind::DO_WHILE_STATEMENT => Node::DoWhile(DoWhile {
                body: self.block(required(cst, field::BODY)?)?,
                condition: self.expression(required(cst, field::CONDITION)?)?,
            }),
            kind::FOR_STATEMENT => Node::For(For {
                init: self.optional_statement(cst, field::INITIALIZER)?,
                condition: self.optional_expression(cst, field::CONDITION)?,
                update: self.optional_statement(cst, field::UPDATE)?,
                body: self.block(required(cst, field::BODY)?)?,
            }),
            kind::SWITCH_STATEMENT => {
                let subject = self.expression(required(cst, field::SUBJECT)?)?;
                let cases = cst
                    .fields(field::CASE)
                    .map(|case| self.switch_case(case))
                    .collect::<BuildResult<Vec<_>>>()?;
                Node::Switch(Switch { subject, cases })
            }
            kind::BREAK_STATEMENT => Node::Break,
            kind::CONTINUE_STATEMENT => Node::Continue,
            kind::DISCARD_STATEMENT => Node::Discard,
            kind::RETURN_STATEMENT => Node::Return(Return {
                value: self.optional_expression(cst, field::VALUE)?,
            }),
            kind::ASSIGNMENT_STATEMENT => {
                let token = required(cst, field::OPERATOR)?.text();
                let operator = AssignOp::from_token(token).ok_or_else(|| {
                    BuildError::malformed(cst, format!("unknown assignment operator \"{token}\""))
                })?;
                Node::Assignment(Assignment {
                    target: self.expression(required(cst, field::LEFT)?)?,
                    operator,
                    value: self.expression(required(cst, field::RIGHT)?)?,
                })
            }
            kind::UPDATE_STATEMENT => {
                let operator = match required(cst, field::OPERATOR)?.text() {
                    "++" => UpdateOp::Increment,
                    "--" => UpdateOp::Decrement,
                    token => {
                        return Err(BuildError::malformed(
                            cst,
                            format!("unknown update operator \"{token}\""),
                        ))
                    }
                };
                Node::IncrementDecrement(IncrementDecrement {
                    target: self.expression(required(cst, field::OPERAND)?)?,
                    operator,
                })
            }
            kind::EXPRESSION_STATEMENT => {
                let expression = required(cst, field::EXPRESSION)?;
                if expression.kind() != kind::CALL_EXPRESSION {
                    return Err(BuildError::malformed(
                        cst,
                        "expression statement must be a function call",
                    ));
                }
                Node::FunctionCallStatement(FunctionCallStatement {
                    call: self.expression(expression)?,
                })
            }
            _ => return Err(BuildError::unrecognized(cst)),
        };
        Ok(self.alloc(node, cst))
    }

    fn optional_statement(&mut self, cst: &CstNode, name: &str) -> BuildResult<Option<NodeId>> {
        cst.field(name).map(|stmt| self.statement(stmt)).transpose()
    }

    fn switch_case(&mut self, cst: &CstNode) -> BuildResult<NodeId> {
        if cst.kind() != kind::SWITCH_CASE {
            return Err(BuildError::unrecognized(cst));
        }
        let selectors = cst
            .fields(field::VALUE)
            .map(|value| self.expression(value))
            .collect::<BuildResult<Vec<_>>>()?;
        let is_default = cst.has_field(field::DEFAULT);
        if selectors.is_empty() && !is_default {
            return Err(BuildError::malformed(cst, "case has neither values nor default"));
        }
        let body = self.block(required(cst, field::BODY)?)?;
        let case = SwitchCase {
            selectors,
            is_default,
            body,
        };
        Ok(self.alloc(Node::SwitchCase(case), cst))
    }

    //
    // Expressions
    //

    fn optional_expression(&mut self, cst: &CstNode, name: &str) -> BuildResult<Option<NodeId>> {
        cst.field(name).map(|expr| self.expression(expr)).transpose()
    }

    fn arguments(&mut self, cst: &CstNode) -> BuildResult<Vec<NodeId>> {
        cst.fields(field::ARGUMENT)
            .map(|arg| self.expression(arg))
            .collect()
    }

    fn expression(&mut self, cst: &CstNode) -> BuildResult<NodeId> {
        let node = match cst.kind() {
            kind::INT_LITERAL => Node::IntLiteral(
                parse_int_literal(cst.text())
                    .ok_or_else(|| BuildError::malformed(cst, format!("invalid integer \"{}\"", cst.text())))?,
            ),
            kind::FLOAT_LITERAL => Node::FloatLiteral(
                parse_float_literal(cst.text())
                    .ok_or_else(|| BuildError::malformed(cst, format!("invalid float \"{}\"", cst.text())))?,
            ),
            kind::BOOL_LITERAL => match cst.text() {
                "true" => Node::BoolLiteral(true),
                "false" => Node::BoolLiteral(false),
                text => return Err(BuildError::malformed(cst, format!("invalid bool \"{text}\""))),
            },
            kind::IDENTIFIER => {
                if cst.text().is_empty() {
                    return Err(BuildError::malformed(cst, "identifier has no text"));
                }
                Node::Identifier(SmolStr::new(cst.text()))
            }
            kind::BINARY_EXPRESSION => {
                let token = required(cst, field::OPERATOR)?.text();
                let op = BinaryOp::from_token(token)
                    .ok_or_else(|| BuildError::malformed(cst, format!("unknown operator \"{token}\"")))?;
                Node::Binary(Binary {
                    op,
                    left: self.expression(required(cst, field::LEFT)?)?,
                    right: self.expression(required(cst, field::RIGHT)?)?,
                })
            }
            kind::UNARY_EXPRESSION => {
                let token = required(cst, field::OPERATOR)?.text();
                let op = UnaryOp::from_token(token)
                    .ok_or_else(|| BuildError::malformed(cst, format!("unknown operator \"{token}\"")))?;
                Node::Unary(Unary {
                    op,
                    operand: self.expression(required(cst, field::OPERAND)?)?,
                })
            }
            kind::PARENTHESIZED_EXPRESSION => {
                Node::Parenthesized(self.expression(required(cst, field::EXPRESSION)?)?)
            }
            kind::CALL_EXPRESSION => Node::Call(Call {
                function: required_text(cst, field::FUNCTION)?,
                arguments: self.arguments(cst)?,
            }),
            kind::CONSTRUCT_EXPRESSION => {
                let ty = required(cst, field::TYPE)?;
                // `f32(x)` and `Light(...)` are calls; only parameterized types need a `Construct`.
                if !ty.has_field(field::ARGUMENT) && !ty.has_field(field::LENGTH) {
                    Node::Call(Call {
                        function: required_text(ty, field::NAME)?,
                        arguments: self.arguments(cst)?,
                    })
                } else {
                    Node::Construct(Construct {
                        ty: self.type_reference(ty)?,
                        arguments: self.arguments(cst)?,
                    })
                }
            }
            kind::MEMBER_EXPRESSION => Node::Member(Member {
                object: self.expression(required(cst, field::OBJECT)?)?,
                member: required_text(cst, field::MEMBER)?,
            }),
            kind::INDEX_EXPRESSION => Node::Index(Index {
                object: self.expression(required(cst, field::OBJECT)?)?,
                index: self.expression(required(cst, field::INDEX)?)?,
            }),
            _ => return Err(BuildError::unrecognized(cst)),
        };
        Ok(self.alloc(node, cst))
    }
}
