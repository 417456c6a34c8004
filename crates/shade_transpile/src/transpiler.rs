// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

// Rendering of a traced AST as text in a target dialect.
//
// A `Dialect` is the registry of processors, one method per node kind. The `Transpiler`
// owns the exhaustive match over `Node` and hands each node to its processor, so a node
// kind without a processor does not compile. Processors render their children through
// `Transpiler::render` and only read the trace.

use smol_str::SmolStr;

use shade_semantics::ast::*;
use shade_semantics::trace::Trace;

use crate::options::TranspileOptions;

/// The processors of one target dialect.
pub trait Dialect: Sized {
    // Declarations
    fn module(&self, t: &Transpiler<'_, Self>, module: &Module) -> String;
    fn alias(&self, t: &Transpiler<'_, Self>, alias: &Alias) -> String;
    fn enum_decl(&self, t: &Transpiler<'_, Self>, decl: &EnumDecl) -> String;
    fn struct_decl(&self, t: &Transpiler<'_, Self>, decl: &StructDecl) -> String;
    /// A property of the struct named `owner`.
    fn struct_property(&self, t: &Transpiler<'_, Self>, owner: &SmolStr, property: &StructProperty) -> String;
    fn function(&self, t: &Transpiler<'_, Self>, id: NodeId, function: &Function) -> String;
    /// A parameter of the function named `owner`.
    fn function_parameter(&self, t: &Transpiler<'_, Self>, owner: &SmolStr, param: &FunctionParameter) -> String;
    fn module_variable(&self, t: &Transpiler<'_, Self>, id: NodeId, var: &ModuleVariable) -> String;
    fn module_constant(&self, t: &Transpiler<'_, Self>, id: NodeId, constant: &ModuleConstant) -> String;
    fn shader_parameter(&self, t: &Transpiler<'_, Self>, param: &ShaderParameter) -> String;
    fn type_reference(&self, t: &Transpiler<'_, Self>, id: NodeId) -> String;

    // Statements
    fn block(&self, t: &Transpiler<'_, Self>, block: &Block) -> String;
    fn variable_declaration(&self, t: &Transpiler<'_, Self>, id: NodeId, decl: &VariableDeclaration) -> String;
    fn if_stmt(&self, t: &Transpiler<'_, Self>, stmt: &If) -> String;
    fn while_loop(&self, t: &Transpiler<'_, Self>, stmt: &While) -> String;
    fn do_while(&self, t: &Transpiler<'_, Self>, id: NodeId, stmt: &DoWhile) -> String;
    fn for_loop(&self, t: &Transpiler<'_, Self>, stmt: &For) -> String;
    fn switch(&self, t: &Transpiler<'_, Self>, stmt: &Switch) -> String;
    fn switch_case(&self, t: &Transpiler<'_, Self>, case: &SwitchCase) -> String;
    fn break_stmt(&self, t: &Transpiler<'_, Self>) -> String;
    fn continue_stmt(&self, t: &Transpiler<'_, Self>) -> String;
    fn discard(&self, t: &Transpiler<'_, Self>) -> String;
    fn return_stmt(&self, t: &Transpiler<'_, Self>, stmt: &Return) -> String;
    fn assignment(&self, t: &Transpiler<'_, Self>, stmt: &Assignment) -> String;
    fn increment_decrement(&self, t: &Transpiler<'_, Self>, stmt: &IncrementDecrement) -> String;
    fn call_statement(&self, t: &Transpiler<'_, Self>, stmt: &FunctionCallStatement) -> String;

    // Expressions
    fn int_literal(&self, t: &Transpiler<'_, Self>, literal: &IntLiteral) -> String;
    fn float_literal(&self, t: &Transpiler<'_, Self>, literal: &FloatLiteral) -> String;
    fn bool_literal(&self, t: &Transpiler<'_, Self>, value: bool) -> String;
    fn identifier(&self, t: &Transpiler<'_, Self>, name: &SmolStr) -> String;
    fn binary(&self, t: &Transpiler<'_, Self>, expr: &Binary) -> String;
    fn unary(&self, t: &Transpiler<'_, Self>, expr: &Unary) -> String;
    fn parenthesized(&self, t: &Transpiler<'_, Self>, inner: NodeId) -> String;
    fn call(&self, t: &Transpiler<'_, Self>, id: NodeId, call: &Call) -> String;
    fn construct(&self, t: &Transpiler<'_, Self>, construct: &Construct) -> String;
    fn member(&self, t: &Transpiler<'_, Self>, id: NodeId, member: &Member) -> String;
    fn index(&self, t: &Transpiler<'_, Self>, index: &Index) -> String;
}

/// Renders the nodes of one traced AST with the processors of dialect `D`.
pub struct Transpiler<'a, D: Dialect> {
    ast: &'a Ast,
    trace: &'a Trace,
    dialect: &'a D,
    options: &'a TranspileOptions,
}

impl<'a, D: Dialect> Transpiler<'a, D> {
    pub fn new(ast: &'a Ast, trace: &'a Trace, dialect: &'a D, options: &'a TranspileOptions) -> Self {
        Transpiler {
            ast,
            trace,
            dialect,
            options,
        }
    }

    pub fn ast(&self) -> &'a Ast {
        self.ast
    }

    pub fn trace(&self) -> &'a Trace {
        self.trace
    }

    pub fn options(&self) -> &'a TranspileOptions {
        self.options
    }

    /// Render the subtree at `id`.
    pub fn render(&self, id: NodeId) -> String {
        let d = self.dialect;
        match self.ast.node(id) {
            Node::Module(module) => d.module(self, module),
            Node::Alias(alias) => d.alias(self, alias),
            Node::Enum(decl) => d.enum_decl(self, decl),
            Node::Struct(decl) => d.struct_decl(self, decl),
            Node::StructProperty(_) => panic!("struct property {id} rendered outside of its struct"),
            Node::Function(function) => d.function(self, id, function),
            Node::FunctionParameter(_) => {
                panic!("function parameter {id} rendered outside of its function")
            }
            Node::ModuleVariable(var) => d.module_variable(self, id, var),
            Node::ModuleConstant(constant) => d.module_constant(self, id, constant),
            Node::ShaderParameter(param) => d.shader_parameter(self, param),
            Node::TypeReference(_) => d.type_reference(self, id),

            Node::Block(block) => d.block(self, block),
            Node::VariableDeclaration(decl) => d.variable_declaration(self, id, decl),
            Node::If(stmt) => d.if_stmt(self, stmt),
            Node::While(stmt) => d.while_loop(self, stmt),
            Node::DoWhile(stmt) => d.do_while(self, id, stmt),
            Node::For(stmt) => d.for_loop(self, stmt),
            Node::Switch(stmt) => d.switch(self, stmt),
            Node::SwitchCase(case) => d.switch_case(self, case),
            Node::Break => d.break_stmt(self),
            Node::Continue => d.continue_stmt(self),
            Node::Discard => d.discard(self),
            Node::Return(stmt) => d.return_stmt(self, stmt),
            Node::Assignment(stmt) => d.assignment(self, stmt),
            Node::IncrementDecrement(stmt) => d.increment_decrement(self, stmt),
            Node::FunctionCallStatement(stmt) => d.call_statement(self, stmt),

            Node::IntLiteral(literal) => d.int_literal(self, literal),
            Node::FloatLiteral(literal) => d.float_literal(self, literal),
            Node::BoolLiteral(value) => d.bool_literal(self, *value),
            Node::Identifier(name) => d.identifier(self, name),
            Node::Binary(expr) => d.binary(self, expr),
            Node::Unary(expr) => d.unary(self, expr),
            Node::Parenthesized(inner) => d.parenthesized(self, *inner),
            Node::Call(call) => d.call(self, id, call),
            Node::Construct(construct) => d.construct(self, construct),
            Node::Member(member) => d.member(self, id, member),
            Node::Index(index) => d.index(self, index),
        }
    }

    /// Render the properties of a struct.
    pub fn render_properties(&self, decl: &StructDecl) -> Vec<String> {
        decl.properties
            .iter()
            .map(|id| match self.ast.node(*id) {
                Node::StructProperty(property) => self.dialect.struct_property(self, &decl.name, property),
                other => panic!("property {id} of struct {} is a {}", decl.name, other.kind_name()),
            })
            .collect()
    }

    /// Render the parameters of a function.
    pub fn render_parameters(&self, function: &Function) -> Vec<String> {
        function
            .parameters
            .iter()
            .map(|id| match self.ast.node(*id) {
                Node::FunctionParameter(param) => {
                    self.dialect.function_parameter(self, &function.name, param)
                }
                other => panic!("parameter {id} of function {} is a {}", function.name, other.kind_name()),
            })
            .collect()
    }
}

/// Render a whole traced AST, starting at its root module.
///
/// Returns `None` if the trace has incidents or the AST has no root.
pub fn transpile<D: Dialect>(ast: &Ast, trace: &Trace, dialect: &D, options: &TranspileOptions) -> Option<String> {
    if trace.has_incidents() {
        tracing::debug!(incidents = trace.incidents().len(), "not transpiling a unit with incidents");
        return None;
    }
    let root = ast.root()?;
    tracing::debug!(nodes = ast.len(), "transpile start");
    let code = Transpiler::new(ast, trace, dialect, options).render(root);
    tracing::debug!(bytes = code.len(), "transpile end");
    Some(code)
}
