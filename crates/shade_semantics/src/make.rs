// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

//! Free-standing constructors for AST fragments.
//!
//! All functions here are intended to be stupid constructors that allocate one node from
//! already allocated children. Nodes get no source position. The builder in
//! `builder.rs` does the same work from a CST and keeps positions.

use smol_str::SmolStr;

use crate::ast::*;

/// Parse the text of an integer literal: decimal or `0x` hexadecimal, with an
/// optional `i` or `u` suffix.
pub fn parse_int_literal(text: &str) -> Option<IntLiteral> {
    let (digits, suffix) = if let Some(digits) = text.strip_suffix('u') {
        (digits, Some(IntSuffix::U))
    } else if let Some(digits) = text.strip_suffix('i') {
        (digits, Some(IntSuffix::I))
    } else {
        (text, None)
    };
    let value = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<u64>().ok()?,
    };
    Some(IntLiteral {
        text: SmolStr::new(text),
        value,
        suffix,
    })
}

/// Parse the text of a float literal with an optional `f` suffix.
pub fn parse_float_literal(text: &str) -> Option<FloatLiteral> {
    let (digits, suffixed) = match text.strip_suffix('f') {
        Some(digits) => (digits, true),
        None => (text, false),
    };
    let value = digits.parse::<f64>().ok()?;
    Some(FloatLiteral {
        text: SmolStr::new(text),
        value,
        suffixed,
    })
}

impl Ast {
    /// Allocate the module node and make it the root.
    pub fn module(&mut self, declarations: Vec<NodeId>) -> NodeId {
        let id = self.add(Node::Module(Module { declarations }));
        self.set_root(id);
        id
    }

    pub fn alias(&mut self, name: &str, target: NodeId) -> NodeId {
        self.add(Node::Alias(Alias {
            name: SmolStr::new(name),
            target,
        }))
    }

    pub fn enum_decl(&mut self, name: &str, members: &[&str]) -> NodeId {
        self.add(Node::Enum(EnumDecl {
            name: SmolStr::new(name),
            members: members.iter().map(SmolStr::new).collect(),
        }))
    }

    pub fn struct_decl(&mut self, name: &str, properties: Vec<NodeId>) -> NodeId {
        self.add(Node::Struct(StructDecl {
            name: SmolStr::new(name),
            properties,
        }))
    }

    pub fn property(&mut self, name: &str, ty: NodeId, attributes: Vec<Attribute>) -> NodeId {
        self.add(Node::StructProperty(StructProperty {
            attributes,
            name: SmolStr::new(name),
            ty,
        }))
    }

    pub fn function(
        &mut self,
        attributes: Vec<Attribute>,
        name: &str,
        parameters: Vec<NodeId>,
        return_type: Option<NodeId>,
        body: NodeId,
    ) -> NodeId {
        self.add(Node::Function(Function {
            attributes,
            name: SmolStr::new(name),
            parameters,
            return_type,
            body,
        }))
    }

    pub fn parameter(&mut self, name: &str, ty: NodeId, attributes: Vec<Attribute>) -> NodeId {
        self.add(Node::FunctionParameter(FunctionParameter {
            attributes,
            name: SmolStr::new(name),
            ty,
        }))
    }

    /// A `private` module variable.
    pub fn private_var(&mut self, name: &str, ty: Option<NodeId>, init: Option<NodeId>) -> NodeId {
        self.add(Node::ModuleVariable(ModuleVariable {
            group: None,
            binding: None,
            address_space: Some(AddressSpace::Private),
            access: None,
            name: SmolStr::new(name),
            ty,
            initializer: init,
        }))
    }

    /// A module variable bound at `@group(group) @binding(binding)`.
    pub fn bound_var(
        &mut self,
        group: &str,
        binding: &str,
        space: AddressSpace,
        access: Option<AccessMode>,
        name: &str,
        ty: NodeId,
    ) -> NodeId {
        self.add(Node::ModuleVariable(ModuleVariable {
            group: Some(SmolStr::new(group)),
            binding: Some(SmolStr::new(binding)),
            address_space: Some(space),
            access,
            name: SmolStr::new(name),
            ty: Some(ty),
            initializer: None,
        }))
    }

    pub fn module_const(&mut self, name: &str, ty: Option<NodeId>, value: Option<NodeId>) -> NodeId {
        self.add(Node::ModuleConstant(ModuleConstant {
            name: SmolStr::new(name),
            ty,
            value,
        }))
    }

    pub fn shader_parameter(&mut self, name: &str, ty: NodeId, default: Option<NodeId>) -> NodeId {
        self.add(Node::ShaderParameter(ShaderParameter {
            name: SmolStr::new(name),
            ty,
            default,
        }))
    }

    /// A plain type name such as `f32` or `Light`.
    pub fn type_ref(&mut self, name: &str) -> NodeId {
        self.generic_type(name, Vec::new())
    }

    /// A type with parameters such as `vec3<f32>`.
    pub fn generic_type(&mut self, name: &str, parameters: Vec<NodeId>) -> NodeId {
        self.add(Node::TypeReference(TypeReference {
            name: SmolStr::new(name),
            parameters,
            length: None,
        }))
    }

    pub fn array_type(&mut self, element: NodeId, length: Option<u32>) -> NodeId {
        self.add(Node::TypeReference(TypeReference {
            name: SmolStr::new("array"),
            parameters: vec![element],
            length,
        }))
    }

    //
    // Statements
    //

    pub fn block(&mut self, statements: Vec<NodeId>) -> NodeId {
        self.add(Node::Block(Block { statements }))
    }

    pub fn let_decl(&mut self, name: &str, ty: Option<NodeId>, init: Option<NodeId>) -> NodeId {
        self.variable(Mutability::Let, name, ty, init)
    }

    pub fn const_decl(&mut self, name: &str, ty: Option<NodeId>, init: Option<NodeId>) -> NodeId {
        self.variable(Mutability::Const, name, ty, init)
    }

    fn variable(
        &mut self,
        mutability: Mutability,
        name: &str,
        ty: Option<NodeId>,
        initializer: Option<NodeId>,
    ) -> NodeId {
        self.add(Node::VariableDeclaration(VariableDeclaration {
            mutability,
            name: SmolStr::new(name),
            ty,
            initializer,
        }))
    }

    pub fn if_stmt(&mut self, condition: NodeId, then_block: NodeId, else_branch: Option<NodeId>) -> NodeId {
        self.add(Node::If(If {
            condition,
            then_block,
            else_branch,
        }))
    }

    pub fn while_loop(&mut self, condition: NodeId, body: NodeId) -> NodeId {
        self.add(Node::While(While { condition, body }))
    }

    pub fn do_while(&mut self, body: NodeId, condition: NodeId) -> NodeId {
        self.add(Node::DoWhile(DoWhile { body, condition }))
    }

    pub fn for_loop(
        &mut self,
        init: Option<NodeId>,
        condition: Option<NodeId>,
        update: Option<NodeId>,
        body: NodeId,
    ) -> NodeId {
        self.add(Node::For(For {
            init,
            condition,
            update,
            body,
        }))
    }

    pub fn switch(&mut self, subject: NodeId, cases: Vec<NodeId>) -> NodeId {
        self.add(Node::Switch(Switch { subject, cases }))
    }

    pub fn case(&mut self, selectors: Vec<NodeId>, body: NodeId) -> NodeId {
        self.add(Node::SwitchCase(SwitchCase {
            selectors,
            is_default: false,
            body,
        }))
    }

    pub fn default_case(&mut self, body: NodeId) -> NodeId {
        self.add(Node::SwitchCase(SwitchCase {
            selectors: Vec::new(),
            is_default: true,
            body,
        }))
    }

    pub fn break_stmt(&mut self) -> NodeId {
        self.add(Node::Break)
    }

    pub fn continue_stmt(&mut self) -> NodeId {
        self.add(Node::Continue)
    }

    pub fn discard(&mut self) -> NodeId {
        self.add(Node::Discard)
    }

    pub fn return_stmt(&mut self, value: Option<NodeId>) -> NodeId {
        self.add(Node::Return(Return { value }))
    }

    pub fn assign(&mut self, target: NodeId, value: NodeId) -> NodeId {
        self.add(Node::Assignment(Assignment {
            target,
            operator: AssignOp::Assign,
            value,
        }))
    }

    pub fn compound_assign(&mut self, op: BinaryOp, target: NodeId, value: NodeId) -> NodeId {
        self.add(Node::Assignment(Assignment {
            target,
            operator: AssignOp::Compound(op),
            value,
        }))
    }

    pub fn increment(&mut self, target: NodeId) -> NodeId {
        self.add(Node::IncrementDecrement(IncrementDecrement {
            target,
            operator: UpdateOp::Increment,
        }))
    }

    pub fn decrement(&mut self, target: NodeId) -> NodeId {
        self.add(Node::IncrementDecrement(IncrementDecrement {
            target,
            operator: UpdateOp::Decrement,
        }))
    }

    pub fn call_stmt(&mut self, call: NodeId) -> NodeId {
        self.add(Node::FunctionCallStatement(FunctionCallStatement { call }))
    }

    //
    // Expressions
    //

    /// An integer literal. Panics on text that is not an integer literal.
    pub fn int(&mut self, text: &str) -> NodeId {
        match parse_int_literal(text) {
            Some(literal) => self.add(Node::IntLiteral(literal)),
            None => panic!("\"{text}\" is not an integer literal"),
        }
    }

    /// A float literal. Panics on text that is not a float literal.
    pub fn float(&mut self, text: &str) -> NodeId {
        match parse_float_literal(text) {
            Some(literal) => self.add(Node::FloatLiteral(literal)),
            None => panic!("\"{text}\" is not a float literal"),
        }
    }

    pub fn boolean(&mut self, value: bool) -> NodeId {
        self.add(Node::BoolLiteral(value))
    }

    pub fn ident(&mut self, name: &str) -> NodeId {
        self.add(Node::Identifier(SmolStr::new(name)))
    }

    pub fn binary(&mut self, op: BinaryOp, left: NodeId, right: NodeId) -> NodeId {
        self.add(Node::Binary(Binary { op, left, right }))
    }

    pub fn unary(&mut self, op: UnaryOp, operand: NodeId) -> NodeId {
        self.add(Node::Unary(Unary { op, operand }))
    }

    pub fn paren(&mut self, inner: NodeId) -> NodeId {
        self.add(Node::Parenthesized(inner))
    }

    pub fn call(&mut self, function: &str, arguments: Vec<NodeId>) -> NodeId {
        self.add(Node::Call(Call {
            function: SmolStr::new(function),
            arguments,
        }))
    }

    pub fn construct(&mut self, ty: NodeId, arguments: Vec<NodeId>) -> NodeId {
        self.add(Node::Construct(Construct { ty, arguments }))
    }

    pub fn member(&mut self, object: NodeId, member: &str) -> NodeId {
        self.add(Node::Member(Member {
            object,
            member: SmolStr::new(member),
        }))
    }

    pub fn index(&mut self, object: NodeId, index: NodeId) -> NodeId {
        self.add(Node::Index(Index { object, index }))
    }
}

#[test]
fn test_parse_int_literal() {
    let lit = parse_int_literal("0x1Fu").unwrap();
    assert_eq!(lit.value, 31);
    assert_eq!(lit.suffix, Some(IntSuffix::U));
    assert_eq!(parse_int_literal("10").unwrap().suffix, None);
    assert!(parse_int_literal("1.5").is_none());
}

#[test]
fn test_parse_float_literal() {
    let lit = parse_float_literal("1.5f").unwrap();
    assert!(lit.suffixed);
    assert_eq!(lit.value, 1.5);
    assert!(!parse_float_literal("2.0").unwrap().suffixed);
}
