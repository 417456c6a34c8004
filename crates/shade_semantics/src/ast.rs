// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

// The definition of the AST as well as the API for walking it.
// Construction from a CST is in builder.rs; hand construction, mostly for tests, in make.rs.
//
// Nodes live in an arena owned by `Ast` and refer to each other through `NodeId`.
// Children are plain ids, so a node never owns its subtree and a traced node can be
// looked up from any side table keyed by `NodeId`.
//
// Variants have the form Xxx(Xxx): the outer name is the variant, the inner name is the
// struct holding the payload. Kinds without payload are unit variants.

use std::fmt;

use smol_str::SmolStr;

use crate::TextRange;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a node came from. `line` and `column` are one-based, zero when unknown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub range: TextRange,
}

impl Position {
    pub fn new(line: u32, column: u32, range: TextRange) -> Position {
        Position {
            line,
            column,
            range,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct NodeData {
    node: Node,
    position: Position,
}

/// Arena of AST nodes. Ids are handed out in allocation order.
#[derive(Clone, Debug, Default)]
pub struct Ast {
    nodes: Vec<NodeData>,
    root: Option<NodeId>,
}

impl Ast {
    pub fn new() -> Ast {
        Ast::default()
    }

    pub fn alloc(&mut self, node: Node, position: Position) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData { node, position });
        id
    }

    /// Allocate a node with no source position.
    pub fn add(&mut self, node: Node) -> NodeId {
        self.alloc(node, Position::default())
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.data(id).node
    }

    pub fn position(&self, id: NodeId) -> Position {
        self.data(id).position
    }

    fn data(&self, id: NodeId) -> &NodeData {
        match self.nodes.get(id.index()) {
            Some(data) => data,
            None => panic!("node {id} does not belong to this AST"),
        }
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    /// The module node, if one was built.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Top-level declarations of the root module.
    pub fn declarations(&self) -> &[NodeId] {
        match self.root.map(|id| self.node(id)) {
            Some(Node::Module(module)) => &module.declarations,
            _ => &[],
        }
    }

    pub fn name_of(&self, id: NodeId) -> Option<&SmolStr> {
        self.node(id).name()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    // Declarations
    Module(Module),
    Alias(Alias),
    Enum(EnumDecl),
    Struct(StructDecl),
    StructProperty(StructProperty),
    Function(Function),
    FunctionParameter(FunctionParameter),
    ModuleVariable(ModuleVariable),
    ModuleConstant(ModuleConstant),
    ShaderParameter(ShaderParameter),
    TypeReference(TypeReference),

    // Statements
    Block(Block),
    VariableDeclaration(VariableDeclaration),
    If(If),
    While(While),
    DoWhile(DoWhile),
    For(For),
    Switch(Switch),
    SwitchCase(SwitchCase),
    Break,
    Continue,
    Discard,
    Return(Return),
    Assignment(Assignment),
    IncrementDecrement(IncrementDecrement),
    FunctionCallStatement(FunctionCallStatement),

    // Expressions
    IntLiteral(IntLiteral),
    FloatLiteral(FloatLiteral),
    BoolLiteral(bool),
    Identifier(SmolStr),
    Binary(Binary),
    Unary(Unary),
    Parenthesized(NodeId),
    Call(Call),
    Construct(Construct),
    Member(Member),
    Index(Index),
}

impl Node {
    /// Name of the node kind, used in logs and diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Module(_) => "module",
            Node::Alias(_) => "alias",
            Node::Enum(_) => "enum",
            Node::Struct(_) => "struct",
            Node::StructProperty(_) => "struct property",
            Node::Function(_) => "function",
            Node::FunctionParameter(_) => "function parameter",
            Node::ModuleVariable(_) => "module variable",
            Node::ModuleConstant(_) => "module constant",
            Node::ShaderParameter(_) => "shader parameter",
            Node::TypeReference(_) => "type reference",
            Node::Block(_) => "block",
            Node::VariableDeclaration(_) => "variable declaration",
            Node::If(_) => "if",
            Node::While(_) => "while",
            Node::DoWhile(_) => "do-while",
            Node::For(_) => "for",
            Node::Switch(_) => "switch",
            Node::SwitchCase(_) => "switch case",
            Node::Break => "break",
            Node::Continue => "continue",
            Node::Discard => "discard",
            Node::Return(_) => "return",
            Node::Assignment(_) => "assignment",
            Node::IncrementDecrement(_) => "increment/decrement",
            Node::FunctionCallStatement(_) => "function call statement",
            Node::IntLiteral(_) => "integer literal",
            Node::FloatLiteral(_) => "float literal",
            Node::BoolLiteral(_) => "bool literal",
            Node::Identifier(_) => "identifier",
            Node::Binary(_) => "binary expression",
            Node::Unary(_) => "unary expression",
            Node::Parenthesized(_) => "parenthesized expression",
            Node::Call(_) => "call",
            Node::Construct(_) => "construct",
            Node::Member(_) => "member access",
            Node::Index(_) => "index access",
        }
    }

    /// The declared name, for nodes that declare one.
    pub fn name(&self) -> Option<&SmolStr> {
        match self {
            Node::Alias(x) => Some(&x.name),
            Node::Enum(x) => Some(&x.name),
            Node::Struct(x) => Some(&x.name),
            Node::StructProperty(x) => Some(&x.name),
            Node::Function(x) => Some(&x.name),
            Node::FunctionParameter(x) => Some(&x.name),
            Node::ModuleVariable(x) => Some(&x.name),
            Node::ModuleConstant(x) => Some(&x.name),
            Node::ShaderParameter(x) => Some(&x.name),
            Node::VariableDeclaration(x) => Some(&x.name),
            _ => None,
        }
    }

    pub fn is_expression(&self) -> bool {
        matches!(
            self,
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
                | Node::Index(_)
        )
    }
}

//
// Declarations
//

#[derive(Clone, Debug, PartialEq)]
pub struct Module {
    pub declarations: Vec<NodeId>,
}

/// An attribute such as `@location(0)` or `@workgroup_size(8, 8)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: SmolStr,
    pub arguments: Vec<SmolStr>,
}

impl Attribute {
    pub fn new<T: AsRef<str>>(name: T, arguments: &[&str]) -> Attribute {
        Attribute {
            name: SmolStr::new(name),
            arguments: arguments.iter().map(SmolStr::new).collect(),
        }
    }

    pub fn first_argument(&self) -> Option<&SmolStr> {
        self.arguments.first()
    }
}

/// Find the first attribute named `name`.
pub fn find_attribute<'a>(attributes: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
    attributes.iter().find(|attr| attr.name == name)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Alias {
    pub name: SmolStr,
    /// A `TypeReference`.
    pub target: NodeId,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumDecl {
    pub name: SmolStr,
    pub members: Vec<SmolStr>,
}

impl EnumDecl {
    pub fn member_index(&self, member: &str) -> Option<usize> {
        self.members.iter().position(|m| m == member)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructDecl {
    pub name: SmolStr,
    /// `StructProperty` nodes.
    pub properties: Vec<NodeId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructProperty {
    pub attributes: Vec<Attribute>,
    pub name: SmolStr,
    pub ty: NodeId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Compute,
}

impl ShaderStage {
    pub fn from_attribute_name(name: &str) -> Option<ShaderStage> {
        match name {
            "vertex" => Some(ShaderStage::Vertex),
            "fragment" => Some(ShaderStage::Fragment),
            "compute" => Some(ShaderStage::Compute),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
            ShaderStage::Compute => "compute",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub attributes: Vec<Attribute>,
    pub name: SmolStr,
    /// `FunctionParameter` nodes.
    pub parameters: Vec<NodeId>,
    pub return_type: Option<NodeId>,
    pub body: NodeId,
}

impl Function {
    /// The entry-point stage named by the first stage attribute, if any.
    pub fn stage(&self) -> Option<ShaderStage> {
        self.attributes
            .iter()
            .find_map(|attr| ShaderStage::from_attribute_name(&attr.name))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionParameter {
    pub attributes: Vec<Attribute>,
    pub name: SmolStr,
    pub ty: NodeId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressSpace {
    Function,
    Private,
    Workgroup,
    Uniform,
    Storage,
}

impl AddressSpace {
    pub fn from_keyword(text: &str) -> Option<AddressSpace> {
        match text {
            "function" => Some(AddressSpace::Function),
            "private" => Some(AddressSpace::Private),
            "workgroup" => Some(AddressSpace::Workgroup),
            "uniform" => Some(AddressSpace::Uniform),
            "storage" => Some(AddressSpace::Storage),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AddressSpace::Function => "function",
            AddressSpace::Private => "private",
            AddressSpace::Workgroup => "workgroup",
            AddressSpace::Uniform => "uniform",
            AddressSpace::Storage => "storage",
        }
    }

    /// Address spaces whose variables are bound by the host.
    pub fn needs_binding(&self) -> bool {
        matches!(self, AddressSpace::Uniform | AddressSpace::Storage)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessMode {
    Read,
    Write,
    ReadWrite,
}

impl AccessMode {
    pub fn from_keyword(text: &str) -> Option<AccessMode> {
        match text {
            "read" => Some(AccessMode::Read),
            "write" => Some(AccessMode::Write),
            "read_write" => Some(AccessMode::ReadWrite),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::Read => "read",
            AccessMode::Write => "write",
            AccessMode::ReadWrite => "read_write",
        }
    }
}

/// `var<space, access> name: T = init;` at module level, optionally with `@group` and `@binding`.
#[derive(Clone, Debug, PartialEq)]
pub struct ModuleVariable {
    pub group: Option<SmolStr>,
    pub binding: Option<SmolStr>,
    pub address_space: Option<AddressSpace>,
    pub access: Option<AccessMode>,
    pub name: SmolStr,
    pub ty: Option<NodeId>,
    pub initializer: Option<NodeId>,
}

impl ModuleVariable {
    /// The address space, `private` when none was written.
    pub fn space(&self) -> AddressSpace {
        self.address_space.unwrap_or(AddressSpace::Private)
    }

    /// The access mode, defaulting to `read` for storage buffers.
    pub fn access_mode(&self) -> Option<AccessMode> {
        match (self.space(), self.access) {
            (AddressSpace::Storage, None) => Some(AccessMode::Read),
            (_, access) => access,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModuleConstant {
    pub name: SmolStr,
    pub ty: Option<NodeId>,
    pub value: Option<NodeId>,
}

/// A pipeline-overridable constant.
#[derive(Clone, Debug, PartialEq)]
pub struct ShaderParameter {
    pub name: SmolStr,
    pub ty: NodeId,
    pub default: Option<NodeId>,
}

/// A written type such as `f32`, `vec3<f32>`, `array<Light, 4>` or a user type name.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeReference {
    pub name: SmolStr,
    /// Type parameters, themselves `TypeReference` nodes.
    pub parameters: Vec<NodeId>,
    /// Array length.
    pub length: Option<u32>,
}

//
// Statements
//

#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub statements: Vec<NodeId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mutability {
    /// `let`: a mutable function-local variable.
    Let,
    /// `const`: an immutable local.
    Const,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VariableDeclaration {
    pub mutability: Mutability,
    pub name: SmolStr,
    pub ty: Option<NodeId>,
    pub initializer: Option<NodeId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct If {
    pub condition: NodeId,
    pub then_block: NodeId,
    /// A `Block` or another `If`.
    pub else_branch: Option<NodeId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct While {
    pub condition: NodeId,
    pub body: NodeId,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DoWhile {
    pub body: NodeId,
    pub condition: NodeId,
}

#[derive(Clone, Debug, PartialEq)]
pub struct For {
    pub init: Option<NodeId>,
    pub condition: Option<NodeId>,
    pub update: Option<NodeId>,
    pub body: NodeId,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Switch {
    pub subject: NodeId,
    /// `SwitchCase` nodes.
    pub cases: Vec<NodeId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SwitchCase {
    pub selectors: Vec<NodeId>,
    pub is_default: bool,
    pub body: NodeId,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Return {
    pub value: Option<NodeId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Assign,
    /// A compound assignment such as `+=`.
    Compound(BinaryOp),
}

impl AssignOp {
    pub fn from_token(text: &str) -> Option<AssignOp> {
        if text == "=" {
            return Some(AssignOp::Assign);
        }
        let op = text.strip_suffix('=')?;
        match BinaryOp::from_token(op)? {
            binop if binop.is_compound_assignable() => Some(AssignOp::Compound(binop)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Compound(op) => op.compound_token(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    pub target: NodeId,
    pub operator: AssignOp,
    pub value: NodeId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

impl UpdateOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateOp::Increment => "++",
            UpdateOp::Decrement => "--",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct IncrementDecrement {
    pub target: NodeId,
    pub operator: UpdateOp,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionCallStatement {
    /// A `Call` node.
    pub call: NodeId,
}

//
// Expressions
//

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntSuffix {
    I,
    U,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IntLiteral {
    /// Source text, echoed verbatim by the transpiler.
    pub text: SmolStr,
    pub value: u64,
    pub suffix: Option<IntSuffix>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FloatLiteral {
    pub text: SmolStr,
    pub value: f64,
    /// Written with an `f` suffix, so typed `f32` rather than abstract.
    pub suffixed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinaryOp {
    pub fn from_token(text: &str) -> Option<BinaryOp> {
        use BinaryOp::*;
        let op = match text {
            "+" => Add,
            "-" => Sub,
            "*" => Mul,
            "/" => Div,
            "%" => Rem,
            "==" => Eq,
            "!=" => NotEq,
            "<" => Less,
            "<=" => LessEq,
            ">" => Greater,
            ">=" => GreaterEq,
            "&&" => And,
            "||" => Or,
            "&" => BitAnd,
            "|" => BitOr,
            "^" => BitXor,
            "<<" => Shl,
            ">>" => Shr,
            _ => return None,
        };
        Some(op)
    }

    pub fn as_str(&self) -> &'static str {
        use BinaryOp::*;
        match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Rem => "%",
            Eq => "==",
            NotEq => "!=",
            Less => "<",
            LessEq => "<=",
            Greater => ">",
            GreaterEq => ">=",
            And => "&&",
            Or => "||",
            BitAnd => "&",
            BitOr => "|",
            BitXor => "^",
            Shl => "<<",
            Shr => ">>",
        }
    }

    fn compound_token(&self) -> &'static str {
        use BinaryOp::*;
        match self {
            Add => "+=",
            Sub => "-=",
            Mul => "*=",
            Div => "/=",
            Rem => "%=",
            BitAnd => "&=",
            BitOr => "|=",
            BitXor => "^=",
            Shl => "<<=",
            Shr => ">>=",
            _ => panic!("operator {} has no compound assignment form", self.as_str()),
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        use BinaryOp::*;
        matches!(self, Add | Sub | Mul | Div | Rem)
    }

    pub fn is_comparison(&self) -> bool {
        use BinaryOp::*;
        matches!(self, Eq | NotEq | Less | LessEq | Greater | GreaterEq)
    }

    /// `<`, `<=`, `>` and `>=`.
    pub fn is_ordering(&self) -> bool {
        use BinaryOp::*;
        matches!(self, Less | LessEq | Greater | GreaterEq)
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub fn is_bitwise(&self) -> bool {
        use BinaryOp::*;
        matches!(self, BitAnd | BitOr | BitXor)
    }

    pub fn is_shift(&self) -> bool {
        matches!(self, BinaryOp::Shl | BinaryOp::Shr)
    }

    fn is_compound_assignable(&self) -> bool {
        self.is_arithmetic() || self.is_bitwise() || self.is_shift()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Binary {
    pub op: BinaryOp,
    pub left: NodeId,
    pub right: NodeId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Negate,
    Not,
    BitNot,
    AddressOf,
    Deref,
}

impl UnaryOp {
    pub fn from_token(text: &str) -> Option<UnaryOp> {
        let op = match text {
            "-" => UnaryOp::Negate,
            "!" => UnaryOp::Not,
            "~" => UnaryOp::BitNot,
            "&" => UnaryOp::AddressOf,
            "*" => UnaryOp::Deref,
            _ => return None,
        };
        Some(op)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::AddressOf => "&",
            UnaryOp::Deref => "*",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Unary {
    pub op: UnaryOp,
    pub operand: NodeId,
}

/// `name(args)`: a user function, a builtin, or a conversion through a type name.
#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    pub function: SmolStr,
    pub arguments: Vec<NodeId>,
}

/// `T(args)` where `T` is a written type with parameters, e.g. `vec3<f32>(1.0)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Construct {
    pub ty: NodeId,
    pub arguments: Vec<NodeId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Member {
    pub object: NodeId,
    pub member: SmolStr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Index {
    pub object: NodeId,
    pub index: NodeId,
}

#[test]
fn test_assign_op_tokens() {
    assert_eq!(AssignOp::from_token("="), Some(AssignOp::Assign));
    assert_eq!(
        AssignOp::from_token("<<="),
        Some(AssignOp::Compound(BinaryOp::Shl))
    );
    assert_eq!(AssignOp::from_token("=="), None);
    assert_eq!(AssignOp::from_token("&&="), None);
    assert_eq!(AssignOp::Compound(BinaryOp::Add).as_str(), "+=");
}
