// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

//! The WGSL dialect.
//!
//! Output is compact: one line per top-level declaration, blocks on one line, binary
//! operators without surrounding spaces. Loops other than `loop` are lowered to `loop`
//! with an explicit exit test, and `for` updates go into a `continuing` block so that
//! `continue` still runs them.

use itertools::Itertools;
use smol_str::SmolStr;

use shade_semantics::ast::*;
use shade_semantics::constant::ConstantValue;
use shade_semantics::types::Type;

use crate::transpiler::{Dialect, Transpiler};

/// First line of the output when a header is requested.
pub const HEADER: &str = "// Generated by shade. Do not edit.";

/// Processors rendering WGSL.
#[derive(Clone, Copy, Debug, Default)]
pub struct Wgsl;

type T<'a, 'b> = &'a Transpiler<'b, Wgsl>;

/// Concatenate two pieces of code, separated by a space where gluing them would
/// change the tokens: `a- -b` must not become `a--b`, nor `a/ *p` a comment.
fn glue(left: &str, right: &str) -> String {
    let clash = match (left.chars().last(), right.chars().next()) {
        (Some('-'), Some('-')) | (Some('&'), Some('&')) => true,
        (Some('/'), Some('*' | '/')) => true,
        _ => false,
    };
    if clash {
        format!("{left} {right}")
    } else {
        format!("{left}{right}")
    }
}

/// Render an operand or argument. Ordering comparisons are parenthesized there:
/// `f(a<b, c>d)` and `a<b==c>d` would otherwise read as the template list `a<b, c>`.
fn operand(t: T, id: NodeId) -> String {
    match t.ast().node(id) {
        Node::Binary(expr) if expr.op.is_ordering() => format!("({})", t.render(id)),
        _ => t.render(id),
    }
}

fn arguments(t: T, ids: &[NodeId]) -> String {
    ids.iter().map(|id| operand(t, *id)).join(", ")
}

/// `{}` for an empty list of statements, `{ s1 s2 }` otherwise.
fn braced<I: IntoIterator<Item = String>>(statements: I) -> String {
    let inner = statements.into_iter().filter(|s| !s.is_empty()).join(" ");
    if inner.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {inner} }}")
    }
}

fn exit_unless(condition: &str) -> String {
    format!("if !({condition}) {{ break; }}")
}

/// Render `attributes` of the struct or function `owner`. Location names become the
/// dense index resolved for the owner.
fn attributes(t: T, owner: &str, attributes: &[Attribute]) -> Vec<String> {
    attributes
        .iter()
        .map(|attr| match (attr.name.as_str(), attr.first_argument()) {
            ("location", Some(location)) => {
                match t.trace().locations().location_index(owner, location) {
                    Some(index) => format!("@location({index})"),
                    None => format!("@location({location})"),
                }
            }
            (name, _) if attr.arguments.is_empty() => format!("@{name}"),
            (name, _) => format!("@{name}({})", attr.arguments.iter().join(", ")),
        })
        .collect()
}

/// Attributes followed by a space, or nothing.
fn prefix(attributes: Vec<String>) -> String {
    attributes.into_iter().map(|attr| attr + " ").collect()
}

/// `: T` when a type was written.
fn annotation(t: T, ty: Option<NodeId>) -> String {
    ty.map(|ty| format!(": {}", t.render(ty))).unwrap_or_default()
}

/// ` = value` when a value was written.
fn initializer(t: T, value: Option<NodeId>) -> String {
    value.map(|value| format!(" = {}", t.render(value))).unwrap_or_default()
}

fn is_struct(t: T, ty: NodeId) -> bool {
    matches!(t.trace().resolved_type(ty).ty(), Type::Struct(_))
}

impl Dialect for Wgsl {
    fn module(&self, t: T, module: &Module) -> String {
        let mut declarations = module
            .declarations
            .iter()
            .map(|id| t.render(*id))
            .filter(|code| !code.is_empty());
        if t.options().header() {
            std::iter::once(HEADER.to_string()).chain(declarations).join("\n")
        } else {
            declarations.join("\n")
        }
    }

    // Aliases are resolved into every use, enums lowered to `u32`.
    fn alias(&self, _t: T, _alias: &Alias) -> String {
        String::new()
    }

    fn enum_decl(&self, _t: T, _decl: &EnumDecl) -> String {
        String::new()
    }

    fn struct_decl(&self, t: T, decl: &StructDecl) -> String {
        let properties = t.render_properties(decl);
        if properties.is_empty() {
            format!("struct {} {{}}", decl.name)
        } else {
            format!("struct {} {{ {} }}", decl.name, properties.join(", "))
        }
    }

    fn struct_property(&self, t: T, owner: &SmolStr, property: &StructProperty) -> String {
        format!(
            "{}{}: {}",
            prefix(attributes(t, owner, &property.attributes)),
            property.name,
            t.render(property.ty)
        )
    }

    fn function(&self, t: T, _id: NodeId, function: &Function) -> String {
        let stage = function.stage();
        let mut attrs = attributes(t, &function.name, &function.attributes);
        if stage == Some(ShaderStage::Compute)
            && find_attribute(&function.attributes, "workgroup_size").is_none()
        {
            let [x, y, z] = t.options().default_workgroup_size();
            attrs.push(format!("@workgroup_size({x}, {y}, {z})"));
        }
        let result = match function.return_type {
            None => String::new(),
            Some(ty) => {
                let attr = match stage {
                    _ if is_struct(t, ty) => "",
                    Some(ShaderStage::Fragment) => "@location(0) ",
                    Some(ShaderStage::Vertex) => "@builtin(position) ",
                    _ => "",
                };
                format!(" -> {attr}{}", t.render(ty))
            }
        };
        format!(
            "{}fn {}({}){result} {}",
            prefix(attrs),
            function.name,
            t.render_parameters(function).join(", "),
            t.render(function.body)
        )
    }

    fn function_parameter(&self, t: T, owner: &SmolStr, param: &FunctionParameter) -> String {
        format!(
            "{}{}: {}",
            prefix(attributes(t, owner, &param.attributes)),
            param.name,
            t.render(param.ty)
        )
    }

    fn module_variable(&self, t: T, id: NodeId, var: &ModuleVariable) -> String {
        let mut attrs = Vec::new();
        if let (Some(group), Some(binding)) = (&var.group, &var.binding) {
            let bindings = t.trace().bindings();
            let group_index = bindings.group_index(group).map(|i| i.to_string());
            let binding_index = bindings.binding_index(group, binding).map(|i| i.to_string());
            attrs.push(format!("@group({})", group_index.as_deref().unwrap_or(group)));
            attrs.push(format!("@binding({})", binding_index.as_deref().unwrap_or(binding)));
        }
        let space = var.space();
        let qualifier = match (space, var.access_mode()) {
            (AddressSpace::Storage, Some(access)) => format!("<{}, {}>", space.as_str(), access.as_str()),
            _ => format!("<{}>", space.as_str()),
        };
        let ty = match var.ty {
            Some(ty) => annotation(t, Some(ty)),
            None if var.initializer.is_none() => t
                .trace()
                .declared_type(id)
                .map(|ty| format!(": {}", ty.target_spelling()))
                .unwrap_or_default(),
            None => String::new(),
        };
        format!(
            "{}var{qualifier} {}{ty}{};",
            prefix(attrs),
            var.name,
            initializer(t, var.initializer)
        )
    }

    fn module_constant(&self, t: T, _id: NodeId, constant: &ModuleConstant) -> String {
        format!(
            "const {}{}{};",
            constant.name,
            annotation(t, constant.ty),
            initializer(t, constant.value)
        )
    }

    fn shader_parameter(&self, t: T, param: &ShaderParameter) -> String {
        format!(
            "override {}: {}{};",
            param.name,
            t.render(param.ty),
            initializer(t, param.default)
        )
    }

    fn type_reference(&self, t: T, id: NodeId) -> String {
        t.trace().resolved_type(id).spelling().to_string()
    }

    fn block(&self, t: T, block: &Block) -> String {
        braced(block.statements.iter().map(|id| t.render(*id)))
    }

    fn variable_declaration(&self, t: T, id: NodeId, decl: &VariableDeclaration) -> String {
        let keyword = match decl.mutability {
            // A pointer cannot be stored in a `var`.
            Mutability::Let => match t.trace().declared_type(id) {
                Some(Type::Pointer(..)) => "let",
                _ => "var",
            },
            Mutability::Const => {
                let folded = decl
                    .initializer
                    .and_then(|init| t.trace().expression(init).constant_value());
                if folded.is_some() {
                    "const"
                } else {
                    "let"
                }
            }
        };
        format!(
            "{keyword} {}{}{};",
            decl.name,
            annotation(t, decl.ty),
            initializer(t, decl.initializer)
        )
    }

    fn if_stmt(&self, t: T, stmt: &If) -> String {
        let mut code = format!("if {} {}", t.render(stmt.condition), t.render(stmt.then_block));
        if let Some(else_branch) = stmt.else_branch {
            code.push_str(" else ");
            code.push_str(&t.render(else_branch));
        }
        code
    }

    fn while_loop(&self, t: T, stmt: &While) -> String {
        format!(
            "loop {}",
            braced([exit_unless(&t.render(stmt.condition)), t.render(stmt.body)])
        )
    }

    fn do_while(&self, t: T, id: NodeId, stmt: &DoWhile) -> String {
        let body = t.render(stmt.body);
        let condition = t.render(stmt.condition);
        // `continue` jumps to the continuing block, so the exit test must live there.
        let exit = if t.trace().is_continued(id) {
            format!("continuing {{ break if !({condition}); }}")
        } else {
            exit_unless(&condition)
        };
        format!("loop {}", braced([body, exit]))
    }

    fn for_loop(&self, t: T, stmt: &For) -> String {
        let mut parts = Vec::new();
        if let Some(condition) = stmt.condition {
            parts.push(exit_unless(&t.render(condition)));
        }
        parts.push(t.render(stmt.body));
        if let Some(update) = stmt.update {
            parts.push(format!("continuing {}", braced([t.render(update)])));
        }
        let lowered = format!("loop {}", braced(parts));
        match stmt.init {
            Some(init) => format!("{} {lowered}", t.render(init)),
            None => lowered,
        }
    }

    fn switch(&self, t: T, stmt: &Switch) -> String {
        format!(
            "switch {} {}",
            t.render(stmt.subject),
            braced(stmt.cases.iter().map(|id| t.render(*id)))
        )
    }

    fn switch_case(&self, t: T, case: &SwitchCase) -> String {
        let mut selectors: Vec<String> = case.selectors.iter().map(|id| t.render(*id)).collect();
        let body = t.render(case.body);
        if selectors.is_empty() {
            return format!("default: {body}");
        }
        if case.is_default {
            selectors.push("default".to_string());
        }
        format!("case {}: {body}", selectors.join(", "))
    }

    fn break_stmt(&self, _t: T) -> String {
        "break;".to_string()
    }

    fn continue_stmt(&self, _t: T) -> String {
        "continue;".to_string()
    }

    fn discard(&self, _t: T) -> String {
        "discard;".to_string()
    }

    fn return_stmt(&self, t: T, stmt: &Return) -> String {
        match stmt.value {
            Some(value) => format!("return {};", t.render(value)),
            None => "return;".to_string(),
        }
    }

    fn assignment(&self, t: T, stmt: &Assignment) -> String {
        format!(
            "{} {} {};",
            t.render(stmt.target),
            stmt.operator.as_str(),
            t.render(stmt.value)
        )
    }

    fn increment_decrement(&self, t: T, stmt: &IncrementDecrement) -> String {
        format!("{}{};", t.render(stmt.target), stmt.operator.as_str())
    }

    fn call_statement(&self, t: T, stmt: &FunctionCallStatement) -> String {
        format!("{};", t.render(stmt.call))
    }

    fn int_literal(&self, _t: T, literal: &IntLiteral) -> String {
        literal.text.to_string()
    }

    fn float_literal(&self, _t: T, literal: &FloatLiteral) -> String {
        literal.text.to_string()
    }

    fn bool_literal(&self, _t: T, value: bool) -> String {
        value.to_string()
    }

    fn identifier(&self, _t: T, name: &SmolStr) -> String {
        name.to_string()
    }

    fn binary(&self, t: T, expr: &Binary) -> String {
        let left = glue(&operand(t, expr.left), expr.op.as_str());
        glue(&left, &operand(t, expr.right))
    }

    fn unary(&self, t: T, expr: &Unary) -> String {
        glue(expr.op.as_str(), &t.render(expr.operand))
    }

    fn parenthesized(&self, t: T, inner: NodeId) -> String {
        format!("({})", t.render(inner))
    }

    fn call(&self, t: T, id: NodeId, call: &Call) -> String {
        let callee = t.trace().call_target(id).unwrap_or(&call.function);
        format!("{callee}({})", arguments(t, &call.arguments))
    }

    fn construct(&self, t: T, construct: &Construct) -> String {
        format!(
            "{}({})",
            t.render(construct.ty),
            arguments(t, &construct.arguments)
        )
    }

    fn member(&self, t: T, id: NodeId, member: &Member) -> String {
        let traced = t.trace().expression(id);
        match (traced.ty(), traced.constant_value()) {
            (Type::Enum(_), Some(ConstantValue::Int(index))) => format!("{index}u"),
            _ => format!("{}.{}", t.render(member.object), member.member),
        }
    }

    fn index(&self, t: T, index: &Index) -> String {
        format!("{}[{}]", t.render(index.object), t.render(index.index))
    }
}

#[test]
fn test_glue() {
    assert_eq!(glue("a-", "-b"), "a- -b");
    assert_eq!(glue("a/", "*p"), "a/ *p");
    assert_eq!(glue("a&", "&b"), "a& &b");
    assert_eq!(glue("a*", "-b"), "a*-b");
    assert_eq!(glue("-", "x"), "-x");
}

#[test]
fn test_braced() {
    assert_eq!(braced(Vec::new()), "{}");
    assert_eq!(braced(vec!["a;".to_string(), String::new(), "b;".to_string()]), "{ a; b; }");
}
