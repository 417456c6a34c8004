// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

//! Node kinds produced by the grammar.

// Declarations
pub const SOURCE_FILE: &str = "source_file";
pub const ALIAS_DECLARATION: &str = "alias_declaration";
pub const ENUM_DECLARATION: &str = "enum_declaration";
pub const STRUCT_DECLARATION: &str = "struct_declaration";
pub const STRUCT_PROPERTY: &str = "struct_property";
pub const ATTRIBUTE: &str = "attribute";
pub const FUNCTION_DECLARATION: &str = "function_declaration";
pub const PARAMETER: &str = "parameter";
pub const GLOBAL_VARIABLE_DECLARATION: &str = "global_variable_declaration";
pub const CONST_DECLARATION: &str = "const_declaration";
pub const LET_DECLARATION: &str = "let_declaration";
pub const PARAMETER_DECLARATION: &str = "parameter_declaration";
pub const TYPE: &str = "type";

// Statements
pub const BLOCK: &str = "block";
pub const IF_STATEMENT: &str = "if_statement";
pub const WHILE_STATEMENT: &str = "while_statement";
pub const DO_WHILE_STATEMENT: &str = "do_while_statement";
pub const FOR_STATEMENT: &str = "for_statement";
pub const SWITCH_STATEMENT: &str = "switch_statement";
pub const SWITCH_CASE: &str = "switch_case";
pub const BREAK_STATEMENT: &str = "break_statement";
pub const CONTINUE_STATEMENT: &str = "continue_statement";
pub const DISCARD_STATEMENT: &str = "discard_statement";
pub const RETURN_STATEMENT: &str = "return_statement";
pub const ASSIGNMENT_STATEMENT: &str = "assignment_statement";
pub const UPDATE_STATEMENT: &str = "update_statement";
pub const EXPRESSION_STATEMENT: &str = "expression_statement";

// Expressions
pub const INT_LITERAL: &str = "int_literal";
pub const FLOAT_LITERAL: &str = "float_literal";
pub const BOOL_LITERAL: &str = "bool_literal";
pub const IDENTIFIER: &str = "identifier";
pub const BINARY_EXPRESSION: &str = "binary_expression";
pub const UNARY_EXPRESSION: &str = "unary_expression";
pub const PARENTHESIZED_EXPRESSION: &str = "parenthesized_expression";
pub const CALL_EXPRESSION: &str = "call_expression";
pub const CONSTRUCT_EXPRESSION: &str = "construct_expression";
pub const MEMBER_EXPRESSION: &str = "member_expression";
pub const INDEX_EXPRESSION: &str = "index_expression";

// Leaves
pub const OPERATOR: &str = "operator";
pub const KEYWORD: &str = "keyword";
