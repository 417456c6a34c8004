// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

//! Field names used by the grammar to label children.

pub const NAME: &str = "name";
pub const TYPE: &str = "type";
pub const MEMBER: &str = "member";
pub const PROPERTY: &str = "property";
pub const ATTRIBUTE: &str = "attribute";
pub const ARGUMENT: &str = "argument";
pub const PARAMETER: &str = "parameter";
pub const RETURN_TYPE: &str = "return_type";
pub const BODY: &str = "body";
pub const ADDRESS_SPACE: &str = "address_space";
pub const ACCESS: &str = "access";
pub const VALUE: &str = "value";
pub const LENGTH: &str = "length";
pub const CONDITION: &str = "condition";
pub const CONSEQUENCE: &str = "consequence";
pub const ALTERNATIVE: &str = "alternative";
pub const INITIALIZER: &str = "initializer";
pub const UPDATE: &str = "update";
pub const SUBJECT: &str = "subject";
pub const CASE: &str = "case";
pub const DEFAULT: &str = "default";
pub const LEFT: &str = "left";
pub const RIGHT: &str = "right";
pub const OPERATOR: &str = "operator";
pub const OPERAND: &str = "operand";
pub const EXPRESSION: &str = "expression";
pub const FUNCTION: &str = "function";
pub const OBJECT: &str = "object";
pub const INDEX: &str = "index";
