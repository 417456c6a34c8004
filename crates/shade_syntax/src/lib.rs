// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

//! Concrete syntax tree (CST) fragments for the shade shader language.
//!
//! The grammar that produces these trees lives outside this workspace. It hands over a
//! tree-sitter style tree: every node has a string kind, optional leaf text, a list of
//! children that may carry a field name, and a source span. The semantic crate turns these
//! fragments into its own AST; anything it does not recognize is reported, not rejected
//! wholesale.
//!
//! Trees are usually received as JSON dumps, see [`CstNode::from_json`].

mod cst_node;

pub mod field;
pub mod kind;

pub use cst_node::{CstChild, CstNode, CstSpan};

pub use rowan::{TextRange, TextSize};
