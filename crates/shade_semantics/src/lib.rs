// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

//! Semantic analysis for the shade shader language.
//!
//! A CST handed over by the grammar is built into an [`ast::Ast`], an arena of nodes
//! addressed by [`ast::NodeId`]. Tracing the AST fills a [`trace::Trace`] with
//! everything later stages need to know: the type and storage facts of every
//! expression, the resolved spelling of every written type, symbol registries,
//! dense binding and location indices, and the list of incidents found on the way.
//!
//! The AST is never changed by tracing. A unit that traced without incidents can be
//! handed to the transpiler together with its trace.

// Organization of API
// ast.rs and make.rs define and construct the tree, builder.rs builds it from a CST.
// trace.rs, scope.rs, resolver.rs and incident.rs hold the state of an analysis,
// tracer/ walks the tree and fills it. types.rs, type_resolution.rs, constant.rs and
// builtins.rs are the rules the walk applies.

pub mod ast;
pub mod builder;
pub mod builtins;
pub mod constant;
pub mod incident;
pub mod make;
pub mod reflection;
pub mod resolver;
pub mod scope;
pub mod trace;
pub mod type_resolution;
pub mod types;

mod tracer;

pub use tracer::{trace_expression, trace_node};

pub use rowan::{TextRange, TextSize};
