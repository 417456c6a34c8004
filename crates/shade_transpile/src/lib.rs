// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

//! Code generation for the shade shader language.
//!
//! [`compile`] runs the whole pipeline on the CST of one unit: it builds the AST, traces
//! it, and, if tracing found no incidents, renders it as WGSL. The pieces are also usable
//! alone: [`transpile`] renders an already traced AST with any [`Dialect`].

mod compile;
mod options;
mod transpiler;
mod wgsl;

pub use compile::{compile, CompileResult, Output, SourceMap};
pub use options::{CompileOptions, TranspileOptions, DEFAULT_WORKGROUP_SIZE};
pub use transpiler::{transpile, Dialect, Transpiler};
pub use wgsl::{Wgsl, HEADER};
