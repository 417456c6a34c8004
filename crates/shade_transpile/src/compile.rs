// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

// The document-level driver: CST to AST, trace, and WGSL when the trace is clean.

use std::io;
use std::path::{Path, PathBuf};

use shade_semantics::ast::Ast;
use shade_semantics::builder::build_module;
use shade_semantics::incident::Diagnostic;
use shade_semantics::reflection::{self, Binding, Parameter};
use shade_semantics::trace::Trace;
use shade_syntax::CstNode;

use crate::options::CompileOptions;
use crate::transpiler::transpile;
use crate::wgsl::Wgsl;

/// Mapping from generated code back to the source. No dialect produces one yet, so
/// the type has no values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceMap {}

/// Generated code of one unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Output {
    pub code: String,
    pub source_map: Option<SourceMap>,
}

/// Everything produced by compiling one unit. `output` is `None` if there were incidents.
#[derive(Clone, Debug)]
pub struct CompileResult {
    path: PathBuf,
    ast: Ast,
    trace: Trace,
    output: Option<Output>,
}

impl CompileResult {
    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn output(&self) -> Option<&Output> {
        self.output.as_ref()
    }

    /// The generated code, if the unit compiled.
    pub fn code(&self) -> Option<&str> {
        self.output.as_ref().map(|output| output.code.as_str())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn any_incidents(&self) -> bool {
        self.trace.has_incidents()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.trace.diagnostics(&self.ast)
    }

    pub fn bindings(&self) -> Vec<Binding> {
        reflection::bindings(&self.ast, &self.trace)
    }

    pub fn parameters(&self) -> Vec<Parameter> {
        reflection::parameters(&self.ast, &self.trace)
    }

    /// Print diagnostics to stderr, with source excerpts if `source` is given.
    pub fn print_diagnostics(&self, source: Option<&str>) -> io::Result<()> {
        let diagnostics = self.diagnostics();
        match source {
            Some(source) => shade_source_file::print_diagnostics(&diagnostics, &self.path, source),
            None => shade_source_file::write_diagnostics_plain(&diagnostics, &self.path, io::stderr().lock()),
        }
    }
}

/// Build, trace and transpile the unit whose CST is `cst`.
pub fn compile(cst: &CstNode, options: &CompileOptions) -> CompileResult {
    tracing::debug!(path = %options.path().display(), "compile start");
    let mut ast = Ast::new();
    let mut trace = Trace::new();
    build_module(cst, &mut ast, &mut trace);
    ast.trace(&mut trace);
    let output = transpile(&ast, &trace, &Wgsl, options.transpile_options()).map(|code| Output {
        code,
        source_map: None,
    });
    tracing::debug!(
        incidents = trace.incidents().len(),
        compiled = output.is_some(),
        "compile end"
    );
    CompileResult {
        path: options.path().to_path_buf(),
        ast,
        trace,
        output,
    }
}
