// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

//! Reporting diagnostics of the shade compiler against the source they were found in.
//!
//! The semantic analyzer never sees source text, only a CST with spans. This crate pairs
//! its diagnostics with the text again and formats them with the external crate `ariadne`.

mod api;
mod span;

pub use api::{
    print_diagnostics, print_diagnostics_from_file, report_error, write_diagnostics,
    write_diagnostics_plain,
};
pub use span::{diagnostic_span, Reportable};
