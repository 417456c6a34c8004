// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::io::{self, Write};
use std::ops::Range;
use std::path::Path;

use ariadne::{ColorGenerator, Config, Label, Report, ReportKind, Source};

use crate::span::{diagnostic_span, Reportable};

/// Write one error with a labelled excerpt of `source`.
///
/// `span` counts characters from the beginning of `source`.
pub fn report_error<W: Write>(
    message: &str,
    span: &Range<usize>,
    file_path: &str,
    source: &str,
    color: bool,
    writer: W,
) -> io::Result<()> {
    let mut colors = ColorGenerator::new();
    let a = colors.next();
    Report::build(ReportKind::Error, (file_path, span.clone()))
        .with_message(message)
        .with_config(Config::default().with_compact(true).with_color(color))
        .with_label(
            Label::new((file_path, span.clone()))
                .with_message("Near this point")
                .with_color(a),
        )
        .finish()
        .write((file_path, Source::from(source)), writer)
}

/// Write all `errors` against `source`, separated by blank lines.
pub fn write_diagnostics<T: Reportable, W: Write>(
    errors: &[T],
    file_path: &Path,
    source: &str,
    color: bool,
    mut writer: W,
) -> io::Result<()> {
    let file_path = file_path.to_string_lossy();
    for error in errors {
        let span = diagnostic_span(error, source);
        report_error(&error.message(), &span, &file_path, source, color, &mut writer)?;
        writeln!(writer)?;
    }
    Ok(())
}

/// Print all `errors` against `source` to stderr.
pub fn print_diagnostics<T: Reportable>(errors: &[T], file_path: &Path, source: &str) -> io::Result<()> {
    write_diagnostics(errors, file_path, source, true, io::stderr().lock())
}

/// Read the source at `file_path`, then print all `errors` against it to stderr.
pub fn print_diagnostics_from_file<T: Reportable>(errors: &[T], file_path: &Path) -> io::Result<()> {
    let source = fs::read_to_string(file_path)?;
    print_diagnostics(errors, file_path, &source)
}

/// Write all `errors` as `path:line:column: message`, one per line, for when the
/// source text is not at hand.
pub fn write_diagnostics_plain<T: Reportable, W: Write>(
    errors: &[T],
    file_path: &Path,
    mut writer: W,
) -> io::Result<()> {
    for error in errors {
        let (line, column) = error.line_column();
        writeln!(writer, "{}:{line}:{column}: {}", file_path.display(), error.message())?;
    }
    Ok(())
}
