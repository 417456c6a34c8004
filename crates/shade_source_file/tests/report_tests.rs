// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use shade_semantics::incident::Diagnostic;
use shade_semantics::{TextRange, TextSize};
use shade_source_file::{write_diagnostics, write_diagnostics_plain};

const SOURCE: &str = "fn main() {\n    let x: Foo = 1;\n}\n";

fn undefined_type() -> Diagnostic {
    // `Foo` on line 2
    Diagnostic {
        message: "Type \"Foo\" is not defined.".to_string(),
        line: 2,
        column: 12,
        range: TextRange::new(TextSize::from(23), TextSize::from(26)),
    }
}

#[test]
fn test_report_names_message_and_file() {
    let mut buffer = Vec::new();
    write_diagnostics(
        &[undefined_type()],
        Path::new("main.shade"),
        SOURCE,
        false,
        &mut buffer,
    )
    .unwrap();
    let report = String::from_utf8(buffer).unwrap();
    assert!(report.contains("Type \"Foo\" is not defined."));
    assert!(report.contains("main.shade"));
    assert!(report.contains("Near this point"));
    assert!(report.contains("let x: Foo = 1;"));
}

#[test]
fn test_report_without_range() {
    let diagnostic = Diagnostic {
        range: TextRange::default(),
        ..undefined_type()
    };
    let mut buffer = Vec::new();
    write_diagnostics(&[diagnostic], Path::new("main.shade"), SOURCE, false, &mut buffer).unwrap();
    let report = String::from_utf8(buffer).unwrap();
    assert!(report.contains("let x: Foo = 1;"));
}

#[test]
fn test_no_errors_writes_nothing() {
    let mut buffer = Vec::new();
    write_diagnostics::<Diagnostic, _>(&[], Path::new("main.shade"), SOURCE, false, &mut buffer).unwrap();
    assert!(buffer.is_empty());
}

#[test]
fn test_plain_diagnostics() {
    let second = Diagnostic {
        message: "Break statement can only be used within loops or switch statements.".to_string(),
        line: 0,
        column: 0,
        range: TextRange::default(),
    };
    let mut buffer = Vec::new();
    write_diagnostics_plain(&[undefined_type(), second], Path::new("main.shade"), &mut buffer).unwrap();
    assert_eq!(
        String::from_utf8(buffer).unwrap(),
        "main.shade:2:12: Type \"Foo\" is not defined.\nmain.shade:0:0: Break statement can only be used within loops or switch statements.\n"
    );
}
