// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

use std::ops::Range;

use shade_semantics::incident::Diagnostic;
use shade_semantics::TextRange;

/// Something that can be reported against a source text.
pub trait Reportable {
    /// Return a message describing the problem.
    fn message(&self) -> String;

    /// Return the byte range in the source associated with the problem. Empty if unknown.
    fn range(&self) -> TextRange;

    /// Return the one-based line and column, zero if unknown.
    fn line_column(&self) -> (u32, u32);
}

impl Reportable for Diagnostic {
    fn message(&self) -> String {
        self.message.clone()
    }

    fn range(&self) -> TextRange {
        self.range
    }

    fn line_column(&self) -> (u32, u32) {
        (self.line, self.column)
    }
}

/// Character offset of the byte offset `byte`, clamped to the source.
fn char_offset(source: &str, byte: usize) -> usize {
    let mut byte = byte.min(source.len());
    while !source.is_char_boundary(byte) {
        byte -= 1;
    }
    source[..byte].chars().count()
}

/// Character offset of a one-based line and column.
fn line_column_offset(source: &str, line: u32, column: u32) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let mut offset = 0;
    let mut lines = source.split_inclusive('\n');
    for _ in 1..line {
        offset += lines.next()?.chars().count();
    }
    let line_len = lines.next().map_or(0, |text| text.trim_end_matches('\n').chars().count());
    Some(offset + (column.max(1) as usize - 1).min(line_len))
}

/// The span of `error` in `source`, in characters as `ariadne` counts them.
///
/// The byte range is used when it is known. Otherwise the span is one character at the
/// reported line and column, and the start of the file if neither is known.
pub fn diagnostic_span<T: Reportable>(error: &T, source: &str) -> Range<usize> {
    let range = error.range();
    if !range.is_empty() {
        let start: usize = range.start().into();
        let end: usize = range.end().into();
        return char_offset(source, start)..char_offset(source, end);
    }
    let (line, column) = error.line_column();
    match line_column_offset(source, line, column) {
        Some(offset) => {
            let total = source.chars().count();
            offset..(offset + 1).min(total).max(offset)
        }
        None => 0..0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shade_semantics::TextSize;

    fn diagnostic(line: u32, column: u32, range: TextRange) -> Diagnostic {
        Diagnostic {
            message: "problem".to_string(),
            line,
            column,
            range,
        }
    }

    #[test]
    fn test_byte_range_becomes_char_range() {
        // `é` is two bytes.
        let source = "é = 1;\nx = 2;";
        let range = TextRange::new(TextSize::from(9), TextSize::from(10));
        assert_eq!(diagnostic_span(&diagnostic(2, 1, range), source), 8..9);
    }

    #[test]
    fn test_line_column_fallback() {
        let source = "let a = 1;\nlet b = 2;\n";
        let span = diagnostic_span(&diagnostic(2, 5, TextRange::default()), source);
        assert_eq!(span, 15..16);
    }

    #[test]
    fn test_unknown_position() {
        let span = diagnostic_span(&diagnostic(0, 0, TextRange::default()), "x");
        assert_eq!(span, 0..0);
    }

    #[test]
    fn test_line_past_end() {
        let span = diagnostic_span(&diagnostic(7, 1, TextRange::default()), "x\n");
        assert_eq!(span, 0..0);
    }

    #[test]
    fn test_range_past_end_is_clamped() {
        let range = TextRange::new(TextSize::from(2), TextSize::from(40));
        assert_eq!(diagnostic_span(&diagnostic(1, 3, range), "abcd"), 2..4);
    }
}
