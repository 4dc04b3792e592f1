//! Raw source text between the statements of a block.
//!
//! Cuts are snapped to line starts: the text after the opening `{` line up to
//! the first statement's line, between the line after one statement and the
//! next statement's line, and after the last statement up to the closing `}`
//! line. Text sharing a line with a statement (including trailing comments)
//! belongs to the statement and is not kept. Only `\n` is a line boundary, so
//! `\r\n` sources slice the same way and the `\r` stays inside the fragment.

use crate::input::tree::Span;

/// One fragment before each statement plus a trailing one, or `None` when the
/// spans do not fit `source`.
pub fn slice(source: &str, block: Span, stmts: &[Span]) -> Option<Vec<String>> {
    let bytes = source.as_bytes();
    let at = |index: usize| bytes.get(index).copied();
    let newline_before = |index: usize| index == 0 || at(index - 1) == Some(b'\n');

    let mut end = block.end.checked_sub(1)?;
    if end > bytes.len() || block.start > end {
        return None;
    }
    let mut begin = block.start;
    while begin < end && at(begin) != Some(b'{') {
        begin += 1;
    }
    if begin < end {
        begin += 1;
    }
    while begin < end && !newline_before(begin) {
        begin += 1;
    }
    while end > begin && !newline_before(end) {
        end -= 1;
    }

    let mut fragments = Vec::with_capacity(stmts.len() + 1);
    let mut prev = begin;
    for span in stmts {
        let mut start = span.start.clamp(prev, end.max(prev));
        while start > prev && !newline_before(start) {
            start -= 1;
        }
        fragments.push(source.get(prev..start)?.to_string());
        let mut stop = span.end.max(start);
        while stop < end && !newline_before(stop) {
            stop += 1;
        }
        prev = stop;
    }
    fragments.push(source.get(prev..end.max(prev))?.to_string());
    Some(fragments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn span_of(source: &str, needle: &str) -> Span {
        let start = source.find(needle).unwrap();
        Span::new(start, start + needle.len())
    }

    #[test]
    fn keeps_blank_lines_and_comments() {
        let source = "void start() {\n  // greet\n  a();\n\n  b();\n  // done\n}\n";
        let block = Span::new(source.find('{').unwrap(), source.rfind('}').unwrap() + 1);
        let stmts = [span_of(source, "a();"), span_of(source, "b();")];
        let fragments = slice(source, block, &stmts).unwrap();
        assert_eq!(fragments, ["  // greet\n", "\n", "  // done\n"]);
    }

    #[test]
    fn adjacent_statements_have_empty_fragments() {
        let source = "{\n  a();\n  b();\n}";
        let block = Span::new(0, source.len());
        let stmts = [span_of(source, "a();"), span_of(source, "b();")];
        assert_eq!(slice(source, block, &stmts).unwrap(), ["", "", ""]);
    }

    #[test]
    fn single_line_block_yields_empty_fragments() {
        let source = "{ a(); b(); }";
        let block = Span::new(0, source.len());
        let stmts = [span_of(source, "a();"), span_of(source, "b();")];
        assert_eq!(slice(source, block, &stmts).unwrap(), ["", "", ""]);
    }

    #[test]
    fn brace_on_its_own_line() {
        let source = "void start()\n{\n\n  a();\n}\n";
        let block = Span::new(source.find('{').unwrap(), source.rfind('}').unwrap() + 1);
        let stmts = [span_of(source, "a();")];
        assert_eq!(slice(source, block, &stmts).unwrap(), ["\n", ""]);
    }

    #[test]
    fn crlf_sources_slice_on_newlines() {
        let source = "{\r\n  a();\r\n\r\n  b();\r\n}";
        let block = Span::new(0, source.len());
        let stmts = [span_of(source, "a();"), span_of(source, "b();")];
        assert_eq!(slice(source, block, &stmts).unwrap(), ["", "\r\n", ""]);
    }

    #[test]
    fn out_of_range_spans_are_rejected() {
        assert_eq!(slice("{}", Span::new(0, 40), &[]), None);
        assert_eq!(slice("{}", Span::new(0, 0), &[]), None);
    }
}
