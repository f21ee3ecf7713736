//! Live text buffer with auto-adjusting positions.

mod bounds;
mod document;

pub use bounds::Bounds;
pub use document::{Bias, Document, DocumentGuard, PositionBinding, PositionSource};

/// Indentation (leading spaces and tabs) of the line containing `offset`.
pub fn line_indent(text: &str, offset: usize) -> String {
    let offset = offset.min(text.len());
    let line_start = text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    text[line_start..]
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect()
}

/// Widens `[begin, end)` to whole lines when the range is alone on its lines,
/// so removing it does not leave blank indentation behind.
pub fn expand_to_lines(text: &str, begin: usize, end: usize) -> (usize, usize) {
    let begin = begin.min(text.len());
    let end = end.min(text.len()).max(begin);
    let line_start = text[..begin].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = text[end..].find('\n').map(|i| end + i).unwrap_or(text.len());
    let leading_blank = text[line_start..begin].chars().all(char::is_whitespace);
    let trailing_blank = text[end..line_end].chars().all(char::is_whitespace);
    if leading_blank && trailing_blank {
        let stop = if line_end < text.len() { line_end + 1 } else { line_end };
        (line_start, stop)
    } else if trailing_blank {
        (begin, line_end)
    } else {
        (begin, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_indent() {
        let text = "class A {\n    int x;\n}";
        assert_eq!(line_indent(text, text.find("int").unwrap()), "    ");
        assert_eq!(line_indent(text, 0), "");
    }

    #[test]
    fn test_expand_to_lines() {
        let text = "class A {\n    int x;\n    int y;\n}";
        let begin = text.find("int x").unwrap();
        let end = begin + "int x;".len();
        let (b, e) = expand_to_lines(text, begin, end);
        let mut out = text.to_string();
        out.replace_range(b..e, "");
        assert_eq!(out, "class A {\n    int y;\n}");

        let inline = "class A { int x; int y; }";
        let begin = inline.find("int x").unwrap();
        assert_eq!(expand_to_lines(inline, begin, begin + 6), (begin, begin + 6));
    }
}
