//! Help text derived from documentation comments

/// Width of a tab stop when expanding tabs
const TAB_SIZE: usize = 8;

/// Normalize a documentation block
///
/// Tabs are expanded, the first line is stripped, the common indentation of
/// the remaining lines is removed and leading or trailing blank lines are
/// dropped.
pub fn trim_doc(doc: &str) -> String {
    let lines: Vec<String> = doc.lines().map(expand_tabs).collect();
    let Some((first, rest)) = lines.split_first() else {
        return String::new();
    };

    let indent = rest
        .iter()
        .filter_map(|line| {
            let stripped = line.trim_start();
            (!stripped.is_empty()).then(|| line.chars().count() - stripped.chars().count())
        })
        .min();

    let mut trimmed = vec![first.trim().to_string()];
    if let Some(indent) = indent {
        trimmed.extend(
            rest.iter()
                .map(|line| line.chars().skip(indent).collect::<String>().trim_end().to_string()),
        );
    }

    while trimmed.last().is_some_and(|l| l.is_empty()) {
        trimmed.pop();
    }
    let leading = trimmed.iter().take_while(|l| l.is_empty()).count();
    trimmed.drain(..leading);

    trimmed.join("\n")
}

/// Split documentation into a one-line summary and a long description
///
/// The summary is the first paragraph with its line breaks collapsed into
/// spaces; everything after the first blank line is the description.
pub fn parse_docstring(doc: &str) -> (String, String) {
    let doc = trim_doc(doc);
    let (short, long) = match doc.split_once("\n\n") {
        Some((short, long)) => (short, long),
        None => (doc.as_str(), ""),
    };
    (short.trim().replace('\n', " "), long.trim().to_string())
}

fn expand_tabs(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let pad = TAB_SIZE - column % TAB_SIZE;
            out.extend(std::iter::repeat(' ').take(pad));
            column += pad;
        } else {
            out.push(c);
            column += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indented_block() {
        let (short, long) = parse_docstring(
            "
        short1
        short2

        long1
        long2
        ",
        );
        assert_eq!(short, "short1 short2");
        assert_eq!(long, "long1\nlong2");
    }

    #[test]
    fn test_first_line_on_opening_line() {
        let (short, long) = parse_docstring(
            "hello world
        this is part of short

        this is part of long
        ",
        );
        assert_eq!(short, "hello world this is part of short");
        assert_eq!(long, "this is part of long");
    }

    #[test]
    fn test_flat_text() {
        let (short, long) = parse_docstring("short1\nshort2\n\nlong1\nlong2");
        assert_eq!(short, "short1 short2");
        assert_eq!(long, "long1\nlong2");
    }

    #[test]
    fn test_doc_comment_text() {
        let (short, long) = parse_docstring(" Short name\n\n This is my long description.\n");
        assert_eq!(short, "Short name");
        assert_eq!(long, "This is my long description.");
    }

    #[test]
    fn test_summary_only() {
        assert_eq!(parse_docstring("  Just one line  "), ("Just one line".to_string(), String::new()));
    }

    #[test]
    fn test_empty() {
        assert_eq!(parse_docstring(""), (String::new(), String::new()));
        assert_eq!(parse_docstring("\n   \n"), (String::new(), String::new()));
    }

    #[test]
    fn test_relative_indentation_is_kept() {
        let doc = trim_doc("Summary\n    body\n      nested\n    back");
        assert_eq!(doc, "Summary\nbody\n  nested\nback");
    }

    #[test]
    fn test_tabs_expand_to_stops() {
        assert_eq!(expand_tabs("\tx"), "        x");
        assert_eq!(expand_tabs("ab\tx"), "ab      x");
    }
}
