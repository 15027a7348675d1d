// Copyright 2026 the Sheetlink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `@import` handling for replacement text.
//!
//! Constructed stylesheets never load imports. A directive runs from
//! `@import` to the end of its line and needs at least one character after
//! the keyword; a bare `@import` at the end of a line is left alone.

use alloc::string::String;
use alloc::vec::Vec;

const IMPORT: &str = "@import";

/// Replacement text with its `@import` directives removed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Sanitized {
    /// The remaining text, trimmed.
    pub(crate) text: String,
    /// The removed directives, in source order.
    pub(crate) directives: Vec<String>,
}

/// Returns the first `@import` directive in `text`, if any.
pub(crate) fn find_import(text: &str) -> Option<&str> {
    lines(text).find_map(directive_in)
}

/// Removes every `@import` directive from `text` and trims the result.
pub(crate) fn strip_imports(text: &str) -> Sanitized {
    let mut out = String::with_capacity(text.len());
    let mut directives = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let end = rest.find(is_line_break).unwrap_or(rest.len());
        let line = &rest[..end];
        match directive_in(line) {
            Some(d) => {
                out.push_str(&line[..line.len() - d.len()]);
                directives.push(String::from(d));
            }
            None => out.push_str(line),
        }
        // Keep the line break itself.
        let brk = rest[end..].chars().next().map_or(0, char::len_utf8);
        out.push_str(&rest[end..end + brk]);
        rest = &rest[end + brk..];
    }
    Sanitized {
        text: String::from(out.trim()),
        directives,
    }
}

fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(is_line_break)
}

fn is_line_break(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Returns the directive suffix of `line`, starting at the first `@import`
/// that has something after it.
fn directive_in(line: &str) -> Option<&str> {
    let mut from = 0;
    while let Some(pos) = line[from..].find(IMPORT) {
        let start = from + pos;
        if line.len() > start + IMPORT.len() {
            return Some(&line[start..]);
        }
        from = start + IMPORT.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec;

    use super::*;

    #[test]
    fn strips_each_directive_to_end_of_line() {
        let s = strip_imports(
            "@import url('a.css');\nh1 { color: red; } @import 'b.css' print;\nh2 {}",
        );
        assert_eq!(s.text, "h1 { color: red; } \nh2 {}");
        assert_eq!(
            s.directives,
            vec![
                "@import url('a.css');".to_string(),
                "@import 'b.css' print;".to_string()
            ]
        );
    }

    #[test]
    fn bare_keyword_at_line_end_is_kept() {
        let s = strip_imports("a {} @import");
        assert_eq!(s.text, "a {} @import");
        assert!(s.directives.is_empty());
        assert_eq!(find_import("a {} @import"), None);
    }

    #[test]
    fn result_is_trimmed() {
        let s = strip_imports("  @import x;\n\n  b { c: d }  \n");
        assert_eq!(s.text, "b { c: d }");
    }

    #[test]
    fn find_import_reports_first_directive() {
        assert_eq!(
            find_import("a {}\r@import url(x.css);\n@import y;"),
            Some("@import url(x.css);")
        );
        assert_eq!(find_import("a { b: c }"), None);
    }

    #[test]
    fn handles_multibyte_text() {
        let s = strip_imports("h1::before { content: 'é' }\u{2028}@import 'ü';");
        assert_eq!(s.text, "h1::before { content: 'é' }");
        assert_eq!(s.directives, vec!["@import 'ü';".to_string()]);
    }
}
