//! Heuristic function name detection for a single source line.
//!
//! No parsing happens here. Each line is matched against an ordered table of
//! declaration shapes and the first hit wins, so a line that fits several
//! shapes resolves to the earliest entry. The C-like fallback is broad on
//! purpose and will label some calls and declarations as functions.

use once_cell::sync::Lazy;
use regex::Regex;

/// Declaration shapes in priority order: `(dialect, pattern)`.
///
/// The function name is always the pattern's last capture group, which lets
/// a pattern carry optional modifier groups in front of the identifier.
/// `\w` and `\s` are ASCII-only here; see [`ascii_classes`].
const PATTERN_TABLE: &[(&str, &str)] = &[
    ("go", r"^\s*func\s+(\([^)]+\)\s*)?(\w+)\s*\("),
    ("python", r"^\s*def\s+(\w+)\s*\("),
    ("javascript", r"^\s*function\s+(\w+)\s*\("),
    ("javascript-arrow", r"^\s*(?:const|let|var)\s+(\w+)\s*=\s*\(.*?\)\s*=>"),
    ("javascript-expression", r"^\s*(\w+)\s*=\s*function\s*\("),
    ("php", r"^\s*(public|private|protected)?\s*function\s+(\w+)\s*\("),
    ("java", r"^\s*(public|private|protected)?\s*(static\s+)?[\w<>]+\s+(\w+)\s*\("),
    ("c", r"^\s*[\w\*\s]+\s+(\w+)\s*\(.*\)\s*\{?"),
    ("ruby", r"^\s*def\s+(\w+)"),
    ("rust", r"^\s*fn\s+(\w+)"),
    ("swift", r"^\s*func\s+(\w+)"),
    ("scala", r"^\s*def\s+(\w+)\s*\("),
];

/// One compiled entry of the pattern table.
#[derive(Debug)]
pub struct DialectPattern {
    /// Language family the shape was written for.
    pub dialect: &'static str,
    regex: Regex,
}

impl DialectPattern {
    /// Match a trimmed line, returning the last capture group on success.
    ///
    /// A matching pattern whose last group did not participate yields `""`.
    fn name_in<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.regex
            .captures(line)
            .map(|caps| caps.get(caps.len() - 1).map_or("", |m| m.as_str()))
    }
}

/// Rewrite `\w` and `\s` as their ASCII sets, inside or outside brackets.
///
/// Identifiers with non-ASCII letters are cut at the first such letter,
/// which can push a line onto a later, looser pattern or off the table
/// entirely. `\s` excludes vertical tab.
fn ascii_classes(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut in_class = false;
    let mut chars = pattern.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('w') if in_class => out.push_str("0-9A-Za-z_"),
                Some('w') => out.push_str("[0-9A-Za-z_]"),
                Some('s') if in_class => out.push_str(r"\t\n\f\r "),
                Some('s') => out.push_str(r"[\t\n\f\r ]"),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            // the table has no nested or escaped brackets
            '[' => {
                in_class = true;
                out.push(c);
            }
            ']' => {
                in_class = false;
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

static FUNCTION_PATTERNS: Lazy<Vec<DialectPattern>> = Lazy::new(|| {
    PATTERN_TABLE
        .iter()
        .map(|&(dialect, pattern)| DialectPattern {
            dialect,
            regex: Regex::new(&ascii_classes(pattern)).unwrap(),
        })
        .collect()
});

/// The compiled pattern table, in evaluation order.
#[must_use]
pub fn patterns() -> &'static [DialectPattern] {
    &FUNCTION_PATTERNS
}

/// Find the first pattern matching `line` and the name it captured.
#[must_use]
pub fn match_dialect(line: &str) -> Option<(&'static str, &str)> {
    let trimmed = line.trim();
    FUNCTION_PATTERNS
        .iter()
        .find_map(|p| p.name_in(trimmed).map(|name| (p.dialect, name)))
}

/// Extract the function name declared on `line`, or `""` when none is found.
#[must_use]
pub fn extract_function_name(line: &str) -> &str {
    match_dialect(line).map_or("", |(_, name)| name)
}
