//! `${...}` placeholder matching
//!
//! A placeholder pattern is a name, optionally embedding a regex with at
//! most one capturing group (e.g. `env:(.+?)`). The matcher wraps it in
//! the literal `${` / `}` frame and rewrites every non-overlapping
//! occurrence left to right.

use regex::{Captures, Regex};

/// Compiles the frame around a placeholder name pattern.
pub fn placeholder_regex(name_pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"\$\{{{name_pattern}\}}"))
}

/// Replaces every occurrence, invoking `replacement` with the full match
/// and the capture (when the pattern has one). No match returns the text
/// unchanged.
pub fn replace_all<F>(re: &Regex, text: &str, mut replacement: F) -> String
where
    F: FnMut(&str, Option<&str>) -> String,
{
    re.replace_all(text, |caps: &Captures<'_>| {
        let full = caps.get(0).map_or("", |m| m.as_str());
        let capture = caps.get(1).map(|m| m.as_str());
        replacement(full, capture)
    })
    .into_owned()
}

/// Literal replacement for every occurrence. Routed through the closure
/// form so `$` in the replacement stays literal.
pub fn replace_literal(re: &Regex, text: &str, replacement: &str) -> String {
    replace_all(re, text, |_, _| replacement.to_string())
}
