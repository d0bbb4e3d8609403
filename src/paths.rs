//! Path decomposition for placeholder resolution
//!
//! All functions here work on the string form of a path. The substitution
//! engine needs exact string semantics (prefix stripping, last-separator
//! splits) rather than `std::path` normalization, so these stay at the
//! string level on purpose.

/// Sentinel standing in for an unresolved or erroneous value.
pub const UNKNOWN: &str = "Unknown";

/// Platform path separator used when decomposing.
pub const SEPARATOR: char = std::path::MAIN_SEPARATOR;

/// Path relative to `root`, with the prefix and one separator removed.
/// Returns [`UNKNOWN`] when `root` is not a prefix of `file`.
pub fn relative_to(file: &str, root: &str) -> String {
    if file.starts_with(root) {
        file.get(root.len() + 1..).unwrap_or("").to_string()
    } else {
        UNKNOWN.to_string()
    }
}

/// Substring after the last separator, or `None` when the path has no
/// separator at all.
pub fn basename(path: &str) -> Option<&str> {
    path.rfind(SEPARATOR).map(|i| &path[i + 1..])
}

/// Splits a basename at its last `.` into (stem, extension-with-dot).
/// The extension is empty when there is no dot.
pub fn split_extension(basename: &str) -> (&str, &str) {
    match basename.rfind('.') {
        Some(i) => (&basename[..i], &basename[i..]),
        None => (basename, ""),
    }
}

/// `path` with the trailing separator and `basename` removed.
pub fn dirname<'a>(path: &'a str, basename: &str) -> &'a str {
    &path[..path.len().saturating_sub(basename.len() + 1)]
}

/// `relative` with the trailing separator and `basename` removed, but only
/// when `relative` actually ends with `basename`; otherwise `relative`
/// unchanged (it may be the [`UNKNOWN`] sentinel).
pub fn relative_dirname<'a>(relative: &'a str, basename: &str) -> &'a str {
    if relative.ends_with(basename) {
        &relative[..relative.len().saturating_sub(basename.len() + 1)]
    } else {
        relative
    }
}

/// Every derivation of the current file computed once per substitution
/// pass. `None` fields mean the derivation is not available for this path
/// (no separator), and the matching placeholders are left unexpanded.
#[derive(Debug, Clone)]
pub struct FileParts {
    pub file: String,
    pub relative_file: String,
    pub basename: Option<String>,
    pub basename_no_extension: Option<String>,
    pub extname: Option<String>,
    pub dirname: Option<String>,
    pub relative_dirname: Option<String>,
}

impl FileParts {
    /// `relative_file` is supplied by the caller because choosing the
    /// workspace root can involve error reporting.
    pub fn derive(file: &str, relative_file: String) -> Self {
        match basename(file) {
            None => Self {
                file: file.to_string(),
                relative_file,
                basename: None,
                basename_no_extension: None,
                extname: None,
                dirname: None,
                relative_dirname: None,
            },
            Some(base) => {
                let (stem, ext) = split_extension(base);
                let dir = dirname(file, base).to_string();
                let rel_dir = relative_dirname(&relative_file, base).to_string();
                Self {
                    file: file.to_string(),
                    relative_file,
                    basename: Some(base.to_string()),
                    basename_no_extension: Some(stem.to_string()),
                    extname: Some(ext.to_string()),
                    dirname: Some(dir),
                    relative_dirname: Some(rel_dir),
                }
            }
        }
    }
}
