use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

/// One candidate file collected from the tree.
///
/// Identity and ordering are defined by the path; `content` is carried along
/// for the dry-run view but never compared.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Path to the file as produced by the walk (root joined)
    pub absolute_path: PathBuf,

    /// Path relative to the root directory, `/`-separated
    pub relative_path: String,

    /// Number of lines in the (possibly cleaned) content
    pub line_count: usize,

    /// Content after cleaning
    pub content: String,
}

impl FileRecord {
    /// Creates a record, computing the line count from the content.
    #[must_use]
    pub fn new(absolute_path: PathBuf, relative_path: String, content: String) -> Self {
        let line_count = count_lines(&content);
        Self {
            absolute_path,
            relative_path,
            line_count,
            content,
        }
    }

    /// Returns true if the record contributes no lines.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.line_count == 0
    }

    /// Orders records biggest first, ties broken by ascending relative path.
    #[must_use]
    pub fn cmp_by_size_desc(&self, other: &Self) -> Ordering {
        other
            .line_count
            .cmp(&self.line_count)
            .then_with(|| self.relative_path.cmp(&other.relative_path))
    }
}

impl PartialEq for FileRecord {
    fn eq(&self, other: &Self) -> bool {
        self.relative_path == other.relative_path
    }
}

impl Eq for FileRecord {}

impl fmt::Display for FileRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} lines)", self.relative_path, self.line_count)
    }
}

/// Counts line-separator-delimited segments; a trailing break does not
/// open a new line.
///
/// Besides `\n` and `\r\n`, a lone `\r`, vertical tab, form feed, the
/// `\x1c`..`\x1e` separators, NEL and the Unicode line and paragraph
/// separators all end a line.
#[must_use]
pub fn count_lines(content: &str) -> usize {
    lines_inclusive(content).count()
}

const fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r'
            | '\x0b'
            | '\x0c'
            | '\x1c'
            | '\x1d'
            | '\x1e'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}

/// Splits text into lines, each keeping its terminator. `\r\n` is a single
/// break.
pub(crate) fn lines_inclusive(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let end = match rest.char_indices().find(|&(_, c)| is_line_break(c)) {
            Some((i, '\r')) if rest[i + 1..].starts_with('\n') => i + 2,
            Some((i, c)) => i + c.len_utf8(),
            None => rest.len(),
        };
        let (line, tail) = rest.split_at(end);
        rest = tail;
        Some(line)
    })
}

/// Renders a relative path with `/` separators regardless of platform.
#[must_use]
pub(crate) fn relative_path_string(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).map_or_else(
        |_| pathdiff::diff_paths(path, root).unwrap_or_else(|| path.to_path_buf()),
        Path::to_path_buf,
    );
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Normalizes a user supplied extension to lowercase with a leading dot.
///
/// Returns `None` for an empty extension.
#[must_use]
pub fn normalize_extension(ext: &str) -> Option<String> {
    let trimmed = ext.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!(".{}", trimmed.to_lowercase()))
}

/// Returns the lowercase `.ext` suffix of a path, if any.
#[must_use]
pub(crate) fn dotted_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}
