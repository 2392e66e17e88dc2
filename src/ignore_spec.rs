//! Ignore rules deciding which paths are left out of the collection.
//!
//! Patterns use gitignore syntax and are matched against paths relative to
//! the collection root. Later patterns override earlier ones and `!pattern`
//! re-includes a path.

use crate::error::{Error, Result};
use ignore::gitignore::{Gitignore, GitignoreBuilder, Glob};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Built-in exclusion list used when no rules file is supplied or readable.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    // Version control
    ".git/",
    ".hg/",
    ".svn/",
    // Dependency caches and virtual environments
    "node_modules/",
    "bower_components/",
    ".venv/",
    "venv/",
    ".tox/",
    // Build and tool caches
    "__pycache__/",
    "*.pyc",
    ".mypy_cache/",
    ".pytest_cache/",
    ".ruff_cache/",
    ".ipynb_checkpoints/",
    "target/",
    ".DS_Store",
    // Lock files
    "*.lock",
    "package-lock.json",
    "pnpm-lock.yaml",
    // Our own output
    "*-llms.txt",
    "*-llms.log",
];

/// Where the active rule set came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    /// The built-in default list
    BuiltIn,
    /// An external rules file
    File(PathBuf),
}

/// Compiled, immutable set of gitignore-style exclusion rules.
#[derive(Debug, Clone)]
pub struct IgnoreSpec {
    matcher: Gitignore,
    patterns: Vec<String>,
    source: RuleSource,
}

impl IgnoreSpec {
    /// Resolves the active rule set.
    ///
    /// A readable, well-formed rules file wins; any failure to read or
    /// compile it falls back to `defaults` with a warning. Never fails.
    pub fn resolve(rules_file: Option<&Path>, defaults: &[&str]) -> Self {
        if let Some(path) = rules_file {
            match Self::from_rules_file(path) {
                Ok(spec) => {
                    debug!(
                        "Loaded {} ignore patterns from {}",
                        spec.patterns.len(),
                        path.display()
                    );
                    return spec;
                }
                Err(e) => warn!("{e}; falling back to built-in ignore patterns"),
            }
        }

        match Self::from_patterns(defaults) {
            Ok(spec) => spec,
            Err(e) => {
                warn!("Built-in ignore patterns failed to compile: {e}");
                Self::empty()
            }
        }
    }

    /// Compiles the rules found in a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, or contains a
    /// malformed pattern.
    pub fn from_rules_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::ignore_rules(path, e.to_string()))?;
        let mut spec = Self::compile(parse_rules(&text), path)?;
        spec.source = RuleSource::File(path.to_path_buf());
        Ok(spec)
    }

    /// Compiles an in-memory pattern list.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern is not valid gitignore syntax.
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns.iter().map(|p| p.as_ref().to_string()).collect();
        Self::compile(patterns, Path::new("<built-in>"))
    }

    /// A rule set that ignores nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            matcher: Gitignore::empty(),
            patterns: Vec::new(),
            source: RuleSource::BuiltIn,
        }
    }

    fn compile(patterns: Vec<String>, origin: &Path) -> Result<Self> {
        let mut builder = GitignoreBuilder::new(".");
        for pattern in &patterns {
            builder
                .add_line(None, pattern)
                .map_err(|e| Error::ignore_rules(origin, e.to_string()))?;
        }
        let matcher = builder
            .build()
            .map_err(|e| Error::ignore_rules(origin, e.to_string()))?;

        Ok(Self {
            matcher,
            patterns,
            source: RuleSource::BuiltIn,
        })
    }

    /// Returns true if a root-relative path is excluded, either directly or
    /// through one of its parent directories.
    ///
    /// The path and each of its ancestors are matched separately; whichever
    /// match comes from the latest pattern decides.
    #[must_use]
    pub fn is_ignored(&self, relative_path: &Path, is_dir: bool) -> bool {
        if relative_path.as_os_str().is_empty() {
            return false;
        }

        let own = self.last_match(relative_path, is_dir);
        if relative_path.has_root() {
            return own.is_some_and(|(_, ignore)| ignore);
        }

        relative_path
            .ancestors()
            .skip(1)
            .take_while(|parent| !parent.as_os_str().is_empty())
            .filter_map(|parent| self.last_match(parent, true))
            .chain(own)
            .max_by_key(|&(rank, _)| rank)
            .is_some_and(|(_, ignore)| ignore)
    }

    /// Rank and verdict of the latest pattern matching exactly this path.
    fn last_match(&self, path: &Path, is_dir: bool) -> Option<(usize, bool)> {
        let matched = self.matcher.matched(path, is_dir);
        matched
            .inner()
            .map(|glob| (self.rank(glob), matched.is_ignore()))
    }

    /// Position of a compiled glob in the pattern list.
    fn rank(&self, glob: &Glob) -> usize {
        self.patterns
            .iter()
            .rposition(|p| p == glob.original() || p.trim_end() == glob.original())
            .unwrap_or(0)
    }

    /// Returns true if any pattern re-includes paths with `!`.
    ///
    /// Ignored directories may only be pruned from the walk when this is
    /// false, since a negation could re-include something below them.
    #[must_use]
    pub fn has_negations(&self) -> bool {
        self.matcher.num_whitelists() > 0
    }

    /// Patterns in the order they were compiled.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Where the rules came from.
    #[must_use]
    pub const fn source(&self) -> &RuleSource {
        &self.source
    }
}

/// Extracts patterns from rules-file text: trimmed, blank lines and `#`
/// comments dropped, file order kept.
fn parse_rules(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToString::to_string)
        .collect()
}
