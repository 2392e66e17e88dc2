use crate::error::{Error, Result};
use crate::file::normalize_extension;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Line limit applied when none is configured explicitly on the CLI.
pub const DEFAULT_MAX_LINES: usize = 2_000;

const OUTPUT_SUFFIX: &str = "-llms";
const DEFAULT_OUTPUT_EXTENSION: &str = "txt";

/// Configuration for a single collection run.
///
/// Use [`Config::builder()`] to construct a new configuration.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// Root directory to collect files from
    pub root_dir: PathBuf,

    /// Explicit output document path
    pub output_path: Option<PathBuf>,

    /// Files with more lines than this are skipped (`None` disables)
    pub max_lines: Option<usize>,

    /// Lowercase, dot-prefixed extensions to skip
    pub excluded_extensions: BTreeSet<String>,

    /// Rules file overriding the built-in ignore list
    pub ignore_file: Option<PathBuf>,

    /// Dry run mode (list files, write nothing)
    pub dry_run: bool,

    /// Worker threads for the walk and read stage
    pub threads: usize,
}

impl Config {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use to_doc::Config;
    ///
    /// let config = Config::builder()
    ///     .root_dir(".")
    ///     .max_lines(Some(500))
    ///     .exclude_extension("log")
    ///     .build()
    ///     .expect("valid configuration");
    ///
    /// assert!(config.excluded_extensions.contains(".log"));
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Root directory doesn't exist or is not a directory
    /// - The line limit is zero
    /// - The thread count is zero
    pub fn validate(&self) -> Result<()> {
        if !self.root_dir.exists() {
            return Err(Error::config(format!(
                "Root directory does not exist: {}",
                self.root_dir.display()
            )));
        }

        if !self.root_dir.is_dir() {
            return Err(Error::config(format!(
                "Root path is not a directory: {}",
                self.root_dir.display()
            )));
        }

        if self.max_lines == Some(0) {
            return Err(Error::config(
                "max_lines must be greater than 0 (use no limit to disable filtering)",
            ));
        }

        if self.threads == 0 {
            return Err(Error::config("threads must be greater than 0"));
        }

        if self.excluded_extensions.iter().any(|ext| ext.len() < 2) {
            return Err(Error::config("excluded extensions must not be empty"));
        }

        Ok(())
    }

    /// Returns the output document path.
    ///
    /// Defaults to `<root>/<root-name>-llms.txt`. An explicit path without an
    /// extension gets `.txt` appended.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        match &self.output_path {
            Some(path) if path.extension().is_none() => {
                path.with_extension(DEFAULT_OUTPUT_EXTENSION)
            }
            Some(path) => path.clone(),
            None => default_output_path(&self.root_dir),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            output_path: None,
            max_lines: Some(DEFAULT_MAX_LINES),
            excluded_extensions: BTreeSet::new(),
            ignore_file: None,
            dry_run: false,
            threads: num_cpus::get(),
        }
    }
}

/// Default output path based on the root directory's name.
fn default_output_path(root: &Path) -> PathBuf {
    let name = fs::canonicalize(root)
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "root".to_string());

    root.join(format!("{name}{OUTPUT_SUFFIX}.{DEFAULT_OUTPUT_EXTENSION}"))
}

/// Builder for creating a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    root_dir: Option<PathBuf>,
    output_path: Option<PathBuf>,
    max_lines: Option<Option<usize>>,
    excluded_extensions: Vec<String>,
    ignore_file: Option<PathBuf>,
    dry_run: bool,
    threads: Option<usize>,
}

impl ConfigBuilder {
    /// Sets the root directory to collect.
    #[must_use]
    pub fn root_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.root_dir = Some(path.into());
        self
    }

    /// Sets the output document path.
    #[must_use]
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Sets the per-file line limit; `None` disables it.
    #[must_use]
    pub fn max_lines(mut self, limit: Option<usize>) -> Self {
        self.max_lines = Some(limit);
        self
    }

    /// Adds an extension to skip. Accepts `log`, `.log` or `.LOG`.
    #[must_use]
    pub fn exclude_extension(mut self, ext: impl Into<String>) -> Self {
        self.excluded_extensions.push(ext.into());
        self
    }

    /// Adds several extensions to skip.
    #[must_use]
    pub fn exclude_extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_extensions.extend(exts.into_iter().map(Into::into));
        self
    }

    /// Sets a rules file that replaces the built-in ignore list.
    #[must_use]
    pub fn ignore_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.ignore_file = Some(path.into());
        self
    }

    /// Enables dry run mode (no file writes).
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Sets the worker thread count; `1` walks sequentially.
    #[must_use]
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an extension is empty or validation fails.
    pub fn build(self) -> Result<Config> {
        let mut excluded_extensions = BTreeSet::new();
        for ext in &self.excluded_extensions {
            let normalized = normalize_extension(ext)
                .ok_or_else(|| Error::config(format!("Invalid extension to exclude: '{ext}'")))?;
            excluded_extensions.insert(normalized);
        }

        let config = Config {
            root_dir: self.root_dir.unwrap_or_else(|| PathBuf::from(".")),
            output_path: self.output_path,
            max_lines: self.max_lines.unwrap_or(Some(DEFAULT_MAX_LINES)),
            excluded_extensions,
            ignore_file: self.ignore_file,
            dry_run: self.dry_run,
            threads: self.threads.unwrap_or_else(num_cpus::get),
        };

        config.validate()?;
        Ok(config)
    }
}
