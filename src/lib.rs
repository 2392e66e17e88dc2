//! # to-doc
//!
//! Collects the files of a directory tree into a single structured document
//! for feeding into a language model.
//!
//! ## Features
//!
//! - gitignore-style ignore rules, from a rules file or a built-in list
//! - Extension and line-count filters
//! - Notebook cleaning (outputs, execution counts and metadata removed)
//! - Deterministic, path-ordered output that is stable across runs
//!
//! ## Quick Start
//!
//! ```no_run
//! use to_doc::{Config, Pipeline};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::builder()
//!     .root_dir("./my-project")
//!     .max_lines(Some(2_000))
//!     .exclude_extension("log")
//!     .build()?;
//!
//! let summary = Pipeline::new(config)?.run()?;
//! println!("{} files, {} lines", summary.total_files(), summary.total_lines());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! Data flows strictly forward through four stages:
//! 1. **Ignore spec**: Compiles the exclusion rules
//! 2. **Walker**: Enumerates and filters candidate files
//! 3. **Reader**: Reads (and for notebooks, cleans) file content
//! 4. **Writer**: Emits the `<files>` document ordered by path

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod error;
mod file;
mod ignore_spec;
mod notebook;
mod pipeline;
mod reader;
mod walker;
mod writer;

pub use config::{Config, ConfigBuilder, DEFAULT_MAX_LINES};
pub use error::{Error, Result};
pub use file::{count_lines, normalize_extension, FileRecord};
pub use ignore_spec::{IgnoreSpec, RuleSource, DEFAULT_IGNORE_PATTERNS};
pub use notebook::{clean_notebook, is_notebook};
pub use pipeline::{Pipeline, RunSummary};
pub use reader::{read_content, try_read_content};
pub use walker::{Collection, Walker};
pub use writer::{render_file_block, DocumentWriter};

/// Runs the complete pipeline with the given configuration.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the output document
/// cannot be written.
///
/// # Examples
///
/// ```no_run
/// use to_doc::{Config, run};
///
/// # fn main() -> anyhow::Result<()> {
/// let config = Config::builder()
///     .root_dir(".")
///     .dry_run(true)
///     .build()?;
///
/// run(config)?.print_dry_run();
/// # Ok(())
/// # }
/// ```
pub fn run(config: Config) -> Result<RunSummary> {
    Pipeline::new(config)?.run()
}
