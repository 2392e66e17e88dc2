use crate::{
    config::Config,
    error::Result,
    ignore_spec::{IgnoreSpec, DEFAULT_IGNORE_PATTERNS},
    walker::{Collection, Walker},
    writer::DocumentWriter,
};
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, instrument};

/// Outcome of one pipeline run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Files that passed every filter, biggest first
    pub collection: Collection,

    /// Output document path
    pub output_path: PathBuf,

    /// Whether this was a dry run
    pub dry_run: bool,

    /// Number of file blocks written (0 on a dry run)
    pub files_written: usize,

    /// Line limit in effect
    pub max_lines: Option<usize>,

    /// Extensions that were excluded
    pub excluded_extensions: BTreeSet<String>,

    /// Total execution time
    pub duration: Duration,
}

impl RunSummary {
    /// Sum of line counts over collected files.
    #[must_use]
    pub const fn total_lines(&self) -> usize {
        self.collection.total_lines
    }

    /// Number of collected files.
    #[must_use]
    pub const fn total_files(&self) -> usize {
        self.collection.total_files
    }

    /// Renders the dry-run listing: each file with its line count, biggest
    /// first, followed by totals and the settings in effect.
    #[must_use]
    pub fn dry_run_report(&self) -> String {
        let mut report = String::from("Dry run, listing files that would be included:\n\n");
        for record in &self.collection.records {
            let _ = writeln!(report, "{record}");
        }

        let _ = writeln!(report, "\nTotal lines: {}", self.total_lines());
        let _ = writeln!(report, "Total files: {}", self.total_files());
        match self.max_lines {
            Some(limit) => {
                let _ = writeln!(report, "Max lines per file: {limit}");
            }
            None => report.push_str("Max lines per file: No limit\n"),
        }
        if !self.excluded_extensions.is_empty() {
            let exts: Vec<&str> = self.excluded_extensions.iter().map(String::as_str).collect();
            let _ = writeln!(report, "Excluded extensions: {}", exts.join(", "));
        }
        let _ = writeln!(report, "Output file: {}", self.output_path.display());
        report
    }

    /// Prints the dry-run listing to stdout.
    pub fn print_dry_run(&self) {
        print!("{}", self.dry_run_report());
    }
}

/// Runs the resolver, walker and writer in sequence.
pub struct Pipeline {
    config: Config,
    writer: DocumentWriter,
}

impl Pipeline {
    /// Creates a new pipeline with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            writer: DocumentWriter::new(),
        })
    }

    /// Executes the pipeline and returns a summary.
    ///
    /// # Process
    ///
    /// 1. **Resolve**: Builds the ignore spec from the rules file or defaults
    /// 2. **Walk**: Collects and filters files under the root directory
    /// 3. **Write**: Emits the output document (skipped on a dry run)
    ///
    /// # Errors
    ///
    /// Returns an error if the output document cannot be written.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use to_doc::{Config, Pipeline};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let config = Config::builder()
    ///     .root_dir("./src")
    ///     .dry_run(true)
    ///     .build()?;
    ///
    /// let summary = Pipeline::new(config)?.run()?;
    /// summary.print_dry_run();
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self), fields(root_dir = %self.config.root_dir.display()))]
    pub fn run(self) -> Result<RunSummary> {
        let start_time = Instant::now();

        let spec = IgnoreSpec::resolve(self.config.ignore_file.as_deref(), DEFAULT_IGNORE_PATTERNS);
        let collection = Walker::new(&self.config, spec).walk();
        let output_path = self.config.output_path();

        let files_written = if self.config.dry_run {
            0
        } else {
            info!(
                "Writing {} files with {} lines to {}",
                collection.total_files,
                collection.total_lines,
                output_path.display()
            );
            self.writer.write(&collection.records, &output_path)?
        };

        let duration = start_time.elapsed();
        info!(
            "Collected {} files in {:.2}s",
            collection.total_files,
            duration.as_secs_f64()
        );

        Ok(RunSummary {
            collection,
            output_path,
            dry_run: self.config.dry_run,
            files_written,
            max_lines: self.config.max_lines,
            excluded_extensions: self.config.excluded_extensions,
            duration,
        })
    }
}
