use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use to_doc::{Config, Pipeline, DEFAULT_MAX_LINES};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "to-doc",
    version,
    author,
    about = "Collect a directory tree into a single document for LLM prompts",
    long_about = "Collect a directory tree into a single document for LLM prompts.\n\n\
    Walks DIRECTORY, skips paths matched by the ignore rules, and writes every \
    remaining text file into one <files> document ordered by path. Notebooks \
    are cleaned of outputs and execution counts before inclusion.\n\n\
    USAGE EXAMPLES:\n  \
      # Collect the current directory\n  \
      to-doc\n\n  \
      # Preview what would be included\n  \
      to-doc ./my-project --dry\n\n  \
      # Skip logs and lift the line limit\n  \
      to-doc ./my-project --exclude .log --no-limit -o bundle.txt"
)]
struct Cli {
    /// Root directory to collect
    #[arg(default_value = ".", value_name = "DIRECTORY")]
    directory: PathBuf,

    /// Output document path (default: <DIRECTORY>/<name>-llms.txt)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Lists the files that will be included without writing anything
    #[arg(long)]
    dry: bool,

    /// Maximum number of lines per file (files exceeding this are filtered out)
    #[arg(long, default_value_t = DEFAULT_MAX_LINES, value_name = "N")]
    max_lines: usize,

    /// Disable line limit filtering
    #[arg(long)]
    no_limit: bool,

    /// File extensions to exclude (e.g., --exclude .pyc --exclude log)
    #[arg(long, value_name = "EXT")]
    exclude: Vec<String>,

    /// Rules file replacing the built-in ignore list (gitignore syntax)
    #[arg(long, env = "TO_DOC_IGNORE_FILE", value_name = "FILE")]
    ignore_file: Option<PathBuf>,

    /// Worker threads for reading files (1 = sequential)
    #[arg(long, value_name = "N")]
    threads: Option<usize>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose);

    let mut builder = Config::builder()
        .root_dir(cli.directory)
        .max_lines((!cli.no_limit).then_some(cli.max_lines))
        .exclude_extensions(cli.exclude)
        .dry_run(cli.dry);

    if let Some(output) = cli.output {
        builder = builder.output_path(output);
    }

    if let Some(ignore_file) = cli.ignore_file {
        builder = builder.ignore_file(ignore_file);
    }

    if let Some(threads) = cli.threads {
        builder = builder.threads(threads);
    }

    let config = builder.build().context("Failed to build configuration")?;

    let summary = Pipeline::new(config)
        .context("Failed to create pipeline")?
        .run()
        .context("Pipeline execution failed")?;

    if summary.dry_run {
        summary.print_dry_run();
    }

    Ok(())
}

/// Diagnostics go to stderr so they never mix with the document or the
/// dry-run listing.
fn setup_tracing(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbosity {
        0 => EnvFilter::new("to_doc=info"),
        1 => EnvFilter::new("to_doc=debug"),
        _ => EnvFilter::new("to_doc=trace"),
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false),
        )
        .init();
}
