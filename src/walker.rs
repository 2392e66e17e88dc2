//! Tree walking and per-file filtering.

use crate::{
    config::Config,
    file::{dotted_extension, relative_path_string, FileRecord},
    ignore_spec::IgnoreSpec,
    reader::read_content,
};
use ignore::{DirEntry, WalkBuilder, WalkState};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, trace, warn};

/// Outcome of visiting one walk entry.
#[derive(Debug)]
enum Visit {
    Collected(FileRecord),
    FilteredBySize,
    FilteredByExtension,
    Skipped,
    Failed,
}

/// Running counts gathered while walking.
#[derive(Debug, Default)]
struct Tally {
    records: Vec<FileRecord>,
    filtered_by_size: usize,
    filtered_by_extension: usize,
    skipped: usize,
    errors: usize,
}

impl Tally {
    fn add(&mut self, visit: Visit) {
        match visit {
            Visit::Collected(record) => self.records.push(record),
            Visit::FilteredBySize => self.filtered_by_size += 1,
            Visit::FilteredByExtension => self.filtered_by_extension += 1,
            Visit::Skipped => self.skipped += 1,
            Visit::Failed => self.errors += 1,
        }
    }
}

/// Files collected from one walk, biggest first.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// Records ordered by descending line count, ties by ascending path
    pub records: Vec<FileRecord>,

    /// Sum of line counts over all records
    pub total_lines: usize,

    /// Number of records
    pub total_files: usize,

    /// Files dropped for exceeding the line limit
    pub filtered_by_size: usize,

    /// Files dropped for an excluded extension
    pub filtered_by_extension: usize,
}

impl Collection {
    /// Builds a collection from unordered records.
    #[must_use]
    pub fn new(mut records: Vec<FileRecord>) -> Self {
        records.sort_by(FileRecord::cmp_by_size_desc);
        let total_lines = records.iter().map(|r| r.line_count).sum();
        let total_files = records.len();

        Self {
            records,
            total_lines,
            total_files,
            filtered_by_size: 0,
            filtered_by_extension: 0,
        }
    }

    /// Returns true if nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Walks a directory tree and collects the files that pass every filter.
pub struct Walker {
    root: PathBuf,
    spec: Arc<IgnoreSpec>,
    max_lines: Option<usize>,
    excluded_extensions: BTreeSet<String>,
    threads: usize,
    output_path: Option<PathBuf>,
}

impl Walker {
    /// Creates a walker from configuration and a resolved ignore spec.
    #[must_use]
    pub fn new(config: &Config, spec: IgnoreSpec) -> Self {
        Self {
            root: config.root_dir.clone(),
            spec: Arc::new(spec),
            max_lines: config.max_lines,
            excluded_extensions: config.excluded_extensions.clone(),
            threads: config.threads,
            output_path: fs::canonicalize(config.output_path()).ok(),
        }
    }

    /// Walks the root directory.
    ///
    /// Per-entry failures are reported as warnings and the entry is left
    /// out; the walk itself never fails.
    pub fn walk(&self) -> Collection {
        debug!(
            "Walking {} with {} thread(s)",
            self.root.display(),
            self.threads
        );

        let mut builder = WalkBuilder::new(&self.root);
        builder
            .standard_filters(false)
            .follow_links(false)
            .skip_stdout(true);

        if !self.spec.has_negations() {
            let spec = Arc::clone(&self.spec);
            let root = self.root.clone();
            builder.filter_entry(move |entry| !is_ignored_dir(entry, &root, &spec));
        }

        let tally = if self.threads > 1 {
            self.walk_parallel(&mut builder)
        } else {
            self.walk_sequential(&builder)
        };

        if tally.errors > 0 {
            warn!("Encountered {} errors during the walk (non-fatal)", tally.errors);
        }
        if tally.filtered_by_size > 0 {
            if let Some(limit) = self.max_lines {
                info!(
                    "Filtered out {} files with more than {} lines",
                    tally.filtered_by_size, limit
                );
            }
        }
        if tally.filtered_by_extension > 0 {
            info!(
                "Filtered out {} files by extension",
                tally.filtered_by_extension
            );
        }
        debug!(
            "Walk complete: {} collected, {} skipped",
            tally.records.len(),
            tally.skipped
        );

        let mut collection = Collection::new(tally.records);
        collection.filtered_by_size = tally.filtered_by_size;
        collection.filtered_by_extension = tally.filtered_by_extension;
        collection
    }

    fn walk_sequential(&self, builder: &WalkBuilder) -> Tally {
        let mut tally = Tally::default();
        for result in builder.build() {
            tally.add(self.visit_result(result));
        }
        tally
    }

    fn walk_parallel(&self, builder: &mut WalkBuilder) -> Tally {
        let tally = Mutex::new(Tally::default());

        builder.threads(self.threads).build_parallel().run(|| {
            let tally = &tally;
            Box::new(move |result| {
                let visit = self.visit_result(result);
                tally
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .add(visit);
                WalkState::Continue
            })
        });

        tally.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn visit_result(&self, result: Result<DirEntry, ignore::Error>) -> Visit {
        match result {
            Ok(entry) => self.visit(&entry),
            Err(e) => {
                warn!("Walk error: {}", e);
                Visit::Failed
            }
        }
    }

    /// Applies every filter to a single entry and reads it if it survives.
    fn visit(&self, entry: &DirEntry) -> Visit {
        let path = entry.path();
        let Ok(relative) = path.strip_prefix(&self.root) else {
            return Visit::Skipped;
        };
        if relative.as_os_str().is_empty() {
            return Visit::Skipped;
        }

        let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
        if self.spec.is_ignored(relative, is_dir) {
            trace!("Ignored: {}", relative.display());
            return Visit::Skipped;
        }

        match is_regular_file(entry) {
            Ok(true) => {}
            Ok(false) => return Visit::Skipped,
            Err(e) => {
                warn!("Couldn't process {}: {}", path.display(), e);
                return Visit::Failed;
            }
        }

        if self.is_output(path) {
            debug!("Skipping output document: {}", path.display());
            return Visit::Skipped;
        }

        if self.has_excluded_extension(path) {
            return Visit::FilteredByExtension;
        }

        let content = read_content(path);
        let record = FileRecord::new(
            path.to_path_buf(),
            relative_path_string(path, &self.root),
            content,
        );

        if self.max_lines.is_some_and(|limit| record.line_count > limit) {
            debug!("Over line limit: {}", record);
            return Visit::FilteredBySize;
        }

        if record.is_empty() {
            return Visit::Skipped;
        }

        trace!("Collected {}", record);
        Visit::Collected(record)
    }

    fn is_output(&self, path: &Path) -> bool {
        let Some(output) = &self.output_path else {
            return false;
        };
        if path.file_name() != output.file_name() {
            return false;
        }
        fs::canonicalize(path).is_ok_and(|p| &p == output)
    }

    fn has_excluded_extension(&self, path: &Path) -> bool {
        !self.excluded_extensions.is_empty()
            && dotted_extension(path).is_some_and(|ext| self.excluded_extensions.contains(&ext))
    }
}

/// Regular files, plus symlinks that resolve to one.
fn is_regular_file(entry: &DirEntry) -> std::io::Result<bool> {
    match entry.file_type() {
        Some(ft) if ft.is_file() => Ok(true),
        Some(ft) if ft.is_symlink() => fs::metadata(entry.path()).map(|m| m.is_file()),
        _ => Ok(false),
    }
}

fn is_ignored_dir(entry: &DirEntry, root: &Path, spec: &IgnoreSpec) -> bool {
    entry.file_type().is_some_and(|ft| ft.is_dir())
        && entry
            .path()
            .strip_prefix(root)
            .is_ok_and(|rel| spec.is_ignored(rel, true))
}
