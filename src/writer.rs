//! Rendering of the `<files>` document.
//!
//! Blocks are ordered by relative path and every file is read again at
//! write time, so the document reflects the tree as it is when written.

use crate::{
    error::{Error, Result},
    file::{lines_inclusive, FileRecord},
    reader::read_content,
};
use std::{
    fs,
    io::{BufWriter, Write},
    path::Path,
};
use tracing::{debug, info};

const ROOT_OPEN: &str = "<files>\n";
const ROOT_CLOSE: &str = "</files>";
const CONTENT_INDENT: &str = "      ";

/// Serializes collected files into the nested-tag output document.
///
/// ```text
/// <files>
///   <file>
///     <path>src/main.rs</path>
///     <content>
///       fn main() {}
///
///     </content>
///   </file>
/// </files>
/// ```
#[derive(Debug, Default)]
pub struct DocumentWriter;

impl DocumentWriter {
    /// Creates a new document writer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Writes the document for `records` to `output`.
    ///
    /// Records are emitted in byte order of their relative path. Content is
    /// read fresh from disk; files that now read as empty are left out.
    /// A failure midway leaves a truncated file behind.
    ///
    /// Returns the number of file blocks written.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be created or written.
    pub fn write(&self, records: &[FileRecord], output: &Path) -> Result<usize> {
        let file = fs::File::create(output).map_err(|e| Error::io(output, e))?;
        let mut out = BufWriter::new(file);

        let written = self
            .write_to(records, &mut out)
            .map_err(|e| Error::io(output, e))?;
        out.flush().map_err(|e| Error::io(output, e))?;

        info!("Wrote {} files to {}", written, output.display());
        Ok(written)
    }

    /// Writes the document to any sink.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by the sink.
    pub fn write_to<W: Write>(&self, records: &[FileRecord], out: &mut W) -> std::io::Result<usize> {
        let mut ordered: Vec<&FileRecord> = records.iter().collect();
        ordered.sort_by(|a, b| a.relative_path.as_bytes().cmp(b.relative_path.as_bytes()));

        out.write_all(ROOT_OPEN.as_bytes())?;

        let mut written = 0;
        for record in ordered {
            let content = read_content(&record.absolute_path);
            if content.is_empty() {
                debug!("Skipping now-empty file: {}", record.relative_path);
                continue;
            }
            out.write_all(render_file_block(&record.relative_path, &content).as_bytes())?;
            written += 1;
        }

        out.write_all(ROOT_CLOSE.as_bytes())?;
        Ok(written)
    }
}

/// Renders one `<file>` block, indented for placement under `<files>`.
#[must_use]
pub fn render_file_block(relative_path: &str, content: &str) -> String {
    let mut block = String::with_capacity(content.len() + content.len() / 8 + 96);
    block.push_str("  <file>\n");
    block.push_str("    <path>");
    block.push_str(relative_path);
    block.push_str("</path>\n");
    block.push_str("    <content>\n");
    block.push_str(&indent(content, CONTENT_INDENT));
    block.push('\n');
    block.push_str("    </content>\n");
    block.push_str("  </file>\n");
    block
}

/// Prefixes every line that is not whitespace-only.
fn indent(text: &str, prefix: &str) -> String {
    let mut out = String::with_capacity(text.len() + prefix.len() * 16);
    for line in lines_inclusive(text) {
        if !line.trim_matches(is_blank).is_empty() {
            out.push_str(prefix);
        }
        out.push_str(line);
    }
    out
}

fn is_blank(c: char) -> bool {
    c.is_whitespace() || ('\x1c'..='\x1f').contains(&c)
}
