//! Notebook cleaning.
//!
//! Strips the volatile parts of a notebook document (outputs, execution
//! counters, metadata) so that two runs over the same notebook sources
//! produce identical text.

use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{Map, Value};
use std::path::Path;

const NOTEBOOK_EXTENSION: &str = "ipynb";

/// Returns true if the path names a notebook document.
#[must_use]
pub fn is_notebook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(NOTEBOOK_EXTENSION))
}

/// Parses notebook text, clears volatile fields and re-serializes it.
///
/// Every cell loses its outputs, execution count and metadata; the document
/// loses its metadata. Keys are emitted sorted with one-space indentation and
/// a trailing newline.
///
/// # Errors
///
/// Returns an error if the text is not JSON or has no `cells` array.
pub fn clean_notebook(raw: &str, path: &Path) -> Result<String> {
    let mut doc: Value =
        serde_json::from_str(raw).map_err(|e| Error::notebook(path, e.to_string()))?;

    let root = doc
        .as_object_mut()
        .ok_or_else(|| Error::notebook(path, "top level is not an object"))?;

    let cells = root
        .get_mut("cells")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| Error::notebook(path, "missing `cells` array"))?;

    for cell in cells.iter_mut() {
        let cell = cell
            .as_object_mut()
            .ok_or_else(|| Error::notebook(path, "cell is not an object"))?;
        clean_cell(cell);
    }

    if root.contains_key("metadata") {
        root.insert("metadata".to_string(), Value::Object(Map::new()));
    }

    let mut out = Vec::with_capacity(raw.len());
    let mut ser = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b" "));
    doc.serialize(&mut ser)?;

    let mut text = String::from_utf8(out).map_err(|e| Error::notebook(path, e.to_string()))?;
    text.push('\n');
    Ok(text)
}

fn clean_cell(cell: &mut Map<String, Value>) {
    if cell.contains_key("outputs") {
        cell.insert("outputs".to_string(), Value::Array(Vec::new()));
    }
    if cell.contains_key("execution_count") {
        cell.insert("execution_count".to_string(), Value::Null);
    }
    cell.insert("metadata".to_string(), Value::Object(Map::new()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notebook(count: u64, output: &str, cell_meta: &str) -> String {
        format!(
            r##"{{
 "cells": [
  {{
   "cell_type": "markdown",
   "metadata": {{}},
   "source": ["# Title"]
  }},
  {{
   "cell_type": "code",
   "execution_count": {count},
   "metadata": {cell_meta},
   "outputs": [{{"output_type": "stream", "name": "stdout", "text": ["{output}"]}}],
   "source": ["print(1)"]
  }}
 ],
 "metadata": {{"kernelspec": {{"name": "python3"}}}},
 "nbformat": 4,
 "nbformat_minor": 5
}}"##
        )
    }

    #[test]
    fn test_is_notebook() {
        assert!(is_notebook(Path::new("a.ipynb")));
        assert!(is_notebook(Path::new("dir/A.IPYNB")));
        assert!(!is_notebook(Path::new("a.py")));
        assert!(!is_notebook(Path::new("ipynb")));
    }

    #[test]
    fn test_volatile_fields_removed() {
        let raw = notebook(7, "hello", r#"{"collapsed": true}"#);
        let cleaned = clean_notebook(&raw, Path::new("nb.ipynb")).unwrap();

        let value: Value = serde_json::from_str(&cleaned).unwrap();
        let code = &value["cells"][1];
        assert_eq!(code["execution_count"], Value::Null);
        assert_eq!(code["outputs"], Value::Array(vec![]));
        assert_eq!(code["metadata"], Value::Object(Map::new()));
        assert_eq!(code["source"][0], "print(1)");
        assert_eq!(value["metadata"], Value::Object(Map::new()));
        assert_eq!(value["nbformat"], 4);

        // Markdown cells never gain output fields
        assert!(value["cells"][0].get("outputs").is_none());
        assert_eq!(value["cells"][0]["source"][0], "# Title");
        assert!(!cleaned.contains("hello"));
        assert!(cleaned.ends_with("}\n"));
    }

    #[test]
    fn test_runs_differing_only_in_outputs_clean_identically() {
        let first = clean_notebook(&notebook(1, "a", "{}"), Path::new("x.ipynb")).unwrap();
        let second = clean_notebook(
            &notebook(42, "completely different", r#"{"scrolled": false}"#),
            Path::new("x.ipynb"),
        )
        .unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_one_space_indentation() {
        let cleaned = clean_notebook(r#"{"cells": [], "metadata": {"a": 1}}"#, Path::new("n.ipynb"))
            .unwrap();
        assert_eq!(cleaned, "{\n \"cells\": [],\n \"metadata\": {}\n}\n");
    }

    #[test]
    fn test_invalid_json_fails() {
        let err = clean_notebook("{not json", Path::new("bad.ipynb")).unwrap_err();
        assert!(err.to_string().contains("bad.ipynb"));
    }

    #[test]
    fn test_missing_cells_fails() {
        assert!(clean_notebook(r#"{"metadata": {}}"#, Path::new("n.ipynb")).is_err());
        assert!(clean_notebook("[1, 2]", Path::new("n.ipynb")).is_err());
        assert!(clean_notebook(r#"{"cells": [3]}"#, Path::new("n.ipynb")).is_err());
    }
}
