use assert_fs::prelude::*;
use std::fs;
use std::path::Path;
use to_doc::{Config, Pipeline};

fn run_into(root: &Path, output: &Path) -> to_doc::RunSummary {
    let config = Config::builder()
        .root_dir(root)
        .output_path(output)
        .build()
        .unwrap();
    Pipeline::new(config).unwrap().run().unwrap()
}

fn document_paths(doc: &str) -> Vec<&str> {
    doc.lines()
        .filter_map(|line| line.trim().strip_prefix("<path>"))
        .filter_map(|rest| rest.strip_suffix("</path>"))
        .collect()
}

fn notebook(count: u32, output: &str) -> String {
    format!(
        r#"{{"cells": [{{"cell_type": "code", "execution_count": {count}, "metadata": {{"tags": []}}, "outputs": [{{"output_type": "stream", "text": ["{output}"]}}], "source": ["x = 1"]}}], "metadata": {{"language_info": {{"version": "3.12"}}}}, "nbformat": 4, "nbformat_minor": 5}}"#
    )
}

#[test]
fn output_is_ordered_by_relative_path() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("zeta.txt").write_str("z\n").unwrap();
    temp.child("src/b.rs").write_str("b\nb\nb\n").unwrap();
    temp.child("src/a.rs").write_str("a\n").unwrap();
    temp.child("README.md").write_str("# readme\n\ntext\n").unwrap();
    temp.child("src.txt").write_str("s\n").unwrap();

    let out = assert_fs::TempDir::new().unwrap();
    let output = out.child("doc.txt");
    run_into(temp.path(), output.path());

    let doc = fs::read_to_string(output.path()).unwrap();
    let paths = document_paths(&doc);
    let mut sorted = paths.clone();
    sorted.sort_unstable();

    assert_eq!(paths, sorted);
    assert_eq!(paths, ["README.md", "src.txt", "src/a.rs", "src/b.rs", "zeta.txt"]);
}

#[test]
fn empty_files_never_appear() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("empty.txt").touch().unwrap();
    temp.child("blank_lines_only.txt").write_str("").unwrap();
    temp.child("real.txt").write_str("content\n").unwrap();

    let out = assert_fs::TempDir::new().unwrap();
    let output = out.child("doc.txt");
    run_into(temp.path(), output.path());

    let doc = fs::read_to_string(output.path()).unwrap();
    assert_eq!(document_paths(&doc), ["real.txt"]);
    assert!(!doc.contains("<content>\n\n    </content>"));
}

#[test]
fn repeated_runs_are_byte_identical() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("a.py").write_str("import os\n\n\nprint(os.name)\n").unwrap();
    temp.child("pkg/mod.rs").write_str("pub mod x;\n").unwrap();
    temp.child("nb.ipynb").write_str(&notebook(5, "out")).unwrap();

    // Output inside the root with a name the default rules don't cover
    let output = temp.child("bundle.xml");
    run_into(temp.path(), output.path());
    let first = fs::read(output.path()).unwrap();

    let summary = run_into(temp.path(), output.path());
    let second = fs::read(output.path()).unwrap();

    assert_eq!(first, second);
    assert_eq!(summary.total_files(), 3);
}

#[test]
fn notebooks_differing_only_in_outputs_render_identically() {
    let first = assert_fs::TempDir::new().unwrap();
    first.child("nb.ipynb").write_str(&notebook(1, "alpha")).unwrap();
    let second = assert_fs::TempDir::new().unwrap();
    second.child("nb.ipynb").write_str(&notebook(99, "beta gamma")).unwrap();

    let out = assert_fs::TempDir::new().unwrap();
    run_into(first.path(), out.child("one.txt").path());
    run_into(second.path(), out.child("two.txt").path());

    let one = fs::read_to_string(out.child("one.txt").path()).unwrap();
    let two = fs::read_to_string(out.child("two.txt").path()).unwrap();

    assert_eq!(one, two);
    assert!(one.contains("\"execution_count\": null"));
    assert!(!one.contains("alpha"));
}

#[test]
fn dry_run_scenario() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("a.txt").write_str("1\n2\n3\n").unwrap();
    temp.child("b.py").write_str("1\n2\n3\n4\n5\n").unwrap();
    temp.child(".git/config").write_str("[core]\n\tbare = false\n").unwrap();

    let config = Config::builder()
        .root_dir(temp.path())
        .dry_run(true)
        .build()
        .unwrap();
    let summary = Pipeline::new(config).unwrap().run().unwrap();

    assert_eq!(summary.total_files(), 2);
    assert_eq!(summary.total_lines(), 8);
    let listed: Vec<&str> = summary
        .collection
        .records
        .iter()
        .map(|r| r.relative_path.as_str())
        .collect();
    assert_eq!(listed, ["b.py", "a.txt"]);
    assert!(!summary.output_path.exists());
}

#[test]
fn undecodable_file_is_excluded_and_run_completes() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("ok.txt").write_str("fine\n").unwrap();
    temp.child("image.raw").write_binary(&[0xff, 0xd8, 0xff, 0xe0, 0x00]).unwrap();

    let out = assert_fs::TempDir::new().unwrap();
    let output = out.child("doc.txt");
    let summary = run_into(temp.path(), output.path());

    assert_eq!(summary.files_written, 1);
    let doc = fs::read_to_string(output.path()).unwrap();
    assert_eq!(document_paths(&doc), ["ok.txt"]);
}

#[cfg(unix)]
#[test]
fn unreadable_file_is_excluded_and_run_completes() {
    use std::os::unix::fs::PermissionsExt;

    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("ok.txt").write_str("fine\n").unwrap();
    let locked = temp.child("locked.txt");
    locked.write_str("secret\n").unwrap();
    fs::set_permissions(locked.path(), fs::Permissions::from_mode(0o000)).unwrap();

    if fs::read(locked.path()).is_ok() {
        // Running with privileges that ignore file modes; nothing to simulate.
        return;
    }

    let out = assert_fs::TempDir::new().unwrap();
    let output = out.child("doc.txt");
    let summary = run_into(temp.path(), output.path());

    fs::set_permissions(locked.path(), fs::Permissions::from_mode(0o644)).unwrap();

    assert_eq!(summary.total_files(), 1);
    let doc = fs::read_to_string(output.path()).unwrap();
    assert_eq!(document_paths(&doc), ["ok.txt"]);
}

#[test]
fn rules_file_replaces_defaults() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child(".git/HEAD").write_str("ref: refs/heads/main\n").unwrap();
    temp.child("notes.tmp").write_str("scratch\n").unwrap();
    temp.child("main.rs").write_str("fn main() {}\n").unwrap();

    let rules_dir = assert_fs::TempDir::new().unwrap();
    let rules = rules_dir.child("rules");
    rules.write_str("# scratch files\n*.tmp\n").unwrap();

    let config = Config::builder()
        .root_dir(temp.path())
        .ignore_file(rules.path())
        .dry_run(true)
        .build()
        .unwrap();
    let summary = Pipeline::new(config).unwrap().run().unwrap();

    let mut listed: Vec<&str> = summary
        .collection
        .records
        .iter()
        .map(|r| r.relative_path.as_str())
        .collect();
    listed.sort_unstable();
    assert_eq!(listed, [".git/HEAD", "main.rs"]);
}
