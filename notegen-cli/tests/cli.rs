use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// The two-note site from the docs plus a config file
fn sample_site() -> TempDir {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "notegen.yml",
        r#"
site:
  title: "Test Notes"
  author: "Tester"
paths:
  content: "content"
  output: "build"
base_url: "/"
"#,
    );
    write(
        dir.path(),
        "content/a.md",
        "---\ntitle: Limits\ndate: 2024-02-01\ncategory: math\ntags: x, y\nsource: lecture 3\n---\n# Limits\n\nEpsilon delta.\n",
    );
    write(
        dir.path(),
        "content/b.md",
        "---\ntitle: Series\ndate: 2024-01-01\ncategory: math\ntags: [y]\n---\nConvergence tests.\n",
    );
    dir
}

#[allow(deprecated)]
fn notegen(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("notegen").unwrap();
    cmd.current_dir(dir).env_remove("NOTEGEN_CONFIG");
    cmd
}

fn stdout_json(assert: assert_cmd::assert::Assert) -> Value {
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    serde_json::from_str(&stdout).unwrap()
}

#[test]
fn build_writes_static_site() {
    let dir = sample_site();
    notegen(dir.path()).arg("build").assert().success();

    let out = dir.path().join("build");
    for rel in [
        "index.html",
        "categories.html",
        "tags.html",
        "notes/a.html",
        "notes/b.html",
        "category/math.html",
        "tag/x.html",
        "tag/y.html",
        "404.html",
        "static/style.css",
        "highlight.css",
    ] {
        assert!(out.join(rel).is_file(), "missing {}", rel);
    }

    let index = fs::read_to_string(out.join("index.html")).unwrap();
    assert!(index.find("notes/a.html").unwrap() < index.find("notes/b.html").unwrap());
}

#[test]
fn search_json_outputs_matches() {
    let dir = sample_site();
    let value = stdout_json(
        notegen(dir.path())
            .args(["search", "EPSILON", "--json"])
            .assert()
            .success(),
    );

    assert_eq!(value["kind"], "search.results");
    assert_eq!(value["data"]["total"], 1);
    assert_eq!(value["data"]["results"][0]["url"], "/a");
}

#[test]
fn search_text_reports_no_results() {
    let dir = sample_site();
    notegen(dir.path())
        .args(["search", "quaternion"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No results found for 'quaternion'"));
}

#[test]
fn list_filters_by_date_range() {
    let dir = sample_site();
    let value = stdout_json(
        notegen(dir.path())
            .args(["list", "--from", "2024-01-01", "--to", "2024-01-31", "--json"])
            .assert()
            .success(),
    );
    assert_eq!(value["data"]["total"], 1);
    assert_eq!(value["data"]["notes"][0]["url"], "/b");

    notegen(dir.path())
        .args(["list", "--from", "January"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid from date"));
}

#[test]
fn note_json_includes_related_and_neighbors() {
    let dir = sample_site();
    let value = stdout_json(
        notegen(dir.path())
            .args(["note", "/a"])
            .assert()
            .success(),
    );

    let data = &value["data"];
    assert_eq!(data["title"], "Limits");
    assert_eq!(data["metadata"]["source"], "lecture 3");
    assert_eq!(data["related"][0]["url"], "/b");
    assert_eq!(data["related"][0]["score"], 2);
    assert_eq!(data["previous"], Value::Null);
    assert_eq!(data["next"], "/b");
}

#[test]
fn note_metadata_and_missing_note() {
    let dir = sample_site();
    notegen(dir.path())
        .args(["note", "b", "--format", "metadata"])
        .assert()
        .success()
        .stdout(predicate::str::contains("title: Series"))
        .stdout(predicate::str::contains("2024-01-01"));

    notegen(dir.path())
        .args(["note", "/nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Note '/nope' not found"));
}

#[test]
fn check_fails_on_bad_files() {
    let dir = sample_site();
    notegen(dir.path()).arg("check").assert().success();

    write(dir.path(), "content/c.md", "---\ndate: someday\n---\nBody\n");
    let assert = notegen(dir.path()).args(["check", "--json"]).assert().failure();
    let value = stdout_json(assert);
    assert_eq!(value["data"]["notes"], 2);
    assert_eq!(value["data"]["errors"], 1);
    assert_eq!(value["data"]["diagnostics"][0]["code"], "note.invalid_metadata");
}

#[test]
fn missing_content_root_is_an_error() {
    let dir = tempdir().unwrap();
    notegen(dir.path())
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to index"));
}
