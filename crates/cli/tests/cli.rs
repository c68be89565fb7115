use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

fn cmd() -> Command {
    cargo_bin_cmd!("folio")
}

fn init_site(dir: &Path) {
    cmd()
        .arg("init")
        .arg(dir)
        .args(["--title", "Field Notes", "--name", "Ada", "--email", "ada@example.com"])
        .assert()
        .success()
        .stdout(contains("Initialization complete"));
}

#[test]
fn help_lists_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("init"))
        .stdout(contains("preview"))
        .stdout(contains("search"));
}

#[test]
fn init_validate_build() {
    let tmp = TempDir::new().unwrap();
    let site = tmp.path().join("blog");
    init_site(&site);

    cmd()
        .arg("validate")
        .arg(&site)
        .assert()
        .success()
        .stdout(contains("Site is valid"));

    let out = tmp.path().join("dist");
    cmd()
        .arg("build")
        .arg(&site)
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(contains("Build complete"));

    assert!(out.join("index.html").exists());
    assert!(out.join("category/notes/index.html").exists());
    assert!(out.join("category/notes/welcome/index.html").exists());
    assert!(out.join("hello-world/index.html").exists());
    assert!(!out.join("work-in-progress/index.html").exists());
    assert!(out.join("search-index.json").exists());
    assert!(out.join("sitemap.xml").exists());
}

#[test]
fn init_refuses_existing_site() {
    let tmp = TempDir::new().unwrap();
    init_site(tmp.path());

    cmd()
        .arg("init")
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(contains("already exists"));
}

#[test]
fn init_rejects_bad_email() {
    let tmp = TempDir::new().unwrap();
    cmd()
        .arg("init")
        .arg(tmp.path())
        .args(["--email", "not-an-email"])
        .assert()
        .failure()
        .stderr(contains("Invalid email"));
}

#[test]
fn search_json() {
    let tmp = TempDir::new().unwrap();
    init_site(tmp.path());

    let output = cmd()
        .arg("search")
        .arg(tmp.path())
        .arg("hello")
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let hits: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(hits[0]["slug"], "hello-world");
    assert_eq!(hits[0]["category"], "notes");
}

#[test]
fn search_no_results() {
    let tmp = TempDir::new().unwrap();
    init_site(tmp.path());

    cmd()
        .args(["search"])
        .arg(tmp.path())
        .arg("zzzzqqq")
        .assert()
        .success()
        .stdout(contains("No results"));
}

#[test]
fn missing_site_fails() {
    let tmp = TempDir::new().unwrap();
    cmd()
        .arg("validate")
        .arg(tmp.path().join("nowhere"))
        .assert()
        .failure()
        .stderr(contains("folio init"));
}
