//! CLI smoke tests for lathe.
//!
//! These tests run the binary against temporary projects and repositories
//! and check exit codes and output.

use std::path::Path;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serial_test::serial;
use tempfile::TempDir;

/// Get a Command for the lathe binary.
fn lathe_cmd() -> Command {
  cargo_bin_cmd!("lathe")
}

/// Create a temp directory with a project descriptor.
fn temp_project(content: &str) -> TempDir {
  let temp = TempDir::new().unwrap();
  std::fs::write(temp.path().join("lathe.json"), content).unwrap();
  temp
}

/// Write a descriptor and jar into a repository laid out like the local one.
fn install(repo: &Path, group: &str, artifact: &str, version: &str, descriptor: &str) {
  let mut dir = repo.to_path_buf();
  dir.extend(group.split('.'));
  let dir = dir.join(artifact).join(version);
  std::fs::create_dir_all(&dir).unwrap();
  std::fs::write(dir.join(format!("{}-{}.json", artifact, version)), descriptor).unwrap();
  std::fs::write(dir.join(format!("{}-{}.jar", artifact, version)), artifact).unwrap();
}

const JAR_PROJECT: &str = r#"{
  "group": "org.example",
  "artifact": "app",
  "version": "1.0"
}"#;

const FORKING_PROJECT: &str = r#"{
  "group": "org.example",
  "artifact": "app",
  "version": "1.0",
  "plugins": [
    {
      "group": "org.example",
      "artifact": "docs-plugin",
      "version": "1.0",
      "goals": [
        { "name": "bundle", "kind": { "forking": { "phase": "compile" } } }
      ],
      "executions": [{ "id": "bundle-docs", "phase": "verify", "goals": ["bundle"] }]
    }
  ]
}"#;

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  lathe_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  lathe_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("lathe"));
}

#[test]
fn subcommand_help_works() {
  for cmd in &["plan", "classpath", "phases"] {
    lathe_cmd()
      .arg(cmd)
      .arg("--help")
      .assert()
      .success()
      .stdout(predicate::str::contains("Usage"));
  }
}

// =============================================================================
// Phases
// =============================================================================

#[test]
fn phases_lists_lifecycles() {
  lathe_cmd()
    .arg("phases")
    .assert()
    .success()
    .stdout(predicate::str::contains("default:"))
    .stdout(predicate::str::contains("process-test-resources"))
    .stdout(predicate::str::contains("site-deploy"));
}

// =============================================================================
// Plan
// =============================================================================

#[test]
fn plan_prints_bindings_in_order() {
  let temp = temp_project(JAR_PROJECT);
  let output = lathe_cmd()
    .current_dir(temp.path())
    .args(["plan", "clean", "compile"])
    .assert()
    .success()
    .get_output()
    .stdout
    .clone();
  let stdout = String::from_utf8(output).unwrap();

  let clean = stdout.find("lathe-clean-plugin:1.0.0:clean").unwrap();
  let resources = stdout.find("lathe-resources-plugin:1.0.0:resources").unwrap();
  let compile = stdout.find("lathe-compiler-plugin:1.0.0:compile").unwrap();
  assert!(clean < resources && resources < compile);
  assert!(!stdout.contains("testCompile"));
}

#[test]
fn plan_json_output() {
  let temp = temp_project(JAR_PROJECT);
  let output = lathe_cmd()
    .current_dir(temp.path())
    .args(["plan", "package", "--format", "json"])
    .assert()
    .success()
    .get_output()
    .stdout
    .clone();

  let plan: serde_json::Value = serde_json::from_slice(&output).unwrap();
  let goals: Vec<&str> = plan
    .as_array()
    .unwrap()
    .iter()
    .map(|b| b["goal"].as_str().unwrap())
    .collect();
  assert_eq!(goals, ["resources", "compile", "testResources", "testCompile", "test", "jar"]);
}

#[test]
fn plan_renders_fork_markers() {
  let temp = temp_project(FORKING_PROJECT);
  lathe_cmd()
    .current_dir(temp.path())
    .args(["plan", "verify"])
    .assert()
    .success()
    .stdout(predicate::str::contains("[start-fork]"))
    .stdout(predicate::str::contains("[end-fork]"))
    .stdout(predicate::str::contains("docs-plugin:1.0:bundle@bundle-docs"))
    .stdout(predicate::str::contains("[clear-fork-context]"));
}

#[test]
fn plan_unknown_task_fails() {
  let temp = temp_project(JAR_PROJECT);
  lathe_cmd()
    .current_dir(temp.path())
    .args(["plan", "not-a-phase"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("not-a-phase"));
}

#[test]
fn plan_cycle_reports_path() {
  let temp = temp_project(
    r#"{
      "group": "org.example",
      "artifact": "app",
      "version": "1.0",
      "pre_goals": { "compiler:compile": ["resources:resources"] },
      "post_goals": { "resources:resources": ["compiler:compile"] }
    }"#,
  );
  lathe_cmd()
    .current_dir(temp.path())
    .args(["plan", "compile"])
    .assert()
    .failure()
    .stderr(predicate::str::contains(" -> "));
}

#[test]
fn plan_missing_project_fails() {
  let temp = TempDir::new().unwrap();
  lathe_cmd()
    .current_dir(temp.path())
    .args(["plan", "compile"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to load project"));
}

// =============================================================================
// Classpath
// =============================================================================

#[test]
fn classpath_aligns_with_host_exports() {
  let temp = TempDir::new().unwrap();
  let repo = temp.path().join("repo");
  install(
    &repo,
    "org.example",
    "greeter-plugin",
    "1.0",
    r#"{ "dependencies": [ { "group": "g", "artifact": "a", "version": "1.0", "scope": "compile" } ] }"#,
  );
  install(&repo, "g", "a", "2.0", "{}");
  let exports = temp.path().join("host-exports.json");
  std::fs::write(&exports, r#"{ "exports": ["g:a"], "metadata": { "g:a": { "version": "2.0" } } }"#).unwrap();

  lathe_cmd()
    .current_dir(temp.path())
    .args(["classpath", "org.example:greeter-plugin:1.0", "--repository"])
    .arg(&repo)
    .assert()
    .success()
    .stdout(predicate::str::contains("g:a:2.0 [provided]"))
    .stdout(predicate::str::contains("g:a:1.0").not());
}

#[test]
#[serial]
fn classpath_uses_repository_env() {
  let temp = TempDir::new().unwrap();
  install(temp.path(), "org.example", "solo-plugin", "1.0", "{}");

  lathe_cmd()
    .env("LATHE_REPOSITORY", temp.path())
    .current_dir(temp.path())
    .args(["classpath", "org.example:solo-plugin:1.0", "--format", "json"])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"digest\""));
}

#[test]
fn classpath_reports_every_missing_artifact() {
  let temp = TempDir::new().unwrap();
  install(
    temp.path(),
    "org.example",
    "broken-plugin",
    "1.0",
    r#"{ "dependencies": [
      { "group": "g", "artifact": "missing-one", "version": "1" },
      { "group": "g", "artifact": "missing-two", "version": "1" }
    ] }"#,
  );

  lathe_cmd()
    .current_dir(temp.path())
    .args(["classpath", "org.example:broken-plugin:1.0", "--repository"])
    .arg(temp.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("g:missing-one:1"))
    .stderr(predicate::str::contains("g:missing-two:1"));
}

#[test]
fn classpath_invalid_coordinate_fails() {
  lathe_cmd()
    .args(["classpath", "not-a-coordinate"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Invalid plugin coordinate"));
}
