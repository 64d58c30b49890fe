use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn reelsync_cmd(root: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("reelsync"));
    cmd.current_dir(root).env_remove("RUST_LOG");
    cmd
}

/// Repository whose converter copies bytes with `cp` instead of running ffmpeg.
fn repo_with_copy_converter() -> TempDir {
    let root = TempDir::new().expect("root");
    fs::write(
        root.path().join("reelsync.yaml"),
        "converter:\n  program: sh\n  args: [\"-c\", \"cp \\\"$1\\\" \\\"$2\\\"\", sh, \"{input}\", \"{output}\"]\n",
    )
    .expect("config");
    fs::create_dir_all(root.path().join("videos")).expect("videos");
    fs::write(
        root.path().join("README.md"),
        "# Reels\n\n<!-- reelsync:start -->\n<!-- reelsync:end -->\n",
    )
    .expect("readme");
    root
}

#[test]
#[cfg(unix)]
fn sync_converts_then_second_run_reports_unchanged() {
    let root = repo_with_copy_converter();
    fs::write(root.path().join("videos/intro.mp4"), b"intro").expect("video");

    reelsync_cmd(root.path())
        .arg("sync")
        .assert()
        .success()
        .stdout(contains("1 converted"))
        .stdout(contains("changed: true"));

    assert_eq!(fs::read(root.path().join("gifs/intro.gif")).unwrap(), b"intro");
    let manifest = fs::read_to_string(root.path().join(".reelsync/manifest")).unwrap();
    assert!(manifest.starts_with("intro "));
    let readme = fs::read_to_string(root.path().join("README.md")).unwrap();
    assert!(readme.contains("![intro](gifs/intro.gif)"));

    reelsync_cmd(root.path())
        .arg("sync")
        .assert()
        .success()
        .stdout(contains("nothing to do"))
        .stdout(contains("changed: false"));
}

#[test]
#[cfg(unix)]
fn sync_json_report_lists_conversions_and_deletions() {
    let root = repo_with_copy_converter();
    fs::write(root.path().join("videos/a.mp4"), b"a").expect("video");
    fs::write(root.path().join("videos/b.mp4"), b"b").expect("video");
    reelsync_cmd(root.path()).arg("sync").assert().success();

    fs::remove_file(root.path().join("videos/b.mp4")).expect("remove");
    let output = reelsync_cmd(root.path())
        .args(["sync", "--json"])
        .output()
        .expect("run");
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(report["changed"], true);
    assert_eq!(report["converted"].as_array().unwrap().len(), 0);
    assert_eq!(report["deleted"][0]["id"], "b");
    assert_eq!(report["deleted"][0]["existed"], true);
    assert!(!root.path().join("gifs/b.gif").exists());
}

#[test]
fn dry_run_writes_nothing() {
    let root = repo_with_copy_converter();
    fs::write(root.path().join("videos/intro.mp4"), b"intro").expect("video");
    let readme_before = fs::read_to_string(root.path().join("README.md")).unwrap();

    reelsync_cmd(root.path())
        .args(["sync", "--dry-run"])
        .assert()
        .success()
        .stdout(contains("[dry-run]"))
        .stdout(contains("would change: true"));

    assert!(!root.path().join("gifs").exists());
    assert!(!root.path().join(".reelsync/manifest").exists());
    assert_eq!(
        fs::read_to_string(root.path().join("README.md")).unwrap(),
        readme_before
    );
}

#[test]
fn failed_conversion_exits_nonzero_and_names_the_asset() {
    let root = TempDir::new().expect("root");
    fs::write(
        root.path().join("reelsync.yaml"),
        "converter:\n  program: reelsync-no-such-converter\n  args: [\"{input}\", \"{output}\"]\n",
    )
    .expect("config");
    fs::create_dir_all(root.path().join("videos")).expect("videos");
    fs::write(root.path().join("videos/intro.mp4"), b"intro").expect("video");

    reelsync_cmd(root.path())
        .arg("sync")
        .assert()
        .failure()
        .stderr(contains("intro"));

    assert!(!root.path().join(".reelsync/manifest").exists());
}

#[test]
fn plan_json_reports_new_assets() {
    let root = repo_with_copy_converter();
    fs::write(root.path().join("videos/intro.mp4"), b"intro").expect("video");

    let output = reelsync_cmd(root.path())
        .args(["plan", "--json"])
        .output()
        .expect("run");
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(plan["changed"], true);
    assert_eq!(plan["to_convert"], 1);
    assert_eq!(plan["assets"][0]["id"], "intro");
    assert_eq!(plan["assets"][0]["action"], "new");
}

#[test]
fn diff_shows_added_gallery_row() {
    let root = repo_with_copy_converter();
    fs::write(root.path().join("videos/intro.mp4"), b"intro").expect("video");

    reelsync_cmd(root.path())
        .arg("diff")
        .assert()
        .success()
        .stdout(contains("--- a/README.md"))
        .stdout(contains("+| ![intro](gifs/intro.gif) | `intro` |"));

    assert!(!root.path().join("gifs").exists());
}

#[test]
fn init_writes_config_and_refuses_overwrite() {
    let root = TempDir::new().expect("root");

    reelsync_cmd(root.path())
        .arg("init")
        .assert()
        .success()
        .stdout(contains("reelsync.yaml"));
    let config = fs::read_to_string(root.path().join("reelsync.yaml")).unwrap();
    assert!(config.contains("ffmpeg"));

    reelsync_cmd(root.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(contains("already exists"));

    reelsync_cmd(root.path())
        .args(["init", "--force"])
        .assert()
        .success();
}

#[test]
fn root_flag_targets_another_directory() {
    let root = repo_with_copy_converter();
    let elsewhere = TempDir::new().expect("cwd");

    reelsync_cmd(elsewhere.path())
        .args(["plan", "--root"])
        .arg(root.path())
        .assert()
        .success()
        .stdout(contains("0 to convert"));
}
