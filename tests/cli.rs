// SPDX-License-Identifier: GPL-2.0-only

//! End-to-end tests driving the `patchkit` binary against real git
//! repositories in temporary directories.
//!
//! These need a `git` executable in `PATH`; nothing touches the network or
//! any configuration outside the fixture directories.

use std::{
    fs,
    path::Path,
    process::{Command, Output},
};

const GIT_ENV: &[(&str, &str)] = &[
    ("GIT_AUTHOR_NAME", "A U Thor"),
    ("GIT_AUTHOR_EMAIL", "author@example.com"),
    ("GIT_COMMITTER_NAME", "C O Mitter"),
    ("GIT_COMMITTER_EMAIL", "committer@example.com"),
    ("GIT_CONFIG_NOSYSTEM", "1"),
    ("GIT_CONFIG_GLOBAL", "/dev/null"),
];

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .envs(GIT_ENV.iter().copied())
        .output()
        .expect("failed to spawn git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim_end().to_string()
}

fn patchkit(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_patchkit"))
        .args(args)
        .envs(GIT_ENV.iter().copied())
        .output()
        .expect("failed to spawn patchkit")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn init_repo(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    git(dir, &["init", "-b", "master"]);
}

fn commit_file(dir: &Path, name: &str, content: &str, message: &str) {
    fs::write(dir.join(name), content).unwrap();
    git(dir, &["add", name]);
    git(dir, &["commit", "-m", message]);
}

// Patch files in the shape `git format-patch` writes them. The first and
// third apply cleanly on an empty tree; the second modifies a file that
// does not exist and has unreachable blob ids, so `git am --3way` stops on it.

const PATCH_ADD_A: &str = r#"From 1111111111111111111111111111111111111111 Mon Sep 17 00:00:00 2001
From: A U Thor <author@example.com>
Date: Mon, 1 Jan 2024 00:00:00 +0000
Subject: [PATCH] add a

---
 a.txt | 1 +
 1 file changed, 1 insertion(+)

diff --git a/a.txt b/a.txt
new file mode 100644
index 0000000..7898192
--- /dev/null
+++ b/a.txt
@@ -0,0 +1 @@
+a
"#;

const PATCH_BAD: &str = r#"From 2222222222222222222222222222222222222222 Mon Sep 17 00:00:00 2001
From: A U Thor <author@example.com>
Date: Mon, 1 Jan 2024 00:00:01 +0000
Subject: [PATCH] change missing file

---
 missing.txt | 2 +-
 1 file changed, 1 insertion(+), 1 deletion(-)

diff --git a/missing.txt b/missing.txt
index 1111111..2222222 100644
--- a/missing.txt
+++ b/missing.txt
@@ -1 +1 @@
-x
+y
"#;

const PATCH_ADD_C: &str = r#"From 3333333333333333333333333333333333333333 Mon Sep 17 00:00:00 2001
From: A U Thor <author@example.com>
Date: Mon, 1 Jan 2024 00:00:02 +0000
Subject: [PATCH] add c

---
 c.txt | 1 +
 1 file changed, 1 insertion(+)

diff --git a/c.txt b/c.txt
new file mode 100644
index 0000000..f2ad6c7
--- /dev/null
+++ b/c.txt
@@ -0,0 +1 @@
+c
"#;

#[test]
fn apply_invalid_base_commit_exits_before_touching_target() {
    let tmp = tempfile::tempdir().unwrap();
    let patch_repo = tmp.path().join("patchrepo");
    fs::create_dir(&patch_repo).unwrap();
    fs::write(patch_repo.join("BASE_COMMIT.txt"), "abc123\n").unwrap();
    let target = tmp.path().join("target");
    fs::create_dir(&target).unwrap();

    let out = patchkit(&[
        "apply",
        "--patch-repo",
        patch_repo.to_str().unwrap(),
        target.to_str().unwrap(),
    ]);

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("invalid"), "stderr: {}", stderr(&out));
    // The base commit check fires before any repository validation or git
    // invocation; the target (not even a repository) is untouched.
    assert_eq!(fs::read_dir(&target).unwrap().count(), 0);
}

#[test]
fn apply_missing_base_commit_file() {
    let tmp = tempfile::tempdir().unwrap();
    let patch_repo = tmp.path().join("patchrepo");
    fs::create_dir(&patch_repo).unwrap();
    let target = tmp.path().join("target");
    fs::create_dir(&target).unwrap();

    let out = patchkit(&[
        "apply",
        "--patch-repo",
        patch_repo.to_str().unwrap(),
        target.to_str().unwrap(),
    ]);

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("not found"), "stderr: {}", stderr(&out));
}

#[test]
fn apply_reports_no_patches() {
    let tmp = tempfile::tempdir().unwrap();
    let target = tmp.path().join("target");
    init_repo(&target);
    commit_file(&target, "base.txt", "base\n", "base");
    let base_commit = git(&target, &["rev-parse", "HEAD"]);

    let patch_repo = tmp.path().join("patchrepo");
    fs::create_dir_all(patch_repo.join("patches")).unwrap();
    fs::write(patch_repo.join("BASE_COMMIT.txt"), format!("{base_commit}\n")).unwrap();

    let out = patchkit(&[
        "apply",
        "--patch-repo",
        patch_repo.to_str().unwrap(),
        target.to_str().unwrap(),
    ]);

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("No patches to apply"));
    // The fresh branch is still created.
    let head = fs::read_to_string(target.join(".git/HEAD")).unwrap();
    assert!(head.contains("patched-release"), "HEAD: {head}");
}

#[test]
fn apply_stops_at_first_failing_patch() {
    let tmp = tempfile::tempdir().unwrap();
    let target = tmp.path().join("target");
    init_repo(&target);
    commit_file(&target, "base.txt", "base\n", "base");
    let base_commit = git(&target, &["rev-parse", "HEAD"]);

    let patch_repo = tmp.path().join("patchrepo");
    let patches_dir = patch_repo.join("patches");
    fs::create_dir_all(&patches_dir).unwrap();
    fs::write(patch_repo.join("BASE_COMMIT.txt"), format!("{base_commit}\n")).unwrap();
    fs::write(patches_dir.join("0001-add-a.patch"), PATCH_ADD_A).unwrap();
    fs::write(patches_dir.join("0002-change-missing-file.patch"), PATCH_BAD).unwrap();
    fs::write(patches_dir.join("0003-add-c.patch"), PATCH_ADD_C).unwrap();

    let out = patchkit(&[
        "apply",
        "--patch-repo",
        patch_repo.to_str().unwrap(),
        target.to_str().unwrap(),
    ]);

    assert_eq!(out.status.code(), Some(1));
    let applied = stdout(&out);
    assert!(applied.contains("Found 3 patch(es)"), "stdout: {applied}");
    assert!(applied.contains("git am --abort"), "stdout: {applied}");
    assert!(applied.contains("git am --continue"), "stdout: {applied}");
    // The first patch landed before the failure; the third was never tried.
    assert!(target.join("a.txt").exists());
    assert!(!target.join("c.txt").exists());
}

#[test]
fn export_requires_upstream_remote() {
    let tmp = tempfile::tempdir().unwrap();
    let fork = tmp.path().join("fork");
    init_repo(&fork);
    let patch_repo = tmp.path().join("patchrepo");
    fs::create_dir(&patch_repo).unwrap();

    let out = patchkit(&[
        "export",
        "--patch-repo",
        patch_repo.to_str().unwrap(),
        fork.to_str().unwrap(),
    ]);

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("gitlab"), "stderr: {}", stderr(&out));
    // Validation failed before the stale sweep could create anything.
    assert!(!patch_repo.join("patches").exists());
}

#[test]
fn export_writes_series_preview_and_base() {
    let tmp = tempfile::tempdir().unwrap();
    let upstream = tmp.path().join("upstream");
    init_repo(&upstream);
    commit_file(&upstream, "base.txt", "base\n", "base");

    git(tmp.path(), &["clone", "-o", "gitlab", "upstream", "fork"]);
    let fork = tmp.path().join("fork");
    commit_file(&fork, "one.txt", "one\n", "add one");
    commit_file(&fork, "two.txt", "two\n", "add two");

    let patch_repo = tmp.path().join("patchrepo");
    let patches_dir = patch_repo.join("patches");
    fs::create_dir_all(&patches_dir).unwrap();
    // A leftover from an imaginary earlier export with more patches.
    fs::write(patches_dir.join("9999-zz.patch"), "stale\n").unwrap();

    let out = patchkit(&[
        "export",
        "--patch-repo",
        patch_repo.to_str().unwrap(),
        fork.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let series = fs::read_to_string(patches_dir.join("series")).unwrap();
    let lines: Vec<&str> = series.lines().collect();
    assert_eq!(lines.len(), 2, "series: {series}");
    assert!(lines[0].starts_with("0001-") && lines[0].ends_with(".patch"));
    assert!(lines[1].starts_with("0002-") && lines[1].ends_with(".patch"));
    assert!(!patches_dir.join("9999-zz.patch").exists());

    let upstream_commit = git(&fork, &["rev-parse", "gitlab/master"]);
    let base = fs::read_to_string(patch_repo.join("BASE_COMMIT.txt")).unwrap();
    assert_eq!(base, format!("{upstream_commit}\n"));

    let preview = fs::read_to_string(patch_repo.join("preview.diff")).unwrap();
    assert!(preview.contains("one.txt") && preview.contains("two.txt"));

    // Re-export with no new commits regenerates identical state.
    let out = patchkit(&[
        "export",
        "--patch-repo",
        patch_repo.to_str().unwrap(),
        fork.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(fs::read_to_string(patches_dir.join("series")).unwrap(), series);
    assert_eq!(fs::read_to_string(patch_repo.join("BASE_COMMIT.txt")).unwrap(), base);
    assert_eq!(fs::read_to_string(patch_repo.join("preview.diff")).unwrap(), preview);
}
