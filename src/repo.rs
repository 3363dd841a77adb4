// SPDX-License-Identifier: GPL-2.0-only

//! Validation of target repository paths.

use std::path::Path;

use anyhow::{anyhow, Result};

/// Check that `path` looks like a git working copy before anything
/// destructive happens to it.
///
/// Only the presence of the `.git` entry is checked here; a regular `.git`
/// file is accepted too, since linked worktrees and submodules use one.
/// Everything deeper is left to git itself.
pub(crate) fn ensure_worktree(path: &Path) -> Result<()> {
    if path.join(".git").exists() {
        Ok(())
    } else {
        Err(anyhow!(
            "`{}` is not a git repository; \
             check the repository path argument (expected a working copy containing `.git`)",
            path.display()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_plain_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = ensure_worktree(dir.path()).unwrap_err();
        assert!(err.to_string().contains("not a git repository"));
        assert!(err.to_string().contains("check the repository path"));
    }

    #[test]
    fn rejects_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ensure_worktree(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn accepts_git_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        assert!(ensure_worktree(dir.path()).is_ok());
    }

    #[test]
    fn accepts_git_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".git"), "gitdir: ../.git/worktrees/x\n").unwrap();
        assert!(ensure_worktree(dir.path()).is_ok());
    }
}
