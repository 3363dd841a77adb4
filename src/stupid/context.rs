// SPDX-License-Identifier: GPL-2.0-only

//! Context for executing git commands via the `git` executable.

use std::{
    ffi::OsStr,
    path::Path,
    process::{Command, Stdio},
};

use anyhow::{Context, Result};
use bstr::{BString, ByteSlice};

use super::command::{echo_command, StupidCommand, StupidOutput, GIT_EXEC_FAIL};

/// Context for running stupid commands against a single working copy.
#[derive(Clone, Debug)]
pub(crate) struct StupidContext<'repo> {
    pub(crate) work_dir: &'repo Path,
}

impl StupidContext<'_> {
    fn git(&self) -> Command {
        let mut command = Command::new("git");
        command.current_dir(self.work_dir);
        command
    }

    /// Test whether a commit object exists in the repository with `git cat-file`.
    pub(crate) fn commit_exists(&self, commit: &str) -> Result<bool> {
        let mut command = self.git();
        command.args(["cat-file", "-t"]).arg(commit);
        echo_command(&command);
        let output = command.output_git()?;
        Ok(output.status.success())
    }

    /// Test whether the named remote is configured with `git remote get-url`.
    pub(crate) fn remote_exists(&self, remote_name: &str) -> Result<bool> {
        let mut command = self.git();
        command.args(["remote", "get-url"]).arg(remote_name);
        echo_command(&command);
        let output = command.output_git()?;
        Ok(output.status.success())
    }

    /// Forcibly check out a commit, discarding local modifications.
    pub(crate) fn checkout_force(&self, commit: &str) -> Result<()> {
        let mut command = self.git();
        command.args(["checkout", "-f"]).arg(commit);
        echo_command(&command);
        command
            .stdout(Stdio::null())
            .output_git()?
            .require_success("checkout -f")?;
        Ok(())
    }

    /// Remove untracked and ignored files with `git clean -fdx`.
    pub(crate) fn clean_force(&self) -> Result<()> {
        let mut command = self.git();
        command.args(["clean", "-fdx"]);
        echo_command(&command);
        command
            .stdout(Stdio::null())
            .output_git()?
            .require_success("clean")?;
        Ok(())
    }

    /// Delete a branch. The caller decides whether failure matters, so this
    /// command is not echoed.
    pub(crate) fn branch_delete(&self, branch_name: &str) -> Result<()> {
        let mut command = self.git();
        command.args(["branch", "-D"]).arg(branch_name);
        command
            .stdout(Stdio::null())
            .output_git()?
            .require_success("branch -D")?;
        Ok(())
    }

    /// Create and check out a new branch at the current HEAD.
    pub(crate) fn checkout_new_branch(&self, branch_name: &str) -> Result<()> {
        let mut command = self.git();
        command.args(["checkout", "-b"]).arg(branch_name);
        echo_command(&command);
        command
            .stdout(Stdio::null())
            .output_git()?
            .require_success("checkout -b")?;
        Ok(())
    }

    /// Apply a batch of patch files with `git am --3way`, in the given order.
    ///
    /// Output streams are inherited so conflict diagnostics reach the user
    /// directly. Returns `true` if every patch applied, `false` if `git am`
    /// stopped partway; the repository is left in whatever mid-apply state
    /// git left it in.
    pub(crate) fn am_3way<I, S>(&self, patches: I) -> Result<bool>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = self.git();
        command.args(["am", "--3way"]);
        command.args(patches);
        echo_command(&command);
        let status = command
            .stdin(Stdio::null())
            .status()
            .context(GIT_EXEC_FAIL)?;
        Ok(status.success())
    }

    /// Write one patch file per commit in `range` into `out_dir` with
    /// `git format-patch`.
    pub(crate) fn format_patch(&self, out_dir: &Path, range: &str) -> Result<()> {
        let mut command = self.git();
        command
            .args([
                "format-patch",
                "--no-numbered",
                "--no-signature",
                "--start-number",
                "1",
                "-o",
            ])
            .arg(out_dir)
            .arg(range);
        echo_command(&command);
        command
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .output_git()?
            .require_success("format-patch")?;
        Ok(())
    }

    /// Capture the combined diff over `range` with `git diff`.
    pub(crate) fn diff_range(&self, range: &str) -> Result<BString> {
        let mut command = self.git();
        command.arg("diff").arg(range);
        echo_command(&command);
        let output = command.output_git()?.require_success("diff")?;
        Ok(BString::from(output.stdout))
    }

    /// Resolve a reference to its commit hash with `git rev-parse`.
    pub(crate) fn rev_parse(&self, refname: &str) -> Result<String> {
        let mut command = self.git();
        command.arg("rev-parse").arg(refname);
        echo_command(&command);
        let output = command.output_git()?.require_success("rev-parse")?;
        let hash = output
            .stdout
            .to_str()
            .context("parsing `git rev-parse` output")?
            .trim_end()
            .to_string();
        Ok(hash)
    }
}
