// SPDX-License-Identifier: GPL-2.0-only

//! Helpers for running `git` via [`std::process::Command`].

use std::process::{Command, Output};

use anyhow::{anyhow, Context, Result};
use bstr::ByteSlice;

pub(super) const GIT_EXEC_FAIL: &str = "could not execute `git`";

pub(super) trait StupidCommand {
    /// Run git command, wait for completion, and collect output streams.
    ///
    /// By default, stdout and stderr are piped and stdin is null; explicitly
    /// configured streams are respected.
    fn output_git(&mut self) -> Result<Output>;
}

impl StupidCommand for Command {
    fn output_git(&mut self) -> Result<Output> {
        self.output().context(GIT_EXEC_FAIL)
    }
}

pub(super) trait StupidOutput {
    /// Ensure that the command was successful, returning its output.
    fn require_success(self, command: &str) -> Result<Output>;
}

impl StupidOutput for Output {
    fn require_success(self, command: &str) -> Result<Output> {
        if self.status.success() {
            Ok(self)
        } else {
            Err(git_command_error(command, &self.stderr))
        }
    }
}

pub(super) fn git_command_error(command: &str, stderr: &[u8]) -> anyhow::Error {
    let err_str = stderr.to_str_lossy();
    let err_str = err_str.trim_end();
    anyhow!(err_str.to_string()).context(format!("`git {command}`"))
}

/// Echo a command line to stdout before it is spawned.
pub(super) fn echo_command(command: &Command) {
    let mut line = command.get_program().to_string_lossy().into_owned();
    for arg in command.get_args() {
        line.push(' ');
        line.push_str(&arg.to_string_lossy());
    }
    println!("  > {line}");
}
