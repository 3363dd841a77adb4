// SPDX-License-Identifier: GPL-2.0-only

//! Patchkit subcommand implementations.
//!
//! Each subcommand is in its own module. The [`COMMANDS`] slice constant
//! contains a [`PatchkitCommand`] instance for each subcommand.

pub(crate) mod apply;
pub(crate) mod export;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::patchrepo::PatchRepo;

/// Entry point for a patchkit subcommand.
pub(crate) struct PatchkitCommand {
    /// Name of command.
    pub(crate) name: &'static str,

    /// Function pointer for making the [`clap::Command`] for the subcommand.
    pub(crate) make: fn() -> clap::Command,

    /// Function pointer for running the subcommand.
    pub(crate) run: fn(&ArgMatches) -> Result<()>,
}

/// Builtin [`PatchkitCommand`]'s, used in [`crate::main`] for command line
/// argument parsing and dispatch.
pub(crate) const COMMANDS: &[PatchkitCommand] = &[apply::COMMAND, export::COMMAND];

/// Print a numbered step header like `[2/4] Checking out base commit...`.
pub(super) fn print_step(step: usize, total: usize, message: &str) {
    println!("[{step}/{total}] {message}");
}

/// Resolve the patch repository from `--patch-repo`, falling back to
/// executable-relative auto-detection.
pub(super) fn patch_repo_from_matches(matches: &ArgMatches) -> Result<PatchRepo> {
    if let Some(root) = matches.get_one::<PathBuf>("patch-repo") {
        // Patch paths are later handed to git processes running in the
        // target repository, so the root must be absolute.
        let root = root
            .canonicalize()
            .with_context(|| format!("resolving `{}`", root.display()))?;
        Ok(PatchRepo::new(root))
    } else {
        PatchRepo::discover()
    }
}
