// SPDX-License-Identifier: GPL-2.0-only

//! `patchkit apply` implementation.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgMatches};

use crate::{argset, patchrepo::PatchRepo, repo, stupid::StupidContext};

use super::print_step;

pub(super) const COMMAND: super::PatchkitCommand = super::PatchkitCommand {
    name: "apply",
    make,
    run,
};

/// The branch holding the patched tree, recreated on every run.
const PATCHED_BRANCH: &str = "patched-release";

const TOTAL_STEPS: usize = 4;

fn make() -> clap::Command {
    clap::Command::new(COMMAND.name)
        .about("Apply the stored patch series onto a target repository")
        .long_about(
            "Apply the stored patch series onto a target repository.\n\
             \n\
             The target repository is forcibly checked out at the base commit \
             recorded in BASE_COMMIT.txt, discarding local modifications and \
             untracked files, and a fresh 'patched-release' branch is created \
             there. All patches/*.patch files are then applied in file name \
             order with 'git am --3way'.\n\
             \n\
             If a patch fails to apply, the repository is left in git's \
             mid-apply state for manual conflict resolution.",
        )
        .arg(argset::patch_repo_arg())
        .arg(
            Arg::new("repo")
                .help("Path to the target repository")
                .value_name("repo")
                .required(true)
                .value_hint(clap::ValueHint::DirPath)
                .value_parser(clap::value_parser!(PathBuf)),
        )
}

fn run(matches: &ArgMatches) -> Result<()> {
    let patch_repo = super::patch_repo_from_matches(matches)?;
    let target = matches
        .get_one::<PathBuf>("repo")
        .expect("required argument");
    let target = target
        .canonicalize()
        .with_context(|| format!("resolving `{}`", target.display()))?;

    println!("Target repo: {}", target.display());
    println!("Patch repo:  {}", patch_repo.root().display());
    println!();

    print_step(1, TOTAL_STEPS, "Loading BASE_COMMIT.txt...");
    let expected_commit = patch_repo.load_base_commit()?;
    println!("  Expected commit: {}...", short_hash(&expected_commit));

    repo::ensure_worktree(&target)?;
    let stupid = StupidContext { work_dir: &target };
    if !stupid.commit_exists(&expected_commit)? {
        return Err(anyhow!(
            "commit {} not found in `{}`; try running `git fetch` there to update",
            short_hash(&expected_commit),
            target.display()
        ));
    }

    print_step(2, TOTAL_STEPS, "Checking out base commit...");
    stupid.checkout_force(&expected_commit)?;
    stupid.clean_force()?;

    print_step(3, TOTAL_STEPS, "Creating patched-release branch...");
    // The branch may legitimately not exist yet.
    let _ = stupid.branch_delete(PATCHED_BRANCH);
    stupid.checkout_new_branch(PATCHED_BRANCH)?;

    print_step(4, TOTAL_STEPS, "Applying patches...");
    let patches = patch_repo.patch_files()?;
    if patches.is_empty() {
        println!("  No patches found in `patches/`.");
        println!("Done! (No patches to apply)");
        return Ok(());
    }
    println!("  Found {} patch(es)", patches.len());

    if !stupid.am_3way(&patches)? {
        println!();
        println!("{}", "=".repeat(60));
        println!("ERROR: Patch application failed!");
        println!("{}", "=".repeat(60));
        println!(
            "To abort and reset:  cd {} && git am --abort",
            target.display()
        );
        println!("To resolve manually: fix conflicts, git add, git am --continue");
        return Err(anyhow!("patch application failed"));
    }

    println!();
    println!("{}", "=".repeat(60));
    println!("SUCCESS! All patches applied.");
    println!("{}", "=".repeat(60));
    println!("Patched source is ready in: {}", target.display());
    Ok(())
}

fn short_hash(commit: &str) -> &str {
    match commit.char_indices().nth(12) {
        Some((index, _)) => &commit[..index],
        None => commit,
    }
}
