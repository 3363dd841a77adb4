// SPDX-License-Identifier: GPL-2.0-only

//! `patchkit export` implementation.

use std::{fs, path::PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgMatches};

use crate::{argset, repo, stupid::StupidContext};

use super::print_step;

pub(super) const COMMAND: super::PatchkitCommand = super::PatchkitCommand {
    name: "export",
    make,
    run,
};

const TOTAL_STEPS: usize = 5;

fn make() -> clap::Command {
    clap::Command::new(COMMAND.name)
        .about("Export the fork's commits beyond upstream as a patch series")
        .long_about(
            "Export the fork's commits beyond upstream as a patch series.\n\
             \n\
             One patch file per commit in '<remote>/<branch>..HEAD' is written \
             to the patches/ directory with 'git format-patch', replacing any \
             patches from a previous export. A combined preview.diff, the \
             patches/series manifest, and BASE_COMMIT.txt are regenerated to \
             match.\n\
             \n\
             The fork repository itself is only read, never modified.",
        )
        .arg(argset::patch_repo_arg())
        .arg(argset::remote_arg())
        .arg(argset::branch_arg())
        .arg(
            Arg::new("repo")
                .help("Path to the fork repository (defaults to the current directory)")
                .value_name("repo")
                .value_hint(clap::ValueHint::DirPath)
                .value_parser(clap::value_parser!(PathBuf)),
        )
}

fn run(matches: &ArgMatches) -> Result<()> {
    let patch_repo = super::patch_repo_from_matches(matches)?;
    let fork = match matches.get_one::<PathBuf>("repo") {
        Some(path) => path.clone(),
        None => std::env::current_dir().context("getting current directory")?,
    };
    let fork = fork
        .canonicalize()
        .with_context(|| format!("resolving `{}`", fork.display()))?;
    let remote = argset::get_one_str(matches, "remote").expect("arg has default");
    let branch = argset::get_one_str(matches, "branch").expect("arg has default");
    let upstream = format!("{remote}/{branch}");
    let range = format!("{upstream}..HEAD");

    println!("Fork repo:  {}", fork.display());
    println!("Patch repo: {}", patch_repo.root().display());
    println!();

    print_step(1, TOTAL_STEPS, "Checking fork repository...");
    repo::ensure_worktree(&fork)?;
    let stupid = StupidContext { work_dir: &fork };
    if !stupid.remote_exists(remote)? {
        return Err(anyhow!(
            "no `{remote}` remote found in `{}`; \
             add a remote named `{remote}` pointing at your upstream",
            fork.display()
        ));
    }

    print_step(2, TOTAL_STEPS, "Removing old patches...");
    let removed = patch_repo.remove_stale_patches()?;
    if removed == 0 {
        println!("  (No old patches to remove)");
    } else {
        println!("  Removed {removed} old patch(es)");
    }

    print_step(3, TOTAL_STEPS, "Generating patches (git format-patch)...");
    stupid.format_patch(&patch_repo.patches_dir(), &range)?;

    print_step(4, TOTAL_STEPS, "Generating preview.diff...");
    let diff = stupid.diff_range(&range)?;
    let preview_file = patch_repo.preview_file();
    fs::write(&preview_file, &diff)
        .with_context(|| format!("writing `{}`", preview_file.display()))?;
    println!("  Written: {}", preview_file.display());

    print_step(5, TOTAL_STEPS, "Updating series and BASE_COMMIT.txt...");
    let patch_names = patch_repo.write_series()?;
    println!(
        "  Written: {} ({} patches)",
        patch_repo.series_file().display(),
        patch_names.len()
    );
    match stupid.rev_parse(&upstream) {
        Ok(upstream_commit) => {
            patch_repo.write_base_commit(&upstream_commit)?;
            println!("  Updated commit: {upstream_commit}");
        }
        // Leave the previous BASE_COMMIT.txt in place rather than
        // overwriting it with nothing.
        Err(_) => println!("  Warning: could not get upstream commit hash"),
    }

    println!();
    println!("Done! Exported {} patch(es).", patch_names.len());
    Ok(())
}
