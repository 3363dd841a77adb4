// SPDX-License-Identifier: GPL-2.0-only

//! [`clap::Arg`] definitions common to both patchkit commands.

use std::path::PathBuf;

use clap::{Arg, ArgMatches};

/// The `--patch-repo` option naming the patch repository root.
pub(crate) fn patch_repo_arg() -> Arg {
    Arg::new("patch-repo")
        .long("patch-repo")
        .help("Use <dir> as the patch repository instead of auto-detecting")
        .value_name("dir")
        .value_hint(clap::ValueHint::DirPath)
        .value_parser(clap::value_parser!(PathBuf))
}

/// The `--remote` option selecting the upstream remote name.
pub(crate) fn remote_arg() -> Arg {
    Arg::new("remote")
        .long("remote")
        .help("Name of the upstream remote")
        .value_name("remote")
        .default_value("gitlab")
        .value_hint(clap::ValueHint::Other)
}

/// The `--branch`/`-b` option selecting the upstream branch.
pub(crate) fn branch_arg() -> Arg {
    Arg::new("branch")
        .long("branch")
        .short('b')
        .help("Upstream branch the fork diverges from")
        .value_name("branch")
        .default_value("master")
        .value_hint(clap::ValueHint::Other)
}

/// Get a `&str` from a [`ArgMatches`] instance for the given `id`.
pub(crate) fn get_one_str<'a>(matches: &'a ArgMatches, id: &str) -> Option<&'a str> {
    matches.get_one::<String>(id).map(String::as_str)
}
