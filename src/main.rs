// SPDX-License-Identifier: GPL-2.0-only

//! Maintain a fork's divergence from upstream as a patch series.
//!
//! `patchkit export` regenerates the stored patch series from the fork's
//! commits beyond a named upstream remote; `patchkit apply` replays the
//! stored series onto a fresh checkout of the recorded base commit.

mod argset;
mod cmd;
mod patchrepo;
mod repo;
mod stupid;

use std::io::Write;

use clap::crate_version;
use termcolor::WriteColor;

fn main() {
    let app = clap::Command::new("patchkit")
        .about("Maintain a patch series for a fork of an upstream git repository")
        .version(crate_version!())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .max_term_width(88)
        .subcommands(cmd::COMMANDS.iter().map(|command| (command.make)()));

    let matches = app.get_matches();
    let (name, cmd_matches) = matches.subcommand().expect("subcommand is required");
    let command = cmd::COMMANDS
        .iter()
        .find(|command| command.name == name)
        .expect("clap only accepts known subcommands");

    if let Err(e) = (command.run)(cmd_matches) {
        print_error_message(&e);
        std::process::exit(1);
    }
}

fn print_error_message(err: &anyhow::Error) {
    let color_choice = if atty::is(atty::Stream::Stderr) {
        termcolor::ColorChoice::Auto
    } else {
        termcolor::ColorChoice::Never
    };
    let mut stderr = termcolor::StandardStream::stderr(color_choice);
    let mut color = termcolor::ColorSpec::new();
    stderr
        .set_color(color.set_fg(Some(termcolor::Color::Red)).set_bold(true))
        .unwrap();
    write!(stderr, "error: ").unwrap();
    stderr
        .set_color(color.set_fg(None).set_bold(false))
        .unwrap();
    writeln!(stderr, "{err:#}").unwrap();
}
