// SPDX-License-Identifier: GPL-2.0-only

//! Execute commands with git, the stupid content tracker.
//!
//! Everything patchkit does to a repository happens through the `git`
//! executable found in `PATH`; this module is the only place a subprocess is
//! spawned. Each [`StupidContext`] method calls out to one specific git
//! command, and invoked command lines are echoed to stdout so a failed run
//! can be replayed by hand.

mod command;
mod context;

pub(crate) use self::context::StupidContext;
