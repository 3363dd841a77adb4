// SPDX-License-Identifier: GPL-2.0-only

//! On-disk layout of the patch repository.
//!
//! A patch repository is a directory holding `BASE_COMMIT.txt` (the upstream
//! commit the series applies to), a `patches/` directory of `git
//! format-patch` output plus a `series` manifest, and a combined
//! `preview.diff` for review. The whole state is regenerated on each export
//! and consumed read-only on each apply.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};

const BASE_COMMIT_FILE: &str = "BASE_COMMIT.txt";
const PATCHES_DIR: &str = "patches";
const SERIES_FILE: &str = "series";
const PREVIEW_FILE: &str = "preview.diff";

/// Anything shorter cannot be a usable commit hash abbreviation.
const MIN_HASH_LEN: usize = 7;

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("`{}` not found", .0.display())]
    BaseCommitMissing(PathBuf),

    #[error("`{}` is empty or invalid", .0.display())]
    BaseCommitInvalid(PathBuf),
}

/// Paths of a patch repository, resolved once at startup and passed to every
/// operation that touches persisted state.
#[derive(Clone, Debug)]
pub(crate) struct PatchRepo {
    root: PathBuf,
}

impl PatchRepo {
    pub(crate) fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Locate the patch repository relative to the running executable.
    ///
    /// The installed layout places the executable in `<patch-repo>/bin/`, so
    /// the repository root is the grandparent of the executable path.
    pub(crate) fn discover() -> Result<Self> {
        let exe = std::env::current_exe().context("locating current executable")?;
        let root = exe
            .parent()
            .and_then(Path::parent)
            .ok_or_else(|| {
                anyhow!(
                    "cannot locate patch repository relative to `{}`; \
                     use `--patch-repo` to name it explicitly",
                    exe.display()
                )
            })?
            .to_path_buf();
        Ok(Self::new(root))
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn patches_dir(&self) -> PathBuf {
        self.root.join(PATCHES_DIR)
    }

    pub(crate) fn base_commit_file(&self) -> PathBuf {
        self.root.join(BASE_COMMIT_FILE)
    }

    pub(crate) fn series_file(&self) -> PathBuf {
        self.patches_dir().join(SERIES_FILE)
    }

    pub(crate) fn preview_file(&self) -> PathBuf {
        self.root.join(PREVIEW_FILE)
    }

    /// Read and validate `BASE_COMMIT.txt`, returning the trimmed hash.
    pub(crate) fn load_base_commit(&self) -> Result<String> {
        let path = self.base_commit_file();
        if !path.is_file() {
            return Err(Error::BaseCommitMissing(path).into());
        }
        let commit = fs::read_to_string(&path)
            .with_context(|| format!("reading `{}`", path.display()))?
            .trim()
            .to_string();
        if commit.len() < MIN_HASH_LEN {
            return Err(Error::BaseCommitInvalid(path).into());
        }
        Ok(commit)
    }

    /// Overwrite `BASE_COMMIT.txt` with a trimmed hash and trailing newline.
    pub(crate) fn write_base_commit(&self, commit: &str) -> Result<()> {
        let path = self.base_commit_file();
        fs::write(&path, format!("{}\n", commit.trim()))
            .with_context(|| format!("writing `{}`", path.display()))
    }

    /// Patch files in application order.
    ///
    /// Application order is byte-lexical file name order; `git format-patch
    /// --start-number 1` zero-pads its numeric prefixes, so this matches the
    /// order the commits were exported in.
    pub(crate) fn patch_files(&self) -> Result<Vec<PathBuf>> {
        let patches_dir = self.patches_dir();
        let mut paths = Vec::new();
        if !patches_dir.is_dir() {
            return Ok(paths);
        }
        for entry in fs::read_dir(&patches_dir)
            .with_context(|| format!("reading `{}`", patches_dir.display()))?
        {
            let path = entry
                .with_context(|| format!("reading `{}`", patches_dir.display()))?
                .path();
            if path.extension().map_or(false, |ext| ext == "patch") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Delete leftover patch files from a previous export so a smaller new
    /// series cannot leave stale tail patches behind.
    ///
    /// Creates the patches directory when it does not exist yet. Returns the
    /// number of files removed.
    pub(crate) fn remove_stale_patches(&self) -> Result<usize> {
        let patches_dir = self.patches_dir();
        fs::create_dir_all(&patches_dir)
            .with_context(|| format!("creating `{}`", patches_dir.display()))?;
        let mut removed = 0;
        for path in self.patch_files()? {
            fs::remove_file(&path).with_context(|| format!("removing `{}`", path.display()))?;
            removed += 1;
        }
        Ok(removed)
    }

    /// Regenerate `patches/series` from the directory contents, one patch
    /// file name per line in application order. Returns the manifest entries.
    pub(crate) fn write_series(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for path in self.patch_files()? {
            let name = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| anyhow!("non-UTF-8 patch file name `{}`", path.display()))?;
            names.push(name.to_string());
        }
        let mut manifest = String::new();
        for name in &names {
            manifest.push_str(name);
            manifest.push('\n');
        }
        let series_file = self.series_file();
        fs::write(&series_file, manifest)
            .with_context(|| format!("writing `{}`", series_file.display()))?;
        Ok(names)
    }
}
