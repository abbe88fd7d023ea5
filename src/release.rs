//! Release store bookkeeping.
//!
//! Layout below `<x10i>/octopos-app/releases/`:
//!
//! ```text
//! 2017-03-14/
//!   x86guest/
//!     generic/
//!     default -> generic
//! current -> 2017-03-14
//! ```
//!
//! A dated directory is written once and replaced wholesale when the same
//! date is installed again. `current` and `current/<arch>/default` are
//! replaced in place on every activation.

use anyhow::{bail, Context, Result};
use regex::Regex;
use std::fmt;
use std::fs;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::target::Arch;

/// Name of the top-level activation link.
pub const CURRENT_LINK: &str = "current";
/// Name of the per-architecture variant link.
pub const DEFAULT_LINK: &str = "default";

/// Calendar date identifying one release (`YYYY-MM-DD`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReleaseDate(String);

impl ReleaseDate {
    /// Today's date in local time.
    pub fn today() -> Self {
        Self(chrono::Local::now().format("%Y-%m-%d").to_string())
    }

    /// Extract `RELEASE_DATE="..."` from a shell config file's contents.
    pub fn from_shell_config(text: &str) -> Result<Self> {
        let re = Regex::new(r#"RELEASE_DATE="([0-9-]+)""#)?;
        match re.captures(text) {
            Some(caps) => Ok(Self(caps[1].to_string())),
            None => bail!("No RELEASE_DATE=\"...\" entry found"),
        }
    }

    /// Read the release date from a shell config file.
    pub fn read_shell_config(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_shell_config(&text).with_context(|| format!("in {}", path.display()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ReleaseDate {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for ReleaseDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A release store directory.
#[derive(Debug, Clone)]
pub struct ReleaseStore {
    root: PathBuf,
}

impl ReleaseStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<store>/<date>`
    pub fn dated_dir(&self, date: &ReleaseDate) -> PathBuf {
        self.root.join(date.as_str())
    }

    /// Copy a produced architecture tree into `<store>/<date>/<arch>`.
    ///
    /// Any existing `<store>/<date>` is removed first, including other
    /// architectures installed under the same date.
    pub fn install_tree(&self, date: &ReleaseDate, arch: Arch, src: &Path) -> Result<PathBuf> {
        if !src.is_dir() {
            bail!("Release tree not found: {}", src.display());
        }

        let dated = self.dated_dir(date);
        if dated.is_dir() {
            tracing::debug!(dir = %dated.display(), "remove existing release");
            fs::remove_dir_all(&dated)
                .with_context(|| format!("Failed to remove {}", dated.display()))?;
        }

        let dst = dated.join(arch.name());
        tracing::debug!(from = %src.display(), to = %dst.display(), "copy release tree");
        copy_tree(src, &dst)?;
        Ok(dst)
    }

    /// Point `current` at `date` and `current/<arch>/default` at `variant`.
    ///
    /// Stale links are removed before being recreated, so repeated runs
    /// converge. There is no rollback: a failure part way leaves `current`
    /// updated and `default` untouched.
    pub fn activate(&self, date: &ReleaseDate, arch: Arch, variant: &str) -> Result<()> {
        if !self.root.is_dir() {
            bail!("Release store not found: {}", self.root.display());
        }

        let current = self.root.join(CURRENT_LINK);
        replace_symlink(Path::new(date.as_str()), &current)?;

        let arch_dir = current.join(arch.name());
        if !arch_dir.is_dir() {
            bail!(
                "Release {} has no {} tree: {}",
                date,
                arch,
                arch_dir.display()
            );
        }

        replace_symlink(Path::new(variant), &arch_dir.join(DEFAULT_LINK))?;
        Ok(())
    }

    /// Date `current` points to, if any.
    pub fn current(&self) -> Option<ReleaseDate> {
        let target = fs::read_link(self.root.join(CURRENT_LINK)).ok()?;
        Some(ReleaseDate(target.to_string_lossy().into_owned()))
    }

    /// Dated release directories, oldest first.
    pub fn releases(&self) -> Result<Vec<ReleaseDate>> {
        let re = Regex::new(r"^\d{4}-\d{2}-\d{2}$")?;
        let mut dates = Vec::new();
        for entry in fs::read_dir(&self.root)
            .with_context(|| format!("Failed to read {}", self.root.display()))?
        {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if re.is_match(&name) && entry.file_type()?.is_dir() {
                dates.push(ReleaseDate(name));
            }
        }
        dates.sort();
        Ok(dates)
    }
}

/// Remove `link` if anything is there (dangling links included) and create
/// it pointing at `target`.
fn replace_symlink(target: &Path, link: &Path) -> Result<()> {
    if link.symlink_metadata().is_ok() {
        tracing::debug!(link = %link.display(), "remove old symlink");
        fs::remove_file(link)
            .with_context(|| format!("Failed to remove {}", link.display()))?;
    }
    tracing::debug!(link = %link.display(), target = %target.display(), "symlink");
    symlink(target, link).with_context(|| {
        format!(
            "Failed to create symlink {} -> {}",
            link.display(),
            target.display()
        )
    })
}

/// Recursively copy `src` to `dst`, recreating symlinks as symlinks.
fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry.with_context(|| format!("Failed to walk {}", src.display()))?;
        let rel = entry.path().strip_prefix(src)?;
        let out = dst.join(rel);
        let ty = entry.file_type();

        if ty.is_symlink() {
            let target = fs::read_link(entry.path())?;
            symlink(&target, &out)
                .with_context(|| format!("Failed to create symlink {}", out.display()))?;
        } else if ty.is_dir() {
            fs::create_dir_all(&out)
                .with_context(|| format!("Failed to create {}", out.display()))?;
        } else {
            fs::copy(entry.path(), &out).with_context(|| {
                format!("Failed to copy {} to {}", entry.path().display(), out.display())
            })?;
        }
    }
    Ok(())
}
