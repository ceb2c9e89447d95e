//! Lift every file under a directory tree into one flat directory.
//!
//! Files are moved, not copied. Traversal is depth-first with entries sorted
//! by name, and the whole listing is taken before the first move. When two
//! files share a base name the one visited later replaces the earlier one;
//! every replacement is recorded in the report.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use log::{debug, info, warn};
use serde::Serialize;
use walkdir::WalkDir;

use crate::error::{Result, ToolError};

#[derive(Debug, Clone, Copy, Default)]
pub struct FlattenOptions {
    /// Remove subdirectories of the source left empty by the move.
    pub prune_empty_dirs: bool,
}

/// A destination file that was replaced during the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overwrite {
    pub destination: PathBuf,
    pub replaced_by: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FlattenReport {
    pub moved: usize,
    pub already_in_place: usize,
    pub overwritten: Vec<Overwrite>,
    pub pruned_dirs: usize,
}

/// Every file under `root` in traversal order. Symlinks are collected as
/// files (the link itself is moved) unless they point at a directory;
/// directory links are not descended into.
pub fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            ToolError::io(path, io::Error::from(e))
        })?;
        let file_type = entry.file_type();
        if file_type.is_file() || (file_type.is_symlink() && !entry.path().is_dir()) {
            files.push(entry.into_path());
        } else if file_type.is_symlink() {
            debug!("{:?} links to a directory, left in place", entry.path());
        }
    }
    Ok(files)
}

/// Move every file found below `source` into `target`.
pub fn flatten_dir(
    source: &Path,
    target: &Path,
    opts: FlattenOptions,
    bar: &ProgressBar,
) -> Result<FlattenReport> {
    if !source.is_dir() {
        return Err(ToolError::io(
            source,
            io::Error::new(io::ErrorKind::NotFound, "source directory does not exist"),
        ));
    }
    let files = collect_files(source)?;
    info!("Found {} files under {:?}", files.len(), source);

    fs::create_dir_all(target).map_err(|e| ToolError::io(target, e))?;
    let target_canon = fs::canonicalize(target).map_err(|e| ToolError::io(target, e))?;

    bar.set_length(files.len() as u64);
    let mut report = FlattenReport::default();
    for file in files {
        bar.inc(1);
        let Some(name) = file.file_name() else {
            continue;
        };

        let parent = file.parent().unwrap_or(source);
        let parent_canon = fs::canonicalize(parent).map_err(|e| ToolError::io(parent, e))?;
        if parent_canon == target_canon {
            report.already_in_place += 1;
            continue;
        }

        let dest = target.join(name);
        if fs::symlink_metadata(&dest).is_ok() {
            warn!("{:?} overwrites {:?}", file, dest);
            report.overwritten.push(Overwrite { destination: dest.clone(), replaced_by: file.clone() });
        }
        move_file(&file, &dest)?;
        debug!("moved {:?} -> {:?}", file, dest);
        report.moved += 1;
    }
    bar.finish_and_clear();

    if opts.prune_empty_dirs {
        report.pruned_dirs = prune_empty_dirs(source, &target_canon)?;
    }

    info!(
        "moved={} already_in_place={} overwritten={} pruned_dirs={}",
        report.moved,
        report.already_in_place,
        report.overwritten.len(),
        report.pruned_dirs
    );
    Ok(report)
}

/// Rename, falling back to copy + remove when the rename is refused
/// (e.g. source and target on different filesystems).
fn move_file(from: &Path, to: &Path) -> Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            debug!("rename {:?} failed ({rename_err}), copying instead", from);
            fs::copy(from, to).map_err(|_| ToolError::io(from, rename_err))?;
            fs::remove_file(from).map_err(|e| ToolError::io(from, e))
        }
    }
}

/// Remove empty subdirectories of `root`, deepest first. `keep` is never removed.
fn prune_empty_dirs(root: &Path, keep: &Path) -> Result<usize> {
    let mut removed = 0;
    for entry in WalkDir::new(root).min_depth(1).contents_first(true) {
        let Ok(entry) = entry else { continue };
        if !entry.file_type().is_dir() {
            continue;
        }
        let dir = entry.path();
        if fs::canonicalize(dir).map(|c| c == keep).unwrap_or(false) {
            continue;
        }
        let is_empty = fs::read_dir(dir)
            .map_err(|e| ToolError::io(dir, e))?
            .next()
            .is_none();
        if is_empty {
            fs::remove_dir(dir).map_err(|e| ToolError::io(dir, e))?;
            removed += 1;
        }
    }
    Ok(removed)
}
