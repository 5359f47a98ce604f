//! Workspace materialization: copy the source tree into the execution root

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{AssistError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyStats {
    pub files: usize,
    pub dirs: usize,
    pub bytes: u64,
}

/// Copy every entry under `source` to `destination`, overwriting existing files.
///
/// Nothing is filtered. When `destination` is nested inside `source` the
/// destination subtree itself is skipped; when both name the same directory
/// nothing is copied.
pub fn materialize(source: &Path, destination: &Path) -> Result<CopyStats> {
    let meta = fs::metadata(source).map_err(|e| {
        AssistError::Workspace(format!("cannot read source {}: {}", source.display(), e))
    })?;
    if !meta.is_dir() {
        return Err(AssistError::Workspace(format!(
            "source {} is not a directory",
            source.display()
        )));
    }

    let source = source.canonicalize().map_err(|e| {
        AssistError::Workspace(format!("cannot resolve {}: {}", source.display(), e))
    })?;
    fs::create_dir_all(destination).map_err(|e| {
        AssistError::Workspace(format!("cannot create {}: {}", destination.display(), e))
    })?;
    let destination = destination.canonicalize().map_err(|e| {
        AssistError::Workspace(format!("cannot resolve {}: {}", destination.display(), e))
    })?;

    let mut stats = CopyStats::default();
    if source == destination {
        tracing::debug!(path = %source.display(), "workspace already in place");
        return Ok(stats);
    }

    copy_dir(&source, &destination, &destination, &mut stats)?;
    Ok(stats)
}

fn copy_dir(from: &Path, to: &Path, skip: &Path, stats: &mut CopyStats) -> Result<()> {
    let entries = fs::read_dir(from)
        .map_err(|e| AssistError::Workspace(format!("cannot list {}: {}", from.display(), e)))?;

    for entry in entries {
        let entry = entry
            .map_err(|e| AssistError::Workspace(format!("cannot list {}: {}", from.display(), e)))?;
        let src = entry.path();
        if src == skip {
            continue;
        }
        let dst = to.join(entry.file_name());
        let file_type = entry
            .file_type()
            .map_err(|e| AssistError::Workspace(format!("cannot stat {}: {}", src.display(), e)))?;

        if file_type.is_dir() {
            if dst.is_file() || dst.is_symlink() {
                remove_existing(&dst)?;
            }
            fs::create_dir_all(&dst).map_err(|e| {
                AssistError::Workspace(format!("cannot create {}: {}", dst.display(), e))
            })?;
            stats.dirs += 1;
            copy_dir(&src, &dst, skip, stats)?;
        } else if file_type.is_symlink() {
            copy_symlink(&src, &dst)?;
            stats.files += 1;
        } else {
            if dst.is_dir() && !dst.is_symlink() {
                fs::remove_dir_all(&dst).map_err(|e| {
                    AssistError::Workspace(format!("cannot replace {}: {}", dst.display(), e))
                })?;
            }
            let bytes = fs::copy(&src, &dst).map_err(|e| {
                AssistError::Workspace(format!("cannot copy {}: {}", src.display(), e))
            })?;
            stats.files += 1;
            stats.bytes += bytes;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    let target = fs::read_link(src)
        .map_err(|e| AssistError::Workspace(format!("cannot read link {}: {}", src.display(), e)))?;
    if dst.symlink_metadata().is_ok() {
        remove_existing(dst)?;
    }
    std::os::unix::fs::symlink(&target, dst)
        .map_err(|e| AssistError::Workspace(format!("cannot link {}: {}", dst.display(), e)))
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst)
        .map(|_| ())
        .map_err(|e| AssistError::Workspace(format!("cannot copy {}: {}", src.display(), e)))
}

fn remove_existing(path: &Path) -> Result<()> {
    let result = if path.is_dir() && !path.is_symlink() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| AssistError::Workspace(format!("cannot replace {}: {}", path.display(), e)))
}
