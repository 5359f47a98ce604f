//! Disk space preflight before environment creation

use bytesize::ByteSize;
use std::path::Path;
use sysinfo::Disks;

use crate::error::{AssistError, Result};

/// Free space on the disk holding `path`, from the longest matching mount point
pub fn available_space(path: &Path) -> Option<u64> {
    let path = path.canonicalize().ok()?;
    let disks = Disks::new_with_refreshed_list();

    disks
        .iter()
        .filter(|disk| path.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len())
        .map(|disk| disk.available_space())
}

/// Fail when the disk holding `path` has less than `min_free` bytes available
pub fn ensure_free_space(path: &Path, min_free: u64) -> Result<()> {
    match available_space(path) {
        Some(free) if free < min_free => Err(AssistError::Environment(format!(
            "insufficient disk space at {}: {} available, {} required",
            path.display(),
            ByteSize(free),
            ByteSize(min_free)
        ))),
        Some(free) => {
            tracing::debug!(path = %path.display(), free = %ByteSize(free), "disk space ok");
            Ok(())
        }
        None => {
            tracing::warn!(path = %path.display(), "no disk found for path, skipping space check");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_requirement_always_passes() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ensure_free_space(dir.path(), 0).is_ok());
    }

    #[test]
    fn test_impossible_requirement_fails_when_disk_known() {
        let dir = tempfile::tempdir().unwrap();
        let result = ensure_free_space(dir.path(), u64::MAX);
        if available_space(dir.path()).is_some() {
            assert!(matches!(result, Err(AssistError::Environment(_))));
        } else {
            assert!(result.is_ok());
        }
    }
}
