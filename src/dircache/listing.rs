//! Filesystem access behind the directory cache.

use std::io;

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use tracing::{debug, trace};

use super::{DirEntries, DirEntry, PathKind};

/// List `path`, treating an unreadable directory as empty.
pub(super) fn read_dir(path: &str) -> DirEntries {
    match try_read_dir(path) {
        Ok(entries) => {
            trace!(dir = path, count = entries.len(), "listed directory");
            entries
        }
        Err(err) => {
            debug!(dir = path, error = %err, "directory listing failed; treating as empty");
            DirEntries::default()
        }
    }
}

fn try_read_dir(path: &str) -> io::Result<DirEntries> {
    let dir = Dir::open_ambient_dir(path, ambient_authority())?;
    let mut entries = Vec::new();
    for item in dir.entries()? {
        let entry = match item {
            Ok(entry) => entry,
            Err(err) => {
                debug!(dir = path, error = %err, "skipping unreadable entry");
                continue;
            }
        };
        let name = match entry.file_name() {
            Ok(name) => name,
            Err(err) => {
                debug!(dir = path, error = %err, "skipping entry with non-UTF-8 name");
                continue;
            }
        };
        // `file_type` does not follow symbolic links.
        let is_dir = entry.file_type().is_ok_and(|kind| kind.is_dir());
        entries.push(DirEntry { name, is_dir });
    }
    Ok(DirEntries::from(entries))
}

/// Classify `path` without following a final symbolic link.
pub(super) fn path_kind(path: &str) -> PathKind {
    match Utf8Path::new(path).symlink_metadata() {
        Ok(meta) if meta.is_dir() => PathKind::Dir,
        Ok(meta) if meta.is_file() => PathKind::File,
        Ok(_) => PathKind::Unknown,
        Err(err) => {
            trace!(path, error = %err, "path does not resolve");
            PathKind::Unknown
        }
    }
}
