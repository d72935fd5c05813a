//! File identity and change detection for the follow engine.

use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// identity of an open file, stable across renames but not across replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileId {
    dev: u64,
    ino: u64,
}

#[cfg(unix)]
fn file_id(md: &fs::Metadata) -> FileId {
    use std::os::unix::fs::MetadataExt;
    FileId {
        dev: md.dev(),
        ino: md.ino(),
    }
}

#[cfg(not(unix))]
fn file_id(md: &fs::Metadata) -> FileId {
    // no inode available; creation time is the closest stable identity
    let created = md
        .created()
        .ok()
        .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    FileId { dev: 0, ino: created }
}

/// point-in-time snapshot of a file's identity and growth state
#[derive(Debug, Clone, Copy)]
pub struct MetaSnap {
    pub id: FileId,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

pub fn stat_path(path: &Path) -> io::Result<MetaSnap> {
    let md = fs::metadata(path)?;
    Ok(MetaSnap {
        id: file_id(&md),
        len: md.len(),
        modified: md.modified().ok(),
    })
}

/// true when the file grew, shrank, was replaced, or was touched
pub fn has_changed(prev: &Option<MetaSnap>, cur: &MetaSnap) -> bool {
    match prev {
        None => true,
        Some(p) => p.id != cur.id || p.len != cur.len || p.modified != cur.modified,
    }
}
