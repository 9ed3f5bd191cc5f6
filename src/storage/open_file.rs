//! Components B+F: per-file header and the open-file table.

use std::path::PathBuf;

use crate::common::config::{FileId, OPEN_FILE_TABLE_SIZE};
use crate::common::error::{report, PfError, PfResult};
use crate::storage::disk::disk_manager::FileHeader;
use crate::storage::disk::DiskScheduler;

/// One entry in the open-file table: the file's identity, its disk I/O
/// path, and its in-memory header. Whether any of its pages are pinned is
/// derived from frame pin counts at `close` time, not tracked here.
pub struct OpenFileEntry {
    pub path: PathBuf,
    pub scheduler: DiskScheduler,
    pub header: FileHeader,
    pub header_dirty: bool,
}

/// Fixed-capacity table of currently open files. Slot index doubles as the
/// public file descriptor.
pub struct OpenFileTable {
    slots: Vec<Option<OpenFileEntry>>,
}

impl OpenFileTable {
    pub fn new() -> Self {
        let mut slots = Vec::with_capacity(OPEN_FILE_TABLE_SIZE);
        slots.resize_with(OPEN_FILE_TABLE_SIZE, || None);
        OpenFileTable { slots }
    }

    /// Inserts `entry` into the first free slot, returning its index (the
    /// file descriptor). Fails if the table is full.
    pub fn insert(&mut self, entry: OpenFileEntry) -> PfResult<FileId> {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(entry);
                return Ok(i);
            }
        }
        Err(report(PfError::FileTableFull))
    }

    pub fn get(&self, fd: FileId) -> PfResult<&OpenFileEntry> {
        self.slots
            .get(fd)
            .and_then(|s| s.as_ref())
            .ok_or_else(|| report(PfError::BadFd))
    }

    pub fn get_mut(&mut self, fd: FileId) -> PfResult<&mut OpenFileEntry> {
        self.slots
            .get_mut(fd)
            .and_then(|s| s.as_mut())
            .ok_or_else(|| report(PfError::BadFd))
    }

    /// Returns true if `path` is currently open in some slot.
    pub fn is_open(&self, path: &std::path::Path) -> bool {
        self.slots
            .iter()
            .flatten()
            .any(|entry| entry.path == path)
    }

    /// Removes and returns the entry at `fd`, leaving the slot empty.
    pub fn remove(&mut self, fd: FileId) -> PfResult<OpenFileEntry> {
        self.slots
            .get_mut(fd)
            .and_then(|s| s.take())
            .ok_or_else(|| report(PfError::BadFd))
    }
}

impl Default for OpenFileTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::disk::DiskManager;
    use tempdir::TempDir;

    fn entry(path: PathBuf) -> OpenFileEntry {
        DiskManager::create(&path).unwrap();
        let dm = DiskManager::open(&path).unwrap();
        OpenFileEntry {
            path,
            scheduler: DiskScheduler::new(dm),
            header: FileHeader {
                num_pages: 0,
                first_free: -1,
            },
            header_dirty: false,
        }
    }

    #[test]
    fn insert_get_remove() {
        let dir = TempDir::new("pflayer-oft").unwrap();
        let mut table = OpenFileTable::new();
        let fd = table.insert(entry(dir.path().join("a.db"))).unwrap();
        assert!(table.get(fd).is_ok());
        table.remove(fd).unwrap();
        assert!(table.get(fd).is_err());
    }

    #[test]
    fn full_table_errors() {
        let dir = TempDir::new("pflayer-oft").unwrap();
        let mut table = OpenFileTable::new();
        for i in 0..OPEN_FILE_TABLE_SIZE {
            table
                .insert(entry(dir.path().join(format!("f{i}.db"))))
                .unwrap();
        }
        let err = table
            .insert(entry(dir.path().join("overflow.db")))
            .unwrap_err();
        assert_eq!(err, PfError::FileTableFull);
    }
}
