//! Synchronous facade in front of `DiskManager`.
//!
//! The teacher's `DiskScheduler` hands `DiskRequest`s to a background
//! worker thread over an mpsc channel and waits on a `tokio::oneshot` for
//! completion. spec.md §5 rules that out for this crate ("No internal
//! background threads, timers, or async continuations" - disk I/O is
//! blocking and synchronous), so this keeps the teacher's request-shaped
//! API but dispatches each request immediately, in the caller's own thread.

use crate::common::config::{PageNum, PAGE_SIZE};
use crate::common::error::PfResult;
use crate::storage::disk::DiskManager;

/// A read or write request against one page of an open file.
pub enum DiskRequest<'a> {
    Read {
        page_num: PageNum,
        buf: &'a mut [u8; PAGE_SIZE],
    },
    Write {
        page_num: PageNum,
        buf: &'a [u8; PAGE_SIZE],
    },
}

/// Dispatches disk requests against one `DiskManager`, synchronously.
pub struct DiskScheduler {
    disk_manager: DiskManager,
}

impl DiskScheduler {
    pub fn new(disk_manager: DiskManager) -> Self {
        Self { disk_manager }
    }

    /// Executes `req` immediately and returns once it has completed.
    pub fn schedule(&mut self, req: DiskRequest<'_>) -> PfResult<()> {
        match req {
            DiskRequest::Read { page_num, buf } => self.disk_manager.read_page(page_num, buf),
            DiskRequest::Write { page_num, buf } => self.disk_manager.write_page(page_num, buf),
        }
    }

    pub fn disk_manager_mut(&mut self) -> &mut DiskManager {
        &mut self.disk_manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn schedule_write_then_read() {
        let dir = TempDir::new("pflayer-sched").unwrap();
        let path = dir.path().join("test.db");
        DiskManager::create(&path).unwrap();
        let dm = DiskManager::open(&path).unwrap();
        let mut sched = DiskScheduler::new(dm);

        let mut data = [0u8; PAGE_SIZE];
        data[10] = 99;
        sched
            .schedule(DiskRequest::Write {
                page_num: 0,
                buf: &data,
            })
            .unwrap();

        let mut out = [0u8; PAGE_SIZE];
        sched
            .schedule(DiskRequest::Read {
                page_num: 0,
                buf: &mut out,
            })
            .unwrap();
        assert_eq!(out, data);
    }
}
