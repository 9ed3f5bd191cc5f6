//! Component G: the public paged-file-manager facade.
//!
//! Wires together the open-file table (components B+F) and the buffer pool
//! (components C+D+E+G-core) behind the flat `create/destroy/open/close` +
//! `fix_*/alloc/dispose/unfix/mark_dirty` surface spec.md §6 names. Grounded
//! on the teacher's top-level `BufferPoolManager` entry points
//! (`new_page`/`fetch_page`/`unpin_page`/`delete_page`), generalized to
//! route every call through an explicit file descriptor rather than a
//! single implicit catalog file.

use std::path::Path;

use log::warn;

use crate::buffer::{BufferPool, Stats, Strategy};
use crate::common::config::{FileId, PageNum, DEFAULT_BUFFER_SIZE};
use crate::common::error::{report, PfError, PfResult};
use crate::storage::disk::DiskManager;
use crate::storage::disk::DiskScheduler;
use crate::storage::frame::Frame;
use crate::storage::open_file::{OpenFileEntry, OpenFileTable};

/// Process-wide PF state (Design Notes §9): open-file table, buffer pool,
/// and the pre-init configuration knobs. Modeled as an explicit object
/// rather than a hidden global, per the Design Notes' preferred style in a
/// systems language.
pub struct PagedFileManager {
    open_files: OpenFileTable,
    buffer_pool: Option<BufferPool>,
    buffer_size: usize,
    strategy: Strategy,
}

impl PagedFileManager {
    pub fn new() -> Self {
        PagedFileManager {
            open_files: OpenFileTable::new(),
            buffer_pool: None,
            buffer_size: DEFAULT_BUFFER_SIZE,
            strategy: Strategy::default(),
        }
    }

    /// Must precede `init` (implicitly triggered by the first file
    /// operation); once the buffer pool exists this is a no-op, logged as
    /// such rather than an error (spec.md §4.G: "no-op or error").
    pub fn set_buffer_size(&mut self, n: usize) {
        if self.buffer_pool.is_some() {
            warn!("set_buffer_size({n}) ignored: buffer pool already initialized");
            return;
        }
        self.buffer_size = n;
    }

    pub fn set_strategy(&mut self, strategy: Strategy) {
        self.strategy = strategy;
        if let Some(bp) = &mut self.buffer_pool {
            bp.set_strategy(strategy);
        }
    }

    /// One-shot lazy setup of the buffer pool. Safe to call repeatedly.
    pub fn init(&mut self) {
        if self.buffer_pool.is_none() {
            self.buffer_pool = Some(BufferPool::new(self.buffer_size, self.strategy));
        }
    }

    fn pool(&mut self) -> &mut BufferPool {
        self.init();
        self.buffer_pool.as_mut().unwrap()
    }

    pub fn create(&self, path: &Path) -> PfResult<()> {
        DiskManager::create(path)
    }

    pub fn destroy(&self, path: &Path) -> PfResult<()> {
        DiskManager::destroy(path)
    }

    pub fn open(&mut self, path: &Path) -> PfResult<FileId> {
        if self.open_files.is_open(path) {
            return Err(report(PfError::FileOpen));
        }
        let mut dm = DiskManager::open(path)?;
        let header = dm.read_header()?;
        self.open_files.insert(OpenFileEntry {
            path: path.to_path_buf(),
            scheduler: DiskScheduler::new(dm),
            header,
            header_dirty: false,
        })
    }

    /// Flushes every dirty frame of `fd`, writes back the header if dirty,
    /// and releases the OS descriptor. Fails `page_fixed` if any page of
    /// this file is still pinned.
    pub fn close(&mut self, fd: FileId) -> PfResult<()> {
        self.init();
        self.buffer_pool
            .as_mut()
            .unwrap()
            .flush_and_release_file(fd, &mut self.open_files)?;

        let entry = self.open_files.get_mut(fd)?;
        if entry.header_dirty {
            let header = entry.header;
            entry.scheduler.disk_manager_mut().write_header(&header)?;
            entry.header_dirty = false;
        }
        self.open_files.remove(fd)?;
        Ok(())
    }

    pub fn fix_this(&mut self, fd: FileId, page_num: PageNum) -> PfResult<Frame> {
        self.init();
        self.buffer_pool
            .as_mut()
            .unwrap()
            .fix_this(fd, page_num, &mut self.open_files)
    }

    pub fn fix_first(&mut self, fd: FileId) -> PfResult<(PageNum, Frame)> {
        self.init();
        self.buffer_pool
            .as_mut()
            .unwrap()
            .fix_first(fd, &mut self.open_files)
    }

    pub fn fix_next(&mut self, fd: FileId, cur: PageNum) -> PfResult<(PageNum, Frame)> {
        self.init();
        self.buffer_pool
            .as_mut()
            .unwrap()
            .fix_next(fd, cur, &mut self.open_files)
    }

    pub fn alloc(&mut self, fd: FileId) -> PfResult<(PageNum, Frame)> {
        self.init();
        self.buffer_pool
            .as_mut()
            .unwrap()
            .alloc(fd, &mut self.open_files)
    }

    pub fn dispose(&mut self, fd: FileId, page_num: PageNum) -> PfResult<()> {
        self.init();
        self.buffer_pool
            .as_mut()
            .unwrap()
            .dispose(fd, page_num, &mut self.open_files)
    }

    pub fn unfix(&mut self, fd: FileId, page_num: PageNum, dirty_hint: bool) -> PfResult<()> {
        self.pool().unfix(fd, page_num, dirty_hint)
    }

    pub fn mark_dirty(&mut self, fd: FileId, page_num: PageNum) -> PfResult<()> {
        self.pool().mark_dirty(fd, page_num)
    }

    pub fn reset_stats(&mut self) {
        self.pool().reset_stats();
    }

    pub fn get_stats(&mut self) -> (i64, i64, i64) {
        let Stats {
            logical_reads,
            physical_reads,
            physical_writes,
        } = self.pool().stats();
        (logical_reads, physical_reads, physical_writes)
    }
}

impl Default for PagedFileManager {
    fn default() -> Self {
        Self::new()
    }
}
