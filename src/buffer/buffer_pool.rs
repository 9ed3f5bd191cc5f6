//! Components C+D+G core: the frame table, hash index, and the fix/unfix/
//! alloc/dispose control flow.
//!
//! Grounded on the teacher's `BufferPoolManager` (`buffer/buffer_pool_manager.rs`):
//! same "free list first, then ask the replacer for a victim, write back if
//! dirty, then install the new identity" shape as `new_page`/`fetch_page`,
//! generalized from a single implicit file to the `(file_id, page_num)`
//! keyed model spec.md §3 calls for, and with the `logical_reads`/
//! `physical_reads`/`physical_writes` counters the teacher doesn't track.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::buffer::victim_list::{Strategy, VictimList};
use crate::common::config::{FileId, FrameId, PageNum, NO_PAGE, PAGE_SIZE};
use crate::common::error::{report, PfError, PfResult};
use crate::storage::disk::DiskRequest;
use crate::storage::frame::Frame;
use crate::storage::open_file::OpenFileTable;

/// The three monotonic counters from spec.md §3.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub logical_reads: i64,
    pub physical_reads: i64,
    pub physical_writes: i64,
}

/// The shared buffer pool: frame table, hash index, free list, victim list,
/// and I/O stats. One instance is shared by every open file.
pub struct BufferPool {
    frames: Vec<Frame>,
    hash_index: HashMap<(FileId, PageNum), FrameId>,
    free_frames: Vec<FrameId>,
    victim_list: VictimList,
    stats: Stats,
}

impl BufferPool {
    pub fn new(pool_size: usize, strategy: Strategy) -> Self {
        let frames = (0..pool_size).map(|_| Frame::empty()).collect();
        let free_frames = (0..pool_size).rev().collect();
        BufferPool {
            frames,
            hash_index: HashMap::new(),
            free_frames,
            victim_list: VictimList::new(pool_size, strategy),
            stats: Stats::default(),
        }
    }

    pub fn pool_size(&self) -> usize {
        self.frames.len()
    }

    pub fn set_strategy(&mut self, strategy: Strategy) {
        self.victim_list.set_strategy(strategy);
    }

    pub fn reset_stats(&mut self) {
        self.stats = Stats::default();
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Fixes `(file_id, page_num)`, following spec.md §4.G exactly: a hit
    /// pins and (if it transitions 0 -> 1) detaches from the victim list; a
    /// miss obtains a frame, reads the page, and installs its identity.
    /// Rejects a page on the free list (spec.md §7: `invalid_page` covers
    /// both out-of-range and free-listed page numbers). Internal callers
    /// that must legitimately touch a free page (`alloc`'s recycle path,
    /// `dispose`, `collect_free_set` itself) call `fix_impl` directly.
    pub fn fix_this(
        &mut self,
        file_id: FileId,
        page_num: PageNum,
        table: &mut OpenFileTable,
    ) -> PfResult<Frame> {
        let free_set = self.collect_free_set(file_id, table)?;
        if free_set.contains(&page_num) {
            return Err(report(PfError::InvalidPage));
        }
        self.fix_impl(file_id, page_num, table, true)
    }

    fn fix_impl(
        &mut self,
        file_id: FileId,
        page_num: PageNum,
        table: &mut OpenFileTable,
        count_stats: bool,
    ) -> PfResult<Frame> {
        let num_pages = table.get(file_id)?.header.num_pages;
        if page_num < 0 || page_num >= num_pages {
            return Err(report(PfError::InvalidPage));
        }

        if let Some(&frame_id) = self.hash_index.get(&(file_id, page_num)) {
            let frame = self.frames[frame_id].clone();
            let prev_pin = frame.pin_count();
            frame.pin();
            if prev_pin == 0 {
                self.victim_list.remove_on_fix(frame_id);
            }
            if count_stats {
                self.stats.logical_reads += 1;
            }
            return Ok(frame);
        }

        if count_stats {
            self.stats.logical_reads += 1;
            self.stats.physical_reads += 1;
        }

        let frame_id = self.obtain_frame(table)?;
        let frame = self.frames[frame_id].clone();

        let mut data = [0u8; PAGE_SIZE];
        let entry = table.get_mut(file_id)?;
        entry.scheduler.schedule(DiskRequest::Read {
            page_num,
            buf: &mut data,
        })?;

        frame.replace_data(data);
        frame.set_identity(file_id, page_num);
        frame.set_pin_count(1);
        frame.clear_dirty();
        self.hash_index.insert((file_id, page_num), frame_id);
        Ok(frame)
    }

    /// Obtains a frame to house a newly-fixed page: the free list first,
    /// else a victim (writing it back if dirty).
    fn obtain_frame(&mut self, table: &mut OpenFileTable) -> PfResult<FrameId> {
        if let Some(frame_id) = self.free_frames.pop() {
            return Ok(frame_id);
        }

        let frame_id = self
            .victim_list
            .select_victim()
            .ok_or_else(|| report(PfError::NoBuffer))?;
        let frame = self.frames[frame_id].clone();
        let (old_file, old_page) = frame.identity();

        if frame.is_dirty() {
            let data = *frame.get_data();
            let entry = table.get_mut(old_file)?;
            entry.scheduler.schedule(DiskRequest::Write {
                page_num: old_page,
                buf: &data,
            })?;
            self.stats.physical_writes += 1;
            frame.clear_dirty();
            debug!("wrote back dirty victim frame {frame_id} (file {old_file}, page {old_page})");
        }

        self.hash_index.remove(&(old_file, old_page));
        frame.reset();
        Ok(frame_id)
    }

    /// Walks the free-page chain, fixing/unfixing each link internally
    /// without touching the public stats counters (this traversal is PF
    /// housekeeping, not a client-visible page request).
    fn collect_free_set(
        &mut self,
        file_id: FileId,
        table: &mut OpenFileTable,
    ) -> PfResult<HashSet<PageNum>> {
        let mut set = HashSet::new();
        let mut cur = table.get(file_id)?.header.first_free;
        while cur != NO_PAGE {
            if !set.insert(cur) {
                break; // defensive cycle guard; a well-formed chain never loops.
            }
            let frame = self.fix_impl(file_id, cur, table, false)?;
            let next = PageNum::from_le_bytes(frame.get_data()[0..4].try_into().unwrap());
            self.unfix(file_id, cur, false)?;
            cur = next;
        }
        Ok(set)
    }

    /// `fix_next`: the smallest allocated, non-free page number strictly
    /// greater than `cur`. `fix_first` is this with `cur = NO_PAGE`.
    pub fn fix_next(
        &mut self,
        file_id: FileId,
        cur: PageNum,
        table: &mut OpenFileTable,
    ) -> PfResult<(PageNum, Frame)> {
        let free_set = self.collect_free_set(file_id, table)?;
        let num_pages = table.get(file_id)?.header.num_pages;
        let mut candidate = cur + 1;
        while candidate < num_pages {
            if !free_set.contains(&candidate) {
                // Already confirmed not free above; fix_impl avoids redoing
                // that walk the way the public fix_this would.
                let frame = self.fix_impl(file_id, candidate, table, true)?;
                return Ok((candidate, frame));
            }
            candidate += 1;
        }
        Err(report(PfError::Eof))
    }

    pub fn fix_first(
        &mut self,
        file_id: FileId,
        table: &mut OpenFileTable,
    ) -> PfResult<(PageNum, Frame)> {
        self.fix_next(file_id, NO_PAGE, table)
    }

    /// Allocates a page: recycles the free list's head if non-empty
    /// (zeroing its contents), else grows the file by one page.
    pub fn alloc(
        &mut self,
        file_id: FileId,
        table: &mut OpenFileTable,
    ) -> PfResult<(PageNum, Frame)> {
        let first_free = table.get(file_id)?.header.first_free;

        if first_free != NO_PAGE {
            let page_num = first_free;
            let frame = self.fix_impl(file_id, page_num, table, false)?;
            let next = PageNum::from_le_bytes(frame.get_data()[0..4].try_into().unwrap());

            let entry = table.get_mut(file_id)?;
            entry.header.first_free = next;
            entry.header_dirty = true;

            frame.get_data_mut().fill(0);
            frame.set_dirty(true);
            Ok((page_num, frame))
        } else {
            let page_num;
            {
                let entry = table.get_mut(file_id)?;
                page_num = entry.header.num_pages;
                entry.header.num_pages += 1;
                entry.header_dirty = true;
            }

            let frame_id = self.obtain_frame(table)?;
            let frame = self.frames[frame_id].clone();
            // frame.reset() (inside obtain_frame) already zeroed the data;
            // this page has never existed on disk.
            frame.set_identity(file_id, page_num);
            frame.set_pin_count(1);
            frame.set_dirty(true);
            self.hash_index.insert((file_id, page_num), frame_id);
            Ok((page_num, frame))
        }
    }

    /// Disposes an unfixed page: threads it onto the front of the free
    /// list, storing the previous head in its first 4 bytes.
    pub fn dispose(
        &mut self,
        file_id: FileId,
        page_num: PageNum,
        table: &mut OpenFileTable,
    ) -> PfResult<()> {
        let num_pages = table.get(file_id)?.header.num_pages;
        if page_num < 0 || page_num >= num_pages {
            return Err(report(PfError::InvalidPage));
        }
        if let Some(&frame_id) = self.hash_index.get(&(file_id, page_num)) {
            if self.frames[frame_id].pin_count() > 0 {
                return Err(report(PfError::PageFixed));
            }
        }

        let free_set = self.collect_free_set(file_id, table)?;
        if free_set.contains(&page_num) {
            return Err(report(PfError::PageFree));
        }

        let frame = self.fix_impl(file_id, page_num, table, false)?;
        let prev_head = table.get(file_id)?.header.first_free;
        frame.get_data_mut()[0..4].copy_from_slice(&prev_head.to_le_bytes());

        let entry = table.get_mut(file_id)?;
        entry.header.first_free = page_num;
        entry.header_dirty = true;

        self.unfix(file_id, page_num, true)?;
        Ok(())
    }

    /// Unfixes a page; once `pin_count` reaches zero the frame rejoins the
    /// victim list at the MRU end.
    pub fn unfix(
        &mut self,
        file_id: FileId,
        page_num: PageNum,
        dirty_hint: bool,
    ) -> PfResult<()> {
        let Some(&frame_id) = self.hash_index.get(&(file_id, page_num)) else {
            return Err(report(PfError::PageNotInBuf));
        };
        let frame = self.frames[frame_id].clone();
        if frame.pin_count() == 0 {
            return Err(report(PfError::PageUnfixed));
        }
        frame.set_dirty(dirty_hint);
        if frame.unpin() == 0 {
            self.victim_list.insert_on_unfix(frame_id);
        }
        Ok(())
    }

    /// Marks a fixed page dirty. Per spec.md's Design Notes, the
    /// recency-touch this implies is realized for free: `unfix` always
    /// reinserts at the MRU end regardless of history, so no extra
    /// per-frame timestamp is needed here.
    pub fn mark_dirty(&mut self, file_id: FileId, page_num: PageNum) -> PfResult<()> {
        let Some(&frame_id) = self.hash_index.get(&(file_id, page_num)) else {
            return Err(report(PfError::PageNotInBuf));
        };
        let frame = self.frames[frame_id].clone();
        if frame.pin_count() == 0 {
            return Err(report(PfError::PageUnfixed));
        }
        frame.set_dirty(true);
        Ok(())
    }

    /// Flushes every dirty frame belonging to `file_id` and releases its
    /// frames back to the free list. Fails if any of its pages are still
    /// fixed.
    pub fn flush_and_release_file(
        &mut self,
        file_id: FileId,
        table: &mut OpenFileTable,
    ) -> PfResult<()> {
        let frame_ids: Vec<FrameId> = self
            .hash_index
            .iter()
            .filter(|(&(f, _), _)| f == file_id)
            .map(|(_, &fid)| fid)
            .collect();

        for &frame_id in &frame_ids {
            if self.frames[frame_id].pin_count() > 0 {
                return Err(report(PfError::PageFixed));
            }
        }

        for &frame_id in &frame_ids {
            let frame = self.frames[frame_id].clone();
            let (_, page_num) = frame.identity();
            if frame.is_dirty() {
                let data = *frame.get_data();
                let entry = table.get_mut(file_id)?;
                entry.scheduler.schedule(DiskRequest::Write {
                    page_num,
                    buf: &data,
                })?;
                self.stats.physical_writes += 1;
                frame.clear_dirty();
            }
            self.hash_index.remove(&(file_id, page_num));
            self.victim_list.remove(frame_id);
            frame.reset();
            self.free_frames.push(frame_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::disk::DiskManager;
    use crate::storage::open_file::OpenFileEntry;
    use crate::storage::disk::disk_manager::FileHeader;
    use crate::storage::disk::DiskScheduler;
    use tempdir::TempDir;

    fn open_entry(table: &mut OpenFileTable, path: std::path::PathBuf, num_pages: PageNum) -> FileId {
        DiskManager::create(&path).unwrap();
        let mut dm = DiskManager::open(&path).unwrap();
        dm.write_header(&FileHeader {
            num_pages,
            first_free: -1,
        })
        .unwrap();
        for p in 0..num_pages {
            dm.write_page(p, &[0u8; PAGE_SIZE]).unwrap();
        }
        table
            .insert(OpenFileEntry {
                path,
                scheduler: DiskScheduler::new(dm),
                header: FileHeader {
                    num_pages,
                    first_free: -1,
                },
                header_dirty: false,
            })
            .unwrap()
    }

    #[test]
    fn no_buffer_on_third_fix_with_pool_of_two() {
        let dir = TempDir::new("pflayer-bp").unwrap();
        let mut table = OpenFileTable::new();
        let fd = open_entry(&mut table, dir.path().join("f.db"), 3);
        let mut bp = BufferPool::new(2, Strategy::Lru);

        bp.fix_this(fd, 0, &mut table).unwrap();
        bp.fix_this(fd, 1, &mut table).unwrap();
        let err = bp.fix_this(fd, 2, &mut table).unwrap_err();
        assert_eq!(err, PfError::NoBuffer);
    }

    #[test]
    fn pin_count_blocks_eviction_until_fully_unfixed() {
        let dir = TempDir::new("pflayer-bp").unwrap();
        let mut table = OpenFileTable::new();
        let fd = open_entry(&mut table, dir.path().join("f.db"), 4);
        let mut bp = BufferPool::new(1, Strategy::Lru);

        bp.fix_this(fd, 3, &mut table).unwrap();
        bp.fix_this(fd, 3, &mut table).unwrap();
        assert_eq!(bp.frames[*bp.hash_index.get(&(fd, 3)).unwrap()].pin_count(), 2);

        bp.unfix(fd, 3, false).unwrap();
        assert!(!bp.victim_list.contains(*bp.hash_index.get(&(fd, 3)).unwrap()));

        bp.unfix(fd, 3, true).unwrap();
        let frame_id = *bp.hash_index.get(&(fd, 3)).unwrap();
        assert!(bp.victim_list.contains(frame_id));
        assert!(bp.frames[frame_id].is_dirty());
    }

    #[test]
    fn alloc_dispose_alloc_recycles_zeroed_page() {
        let dir = TempDir::new("pflayer-bp").unwrap();
        let mut table = OpenFileTable::new();
        let fd = open_entry(&mut table, dir.path().join("f.db"), 0);
        let mut bp = BufferPool::new(4, Strategy::Lru);

        let (p0, frame0) = bp.alloc(fd, &mut table).unwrap();
        frame0.get_data_mut()[0] = 9;
        bp.unfix(fd, p0, true).unwrap();

        let (p1, _) = bp.alloc(fd, &mut table).unwrap();
        bp.unfix(fd, p1, true).unwrap();
        assert_eq!((p0, p1), (0, 1));

        bp.dispose(fd, p0, &mut table).unwrap();

        let (p2, frame2) = bp.alloc(fd, &mut table).unwrap();
        assert_eq!(p2, p0);
        assert_eq!(frame2.get_data()[0], 0);
        bp.unfix(fd, p2, false).unwrap();
    }
}
