//! Component C element: one slot in the buffer pool.
//!
//! Ported from the teacher's `Page` (`Arc<RwLock<PageInner>>`, `parking_lot`
//! mapped guards for stable data access) and renamed to `Frame` to match
//! spec.md's vocabulary - a "page" is the logical 4096 bytes on disk, a
//! "frame" is the buffer-pool slot that may hold one.

use std::sync::Arc;

use parking_lot::{MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::config::{FileId, PageNum, PAGE_SIZE, NO_FILE, NO_PAGE};

#[derive(Debug)]
struct FrameInner {
    data: [u8; PAGE_SIZE],
    file_id: FileId,
    page_num: PageNum,
    pin_count: i32,
    dirty: bool,
}

/// A buffer-pool frame. Cheaply clonable; all clones share the same
/// underlying storage, so a fixed frame's data pointer stays stable for as
/// long as any clone is held (Design Notes: "pointer stability under move").
#[derive(Debug, Clone)]
pub struct Frame(Arc<RwLock<FrameInner>>);

impl Frame {
    /// A fresh, empty frame: no resident page, unpinned, clean.
    pub fn empty() -> Frame {
        Frame(Arc::new(RwLock::new(FrameInner {
            data: [0; PAGE_SIZE],
            file_id: NO_FILE,
            page_num: NO_PAGE,
            pin_count: 0,
            dirty: false,
        })))
    }

    /// Resets the frame back to empty: zeroed data, no identity, unpinned,
    /// clean.
    pub fn reset(&self) {
        let mut inner = self.0.write();
        inner.data.fill(0);
        inner.file_id = NO_FILE;
        inner.page_num = NO_PAGE;
        inner.pin_count = 0;
        inner.dirty = false;
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().file_id == NO_FILE
    }

    pub fn identity(&self) -> (FileId, PageNum) {
        let inner = self.0.read();
        (inner.file_id, inner.page_num)
    }

    pub fn set_identity(&self, file_id: FileId, page_num: PageNum) {
        let mut inner = self.0.write();
        inner.file_id = file_id;
        inner.page_num = page_num;
    }

    pub fn pin_count(&self) -> i32 {
        self.0.read().pin_count
    }

    pub fn pin(&self) {
        self.0.write().pin_count += 1;
    }

    /// Decrements the pin count and returns the new value.
    pub fn unpin(&self) -> i32 {
        let mut inner = self.0.write();
        inner.pin_count -= 1;
        inner.pin_count
    }

    pub fn set_pin_count(&self, n: i32) {
        self.0.write().pin_count = n;
    }

    pub fn is_dirty(&self) -> bool {
        self.0.read().dirty
    }

    pub fn set_dirty(&self, dirty: bool) {
        // `dirty` is sticky: once set, only an explicit write-back clears it.
        let mut inner = self.0.write();
        inner.dirty = inner.dirty || dirty;
    }

    pub fn clear_dirty(&self) {
        self.0.write().dirty = false;
    }

    pub fn get_data(&self) -> MappedRwLockReadGuard<'_, [u8; PAGE_SIZE]> {
        RwLockReadGuard::map(self.0.read(), |i| &i.data)
    }

    pub fn get_data_mut(&self) -> MappedRwLockWriteGuard<'_, [u8; PAGE_SIZE]> {
        RwLockWriteGuard::map(self.0.write(), |i| &mut i.data)
    }

    pub fn replace_data(&self, data: [u8; PAGE_SIZE]) {
        self.0.write().data = data;
    }
}

impl Default for Frame {
    fn default() -> Self {
        Frame::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_frame_is_empty_and_unpinned() {
        let f = Frame::empty();
        assert!(f.is_empty());
        assert_eq!(f.pin_count(), 0);
        assert!(!f.is_dirty());
    }

    #[test]
    fn pin_unpin_tracks_count() {
        let f = Frame::empty();
        f.pin();
        f.pin();
        assert_eq!(f.pin_count(), 2);
        assert_eq!(f.unpin(), 1);
        assert_eq!(f.unpin(), 0);
    }

    #[test]
    fn dirty_is_sticky() {
        let f = Frame::empty();
        f.set_dirty(false);
        assert!(!f.is_dirty());
        f.set_dirty(true);
        f.set_dirty(false);
        assert!(f.is_dirty());
        f.clear_dirty();
        assert!(!f.is_dirty());
    }

    #[test]
    fn reset_clears_identity_and_data() {
        let f = Frame::empty();
        f.set_identity(3, 7);
        f.get_data_mut()[0] = 1;
        f.set_dirty(true);
        f.pin();

        f.reset();
        assert!(f.is_empty());
        assert_eq!(f.pin_count(), 0);
        assert!(!f.is_dirty());
        assert_eq!(f.get_data()[0], 0);
    }
}
