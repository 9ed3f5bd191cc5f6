//! Crate-wide constants and type aliases.

/// Size in bytes of every page, on disk and in the buffer pool.
pub const PAGE_SIZE: usize = 4096;

/// Size in bytes of the per-file header prefix. One full page's worth, so
/// that page `k` always starts at byte `(k + 1) * PAGE_SIZE`.
pub const HEADER_SIZE: usize = PAGE_SIZE;

/// Default number of frames in the buffer pool when `set_buffer_size` is
/// never called before `init`.
pub const DEFAULT_BUFFER_SIZE: usize = 40;

/// Fixed capacity of the open-file table.
pub const OPEN_FILE_TABLE_SIZE: usize = 32;

/// A page number within a file. Free-list links and RHF slot chains thread
/// a `-1` terminator through this type, so it must be signed.
pub type PageNum = i32;

/// Sentinel meaning "no page" - end of a free list, or an empty frame.
pub const NO_PAGE: PageNum = -1;

/// Index into the buffer pool's frame table.
pub type FrameId = usize;

/// Index into the open-file table; this is the public "file descriptor".
pub type FileId = usize;

/// Sentinel meaning "no file" - an empty frame belongs to no file.
pub const NO_FILE: FileId = usize::MAX;

/// Slot number within a slotted page (RHF).
pub type SlotNum = i32;

/// Sentinel terminating a slotted-page free-slot chain, and marking a
/// deleted record's length.
pub const NO_SLOT: SlotNum = -1;
