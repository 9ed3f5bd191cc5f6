use crate::common::config::{FileId, PageNum, SlotNum, NO_PAGE, NO_SLOT};
use crate::storage::frame::Frame;

/// Scan cursor (spec.md §4.I): `{fd, current_page, current_slot,
/// page_is_fixed}`. `current_frame` caches the currently-fixed page's
/// handle directly (Frame is a cheap `Arc` clone) instead of the boolean
/// the spec describes, so `RhfManager::next` never has to re-fix a page it
/// is already holding; `current_frame.is_some()` is exactly
/// `page_is_fixed`.
pub struct RhfScan {
    pub(crate) fd: FileId,
    pub(crate) current_page: PageNum,
    pub(crate) current_slot: SlotNum,
    pub(crate) current_frame: Option<Frame>,
}

impl RhfScan {
    pub(crate) fn new(fd: FileId) -> Self {
        RhfScan {
            fd,
            current_page: NO_PAGE,
            current_slot: NO_SLOT,
            current_frame: None,
        }
    }
}
