use crate::common::config::{PageNum, SlotNum};

/// Record identifier: stable across inserts/deletes on the same page so
/// long as the slot isn't reassigned by a later insert to that page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rid {
    pub page_num: PageNum,
    pub slot_num: SlotNum,
}
