//! Component H: the slotted-page codec.
//!
//! Ported from `original_source/pflayer/rhf.c`'s page layout: a 12-byte
//! header (`num_slots`, `free_space_ptr`, `next_free_slot`), then a
//! forward-growing array of 8-byte slots, with record bytes packed backward
//! from the end of the page. Manual little-endian encode/decode, the same
//! hand-rolled-codec idiom `storage::disk::disk_manager::FileHeader` uses
//! rather than reaching for `byteorder`.

use crate::common::config::{PAGE_SIZE, NO_SLOT};

pub const HEADER_LEN: usize = 12;
pub const SLOT_LEN: usize = 8;

/// The three-field page header at offset 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    pub num_slots: i32,
    pub free_space_ptr: i32,
    pub next_free_slot: i32,
}

impl PageHeader {
    /// A brand-new page: no slots, all `PAGE_SIZE` bytes free, empty free-slot chain.
    pub fn fresh() -> Self {
        PageHeader {
            num_slots: 0,
            free_space_ptr: PAGE_SIZE as i32,
            next_free_slot: NO_SLOT,
        }
    }

    /// Bytes available for a new record, accounting for the slot array's
    /// current size.
    pub fn free_space(&self) -> i32 {
        self.free_space_ptr - (HEADER_LEN as i32 + self.num_slots * SLOT_LEN as i32)
    }
}

/// One slot entry: `record_offset`/`record_length` for a live record, or
/// (`next free-chain link`, `-1`) for a deleted one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub record_offset: i32,
    pub record_length: i32,
}

impl Slot {
    pub fn is_deleted(&self) -> bool {
        self.record_length == NO_SLOT
    }
}

pub fn read_header(data: &[u8; PAGE_SIZE]) -> PageHeader {
    PageHeader {
        num_slots: i32::from_le_bytes(data[0..4].try_into().unwrap()),
        free_space_ptr: i32::from_le_bytes(data[4..8].try_into().unwrap()),
        next_free_slot: i32::from_le_bytes(data[8..12].try_into().unwrap()),
    }
}

pub fn write_header(data: &mut [u8; PAGE_SIZE], header: &PageHeader) {
    data[0..4].copy_from_slice(&header.num_slots.to_le_bytes());
    data[4..8].copy_from_slice(&header.free_space_ptr.to_le_bytes());
    data[8..12].copy_from_slice(&header.next_free_slot.to_le_bytes());
}

fn slot_offset(slot_num: i32) -> usize {
    HEADER_LEN + slot_num as usize * SLOT_LEN
}

pub fn read_slot(data: &[u8; PAGE_SIZE], slot_num: i32) -> Slot {
    let o = slot_offset(slot_num);
    Slot {
        record_offset: i32::from_le_bytes(data[o..o + 4].try_into().unwrap()),
        record_length: i32::from_le_bytes(data[o + 4..o + 8].try_into().unwrap()),
    }
}

pub fn write_slot(data: &mut [u8; PAGE_SIZE], slot_num: i32, slot: Slot) {
    let o = slot_offset(slot_num);
    data[o..o + 4].copy_from_slice(&slot.record_offset.to_le_bytes());
    data[o + 4..o + 8].copy_from_slice(&slot.record_length.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_page_has_full_free_space() {
        let header = PageHeader::fresh();
        assert_eq!(header.free_space(), PAGE_SIZE as i32 - HEADER_LEN as i32);
    }

    #[test]
    fn header_roundtrip() {
        let mut data = [0u8; PAGE_SIZE];
        let header = PageHeader {
            num_slots: 3,
            free_space_ptr: 4000,
            next_free_slot: 1,
        };
        write_header(&mut data, &header);
        assert_eq!(read_header(&data), header);
    }

    #[test]
    fn slot_roundtrip_and_free_space_shrinks_per_slot() {
        let mut data = [0u8; PAGE_SIZE];
        let mut header = PageHeader::fresh();
        header.num_slots = 2;
        let before = header.free_space();
        write_slot(
            &mut data,
            0,
            Slot {
                record_offset: 4090,
                record_length: 6,
            },
        );
        write_slot(
            &mut data,
            1,
            Slot {
                record_offset: -1,
                record_length: -1,
            },
        );
        assert_eq!(
            read_slot(&data, 0),
            Slot {
                record_offset: 4090,
                record_length: 6
            }
        );
        assert!(read_slot(&data, 1).is_deleted());
        assert_eq!(before, PAGE_SIZE as i32 - HEADER_LEN as i32 - 2 * SLOT_LEN as i32);
    }
}
