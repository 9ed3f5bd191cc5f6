//! Component I: record/heap-file operations over PF pages.
//!
//! Ported line-for-line from `original_source/pflayer/rhf.c`'s
//! `RHF_InsertRec`/`RHF_GetRecord`/`RHF_DeleteRecord`/`RHF_GetNextRecord`
//! control flow, rebuilt on top of `PagedFileManager` instead of calling the
//! PF C functions directly.

use std::path::Path;

use log::debug;

use crate::common::config::{FileId, PageNum, NO_PAGE, NO_SLOT};
use crate::common::error::{report_rhf, PfError, RhfError, RhfResult};
use crate::pf::PagedFileManager;
use crate::rhf::rid::Rid;
use crate::rhf::scan::RhfScan;
use crate::rhf::slotted_page::{self, Slot};

pub struct RhfManager {
    pf: PagedFileManager,
}

impl RhfManager {
    pub fn new() -> Self {
        RhfManager {
            pf: PagedFileManager::new(),
        }
    }

    pub fn set_buffer_size(&mut self, n: usize) {
        self.pf.set_buffer_size(n);
    }

    pub fn set_strategy(&mut self, strategy: crate::buffer::Strategy) {
        self.pf.set_strategy(strategy);
    }

    pub fn create(&self, path: &Path) -> RhfResult<()> {
        Ok(self.pf.create(path)?)
    }

    pub fn destroy(&self, path: &Path) -> RhfResult<()> {
        Ok(self.pf.destroy(path)?)
    }

    pub fn open(&mut self, path: &Path) -> RhfResult<FileId> {
        Ok(self.pf.open(path)?)
    }

    pub fn close(&mut self, fd: FileId) -> RhfResult<()> {
        Ok(self.pf.close(fd)?)
    }

    /// Finds a page with enough free space (scanning from the start via
    /// `fix_next`), or allocates and initializes a fresh one, writes the
    /// record, and returns its `Rid`.
    pub fn insert(&mut self, fd: FileId, bytes: &[u8]) -> RhfResult<Rid> {
        let length = bytes.len() as i32;
        let mut cur: PageNum = NO_PAGE;

        let (page_num, frame) = loop {
            match self.pf.fix_next(fd, cur) {
                Ok((page_num, frame)) => {
                    let header = slotted_page::read_header(&frame.get_data());
                    let needs_new_slot = header.next_free_slot == NO_SLOT;
                    let required = length + if needs_new_slot { slotted_page::SLOT_LEN as i32 } else { 0 };
                    if header.free_space() >= required {
                        break (page_num, frame);
                    }
                    self.pf.unfix(fd, page_num, false)?;
                    cur = page_num;
                }
                Err(PfError::Eof) => {
                    let (page_num, frame) = self.pf.alloc(fd)?;
                    slotted_page::write_header(&mut frame.get_data_mut(), &slotted_page::PageHeader::fresh());
                    debug!("rhf: allocated fresh page {page_num} for insert");
                    break (page_num, frame);
                }
                Err(e) => return Err(e.into()),
            }
        };

        let mut header = slotted_page::read_header(&frame.get_data());

        let slot_num = if header.next_free_slot != NO_SLOT {
            let slot_num = header.next_free_slot;
            let reused = slotted_page::read_slot(&frame.get_data(), slot_num);
            header.next_free_slot = reused.record_offset;
            slot_num
        } else {
            let slot_num = header.num_slots;
            header.num_slots += 1;
            slot_num
        };

        header.free_space_ptr -= length;
        let offset = header.free_space_ptr;

        {
            let mut data = frame.get_data_mut();
            data[offset as usize..offset as usize + bytes.len()].copy_from_slice(bytes);
        }
        slotted_page::write_slot(
            &mut frame.get_data_mut(),
            slot_num,
            Slot {
                record_offset: offset,
                record_length: length,
            },
        );
        slotted_page::write_header(&mut frame.get_data_mut(), &header);

        self.pf.unfix(fd, page_num, true)?;
        Ok(Rid { page_num, slot_num })
    }

    /// Reads a record's bytes. Idiomatic deviation from the source's
    /// caller-sized output buffer (spec.md §9 allows this as "a safer
    /// variant"): returns an owned `Vec<u8>` instead.
    pub fn get(&mut self, fd: FileId, rid: Rid) -> RhfResult<Vec<u8>> {
        let frame = self.pf.fix_this(fd, rid.page_num)?;
        let header = slotted_page::read_header(&frame.get_data());
        if rid.slot_num < 0 || rid.slot_num >= header.num_slots {
            self.pf.unfix(fd, rid.page_num, false)?;
            return Err(report_rhf(RhfError::InvalidRid));
        }
        let slot = slotted_page::read_slot(&frame.get_data(), rid.slot_num);
        if slot.is_deleted() {
            self.pf.unfix(fd, rid.page_num, false)?;
            return Err(report_rhf(RhfError::NoRecord));
        }
        let start = slot.record_offset as usize;
        let end = start + slot.record_length as usize;
        let bytes = frame.get_data()[start..end].to_vec();
        self.pf.unfix(fd, rid.page_num, false)?;
        Ok(bytes)
    }

    /// Threads the slot onto the free-slot chain; record bytes are not
    /// reclaimed (spec.md §4.I).
    pub fn delete(&mut self, fd: FileId, rid: Rid) -> RhfResult<()> {
        let frame = self.pf.fix_this(fd, rid.page_num)?;
        let mut header = slotted_page::read_header(&frame.get_data());
        if rid.slot_num < 0 || rid.slot_num >= header.num_slots {
            self.pf.unfix(fd, rid.page_num, false)?;
            return Err(report_rhf(RhfError::InvalidRid));
        }
        let slot = slotted_page::read_slot(&frame.get_data(), rid.slot_num);
        if slot.is_deleted() {
            self.pf.unfix(fd, rid.page_num, false)?;
            return Err(report_rhf(RhfError::NoRecord));
        }

        slotted_page::write_slot(
            &mut frame.get_data_mut(),
            rid.slot_num,
            Slot {
                record_offset: header.next_free_slot,
                record_length: NO_SLOT,
            },
        );
        header.next_free_slot = rid.slot_num;
        slotted_page::write_header(&mut frame.get_data_mut(), &header);

        self.pf.unfix(fd, rid.page_num, true)?;
        Ok(())
    }

    pub fn start_scan(&self, fd: FileId) -> RhfScan {
        RhfScan::new(fd)
    }

    /// Advances `scan` to the next live record, fixing pages as needed and
    /// unfixing each one before moving to the next (at most one page fixed
    /// by a given scan at any time).
    pub fn next(&mut self, scan: &mut RhfScan) -> RhfResult<(Rid, Vec<u8>)> {
        loop {
            if scan.current_frame.is_none() {
                match self.pf.fix_next(scan.fd, scan.current_page) {
                    Ok((page_num, frame)) => {
                        scan.current_page = page_num;
                        scan.current_slot = 0;
                        scan.current_frame = Some(frame);
                    }
                    Err(PfError::Eof) => return Err(report_rhf(RhfError::Eof)),
                    Err(e) => return Err(e.into()),
                }
            }

            let frame = scan.current_frame.as_ref().unwrap().clone();
            let header = slotted_page::read_header(&frame.get_data());

            while scan.current_slot < header.num_slots {
                let slot_num = scan.current_slot;
                scan.current_slot += 1;
                let slot = slotted_page::read_slot(&frame.get_data(), slot_num);
                if !slot.is_deleted() {
                    let start = slot.record_offset as usize;
                    let end = start + slot.record_length as usize;
                    let bytes = frame.get_data()[start..end].to_vec();
                    return Ok((
                        Rid {
                            page_num: scan.current_page,
                            slot_num,
                        },
                        bytes,
                    ));
                }
            }

            self.pf.unfix(scan.fd, scan.current_page, false)?;
            scan.current_frame = None;
        }
    }

    /// Unfixes the scan's current page, if any. Callers must call this even
    /// on mid-scan errors.
    pub fn end_scan(&mut self, scan: &mut RhfScan) -> RhfResult<()> {
        if scan.current_frame.take().is_some() {
            self.pf.unfix(scan.fd, scan.current_page, false)?;
        }
        Ok(())
    }
}

impl Default for RhfManager {
    fn default() -> Self {
        Self::new()
    }
}
