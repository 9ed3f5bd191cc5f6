//! End-to-end scenarios S1-S5 from spec.md §8, against the public
//! `PagedFileManager` facade.

use pflayer::buffer::Strategy;
use pflayer::{PagedFileManager, PfError};
use tempdir::TempDir;

/// Builds a 7-page file with byte 0 of page `k` set to `k`, then closes and
/// reopens it so the buffer pool holds nothing for it when the scenario's
/// measured accesses begin.
fn seven_page_file(pf: &mut PagedFileManager, path: &std::path::Path) -> usize {
    pf.create(path).unwrap();
    let fd = pf.open(path).unwrap();
    for k in 0..7 {
        let (page_num, frame) = pf.alloc(fd).unwrap();
        frame.get_data_mut()[0] = k as u8;
        pf.unfix(fd, page_num, true).unwrap();
    }
    pf.close(fd).unwrap();
    pf.open(path).unwrap()
}

#[test]
fn s1_lru_cyclical_scan() {
    let dir = TempDir::new("pflayer-s1").unwrap();
    let path = dir.path().join("s1.db");

    let mut pf = PagedFileManager::new();
    pf.set_buffer_size(5);
    let fd = seven_page_file(&mut pf, &path);

    pf.reset_stats();
    pf.set_strategy(Strategy::Lru);

    for pass_dirty in [true, false] {
        for page_num in 0..7 {
            pf.fix_this(fd, page_num).unwrap();
            pf.unfix(fd, page_num, pass_dirty).unwrap();
        }
    }

    let (logical, physical_reads, physical_writes) = pf.get_stats();
    assert_eq!(logical, 14);
    assert_eq!(physical_reads, 14);
    assert_eq!(physical_writes, 7);
}

#[test]
fn s2_mru_cyclical_scan() {
    let dir = TempDir::new("pflayer-s2").unwrap();
    let path = dir.path().join("s2.db");

    let mut pf = PagedFileManager::new();
    pf.set_buffer_size(5);
    let fd = seven_page_file(&mut pf, &path);

    pf.reset_stats();
    pf.set_strategy(Strategy::Mru);

    for pass_dirty in [true, false] {
        for page_num in 0..7 {
            pf.fix_this(fd, page_num).unwrap();
            pf.unfix(fd, page_num, pass_dirty).unwrap();
        }
    }

    let (logical, physical_reads, physical_writes) = pf.get_stats();
    assert_eq!(logical, 14);
    assert_eq!(physical_reads, 9);
    assert_eq!(physical_writes, 7);
}

#[test]
fn s3_alloc_dispose_alloc_recycles_zeroed_page() {
    let dir = TempDir::new("pflayer-s3").unwrap();
    let path = dir.path().join("s3.db");

    let mut pf = PagedFileManager::new();
    pf.create(&path).unwrap();
    let fd = pf.open(&path).unwrap();

    let (p0, frame0) = pf.alloc(fd).unwrap();
    frame0.get_data_mut()[0] = 0xAB;
    pf.unfix(fd, p0, true).unwrap();

    let (p1, _frame1) = pf.alloc(fd).unwrap();
    pf.unfix(fd, p1, true).unwrap();
    assert_eq!((p0, p1), (0, 1));

    pf.dispose(fd, p0).unwrap();

    let (p2, frame2) = pf.alloc(fd).unwrap();
    assert_eq!(p2, p0);
    assert!(frame2.get_data().iter().all(|&b| b == 0));
    pf.unfix(fd, p2, false).unwrap();
}

#[test]
fn s4_pin_count_blocks_eviction_until_unfixed() {
    let dir = TempDir::new("pflayer-s4").unwrap();
    let path = dir.path().join("s4.db");

    let mut pf = PagedFileManager::new();
    pf.set_buffer_size(1);
    pf.create(&path).unwrap();
    let fd = pf.open(&path).unwrap();

    for _ in 0..4 {
        let (page_num, _frame) = pf.alloc(fd).unwrap();
        pf.unfix(fd, page_num, false).unwrap();
    }

    pf.fix_this(fd, 3).unwrap();
    pf.fix_this(fd, 3).unwrap();

    // Still pinned (pin_count 1): a fix of any other page must fail with
    // no_buffer since the pool has exactly one frame and it's held.
    pf.unfix(fd, 3, false).unwrap();
    let err = pf.fix_this(fd, 0).unwrap_err();
    assert_eq!(err, PfError::NoBuffer);

    // Fully unfixed now: page 3's frame becomes evictable and dirty.
    pf.unfix(fd, 3, true).unwrap();
    pf.fix_this(fd, 0).unwrap();
}

#[test]
fn s5_no_buffer_without_io_on_third_fix() {
    let dir = TempDir::new("pflayer-s5").unwrap();
    let path = dir.path().join("s5.db");

    let mut pf = PagedFileManager::new();
    pf.set_buffer_size(2);
    pf.create(&path).unwrap();
    let fd = pf.open(&path).unwrap();
    for _ in 0..3 {
        let (page_num, _frame) = pf.alloc(fd).unwrap();
        pf.unfix(fd, page_num, false).unwrap();
    }

    pf.fix_this(fd, 0).unwrap();
    pf.fix_this(fd, 1).unwrap();
    let err = pf.fix_this(fd, 2).unwrap_err();
    assert_eq!(err, PfError::NoBuffer);
}
