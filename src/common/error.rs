//! PF/RHF error taxonomy.
//!
//! Mirrors the stable negative error codes from the original `pf.h`/`rhf.h`
//! headers rather than inventing a fresh scheme, and keeps to the
//! hand-written enum + `Display` style used elsewhere in the corpus instead
//! of pulling in `thiserror`/`anyhow`.

use std::fmt;
use std::sync::Mutex;

use lazy_static::lazy_static;

lazy_static! {
    /// Process-wide last-error latch, the Rust analogue of `PFerrno`.
    static ref LAST_ERROR: Mutex<i32> = Mutex::new(0);
}

fn latch(code: i32) {
    *LAST_ERROR.lock().unwrap() = code;
}

/// Returns the code of the most recently reported PF/RHF error.
pub fn last_error() -> i32 {
    *LAST_ERROR.lock().unwrap()
}

/// Errors raised by the paged-file (PF) layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PfError {
    NoMemory,
    NoBuffer,
    PageFixed,
    PageNotInBuf,
    Os(String),
    ShortRead,
    ShortWrite,
    HeaderRead,
    HeaderWrite,
    InvalidPage,
    FileOpen,
    FileTableFull,
    BadFd,
    Eof,
    PageFree,
    PageUnfixed,
    /// Internal invariant violation: page about to be allocated is already
    /// resident in the buffer pool.
    PageInBuf,
    /// Internal invariant violation: hash index lookup failed where a hit
    /// was expected.
    HashNotFound,
    /// Internal invariant violation: hash index insert found an existing
    /// entry for the key.
    HashPageExist,
}

impl PfError {
    /// Stable negative code, matching `pf.h`.
    pub fn code(&self) -> i32 {
        match self {
            PfError::NoMemory => -1,
            PfError::NoBuffer => -2,
            PfError::PageFixed => -3,
            PfError::PageNotInBuf => -4,
            PfError::Os(_) => -5,
            PfError::ShortRead => -6,
            PfError::ShortWrite => -7,
            PfError::HeaderRead => -8,
            PfError::HeaderWrite => -9,
            PfError::InvalidPage => -10,
            PfError::FileOpen => -11,
            PfError::FileTableFull => -12,
            PfError::BadFd => -13,
            PfError::Eof => -14,
            PfError::PageFree => -15,
            PfError::PageUnfixed => -16,
            PfError::PageInBuf => -17,
            PfError::HashNotFound => -18,
            PfError::HashPageExist => -19,
        }
    }

    fn latch(self) -> Self {
        latch(self.code());
        self
    }
}

impl fmt::Display for PfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PfError::NoMemory => write!(f, "no memory"),
            PfError::NoBuffer => write!(f, "all frames pinned, no buffer available"),
            PfError::PageFixed => write!(f, "page already fixed"),
            PfError::PageNotInBuf => write!(f, "page not in buffer"),
            PfError::Os(msg) => write!(f, "os error: {msg}"),
            PfError::ShortRead => write!(f, "incomplete read of page from file"),
            PfError::ShortWrite => write!(f, "incomplete write of page to file"),
            PfError::HeaderRead => write!(f, "incomplete read of header from file"),
            PfError::HeaderWrite => write!(f, "incomplete write of header to file"),
            PfError::InvalidPage => write!(f, "invalid page number"),
            PfError::FileOpen => write!(f, "file already open"),
            PfError::FileTableFull => write!(f, "open-file table is full"),
            PfError::BadFd => write!(f, "invalid file descriptor"),
            PfError::Eof => write!(f, "end of file"),
            PfError::PageFree => write!(f, "page is on the free list"),
            PfError::PageUnfixed => write!(f, "page already unfixed"),
            PfError::PageInBuf => {
                write!(f, "internal error: new page already in buffer, please report")
            }
            PfError::HashNotFound => {
                write!(f, "internal error: hash table entry not found, please report")
            }
            PfError::HashPageExist => write!(
                f,
                "internal error: page already exists in hash table, please report"
            ),
        }
    }
}

impl std::error::Error for PfError {}

pub type PfResult<T> = Result<T, PfError>;

/// Marks `err` as the latest PF error and returns it, so call sites can
/// write `return Err(report(PfError::Eof))`.
pub fn report(err: PfError) -> PfError {
    err.latch()
}

/// Errors raised by the record/heap-file (RHF) layer. Wraps `PfError` so
/// RHF can forward PF failures without losing their identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RhfError {
    Pf(PfError),
    Eof,
    PageFull,
    InvalidRid,
    NoRecord,
    NoMemory,
}

impl RhfError {
    pub fn code(&self) -> i32 {
        match self {
            RhfError::Pf(e) => e.code(),
            RhfError::Eof => -20,
            RhfError::PageFull => -21,
            RhfError::InvalidRid => -22,
            RhfError::NoRecord => -23,
            RhfError::NoMemory => -24,
        }
    }

    fn latch(self) -> Self {
        latch(self.code());
        self
    }
}

impl fmt::Display for RhfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RhfError::Pf(e) => write!(f, "{e}"),
            RhfError::Eof => write!(f, "end of scan or file"),
            RhfError::PageFull => write!(f, "page is full"),
            RhfError::InvalidRid => write!(f, "invalid record id"),
            RhfError::NoRecord => write!(f, "record does not exist (or was deleted)"),
            RhfError::NoMemory => write!(f, "out of memory"),
        }
    }
}

impl std::error::Error for RhfError {}

impl From<PfError> for RhfError {
    fn from(e: PfError) -> Self {
        RhfError::Pf(e)
    }
}

pub type RhfResult<T> = Result<T, RhfError>;

/// Marks `err` as the latest RHF error and returns it.
pub fn report_rhf(err: RhfError) -> RhfError {
    err.latch()
}
