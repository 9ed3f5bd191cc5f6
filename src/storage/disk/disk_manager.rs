//! Component A: the disk I/O adapter.
//!
//! Owns one OS file handle per open PF file and maps page numbers to byte
//! offsets. The header occupies its own `HEADER_SIZE`-byte prefix (see
//! `common::config`), so page `k` lives at `(k + 1) * PAGE_SIZE`.

use std::fs;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::debug;

use crate::common::config::{PageNum, HEADER_SIZE, PAGE_SIZE};
use crate::common::error::{report, PfError, PfResult};

/// In-memory mirror of the per-file header (component B).
#[derive(Debug, Clone, Copy, Default)]
pub struct FileHeader {
    pub num_pages: PageNum,
    pub first_free: PageNum,
}

impl FileHeader {
    fn to_bytes(self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.num_pages.to_le_bytes());
        buf[4..8].copy_from_slice(&self.first_free.to_le_bytes());
        buf
    }

    fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Self {
        FileHeader {
            num_pages: PageNum::from_le_bytes(buf[0..4].try_into().unwrap()),
            first_free: PageNum::from_le_bytes(buf[4..8].try_into().unwrap()),
        }
    }
}

fn map_io_error(e: io::Error) -> PfError {
    match e.kind() {
        io::ErrorKind::NotFound => PfError::Os(format!("not found: {e}")),
        io::ErrorKind::PermissionDenied => PfError::Os(format!("permission denied: {e}")),
        _ => PfError::Os(e.to_string()),
    }
}

/// Handles page-level and header-level I/O against one open database file.
pub struct DiskManager {
    file: fs::File,
}

impl DiskManager {
    /// Creates a new, empty database file. Fails if it already exists.
    pub fn create(path: &Path) -> PfResult<()> {
        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| report(map_io_error(e)))?;
        let mut dm = DiskManager { file };
        dm.write_header(&FileHeader {
            num_pages: 0,
            first_free: -1,
        })?;
        Ok(())
    }

    /// Removes a database file from disk.
    pub fn destroy(path: &Path) -> PfResult<()> {
        fs::remove_file(path).map_err(|e| report(map_io_error(e)))
    }

    /// Opens an existing database file.
    pub fn open(path: &Path) -> PfResult<Self> {
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| report(map_io_error(e)))?;
        Ok(DiskManager { file })
    }

    /// Reads the page numbered `page_num` into `buf`.
    pub fn read_page(&mut self, page_num: PageNum, buf: &mut [u8; PAGE_SIZE]) -> PfResult<()> {
        let offset = HEADER_SIZE as u64 + page_num as u64 * PAGE_SIZE as u64;
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|e| report(map_io_error(e)))?;
        match self.file.read_exact(buf) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                debug!("short read of page {page_num}");
                Err(report(PfError::ShortRead))
            }
            Err(e) => Err(report(map_io_error(e))),
        }
    }

    /// Writes `buf` as the page numbered `page_num`.
    pub fn write_page(&mut self, page_num: PageNum, buf: &[u8; PAGE_SIZE]) -> PfResult<()> {
        let offset = HEADER_SIZE as u64 + page_num as u64 * PAGE_SIZE as u64;
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|e| report(map_io_error(e)))?;
        self.file
            .write_all(buf)
            .map_err(|_| report(PfError::ShortWrite))?;
        self.file.flush().map_err(|e| report(map_io_error(e)))?;
        Ok(())
    }

    /// Reads the file header prefix.
    pub fn read_header(&mut self) -> PfResult<FileHeader> {
        self.file
            .seek(SeekFrom::Start(0))
            .map_err(|e| report(map_io_error(e)))?;
        let mut buf = [0u8; HEADER_SIZE];
        self.file
            .read_exact(&mut buf)
            .map_err(|_| report(PfError::HeaderRead))?;
        Ok(FileHeader::from_bytes(&buf))
    }

    /// Writes the file header prefix.
    pub fn write_header(&mut self, header: &FileHeader) -> PfResult<()> {
        self.file
            .seek(SeekFrom::Start(0))
            .map_err(|e| report(map_io_error(e)))?;
        self.file
            .write_all(&header.to_bytes())
            .map_err(|_| report(PfError::HeaderWrite))?;
        self.file.flush().map_err(|e| report(map_io_error(e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn create_open_header_roundtrip() {
        let dir = TempDir::new("pflayer-disk").unwrap();
        let path = dir.path().join("test.db");

        DiskManager::create(&path).unwrap();
        let mut dm = DiskManager::open(&path).unwrap();
        let hdr = dm.read_header().unwrap();
        assert_eq!(hdr.num_pages, 0);
        assert_eq!(hdr.first_free, -1);

        dm.write_header(&FileHeader {
            num_pages: 3,
            first_free: 1,
        })
        .unwrap();
        let hdr = dm.read_header().unwrap();
        assert_eq!(hdr.num_pages, 3);
        assert_eq!(hdr.first_free, 1);
    }

    #[test]
    fn page_roundtrip() {
        let dir = TempDir::new("pflayer-disk").unwrap();
        let path = dir.path().join("test.db");
        DiskManager::create(&path).unwrap();
        let mut dm = DiskManager::open(&path).unwrap();

        let mut data = [0u8; PAGE_SIZE];
        data[0] = 42;
        data[PAGE_SIZE - 1] = 7;
        dm.write_page(0, &data).unwrap();

        let mut buf = [0u8; PAGE_SIZE];
        dm.read_page(0, &mut buf).unwrap();
        assert_eq!(buf, data);
    }

    #[test]
    fn short_read_past_eof_errors() {
        let dir = TempDir::new("pflayer-disk").unwrap();
        let path = dir.path().join("test.db");
        DiskManager::create(&path).unwrap();
        let mut dm = DiskManager::open(&path).unwrap();

        let mut buf = [0u8; PAGE_SIZE];
        let err = dm.read_page(5, &mut buf).unwrap_err();
        assert_eq!(err, PfError::ShortRead);
    }
}
