//! The pager: opens the database file once and hands out page-sized byte
//! slices on demand. Mirrors the teacher's `DataBaseMetadata::read_from_file`
//! for the 100-byte header, generalized into a long-lived reader instead of
//! a one-shot free function.

use std::convert::TryInto;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

use log::trace;

use crate::error::{EngineError, Result};

/// The 100-byte database header. Only the fields the engine actually
/// consumes are kept as named fields; the rest of the header is skipped.
#[derive(Debug, Clone, Copy)]
pub struct DatabaseHeader {
    pub page_size: u32,
    pub reserved_bytes_per_page: u8,
}

impl DatabaseHeader {
    fn parse(buffer: &[u8; 100]) -> Result<Self> {
        let raw_page_size = u16::from_be_bytes(buffer[16..18].try_into().unwrap());
        // two bytes 00 00 are interpreted as 65536.
        let page_size = if raw_page_size == 0 {
            65536
        } else {
            raw_page_size as u32
        };

        if !page_size.is_power_of_two() || !(512..=65536).contains(&page_size) {
            return Err(EngineError::malformed(
                "database header",
                format!("page size {page_size} is not a power of two in [512, 65536]"),
            ));
        }

        Ok(DatabaseHeader {
            page_size,
            reserved_bytes_per_page: buffer[20],
        })
    }
}

/// Opens a database file read-only and provides random access to 1-indexed
/// pages. The file handle is held for the lifetime of the `Reader` and is
/// closed when it is dropped. There is no page cache, matching the
/// teacher's "decoded cells borrow the page buffer, then it's released"
/// lifecycle.
pub struct Reader {
    path: String,
    file: File,
    pub header: DatabaseHeader,
}

impl Reader {
    pub fn open(path: &str) -> Result<Self> {
        let mut file = File::open(path).map_err(|source| EngineError::Io {
            path: path.to_string(),
            source,
        })?;

        let buffer = Self::read_header_bytes(&mut file, path)?;
        let header = DatabaseHeader::parse(&buffer)?;
        trace!("opened {path}: page_size={}", header.page_size);

        Ok(Reader {
            path: path.to_string(),
            file,
            header,
        })
    }

    fn read_header_bytes(file: &mut File, path: &str) -> Result<[u8; 100]> {
        let mut buffer = [0u8; 100];
        file.seek(SeekFrom::Start(0))
            .map_err(|source| EngineError::Io {
                path: path.to_string(),
                source,
            })?;
        file.read_exact(&mut buffer)
            .map_err(|source| EngineError::Io {
                path: path.to_string(),
                source,
            })?;
        Ok(buffer)
    }

    /// Reads page `n` (1-indexed) in full.
    pub fn read_page(&mut self, n: u32) -> Result<Vec<u8>> {
        if n == 0 {
            return Err(EngineError::malformed("pager", "page numbers are 1-indexed"));
        }

        let page_size = self.header.page_size as u64;
        let offset = (n as u64 - 1) * page_size;

        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|source| self.io_err(source))?;

        let mut buffer = vec![0u8; page_size as usize];
        self.file
            .read_exact(&mut buffer)
            .map_err(|source| self.io_err(source))?;

        trace!("read page {n} ({page_size} bytes at offset {offset})");
        Ok(buffer)
    }

    fn io_err(&self, source: std::io::Error) -> EngineError {
        EngineError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
