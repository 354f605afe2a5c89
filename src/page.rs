//! Page decoder: B-tree page header, cell-pointer array, and cell decoding.
//!
//! Grounded on the teacher's `page.rs` (header shapes) and `cell.rs` (cell
//! shapes), merged into one module. The teacher carries near-duplicate
//! `PageType`/`BtreePage`/`CommonPageHeader` definitions in both `page.rs`
//! and `btree.rs`; this crate keeps a single definition here (see
//! DESIGN.md).

use std::convert::TryInto;

use crate::error::{EngineError, Result};
use crate::varint::VarInt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    InteriorIndex,
    InteriorTable,
    LeafIndex,
    LeafTable,
}

impl PageType {
    pub fn from_u8(val: u8) -> Result<Self> {
        match val {
            0x02 => Ok(PageType::InteriorIndex),
            0x05 => Ok(PageType::InteriorTable),
            0x0A => Ok(PageType::LeafIndex),
            0x0D => Ok(PageType::LeafTable),
            other => Err(EngineError::malformed(
                "b-tree page header",
                format!("invalid page type byte 0x{other:02x}"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CommonPageHeader {
    pub first_freeblock: u16,
    pub cell_count: u16,
    pub cell_content_start: u16,
    pub fragmented_free_bytes: u8,
}

impl CommonPageHeader {
    fn parse(buf: &[u8], offset: usize) -> Result<Self> {
        if buf.len() < offset + 8 {
            return Err(EngineError::malformed(
                "b-tree page header",
                "page too small for common header",
            ));
        }
        Ok(CommonPageHeader {
            first_freeblock: u16::from_be_bytes(buf[offset + 1..offset + 3].try_into().unwrap()),
            cell_count: u16::from_be_bytes(buf[offset + 3..offset + 5].try_into().unwrap()),
            cell_content_start: u16::from_be_bytes(
                buf[offset + 5..offset + 7].try_into().unwrap(),
            ),
            fragmented_free_bytes: buf[offset + 7],
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub enum BTreeHeader {
    Leaf(CommonPageHeader),
    Interior {
        common: CommonPageHeader,
        rightmost_child_page: u32,
    },
}

impl BTreeHeader {
    pub fn common(&self) -> &CommonPageHeader {
        match self {
            BTreeHeader::Leaf(c) => c,
            BTreeHeader::Interior { common, .. } => common,
        }
    }

    pub fn header_size(&self) -> usize {
        match self {
            BTreeHeader::Leaf(_) => 8,
            BTreeHeader::Interior { .. } => 12,
        }
    }
}

/// A decoded leaf cell: a rowid and its raw (non-overflowing) payload
/// bytes. Record decoding is deferred to the caller so the walker can
/// cheaply count cells without paying for record decode on the fast
/// `COUNT(*)` path.
#[derive(Debug, Clone)]
pub struct LeafCell {
    pub rowid: i64,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, Copy)]
pub struct InteriorCell {
    pub rowid: i64,
    pub left_child_page: u32,
}

pub enum Cell {
    Leaf(LeafCell),
    Interior(InteriorCell),
}

pub struct Page {
    pub page_type: PageType,
    pub header: BTreeHeader,
    pub cells: Vec<Cell>,
}

impl Page {
    pub fn leaf_cells(&self) -> impl Iterator<Item = &LeafCell> {
        self.cells.iter().filter_map(|c| match c {
            Cell::Leaf(l) => Some(l),
            Cell::Interior(_) => None,
        })
    }

    pub fn interior_cells(&self) -> impl Iterator<Item = &InteriorCell> {
        self.cells.iter().filter_map(|c| match c {
            Cell::Interior(i) => Some(i),
            Cell::Leaf(_) => None,
        })
    }

    pub fn rightmost_child_page(&self) -> Option<u32> {
        match self.header {
            BTreeHeader::Interior {
                rightmost_child_page,
                ..
            } => Some(rightmost_child_page),
            BTreeHeader::Leaf(_) => None,
        }
    }
}

/// Parses a page's bytes into its header and cells.
///
/// `page_number` decides whether the 100-byte database header precedes the
/// B-tree header (page 1 only). `reserved_bytes_per_page` (from the
/// database header) is subtracted from the page size to get the usable
/// size: the cell-pointer array and every cell pointer it holds must fall
/// within that usable size, not the full page.
pub fn parse_page(bytes: &[u8], page_number: u32, reserved_bytes_per_page: u8) -> Result<Page> {
    let header_offset = if page_number == 1 { 100 } else { 0 };
    let usable_size = bytes.len() - reserved_bytes_per_page as usize;

    let page_type = PageType::from_u8(bytes[header_offset])?;
    let common = CommonPageHeader::parse(bytes, header_offset)?;

    let header = match page_type {
        PageType::InteriorTable | PageType::InteriorIndex => {
            let rightmost_child_page = u32::from_be_bytes(
                bytes[header_offset + 8..header_offset + 12]
                    .try_into()
                    .unwrap(),
            );
            BTreeHeader::Interior {
                common,
                rightmost_child_page,
            }
        }
        PageType::LeafTable | PageType::LeafIndex => BTreeHeader::Leaf(common),
    };

    let pointer_array_start = header_offset + header.header_size();
    let cell_count = common.cell_count as usize;
    let pointer_array_end = pointer_array_start + cell_count * 2;

    if usable_size < pointer_array_end {
        return Err(EngineError::malformed(
            "cell pointer array",
            "page too small for declared cell count",
        ));
    }

    let mut cells = Vec::with_capacity(cell_count);
    for i in 0..cell_count {
        let ptr_offset = pointer_array_start + i * 2;
        let cell_offset =
            u16::from_be_bytes(bytes[ptr_offset..ptr_offset + 2].try_into().unwrap()) as usize;

        if cell_offset >= usable_size {
            return Err(EngineError::malformed(
                "cell pointer array",
                format!("cell pointer {cell_offset} lies outside the page"),
            ));
        }

        let cell_bytes = &bytes[cell_offset..];
        let cell = match page_type {
            PageType::LeafTable => Cell::Leaf(parse_table_leaf_cell(cell_bytes)?),
            PageType::InteriorTable => Cell::Interior(parse_table_interior_cell(cell_bytes)?),
            PageType::LeafIndex | PageType::InteriorIndex => {
                return Err(EngineError::unsupported("index b-tree pages"))
            }
        };
        cells.push(cell);
    }

    Ok(Page {
        page_type,
        header,
        cells,
    })
}

/// Table-leaf cell (`0x0D`): varint payload_length, varint rowid, payload
/// bytes. Overflow (payload that would spill past the leaf page) is
/// detected and rejected. Payloads must fit wholly on the page.
fn parse_table_leaf_cell(bytes: &[u8]) -> Result<LeafCell> {
    let payload_length = VarInt::read(bytes)?;
    let mut offset = payload_length.1 as usize;

    let rowid = VarInt::read(&bytes[offset..])?;
    offset += rowid.1 as usize;

    let payload_len = payload_length.0 as usize;
    if bytes.len() < offset + payload_len {
        return Err(EngineError::unsupported(
            "overflow pages (payload spills past the leaf page)",
        ));
    }

    Ok(LeafCell {
        rowid: rowid.0,
        payload: bytes[offset..offset + payload_len].to_vec(),
    })
}

/// Table-interior cell (`0x05`): 4-byte left child page, varint rowid key.
fn parse_table_interior_cell(bytes: &[u8]) -> Result<InteriorCell> {
    if bytes.len() < 4 {
        return Err(EngineError::malformed(
            "table interior cell",
            "truncated left child pointer",
        ));
    }
    let left_child_page = u32::from_be_bytes(bytes[..4].try_into().unwrap());
    let rowid = VarInt::read(&bytes[4..])?;

    Ok(InteriorCell {
        rowid: rowid.0,
        left_child_page,
    })
}
