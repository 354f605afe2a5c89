//! The B-tree walker: recursive pre-order left-to-right descent over table
//! B-trees, yielding leaf cells in rowid-ascending order.
//!
//! Grounded on the teacher's `btree.rs::traverse_table_btree`, with one
//! correctness fix: the teacher recurses into every interior cell's left
//! child but never descends into the page header's `rightmost_child_page`,
//! so the rightmost subtree of every interior page is silently dropped.
//! That TODO is fixed here (see DESIGN.md). The walker now explicitly
//! visits the rightmost child after the last cell.

use log::trace;

use crate::error::{EngineError, Result};
use crate::page::{parse_page, BTreeHeader, Page};
use crate::reader::Reader;
use crate::value::{decode_record, Value};

/// A fully decoded table row: its rowid and its typed column values.
#[derive(Debug, Clone)]
pub struct Row {
    pub rowid: i64,
    pub values: Vec<Value>,
}

/// Walks every leaf page reachable from `root_page` and returns all rows in
/// rowid-ascending scan order, with records already decoded.
pub fn scan_table(reader: &mut Reader, root_page: u32) -> Result<Vec<Row>> {
    let mut rows = Vec::new();
    visit(reader, root_page, &mut |leaf| {
        let values = decode_record(&leaf.payload.clone())?;
        rows.push(Row {
            rowid: leaf.rowid,
            values,
        });
        Ok(())
    })?;
    Ok(rows)
}

/// Sums `cell_count` across every leaf page reachable from `root_page`,
/// without decoding any record. Used by the `COUNT(*)` fast path, which
/// only needs a count, not the rows themselves.
pub fn count_rows(reader: &mut Reader, root_page: u32) -> Result<u64> {
    let mut total = 0u64;
    visit_pages(reader, root_page, &mut |page| {
        if let BTreeHeader::Leaf(common) = page.header {
            total += common.cell_count as u64;
        }
        Ok(())
    })?;
    Ok(total)
}

/// Shared traversal: visits every page reachable from `root_page` in
/// pre-order left-to-right and calls `on_page` for each one. `visit` (row
/// scanning) and `count_rows` (cheap counting) both ride on this so the
/// rightmost-child fix only has to live in one place.
fn visit_pages(reader: &mut Reader, page_number: u32, on_page: &mut dyn FnMut(&Page) -> Result<()>) -> Result<()> {
    let reserved = reader.header.reserved_bytes_per_page;
    let bytes = reader.read_page(page_number)?;
    let page = parse_page(&bytes, page_number, reserved)?;

    match page.header {
        BTreeHeader::Leaf(_) => {
            trace!("leaf page {page_number}: {} cells", page.header.common().cell_count);
            on_page(&page)?;
        }
        BTreeHeader::Interior { .. } => {
            trace!(
                "interior page {page_number}: {} cells",
                page.header.common().cell_count
            );
            let left_children: Vec<u32> =
                page.interior_cells().map(|c| c.left_child_page).collect();
            let rightmost = page.rightmost_child_page();

            on_page(&page)?;

            for child in left_children {
                visit_pages(reader, child, on_page)?;
            }
            if let Some(rightmost) = rightmost {
                visit_pages(reader, rightmost, on_page)?;
            }
        }
    }

    Ok(())
}

fn visit(
    reader: &mut Reader,
    page_number: u32,
    on_leaf: &mut dyn FnMut(&crate::page::LeafCell) -> Result<()>,
) -> Result<()> {
    visit_pages(reader, page_number, &mut |page| {
        if let BTreeHeader::Leaf(_) = page.header {
            for cell in page.leaf_cells() {
                on_leaf(cell)?;
            }
        }
        Ok(())
    })
}

/// Rejects table B-trees whose rows would come back in anything but
/// strictly increasing rowid order; used by tests and callers that want to
/// assert I-ordering rather than trust the format blindly.
pub fn assert_rowids_increasing(rows: &[Row]) -> Result<()> {
    for pair in rows.windows(2) {
        if pair[1].rowid <= pair[0].rowid {
            return Err(EngineError::malformed(
                "b-tree scan",
                format!(
                    "rowids out of order: {} did not follow {}",
                    pair[1].rowid, pair[0].rowid
                ),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::varint::encode_varint;
    use std::fs::File;
    use std::io::Write;

    fn leaf_page(page_size: usize, page_number_is_root: bool, rows: &[(i64, &[u8])]) -> Vec<u8> {
        let header_offset = if page_number_is_root { 100 } else { 0 };
        let mut page = vec![0u8; page_size];
        page[header_offset] = 0x0D;

        let mut cursor = page_size;
        let mut cell_bodies = Vec::new();
        let mut pointers = Vec::new();
        for &(rowid, payload) in rows {
            let mut cell = Vec::new();
            cell.extend(encode_varint(payload.len() as u64));
            cell.extend(encode_varint(rowid as u64));
            cell.extend(payload);
            cursor -= cell.len();
            pointers.push(cursor as u16);
            cell_bodies.push((cursor, cell));
        }

        page[header_offset + 3..header_offset + 5]
            .copy_from_slice(&(rows.len() as u16).to_be_bytes());
        page[header_offset + 5..header_offset + 7].copy_from_slice(&(cursor as u16).to_be_bytes());

        for (offset, cell) in &cell_bodies {
            page[*offset..*offset + cell.len()].copy_from_slice(cell);
        }
        let ptr_start = header_offset + 8;
        for (i, ptr) in pointers.iter().enumerate() {
            page[ptr_start + i * 2..ptr_start + i * 2 + 2].copy_from_slice(&ptr.to_be_bytes());
        }

        page
    }

    fn interior_page(page_size: usize, left_children: &[(u32, i64)], rightmost: u32) -> Vec<u8> {
        let mut page = vec![0u8; page_size];
        page[0] = 0x05;
        page[8..12].copy_from_slice(&rightmost.to_be_bytes());

        let mut cursor = page_size;
        let mut cell_bodies = Vec::new();
        let mut pointers = Vec::new();
        for &(child, key) in left_children {
            let mut cell = Vec::new();
            cell.extend(child.to_be_bytes());
            cell.extend(encode_varint(key as u64));
            cursor -= cell.len();
            pointers.push(cursor as u16);
            cell_bodies.push((cursor, cell));
        }

        page[3..5].copy_from_slice(&(left_children.len() as u16).to_be_bytes());
        page[5..7].copy_from_slice(&(cursor as u16).to_be_bytes());

        for (offset, cell) in &cell_bodies {
            page[*offset..*offset + cell.len()].copy_from_slice(cell);
        }
        for (i, ptr) in pointers.iter().enumerate() {
            page[12 + i * 2..12 + i * 2 + 2].copy_from_slice(&ptr.to_be_bytes());
        }

        page
    }

    fn record_for_int(n: i64) -> Vec<u8> {
        let mut payload = Vec::new();
        payload.extend(encode_varint(2)); // header len: 1 (len varint) + 1 (serial type varint)
        payload.extend(encode_varint(1)); // serial type 1 = int8, fits -128..127
        payload.push(n as u8);
        payload
    }

    fn write_db(path: &std::path::Path, page_size: u16, pages: &[Vec<u8>]) {
        let mut f = File::create(path).unwrap();
        let mut first = pages[0].clone();
        first[16..18].copy_from_slice(&page_size.to_be_bytes());
        f.write_all(&first).unwrap();
        for p in &pages[1..] {
            f.write_all(p).unwrap();
        }
    }

    fn empty_schema_page(page_size: usize) -> Vec<u8> {
        // Page 1 is always a table-leaf page (the schema table); its header
        // lives 100 bytes in. An empty schema is irrelevant here, the test
        // below drives the walker directly at an arbitrary table root, not
        // through the schema catalog.
        leaf_page(page_size, true, &[])
    }

    #[test]
    fn walks_rightmost_child_of_interior_page() {
        // Table root is page 2, an interior page whose only left child is
        // page 3 (a leaf with one row) and whose rightmost child is page 4
        // (a leaf with one row). A walker that forgets the rightmost
        // pointer would only see rowid 1.
        let page_size = 512usize;
        let schema = empty_schema_page(page_size);
        let root = interior_page(page_size, &[(3, 1)], 4);
        let leaf_a = leaf_page(page_size, false, &[(1, &record_for_int(10))]);
        let leaf_b = leaf_page(page_size, false, &[(2, &record_for_int(20))]);

        let dir = std::env::temp_dir();
        let path = dir.join(format!("engine-btree-test-{}.db", std::process::id()));
        write_db(&path, page_size as u16, &[schema, root, leaf_a, leaf_b]);

        let mut reader = Reader::open(path.to_str().unwrap()).unwrap();
        let rows = scan_table(&mut reader, 2).unwrap();

        assert_eq!(rows.len(), 2, "rightmost child's row must be visited too");
        assert_eq!(rows[0].rowid, 1);
        assert_eq!(rows[1].rowid, 2);
        assert_rowids_increasing(&rows).unwrap();

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn counts_cells_without_decoding_records() {
        let page_size = 512usize;
        let schema = empty_schema_page(page_size);
        let table = leaf_page(
            page_size,
            false,
            &[(1, &record_for_int(1)), (2, &record_for_int(2)), (3, &record_for_int(3))],
        );

        let dir = std::env::temp_dir();
        let path = dir.join(format!("engine-btree-count-test-{}.db", std::process::id()));
        write_db(&path, page_size as u16, &[schema, table]);

        let mut reader = Reader::open(path.to_str().unwrap()).unwrap();
        let count = count_rows(&mut reader, 2).unwrap();
        assert_eq!(count, 3);

        std::fs::remove_file(&path).ok();
    }
}
