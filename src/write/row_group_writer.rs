//! Lays out one row group's column chunks sequentially and records their
//! metadata (§4.11 step 4).

use std::io::Write;

use crate::compression::CompressionCodec;
use crate::error::Result;
use crate::metadata::column_chunk::ColumnChunkMeta;
use crate::metadata::file_metadata::RowGroupMetaData;
use crate::schema::logical::{LogicalColumn, PhysicalColumn};
use crate::schema::types::Encoding;
use crate::value::ColumnValue;
use crate::write::column_writer::shred_logical_column;
use crate::write::page_writer::encode_data_page;

/// Writes every leaf column of one row group to `writer`, starting at
/// `start_offset`, and returns its metadata plus the total bytes written.
pub fn write_row_group<W: Write>(
    writer: &mut W,
    start_offset: u64,
    logical_columns: &[LogicalColumn],
    leaves: &[PhysicalColumn],
    rows: &[Vec<ColumnValue>],
    codec: CompressionCodec,
) -> Result<(RowGroupMetaData, u64)> {
    let mut offset = start_offset;
    let mut columns = Vec::with_capacity(leaves.len());
    let mut total_byte_size: i64 = 0;

    let mut leaf_idx = 0;
    for (col_idx, logical_column) in logical_columns.iter().enumerate() {
        let column_rows: Vec<ColumnValue> = rows.iter().map(|row| row[col_idx].clone()).collect();
        let shredded = shred_logical_column(logical_column, &column_rows)?;

        for shredded_column in shredded {
            let leaf = &leaves[leaf_idx];
            leaf_idx += 1;

            let page = encode_data_page(
                &shredded_column,
                leaf.physical_type,
                leaf.max_rep,
                leaf.max_def,
                codec,
            )?;

            let data_page_offset = offset as i64;
            writer.write_all(&page.bytes)?;
            offset += page.bytes.len() as u64;

            total_byte_size += page.bytes.len() as i64;

            columns.push(ColumnChunkMeta {
                physical_type: leaf.physical_type,
                path: leaf.path.clone(),
                codec,
                encodings: vec![Encoding::Plain],
                data_page_offset,
                dictionary_page_offset: None,
                total_compressed_size: page.bytes.len() as i64,
                total_uncompressed_size: (page.bytes.len()
                    - page.compressed_size
                    + page.uncompressed_size) as i64,
                num_values: shredded_column.def_levels.len() as i64,
                statistics: None,
            });
        }
    }

    let num_rows = rows.len() as i64;
    Ok((
        RowGroupMetaData {
            columns,
            num_rows,
            total_byte_size,
        },
        offset - start_offset,
    ))
}
