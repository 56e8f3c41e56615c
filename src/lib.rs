#![forbid(unsafe_code)]
//! A columnar, Parquet-style decode/encode engine: footer parsing, page
//! segmentation, per-encoding value decoding, Dremel row assembly, and
//! their writer-side inverses.

pub mod chunk_source;
pub mod compression;
pub mod cursor;
pub mod encoding;
pub mod error;
pub mod metadata;
pub mod page;
pub mod read;
pub mod schema;
pub mod value;
pub mod write;

pub use chunk_source::{ChunkSource, FileChunkSource, MemoryChunkSource};
pub use error::{Error, Result};
pub use value::ColumnValue;

use crate::metadata::file_metadata::RowGroupMetaData;
use crate::metadata::FileMetaData;
use crate::page::reader::PageReader;
use crate::read::column_chunk_decoder::ColumnChunkDecoder;
use crate::read::row_assembler::RowAssembler;
use crate::schema::logical::assemble_logical_columns;

/// Builds a [`RowAssembler`] over one row group: for each leaf column it
/// seeks `source` to that column chunk's byte range (per
/// `ColumnChunkMeta::byte_range`) and wraps it in a `PageReader` +
/// `ColumnChunkDecoder`, then groups the leaves into logical columns and
/// threads the right decoder(s) to each.
///
/// Mirrors the teacher's `get_page_iterator`/`get_column_iterator` free
/// functions: orchestration lives here rather than on a stateful "file"
/// object, so callers can mix and match their own `ChunkSource`.
pub fn open_row_group<'a>(
    source: &'a dyn ChunkSource,
    metadata: &FileMetaData,
    row_group_index: usize,
) -> Result<RowAssembler<'a>> {
    let row_group: &RowGroupMetaData = metadata
        .row_groups
        .get(row_group_index)
        .ok_or_else(|| Error::Format(format!("no row group at index {}", row_group_index)))?;

    let leaves = metadata.schema.leaves();
    if leaves.len() != row_group.columns.len() {
        return Err(Error::Format(format!(
            "schema has {} leaf columns but row group has {} column chunks",
            leaves.len(),
            row_group.columns.len()
        )));
    }

    let mut decoders = Vec::with_capacity(leaves.len());
    for (leaf, column_chunk) in leaves.iter().zip(row_group.columns.iter()) {
        let (start, size) = column_chunk.byte_range();
        let page_reader = PageReader::new(
            source,
            start,
            start + size,
            column_chunk.codec,
            leaf.max_rep,
            leaf.max_def,
        );
        decoders.push(ColumnChunkDecoder::new(page_reader, leaf.clone()));
    }

    // The root message's own name occupies path segment 0; logical
    // grouping starts one level below it.
    let logical_columns = assemble_logical_columns(&leaves, 1);
    RowAssembler::new(&logical_columns, decoders, row_group.num_rows as usize)
}
