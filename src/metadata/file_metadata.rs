//! File-level metadata: the parsed footer, magic-byte validation, and the
//! row-group/column-chunk tree (§3, §6).

use std::io::Cursor;

use parquet_format_safe as thrift_format;
use parquet_format_safe::thrift::protocol::TCompactInputProtocol;

use crate::chunk_source::ChunkSource;
use crate::error::{Error, Result};
use crate::metadata::column_chunk::{ColumnChunkMeta, ColumnStatistics};
use crate::metadata::thrift_bridge;
use crate::schema::logical::PhysicalColumn;
use crate::schema::types::{ParquetType, PhysicalType};

pub const PARQUET_MAGIC: [u8; 4] = [b'P', b'A', b'R', b'1'];
pub const FOOTER_SIZE: u64 = 8;
const MIN_FILE_SIZE: u64 = 12;

#[derive(Debug, Clone)]
pub struct RowGroupMetaData {
    pub columns: Vec<ColumnChunkMeta>,
    pub num_rows: i64,
    pub total_byte_size: i64,
}

#[derive(Debug, Clone)]
pub struct FileMetaData {
    pub version: i32,
    pub schema: ParquetType,
    pub num_rows: i64,
    pub row_groups: Vec<RowGroupMetaData>,
    pub created_by: Option<String>,
    pub key_value_metadata: Vec<(String, Option<String>)>,
}

/// Read and validate the trailing magic/footer, parse the Thrift
/// `FileMetaData`, and convert it into this crate's internal model.
///
/// Rejects the file per §6 if it is shorter than 12 bytes, either magic is
/// absent, or the declared footer length is non-positive or larger than
/// the space available before the footer.
pub fn read_file_metadata(source: &dyn ChunkSource) -> Result<FileMetaData> {
    let file_len = source.length()?;
    if file_len < MIN_FILE_SIZE {
        return Err(Error::Format(format!(
            "file is {} bytes, smaller than the minimum {} bytes",
            file_len, MIN_FILE_SIZE
        )));
    }

    let head_magic = source.read_bytes(0, 4)?;
    if head_magic != PARQUET_MAGIC {
        return Err(Error::Format("invalid magic at start of file".into()));
    }

    let trailer = source.read_bytes(file_len - FOOTER_SIZE, FOOTER_SIZE as u32)?;
    if trailer[4..8] != PARQUET_MAGIC {
        return Err(Error::Format("invalid magic at end of file".into()));
    }
    let footer_length = i32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    if footer_length <= 0 || (footer_length as u64) > file_len - FOOTER_SIZE {
        return Err(Error::Format(format!(
            "footer length {} is out of range for a {}-byte file",
            footer_length, file_len
        )));
    }
    let footer_length = footer_length as u64;

    let footer_start = file_len - FOOTER_SIZE - footer_length;
    let footer_bytes = source.read_bytes(footer_start, footer_length as u32)?;

    let mut protocol = TCompactInputProtocol::new(Cursor::new(footer_bytes));
    let t_metadata = thrift_format::FileMetaData::read_from_in_protocol(&mut protocol)
        .map_err(|e| Error::Format(format!("could not parse Thrift file metadata: {}", e)))?;

    convert_file_metadata(t_metadata)
}

fn convert_file_metadata(t_metadata: thrift_format::FileMetaData) -> Result<FileMetaData> {
    let schema = thrift_bridge::schema_tree_from_thrift(&t_metadata.schema)?;
    let leaves = schema.leaves();

    let row_groups = t_metadata
        .row_groups
        .into_iter()
        .map(|rg| convert_row_group(rg, &leaves))
        .collect::<Result<Vec<_>>>()?;

    let key_value_metadata = t_metadata
        .key_value_metadata
        .unwrap_or_default()
        .into_iter()
        .map(|kv| (kv.key, kv.value))
        .collect();

    Ok(FileMetaData {
        version: t_metadata.version,
        schema,
        num_rows: t_metadata.num_rows,
        row_groups,
        created_by: t_metadata.created_by,
        key_value_metadata,
    })
}

fn convert_row_group(
    rg: thrift_format::RowGroup,
    leaves: &[PhysicalColumn],
) -> Result<RowGroupMetaData> {
    if rg.columns.len() != leaves.len() {
        return Err(Error::Format(format!(
            "row group has {} column chunks but the schema has {} leaf columns",
            rg.columns.len(),
            leaves.len()
        )));
    }
    let columns = rg
        .columns
        .into_iter()
        .zip(leaves.iter())
        .map(|(chunk, leaf)| convert_column_chunk(chunk, leaf.physical_type))
        .collect::<Result<Vec<_>>>()?;
    Ok(RowGroupMetaData {
        columns,
        num_rows: rg.num_rows,
        total_byte_size: rg.total_byte_size,
    })
}

/// `physical_type` comes from the schema tree's leaf at this chunk's
/// position, not `ColumnMetaData`: the Thrift struct carries a bare
/// `Type` with no `type_length`, so a `FIXED_LEN_BYTE_ARRAY` column could
/// never be reconstructed from it alone.
fn convert_column_chunk(
    chunk: thrift_format::ColumnChunk,
    physical_type: PhysicalType,
) -> Result<ColumnChunkMeta> {
    let meta = chunk.meta_data.ok_or_else(|| {
        Error::Format("column chunk is missing its ColumnMetaData".into())
    })?;

    let codec = thrift_bridge::codec_from_thrift(meta.codec)?;
    let encodings = meta
        .encodings
        .into_iter()
        .map(thrift_bridge::encoding_from_thrift)
        .collect::<Result<Vec<_>>>()?;
    let statistics = meta.statistics.map(|s| ColumnStatistics {
        min: s.min,
        max: s.max,
        null_count: s.null_count,
        distinct_count: s.distinct_count,
    });

    Ok(ColumnChunkMeta {
        physical_type,
        path: meta.path_in_schema,
        codec,
        encodings,
        data_page_offset: meta.data_page_offset,
        dictionary_page_offset: meta.dictionary_page_offset,
        total_compressed_size: meta.total_compressed_size,
        total_uncompressed_size: meta.total_uncompressed_size,
        num_values: meta.num_values,
        statistics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk_source::MemoryChunkSource;

    #[test]
    fn s6_missing_trailing_magic_fails() {
        let mut bytes = PARQUET_MAGIC.to_vec();
        bytes.extend_from_slice(&[0u8; 20]);
        let source = MemoryChunkSource::new(bytes);
        let err = read_file_metadata(&source).unwrap_err();
        match err {
            Error::Format(message) => assert!(message.contains("magic")),
            other => panic!("expected Format error, got {:?}", other),
        }
    }

    #[test]
    fn rejects_too_small_file() {
        let source = MemoryChunkSource::new(vec![0u8; 4]);
        let err = read_file_metadata(&source).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }
}
