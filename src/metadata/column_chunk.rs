//! Per-column-chunk metadata (§3 `ColumnChunkMeta`).

use crate::compression::CompressionCodec;
use crate::schema::types::{Encoding, PhysicalType};

#[derive(Debug, Clone)]
pub struct ColumnStatistics {
    pub min: Option<Vec<u8>>,
    pub max: Option<Vec<u8>>,
    pub null_count: Option<i64>,
    pub distinct_count: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct ColumnChunkMeta {
    pub physical_type: PhysicalType,
    pub path: Vec<String>,
    pub codec: CompressionCodec,
    pub encodings: Vec<Encoding>,
    pub data_page_offset: i64,
    pub dictionary_page_offset: Option<i64>,
    pub total_compressed_size: i64,
    pub total_uncompressed_size: i64,
    pub num_values: i64,
    pub statistics: Option<ColumnStatistics>,
}

impl ColumnChunkMeta {
    /// The offset of the first page in this chunk: the dictionary page if
    /// present, else the first data page.
    pub fn first_page_offset(&self) -> i64 {
        self.dictionary_page_offset.unwrap_or(self.data_page_offset)
    }

    /// `[first_page_offset, first_page_offset + total_compressed_size)`.
    pub fn byte_range(&self) -> (u64, u64) {
        (self.first_page_offset() as u64, self.total_compressed_size as u64)
    }
}
