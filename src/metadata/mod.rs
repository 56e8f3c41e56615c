//! File, row-group, and column-chunk metadata, and the Thrift conversion
//! layer (§3, §6).

pub mod column_chunk;
pub mod file_metadata;
pub mod thrift_bridge;

pub use column_chunk::{ColumnChunkMeta, ColumnStatistics};
pub use file_metadata::{read_file_metadata, FileMetaData, RowGroupMetaData, PARQUET_MAGIC};
