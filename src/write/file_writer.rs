//! Top-level file writer: header, row groups, and Thrift-encoded footer
//! (§4.11).

use std::io::Write;

use parquet_format_safe as thrift_format;
use parquet_format_safe::thrift::protocol::TCompactOutputProtocol;

use crate::compression::CompressionCodec;
use crate::error::{Error, Result};
use crate::metadata::file_metadata::{RowGroupMetaData, FOOTER_SIZE, PARQUET_MAGIC};
use crate::metadata::thrift_bridge;
use crate::schema::logical::{assemble_logical_columns, LogicalColumn, PhysicalColumn};
use crate::schema::types::ParquetType;
use crate::value::ColumnValue;
use crate::write::column_writer::shred_logical_column;
use crate::write::page_writer::encode_data_page;
use crate::write::row_group_writer::write_row_group;

#[derive(Debug, Clone, Copy)]
pub struct WriteOptions {
    pub compression: CompressionCodec,
    /// `write_row_group` starts a new row group once admitting the next
    /// row would push the in-progress row group's estimated uncompressed
    /// byte total past this threshold.
    pub row_group_byte_threshold: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compression: CompressionCodec::Uncompressed,
            row_group_byte_threshold: 128 * 1024 * 1024,
        }
    }
}

/// Writes one Parquet file: `start` emits the header, any number of
/// `write_row_group` calls append row groups, and `end` emits the footer.
pub struct FileWriter<W: Write> {
    writer: W,
    schema: ParquetType,
    logical_columns: Vec<LogicalColumn>,
    options: WriteOptions,
    created_by: Option<String>,
    offset: u64,
    row_groups: Vec<RowGroupMetaData>,
}

impl<W: Write> FileWriter<W> {
    pub fn new(writer: W, schema: ParquetType, options: WriteOptions, created_by: Option<String>) -> Self {
        let leaves = schema.leaves();
        // `leaves()` includes the root message's own name as path segment
        // 0; logical grouping starts one level below it.
        let logical_columns = assemble_logical_columns(&leaves, 1);
        Self {
            writer,
            schema,
            logical_columns,
            options,
            created_by,
            offset: 0,
            row_groups: Vec::new(),
        }
    }

    pub fn start(&mut self) -> Result<()> {
        self.writer.write_all(&PARQUET_MAGIC)?;
        self.offset = PARQUET_MAGIC.len() as u64;
        Ok(())
    }

    /// Appends rows, shaped one `Vec<ColumnValue>` per top-level logical
    /// column in the same order `RowAssembler::next_row` produces,
    /// splitting them into one or more row groups: a new row group starts
    /// once the accumulated uncompressed byte estimate would exceed
    /// `options.row_group_byte_threshold` (spec's cumulative byte
    /// budget). Per §6, a `addRow`-style failure (a schema violation
    /// while shredding) aborts the in-progress row group: nothing further
    /// is written for it, though the writer itself may still be used for
    /// another row group or closed.
    pub fn write_row_group(&mut self, rows: &[Vec<ColumnValue>]) -> Result<()> {
        if self.offset == 0 {
            return Err(Error::Format(
                "start() must be called before writing the first row group".into(),
            ));
        }
        let leaves = self.schema.leaves();

        let mut batch_start = 0;
        let mut accumulated = 0usize;
        for (i, row) in rows.iter().enumerate() {
            let row_size = estimate_row_uncompressed_size(&self.logical_columns, &leaves, row)?;
            if accumulated > 0 && accumulated + row_size > self.options.row_group_byte_threshold {
                self.flush_row_group(&leaves, &rows[batch_start..i])?;
                batch_start = i;
                accumulated = 0;
            }
            accumulated += row_size;
        }
        if batch_start < rows.len() {
            self.flush_row_group(&leaves, &rows[batch_start..])?;
        }
        Ok(())
    }

    fn flush_row_group(&mut self, leaves: &[PhysicalColumn], rows: &[Vec<ColumnValue>]) -> Result<()> {
        let (group, size) = write_row_group(
            &mut self.writer,
            self.offset,
            &self.logical_columns,
            leaves,
            rows,
            self.options.compression,
        )?;
        self.offset += size;
        self.row_groups.push(group);
        Ok(())
    }

    /// Writes the Thrift footer and returns the total file size.
    pub fn end(mut self) -> Result<(u64, W)> {
        let num_rows: i64 = self.row_groups.iter().map(|g| g.num_rows).sum();
        let thrift_schema = thrift_bridge::schema_tree_to_thrift(&self.schema);

        let mut row_group_offset = PARQUET_MAGIC.len() as u64;
        let thrift_row_groups: Vec<thrift_format::RowGroup> = self
            .row_groups
            .iter()
            .map(|group| {
                let offsets: Vec<i64> = {
                    let mut offset = row_group_offset as i64;
                    let mut out = Vec::with_capacity(group.columns.len());
                    for column in &group.columns {
                        out.push(offset);
                        offset += column.total_compressed_size;
                    }
                    out
                };
                row_group_offset += group.total_byte_size as u64;
                thrift_bridge::row_group_to_thrift(group, &offsets)
            })
            .collect();

        let metadata = thrift_format::FileMetaData {
            version: 2,
            schema: thrift_schema,
            num_rows,
            row_groups: thrift_row_groups,
            key_value_metadata: None,
            created_by: self.created_by.clone(),
            column_orders: None,
            ..Default::default()
        };

        let mut metadata_bytes = Vec::new();
        {
            let mut protocol = TCompactOutputProtocol::new(std::io::Cursor::new(&mut metadata_bytes));
            metadata
                .write_to_out_protocol(&mut protocol)
                .map_err(|e| Error::Format(format!("could not serialize file metadata: {}", e)))?;
        }

        self.writer.write_all(&metadata_bytes)?;
        self.writer
            .write_all(&(metadata_bytes.len() as i32).to_le_bytes())?;
        self.writer.write_all(&PARQUET_MAGIC)?;

        let total = self.offset + metadata_bytes.len() as u64 + FOOTER_SIZE;
        Ok((total, self.writer))
    }
}

/// Shreds and encodes `row` alone, summing each resulting page's
/// uncompressed size regardless of the writer's configured codec: the
/// row-group byte budget is defined in terms of uncompressed bytes, and
/// estimating per row (rather than re-encoding the whole pending batch on
/// every row) keeps the boundary check linear in the number of rows.
fn estimate_row_uncompressed_size(
    logical_columns: &[LogicalColumn],
    leaves: &[PhysicalColumn],
    row: &[ColumnValue],
) -> Result<usize> {
    let mut leaf_idx = 0;
    let mut total = 0usize;
    for (col_idx, column) in logical_columns.iter().enumerate() {
        let shredded = shred_logical_column(column, std::slice::from_ref(&row[col_idx]))?;
        for s in shredded {
            let leaf = &leaves[leaf_idx];
            leaf_idx += 1;
            let page = encode_data_page(
                &s,
                leaf.physical_type,
                leaf.max_rep,
                leaf.max_def,
                CompressionCodec::Uncompressed,
            )?;
            total += page.uncompressed_size;
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk_source::MemoryChunkSource;
    use crate::metadata::read_file_metadata;
    use crate::schema::types::{PhysicalType, Repetition};

    fn int_column_schema() -> ParquetType {
        ParquetType::Group {
            name: "root".into(),
            repetition: Repetition::Required,
            fields: vec![ParquetType::Primitive {
                name: "n".into(),
                repetition: Repetition::Required,
                physical_type: PhysicalType::Int32,
            }],
        }
    }

    #[test]
    fn write_row_group_splits_on_byte_threshold() {
        let schema = int_column_schema();
        let rows: Vec<Vec<ColumnValue>> = (0..10).map(|i| vec![ColumnValue::I32(i)]).collect();

        // Each INT32 value contributes 4 uncompressed bytes; a threshold of
        // 12 bytes should force a new row group every 3 rows.
        let options = WriteOptions {
            compression: CompressionCodec::Uncompressed,
            row_group_byte_threshold: 12,
        };
        let mut writer = FileWriter::new(Vec::new(), schema, options, None);
        writer.start().unwrap();
        writer.write_row_group(&rows).unwrap();
        let (_size, buffer) = writer.end().unwrap();

        let source = MemoryChunkSource::new(buffer);
        let metadata = read_file_metadata(&source).unwrap();
        assert_eq!(metadata.num_rows, 10);
        assert!(
            metadata.row_groups.len() > 1,
            "expected multiple row groups, got {}",
            metadata.row_groups.len()
        );
        let total_rows: i64 = metadata.row_groups.iter().map(|g| g.num_rows).sum();
        assert_eq!(total_rows, 10);
    }

    #[test]
    fn write_row_group_keeps_one_group_under_threshold() {
        let schema = int_column_schema();
        let rows: Vec<Vec<ColumnValue>> = (0..10).map(|i| vec![ColumnValue::I32(i)]).collect();

        let options = WriteOptions {
            compression: CompressionCodec::Uncompressed,
            row_group_byte_threshold: 1024 * 1024,
        };
        let mut writer = FileWriter::new(Vec::new(), schema, options, None);
        writer.start().unwrap();
        writer.write_row_group(&rows).unwrap();
        let (_size, buffer) = writer.end().unwrap();

        let source = MemoryChunkSource::new(buffer);
        let metadata = read_file_metadata(&source).unwrap();
        assert_eq!(metadata.row_groups.len(), 1);
    }
}
