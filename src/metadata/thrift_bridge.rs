//! Conversion between `parquet-format-safe`'s Thrift Compact Protocol
//! bindings and this crate's internal model (§3, §6). This is the only
//! module that names Thrift-generated types; everything downstream of
//! `read_file_metadata` sees only [`crate::schema`] and [`crate::metadata`]
//! values.

use parquet_format_safe as thrift_format;

use crate::compression::CompressionCodec;
use crate::error::{Error, Result};
use crate::metadata::column_chunk::ColumnChunkMeta;
use crate::metadata::file_metadata::RowGroupMetaData;
use crate::schema::types::{Encoding, ParquetType, PhysicalType, Repetition};

pub fn physical_type_from_thrift(
    type_: thrift_format::Type,
    type_length: Option<i32>,
) -> Result<PhysicalType> {
    if type_ == thrift_format::Type::BOOLEAN {
        Ok(PhysicalType::Boolean)
    } else if type_ == thrift_format::Type::INT32 {
        Ok(PhysicalType::Int32)
    } else if type_ == thrift_format::Type::INT64 {
        Ok(PhysicalType::Int64)
    } else if type_ == thrift_format::Type::INT96 {
        Ok(PhysicalType::Int96)
    } else if type_ == thrift_format::Type::FLOAT {
        Ok(PhysicalType::Float)
    } else if type_ == thrift_format::Type::DOUBLE {
        Ok(PhysicalType::Double)
    } else if type_ == thrift_format::Type::BYTE_ARRAY {
        Ok(PhysicalType::ByteArray)
    } else if type_ == thrift_format::Type::FIXED_LEN_BYTE_ARRAY {
        let len = type_length.ok_or_else(|| {
            Error::Format("FIXED_LEN_BYTE_ARRAY schema element missing type_length".into())
        })?;
        Ok(PhysicalType::FixedLenByteArray(len as u32))
    } else {
        Err(Error::Format(format!("unknown physical type {:?}", type_)))
    }
}

pub fn repetition_from_thrift(
    repetition_type: Option<thrift_format::FieldRepetitionType>,
) -> Result<Repetition> {
    match repetition_type {
        None => Ok(Repetition::Required),
        Some(r) if r == thrift_format::FieldRepetitionType::REQUIRED => Ok(Repetition::Required),
        Some(r) if r == thrift_format::FieldRepetitionType::OPTIONAL => Ok(Repetition::Optional),
        Some(r) if r == thrift_format::FieldRepetitionType::REPEATED => Ok(Repetition::Repeated),
        Some(other) => Err(Error::Format(format!(
            "unknown field repetition type {:?}",
            other
        ))),
    }
}

pub fn encoding_from_thrift(encoding: thrift_format::Encoding) -> Result<Encoding> {
    if encoding == thrift_format::Encoding::PLAIN {
        Ok(Encoding::Plain)
    } else if encoding == thrift_format::Encoding::PLAIN_DICTIONARY {
        Ok(Encoding::PlainDictionary)
    } else if encoding == thrift_format::Encoding::RLE {
        Ok(Encoding::Rle)
    } else if encoding == thrift_format::Encoding::BIT_PACKED {
        Ok(Encoding::BitPacked)
    } else if encoding == thrift_format::Encoding::DELTA_BINARY_PACKED {
        Ok(Encoding::DeltaBinaryPacked)
    } else if encoding == thrift_format::Encoding::DELTA_LENGTH_BYTE_ARRAY {
        Ok(Encoding::DeltaLengthByteArray)
    } else if encoding == thrift_format::Encoding::DELTA_BYTE_ARRAY {
        Ok(Encoding::DeltaByteArray)
    } else if encoding == thrift_format::Encoding::RLE_DICTIONARY {
        Ok(Encoding::RleDictionary)
    } else if encoding == thrift_format::Encoding::BYTE_STREAM_SPLIT {
        Ok(Encoding::ByteStreamSplit)
    } else {
        Err(Error::UnsupportedFeature(format!(
            "unrecognized encoding {:?}",
            encoding
        )))
    }
}

pub fn codec_from_thrift(codec: thrift_format::CompressionCodec) -> Result<CompressionCodec> {
    if codec == thrift_format::CompressionCodec::UNCOMPRESSED {
        Ok(CompressionCodec::Uncompressed)
    } else if codec == thrift_format::CompressionCodec::SNAPPY {
        Ok(CompressionCodec::Snappy)
    } else if codec == thrift_format::CompressionCodec::GZIP {
        Ok(CompressionCodec::Gzip)
    } else if codec == thrift_format::CompressionCodec::LZO {
        Ok(CompressionCodec::Lzo)
    } else if codec == thrift_format::CompressionCodec::BROTLI {
        Ok(CompressionCodec::Brotli)
    } else if codec == thrift_format::CompressionCodec::LZ4 {
        Ok(CompressionCodec::Lz4)
    } else if codec == thrift_format::CompressionCodec::ZSTD {
        Ok(CompressionCodec::Zstd)
    } else if codec == thrift_format::CompressionCodec::LZ4_RAW {
        Ok(CompressionCodec::Lz4Raw)
    } else {
        Err(Error::Format(format!("unknown compression codec {:?}", codec)))
    }
}

pub fn codec_to_thrift(codec: CompressionCodec) -> thrift_format::CompressionCodec {
    match codec {
        CompressionCodec::Uncompressed => thrift_format::CompressionCodec::UNCOMPRESSED,
        CompressionCodec::Snappy => thrift_format::CompressionCodec::SNAPPY,
        CompressionCodec::Gzip => thrift_format::CompressionCodec::GZIP,
        CompressionCodec::Lzo => thrift_format::CompressionCodec::LZO,
        CompressionCodec::Brotli => thrift_format::CompressionCodec::BROTLI,
        CompressionCodec::Lz4 => thrift_format::CompressionCodec::LZ4,
        CompressionCodec::Zstd => thrift_format::CompressionCodec::ZSTD,
        CompressionCodec::Lz4Raw => thrift_format::CompressionCodec::LZ4_RAW,
    }
}

pub fn encoding_to_thrift(encoding: Encoding) -> thrift_format::Encoding {
    match encoding {
        Encoding::Plain => thrift_format::Encoding::PLAIN,
        Encoding::PlainDictionary => thrift_format::Encoding::PLAIN_DICTIONARY,
        Encoding::Rle => thrift_format::Encoding::RLE,
        Encoding::BitPacked => thrift_format::Encoding::BIT_PACKED,
        Encoding::DeltaBinaryPacked => thrift_format::Encoding::DELTA_BINARY_PACKED,
        Encoding::DeltaLengthByteArray => thrift_format::Encoding::DELTA_LENGTH_BYTE_ARRAY,
        Encoding::DeltaByteArray => thrift_format::Encoding::DELTA_BYTE_ARRAY,
        Encoding::RleDictionary => thrift_format::Encoding::RLE_DICTIONARY,
        Encoding::ByteStreamSplit => thrift_format::Encoding::BYTE_STREAM_SPLIT,
    }
}

/// Rebuild the arena-free schema tree from the flattened pre-order list of
/// `SchemaElement`s Thrift hands back, using each element's `num_children`
/// to delimit subtrees, matching the encoding the format uses on the wire.
pub fn schema_tree_from_thrift(elements: &[thrift_format::SchemaElement]) -> Result<ParquetType> {
    let mut iter = elements.iter();
    let root = iter
        .next()
        .ok_or_else(|| Error::Format("empty schema element list".into()))?;
    let (node, _) = build_node(root, &mut iter)?;
    Ok(node)
}

fn build_node<'a, I: Iterator<Item = &'a thrift_format::SchemaElement>>(
    element: &'a thrift_format::SchemaElement,
    rest: &mut I,
) -> Result<(ParquetType, ())> {
    let name = element.name.clone();
    let repetition = repetition_from_thrift(element.repetition_type)?;
    let num_children = element.num_children.unwrap_or(0);

    if num_children > 0 {
        let mut fields = Vec::with_capacity(num_children as usize);
        for _ in 0..num_children {
            let child_element = rest
                .next()
                .ok_or_else(|| Error::Format("schema element list truncated".into()))?;
            let (child, _) = build_node(child_element, rest)?;
            fields.push(child);
        }
        Ok((
            ParquetType::Group {
                name,
                repetition,
                fields,
            },
            (),
        ))
    } else {
        let type_ = element
            .type_
            .ok_or_else(|| Error::Format(format!("leaf schema element '{}' missing type", name)))?;
        let physical_type = physical_type_from_thrift(type_, element.type_length)?;
        Ok((
            ParquetType::Primitive {
                name,
                repetition,
                physical_type,
            },
            (),
        ))
    }
}

/// Flatten a schema tree back into Thrift's pre-order `SchemaElement` list,
/// the inverse of [`schema_tree_from_thrift`].
pub fn schema_tree_to_thrift(root: &ParquetType) -> Vec<thrift_format::SchemaElement> {
    let mut out = Vec::new();
    flatten_node(root, &mut out);
    out
}

fn flatten_node(node: &ParquetType, out: &mut Vec<thrift_format::SchemaElement>) {
    match node {
        ParquetType::Primitive {
            name,
            repetition,
            physical_type,
        } => {
            let type_length = match physical_type {
                PhysicalType::FixedLenByteArray(n) => Some(*n as i32),
                _ => None,
            };
            out.push(thrift_format::SchemaElement {
                type_: Some(physical_type_to_thrift(*physical_type)),
                type_length,
                repetition_type: Some(repetition_to_thrift(*repetition)),
                name: name.clone(),
                num_children: None,
                converted_type: None,
                scale: None,
                precision: None,
                field_id: None,
                logicalType: None,
                ..Default::default()
            });
        }
        ParquetType::Group {
            name,
            repetition,
            fields,
        } => {
            out.push(thrift_format::SchemaElement {
                type_: None,
                type_length: None,
                repetition_type: Some(repetition_to_thrift(*repetition)),
                name: name.clone(),
                num_children: Some(fields.len() as i32),
                converted_type: None,
                scale: None,
                precision: None,
                field_id: None,
                logicalType: None,
                ..Default::default()
            });
            for field in fields {
                flatten_node(field, out);
            }
        }
    }
}

fn physical_type_to_thrift(physical_type: PhysicalType) -> thrift_format::Type {
    match physical_type {
        PhysicalType::Boolean => thrift_format::Type::BOOLEAN,
        PhysicalType::Int32 => thrift_format::Type::INT32,
        PhysicalType::Int64 => thrift_format::Type::INT64,
        PhysicalType::Int96 => thrift_format::Type::INT96,
        PhysicalType::Float => thrift_format::Type::FLOAT,
        PhysicalType::Double => thrift_format::Type::DOUBLE,
        PhysicalType::ByteArray => thrift_format::Type::BYTE_ARRAY,
        PhysicalType::FixedLenByteArray(_) => thrift_format::Type::FIXED_LEN_BYTE_ARRAY,
    }
}

fn repetition_to_thrift(repetition: Repetition) -> thrift_format::FieldRepetitionType {
    match repetition {
        Repetition::Required => thrift_format::FieldRepetitionType::REQUIRED,
        Repetition::Optional => thrift_format::FieldRepetitionType::OPTIONAL,
        Repetition::Repeated => thrift_format::FieldRepetitionType::REPEATED,
    }
}

/// Inverse of `convert_column_chunk` (§4.11 step 4): the writer fills in
/// exactly the fields the reader consumes and leaves the rest at their
/// Thrift-generated defaults.
pub fn column_chunk_meta_to_thrift(meta: &ColumnChunkMeta, file_offset: i64) -> thrift_format::ColumnChunk {
    let column_metadata = thrift_format::ColumnMetaData {
        type_: physical_type_to_thrift(meta.physical_type),
        encodings: meta.encodings.iter().map(|e| encoding_to_thrift(*e)).collect(),
        codec: codec_to_thrift(meta.codec),
        path_in_schema: meta.path.clone(),
        num_values: meta.num_values,
        total_uncompressed_size: meta.total_uncompressed_size,
        total_compressed_size: meta.total_compressed_size,
        key_value_metadata: None,
        data_page_offset: meta.data_page_offset,
        index_page_offset: None,
        dictionary_page_offset: meta.dictionary_page_offset,
        statistics: None,
        encoding_stats: None,
        bloom_filter_offset: None,
        ..Default::default()
    };
    thrift_format::ColumnChunk {
        file_path: None,
        file_offset,
        meta_data: Some(column_metadata),
        ..Default::default()
    }
}

/// Inverse of `convert_row_group`.
pub fn row_group_to_thrift(rg: &RowGroupMetaData, column_offsets: &[i64]) -> thrift_format::RowGroup {
    let columns = rg
        .columns
        .iter()
        .zip(column_offsets.iter())
        .map(|(col, offset)| column_chunk_meta_to_thrift(col, *offset))
        .collect();
    thrift_format::RowGroup {
        columns,
        total_byte_size: rg.total_byte_size,
        num_rows: rg.num_rows,
        ..Default::default()
    }
}
