//! Encodes one physical column's shredded levels/values into a single
//! DATA_PAGE (V1), the writer's inverse of [`crate::page::reader`] (§4.11
//! steps 2–3).

use std::io::Cursor;

use parquet_format_safe as thrift_format;
use parquet_format_safe::thrift::protocol::TCompactOutputProtocol;

use crate::compression::{CodecRegistry, CompressionCodec};
use crate::encoding::{hybrid_rle, level_bit_width, plain};
use crate::error::{Error, Result};
use crate::metadata::thrift_bridge;
use crate::schema::types::PhysicalType;
use crate::value::ColumnValue;
use crate::write::column_writer::ShreddedColumn;

/// A fully serialized page: the Thrift header followed by the compressed
/// body, ready to append to the column chunk's byte range.
pub struct EncodedPage {
    pub bytes: Vec<u8>,
    pub uncompressed_size: usize,
    pub compressed_size: usize,
}

pub fn encode_data_page(
    column: &ShreddedColumn,
    physical_type: PhysicalType,
    max_rep: u16,
    max_def: u16,
    codec: CompressionCodec,
) -> Result<EncodedPage> {
    let mut body = Vec::new();

    if max_rep > 0 {
        let width = level_bit_width(max_rep);
        let levels: Vec<u64> = column.rep_levels.iter().map(|&v| v as u64).collect();
        let encoded = hybrid_rle::encode_hybrid(&levels, width);
        body.extend_from_slice(&(encoded.len() as u32).to_le_bytes());
        body.extend_from_slice(&encoded);
    }
    if max_def > 0 {
        let width = level_bit_width(max_def);
        let levels: Vec<u64> = column.def_levels.iter().map(|&v| v as u64).collect();
        let encoded = hybrid_rle::encode_hybrid(&levels, width);
        body.extend_from_slice(&(encoded.len() as u32).to_le_bytes());
        body.extend_from_slice(&encoded);
    }

    body.extend_from_slice(&encode_plain_values(&column.values, physical_type)?);

    let uncompressed_size = body.len();
    let registry = CodecRegistry::new();
    let compressed_body = registry.compress(codec, &body)?;
    let compressed_size = compressed_body.len();

    let data_header = thrift_format::DataPageHeader {
        num_values: column.def_levels.len() as i32,
        encoding: thrift_bridge::encoding_to_thrift(crate::schema::types::Encoding::Plain),
        definition_level_encoding: thrift_format::Encoding::RLE,
        repetition_level_encoding: thrift_format::Encoding::RLE,
        statistics: None,
        ..Default::default()
    };
    let header = thrift_format::PageHeader {
        type_: thrift_format::PageType::DATA_PAGE,
        uncompressed_page_size: uncompressed_size as i32,
        compressed_page_size: compressed_size as i32,
        crc: None,
        data_page_header: Some(data_header),
        index_page_header: None,
        dictionary_page_header: None,
        data_page_header_v2: None,
        ..Default::default()
    };

    let mut header_bytes = Vec::new();
    {
        let mut protocol = TCompactOutputProtocol::new(Cursor::new(&mut header_bytes));
        header
            .write_to_out_protocol(&mut protocol)
            .map_err(|e| Error::Format(format!("could not serialize page header: {}", e)))?;
    }

    let mut bytes = header_bytes;
    bytes.extend_from_slice(&compressed_body);

    Ok(EncodedPage {
        bytes,
        uncompressed_size,
        compressed_size,
    })
}

fn encode_plain_values(values: &[ColumnValue], physical_type: PhysicalType) -> Result<Vec<u8>> {
    match physical_type {
        PhysicalType::Boolean => {
            let bools: Vec<bool> = values
                .iter()
                .map(|v| match v {
                    ColumnValue::Bool(b) => Ok(*b),
                    other => Err(type_mismatch("Boolean", other)),
                })
                .collect::<Result<_>>()?;
            Ok(plain::encode_bool(&bools))
        }
        PhysicalType::Int32 => {
            let ints: Vec<i32> = values
                .iter()
                .map(|v| match v {
                    ColumnValue::I32(n) => Ok(*n),
                    other => Err(type_mismatch("Int32", other)),
                })
                .collect::<Result<_>>()?;
            Ok(plain::encode_i32(&ints))
        }
        PhysicalType::Int64 => {
            let ints: Vec<i64> = values
                .iter()
                .map(|v| match v {
                    ColumnValue::I64(n) => Ok(*n),
                    other => Err(type_mismatch("Int64", other)),
                })
                .collect::<Result<_>>()?;
            Ok(plain::encode_i64(&ints))
        }
        PhysicalType::Float => {
            let floats: Vec<f32> = values
                .iter()
                .map(|v| match v {
                    ColumnValue::F32(n) => Ok(*n),
                    other => Err(type_mismatch("Float", other)),
                })
                .collect::<Result<_>>()?;
            Ok(plain::encode_f32(&floats))
        }
        PhysicalType::Double => {
            let doubles: Vec<f64> = values
                .iter()
                .map(|v| match v {
                    ColumnValue::F64(n) => Ok(*n),
                    other => Err(type_mismatch("Double", other)),
                })
                .collect::<Result<_>>()?;
            Ok(plain::encode_f64(&doubles))
        }
        PhysicalType::Int96 => Err(Error::UnsupportedFeature(
            "INT96 is a read-only legacy representation; this engine does not write it".into(),
        )),
        PhysicalType::ByteArray => {
            let bytes: Vec<Vec<u8>> = values
                .iter()
                .map(|v| match v {
                    ColumnValue::Bytes(b) => Ok(b.clone()),
                    other => Err(type_mismatch("ByteArray", other)),
                })
                .collect::<Result<_>>()?;
            Ok(plain::encode_byte_array(&bytes))
        }
        PhysicalType::FixedLenByteArray(_) => {
            let bytes: Vec<Vec<u8>> = values
                .iter()
                .map(|v| match v {
                    ColumnValue::FixedBytes(b) => Ok(b.clone()),
                    other => Err(type_mismatch("FixedLenByteArray", other)),
                })
                .collect::<Result<_>>()?;
            Ok(plain::encode_fixed_len_byte_array(&bytes))
        }
    }
}

fn type_mismatch(expected: &str, got: &ColumnValue) -> Error {
    Error::Format(format!(
        "expected a {} value for this column, got {:?}",
        expected, got
    ))
}
