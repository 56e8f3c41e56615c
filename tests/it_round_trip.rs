//! End-to-end writer-then-reader round trip over a schema exercising
//! primitive, list, and map logical columns in the same row group.

use parqcore::chunk_source::MemoryChunkSource;
use parqcore::compression::CompressionCodec;
use parqcore::metadata::read_file_metadata;
use parqcore::open_row_group;
use parqcore::schema::types::{ParquetType, PhysicalType, Repetition};
use parqcore::value::ColumnValue;
use parqcore::write::{FileWriter, WriteOptions};

fn build_schema() -> ParquetType {
    ParquetType::Group {
        name: "root".into(),
        repetition: Repetition::Required,
        fields: vec![
            ParquetType::Primitive {
                name: "id".into(),
                repetition: Repetition::Required,
                physical_type: PhysicalType::Int32,
            },
            ParquetType::Primitive {
                name: "name".into(),
                repetition: Repetition::Optional,
                physical_type: PhysicalType::ByteArray,
            },
            ParquetType::Group {
                name: "tags".into(),
                repetition: Repetition::Optional,
                fields: vec![ParquetType::Group {
                    name: "list".into(),
                    repetition: Repetition::Repeated,
                    fields: vec![ParquetType::Primitive {
                        name: "element".into(),
                        repetition: Repetition::Optional,
                        physical_type: PhysicalType::ByteArray,
                    }],
                }],
            },
            ParquetType::Group {
                name: "attrs".into(),
                repetition: Repetition::Optional,
                fields: vec![ParquetType::Group {
                    name: "key_value".into(),
                    repetition: Repetition::Repeated,
                    fields: vec![
                        ParquetType::Primitive {
                            name: "key".into(),
                            repetition: Repetition::Required,
                            physical_type: PhysicalType::ByteArray,
                        },
                        ParquetType::Primitive {
                            name: "value".into(),
                            repetition: Repetition::Optional,
                            physical_type: PhysicalType::Int32,
                        },
                    ],
                }],
            },
        ],
    }
}

fn bytes(s: &str) -> ColumnValue {
    ColumnValue::Bytes(s.as_bytes().to_vec())
}

#[test]
fn writer_reader_round_trip_primitive_list_and_map() {
    let schema = build_schema();

    let rows = vec![
        vec![
            ColumnValue::I32(1),
            bytes("alice"),
            ColumnValue::List(vec![bytes("x"), bytes("y")]),
            ColumnValue::Map(vec![
                (bytes("a"), ColumnValue::I32(1)),
                (bytes("b"), ColumnValue::I32(2)),
            ]),
        ],
        vec![
            ColumnValue::I32(2),
            ColumnValue::Null,
            ColumnValue::List(vec![]),
            ColumnValue::Map(vec![]),
        ],
        vec![
            ColumnValue::I32(3),
            bytes("carol"),
            ColumnValue::Null,
            ColumnValue::Null,
        ],
    ];

    let options = WriteOptions {
        compression: CompressionCodec::Uncompressed,
        row_group_byte_threshold: 64 * 1024 * 1024,
    };
    let mut writer = FileWriter::new(Vec::new(), schema, options, Some("parqcore test".into()));
    writer.start().unwrap();
    writer.write_row_group(&rows).unwrap();
    let (_size, buffer) = writer.end().unwrap();

    let source = MemoryChunkSource::new(buffer);
    let metadata = read_file_metadata(&source).unwrap();
    assert_eq!(metadata.num_rows, 3);

    let mut assembler = open_row_group(&source, &metadata, 0).unwrap();
    let mut produced = Vec::new();
    while let Some(row) = assembler.next_row().unwrap() {
        produced.push(row);
    }

    assert_eq!(produced, rows);
}
