//! Exercises `RowIterator` with a `ColumnFilter`, covering both
//! `PredicateFailurePolicy` variants on a predicate that errors.

use parqcore::chunk_source::MemoryChunkSource;
use parqcore::compression::CompressionCodec;
use parqcore::error::Error;
use parqcore::metadata::read_file_metadata;
use parqcore::open_row_group;
use parqcore::read::filter::PredicateFailurePolicy;
use parqcore::read::RowIterator;
use parqcore::schema::types::{ParquetType, PhysicalType, Repetition};
use parqcore::value::ColumnValue;
use parqcore::write::{FileWriter, WriteOptions};

fn build_schema() -> ParquetType {
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

fn write_rows(rows: &[i32]) -> Vec<u8> {
    let schema = build_schema();
    let row_values: Vec<Vec<ColumnValue>> = rows.iter().map(|&n| vec![ColumnValue::I32(n)]).collect();
    let options = WriteOptions {
        compression: CompressionCodec::Uncompressed,
        row_group_byte_threshold: 64 * 1024 * 1024,
    };
    let mut writer = FileWriter::new(Vec::new(), schema, options, None);
    writer.start().unwrap();
    writer.write_row_group(&row_values).unwrap();
    writer.end().unwrap().1
}

/// Errors on the row whose `n` equals 2; otherwise matches every row.
fn fails_on_two(row: &[ColumnValue]) -> parqcore::error::Result<bool> {
    match row[0] {
        ColumnValue::I32(2) => Err(Error::Format("predicate refuses to evaluate n == 2".into())),
        _ => Ok(true),
    }
}

#[test]
fn abort_policy_surfaces_the_error_once_then_exhausts() {
    let buffer = write_rows(&[0, 1, 2, 3, 4]);
    let source = MemoryChunkSource::new(buffer);
    let metadata = read_file_metadata(&source).unwrap();
    let assembler = open_row_group(&source, &metadata, 0).unwrap();

    let mut iter = RowIterator::with_filter(assembler, Box::new(fails_on_two), PredicateFailurePolicy::Abort);

    assert_eq!(iter.next().unwrap().unwrap(), vec![ColumnValue::I32(0)]);
    assert_eq!(iter.next().unwrap().unwrap(), vec![ColumnValue::I32(1)]);
    assert!(iter.next().unwrap().is_err());
    assert!(iter.next().is_none(), "iterator must report exhaustion after surfacing the error");
    assert!(iter.next().is_none());
}

#[test]
fn skip_row_policy_drops_the_failing_row_and_continues() {
    let buffer = write_rows(&[0, 1, 2, 3, 4]);
    let source = MemoryChunkSource::new(buffer);
    let metadata = read_file_metadata(&source).unwrap();
    let assembler = open_row_group(&source, &metadata, 0).unwrap();

    let iter = RowIterator::with_filter(assembler, Box::new(fails_on_two), PredicateFailurePolicy::SkipRow);
    let rows: Vec<ColumnValue> = iter.map(|r| r.unwrap()[0].clone()).collect();

    assert_eq!(
        rows,
        vec![
            ColumnValue::I32(0),
            ColumnValue::I32(1),
            ColumnValue::I32(3),
            ColumnValue::I32(4),
        ]
    );
}
