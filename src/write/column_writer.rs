//! Shreds logical column values back into physical (leaf) column streams:
//! the inverse of [`crate::read::row_assembler`] (§4.11 step 1).

use crate::error::{Error, Result};
use crate::schema::logical::LogicalColumn;
use crate::value::ColumnValue;

/// One physical column's levels and values, ready for page encoding. Only
/// present values are stored; `values.len()` equals the count of
/// `def_levels` entries equal to that column's `maxDef`.
pub struct ShreddedColumn {
    pub rep_levels: Vec<u16>,
    pub def_levels: Vec<u16>,
    pub values: Vec<ColumnValue>,
}

/// Flatten one logical column's row values into its underlying physical
/// column(s), in the same depth-first order `ParquetType::leaves` visits
/// them (`Primitive`/`List` yield one, `Map` yields two: key then value,
/// `Struct` recurses field by field).
pub fn shred_logical_column(column: &LogicalColumn, rows: &[ColumnValue]) -> Result<Vec<ShreddedColumn>> {
    match column {
        LogicalColumn::Primitive(physical) => {
            let mut rep_levels = Vec::with_capacity(rows.len());
            let mut def_levels = Vec::with_capacity(rows.len());
            let mut values = Vec::new();
            for row in rows {
                rep_levels.push(0);
                if row.is_null() {
                    if physical.max_def == 0 {
                        return Err(Error::Format(format!(
                            "column '{}' is required but received a null value",
                            physical.path.join(".")
                        )));
                    }
                    def_levels.push(0);
                } else {
                    def_levels.push(physical.max_def);
                    values.push(row.clone());
                }
            }
            Ok(vec![ShreddedColumn {
                rep_levels,
                def_levels,
                values,
            }])
        }
        LogicalColumn::Map { key, value, .. } => shred_map(key.max_def, value.max_def, rows),
        LogicalColumn::List { element, .. } => shred_list(element.max_def, rows),
        LogicalColumn::Struct { fields, .. } => shred_struct(fields, rows),
    }
}

/// §4.11 step 1: `defLevel == 0` is a null map, `mapEmptyLevel` (`keyMaxDef
/// - 1`) is present-but-empty, `keyMaxDef` is a present key. A value that
/// decodes to null when `value.max_def` would require non-null (a
/// required map value) is rejected rather than silently dropped, per
/// the writer's required-value contract.
fn shred_map(key_max_def: u16, value_max_def: u16, rows: &[ColumnValue]) -> Result<Vec<ShreddedColumn>> {
    let map_empty_level = key_max_def.saturating_sub(1);
    let mut key_rep = Vec::new();
    let mut key_def = Vec::new();
    let mut key_values = Vec::new();
    let mut value_rep = Vec::new();
    let mut value_def = Vec::new();
    let mut value_values = Vec::new();

    for row in rows {
        match row {
            ColumnValue::Null => {
                key_rep.push(0);
                key_def.push(0);
                value_rep.push(0);
                value_def.push(0);
            }
            ColumnValue::Map(entries) if entries.is_empty() => {
                key_rep.push(0);
                key_def.push(map_empty_level);
                value_rep.push(0);
                value_def.push(map_empty_level);
            }
            ColumnValue::Map(entries) => {
                for (i, (k, v)) in entries.iter().enumerate() {
                    let rep = if i == 0 { 0 } else { 1 };
                    key_rep.push(rep);
                    key_def.push(key_max_def);
                    key_values.push(k.clone());

                    value_rep.push(rep);
                    if v.is_null() {
                        if value_max_def == 0 {
                            return Err(Error::Format(
                                "map value is required but an entry supplied null".into(),
                            ));
                        }
                        value_def.push(value_max_def - 1);
                    } else {
                        value_def.push(value_max_def);
                        value_values.push(v.clone());
                    }
                }
            }
            other => {
                return Err(Error::Format(format!(
                    "expected a Map or Null value, got {:?}",
                    other
                )))
            }
        }
    }

    Ok(vec![
        ShreddedColumn {
            rep_levels: key_rep,
            def_levels: key_def,
            values: key_values,
        },
        ShreddedColumn {
            rep_levels: value_rep,
            def_levels: value_def,
            values: value_values,
        },
    ])
}

fn shred_list(element_max_def: u16, rows: &[ColumnValue]) -> Result<Vec<ShreddedColumn>> {
    let list_empty_level = element_max_def.saturating_sub(1);
    let mut rep_levels = Vec::new();
    let mut def_levels = Vec::new();
    let mut values = Vec::new();

    for row in rows {
        match row {
            ColumnValue::Null => {
                rep_levels.push(0);
                def_levels.push(0);
            }
            ColumnValue::List(items) if items.is_empty() => {
                rep_levels.push(0);
                def_levels.push(list_empty_level);
            }
            ColumnValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    rep_levels.push(if i == 0 { 0 } else { 1 });
                    if item.is_null() {
                        def_levels.push(element_max_def.saturating_sub(1));
                    } else {
                        def_levels.push(element_max_def);
                        values.push(item.clone());
                    }
                }
            }
            other => {
                return Err(Error::Format(format!(
                    "expected a List or Null value, got {:?}",
                    other
                )))
            }
        }
    }

    Ok(vec![ShreddedColumn {
        rep_levels,
        def_levels,
        values,
    }])
}

fn shred_struct(fields: &[LogicalColumn], rows: &[ColumnValue]) -> Result<Vec<ShreddedColumn>> {
    let mut out = Vec::new();
    for field in fields {
        let mut field_rows = Vec::with_capacity(rows.len());
        for row in rows {
            let field_value = match row {
                ColumnValue::Null => ColumnValue::Null,
                ColumnValue::Struct(entries) => entries
                    .iter()
                    .find(|(name, _)| name == field.name())
                    .map(|(_, v)| v.clone())
                    .unwrap_or(ColumnValue::Null),
                other => {
                    return Err(Error::Format(format!(
                        "expected a Struct or Null value, got {:?}",
                        other
                    )))
                }
            };
            field_rows.push(field_value);
        }
        out.extend(shred_logical_column(field, &field_rows)?);
    }
    Ok(out)
}
