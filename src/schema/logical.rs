//! Logical columns as seen by row assembly, built from the physical
//! (leaf) columns of the schema tree.

use super::types::PhysicalType;
use crate::error::{Error, Result};

/// A leaf column: physical storage type plus the ancestry-derived level
/// bounds a decoder needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalColumn {
    pub physical_type: PhysicalType,
    pub path: Vec<String>,
    pub max_def: u16,
    pub max_rep: u16,
    pub type_length: Option<u32>,
}

/// The logical shape row assembly reconstructs a value as. Each physical
/// column is referenced by exactly one logical column.
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalColumn {
    Primitive(PhysicalColumn),
    Map {
        name: String,
        key: PhysicalColumn,
        value: PhysicalColumn,
    },
    List {
        name: String,
        element: PhysicalColumn,
    },
    Struct {
        name: String,
        fields: Vec<LogicalColumn>,
    },
}

impl LogicalColumn {
    pub fn name(&self) -> &str {
        match self {
            LogicalColumn::Primitive(col) => {
                col.path.last().map(String::as_str).unwrap_or("")
            }
            LogicalColumn::Map { name, .. } => name,
            LogicalColumn::List { name, .. } => name,
            LogicalColumn::Struct { name, .. } => name,
        }
    }
}

/// Group the flat leaf-column list (as stored in column chunk metadata)
/// into logical columns, recognizing the standard nested-type path
/// conventions:
///
/// - Map: `[X, "key_value", "key"]` + `[X, "key_value", "value"]`.
/// - List (3-level): `[X, "list", "element"]`.
/// - Struct: two or more leaves sharing a common leading path segment that
///   does not match either convention above.
///
/// `depth` is the number of leading path segments already consumed by an
/// enclosing group; callers building top-level columns pass 0.
pub fn assemble_logical_columns(leaves: &[PhysicalColumn], depth: usize) -> Vec<LogicalColumn> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < leaves.len() {
        let name = leaves[i].path[depth].clone();
        let mut j = i + 1;
        while j < leaves.len() && leaves[j].path.get(depth) == Some(&name) {
            j += 1;
        }
        let group = &leaves[i..j];
        out.push(build_group(&name, group, depth));
        i = j;
    }
    out
}

fn build_group(name: &str, group: &[PhysicalColumn], depth: usize) -> LogicalColumn {
    if group.len() == 1 && group[0].path.len() == depth + 1 {
        return LogicalColumn::Primitive(group[0].clone());
    }

    if group.len() == 2 && group.iter().all(|c| c.path.get(depth + 1).map(String::as_str) == Some("key_value")) {
        let key = group.iter().find(|c| c.path.get(depth + 2).map(String::as_str) == Some("key"));
        let value = group.iter().find(|c| c.path.get(depth + 2).map(String::as_str) == Some("value"));
        if let (Some(key), Some(value)) = (key, value) {
            if key.path.len() == depth + 3 && value.path.len() == depth + 3 {
                return LogicalColumn::Map {
                    name: name.to_string(),
                    key: key.clone(),
                    value: value.clone(),
                };
            }
        }
    }

    if group.len() == 1
        && group[0].path.len() == depth + 3
        && group[0].path.get(depth + 1).map(String::as_str) == Some("list")
        && group[0].path.get(depth + 2).map(String::as_str) == Some("element")
    {
        return LogicalColumn::List {
            name: name.to_string(),
            element: group[0].clone(),
        };
    }

    LogicalColumn::Struct {
        name: name.to_string(),
        fields: assemble_logical_columns(group, depth + 1),
    }
}

/// Resolve a decoded dictionary index to its value, per §4.9's requirement
/// that an unseen or out-of-range index fails rather than silently
/// returning a default.
pub fn resolve_dictionary_index<T: Clone>(dictionary: &[T], index: u64) -> Result<T> {
    dictionary
        .get(index as usize)
        .cloned()
        .ok_or_else(|| Error::Overflow(format!("dictionary index {} out of range", index)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::PhysicalType;

    fn col(path: &[&str], max_def: u16, max_rep: u16) -> PhysicalColumn {
        PhysicalColumn {
            physical_type: PhysicalType::ByteArray,
            path: path.iter().map(|s| s.to_string()).collect(),
            max_def,
            max_rep,
            type_length: None,
        }
    }

    #[test]
    fn detects_adjacent_map_pair() {
        let leaves = vec![
            col(&["m", "key_value", "key"], 2, 1),
            col(&["m", "key_value", "value"], 3, 1),
        ];
        let logical = assemble_logical_columns(&leaves, 0);
        assert_eq!(logical.len(), 1);
        match &logical[0] {
            LogicalColumn::Map { name, .. } => assert_eq!(name, "m"),
            other => panic!("expected Map, got {:?}", other),
        }
    }

    #[test]
    fn detects_three_level_list() {
        let leaves = vec![col(&["items", "list", "element"], 3, 1)];
        let logical = assemble_logical_columns(&leaves, 0);
        assert_eq!(logical.len(), 1);
        assert!(matches!(logical[0], LogicalColumn::List { .. }));
    }

    #[test]
    fn non_map_leaves_pass_through_as_primitive() {
        let leaves = vec![col(&["a"], 1, 0), col(&["b"], 1, 0)];
        let logical = assemble_logical_columns(&leaves, 0);
        assert_eq!(logical.len(), 2);
        assert!(matches!(logical[0], LogicalColumn::Primitive(_)));
        assert!(matches!(logical[1], LogicalColumn::Primitive(_)));
    }

    #[test]
    fn groups_struct_siblings() {
        let leaves = vec![
            col(&["point", "x"], 1, 0),
            col(&["point", "y"], 1, 0),
        ];
        let logical = assemble_logical_columns(&leaves, 0);
        assert_eq!(logical.len(), 1);
        match &logical[0] {
            LogicalColumn::Struct { name, fields } => {
                assert_eq!(name, "point");
                assert_eq!(fields.len(), 2);
            }
            other => panic!("expected Struct, got {:?}", other),
        }
    }
}
