//! Physical types, value encodings, and the schema tree.

/// The physical storage type of a leaf column. `Int96` is read-only
/// (legacy timestamp representation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicalType {
    Boolean,
    Int32,
    Int64,
    Int96,
    Float,
    Double,
    ByteArray,
    FixedLenByteArray(u32),
}

/// The on-wire encoding of a column's value section within a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Plain,
    PlainDictionary,
    Rle,
    BitPacked,
    DeltaBinaryPacked,
    DeltaLengthByteArray,
    DeltaByteArray,
    RleDictionary,
    ByteStreamSplit,
}

impl Encoding {
    pub fn is_dictionary(&self) -> bool {
        matches!(self, Encoding::PlainDictionary | Encoding::RleDictionary)
    }
}

/// A schema node's repetition: required (exactly one), optional (zero or
/// one), or repeated (zero or more).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repetition {
    Required,
    Optional,
    Repeated,
}

impl Repetition {
    /// How much this node adds to the cumulative definition level of its
    /// descendants.
    pub fn def_increment(&self) -> u16 {
        match self {
            Repetition::Required => 0,
            Repetition::Optional | Repetition::Repeated => 1,
        }
    }

    /// How much this node adds to the cumulative repetition level of its
    /// descendants.
    pub fn rep_increment(&self) -> u16 {
        match self {
            Repetition::Repeated => 1,
            Repetition::Required | Repetition::Optional => 0,
        }
    }
}

/// A node in the schema tree: either a typed leaf or a group of children.
/// Arena-indexed rather than pointer-linked, matching the DAG guidance for
/// metadata structures: children carry no parent back-reference.
#[derive(Debug, Clone, PartialEq)]
pub enum ParquetType {
    Primitive {
        name: String,
        repetition: Repetition,
        physical_type: PhysicalType,
    },
    Group {
        name: String,
        repetition: Repetition,
        fields: Vec<ParquetType>,
    },
}

impl ParquetType {
    pub fn name(&self) -> &str {
        match self {
            ParquetType::Primitive { name, .. } => name,
            ParquetType::Group { name, .. } => name,
        }
    }

    pub fn repetition(&self) -> Repetition {
        match self {
            ParquetType::Primitive { repetition, .. } => *repetition,
            ParquetType::Group { repetition, .. } => *repetition,
        }
    }

    /// Depth-first leaves, each carrying its full ancestor path and
    /// accumulated `maxDef`/`maxRep`.
    pub fn leaves(&self) -> Vec<super::logical::PhysicalColumn> {
        let mut out = Vec::new();
        collect_leaves(self, Vec::new(), 0, 0, &mut out);
        out
    }
}

fn collect_leaves(
    node: &ParquetType,
    mut path: Vec<String>,
    max_def: u16,
    max_rep: u16,
    out: &mut Vec<super::logical::PhysicalColumn>,
) {
    path.push(node.name().to_string());
    let max_def = max_def + node.repetition().def_increment();
    let max_rep = max_rep + node.repetition().rep_increment();
    match node {
        ParquetType::Primitive {
            physical_type, ..
        } => {
            let type_length = match physical_type {
                PhysicalType::FixedLenByteArray(n) => Some(*n),
                _ => None,
            };
            out.push(super::logical::PhysicalColumn {
                physical_type: *physical_type,
                path,
                max_def,
                max_rep,
                type_length,
            });
        }
        ParquetType::Group { fields, .. } => {
            for field in fields {
                collect_leaves(field, path.clone(), max_def, max_rep, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn def_rep_accumulate_through_ancestry() {
        let schema = ParquetType::Group {
            name: "root".into(),
            repetition: Repetition::Required,
            fields: vec![ParquetType::Group {
                name: "outer".into(),
                repetition: Repetition::Optional,
                fields: vec![ParquetType::Primitive {
                    name: "inner".into(),
                    repetition: Repetition::Repeated,
                    physical_type: PhysicalType::Int32,
                }],
            }],
        };
        let leaves = schema.leaves();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].max_def, 2);
        assert_eq!(leaves[0].max_rep, 1);
        assert_eq!(leaves[0].path, vec!["root", "outer", "inner"]);
    }
}
