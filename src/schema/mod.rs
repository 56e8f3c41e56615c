//! The schema and logical/physical column model (§3).

pub mod logical;
pub mod types;

pub use logical::{LogicalColumn, PhysicalColumn};
pub use types::{Encoding, ParquetType, PhysicalType, Repetition};
