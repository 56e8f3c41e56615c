//! The write path: shredding logical rows back to physical columns,
//! encoding pages, and laying out row groups and the footer (§4.11).

pub mod column_writer;
pub mod file_writer;
pub mod page_writer;
pub mod row_group_writer;

pub use file_writer::{FileWriter, WriteOptions};
