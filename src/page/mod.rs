//! The page model: dictionary pages and data pages (V1/V2 collapsed into
//! one shape once the reader has segmented levels from values) (§3, §4.8).

pub mod reader;

use crate::schema::types::Encoding;

/// A data page with its level streams and value section already segmented
/// out of the page's (decompressed) body. Rep/def level byte slices are
/// plain hybrid-stream bytes with no length prefix, regardless of source
/// page version.
#[derive(Debug, Clone)]
pub struct DataPage {
    pub rep_levels: Vec<u8>,
    pub def_levels: Vec<u8>,
    pub values: Vec<u8>,
    pub num_values: usize,
    /// Supplied directly by V2 headers; `None` for V1 (the decoder derives
    /// it from the definition levels instead).
    pub num_nulls: Option<usize>,
    /// Supplied directly by V2 headers; `None` for V1.
    pub num_rows: Option<usize>,
    pub encoding: Encoding,
}

#[derive(Debug, Clone)]
pub struct DictionaryPage {
    pub values: Vec<u8>,
    pub num_values: usize,
    pub encoding: Encoding,
}

#[derive(Debug, Clone)]
pub enum Page {
    Dictionary(DictionaryPage),
    Data(DataPage),
}
