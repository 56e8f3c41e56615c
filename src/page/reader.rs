//! Parses Thrift page headers off a column chunk's byte range and
//! segments each page's body into level streams and a value section
//! (§4.8).

use std::io::Read;

use parquet_format_safe as thrift_format;
use parquet_format_safe::thrift::protocol::TCompactInputProtocol;

use crate::chunk_source::ChunkSource;
use crate::compression::{CodecRegistry, CompressionCodec};
use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use crate::metadata::thrift_bridge;
use crate::page::{DataPage, DictionaryPage, Page};

const INITIAL_HEADER_READ: usize = 256;

/// A small `Read` adapter over a borrowed buffer that records how many
/// bytes the Thrift parser actually consumed, so the caller can advance
/// its `ChunkSource` cursor past exactly the header (and nothing more).
struct CountingReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Read for CountingReader<'a> {
    fn read(&mut self, out: &mut [u8]) -> std::io::Result<usize> {
        let available = &self.buf[self.pos..];
        let n = available.len().min(out.len());
        out[..n].copy_from_slice(&available[..n]);
        self.pos += n;
        Ok(n)
    }
}

/// Reads pages out of one column chunk's byte range, in file order.
pub struct PageReader<'a> {
    source: &'a dyn ChunkSource,
    offset: u64,
    end_offset: u64,
    codec: CompressionCodec,
    max_rep: u16,
    max_def: u16,
    registry: CodecRegistry,
}

impl<'a> PageReader<'a> {
    pub fn new(
        source: &'a dyn ChunkSource,
        start_offset: u64,
        end_offset: u64,
        codec: CompressionCodec,
        max_rep: u16,
        max_def: u16,
    ) -> Self {
        Self {
            source,
            offset: start_offset,
            end_offset,
            codec,
            max_rep,
            max_def,
            registry: CodecRegistry::new(),
        }
    }

    /// Parse the next page header, retrying with a larger read if the
    /// initial guess was too small to hold it. Returns the header and the
    /// number of bytes it occupied.
    fn read_page_header(&mut self) -> Result<(thrift_format::PageHeader, u64)> {
        let mut try_size = INITIAL_HEADER_READ;
        loop {
            let remaining_in_chunk = (self.end_offset - self.offset) as usize;
            if remaining_in_chunk == 0 {
                return Err(Error::TruncatedInput(
                    "no bytes remain in column chunk for a page header".into(),
                ));
            }
            let fetch_size = try_size.min(remaining_in_chunk);
            let buf = self.source.read_bytes(self.offset, fetch_size as u32)?;
            let mut counting = CountingReader { buf: &buf, pos: 0 };
            let mut protocol = TCompactInputProtocol::new(&mut counting);
            match thrift_format::PageHeader::read_from_in_protocol(&mut protocol) {
                Ok(header) => return Ok((header, counting.pos as u64)),
                Err(e) => {
                    if fetch_size >= remaining_in_chunk {
                        return Err(Error::Format(format!(
                            "could not parse page header at byte 0x{:x}: {}",
                            self.offset, e
                        )));
                    }
                    try_size = (try_size * 2).min(remaining_in_chunk);
                }
            }
        }
    }

    /// Parse and segment the next page, or `None` once the chunk's byte
    /// range is exhausted.
    pub fn next_page(&mut self) -> Result<Option<Page>> {
        if self.offset >= self.end_offset {
            return Ok(None);
        }

        let (header, header_len) = self.read_page_header()?;
        self.offset += header_len;

        let compressed_size = header.compressed_page_size as usize;
        let uncompressed_size = header.uncompressed_page_size as usize;
        let compressed_bytes = self
            .source
            .read_bytes(self.offset, compressed_size as u32)?;
        self.offset += compressed_size as u64;

        let page_type = header.type_;
        if page_type == thrift_format::PageType::DICTIONARY_PAGE {
            let dict_header = header.dictionary_page_header.ok_or_else(|| {
                Error::Format("DICTIONARY_PAGE header missing dictionary_page_header".into())
            })?;
            let values =
                self.registry
                    .decompress(self.codec, &compressed_bytes, uncompressed_size)?;
            let encoding = thrift_bridge::encoding_from_thrift(dict_header.encoding)?;
            return Ok(Some(Page::Dictionary(DictionaryPage {
                values,
                num_values: dict_header.num_values as usize,
                encoding,
            })));
        }

        if page_type == thrift_format::PageType::DATA_PAGE {
            let data_header = header.data_page_header.ok_or_else(|| {
                Error::Format("DATA_PAGE header missing data_page_header".into())
            })?;
            let num_values = data_header.num_values as usize;
            let encoding = thrift_bridge::encoding_from_thrift(data_header.encoding)?;
            let uncompressed =
                self.registry
                    .decompress(self.codec, &compressed_bytes, uncompressed_size)?;
            let mut cursor = ByteCursor::new(&uncompressed);
            let rep_levels = if self.max_rep > 0 {
                let len = cursor.read_u32_le()? as usize;
                cursor.read_bytes(len)?.to_vec()
            } else {
                Vec::new()
            };
            let def_levels = if self.max_def > 0 {
                let len = cursor.read_u32_le()? as usize;
                cursor.read_bytes(len)?.to_vec()
            } else {
                Vec::new()
            };
            let values = cursor.read_bytes(cursor.remaining())?.to_vec();
            return Ok(Some(Page::Data(DataPage {
                rep_levels,
                def_levels,
                values,
                num_values,
                num_nulls: None,
                num_rows: None,
                encoding,
            })));
        }

        if page_type == thrift_format::PageType::DATA_PAGE_V2 {
            let data_header = header.data_page_header_v2.ok_or_else(|| {
                Error::Format("DATA_PAGE_V2 header missing data_page_header_v2".into())
            })?;
            let num_values = data_header.num_values as usize;
            let num_nulls = data_header.num_nulls as usize;
            let num_rows = data_header.num_rows as usize;
            let rep_len = data_header.repetition_levels_byte_length as usize;
            let def_len = data_header.definition_levels_byte_length as usize;
            if rep_len + def_len > compressed_bytes.len() {
                return Err(Error::TruncatedInput(
                    "DATA_PAGE_V2 level lengths exceed the page body".into(),
                ));
            }
            let rep_levels = compressed_bytes[..rep_len].to_vec();
            let def_levels = compressed_bytes[rep_len..rep_len + def_len].to_vec();
            let values_body = &compressed_bytes[rep_len + def_len..];
            let is_compressed = data_header.is_compressed.unwrap_or(true);
            let values = if is_compressed {
                let target_size = uncompressed_size
                    .checked_sub(rep_len + def_len)
                    .ok_or_else(|| {
                        Error::Format(
                            "DATA_PAGE_V2 uncompressed_page_size smaller than level lengths"
                                .into(),
                        )
                    })?;
                self.registry.decompress(self.codec, values_body, target_size)?
            } else {
                values_body.to_vec()
            };
            let encoding = thrift_bridge::encoding_from_thrift(data_header.encoding)?;
            return Ok(Some(Page::Data(DataPage {
                rep_levels,
                def_levels,
                values,
                num_values,
                num_nulls: Some(num_nulls),
                num_rows: Some(num_rows),
                encoding,
            })));
        }

        if page_type == thrift_format::PageType::INDEX_PAGE {
            return self.next_page();
        }

        Err(Error::UnsupportedFeature(format!(
            "unrecognized page type {:?}",
            page_type
        )))
    }
}
