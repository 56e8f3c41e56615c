//! Compression codec plugin layer: `CompressionCodec` is an external enum
//! carried by column chunk metadata; `CodecRegistry` maps it to concrete
//! (de)compressors.

use crate::error::{Error, Result};

/// Codec id as recorded in column chunk metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionCodec {
    Uncompressed,
    Snappy,
    Gzip,
    Lzo,
    Brotli,
    Lz4,
    Zstd,
    Lz4Raw,
}

/// Stateless registry of (de)compressors, keyed by codec id. Held by value
/// on the reader/writer handle rather than as global state.
#[derive(Debug, Default, Clone, Copy)]
pub struct CodecRegistry;

impl CodecRegistry {
    pub fn new() -> Self {
        CodecRegistry
    }

    /// Decompress `compressed` to exactly `uncompressed_size` bytes.
    pub fn decompress(
        &self,
        codec: CompressionCodec,
        compressed: &[u8],
        uncompressed_size: usize,
    ) -> Result<Vec<u8>> {
        match codec {
            CompressionCodec::Uncompressed => Ok(compressed.to_vec()),
            CompressionCodec::Snappy => decompress_snappy(compressed, uncompressed_size),
            CompressionCodec::Gzip => decompress_gzip(compressed, uncompressed_size),
            CompressionCodec::Brotli => decompress_brotli(compressed, uncompressed_size),
            CompressionCodec::Zstd => decompress_zstd(compressed, uncompressed_size),
            CompressionCodec::Lz4 => decompress_lz4_hadoop(compressed, uncompressed_size),
            CompressionCodec::Lz4Raw => decompress_lz4_raw(compressed, uncompressed_size),
            CompressionCodec::Lzo => Err(Error::UnsupportedFeature(
                "LZO decompression is not implemented".into(),
            )),
        }
    }

    /// Compress `raw` with `codec`. `Uncompressed` is a no-op copy.
    pub fn compress(&self, codec: CompressionCodec, raw: &[u8]) -> Result<Vec<u8>> {
        match codec {
            CompressionCodec::Uncompressed => Ok(raw.to_vec()),
            CompressionCodec::Snappy => compress_snappy(raw),
            CompressionCodec::Gzip => compress_gzip(raw),
            CompressionCodec::Brotli => compress_brotli(raw),
            CompressionCodec::Zstd => compress_zstd(raw),
            CompressionCodec::Lz4Raw => compress_lz4_raw(raw),
            CompressionCodec::Lz4 => compress_lz4_hadoop(raw),
            CompressionCodec::Lzo => Err(Error::UnsupportedFeature(
                "LZO compression is not implemented".into(),
            )),
        }
    }
}

fn size_mismatch(expected: usize, got: usize) -> Error {
    Error::DecompressFailed(format!(
        "decompressed size mismatch: expected {} got {}",
        expected, got
    ))
}

#[cfg(feature = "snappy")]
fn decompress_snappy(compressed: &[u8], uncompressed_size: usize) -> Result<Vec<u8>> {
    let mut decoder = snap::raw::Decoder::new();
    let out = decoder
        .decompress_vec(compressed)
        .map_err(|e| Error::DecompressFailed(e.to_string()))?;
    if out.len() != uncompressed_size {
        return Err(size_mismatch(uncompressed_size, out.len()));
    }
    Ok(out)
}
#[cfg(not(feature = "snappy"))]
fn decompress_snappy(_compressed: &[u8], _uncompressed_size: usize) -> Result<Vec<u8>> {
    Err(Error::UnsupportedFeature("snappy feature is disabled".into()))
}

#[cfg(feature = "snappy")]
fn compress_snappy(raw: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = snap::raw::Encoder::new();
    encoder
        .compress_vec(raw)
        .map_err(|e| Error::DecompressFailed(e.to_string()))
}
#[cfg(not(feature = "snappy"))]
fn compress_snappy(_raw: &[u8]) -> Result<Vec<u8>> {
    Err(Error::UnsupportedFeature("snappy feature is disabled".into()))
}

#[cfg(feature = "gzip")]
fn decompress_gzip(compressed: &[u8], uncompressed_size: usize) -> Result<Vec<u8>> {
    use std::io::Read;
    let mut decoder = flate2::read::GzDecoder::new(compressed);
    let mut out = Vec::with_capacity(uncompressed_size);
    decoder
        .read_to_end(&mut out)
        .map_err(|e| Error::DecompressFailed(e.to_string()))?;
    if out.len() != uncompressed_size {
        return Err(size_mismatch(uncompressed_size, out.len()));
    }
    Ok(out)
}
#[cfg(not(feature = "gzip"))]
fn decompress_gzip(_compressed: &[u8], _uncompressed_size: usize) -> Result<Vec<u8>> {
    Err(Error::UnsupportedFeature("gzip feature is disabled".into()))
}

#[cfg(feature = "gzip")]
fn compress_gzip(raw: &[u8]) -> Result<Vec<u8>> {
    use std::io::Write;
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder
        .write_all(raw)
        .map_err(|e| Error::DecompressFailed(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| Error::DecompressFailed(e.to_string()))
}
#[cfg(not(feature = "gzip"))]
fn compress_gzip(_raw: &[u8]) -> Result<Vec<u8>> {
    Err(Error::UnsupportedFeature("gzip feature is disabled".into()))
}

#[cfg(feature = "brotli")]
fn decompress_brotli(compressed: &[u8], uncompressed_size: usize) -> Result<Vec<u8>> {
    use std::io::Read;
    let mut out = Vec::with_capacity(uncompressed_size);
    let mut decoder = brotli::Decompressor::new(compressed, 4096);
    decoder
        .read_to_end(&mut out)
        .map_err(|e| Error::DecompressFailed(e.to_string()))?;
    if out.len() != uncompressed_size {
        return Err(size_mismatch(uncompressed_size, out.len()));
    }
    Ok(out)
}
#[cfg(not(feature = "brotli"))]
fn decompress_brotli(_compressed: &[u8], _uncompressed_size: usize) -> Result<Vec<u8>> {
    Err(Error::UnsupportedFeature("brotli feature is disabled".into()))
}

#[cfg(feature = "brotli")]
fn compress_brotli(raw: &[u8]) -> Result<Vec<u8>> {
    use std::io::Write;
    let mut out = Vec::new();
    let params = brotli::enc::BrotliEncoderParams::default();
    {
        let mut encoder = brotli::CompressorWriter::with_params(&mut out, 4096, &params);
        encoder
            .write_all(raw)
            .map_err(|e| Error::DecompressFailed(e.to_string()))?;
    }
    Ok(out)
}
#[cfg(not(feature = "brotli"))]
fn compress_brotli(_raw: &[u8]) -> Result<Vec<u8>> {
    Err(Error::UnsupportedFeature("brotli feature is disabled".into()))
}

#[cfg(feature = "zstd")]
fn decompress_zstd(compressed: &[u8], uncompressed_size: usize) -> Result<Vec<u8>> {
    let out = zstd::bulk::decompress(compressed, uncompressed_size)
        .map_err(|e| Error::DecompressFailed(e.to_string()))?;
    if out.len() != uncompressed_size {
        return Err(size_mismatch(uncompressed_size, out.len()));
    }
    Ok(out)
}
#[cfg(not(feature = "zstd"))]
fn decompress_zstd(_compressed: &[u8], _uncompressed_size: usize) -> Result<Vec<u8>> {
    Err(Error::UnsupportedFeature("zstd feature is disabled".into()))
}

#[cfg(feature = "zstd")]
fn compress_zstd(raw: &[u8]) -> Result<Vec<u8>> {
    zstd::bulk::compress(raw, 0).map_err(|e| Error::DecompressFailed(e.to_string()))
}
#[cfg(not(feature = "zstd"))]
fn compress_zstd(_raw: &[u8]) -> Result<Vec<u8>> {
    Err(Error::UnsupportedFeature("zstd feature is disabled".into()))
}

#[cfg(feature = "lz4")]
fn decompress_lz4_raw(compressed: &[u8], uncompressed_size: usize) -> Result<Vec<u8>> {
    let out = lz4_flex::block::decompress(compressed, uncompressed_size)
        .map_err(|e| Error::DecompressFailed(e.to_string()))?;
    if out.len() != uncompressed_size {
        return Err(size_mismatch(uncompressed_size, out.len()));
    }
    Ok(out)
}
#[cfg(not(feature = "lz4"))]
fn decompress_lz4_raw(_compressed: &[u8], _uncompressed_size: usize) -> Result<Vec<u8>> {
    Err(Error::UnsupportedFeature("lz4 feature is disabled".into()))
}

#[cfg(feature = "lz4")]
fn compress_lz4_raw(raw: &[u8]) -> Result<Vec<u8>> {
    Ok(lz4_flex::block::compress(raw))
}
#[cfg(not(feature = "lz4"))]
fn compress_lz4_raw(_raw: &[u8]) -> Result<Vec<u8>> {
    Err(Error::UnsupportedFeature("lz4 feature is disabled".into()))
}

#[cfg(feature = "lz4")]
fn decompress_lz4_hadoop(compressed: &[u8], uncompressed_size: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(uncompressed_size);
    let mut pos = 0usize;
    while out.len() < uncompressed_size {
        if pos + 4 > compressed.len() {
            return Err(Error::TruncatedInput(
                "lz4 hadoop frame: missing block length prefix".into(),
            ));
        }
        let block_len =
            u32::from_le_bytes(compressed[pos..pos + 4].try_into()?) as usize;
        pos += 4;
        if pos + block_len > compressed.len() {
            return Err(Error::TruncatedInput(
                "lz4 hadoop frame: block body shorter than declared length".into(),
            ));
        }
        let block = &compressed[pos..pos + block_len];
        pos += block_len;
        let remaining = uncompressed_size - out.len();
        let decoded = lz4_flex::block::decompress(block, remaining)
            .map_err(|e| Error::DecompressFailed(e.to_string()))?;
        out.extend_from_slice(&decoded);
    }
    if out.len() != uncompressed_size {
        return Err(size_mismatch(uncompressed_size, out.len()));
    }
    Ok(out)
}
#[cfg(not(feature = "lz4"))]
fn decompress_lz4_hadoop(_compressed: &[u8], _uncompressed_size: usize) -> Result<Vec<u8>> {
    Err(Error::UnsupportedFeature("lz4 feature is disabled".into()))
}

#[cfg(feature = "lz4")]
fn compress_lz4_hadoop(raw: &[u8]) -> Result<Vec<u8>> {
    let block = lz4_flex::block::compress(raw);
    let mut out = Vec::with_capacity(4 + block.len());
    out.extend_from_slice(&(block.len() as u32).to_le_bytes());
    out.extend(block);
    Ok(out)
}
#[cfg(not(feature = "lz4"))]
fn compress_lz4_hadoop(_raw: &[u8]) -> Result<Vec<u8>> {
    Err(Error::UnsupportedFeature("lz4 feature is disabled".into()))
}

#[cfg(all(test, feature = "lz4"))]
mod tests {
    use super::*;

    #[test]
    fn s7_hadoop_framed_lz4() {
        let block = lz4_flex::block::compress(b"hello");
        let mut framed = Vec::new();
        framed.extend_from_slice(&(block.len() as u32).to_le_bytes());
        framed.extend(block);
        let registry = CodecRegistry::new();
        let out = registry
            .decompress(CompressionCodec::Lz4, &framed, 5)
            .unwrap();
        assert_eq!(out, b"hello");
    }

    #[test]
    fn raw_lz4_round_trip() {
        let raw = b"the quick brown fox jumps over the lazy dog".to_vec();
        let compressed = compress_lz4_raw(&raw).unwrap();
        let decompressed = decompress_lz4_raw(&compressed, raw.len()).unwrap();
        assert_eq!(decompressed, raw);
    }
}
