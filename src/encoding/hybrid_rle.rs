//! The RLE/bit-packed hybrid stream used for repetition/definition levels
//! and dictionary indices.
//!
//! `stream := <run>*`, each run distinguished by the low bit of a leading
//! unsigned varint: even means an RLE run (a repeated value), odd means a
//! bit-packed run (`varint >> 1` groups of 8 values).

use crate::cursor::ByteCursor;
use crate::encoding::bit_unpacker::{pack, packed_byte_len, unpack};
use crate::error::{Error, Result};

fn value_byte_width(w: u32) -> usize {
    ((w + 7) / 8) as usize
}

/// Decode a hybrid stream with no length prefix, producing exactly `total`
/// values. Used for V2 level streams, whose byte length is already known
/// from the page header.
pub fn decode_hybrid(buf: &[u8], w: u32, total: usize) -> Result<Vec<u64>> {
    let mut cursor = ByteCursor::new(buf);
    let mut out = Vec::with_capacity(total);
    while out.len() < total && !cursor.is_empty() {
        let header = cursor.read_unsigned_varint64()?;
        if header & 1 == 0 {
            let count = (header >> 1) as usize;
            let value = if w == 0 {
                0
            } else {
                let byte_width = value_byte_width(w);
                let bytes = cursor.read_bytes(byte_width)?;
                let mut v: u64 = 0;
                for (i, &b) in bytes.iter().enumerate() {
                    v |= (b as u64) << (8 * i);
                }
                if w < 64 {
                    v &= (1u64 << w) - 1;
                }
                v
            };
            out.extend(std::iter::repeat(value).take(count));
        } else {
            let groups = (header >> 1) as usize;
            let run_values = groups * 8;
            if w == 0 {
                out.extend(std::iter::repeat(0u64).take(run_values));
            } else {
                let byte_len = packed_byte_len(run_values, w);
                let bytes = cursor.read_bytes(byte_len)?;
                out.extend(unpack(bytes, w, run_values)?);
            }
        }
    }
    if out.len() < total {
        return Err(Error::Underflow(format!(
            "hybrid stream produced {} values, expected {}",
            out.len(),
            total
        )));
    }
    out.truncate(total);
    Ok(out)
}

/// Decode a hybrid stream prefixed by a 4-byte little-endian byte length
/// (the V1 level-stream and dictionary-index convention).
pub fn decode_hybrid_with_length_prefix(
    cursor: &mut ByteCursor,
    w: u32,
    total: usize,
) -> Result<Vec<u64>> {
    let len = cursor.read_u32_le()? as usize;
    let bytes = cursor.read_bytes(len)?;
    decode_hybrid(bytes, w, total)
}

/// Encode `values` (each `< 2^w`) as a single bit-packed run, padding the
/// tail with zeros to a multiple of 8 values.
pub fn encode_hybrid(values: &[u64], w: u32) -> Vec<u8> {
    let mut out = Vec::new();
    if values.is_empty() {
        return out;
    }
    if w == 0 {
        return out;
    }
    let groups = (values.len() + 7) / 8;
    let padded_len = groups * 8;
    let mut padded = Vec::with_capacity(padded_len);
    padded.extend_from_slice(values);
    padded.resize(padded_len, 0);
    let header = ((groups as u64) << 1) | 1;
    crate::cursor::write_unsigned_varint(header, &mut out);
    out.extend(pack(&padded, w));
    out
}

/// Encode with the 4-byte little-endian length prefix (V1/dictionary-index
/// convention); the prefix covers only the encoded run bytes.
pub fn encode_hybrid_with_length_prefix(values: &[u64], w: u32) -> Vec<u8> {
    let body = encode_hybrid(values, w);
    let mut out = Vec::with_capacity(4 + body.len());
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend(body);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s1_rle_run() {
        let buf = [0x06u8, 0x01];
        let decoded = decode_hybrid(&buf, 2, 3).unwrap();
        assert_eq!(decoded, vec![1, 1, 1]);
    }

    #[test]
    fn s2_bit_packed_run() {
        let buf = [0x03u8, 0xe4, 0xe4];
        let decoded = decode_hybrid(&buf, 2, 8).unwrap();
        assert_eq!(decoded, vec![0, 1, 2, 3, 0, 1, 2, 3]);
    }

    #[test]
    fn empty_stream_decodes_to_empty() {
        let decoded = decode_hybrid(&[], 2, 0).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn round_trip_bit_packed() {
        let values: Vec<u64> = (0..37).map(|i| i % 4).collect();
        let encoded = encode_hybrid(&values, 2);
        let decoded = decode_hybrid(&encoded, 2, values.len()).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn underflow_on_short_stream() {
        let buf = [0x06u8, 0x01];
        let err = decode_hybrid(&buf, 2, 10).unwrap_err();
        assert!(matches!(err, Error::Underflow(_)));
    }
}
