//! PLAIN encoding: raw little-endian primitives, length-prefixed byte
//! arrays, and packed booleans.

use crate::cursor::ByteCursor;
use crate::error::Result;

pub fn decode_bool(cursor: &mut ByteCursor<'_>, n: usize) -> Result<Vec<bool>> {
    let byte_len = (n + 7) / 8;
    let bytes = cursor.read_bytes(byte_len)?;
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let byte = bytes[i / 8];
        out.push((byte >> (i % 8)) & 1 == 1);
    }
    Ok(out)
}

pub fn encode_bool(values: &[bool]) -> Vec<u8> {
    let mut out = vec![0u8; (values.len() + 7) / 8];
    for (i, &v) in values.iter().enumerate() {
        if v {
            out[i / 8] |= 1 << (i % 8);
        }
    }
    out
}

pub fn decode_i32(cursor: &mut ByteCursor<'_>, n: usize) -> Result<Vec<i32>> {
    (0..n).map(|_| cursor.read_i32_le()).collect()
}

pub fn encode_i32(values: &[i32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 4);
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

pub fn decode_i64(cursor: &mut ByteCursor<'_>, n: usize) -> Result<Vec<i64>> {
    (0..n).map(|_| cursor.read_i64_le()).collect()
}

pub fn encode_i64(values: &[i64]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 8);
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

pub fn decode_f32(cursor: &mut ByteCursor<'_>, n: usize) -> Result<Vec<f32>> {
    (0..n).map(|_| cursor.read_f32_le()).collect()
}

pub fn encode_f32(values: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 4);
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

pub fn decode_f64(cursor: &mut ByteCursor<'_>, n: usize) -> Result<Vec<f64>> {
    (0..n).map(|_| cursor.read_f64_le()).collect()
}

pub fn encode_f64(values: &[f64]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 8);
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

/// INT96: 12 raw bytes per value; semantics are the caller's responsibility.
pub fn decode_i96(cursor: &mut ByteCursor<'_>, n: usize) -> Result<Vec<[u8; 12]>> {
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        let bytes = cursor.read_bytes(12)?;
        let mut arr = [0u8; 12];
        arr.copy_from_slice(bytes);
        out.push(arr);
    }
    Ok(out)
}

pub fn decode_byte_array(cursor: &mut ByteCursor<'_>, n: usize) -> Result<Vec<Vec<u8>>> {
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        let len = cursor.read_u32_le()? as usize;
        out.push(cursor.read_bytes(len)?.to_vec());
    }
    Ok(out)
}

pub fn encode_byte_array(values: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    for v in values {
        out.extend_from_slice(&(v.len() as u32).to_le_bytes());
        out.extend_from_slice(v);
    }
    out
}

pub fn decode_fixed_len_byte_array(
    cursor: &mut ByteCursor<'_>,
    n: usize,
    type_length: usize,
) -> Result<Vec<Vec<u8>>> {
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        out.push(cursor.read_bytes(type_length)?.to_vec());
    }
    Ok(out)
}

pub fn encode_fixed_len_byte_array(values: &[Vec<u8>]) -> Vec<u8> {
    values.concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_round_trip() {
        let values = vec![true, false, true, true, false, false, false, true, true];
        let encoded = encode_bool(&values);
        let mut cursor = ByteCursor::new(&encoded);
        let decoded = decode_bool(&mut cursor, values.len()).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn byte_array_round_trip() {
        let values: Vec<Vec<u8>> = vec![b"x".to_vec(), b"".to_vec(), b"longer value".to_vec()];
        let encoded = encode_byte_array(&values);
        let mut cursor = ByteCursor::new(&encoded);
        let decoded = decode_byte_array(&mut cursor, values.len()).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn i32_little_endian() {
        let buf = [42u8, 0, 0, 0, 0xff, 0xff, 0xff, 0xff];
        let mut cursor = ByteCursor::new(&buf);
        let decoded = decode_i32(&mut cursor, 2).unwrap();
        assert_eq!(decoded, vec![42, -1]);
    }
}
