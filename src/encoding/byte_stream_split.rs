//! BYTE_STREAM_SPLIT (FLOAT/DOUBLE only): each value's bytes are split
//! across `W` contiguous per-byte-position streams instead of being stored
//! contiguously; decoding is a transposition.

use crate::error::{Error, Result};

fn transpose_decode(buf: &[u8], n: usize, width: usize) -> Result<Vec<Vec<u8>>> {
    let needed = n * width;
    if buf.len() < needed {
        return Err(Error::TruncatedInput(format!(
            "byte_stream_split needs {} bytes for {} values of width {}, got {}",
            needed,
            n,
            width,
            buf.len()
        )));
    }
    let mut out = vec![vec![0u8; width]; n];
    for byte_index in 0..width {
        let stream = &buf[byte_index * n..(byte_index + 1) * n];
        for (value_index, &b) in stream.iter().enumerate() {
            out[value_index][byte_index] = b;
        }
    }
    Ok(out)
}

pub fn decode_f32(buf: &[u8], n: usize) -> Result<Vec<f32>> {
    transpose_decode(buf, n, 4).map(|rows| {
        rows.into_iter()
            .map(|r| f32::from_le_bytes([r[0], r[1], r[2], r[3]]))
            .collect()
    })
}

pub fn decode_f64(buf: &[u8], n: usize) -> Result<Vec<f64>> {
    transpose_decode(buf, n, 8).map(|rows| {
        rows.into_iter()
            .map(|r| {
                let mut arr = [0u8; 8];
                arr.copy_from_slice(&r);
                f64::from_le_bytes(arr)
            })
            .collect()
    })
}

fn transpose_encode(rows: &[Vec<u8>], width: usize) -> Vec<u8> {
    let n = rows.len();
    let mut out = vec![0u8; n * width];
    for byte_index in 0..width {
        for (value_index, row) in rows.iter().enumerate() {
            out[byte_index * n + value_index] = row[byte_index];
        }
    }
    out
}

pub fn encode_f32(values: &[f32]) -> Vec<u8> {
    let rows: Vec<Vec<u8>> = values.iter().map(|v| v.to_le_bytes().to_vec()).collect();
    transpose_encode(&rows, 4)
}

pub fn encode_f64(values: &[f64]) -> Vec<u8> {
    let rows: Vec<Vec<u8>> = values.iter().map(|v| v.to_le_bytes().to_vec()).collect();
    transpose_encode(&rows, 8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn f32_round_trip() {
        let values = vec![1.5f32, -2.25, 0.0, f32::MAX];
        let encoded = encode_f32(&values);
        let decoded = decode_f32(&encoded, values.len()).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn f64_round_trip() {
        let values = vec![1.5f64, -2.25, 0.0, f64::MIN];
        let encoded = encode_f64(&values);
        let decoded = decode_f64(&encoded, values.len()).unwrap();
        assert_eq!(decoded, values);
    }
}
