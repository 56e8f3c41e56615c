//! DELTA_BYTE_ARRAY: prefix/suffix delta encoding built from two
//! back-to-back DELTA_BINARY_PACKED integer streams plus concatenated
//! suffix bytes.

use crate::cursor::ByteCursor;
use crate::encoding::delta_bitpacked;
use crate::error::{Error, Result};

pub fn decode(cursor: &mut ByteCursor<'_>) -> Result<Vec<Vec<u8>>> {
    let prefix_lengths = delta_bitpacked::decode_i32(cursor)?;
    let suffix_lengths = delta_bitpacked::decode_i32(cursor)?;
    if prefix_lengths.len() != suffix_lengths.len() {
        return Err(Error::Format(format!(
            "delta byte array: prefix/suffix length mismatch ({} vs {})",
            prefix_lengths.len(),
            suffix_lengths.len()
        )));
    }
    if let Some(&first) = prefix_lengths.first() {
        if first != 0 {
            return Err(Error::Format(
                "delta byte array: first value's prefix length must be 0".into(),
            ));
        }
    }

    let mut out: Vec<Vec<u8>> = Vec::with_capacity(prefix_lengths.len());
    let mut prev: Vec<u8> = Vec::new();
    for (prefix_len, suffix_len) in prefix_lengths.into_iter().zip(suffix_lengths.into_iter()) {
        if prefix_len < 0 || suffix_len < 0 {
            return Err(Error::Format("delta byte array: negative length".into()));
        }
        let prefix_len = prefix_len as usize;
        if prefix_len > prev.len() {
            return Err(Error::Format(format!(
                "delta byte array: prefix length {} exceeds previous value length {}",
                prefix_len,
                prev.len()
            )));
        }
        let suffix = cursor.read_bytes(suffix_len as usize)?;
        let mut value = Vec::with_capacity(prefix_len + suffix.len());
        value.extend_from_slice(&prev[..prefix_len]);
        value.extend_from_slice(suffix);
        prev = value.clone();
        out.push(value);
    }
    Ok(out)
}

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

pub fn encode(values: &[Vec<u8>]) -> Vec<u8> {
    let mut prefix_lengths: Vec<i64> = Vec::with_capacity(values.len());
    let mut suffixes: Vec<Vec<u8>> = Vec::with_capacity(values.len());
    let mut prev: &[u8] = &[];
    for v in values {
        let prefix_len = if prefix_lengths.is_empty() {
            0
        } else {
            common_prefix_len(prev, v)
        };
        prefix_lengths.push(prefix_len as i64);
        suffixes.push(v[prefix_len..].to_vec());
        prev = v;
    }
    let suffix_lengths: Vec<i64> = suffixes.iter().map(|s| s.len() as i64).collect();

    let mut out = delta_bitpacked::encode_i64(&prefix_lengths);
    out.extend(delta_bitpacked::encode_i64(&suffix_lengths));
    for s in &suffixes {
        out.extend_from_slice(s);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let values: Vec<Vec<u8>> = vec![
            b"hello".to_vec(),
            b"help".to_vec(),
            b"helper".to_vec(),
            b"world".to_vec(),
        ];
        let encoded = encode(&values);
        let mut cursor = ByteCursor::new(&encoded);
        let decoded = decode(&mut cursor).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn rejects_nonzero_first_prefix() {
        let mut buf = delta_bitpacked::encode_i64(&[1, 0]);
        buf.extend(delta_bitpacked::encode_i64(&[1, 1]));
        buf.extend_from_slice(b"ab");
        let mut cursor = ByteCursor::new(&buf);
        let err = decode(&mut cursor).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }
}
