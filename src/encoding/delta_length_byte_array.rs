//! DELTA_LENGTH_BYTE_ARRAY: a DELTA_BINARY_PACKED stream of lengths
//! followed by the concatenated raw bytes.

use crate::cursor::ByteCursor;
use crate::encoding::delta_bitpacked;
use crate::error::{Error, Result};

pub fn decode(cursor: &mut ByteCursor<'_>) -> Result<Vec<Vec<u8>>> {
    let lengths = delta_bitpacked::decode_i32(cursor)?;
    let mut out = Vec::with_capacity(lengths.len());
    for len in lengths {
        if len < 0 {
            return Err(Error::Format(format!(
                "delta length byte array: negative length {}",
                len
            )));
        }
        out.push(cursor.read_bytes(len as usize)?.to_vec());
    }
    Ok(out)
}

pub fn encode(values: &[Vec<u8>]) -> Vec<u8> {
    let lengths: Vec<i64> = values.iter().map(|v| v.len() as i64).collect();
    let mut out = delta_bitpacked::encode_i64(&lengths);
    for v in values {
        out.extend_from_slice(v);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let values: Vec<Vec<u8>> = vec![b"a".to_vec(), b"bcd".to_vec(), b"".to_vec(), b"efghi".to_vec()];
        let encoded = encode(&values);
        let mut cursor = ByteCursor::new(&encoded);
        let decoded = decode(&mut cursor).unwrap();
        assert_eq!(decoded, values);
    }
}
