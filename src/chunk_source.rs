//! The `ChunkSource` capability: the single I/O abstraction the core reads
//! through (§6). Lower components never see a file handle directly.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::sync::Mutex;

use crate::error::{Error, Result};

/// Atomic positional byte access over whatever backs a Parquet file.
///
/// Implementations must make `read_bytes` behave as a single atomic
/// operation from the caller's perspective even under concurrent use (the
/// reference implementation serializes `seek`+`read` behind a mutex).
pub trait ChunkSource: Send + Sync {
    /// Total length of the source, in bytes.
    fn length(&self) -> Result<u64>;

    /// Read exactly `length` bytes starting at `position`.
    ///
    /// Reading past end-of-file clamps to the bytes actually available
    /// (needed for tiny files whose entire body is the footer). Fails with
    /// `Io` if `position` is beyond the source's length.
    fn read_bytes(&self, position: u64, length: u32) -> Result<Vec<u8>>;
}

/// A `ChunkSource` backed by a single `std::fs::File`, guarded by a mutex
/// so `seek` and the following `read` act as one atomic step.
pub struct FileChunkSource {
    file: Mutex<File>,
    length: u64,
}

impl FileChunkSource {
    pub fn new(file: File) -> Result<Self> {
        let length = file.metadata()?.len();
        Ok(Self {
            file: Mutex::new(file),
            length,
        })
    }
}

impl ChunkSource for FileChunkSource {
    fn length(&self) -> Result<u64> {
        Ok(self.length)
    }

    fn read_bytes(&self, position: u64, length: u32) -> Result<Vec<u8>> {
        if position >= self.length {
            return Err(Error::Io(format!(
                "read at position {} is at or past end of file (length {})",
                position, self.length
            )));
        }
        let available = (self.length - position).min(length as u64) as usize;
        let mut buffer = vec![0u8; available];
        let mut guard = self
            .file
            .lock()
            .map_err(|_| Error::Io("file handle mutex poisoned".into()))?;
        guard.seek(SeekFrom::Start(position))?;
        guard.read_exact(&mut buffer)?;
        Ok(buffer)
    }
}

/// A `ChunkSource` over an in-memory buffer, useful for tests and for
/// sources already fully materialized (e.g. downloaded object storage
/// blobs).
pub struct MemoryChunkSource {
    data: Vec<u8>,
}

impl MemoryChunkSource {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl ChunkSource for MemoryChunkSource {
    fn length(&self) -> Result<u64> {
        Ok(self.data.len() as u64)
    }

    fn read_bytes(&self, position: u64, length: u32) -> Result<Vec<u8>> {
        if position >= self.data.len() as u64 {
            return Err(Error::Io(format!(
                "read at position {} is at or past end of buffer (length {})",
                position,
                self.data.len()
            )));
        }
        let start = position as usize;
        let end = (start + length as usize).min(self.data.len());
        Ok(self.data[start..end].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_clamps_short_reads() {
        let source = MemoryChunkSource::new(vec![1, 2, 3]);
        let bytes = source.read_bytes(1, 100).unwrap();
        assert_eq!(bytes, vec![2, 3]);
    }

    #[test]
    fn memory_source_rejects_out_of_range_position() {
        let source = MemoryChunkSource::new(vec![1, 2, 3]);
        assert!(source.read_bytes(3, 1).is_err());
    }
}
