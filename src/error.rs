//! Error taxonomy for the columnar decode/encode pipeline.
//!
//! Every decoder returns [`Result`]; nothing in non-test code panics on
//! malformed input.

/// The error type of this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid magic, corrupt footer length, unknown enum value, Thrift parse failure.
    Format(String),
    /// An encoding or codec that is recognized but not implemented.
    UnsupportedFeature(String),
    /// A varint/value stream ended before the expected number of bytes were available.
    TruncatedInput(String),
    /// An RLE or delta stream produced fewer values than requested.
    Underflow(String),
    /// A varint was too large, a bit width was out of range, or an index exceeded its bound.
    Overflow(String),
    /// A codec reported failure, or the decompressed size did not match the expected size.
    DecompressFailed(String),
    /// The underlying byte source failed.
    Io(String),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Format(message) => write!(fmt, "format error: {}", message),
            Error::UnsupportedFeature(message) => write!(fmt, "unsupported feature: {}", message),
            Error::TruncatedInput(message) => write!(fmt, "truncated input: {}", message),
            Error::Underflow(message) => write!(fmt, "underflow: {}", message),
            Error::Overflow(message) => write!(fmt, "overflow: {}", message),
            Error::DecompressFailed(message) => write!(fmt, "decompress failed: {}", message),
            Error::Io(message) => write!(fmt, "io error: {}", message),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io(e.to_string())
    }
}

impl From<std::array::TryFromSliceError> for Error {
    fn from(e: std::array::TryFromSliceError) -> Error {
        Error::TruncatedInput(e.to_string())
    }
}

/// A specialized `Result` for this crate's errors.
pub type Result<T> = std::result::Result<T, Error>;
