//! Error types shared by every layer of the wrapping engine.
//!
//! MXF work crosses several layers (byte I/O, KLV codec, essence parsers,
//! metadata, crypto) that all report into one result space, so a single
//! enum carries the whole taxonomy. Lower layers never retry; retry is a
//! caller policy.

use thiserror::Error;

/// Errors reported by readers, writers, parsers, and crypto contexts.
#[derive(Debug, Error)]
#[must_use]
#[non_exhaustive]
pub enum Error {
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("file open failure: {0}")]
    FileOpen(String),

    #[error("invalid file location requested")]
    BadSeek,

    #[error("file read error: {0}")]
    ReadFail(#[source] std::io::Error),

    #[error("file write error: {0}")]
    WriteFail(#[source] std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("attempt to read past end of file")]
    EndOfFile,

    #[error("buffer too small: need {need} bytes, have {have}")]
    SmallBuf { need: usize, have: usize },

    #[error("operation invalid in current state: {0}")]
    State(&'static str),

    #[error("object used before initialization: {0}")]
    Init(&'static str),

    #[error("malformed BER length")]
    MalformedBer,

    #[error("MXF structural violation: {0}")]
    Format(String),

    #[error("essence parser could not align to expected markers: {0}")]
    RawFormat(String),

    #[error("could not identify essence type")]
    RawEss,

    #[error("cryptographic context used before key initialization")]
    CryptInit,

    #[error("cryptographic operation failed: {0}")]
    CryptFail(&'static str),

    #[error("HMAC verification failed")]
    HmacFail,

    #[error("memory allocation failure")]
    Alloc,

    #[error("invalid parameter: {0}")]
    Param(&'static str),

    #[error("invalid configuration option: {0}")]
    Config(String),

    #[error("entropy seed source unreachable: {0}")]
    SeedSource(String),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True when the error indicates the expected terminator rather than a
    /// structural failure.
    pub fn is_end_of_file(&self) -> bool {
        matches!(self, Error::EndOfFile)
    }
}
