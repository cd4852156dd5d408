//! Error types for the LINKDATA crate.

use thiserror::Error;

/// Errors that can occur when working with LINKDATA archives.
///
/// All of these are fatal for the archive being processed: they indicate
/// either a wrong profile selection or a corrupt/unsupported input file,
/// neither of which is recoverable in-process.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] musou_common::Error),

    /// Index header magic did not match the profile.
    #[error("invalid index magic: expected {expected:#010x}, got {actual:#010x}")]
    HeaderMismatch { expected: u32, actual: u32 },

    /// Index header reserved field was non-zero.
    #[error("malformed index header: reserved field must be zero, got {0:#010x}")]
    MalformedHeader(u32),

    /// An index entry's reserved field was non-zero.
    #[error("malformed index entry {index}: reserved field must be zero, got {value:#010x}")]
    MalformedEntry { index: usize, value: u32 },

    /// Decompressed output did not match the declared size.
    #[error("invalid decompression for file {id}: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        id: usize,
        expected: usize,
        actual: usize,
    },

    /// A back-reference pointed before the start of the output.
    #[error(
        "invalid back-reference for file {id}: distance {distance} with only {produced} bytes produced"
    )]
    BadBackReference {
        id: usize,
        distance: usize,
        produced: usize,
    },

    /// Entry id past the end of the index.
    #[error("entry {id} out of range: archive has {count} entries")]
    EntryOutOfRange { id: usize, count: usize },

    /// An entry's byte range falls outside the data file.
    #[error("entry {id} outside data file: offset {offset} + size {size} exceeds {file_len} bytes")]
    EntryBounds {
        id: usize,
        offset: u64,
        size: u32,
        file_len: u64,
    },

    /// The requested game is not in the profile table.
    #[error("unknown game: {0}")]
    UnknownGame(String),
}

/// Result type for LINKDATA operations.
pub type Result<T> = std::result::Result<T, Error>;
