//! Binary reader for bounds-checked parsing of byte slices.
//!
//! This module provides [`BinaryReader`], a cursor-like type that reads
//! binary data from a byte slice, and [`Endian`], the runtime byte-order
//! selector its integer reads are parameterized by.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::{Error, Result};

/// Byte order of multi-byte integers in an archive file.
///
/// LINKDATA indexes are not consistently one order: some titles write the
/// index header big-endian and the per-file records little-endian, so the
/// order is carried as a value and chosen per read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

impl Endian {
    /// Decode a u32 from the first four bytes of `bytes`.
    ///
    /// Panics if `bytes` is shorter than four bytes; callers go through
    /// [`BinaryReader`], which bounds-checks first.
    #[inline]
    pub fn read_u32(self, bytes: &[u8]) -> u32 {
        match self {
            Endian::Big => BigEndian::read_u32(bytes),
            Endian::Little => LittleEndian::read_u32(bytes),
        }
    }
}

/// A binary reader over a byte slice.
///
/// Maintains a position and reads without copying. Every read is
/// bounds-checked and returns [`Error::UnexpectedEof`] on a short buffer
/// instead of panicking.
///
/// # Example
///
/// ```
/// use musou_common::{BinaryReader, Endian};
///
/// let data = [0x01, 0x02, 0x03, 0x04];
/// let mut reader = BinaryReader::new(&data);
///
/// assert_eq!(reader.read_u32(Endian::Little).unwrap(), 0x04030201);
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinaryReader<'a> {
    /// Create a new reader from a byte slice.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Get the current position in the buffer.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Peek at bytes without advancing the position.
    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(Error::UnexpectedEof {
                needed: count,
                available: self.remaining(),
            });
        }
        Ok(&self.data[self.position..self.position + count])
    }

    /// Read bytes and advance the position.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    /// Read a u32 in the given byte order.
    #[inline]
    pub fn read_u32(&mut self, endian: Endian) -> Result<u32> {
        self.read_bytes(4).map(|b| endian.read_u32(b))
    }

    /// Expect specific magic bytes or return an error.
    pub fn expect_magic(&mut self, expected: &[u8]) -> Result<()> {
        let actual = self.read_bytes(expected.len())?;
        if actual != expected {
            return Err(Error::InvalidMagic {
                expected: expected.to_vec(),
                actual: actual.to_vec(),
            });
        }
        Ok(())
    }
}
