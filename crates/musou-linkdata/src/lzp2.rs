//! LZP2 decompression.
//!
//! LZP2 is the byte-oriented compression scheme used inside LINKDATA
//! archives. A compressed payload is a 16-byte sub-header (signature,
//! reserved word, decompressed size, compressed size) followed by a stream
//! of flag-selected blocks. Each flag byte picks one of three block kinds:
//!
//! - high bit set: a back-reference into the bytes already produced. The
//!   flag's middle bits encode the copy length (`((flag & 0x78) >> 3) + 3`),
//!   its low 3 bits plus one following byte encode a 0-2047 back-distance.
//!   The copy may overlap its own destination (distance smaller than
//!   length), which repeats the window, so it must be performed one byte at
//!   a time from the output buffer itself.
//! - bit 0x40 set: a run fill. One length byte and one value byte follow;
//!   the value is appended `(flag & 0x3F) * 256 + length_byte + 4` times.
//! - both high bits clear: a literal run. The flag (0-63) counts raw bytes
//!   copied verbatim from the stream.
//!
//! A flag byte of zero terminates the stream. The only integrity check the
//! format carries is the declared decompressed size; a terminated stream
//! that produced any other number of bytes is rejected.

use musou_common::{BinaryReader, Endian};

use crate::{Error, Result};

/// Signature identifying a compressed payload ("LZP2").
pub const LZP2_MAGIC: &[u8; 4] = b"LZP2";

/// Size of the sub-header preceding the flag stream.
const HEADER_SIZE: usize = 16;

/// Check whether a payload is LZP2-compressed.
///
/// The signature at the start of the payload is the format's sole
/// compression indicator; anything else is a stored member.
#[inline]
pub fn is_compressed(data: &[u8]) -> bool {
    data.len() >= LZP2_MAGIC.len() && &data[..LZP2_MAGIC.len()] == LZP2_MAGIC
}

/// Decompress an LZP2 payload, sub-header included.
///
/// `endian` is the profile's entry byte order, which also governs the
/// sub-header fields. `file_id` is the member's logical id, carried into
/// errors for diagnostics. The sub-header's compressed-size field is not
/// used to bound the read; the caller already sliced the member's exact
/// byte range out of the data file.
pub fn decompress(endian: Endian, file_id: usize, data: &[u8]) -> Result<Vec<u8>> {
    let mut reader = BinaryReader::new(data);

    reader.expect_magic(LZP2_MAGIC)?;
    let _reserved = reader.read_u32(endian)?;
    let decompressed_size = reader.read_u32(endian)? as usize;
    let _compressed_size = reader.read_u32(endian)?;
    debug_assert_eq!(reader.position(), HEADER_SIZE);

    let mut output: Vec<u8> = Vec::with_capacity(decompressed_size);

    loop {
        let flag = reader.read_u8()?;
        if flag == 0 {
            break;
        }

        if flag & 0x80 != 0 {
            // Back-reference into the produced output.
            let length = usize::from((flag & 0x78) >> 3) + 3;
            let distance = (usize::from(flag & 7) << 8) | usize::from(reader.read_u8()?);

            let mut src = output.len().checked_sub(distance + 1).ok_or(
                Error::BadBackReference {
                    id: file_id,
                    distance,
                    produced: output.len(),
                },
            )?;

            // Overlapping stream copy: src may catch up with bytes this
            // same copy appended.
            for _ in 0..length {
                let byte = output[src];
                output.push(byte);
                src += 1;
            }
        } else if flag & 0x40 != 0 {
            // Run fill: length byte first in the stream, then the value.
            let low = reader.read_u8()?;
            let value = reader.read_u8()?;
            let length = usize::from(flag & 0x3F) * 0x100 + usize::from(low) + 4;

            output.resize(output.len() + length, value);
        } else {
            // Literal run, the flag is the byte count.
            output.extend_from_slice(reader.read_bytes(usize::from(flag))?);
        }
    }

    if output.len() != decompressed_size {
        return Err(Error::SizeMismatch {
            id: file_id,
            expected: decompressed_size,
            actual: output.len(),
        });
    }

    Ok(output)
}
