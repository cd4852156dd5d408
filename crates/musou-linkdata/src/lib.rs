//! LINKDATA archive reader for Koei Tecmo game files.
//!
//! Several Koei Tecmo titles ship their assets as paired files: a small
//! index (usually `.IDX`) describing the members, and a large data blob
//! (`.LNK`, `.BIN`) holding their bytes. The index is a 16-byte header
//! followed by one 16-byte record per member; member payloads sit in the
//! data file at 2048-byte-aligned offsets. Payloads are either stored
//! verbatim or compressed with the engine's byte-oriented "LZP2" scheme,
//! identified by a 4-byte signature at the start of the payload.
//!
//! Byte orders and the header magic vary per title, so every operation
//! takes a [`GameProfile`] describing the title's conventions.
//!
//! # Example
//!
//! ```no_run
//! use musou_linkdata::{GameProfile, LinkArchive};
//!
//! let profile = GameProfile::for_game("dw5")?;
//! let archive = LinkArchive::open(profile, "install/LINKDATA")?;
//!
//! for id in 0..archive.entry_count() {
//!     let data = archive.read(id)?;
//!     std::fs::write(format!("{id}.bin"), data)?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod archive;
mod error;
mod index;
mod lzp2;
mod profile;

pub use archive::LinkArchive;
pub use error::{Error, Result};
pub use index::{parse_index, read_index, ArchiveHeader, IndexEntry};
pub use lzp2::{decompress, is_compressed, LZP2_MAGIC};
pub use profile::GameProfile;
