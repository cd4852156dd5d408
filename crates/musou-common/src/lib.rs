//! Common utilities for Musou.
//!
//! This crate provides the foundational types used across the Musou crates:
//!
//! - [`BinaryReader`] - Bounds-checked binary reading from byte slices
//! - [`Endian`] - Runtime byte-order selection for integer reads
//!
//! LINKDATA archives mix byte orders within a single file (the index header
//! and the index entries may use different orders depending on the game), so
//! unlike most binary readers the integer methods here take the byte order
//! as a call-site argument rather than fixing it per reader.

mod error;
mod reader;

pub use error::{Error, Result};
pub use reader::{BinaryReader, Endian};
