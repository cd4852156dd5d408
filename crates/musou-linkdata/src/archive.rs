//! Archive handle and extraction.
//!
//! A [`LinkArchive`] pairs a parsed index with a memory-mapped data file.
//! The index file handle is scoped to parsing; the data map lives as long
//! as the handle, so member reads are plain slices into it.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use crate::index::{read_index, IndexEntry};
use crate::lzp2;
use crate::profile::GameProfile;
use crate::{Error, Result};

/// An opened LINKDATA archive.
pub struct LinkArchive {
    profile: &'static GameProfile,
    /// Base name of the archive, for diagnostics.
    name: String,
    /// Memory-mapped data file.
    mmap: Mmap,
    /// Members in index order; the position is the member's logical id.
    entries: Vec<IndexEntry>,
}

impl LinkArchive {
    /// Open the archive rooted at `base` (the path without either suffix).
    ///
    /// Reads `<base><index_suffix>` and maps `<base><data_suffix>`.
    pub fn open<P: AsRef<Path>>(profile: &'static GameProfile, base: P) -> Result<Self> {
        let base = base.as_ref();

        let entries = read_index(profile, with_suffix(base, profile.index_suffix))?;

        let file = File::open(with_suffix(base, profile.data_suffix))?;
        let mmap = unsafe { Mmap::map(&file)? };

        let name = base
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self {
            profile,
            name,
            mmap,
            entries,
        })
    }

    /// Get the archive's base name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of members.
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Get the index entries, in logical id order.
    #[inline]
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Get a member's raw byte range, exactly as stored in the data file.
    pub fn raw(&self, id: usize) -> Result<&[u8]> {
        let entry = self.entries.get(id).ok_or(Error::EntryOutOfRange {
            id,
            count: self.entries.len(),
        })?;

        let start = usize::try_from(entry.offset).map_err(|_| bounds_error(id, entry, &self.mmap))?;
        let end = start
            .checked_add(entry.size as usize)
            .filter(|&end| end <= self.mmap.len())
            .ok_or_else(|| bounds_error(id, entry, &self.mmap))?;

        Ok(&self.mmap[start..end])
    }

    /// Check whether a member is stored LZP2-compressed.
    pub fn is_entry_compressed(&self, id: usize) -> Result<bool> {
        self.raw(id).map(lzp2::is_compressed)
    }

    /// Read a member, decompressing it if it is stored compressed.
    pub fn read(&self, id: usize) -> Result<Vec<u8>> {
        let raw = self.raw(id)?;
        if lzp2::is_compressed(raw) {
            lzp2::decompress(self.profile.entry_endian, id, raw)
        } else {
            Ok(raw.to_vec())
        }
    }

    /// Extract every member in ascending logical id order.
    ///
    /// The sink receives `(id, compressed, bytes)` per member and decides
    /// where the bytes go. The first error, whether from the archive or
    /// from the sink, aborts the run; there is no per-member skip.
    pub fn extract<F>(&self, mut sink: F) -> Result<()>
    where
        F: FnMut(usize, bool, &[u8]) -> io::Result<()>,
    {
        for id in 0..self.entries.len() {
            let raw = self.raw(id)?;
            if lzp2::is_compressed(raw) {
                let data = lzp2::decompress(self.profile.entry_endian, id, raw)?;
                sink(id, true, &data)?;
            } else {
                sink(id, false, raw)?;
            }
        }
        Ok(())
    }

    /// Extract every member using a rayon worker pool.
    ///
    /// Decompression runs per member on the pool; sink calls are serialized
    /// behind a mutex, so the sink sees one member at a time but in no
    /// particular order. The logical id makes the writes addressable.
    #[cfg(feature = "parallel")]
    pub fn extract_parallel<F>(&self, mut sink: F) -> Result<()>
    where
        F: FnMut(usize, bool, &[u8]) -> io::Result<()> + Send,
    {
        use rayon::prelude::*;
        use std::sync::Mutex;

        let sink = Mutex::new(&mut sink);

        (0..self.entries.len()).into_par_iter().try_for_each(|id| {
            let raw = self.raw(id)?;
            let (compressed, data) = if lzp2::is_compressed(raw) {
                (true, lzp2::decompress(self.profile.entry_endian, id, raw)?)
            } else {
                (false, raw.to_vec())
            };

            let callback = &mut *sink.lock().unwrap();
            callback(id, compressed, &data)?;
            Ok(())
        })
    }
}

fn bounds_error(id: usize, entry: &IndexEntry, mmap: &Mmap) -> Error {
    Error::EntryBounds {
        id,
        offset: entry.offset,
        size: entry.size,
        file_len: mmap.len() as u64,
    }
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut path = base.as_os_str().to_os_string();
    path.push(suffix);
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use musou_common::Endian;

    fn push_u32(out: &mut Vec<u8>, endian: Endian, value: u32) {
        match endian {
            Endian::Big => out.extend_from_slice(&value.to_be_bytes()),
            Endian::Little => out.extend_from_slice(&value.to_le_bytes()),
        }
    }

    /// Lay out a dw5-convention archive pair in `dir` and return its base
    /// path. Each payload becomes one member, padded to the 2048-byte
    /// alignment.
    fn write_archive(dir: &Path, members: &[&[u8]]) -> PathBuf {
        let profile = GameProfile::for_game("dw5").unwrap();

        let mut index = Vec::new();
        push_u32(&mut index, profile.index_endian, profile.magic);
        push_u32(&mut index, profile.index_endian, members.len() as u32);
        push_u32(&mut index, profile.index_endian, 0);
        push_u32(&mut index, profile.index_endian, 0);

        let mut data = Vec::new();
        for payload in members {
            let offset_units = (data.len() / 0x800) as u32;
            let block_size = (payload.len() as u32).next_multiple_of(0x800);
            push_u32(&mut index, profile.entry_endian, offset_units);
            push_u32(&mut index, profile.entry_endian, block_size);
            push_u32(&mut index, profile.entry_endian, payload.len() as u32);
            push_u32(&mut index, profile.entry_endian, 0);

            data.extend_from_slice(payload);
            data.resize(data.len().next_multiple_of(0x800), 0);
        }

        let base = dir.join("LINKDATA");
        fs::write(with_suffix(&base, profile.index_suffix), index).unwrap();
        fs::write(with_suffix(&base, profile.data_suffix), data).unwrap();
        base
    }

    /// An LZP2 member holding five literal bytes.
    fn lzp2_member() -> Vec<u8> {
        let mut block = Vec::from(*lzp2::LZP2_MAGIC);
        for field in [0u32, 5, 7] {
            block.extend_from_slice(&field.to_le_bytes());
        }
        block.extend_from_slice(&[0x05, 10, 20, 30, 40, 50, 0x00]);
        block
    }

    #[test]
    fn test_end_to_end_extract() {
        let dir = tempfile::tempdir().unwrap();
        let profile = GameProfile::for_game("dw5").unwrap();
        let base = write_archive(dir.path(), &[&lzp2_member(), b"stored bytes"]);

        let archive = LinkArchive::open(profile, &base).unwrap();
        assert_eq!(archive.name(), "LINKDATA");
        assert_eq!(archive.entry_count(), 2);

        // Second member sits one alignment unit in.
        assert_eq!(archive.entries()[1].offset, 2048);

        let mut seen = Vec::new();
        archive
            .extract(|id, compressed, data| {
                seen.push((id, compressed, data.to_vec()));
                Ok(())
            })
            .unwrap();

        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], (0, true, vec![10, 20, 30, 40, 50]));
        assert_eq!(seen[1], (1, false, b"stored bytes".to_vec()));
    }

    #[test]
    fn test_read_dispatches_on_signature() {
        let dir = tempfile::tempdir().unwrap();
        let profile = GameProfile::for_game("dw5").unwrap();
        let base = write_archive(dir.path(), &[b"raw only"]);

        let archive = LinkArchive::open(profile, &base).unwrap();
        assert!(!archive.is_entry_compressed(0).unwrap());
        assert_eq!(archive.read(0).unwrap(), b"raw only");
        assert!(matches!(
            archive.read(1),
            Err(Error::EntryOutOfRange { id: 1, count: 1 })
        ));
    }

    #[test]
    fn test_entry_past_end_of_data_file() {
        let dir = tempfile::tempdir().unwrap();
        let profile = GameProfile::for_game("dw5").unwrap();
        let base = write_archive(dir.path(), &[b"short"]);

        // Grow the declared size past the data file.
        let index_path = with_suffix(&base, profile.index_suffix);
        let mut index = fs::read(&index_path).unwrap();
        index[24..28].copy_from_slice(&0x10000u32.to_le_bytes());
        fs::write(&index_path, index).unwrap();

        let archive = LinkArchive::open(profile, &base).unwrap();
        assert!(matches!(
            archive.read(0),
            Err(Error::EntryBounds { id: 0, .. })
        ));
    }

    #[test]
    fn test_sink_error_aborts_run() {
        let dir = tempfile::tempdir().unwrap();
        let profile = GameProfile::for_game("dw5").unwrap();
        let base = write_archive(dir.path(), &[b"one", b"two"]);

        let archive = LinkArchive::open(profile, &base).unwrap();
        let mut calls = 0;
        let result = archive.extract(|_, _, _| {
            calls += 1;
            Err(io::Error::other("sink full"))
        });

        assert!(matches!(result, Err(Error::Io(_))));
        assert_eq!(calls, 1);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let dir = tempfile::tempdir().unwrap();
        let profile = GameProfile::for_game("dw5").unwrap();
        let base = write_archive(dir.path(), &[&lzp2_member(), b"stored", b"more"]);

        let archive = LinkArchive::open(profile, &base).unwrap();

        let mut sequential = Vec::new();
        archive
            .extract(|id, compressed, data| {
                sequential.push((id, compressed, data.to_vec()));
                Ok(())
            })
            .unwrap();

        let mut parallel = Vec::new();
        archive
            .extract_parallel(|id, compressed, data| {
                parallel.push((id, compressed, data.to_vec()));
                Ok(())
            })
            .unwrap();

        parallel.sort_by_key(|&(id, _, _)| id);
        assert_eq!(sequential, parallel);
    }
}
