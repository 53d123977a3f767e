// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The `.sug` companion file: a soundfold word tree plus, for every
//! soundfold word, the list of dictionary word numbers that fold to it.
//!
//! Word numbers are deltas on each line, encoded with the +1-biased
//! varint so the NUL line terminator stays unambiguous. The timestamp in
//! the header must equal the SN_SUGFILE timestamp of the owning `.spl`;
//! a mismatch means the files were built from different dictionaries and
//! the `.sug` is refused.

use std::io::{Read, Write};

use super::encoding::{encode_sug_delta, read_u32, read_u64, read_u8, write_u32, write_u64, write_u8};
use super::header::{SUG_MAGIC, SUG_VERSION};
use super::tree;
use crate::error::{io_at, Result, SpellError};
use crate::trie::TrieStore;

/// Loading state of a language's suggestion table. `NotLoaded` means "not
/// attempted yet", distinct from `Failed` ("tried, unusable"): a failed
/// load must not be retried on every suggestion.
#[derive(Debug, Default)]
pub enum SugState {
    #[default]
    NotLoaded,
    Loaded(SugFile),
    Failed,
}

impl SugState {
    pub fn loaded(&self) -> Option<&SugFile> {
        match self {
            SugState::Loaded(f) => Some(f),
            _ => None,
        }
    }
}

/// Parsed contents of one `.sug` file.
#[derive(Debug)]
pub struct SugFile {
    pub timestamp: u64,
    /// Soundfolded words; NUL-sibling values are word numbers into
    /// `table` rather than flags.
    pub trie: TrieStore,
    /// For each soundfold word number, the dictionary word numbers.
    pub table: Vec<Vec<u32>>,
}

/// Read and validate a `.sug` stream. `want_timestamp` is the SN_SUGFILE
/// value from the `.spl`.
pub fn read_sug_file<R: Read>(r: &mut R, path: &str, want_timestamp: u64) -> Result<SugFile> {
    let mut magic = [0u8; 6];
    r.read_exact(&mut magic)
        .map_err(|e| io_at(path, "sug magic", e))?;
    if &magic != SUG_MAGIC {
        return Err(SpellError::format(path, "is not a sug file"));
    }
    let version = read_u8(r).map_err(|e| io_at(path, "sug version", e))?;
    if version != SUG_VERSION {
        return Err(SpellError::Version {
            path: path.to_string(),
            version,
        });
    }
    let timestamp = read_u64(r).map_err(|e| io_at(path, "sug timestamp", e))?;
    if timestamp != want_timestamp {
        return Err(SpellError::format(
            path,
            "timestamp does not match the .spl file",
        ));
    }

    let trie = tree::read_tree(r, false, 0, path)?;

    let count = read_u32(r).map_err(|e| io_at(path, "sug word count", e))? as usize;
    let mut table = Vec::with_capacity(count.min(1 << 20));
    for _ in 0..count {
        // One NUL-terminated line of deltas.
        let mut line: Vec<u8> = Vec::new();
        loop {
            let b = read_u8(r).map_err(|e| io_at(path, "sug line", e))?;
            if b == 0 {
                break;
            }
            line.push(b);
        }
        let mut nrs = Vec::new();
        let mut pos = 0usize;
        let mut prev = 0u32;
        while pos < line.len() {
            let (delta, used) = super::encoding::decode_sug_delta(&line[pos..])
                .map_err(|e| io_at(path, "sug number", e))?;
            prev = prev.wrapping_add(delta);
            nrs.push(prev);
            pos += used;
        }
        table.push(nrs);
    }
    Ok(SugFile {
        timestamp,
        trie,
        table,
    })
}

/// Write a `.sug` stream.
pub fn write_sug_file<W: Write>(w: &mut W, sug: &SugFile) -> std::io::Result<()> {
    w.write_all(SUG_MAGIC)?;
    write_u8(w, SUG_VERSION)?;
    write_u64(w, sug.timestamp)?;
    tree::write_tree(w, &sug.trie, false)?;
    write_u32(w, sug.table.len() as u32)?;
    for nrs in &sug.table {
        let mut prev = 0u32;
        let mut line = Vec::new();
        for &nr in nrs {
            encode_sug_delta(nr.wrapping_sub(prev), &mut line);
            prev = nr;
        }
        w.write_all(&line)?;
        write_u8(w, 0)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trie::TrieBuilder;
    use std::io::Cursor;

    fn sample() -> SugFile {
        let mut b = TrieBuilder::new();
        b.insert(b"nt", 0); // word number 0
        b.insert(b"kt", 1); // word number 1
        SugFile {
            timestamp: 0x1234_5678,
            trie: b.finish(),
            table: vec![vec![3, 10, 200], vec![7]],
        }
    }

    #[test]
    fn roundtrip() {
        let sug = sample();
        let mut buf = Vec::new();
        write_sug_file(&mut buf, &sug).unwrap();
        let back = read_sug_file(&mut Cursor::new(&buf), "en.sug", 0x1234_5678).unwrap();
        assert_eq!(back.timestamp, sug.timestamp);
        assert_eq!(back.table, sug.table);
    }

    #[test]
    fn timestamp_mismatch_is_refused() {
        let sug = sample();
        let mut buf = Vec::new();
        write_sug_file(&mut buf, &sug).unwrap();
        let err = read_sug_file(&mut Cursor::new(&buf), "en.sug", 99);
        assert!(matches!(err, Err(SpellError::Format { .. })));
    }

    #[test]
    fn bad_magic_is_refused() {
        let err = read_sug_file(&mut Cursor::new(b"NOTSUGx".to_vec()), "en.sug", 0);
        assert!(matches!(err, Err(SpellError::Format { .. })));
    }

    #[test]
    fn wrong_version_is_refused() {
        let mut buf = Vec::new();
        buf.extend_from_slice(SUG_MAGIC);
        buf.push(9);
        buf.extend_from_slice(&[0; 8]);
        let err = read_sug_file(&mut Cursor::new(&buf), "en.sug", 0);
        assert!(matches!(err, Err(SpellError::Version { .. })));
    }
}
