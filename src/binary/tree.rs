// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The wordTree block codec.
//!
//! A tree block is `<slotcount>[4, MSB]` followed by a recursive node
//! stream. Each node is a sibling count and that many siblings; a sibling
//! is either a literal byte (child node follows later in the stream), a
//! `BY_INDEX` back-reference to an already-materialised node, or one of
//! the end-of-word markers whose payload packs word flags exactly as
//! `types::WordMeta`/`PrefixMeta` describe.
//!
//! The slot count is written first so the reader can allocate both arrays
//! in one go; the recursion then fills them left to right, which is why a
//! `BY_INDEX` reference is always expressible in 3 bytes.

use std::io::{self, Read, Write};

use super::encoding::{read_u16, read_u24, read_u32, read_u8, write_u16, write_u24, write_u32, write_u8};
use super::header::{BY_FLAGS, BY_FLAGS2, BY_INDEX, BY_NOFLAGS, BY_SPECIAL, MAX_NODE_COUNT};
use crate::error::{io_at, Result, SpellError};
use crate::trie::TrieStore;
use crate::types::{WF_AFX, WF_REGION};

/// Marks an `idxs` slot as a resolved shared reference during reading.
/// Child indices never exceed 24 bits, so the top bit is free.
const SHARED_MASK: u32 = 0x8000_0000;

// ============================================================================
// READER
// ============================================================================

/// Read one tree block. `prefixtree` selects the prefix-tree sibling
/// payloads; `prefcond_count` bounds the condition indices they carry.
pub fn read_tree<R: Read>(
    r: &mut R,
    prefixtree: bool,
    prefcond_count: usize,
    path: &str,
) -> Result<TrieStore> {
    let slots = read_u32(r).map_err(|e| io_at(path, "tree size", e))?;
    if slots == 0 {
        return Ok(TrieStore::default());
    }
    if slots > MAX_NODE_COUNT {
        return Err(SpellError::format(
            path,
            format!("tree size {} out of range", slots),
        ));
    }

    let slots = slots as usize;
    let mut byts = vec![0u8; slots];
    let mut idxs = vec![0u32; slots];
    let end = read_node(
        r,
        &mut byts,
        &mut idxs,
        0,
        prefixtree,
        prefcond_count,
        path,
        0,
    )?;
    if end != slots {
        return Err(SpellError::format(
            path,
            format!("tree occupies {} of {} slots", end, slots),
        ));
    }
    Ok(TrieStore::new(byts, idxs))
}

/// Read one node at `start`, returning the next free slot index.
#[allow(clippy::too_many_arguments)]
fn read_node<R: Read>(
    r: &mut R,
    byts: &mut [u8],
    idxs: &mut [u32],
    start: usize,
    prefixtree: bool,
    prefcond_count: usize,
    path: &str,
    depth: usize,
) -> Result<usize> {
    if depth > crate::types::MAXWLEN + 2 {
        return Err(SpellError::format(path, "tree nesting too deep"));
    }
    let count = read_u8(r).map_err(|e| io_at(path, "sibling count", e))? as usize;
    if count == 0 {
        return Err(SpellError::trunc(path, "empty tree node"));
    }
    if start + count >= byts.len() {
        return Err(SpellError::format(path, "sibling count overflows tree"));
    }
    byts[start] = count as u8;

    let mut idx = start + 1;
    for _ in 0..count {
        let mut c = read_u8(r).map_err(|e| io_at(path, "sibling byte", e))?;
        if c <= BY_SPECIAL {
            if c == BY_NOFLAGS && !prefixtree {
                idxs[idx] = 0;
                c = 0;
            } else if c != BY_INDEX {
                if prefixtree {
                    // <pflags?> <affixID> <prefcondnr>
                    let pflags = if c == BY_FLAGS {
                        read_u8(r).map_err(|e| io_at(path, "prefix flags", e))? as u32
                    } else {
                        0
                    };
                    let affix = read_u8(r).map_err(|e| io_at(path, "affix ID", e))? as u32;
                    let cond = read_u16(r).map_err(|e| io_at(path, "condition index", e))? as u32;
                    if cond as usize >= prefcond_count.max(1) {
                        return Err(SpellError::format(
                            path,
                            format!("condition index {} out of range", cond),
                        ));
                    }
                    idxs[idx] = (pflags << 24) | (cond << 8) | affix;
                } else {
                    // <flags> [<flags2>] [<region>] [<affixID>]
                    let marker = c;
                    let mut value =
                        read_u8(r).map_err(|e| io_at(path, "word flags", e))? as u32;
                    if marker == BY_FLAGS2 {
                        value |=
                            (read_u8(r).map_err(|e| io_at(path, "word flags", e))? as u32) << 8;
                    }
                    if value & WF_REGION != 0 {
                        value |=
                            (read_u8(r).map_err(|e| io_at(path, "region mask", e))? as u32) << 16;
                    }
                    if value & WF_AFX != 0 {
                        value |=
                            (read_u8(r).map_err(|e| io_at(path, "affix ID", e))? as u32) << 24;
                    }
                    idxs[idx] = value;
                }
                c = 0;
            } else {
                // BY_INDEX: <nodeidx> <xbyte>
                let target = read_u24(r).map_err(|e| io_at(path, "shared node index", e))?;
                if target as usize >= byts.len() {
                    return Err(SpellError::format(
                        path,
                        format!("shared node index {} out of range", target),
                    ));
                }
                idxs[idx] = target | SHARED_MASK;
                c = read_u8(r).map_err(|e| io_at(path, "shared node byte", e))?;
            }
        }
        byts[idx] = c;
        idx += 1;
    }

    // Children of non-shared, non-NUL siblings follow in order.
    for i in 1..=count {
        if byts[start + i] == 0 {
            continue;
        }
        if idxs[start + i] & SHARED_MASK != 0 {
            idxs[start + i] &= !SHARED_MASK;
        } else {
            idxs[start + i] = idx as u32;
            idx = read_node(r, byts, idxs, idx, prefixtree, prefcond_count, path, depth + 1)?;
        }
    }
    Ok(idx)
}

// ============================================================================
// WRITER
// ============================================================================

/// Write one tree block. Shared subtrees already present in the store
/// (several parents pointing at one child start) are emitted once and
/// referenced with `BY_INDEX` afterwards.
pub fn write_tree<W: Write>(w: &mut W, store: &TrieStore, prefixtree: bool) -> io::Result<()> {
    write_u32(w, store.len() as u32)?;
    if store.is_empty() {
        return Ok(());
    }
    let mut emitted: std::collections::HashMap<usize, u32> = std::collections::HashMap::new();
    let mut next_slot = 0u32;
    emit_node(w, store, 0, prefixtree, &mut emitted, &mut next_slot)?;
    Ok(())
}

fn emit_node<W: Write>(
    w: &mut W,
    store: &TrieStore,
    node: usize,
    prefixtree: bool,
    emitted: &mut std::collections::HashMap<usize, u32>,
    next_slot: &mut u32,
) -> io::Result<()> {
    let count = store
        .sibling_count(node)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "broken tree store"))?;
    emitted.insert(node, *next_slot);
    *next_slot += 1 + count as u32;

    write_u8(w, count as u8)?;
    let byts = store.byts();
    let idxs = store.idxs();
    // First pass decides plain-vs-shared per sibling; the reader resolves
    // plain children against the recursion that follows, so the recursion
    // list must match exactly.
    let mut recurse: Vec<usize> = Vec::new();
    for i in node + 1..node + 1 + count {
        let b = byts[i];
        if b == 0 {
            write_word_value(w, idxs[i], prefixtree)?;
        } else {
            let child = idxs[i] as usize;
            if let Some(&slot) = emitted.get(&child) {
                write_u8(w, BY_INDEX)?;
                write_u24(w, slot)?;
                write_u8(w, b)?;
            } else {
                write_u8(w, b)?;
                recurse.push(child);
            }
        }
    }
    for child in recurse {
        emit_node(w, store, child, prefixtree, emitted, next_slot)?;
    }
    Ok(())
}

fn write_word_value<W: Write>(w: &mut W, value: u32, prefixtree: bool) -> io::Result<()> {
    if prefixtree {
        let pflags = (value >> 24) as u8;
        let affix = (value & 0xFF) as u8;
        let cond = ((value >> 8) & 0xFFFF) as u16;
        if pflags != 0 {
            write_u8(w, BY_FLAGS)?;
            write_u8(w, pflags)?;
        } else {
            write_u8(w, BY_NOFLAGS)?;
        }
        write_u8(w, affix)?;
        write_u16(w, cond)?;
        return Ok(());
    }

    let flags = value & 0xFFFF;
    if flags == 0 {
        return write_u8(w, BY_NOFLAGS);
    }
    if flags > 0xFF {
        write_u8(w, BY_FLAGS2)?;
        write_u8(w, (flags & 0xFF) as u8)?;
        write_u8(w, (flags >> 8) as u8)?;
    } else {
        write_u8(w, BY_FLAGS)?;
        write_u8(w, flags as u8)?;
    }
    if flags & WF_REGION != 0 {
        write_u8(w, ((value >> 16) & 0xFF) as u8)?;
    }
    if flags & WF_AFX != 0 {
        write_u8(w, ((value >> 24) & 0xFF) as u8)?;
    }
    Ok(())
}
