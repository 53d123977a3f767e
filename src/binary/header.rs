// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Constants of the `.spl` / `.sug` container formats.
//!
//! The layout is fixed by the Vim spell file format, so unlike a
//! self-designed format there is no version to bump here: `VERSION` is
//! what the ecosystem's dictionaries carry, and the reader must accept
//! exactly that. Sections are a TLV stream; an unknown section with the
//! required bit set fails the load, an unknown optional one is skipped by
//! length.

// ============================================================================
// MAGIC / VERSIONS
// ============================================================================

/// File magic at the start of a `.spl` file.
pub const SPELL_MAGIC: &[u8; 8] = b"VIMspell";

/// The one supported `.spl` version.
pub const SPELL_VERSION: u8 = 50;

/// File magic at the start of a `.sug` file.
pub const SUG_MAGIC: &[u8; 6] = b"VIMsug";

/// The one supported `.sug` version.
pub const SUG_VERSION: u8 = 1;

// ============================================================================
// SECTION IDS
// ============================================================================

pub const SN_REGION: u8 = 0;
pub const SN_CHARFLAGS: u8 = 1;
pub const SN_MIDWORD: u8 = 2;
pub const SN_PREFCOND: u8 = 3;
pub const SN_REP: u8 = 4;
pub const SN_SAL: u8 = 5;
pub const SN_SOFO: u8 = 6;
pub const SN_MAP: u8 = 7;
pub const SN_COMPOUND: u8 = 8;
pub const SN_SYLLABLE: u8 = 9;
pub const SN_NOBREAK: u8 = 10;
pub const SN_SUGFILE: u8 = 11;
pub const SN_REPSAL: u8 = 12;
pub const SN_WORDS: u8 = 13;
pub const SN_NOSPLITSUGS: u8 = 14;
pub const SN_INFO: u8 = 15;
/// Sentinel: end of the section stream, the three trees follow.
pub const SN_END: u8 = 255;

/// Section flag bit 0: reader must understand this section or fail.
pub const SNF_REQUIRED: u8 = 0x01;

// ============================================================================
// TREE SIBLING MARKERS
// ============================================================================

/// End of word, no flags, all regions.
pub const BY_NOFLAGS: u8 = 0;
/// Shared subtree: a 3-byte node index and the actual byte follow.
pub const BY_INDEX: u8 = 1;
/// End of word with a one-byte flag set (+ optional region/affix bytes).
pub const BY_FLAGS: u8 = 2;
/// End of word with a two-byte flag set (+ optional region/affix bytes).
pub const BY_FLAGS2: u8 = 3;
/// Values above this are literal byte values.
pub const BY_SPECIAL: u8 = BY_FLAGS2;

// ============================================================================
// LIMITS (malformed input must fail, not allocate)
// ============================================================================

/// Hard cap on one section's recorded length.
pub const MAX_SECTION_LEN: u32 = 0x0FFF_FFFF;

/// Hard cap on the node count of one tree; BY_INDEX references are 3
/// bytes, so anything above this cannot be encoded anyway.
pub const MAX_NODE_COUNT: u32 = 0x00FF_FFFF;

/// SAL section flag bits.
pub const SAL_F0LLOWUP: u8 = 0x01;
pub const SAL_COLLAPSE: u8 = 0x02;
pub const SAL_REM_ACCENTS: u8 = 0x04;

/// Every WORDS-section common word starts with this occurrence count.
pub const COMMON_WORD_START_COUNT: u16 = 10;
