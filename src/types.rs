// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The shared vocabulary of the engine: result classes, packed word flags,
//! and the suggestion record.
//!
//! Word flags travel in a single `u32` because that is exactly how the
//! `.spl` format stores them in the NUL-sibling `idxs[]` slot (see
//! `binary::tree`). Higher layers never poke at the raw integer; they go
//! through [`WordMeta`] / [`PrefixMeta`], which name every field and
//! round-trip losslessly.
//!
//! # Packing (word trees)
//!
//! ```text
//! bits  0..8   base flags (REGION, ONECAP, ALLCAP, RARE, BANNED, AFX,
//!              FIXCAP, KEEPCAP)
//! bits  8..16  extended flags (HAS_AFF, NEEDCOMP, NOSUGGEST, COMPROOT,
//!              NOCOMPBEF, NOCOMPAFT)
//! bits 16..24  region mask     (present iff WF_REGION)
//! bits 24..32  affix ID        (present iff WF_AFX)
//! ```
//!
//! # Packing (prefix tree)
//!
//! ```text
//! bits  0..8   prefix ID
//! bits  8..24  condition index
//! bits 24..32  postponed-prefix flags (WFP_*)
//! ```

use serde::Serialize;

/// Longest word, in bytes, the engine will case-fold and check. Longer
/// spans are classified [`SpellResult::Bad`] without a trie walk.
pub const MAXWLEN: usize = 250;

/// Maximum number of regions in one dictionary.
pub const MAX_REGIONS: usize = 8;

// ============================================================================
// WORD FLAGS (low two bytes of the packed word)
// ============================================================================

/// A region byte follows in the packed word.
pub const WF_REGION: u32 = 0x01;
/// Word must start with a capital.
pub const WF_ONECAP: u32 = 0x02;
/// Word must be all capitals.
pub const WF_ALLCAP: u32 = 0x04;
/// Rare word.
pub const WF_RARE: u32 = 0x08;
/// Bad (forbidden) word.
pub const WF_BANNED: u32 = 0x10;
/// An affix ID byte follows in the packed word.
pub const WF_AFX: u32 = 0x20;
/// Keep-case word, all-cap form is also accepted.
pub const WF_FIXCAP: u32 = 0x40;
/// Keep-case word: on-disk capitalisation is authoritative.
pub const WF_KEEPCAP: u32 = 0x80;

/// Word was produced by affix expansion.
pub const WF_HAS_AFF: u32 = 0x0100;
/// Word is only valid inside a compound.
pub const WF_NEEDCOMP: u32 = 0x0200;
/// Do not offer this word as a suggestion.
pub const WF_NOSUGGEST: u32 = 0x0400;
/// Word is a compound root (COMPOUNDROOT).
pub const WF_COMPROOT: u32 = 0x0800;
/// Word may not compound with the word before it.
pub const WF_NOCOMPBEF: u32 = 0x1000;
/// Word may not compound with the word after it.
pub const WF_NOCOMPAFT: u32 = 0x2000;

/// All capital-requirement bits a word entry can carry.
pub const WF_CAPMASK: u32 = WF_ONECAP | WF_ALLCAP | WF_KEEPCAP | WF_FIXCAP;

/// Runtime-only: the bad word mixes upper and lower case so thoroughly
/// that both capitalisations are worth suggesting.
pub const WF_MIXCAP: u32 = 0x2000_0000;

// ============================================================================
// POSTPONED-PREFIX FLAGS (high byte of a prefix-tree word)
// ============================================================================

/// Rare prefix.
pub const WFP_RARE: u8 = 0x01;
/// Prefix does not combine with a suffix.
pub const WFP_NC: u8 = 0x02;
/// Prefix that upper-cases the following letter.
pub const WFP_UP: u8 = 0x04;
/// Prefix has COMPOUNDPERMITFLAG.
pub const WFP_COMPPERMIT: u8 = 0x08;
/// Prefix has COMPOUNDFORBIDFLAG.
pub const WFP_COMPFORBID: u8 = 0x10;

// Prefix flags shifted into a full word-flag value, for when a prefix match
// contributes flags to the matched word.
pub const WF_RAREPFX: u32 = (WFP_RARE as u32) << 24;
pub const WF_PFX_NC: u32 = (WFP_NC as u32) << 24;
pub const WF_PFX_UP: u32 = (WFP_UP as u32) << 24;
pub const WF_PFX_COMPPERMIT: u32 = (WFP_COMPPERMIT as u32) << 24;
pub const WF_PFX_COMPFORBID: u32 = (WFP_COMPFORBID as u32) << 24;

// ============================================================================
// COMPOUND OPTION BITS (COMPOUND section <compoptions>)
// ============================================================================

/// CHECKCOMPOUNDDUP: forbid the same word twice in a row.
pub const COMP_CHECK_DUP: u8 = 0x01;
/// CHECKCOMPOUNDREP: forbid compounds that look like a REP fix.
pub const COMP_CHECK_REP: u8 = 0x02;
/// CHECKCOMPOUNDCASE: forbid upper-case letters at word junctions.
pub const COMP_CHECK_CASE: u8 = 0x04;
/// CHECKCOMPOUNDTRIPLE: forbid three identical letters at a junction.
pub const COMP_CHECK_TRIPLE: u8 = 0x08;

// ============================================================================
// RESULT CLASSES
// ============================================================================

/// Classification of one checked word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpellResult {
    /// In the dictionary (or not a word at all).
    Good,
    /// In the dictionary but marked rare.
    Rare,
    /// Valid only in another region of the language.
    Local,
    /// Not in the dictionary.
    Bad,
    /// Explicitly forbidden.
    Banned,
}

impl SpellResult {
    /// True for every class a caller would flag in some way.
    pub fn needs_attention(self) -> bool {
        self != SpellResult::Good
    }
}

/// Result of checking the text at one position: the class and how many
/// bytes of input the word occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckedWord {
    pub result: SpellResult,
    /// Bytes consumed from the input, including a leading numeric span
    /// when digits preceded the word.
    pub len: usize,
    /// The word is fine but should have started with a capital (set only
    /// when the caller said the position expects one).
    pub cap_error: bool,
}

impl CheckedWord {
    pub fn good(len: usize) -> Self {
        CheckedWord {
            result: SpellResult::Good,
            len,
            cap_error: false,
        }
    }
}

// ============================================================================
// PACKED WORD ACCESSORS
// ============================================================================

/// Decoded view of a fold/keep-case tree word value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WordMeta {
    /// WF_* bits (low 16 bits of the packed word).
    pub flags: u32,
    /// Region bitmask, 0 = all regions.
    pub region: u8,
    /// Affix ID for postponed-prefix matching, 0 = none.
    pub affix_id: u8,
}

impl WordMeta {
    pub fn decode(raw: u32) -> Self {
        let flags = raw & 0xFFFF;
        let region = if flags & WF_REGION != 0 {
            ((raw >> 16) & 0xFF) as u8
        } else {
            0
        };
        let affix_id = if flags & WF_AFX != 0 {
            ((raw >> 24) & 0xFF) as u8
        } else {
            0
        };
        WordMeta {
            flags,
            region,
            affix_id,
        }
    }

    /// Inverse of [`WordMeta::decode`]. The REGION/AFX presence bits are
    /// derived from the fields, so an inconsistent mix cannot be encoded.
    pub fn encode(&self) -> u32 {
        let mut flags = self.flags & 0xFFFF;
        if self.region != 0 {
            flags |= WF_REGION;
        } else {
            flags &= !WF_REGION;
        }
        if self.affix_id != 0 {
            flags |= WF_AFX;
        } else {
            flags &= !WF_AFX;
        }
        flags | ((self.region as u32) << 16) | ((self.affix_id as u32) << 24)
    }

    pub fn has(&self, bit: u32) -> bool {
        self.flags & bit != 0
    }
}

/// Decoded view of a prefix-tree word value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrefixMeta {
    /// ID shared with the affix ID byte of main-tree words.
    pub prefix_id: u8,
    /// Index into the prefix condition table.
    pub cond_index: u16,
    /// WFP_* bits.
    pub pflags: u8,
}

impl PrefixMeta {
    pub fn decode(raw: u32) -> Self {
        PrefixMeta {
            prefix_id: (raw & 0xFF) as u8,
            cond_index: ((raw >> 8) & 0xFFFF) as u16,
            pflags: ((raw >> 24) & 0xFF) as u8,
        }
    }

    pub fn encode(&self) -> u32 {
        (self.prefix_id as u32) | ((self.cond_index as u32) << 8) | ((self.pflags as u32) << 24)
    }

    pub fn is_rare(&self) -> bool {
        self.pflags & WFP_RARE != 0
    }

    pub fn combines(&self) -> bool {
        self.pflags & WFP_NC == 0
    }
}

// ============================================================================
// SUGGESTIONS
// ============================================================================

/// One replacement candidate for a bad word. Lower score is better.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub word: String,
    /// Bytes of the original text this suggestion replaces.
    pub orig_len: usize,
    pub score: i32,
    /// Secondary score used for tie-breaking: the sound-a-like score in
    /// `best` mode, the plain edit score for sound-based candidates.
    pub alt_score: i32,
    /// Candidate came from the sound-folded walk.
    pub sound_based: bool,
}

/// Case pattern of an input word, from the capital-letter layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseType {
    /// All lower case, matches anything not case-restricted.
    Folded,
    /// First letter capitalised.
    OneCap,
    /// Every letter capitalised.
    AllCap,
    /// Mixed capitals; only keep-case entries can match.
    KeepCap,
}

impl CaseType {
    /// The WF_* capital flags this case satisfies when checking a word
    /// entry that carries case requirements.
    pub fn as_flags(self) -> u32 {
        match self {
            CaseType::Folded => 0,
            CaseType::OneCap => WF_ONECAP,
            CaseType::AllCap => WF_ALLCAP,
            CaseType::KeepCap => WF_KEEPCAP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_meta_roundtrip() {
        let meta = WordMeta {
            flags: WF_RARE | WF_NEEDCOMP,
            region: 0x05,
            affix_id: 42,
        };
        let raw = meta.encode();
        let back = WordMeta::decode(raw);
        assert_eq!(back.region, 0x05);
        assert_eq!(back.affix_id, 42);
        assert!(back.has(WF_RARE));
        assert!(back.has(WF_NEEDCOMP));
        assert!(back.has(WF_REGION));
        assert!(back.has(WF_AFX));
    }

    #[test]
    fn word_meta_no_region_no_affix() {
        let raw = WordMeta {
            flags: WF_ONECAP,
            region: 0,
            affix_id: 0,
        }
        .encode();
        let back = WordMeta::decode(raw);
        assert!(!back.has(WF_REGION));
        assert!(!back.has(WF_AFX));
        assert_eq!(back.region, 0);
    }

    #[test]
    fn prefix_meta_roundtrip() {
        let meta = PrefixMeta {
            prefix_id: 7,
            cond_index: 300,
            pflags: WFP_RARE | WFP_NC,
        };
        let back = PrefixMeta::decode(meta.encode());
        assert_eq!(back, meta);
        assert!(back.is_rare());
        assert!(!back.combines());
    }

    #[test]
    fn decode_ignores_region_without_flag() {
        // Garbage in the region byte must not leak when WF_REGION is unset.
        let raw = WF_RARE | (0xAB << 16);
        assert_eq!(WordMeta::decode(raw).region, 0);
    }
}
