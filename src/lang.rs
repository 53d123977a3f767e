// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! `Language`: everything one loaded dictionary knows.
//!
//! A `Language` owns the three tries (fold-case, keep-case, prefix) plus
//! every auxiliary table a `.spl` file can carry. The struct is built by
//! `binary::read_spell_file` and never partially visible: the reader
//! assembles it privately and hands it over complete, so lookup code can
//! trust invariants like "REP first-byte table matches the entry list".
//!
//! # Invariants (the stuff that breaks if you ignore it)
//!
//! - fold and keep tries describe the same word set modulo case; keep is
//!   usually tiny.
//! - `prefcond` is indexed by the condition numbers inside the prefix
//!   trie; the tree reader bounds-checks them against this table.
//! - `sound` is SAL or SOFO, never both (the reader rejects files with
//!   both sections).
//! - every compound flag byte used by a word appears in `start_flags` or
//!   `all_flags` of the compound info.

use std::collections::HashMap;

use crate::phonetic::SoundFolding;
use crate::regexp::Program;
use crate::trie::TrieStore;
use crate::types::MAXWLEN;
use crate::util::{CaseFolder, CharTable};

/// Occurrence-count cap for the common-word table.
pub const WORDCOUNT_MAX: u16 = 0xFFFF;

// ============================================================================
// REP / REPSAL
// ============================================================================

/// One REP(SAL) pair: a common misspelling and its fix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepEntry {
    pub from: Vec<u8>,
    pub to: Vec<u8>,
}

/// Ordered REP list with a 256-entry first-byte acceleration table.
#[derive(Debug, Clone)]
pub struct RepTable {
    entries: Vec<RepEntry>,
    first: [i16; 256],
}

impl Default for RepTable {
    fn default() -> Self {
        RepTable {
            entries: Vec::new(),
            first: [-1; 256],
        }
    }
}

impl RepTable {
    pub fn new(entries: Vec<RepEntry>) -> RepTable {
        let mut first = [-1i16; 256];
        for (i, e) in entries.iter().enumerate() {
            if let Some(&b) = e.from.first() {
                if first[b as usize] < 0 {
                    first[b as usize] = i as i16;
                }
            }
        }
        RepTable { entries, first }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RepEntry] {
        &self.entries
    }

    /// Index of the first entry whose `from` starts with `b`.
    pub fn first_for_byte(&self, b: u8) -> Option<usize> {
        let i = self.first[b as usize];
        if i < 0 {
            None
        } else {
            Some(i as usize)
        }
    }

    /// Entries whose `from` starts with `b`, in file order. The list is
    /// grouped by first byte, so a linear scan from `first[b]` suffices.
    pub fn starting_with(&self, b: u8) -> &[RepEntry] {
        let start = self.first[b as usize];
        if start < 0 {
            return &[];
        }
        let start = start as usize;
        let end = self.entries[start..]
            .iter()
            .position(|e| e.from.first() != Some(&b))
            .map_or(self.entries.len(), |n| start + n);
        &self.entries[start..end]
    }
}

// ============================================================================
// MAP (similar characters)
// ============================================================================

/// Character similarity groups from the MAP section: characters in one
/// group substitute for each other at reduced cost during suggesting.
#[derive(Debug, Clone)]
pub struct SimilarMap {
    /// Raw slash-separated groups for the writer.
    pub raw: String,
    head_low: [u32; 256],
    head_wide: HashMap<char, char>,
}

impl Default for SimilarMap {
    fn default() -> Self {
        SimilarMap {
            raw: String::new(),
            head_low: [0; 256],
            head_wide: HashMap::new(),
        }
    }
}

impl SimilarMap {
    pub fn from_map_str(raw: &str) -> SimilarMap {
        let mut map = SimilarMap {
            raw: raw.to_string(),
            head_low: [0; 256],
            head_wide: HashMap::new(),
        };
        let mut head: Option<char> = None;
        for c in raw.chars() {
            if c == '/' {
                head = None;
                continue;
            }
            let h = *head.get_or_insert(c);
            let cp = c as u32;
            if cp < 256 {
                map.head_low[cp as usize] = h as u32;
            } else {
                map.head_wide.insert(c, h);
            }
        }
        map
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    fn head(&self, c: char) -> u32 {
        let cp = c as u32;
        if cp < 256 {
            self.head_low[cp as usize]
        } else {
            self.head_wide.get(&c).map_or(0, |&h| h as u32)
        }
    }

    /// True when both characters sit in the same MAP group.
    pub fn similar(&self, a: char, b: char) -> bool {
        if a == b {
            return false;
        }
        let ha = self.head(a);
        ha != 0 && ha == self.head(b)
    }
}

// ============================================================================
// COMPOUNDING
// ============================================================================

/// A 256-slot membership set for compound flag bytes.
#[derive(Debug, Clone)]
pub struct ByteSet {
    bits: [bool; 256],
}

impl Default for ByteSet {
    fn default() -> Self {
        ByteSet {
            bits: [false; 256],
        }
    }
}

impl ByteSet {
    pub fn insert(&mut self, b: u8) {
        self.bits[b as usize] = true;
    }

    pub fn contains(&self, b: u8) -> bool {
        self.bits[b as usize]
    }

    pub fn is_empty(&self) -> bool {
        !self.bits.iter().any(|&b| b)
    }
}

/// Compound state of a language, from the COMPOUND section.
#[derive(Debug, Clone)]
pub struct CompoundInfo {
    /// Maximum number of words in a compound (COMPOUNDWORDMAX).
    pub max_words: usize,
    /// Minimum byte length of each compound segment.
    pub min_len: usize,
    /// Maximum syllable count; `MAXWLEN` means unlimited.
    pub syl_max: usize,
    /// COMP_CHECK_* bits.
    pub options: u8,
    /// CHECKCOMPOUNDPATTERN strings, flattened `[end, begin, ...]` pairs.
    pub patterns: Vec<Vec<u8>>,
    /// Raw rule string, slash-separated, as stored in the file.
    pub flags_raw: Vec<u8>,
    /// Rule string without wildcards for early pruning; absent when any
    /// rule uses `? * +`.
    pub rules_plain: Option<Vec<u8>>,
    /// Anchored rule matcher over flag bytes.
    pub program: Option<Program>,
    /// Flags that may start a compound.
    pub start_flags: ByteSet,
    /// Flags valid at any position.
    pub all_flags: ByteSet,
}

impl CompoundInfo {
    /// Derive the flag sets, plain-rule copy and matcher program from the
    /// raw rule string.
    pub fn from_raw(
        max_words: usize,
        min_len: usize,
        syl_max: usize,
        options: u8,
        patterns: Vec<Vec<u8>>,
        flags_raw: Vec<u8>,
    ) -> CompoundInfo {
        let mut start_flags = ByteSet::default();
        let mut all_flags = ByteSet::default();
        let mut rules_plain: Option<Vec<u8>> = Some(Vec::new());
        let mut at_start = 1u8;
        for &c in &flags_raw {
            if !b"?*+[]/".contains(&c) {
                all_flags.insert(c);
            }
            if at_start != 0 {
                if c == b'[' {
                    at_start = 2;
                } else if c == b']' {
                    at_start = 0;
                } else {
                    start_flags.insert(c);
                    if at_start == 1 {
                        at_start = 0;
                    }
                }
            }
            if let Some(plain) = &mut rules_plain {
                if c == b'?' || c == b'+' || c == b'*' {
                    rules_plain = None;
                } else {
                    plain.push(c);
                }
            }
            if c == b'/' {
                at_start = 1;
            }
        }

        // "(rule1|rule2)" over the flag bytes; the program is anchored by
        // construction.
        let pattern: String = {
            let body: String = flags_raw
                .iter()
                .map(|&b| if b == b'/' { '|' } else { b as char })
                .collect();
            format!("({})", body)
        };
        let program = Program::compile(&pattern).ok();

        CompoundInfo {
            max_words,
            min_len,
            syl_max,
            options,
            patterns,
            flags_raw,
            rules_plain,
            program,
            start_flags,
            all_flags,
        }
    }
}

// ============================================================================
// SYLLABLES
// ============================================================================

/// SYLLABLE directive: a char set plus longer multi-char items.
#[derive(Debug, Clone, Default)]
pub struct SylTable {
    /// Raw string for the writer.
    pub raw: String,
    /// Single syllable characters (the part before the first slash).
    chars: Vec<char>,
    /// Longer items, matched longest-first.
    items: Vec<String>,
}

impl SylTable {
    pub fn from_raw(raw: &str) -> SylTable {
        let mut parts = raw.split('/');
        let chars = parts.next().unwrap_or("").chars().collect();
        let items = parts
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        SylTable {
            raw: raw.to_string(),
            chars,
            items,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Count syllables: longest item match wins, otherwise a char from
    /// the set opens a syllable unless we are already inside one.
    pub fn count(&self, word: &str) -> usize {
        let chars: Vec<char> = word.chars().collect();
        let mut cnt = 0usize;
        let mut skip = false;
        let mut i = 0usize;
        while i < chars.len() {
            if chars[i] == ' ' {
                cnt = 0;
                i += 1;
                continue;
            }
            let mut len = 0usize;
            for item in &self.items {
                let ic: Vec<char> = item.chars().collect();
                if ic.len() > len && chars[i..].starts_with(&ic) {
                    len = ic.len();
                }
            }
            if len != 0 {
                cnt += 1;
                skip = false;
                i += len;
            } else {
                let c = chars[i];
                if !self.chars.contains(&c) {
                    skip = false;
                } else if !skip {
                    cnt += 1;
                    skip = true;
                }
                i += 1;
            }
        }
        cnt
    }
}

// ============================================================================
// PREFIX CONDITIONS
// ============================================================================

/// One compiled prefix condition. `prog == None` always matches (either
/// the entry had no condition, or it failed to compile and is ignored).
#[derive(Debug, Clone, Default)]
pub struct PrefCond {
    pub raw: Vec<u8>,
    pub prog: Option<Program>,
}

impl PrefCond {
    pub fn from_raw(raw: Vec<u8>) -> PrefCond {
        let prog = if raw.is_empty() {
            None
        } else {
            std::str::from_utf8(&raw)
                .ok()
                .and_then(|s| Program::compile(s).ok())
        };
        PrefCond { raw, prog }
    }

    /// Does the condition accept `word` (the part after the prefix)?
    pub fn matches(&self, word: &[char]) -> bool {
        match &self.prog {
            Some(p) => p.matches_prefix(word),
            None => true,
        }
    }
}

// ============================================================================
// LANGUAGE
// ============================================================================

/// One loaded dictionary with all its tables.
#[derive(Default)]
pub struct Language {
    pub name: String,
    pub path: String,
    /// Loaded from a `.add` file: words the user collected.
    pub is_addition: bool,
    pub info: String,

    pub fold: TrieStore,
    pub keep: TrieStore,
    pub prefix: TrieStore,
    /// Number of postponed prefix IDs in use.
    pub prefix_count: usize,
    pub prefcond: Vec<PrefCond>,

    /// Region names in file order; position = region bit.
    pub regions: Vec<String>,
    /// Active region bits for checking; 0xFF accepts every region.
    pub region_mask: u8,

    pub midword: String,
    pub has_charflags: bool,
    pub char_table: CharTable,

    pub rep: RepTable,
    pub repsal: RepTable,
    pub sound: SoundFolding,
    pub map: SimilarMap,

    pub compound: Option<CompoundInfo>,
    pub syllable: SylTable,
    pub nobreak: bool,
    pub no_split_sugs: bool,

    /// Timestamp of the companion `.sug` file, 0 when none was written.
    pub sug_time: u64,
    pub sug: crate::binary::sug::SugState,

    /// word -> capped occurrence count, seeded from the WORDS section.
    pub word_count: HashMap<String, u16>,
    /// WORDS entries in file order, for the writer.
    pub common_order: Vec<String>,
}

impl Language {
    pub fn new(name: &str, path: &str) -> Language {
        Language {
            name: name.to_string(),
            path: path.to_string(),
            region_mask: 0xFF,
            ..Language::default()
        }
    }

    /// Drop all interior state but keep identity, for reload: aliases to
    /// this Language stay valid and see an empty dictionary until the
    /// re-read finishes.
    pub fn clear(&mut self) {
        let name = std::mem::take(&mut self.name);
        let path = std::mem::take(&mut self.path);
        let is_addition = self.is_addition;
        let region_mask = self.region_mask;
        *self = Language::new(&name, &path);
        self.is_addition = is_addition;
        self.region_mask = region_mask;
    }

    pub fn case_folder(&self) -> CaseFolder<'_> {
        CaseFolder::new(&self.char_table)
    }

    /// A MIDWORD character is a word char only between two word chars.
    pub fn is_midword_char(&self, c: char) -> bool {
        self.midword.contains(c)
    }

    /// Sound-fold a (case-folded) word; `None` when this language has no
    /// sound folding.
    pub fn sound_fold(&self, word: &str) -> Option<String> {
        if self.sound.is_none() {
            return None;
        }
        Some(self.sound.fold(word, &self.char_table))
    }

    /// Raise the occurrence count of a common word, capped.
    pub fn count_common_word(&mut self, word: &str, count: u16) {
        let folded = match self.case_folder().fold(word, MAXWLEN) {
            Some(f) => f,
            None => return,
        };
        let entry = self.word_count.entry(folded.clone()).or_insert(0);
        if *entry == 0 {
            self.common_order.push(folded);
        }
        *entry = entry.saturating_add(count).min(WORDCOUNT_MAX);
    }

    /// True when this language can see region `mask` (a word's region
    /// byte) from its active regions.
    pub fn region_visible(&self, word_region: u8) -> bool {
        word_region & self.region_mask != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rep_table_first_byte_groups() {
        let t = RepTable::new(vec![
            RepEntry {
                from: b"tion".to_vec(),
                to: b"sion".to_vec(),
            },
            RepEntry {
                from: b"ture".to_vec(),
                to: b"tuer".to_vec(),
            },
            RepEntry {
                from: b"ph".to_vec(),
                to: b"f".to_vec(),
            },
        ]);
        assert_eq!(t.starting_with(b't').len(), 2);
        assert_eq!(t.starting_with(b'p').len(), 1);
        assert!(t.starting_with(b'x').is_empty());
    }

    #[test]
    fn similar_map_groups() {
        let m = SimilarMap::from_map_str("aàá/eèé");
        assert!(m.similar('a', 'à'));
        assert!(m.similar('è', 'é'));
        assert!(!m.similar('a', 'e'));
        assert!(!m.similar('a', 'a'));
        assert!(!m.similar('x', 'y'));
    }

    #[test]
    fn compound_flag_sets() {
        let c = CompoundInfo::from_raw(3, 1, MAXWLEN, 0, vec![], b"sm*e/f+".to_vec());
        assert!(c.start_flags.contains(b's'));
        assert!(c.start_flags.contains(b'f'));
        assert!(!c.start_flags.contains(b'm'));
        assert!(c.all_flags.contains(b'm'));
        assert!(c.all_flags.contains(b'e'));
        // Wildcards kill the plain-rule copy.
        assert!(c.rules_plain.is_none());
        let prog = c.program.as_ref().unwrap();
        assert!(prog.matches(&['s', 'm', 'm', 'e']));
        assert!(prog.matches(&['f', 'f']));
        assert!(!prog.matches(&['m', 'e']));
    }

    #[test]
    fn compound_rule_class_start_flags() {
        let c = CompoundInfo::from_raw(3, 1, MAXWLEN, 0, vec![], b"[ab]c".to_vec());
        assert!(c.start_flags.contains(b'a'));
        assert!(c.start_flags.contains(b'b'));
        assert!(!c.start_flags.contains(b'c'));
        assert!(c.rules_plain.is_some());
    }

    #[test]
    fn syllable_counting() {
        let t = SylTable::from_raw("aeiou/oo/ea");
        assert_eq!(t.count("ball"), 1);
        assert_eq!(t.count("football"), 2);
        // "oa" run counts once, "ea" once via the item.
        assert_eq!(t.count("oatmeal"), 2);
    }

    #[test]
    fn common_word_counting_caps() {
        let mut lang = Language::new("en", "en.spl");
        lang.count_common_word("The", 10);
        lang.count_common_word("the", WORDCOUNT_MAX);
        assert_eq!(lang.word_count.get("the").copied(), Some(WORDCOUNT_MAX));
        assert_eq!(lang.common_order.len(), 1);
    }

    #[test]
    fn clear_keeps_identity() {
        let mut lang = Language::new("en", "/dict/en.spl");
        lang.nobreak = true;
        lang.regions = vec!["us".into(), "gb".into()];
        lang.clear();
        assert_eq!(lang.name, "en");
        assert_eq!(lang.path, "/dict/en.spl");
        assert!(!lang.nobreak);
        assert!(lang.regions.is_empty());
    }
}
