// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The word matcher: classify the text at a position as a known word,
//! a regional/rare variant, a forbidden word, or a misspelling.
//!
//! `check_word` drives the steps of one classification:
//!
//! 1. skip blanks/controls and bare numbers (`0x1F` hex included);
//! 2. find the word span using the language word-char table with the
//!    MIDWORD refinement;
//! 3. case-fold the span (plus following text, so dictionary entries
//!    containing non-word characters and space runs can match);
//! 4. walk the fold-case tree, the keep-case tree and the prefix tree of
//!    every language, keeping the longest best-class match;
//! 5. for compound-capable languages, recursively match the remainder
//!    and validate the collected flag sequence;
//! 6. for NOBREAK languages, fall back to the longest match that lacked
//!    a following word.
//!
//! The matcher never errors: a structurally broken tree simply stops
//! matching and the word comes back bad.

pub mod compound;

use crate::lang::Language;
use crate::trie::TrieStore;
use crate::types::{
    CaseType, CheckedWord, PrefixMeta, SpellResult, MAXWLEN, WF_ALLCAP, WF_BANNED, WF_FIXCAP,
    WF_HAS_AFF, WF_KEEPCAP, WF_NEEDCOMP, WF_NOCOMPAFT, WF_NOCOMPBEF, WF_ONECAP, WF_RARE,
    WF_RAREPFX, WF_REGION, WF_PFX_NC,
};
use crate::util::{CaseFolder, CharTable};

/// Which tree and which entry rules apply during one `find_word` walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Fold-case tree, initial word.
    FoldWord,
    /// Keep-case tree, initial word.
    KeepWord,
    /// Fold-case tree behind a matched postponed prefix.
    Prefix,
    /// Fold-case tree for a following compound segment.
    Compound,
    /// Keep-case tree for a following compound segment.
    KeepCompound,
}

impl Mode {
    fn keeps_case(self) -> bool {
        matches!(self, Mode::KeepWord | Mode::KeepCompound)
    }

    fn is_compound(self) -> bool {
        matches!(self, Mode::Compound | Mode::KeepCompound)
    }
}

/// Immutable per-call input: the text and its folded shadow.
struct WordInput<'a> {
    /// Original text, starting at the word.
    word: &'a str,
    /// Byte offset of the first non-word character.
    word_end: usize,
    /// Case-folded text (word plus following text), capped near MAXWLEN.
    fword: String,
    /// Char boundaries as (fold_offset, orig_offset) pairs, with a final
    /// sentinel entry.
    bounds: Vec<(usize, usize)>,
}

impl WordInput<'_> {
    /// Map a fold-buffer byte length to the original byte length.
    fn fold_to_orig(&self, flen: usize) -> usize {
        if self.word.as_bytes().get(..flen) == self.fword.as_bytes().get(..flen) {
            return flen;
        }
        match self.bounds.binary_search_by_key(&flen, |&(f, _)| f) {
            Ok(i) => self.bounds[i].1,
            Err(i) => self.bounds[i.saturating_sub(1)].1,
        }
    }

    /// Map an original byte length to the fold-buffer byte length.
    fn orig_to_fold(&self, olen: usize) -> usize {
        if self.word.as_bytes().get(..olen) == self.fword.as_bytes().get(..olen) {
            return olen;
        }
        match self.bounds.binary_search_by_key(&olen, |&(_, o)| o) {
            Ok(i) => self.bounds[i].0,
            Err(i) => self.bounds[i.saturating_sub(1)].0,
        }
    }
}

/// Mutable state threaded through the recursive walks.
struct MatchState {
    result: SpellResult,
    /// Longest acceptable match, bytes of original text.
    end: usize,
    /// NOBREAK fallback: best match without a following word.
    result2: SpellResult,
    end2: usize,
    /// Compound flag per completed segment; `complen` counts them.
    compflags: Vec<u8>,
    complen: usize,
    /// COMPROOT words in the current chain.
    compextra: usize,
    /// Offset of the current segment (fold bytes for `Compound`,
    /// original bytes for `KeepCompound`).
    compoff: usize,
    /// Prefix trie NUL-run location for `Mode::Prefix`.
    prefarridx: usize,
    prefcnt: usize,
    /// Fold-byte and original-byte length of the matched prefix.
    prefixlen: usize,
    cprefixlen: usize,
}

impl MatchState {
    fn new() -> MatchState {
        MatchState {
            result: SpellResult::Bad,
            end: 0,
            result2: SpellResult::Bad,
            end2: 0,
            compflags: vec![0; MAXWLEN + 2],
            complen: 0,
            compextra: 0,
            compoff: 0,
            prefarridx: 0,
            prefcnt: 0,
            prefixlen: 0,
            cprefixlen: 0,
        }
    }
}

/// Word classification over an ordered set of active languages.
pub struct Matcher<'a> {
    langs: &'a [&'a Language],
    table: &'a CharTable,
    /// Union of the languages' MIDWORD characters.
    midword: String,
}

impl<'a> Matcher<'a> {
    pub fn new(langs: &'a [&'a Language], table: &'a CharTable) -> Matcher<'a> {
        let mut midword = String::new();
        for lang in langs {
            for c in lang.midword.chars() {
                if !midword.contains(c) {
                    midword.push(c);
                }
            }
        }
        Matcher {
            langs,
            table,
            midword,
        }
    }

    /// Is the char at byte `at` of `text` a word character, applying the
    /// MIDWORD rule (a midword char counts only between word chars)?
    fn is_word_at(&self, text: &str, at: usize) -> bool {
        let Some(c) = char_at(text, at) else {
            return false;
        };
        if self.table.is_word_char(c) {
            return true;
        }
        if self.midword.contains(c) && at > 0 {
            let next = at + c.len_utf8();
            return char_at(text, next).is_some_and(|n| self.table.is_word_char(n));
        }
        false
    }

    fn case_type_of(&self, span: &str) -> CaseType {
        CaseFolder::new(self.table).case_type(span)
    }

    /// Classify the word starting at the beginning of `text`. When
    /// `cap_expected` is set (start of a sentence), a valid word that
    /// starts lower-case reports `cap_error`.
    pub fn check_word(&self, text: &str, cap_expected: bool) -> CheckedWord {
        let bytes = text.as_bytes();
        let Some(&b0) = bytes.first() else {
            return CheckedWord::good(0);
        };
        // A word never starts at a blank or control character.
        if b0 <= b' ' {
            return CheckedWord::good(1);
        }
        if self.langs.is_empty() {
            return CheckedWord::good(char_at(text, 0).map_or(1, char::len_utf8));
        }

        // Numbers are always OK, including 0x1F and 0b101 forms; checking
        // continues anyway so "3GPP" can match as a word.
        let mut nrlen = 0usize;
        if b0.is_ascii_digit() {
            let mut i = 1;
            if b0 == b'0' && matches!(bytes.get(1), Some(b'x') | Some(b'X')) {
                i = 2;
                while bytes.get(i).is_some_and(u8::is_ascii_hexdigit) {
                    i += 1;
                }
            } else if b0 == b'0' && matches!(bytes.get(1), Some(b'b') | Some(b'B')) {
                i = 2;
                while matches!(bytes.get(i), Some(b'0') | Some(b'1')) {
                    i += 1;
                }
            } else {
                while bytes.get(i).is_some_and(u8::is_ascii_digit) {
                    i += 1;
                }
            }
            nrlen = i;
        }

        // The normal end of the word: first non-word character.
        let mut word_end = 0usize;
        if self.is_word_at(text, 0) {
            loop {
                word_end += char_at(text, word_end).map_or(1, char::len_utf8);
                if word_end >= text.len() || !self.is_word_at(text, word_end) {
                    break;
                }
            }
        }

        if word_end > MAXWLEN {
            // Cannot be case-folded into the fixed buffer; bad without a
            // trie walk.
            return CheckedWord {
                result: SpellResult::Bad,
                len: word_end,
                cap_error: false,
            };
        }

        // Case-fold the word plus the following text so entries with
        // embedded non-word characters and space runs can match.
        let mut fword = String::new();
        let mut bounds: Vec<(usize, usize)> = Vec::new();
        let mut orig_off = 0usize;
        for c in text.chars() {
            if fword.len() >= MAXWLEN {
                break;
            }
            bounds.push((fword.len(), orig_off));
            fword.push(self.table.fold_char(c));
            orig_off += c.len_utf8();
        }
        bounds.push((fword.len(), orig_off));

        let input = WordInput {
            word: text,
            word_end,
            fword,
            bounds,
        };
        let mut st = MatchState::new();
        st.end = word_end;

        for lang in self.langs {
            if lang.fold.is_empty() && lang.keep.is_empty() {
                // Cleared during reload; treat as no match.
                continue;
            }
            self.find_word(&input, &mut st, lang, Mode::FoldWord);
            self.find_word(&input, &mut st, lang, Mode::KeepWord);
            self.find_prefix(&input, &mut st, lang);

            if lang.nobreak && st.result == SpellResult::Bad && st.result2 != SpellResult::Bad {
                st.result = st.result2;
                st.end = st.end2;
            }
        }

        if st.result != SpellResult::Good {
            if nrlen > 0
                && matches!(st.result, SpellResult::Bad | SpellResult::Banned)
            {
                return CheckedWord::good(nrlen);
            }
            if char_at(text, 0).is_some_and(|c| !self.table.is_word_char(c)) {
                // Not at a word at all; skip one character.
                return CheckedWord::good(char_at(text, 0).map_or(1, char::len_utf8));
            }
            if st.end == 0 {
                st.end = char_at(text, 0).map_or(1, char::len_utf8);
            } else if st.result == SpellResult::Bad
                && self.langs.first().is_some_and(|l| l.nobreak)
            {
                // For a NOBREAK language report only up to the position
                // where some word starts to match.
                self.nobreak_refine(&input, &mut st);
            }
            return CheckedWord {
                result: st.result,
                len: st.end,
                cap_error: false,
            };
        }

        let cap_error = cap_expected
            && word_end > 0
            && char_at(text, 0).is_some_and(|c| !self.table.is_upper_char(c));
        CheckedWord {
            result: SpellResult::Good,
            len: st.end,
            cap_error,
        }
    }

    /// NOBREAK: shorten the reported bad range to the first position at
    /// which any word would be valid.
    fn nobreak_refine(&self, input: &WordInput<'_>, st: &mut MatchState) {
        let Some(lang) = self.langs.first() else {
            return;
        };
        if lang.fold.is_empty() {
            return;
        }
        let mut opos = 0usize;
        loop {
            opos += char_at(input.word, opos).map_or(1, char::len_utf8);
            if opos >= st.end {
                break;
            }
            st.compoff = input.orig_to_fold(opos);
            self.find_word(input, st, lang, Mode::Compound);
            if st.result != SpellResult::Bad {
                st.result = SpellResult::Bad;
                st.end = opos;
                break;
            }
        }
    }

    /// One walk of one tree. The mode selects the tree, the starting
    /// offset and which flag checks apply at candidate word ends.
    fn find_word(&self, input: &WordInput<'_>, st: &mut MatchState, lang: &Language, mode: Mode) {
        let store: &TrieStore = if mode.keeps_case() { &lang.keep } else { &lang.fold };
        if store.is_empty() {
            return;
        }
        let byts = store.byts();
        let idxs = store.idxs();

        let ptr: &[u8] = if mode.keeps_case() {
            input.word.as_bytes()
        } else {
            input.fword.as_bytes()
        };
        let mut wlen = match mode {
            Mode::Prefix => st.prefixlen,
            Mode::Compound => st.compoff,
            Mode::KeepCompound => st.compoff,
            _ => 0,
        };
        // For the fold tree only the folded buffer may be read.
        let avail = if mode.keeps_case() {
            input.word.len()
        } else {
            input.fword.len()
        };

        let mut arridx = 0usize;
        let mut endlen: Vec<usize> = Vec::new();
        let mut endidx: Vec<usize> = Vec::new();

        // Descend, remembering every depth where a word may end.
        loop {
            let Some(&raw_len) = byts.get(arridx) else {
                return;
            };
            arridx += 1;
            let mut len = raw_len as usize;

            if byts.get(arridx) == Some(&0) {
                if endlen.len() >= MAXWLEN {
                    // Corrupted file: a cycle of candidate ends.
                    return;
                }
                endlen.push(wlen);
                endidx.push(arridx);
                arridx += 1;
                len -= 1;
                while len > 0 && byts.get(arridx) == Some(&0) {
                    arridx += 1;
                    len -= 1;
                }
                if len == 0 {
                    break;
                }
            }

            if wlen >= avail {
                break;
            }
            let mut c = ptr[wlen];
            if c == b'\t' {
                c = b' ';
            }
            // Binary search the sibling bytes.
            let sibs = match byts.get(arridx..arridx + len) {
                Some(s) => s,
                None => return,
            };
            let Ok(found) = sibs.binary_search(&c) else {
                break;
            };
            let Some(&child) = idxs.get(arridx + found) else {
                return;
            };
            arridx = child as usize;
            wlen += 1;

            // One space in the dictionary word matches a run of spaces
            // and tabs in the text.
            if c == b' ' {
                while wlen < avail && (ptr[wlen] == b' ' || ptr[wlen] == b'\t') {
                    wlen += 1;
                }
            }
        }

        // Try the candidate ends, longest first.
        while let (Some(mut wlen), Some(arr)) = (endlen.pop(), endidx.pop()) {
            let text_for_ptr: &str = if mode.keeps_case() { input.word } else { &input.fword };
            if !text_for_ptr.is_char_boundary(wlen) {
                continue;
            }

            // Does a word character follow? Then this can only be part of
            // a compound, which needs compound support or NOBREAK.
            let word_ends = if self.is_word_at(text_for_ptr, wlen) {
                if lang.compound.is_none() && !lang.nobreak {
                    continue;
                }
                false
            } else {
                true
            };
            let mut prefix_found = false;

            // endlen/arr positions are in ptr-space; wlen becomes the
            // length in the original text.
            let fold_len_seg = wlen;
            if !mode.keeps_case() {
                wlen = input.fold_to_orig(wlen);
            }

            let count = match byts.get(arr.checked_sub(1).unwrap_or(0)).copied() {
                Some(c) => c as usize,
                None => continue,
            };
            let mut res = SpellResult::Bad;
            let mut idx = arr;
            let mut remaining = count;
            while remaining > 0 && byts.get(idx) == Some(&0) {
                let mut flags = match idxs.get(idx) {
                    Some(&f) => f,
                    None => break,
                };
                idx += 1;
                remaining -= 1;

                // Case requirements only apply in the fold tree for the
                // initial word; keep-case entries are matched literally
                // and prefixes don't carry case.
                if mode == Mode::FoldWord {
                    let cap = self.case_type_of(&input.word[..wlen.min(input.word.len())]);
                    if cap == CaseType::KeepCap || !valid_case(cap, flags) {
                        continue;
                    }
                }

                if mode == Mode::Prefix && !prefix_found {
                    let pidx = self.valid_word_prefix(
                        st,
                        lang,
                        flags,
                        &input.word[st.cprefixlen.min(input.word.len())..],
                        false,
                    );
                    let Some(pidx) = pidx else {
                        continue;
                    };
                    if pidx & WF_RAREPFX != 0 {
                        flags |= WF_RARE;
                    }
                    prefix_found = true;
                }

                let mut nobreak_result = SpellResult::Good;

                if lang.nobreak {
                    if mode.is_compound() && flags & WF_BANNED == 0 {
                        // NOBREAK: a valid following word is all we need.
                        st.result = SpellResult::Good;
                        break;
                    }
                } else if mode.is_compound() || !word_ends {
                    let comp = match &lang.compound {
                        Some(c) => c,
                        None => continue,
                    };
                    let compflag = (flags >> 24) as u8;
                    let seg_olen = wlen.saturating_sub(if mode == Mode::KeepCompound {
                        st.compoff
                    } else {
                        input.fold_to_orig(st.compoff)
                    });
                    let seg_start = wlen - seg_olen;
                    if compflag == 0 || seg_olen < comp.min_len {
                        continue;
                    }
                    if comp.min_len > 0
                        && input.word[seg_start..wlen.min(input.word.len())]
                            .chars()
                            .count()
                            < comp.min_len
                    {
                        continue;
                    }
                    // Limit the word count when no syllable limit exists.
                    if !word_ends
                        && st.complen + st.compextra + 2 > comp.max_words
                        && comp.syl_max >= MAXWLEN
                    {
                        continue;
                    }
                    // Affix sides must allow compounding.
                    if st.complen > 0 && flags & WF_NOCOMPBEF != 0 {
                        continue;
                    }
                    if !word_ends && flags & WF_NOCOMPAFT != 0 {
                        continue;
                    }
                    let set = if st.complen == 0 {
                        &comp.start_flags
                    } else {
                        &comp.all_flags
                    };
                    if !set.contains(compflag) {
                        continue;
                    }
                    if compound::match_checkcompoundpattern(lang, ptr, fold_len_seg) {
                        continue;
                    }

                    if mode == Mode::Compound {
                        // Case type of the appended segment.
                        let p = input.fold_to_orig(st.compoff);
                        let seg_start = p.min(input.word.len());
                        let cap = self
                            .case_type_of(&input.word[seg_start..wlen.min(input.word.len())]);
                        if cap == CaseType::KeepCap
                            || (cap == CaseType::AllCap && flags & WF_FIXCAP != 0)
                        {
                            continue;
                        }
                        if cap != CaseType::AllCap {
                            // Directly after a word char a Onecap segment
                            // is wrong; after a non-word char the entry's
                            // own ONECAP requirement applies.
                            let prev_is_word = seg_start > 0 && {
                                let mut q = seg_start - 1;
                                while q > 0 && !input.word.is_char_boundary(q) {
                                    q -= 1;
                                }
                                char_at(input.word, q)
                                    .is_some_and(|c| self.table.is_word_char(c))
                            };
                            if prev_is_word {
                                if cap == CaseType::OneCap {
                                    continue;
                                }
                            } else if flags & WF_ONECAP != 0 && cap != CaseType::OneCap {
                                continue;
                            }
                        }
                    }

                    st.compflags[st.complen] = compflag;
                    if word_ends {
                        let fword_seg: String = if mode.keeps_case() {
                            CaseFolder::new(self.table)
                                .fold(&input.word[..wlen.min(input.word.len())], MAXWLEN)
                                .unwrap_or_default()
                        } else {
                            input.fword[..fold_len_seg].to_string()
                        };
                        let flags_so_far = st.compflags[..st.complen + 1].to_vec();
                        if !compound::can_compound(lang, &fword_seg, &flags_so_far) {
                            continue;
                        }
                    } else {
                        let flags_so_far = st.compflags[..st.complen + 1].to_vec();
                        if !compound::match_compoundrule(lang, &flags_so_far) {
                            continue;
                        }
                    }
                } else if flags & WF_NEEDCOMP != 0 {
                    continue;
                }

                if !word_ends {
                    let save = (st.result, st.end, st.compoff);

                    if lang.nobreak {
                        st.result = SpellResult::Bad;
                    }
                    // The continuation starts where this segment ended.
                    let mut fold_compoff = fold_len_seg;
                    if mode.keeps_case() {
                        fold_compoff = input.orig_to_fold(wlen);
                    }
                    st.compoff = fold_compoff;
                    st.complen += 1;
                    if flags & crate::types::WF_COMPROOT != 0 {
                        st.compextra += 1;
                    }

                    for next_lang in self.langs {
                        if lang.nobreak {
                            if next_lang.fold.is_empty() || !next_lang.nobreak {
                                continue;
                            }
                        } else if !std::ptr::eq(*next_lang, lang) {
                            continue;
                        }
                        self.find_word(input, st, next_lang, Mode::Compound);

                        if !next_lang.nobreak || st.result == SpellResult::Bad {
                            // Keep-case continuation uses original bytes;
                            // restore the fold offset for the next round.
                            st.compoff = wlen;
                            self.find_word(input, st, next_lang, Mode::KeepCompound);
                            st.compoff = fold_compoff;
                        }
                        if !lang.nobreak {
                            break;
                        }
                    }
                    st.complen -= 1;
                    if flags & crate::types::WF_COMPROOT != 0 {
                        st.compextra -= 1;
                    }

                    if lang.nobreak {
                        nobreak_result = st.result;
                        st.result = save.0;
                        st.end = save.1;
                        st.compoff = save.2;
                    } else {
                        st.compoff = save.2;
                        if st.result == SpellResult::Good {
                            break;
                        }
                        continue;
                    }
                }

                res = if flags & WF_BANNED != 0 {
                    SpellResult::Banned
                } else if flags & WF_REGION != 0 {
                    if lang.region_visible(((flags >> 16) & 0xFF) as u8) {
                        SpellResult::Good
                    } else {
                        SpellResult::Local
                    }
                } else if flags & WF_RARE != 0 {
                    SpellResult::Rare
                } else {
                    SpellResult::Good
                };

                // Keep the longest match with the best class. For NOBREAK
                // the variant without a following word goes to the
                // fallback slots.
                if nobreak_result == SpellResult::Bad {
                    if st.result2 > res {
                        st.result2 = res;
                        st.end2 = wlen;
                    } else if st.result2 == res && st.end2 < wlen {
                        st.end2 = wlen;
                    }
                } else if st.result > res {
                    st.result = res;
                    st.end = wlen;
                } else if st.result == res && st.end < wlen {
                    st.end = wlen;
                }

                if st.result == SpellResult::Good {
                    break;
                }
            }
            if st.result == SpellResult::Good {
                break;
            }
        }
    }

    /// Walk the prefix tree; at every NUL run, try the main tree with
    /// the prefix metadata attached.
    fn find_prefix(&self, input: &WordInput<'_>, st: &mut MatchState, lang: &Language) {
        if lang.prefix.is_empty() {
            return;
        }
        let byts = lang.prefix.byts();
        let idxs = lang.prefix.idxs();
        let ptr = input.fword.as_bytes();
        let mut arridx = 0usize;
        let mut wlen = 0usize;

        loop {
            let Some(&raw_len) = byts.get(arridx) else {
                return;
            };
            arridx += 1;
            let mut len = raw_len as usize;

            if byts.get(arridx) == Some(&0) {
                st.prefarridx = arridx;
                st.prefcnt = len;
                while len > 0 && byts.get(arridx) == Some(&0) {
                    arridx += 1;
                    len -= 1;
                }
                st.prefcnt -= len;

                st.prefixlen = wlen;
                st.cprefixlen = input.fold_to_orig(wlen);
                self.find_word(input, st, lang, Mode::Prefix);

                if len == 0 {
                    break;
                }
            }

            if wlen >= ptr.len() {
                break;
            }
            let c = ptr[wlen];
            let sibs = match byts.get(arridx..arridx + len) {
                Some(s) => s,
                None => return,
            };
            let Ok(found) = sibs.binary_search(&c) else {
                break;
            };
            let Some(&child) = idxs.get(arridx + found) else {
                return;
            };
            arridx = child as usize;
            wlen += 1;
        }
    }

    /// Check the list of prefix entries collected by `find_prefix`
    /// against a word's affix ID, combining rule and condition. Returns
    /// the matching prefix-tree value.
    fn valid_word_prefix(
        &self,
        st: &MatchState,
        lang: &Language,
        word_flags: u32,
        word_tail: &str,
        cond_req: bool,
    ) -> Option<u32> {
        let idxs = lang.prefix.idxs();
        let prefid = (word_flags >> 24) as u8;
        let tail: Vec<char> = word_tail.chars().collect();
        for n in (0..st.prefcnt).rev() {
            let &pidx = idxs.get(st.prefarridx + n)?;
            let meta = PrefixMeta::decode(pidx);

            if prefid != meta.prefix_id {
                continue;
            }
            // A non-combining prefix is no use for a word with a suffix.
            if word_flags & WF_HAS_AFF != 0 && pidx & WF_PFX_NC != 0 {
                continue;
            }
            match lang.prefcond.get(meta.cond_index as usize) {
                Some(cond) if cond.prog.is_some() => {
                    if !cond.matches(&tail) {
                        continue;
                    }
                }
                _ => {
                    if cond_req {
                        continue;
                    }
                }
            }
            return Some(pidx);
        }
        None
    }
}

/// Does the case pattern of the checked word satisfy a word entry's
/// capital requirements? All-caps input matches anything except FIXCAP
/// entries; otherwise the entry must be free of ALLCAP/KEEPCAP and a
/// ONECAP entry needs one-cap input.
pub fn spell_valid_case(wordflags: u32, treeflags: u32) -> bool {
    (wordflags == WF_ALLCAP && treeflags & WF_FIXCAP == 0)
        || (treeflags & (WF_ALLCAP | WF_KEEPCAP) == 0
            && (treeflags & WF_ONECAP == 0 || wordflags & WF_ONECAP != 0))
}

fn valid_case(cap: CaseType, treeflags: u32) -> bool {
    spell_valid_case(cap.as_flags(), treeflags)
}

fn char_at(s: &str, at: usize) -> Option<char> {
    s.get(at..).and_then(|t| t.chars().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trie::TrieBuilder;
    use crate::types::WordMeta;

    fn fold_lang(words: &[(&str, u32)]) -> Language {
        let mut lang = Language::new("en", "en.spl");
        let mut b = TrieBuilder::new();
        for &(w, v) in words {
            b.insert(w.as_bytes(), v);
        }
        lang.fold = b.finish();
        lang
    }

    fn check(lang: &Language, text: &str) -> CheckedWord {
        let langs = [lang];
        let table = CharTable::default();
        Matcher::new(&langs, &table).check_word(text, false)
    }

    #[test]
    fn plain_word_lookup() {
        let lang = fold_lang(&[("the", 0), ("these", 0)]);
        assert_eq!(check(&lang, "the ").result, SpellResult::Good);
        assert_eq!(check(&lang, "the ").len, 3);
        assert_eq!(check(&lang, "these").result, SpellResult::Good);
        assert_eq!(check(&lang, "thes ").result, SpellResult::Bad);
        assert_eq!(check(&lang, "thes ").len, 4);
    }

    #[test]
    fn longest_match_wins() {
        let lang = fold_lang(&[("the", 0), ("these", 0)]);
        let r = check(&lang, "these");
        assert_eq!((r.result, r.len), (SpellResult::Good, 5));
    }

    #[test]
    fn blanks_and_numbers() {
        let lang = fold_lang(&[("the", 0)]);
        assert_eq!(check(&lang, " x"), CheckedWord::good(1));
        assert_eq!(check(&lang, "12345 "), CheckedWord::good(5));
        assert_eq!(check(&lang, "0xFF99 "), CheckedWord::good(6));
        assert_eq!(check(&lang, "0b101 "), CheckedWord::good(5));
    }

    #[test]
    fn number_followed_by_word_is_checked() {
        // "3GPP" style: the digits pass, the word part is still checked.
        let lang = fold_lang(&[("gpp", 0)]);
        let r = check(&lang, "3gpp ");
        assert_eq!(r.result, SpellResult::Good);
    }

    #[test]
    fn case_requirements() {
        let onecap = WordMeta {
            flags: WF_ONECAP,
            region: 0,
            affix_id: 0,
        }
        .encode();
        let lang = fold_lang(&[("london", onecap)]);
        assert_eq!(check(&lang, "London ").result, SpellResult::Good);
        assert_eq!(check(&lang, "london ").result, SpellResult::Bad);
        assert_eq!(check(&lang, "LONDON ").result, SpellResult::Good);
    }

    #[test]
    fn keepcase_words_only_match_exactly() {
        let keep = WordMeta {
            flags: WF_KEEPCAP,
            region: 0,
            affix_id: 0,
        }
        .encode();
        let mut lang = fold_lang(&[("nasa", keep)]);
        let mut kb = TrieBuilder::new();
        kb.insert(b"NASA", 0);
        lang.keep = kb.finish();
        assert_eq!(check(&lang, "NASA ").result, SpellResult::Good);
        assert_eq!(check(&lang, "nasa ").result, SpellResult::Bad);
        assert_eq!(check(&lang, "NaSa ").result, SpellResult::Bad);
    }

    #[test]
    fn banned_and_rare() {
        let banned = WordMeta {
            flags: WF_BANNED,
            region: 0,
            affix_id: 0,
        }
        .encode();
        let rare = WordMeta {
            flags: WF_RARE,
            region: 0,
            affix_id: 0,
        }
        .encode();
        let lang = fold_lang(&[("foo", banned), ("qua", rare)]);
        assert_eq!(check(&lang, "foo ").result, SpellResult::Banned);
        assert_eq!(check(&lang, "qua ").result, SpellResult::Rare);
    }

    #[test]
    fn regions() {
        // color in region 1 (us), colour in region 2 (gb).
        let us = WordMeta {
            flags: 0,
            region: 0x01,
            affix_id: 0,
        }
        .encode();
        let gb = WordMeta {
            flags: 0,
            region: 0x02,
            affix_id: 0,
        }
        .encode();
        let mut lang = fold_lang(&[("color", us), ("colour", gb)]);
        lang.regions = vec!["us".into(), "gb".into()];
        lang.region_mask = 0x02; // gb active
        assert_eq!(check(&lang, "color ").result, SpellResult::Local);
        assert_eq!(check(&lang, "colour ").result, SpellResult::Good);
    }

    #[test]
    fn midword_chars() {
        let mut lang = fold_lang(&[("o'clock", 0), ("o", 0), ("clock", 0)]);
        lang.midword = "'".into();
        let r = check(&lang, "o'clock ");
        assert_eq!((r.result, r.len), (SpellResult::Good, 7));
        // Without a following word char the quote ends the word.
        let r = check(&lang, "o' ");
        assert_eq!((r.result, r.len), (SpellResult::Good, 1));
    }

    #[test]
    fn needcomp_words_rejected_standalone() {
        let needcomp = WordMeta {
            flags: WF_NEEDCOMP,
            region: 0,
            affix_id: 0,
        }
        .encode();
        let lang = fold_lang(&[("ling", needcomp)]);
        assert_eq!(check(&lang, "ling ").result, SpellResult::Bad);
    }

    #[test]
    fn compound_two_words() {
        use crate::lang::CompoundInfo;
        let f = WordMeta {
            flags: 0,
            region: 0,
            affix_id: b'f',
        }
        .encode();
        let mut lang = fold_lang(&[("foot", f), ("ball", f)]);
        lang.compound = Some(CompoundInfo::from_raw(
            MAXWLEN,
            1,
            MAXWLEN,
            0,
            vec![],
            b"f+".to_vec(),
        ));
        let r = check(&lang, "football ");
        assert_eq!((r.result, r.len), (SpellResult::Good, 8));
        // Each part alone also matches (it has a compound-start flag and
        // ends as a word).
        assert_eq!(check(&lang, "foot ").result, SpellResult::Good);
    }

    #[test]
    fn compound_start_flag_is_positional() {
        use crate::lang::CompoundInfo;
        let s = WordMeta {
            flags: 0,
            region: 0,
            affix_id: b's',
        }
        .encode();
        let e = WordMeta {
            flags: 0,
            region: 0,
            affix_id: b'e',
        }
        .encode();
        let mut lang = fold_lang(&[("foot", s), ("ball", e)]);
        lang.compound = Some(CompoundInfo::from_raw(
            MAXWLEN,
            1,
            MAXWLEN,
            0,
            vec![],
            b"se".to_vec(),
        ));
        assert_eq!(check(&lang, "football ").result, SpellResult::Good);
        // Reversed order violates the rule "s then e".
        assert_eq!(check(&lang, "ballfoot ").result, SpellResult::Bad);
    }

    #[test]
    fn compound_min_length() {
        use crate::lang::CompoundInfo;
        let f = WordMeta {
            flags: 0,
            region: 0,
            affix_id: b'f',
        }
        .encode();
        let mut lang = fold_lang(&[("ab", f), ("cdef", f)]);
        lang.compound = Some(CompoundInfo::from_raw(
            MAXWLEN,
            3,
            MAXWLEN,
            0,
            vec![],
            b"f+".to_vec(),
        ));
        // "ab" is shorter than COMPOUNDMIN 3.
        assert_eq!(check(&lang, "abcdef ").result, SpellResult::Bad);
    }

    #[test]
    fn broken_store_is_just_bad() {
        let mut lang = fold_lang(&[("the", 0)]);
        // Corrupt the store: sibling count pointing past the end.
        let byts = vec![9u8, 0, 0];
        let idxs = vec![0u32, 0, 0];
        lang.fold = crate::trie::TrieStore::new(byts, idxs);
        assert_eq!(check(&lang, "the ").result, SpellResult::Bad);
    }
}
