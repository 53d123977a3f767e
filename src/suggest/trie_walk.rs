// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The backtracking walk that generates edit-based suggestions.
//!
//! One explicit stack of [`SearchFrame`]s drives a DFS over the
//! fold-case trie (or the soundfold trie). `tword` collects the good
//! word built from trie bytes; `fword` is the bad word, mutated in place
//! by swaps and REP replacements and restored by the UN* states on the
//! way back. Each frame runs a little state machine:
//!
//! ```text
//! START/NOPREFIX -> (word ends here? try suggestion/split/compound)
//!   ENDNUL -> PLAIN (accept/substitute byte, recurse per sibling)
//!     DEL -> INS_PREP -> INS -> SWAP -> UNSWAP -> SWAP3 -> UNSWAP3
//!       -> UNROT3L -> UNROT3R -> REP_INI -> REP <-> REP_UNDO -> FINAL
//! ```
//!
//! Every edit adds its cost; a branch is only entered while
//! `score + cost < maxscore`, which is what keeps the walk near-linear
//! in practice. Multi-byte characters are assembled byte by byte
//! (`tcharlen`/`tcharidx`/`isdiff`) so an edit is charged per character,
//! not per byte.

use super::{
    add_banned, add_sound_suggest, add_suggestion, badword_captype, case_score_penalty,
    find_keepcap_word, make_case_word, was_banned, SugInfo,
};
use crate::lang::{Language, PrefCond};
use crate::matcher::compound::{can_compound, match_checkcompoundpattern, match_compoundrule};
use crate::scoring::{
    wordcount_adjust, SCORE_DEL, SCORE_DELCOMP, SCORE_DELDUP, SCORE_ICASE, SCORE_INS,
    SCORE_INSCOMP, SCORE_INSDUP, SCORE_NONWORD, SCORE_RARE, SCORE_REGION, SCORE_REP, SCORE_SIMILAR,
    SCORE_SPLIT, SCORE_SPLIT_NO, SCORE_SUBST, SCORE_SWAP, SCORE_SWAP3,
};
use crate::types::{
    PrefixMeta, MAXWLEN, WF_ALLCAP, WF_BANNED, WF_HAS_AFF, WF_KEEPCAP, WF_MIXCAP, WF_NEEDCOMP,
    WF_NOSUGGEST, WF_ONECAP, WF_RARE, WF_RAREPFX, WF_REGION, WF_PFX_NC,
};

const TSF_PREFIXOK: u8 = 0x01;
const TSF_DIDSPLIT: u8 = 0x02;
const TSF_DIDDEL: u8 = 0x04;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Start,
    NoPrefix,
    SplitUndo,
    EndNul,
    Plain,
    Del,
    InsPrep,
    Ins,
    Swap,
    UnSwap,
    Swap3,
    UnSwap3,
    UnRot3L,
    UnRot3R,
    RepIni,
    Rep,
    RepUndo,
    Final,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum PrefixDepth {
    /// No prefix handling for this branch.
    #[default]
    None,
    /// Currently walking the prefix tree.
    Tree,
    /// Word walk behind a prefix; the value is the stack index of the
    /// prefix-tree frame.
    At(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Diff {
    #[default]
    None,
    Yes,
    Insert,
}

/// One level of the backtracking stack.
#[derive(Debug, Clone, Copy, Default)]
struct SearchFrame {
    state: State,
    score: i32,
    /// Trie node (start index) for this level.
    arridx: usize,
    /// Sibling cursor, starts just past the count byte.
    curi: usize,
    /// Position in the (mutated) bad word.
    fidx: usize,
    /// Positions before this must not be modified again.
    fidxtry: usize,
    twordlen: usize,
    prefixdepth: PrefixDepth,
    flags: u8,
    /// Multi-byte assembly: total/done byte counts of the pending char.
    tcharlen: usize,
    tcharidx: usize,
    isdiff: Diff,
    /// fword index where the pending char started.
    fcharstart: usize,
    prewordlen: usize,
    /// tword offset where the current (post-split) word starts.
    splitoff: usize,
    /// fword index at the last split.
    splitfidx: usize,
    complen: usize,
    compsplit: usize,
    save_badflags: u32,
    /// fword index of the byte deleted by STATE_DEL.
    delidx: usize,
}

fn byte_at(buf: &[u8], i: usize) -> u8 {
    buf.get(i).copied().unwrap_or(0)
}

fn mb_byte2len(b: u8) -> usize {
    match b {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    }
}

fn char_len_at(buf: &[u8], i: usize) -> usize {
    let l = mb_byte2len(byte_at(buf, i));
    l.min(buf.len().saturating_sub(i)).max(1)
}

fn char_at(buf: &[u8], i: usize) -> char {
    if i >= buf.len() {
        return '\0';
    }
    let l = char_len_at(buf, i);
    std::str::from_utf8(&buf[i..i + l])
        .ok()
        .and_then(|s| s.chars().next())
        .unwrap_or(buf[i] as char)
}

fn prev_char_start(buf: &[u8], i: usize) -> usize {
    let mut p = i.saturating_sub(1);
    while p > 0 && byte_at(buf, p) & 0xC0 == 0x80 {
        p -= 1;
    }
    p
}

fn char_bytes(c: char) -> Vec<u8> {
    let mut buf = [0u8; 4];
    c.encode_utf8(&mut buf).as_bytes().to_vec()
}

fn is_composing(c: char) -> bool {
    matches!(c,
        '\u{0300}'..='\u{036F}' | '\u{1DC0}'..='\u{1DFF}' |
        '\u{20D0}'..='\u{20FF}' | '\u{FE20}'..='\u{FE2F}')
}

/// Word-char test over a byte buffer, with the MIDWORD rule.
fn iswordp(lang: &Language, buf: &[u8], i: usize) -> bool {
    let c = char_at(buf, i);
    if c == '\0' {
        return false;
    }
    if lang.char_table.is_word_char(c) {
        return true;
    }
    if lang.is_midword_char(c) && i > 0 {
        let next = char_at(buf, i + c.len_utf8());
        return next != '\0' && lang.char_table.is_word_char(next);
    }
    false
}

fn iswordp_nmw(lang: &Language, buf: &[u8], i: usize) -> bool {
    let c = char_at(buf, i);
    c != '\0' && lang.char_table.is_word_char(c)
}

/// Length in the original bad text corresponding to `fidx` folded bytes.
fn nofold_len(fword: &[u8], fidx: usize, orig: &str) -> usize {
    let chars = std::str::from_utf8(&fword[..fidx.min(fword.len())])
        .map_or(fidx, |s| s.chars().count());
    let mut len = 0usize;
    for (n, c) in orig.chars().enumerate() {
        if n >= chars {
            break;
        }
        len += c.len_utf8();
    }
    len
}

/// Check the prefix entries at one prefix-tree NUL run against a word.
fn valid_word_prefix(
    pidxs: &[u32],
    start: usize,
    count: usize,
    word_flags: u32,
    tail: &str,
    prefcond: &[PrefCond],
) -> Option<u32> {
    let tail_chars: Vec<char> = tail.chars().collect();
    for n in (0..count).rev() {
        let pidx = *pidxs.get(start + n)?;
        let meta = PrefixMeta::decode(pidx);
        if (word_flags >> 24) as u8 != meta.prefix_id {
            continue;
        }
        if word_flags & WF_HAS_AFF != 0 && pidx & WF_PFX_NC != 0 {
            continue;
        }
        if let Some(cond) = prefcond.get(meta.cond_index as usize) {
            if cond.prog.is_some() && !cond.matches(&tail_chars) {
                continue;
            }
        }
        return Some(pidx);
    }
    None
}

/// Can this compound flag extend the current compound?
fn can_be_compound(
    lang: &Language,
    compflags: &[u8],
    complen: usize,
    compsplit: usize,
    flag: u8,
) -> bool {
    let Some(comp) = &lang.compound else {
        return false;
    };
    let set = if complen == compsplit {
        &comp.start_flags
    } else {
        &comp.all_flags
    };
    if !set.contains(flag) {
        return false;
    }
    if comp.rules_plain.is_some() && complen > compsplit {
        let mut flags = compflags[compsplit..complen].to_vec();
        flags.push(flag);
        return match_compoundrule(lang, &flags);
    }
    true
}

/// The word after the last space of `preword`, for syllable counting.
fn last_word_of(preword: &[u8]) -> String {
    let s = String::from_utf8_lossy(preword);
    s.rsplit(' ').next().unwrap_or("").to_string()
}

/// The whole walk for one language. `fword` is consumed as scratch: it
/// is mutated and not restored.
pub(super) fn suggest_trie_walk(
    su: &mut SugInfo<'_>,
    lang_idx: usize,
    fword: &mut Vec<u8>,
    soundfold: bool,
) {
    let lang: &Language = su.langs[lang_idx];
    let sug_trie;
    let (fbyts, fidxs): (&[u8], &[u32]) = if soundfold {
        match lang.sug.loaded() {
            Some(sf) => {
                sug_trie = &sf.trie;
                (sug_trie.byts(), sug_trie.idxs())
            }
            None => return,
        }
    } else {
        (lang.fold.byts(), lang.fold.idxs())
    };
    if fbyts.is_empty() {
        return;
    }
    let (pbyts, pidxs): (Option<&[u8]>, Option<&[u32]>) = if !soundfold && !lang.prefix.is_empty()
    {
        (Some(lang.prefix.byts()), Some(lang.prefix.idxs()))
    } else {
        (None, None)
    };

    let replang: Option<&Language> = if soundfold {
        Some(lang)
    } else {
        su.replang.map(|i| su.langs[i])
    };

    let mut tword = vec![0u8; MAXWLEN + 4];
    let mut preword: Vec<u8> = Vec::with_capacity(MAXWLEN * 3);
    let mut compflags = vec![0u8; MAXWLEN + 2];
    let mut repextra: i32 = 0;
    let mut breakcheck = 1000u32;

    let mut stack: Vec<SearchFrame> = vec![SearchFrame::default(); MAXWLEN + 2];
    stack[0].curi = 1;
    if pbyts.is_some() {
        stack[0].prefixdepth = PrefixDepth::Tree;
        stack[0].state = State::NoPrefix;
    }
    let mut depth: isize = 0;

    macro_rules! try_deeper {
        ($d:expr, $add:expr) => {
            ($d) < (MAXWLEN - 1) as isize && stack[$d as usize].score + ($add) < su.maxscore
        };
    }
    macro_rules! go_deeper {
        ($d:expr, $add:expr) => {{
            let parent = stack[$d as usize];
            let child = &mut stack[$d as usize + 1];
            *child = parent;
            child.state = State::Start;
            child.score = parent.score + ($add);
            child.curi = 1;
            child.flags = 0;
        }};
    }

    'main: while depth >= 0 {
        let d = depth as usize;
        let (byts, idxs): (&[u8], &[u32]) = match stack[d].prefixdepth {
            PrefixDepth::Tree => match (pbyts, pidxs) {
                (Some(b), Some(i)) => (b, i),
                _ => (fbyts, fidxs),
            },
            _ => (fbyts, fidxs),
        };

        match stack[d].state {
            State::Start | State::NoPrefix => {
                // Deal with the NUL bytes at this node: tword may end here.
                let sp = stack[d];
                let node = sp.arridx;
                let len = byte_at(byts, node) as usize;
                let arridx = node + sp.curi;

                if sp.prefixdepth == PrefixDepth::Tree {
                    // Skip the NUL bytes, they are checked later when the
                    // word behind the prefix ends.
                    let mut n = 0usize;
                    while sp.curi + n <= len && byte_at(byts, node + sp.curi + n) == 0 {
                        n += 1;
                    }
                    stack[d].curi += n;
                    let was_noprefix = sp.state == State::NoPrefix;
                    stack[d].state = State::EndNul;
                    stack[d].save_badflags = su.badflags;

                    // At the end of a prefix (or at the very start): try
                    // the word that follows.
                    if depth < (MAXWLEN - 1) as isize
                        && (byte_at(byts, arridx) == 0 || was_noprefix)
                    {
                        // Case type of the prefix itself, and of the rest.
                        let n = nofold_len(fword, sp.fidx, su.badptr);
                        let prefix_flags =
                            badword_captype(su.table, &su.badptr[..n.min(su.badptr.len())]);
                        su.badflags = badword_captype(
                            su.table,
                            su.badptr
                                .get(n.min(su.badptr.len())..su.badlen.max(n).min(su.badptr.len()))
                                .unwrap_or(""),
                        );

                        go_deeper!(depth, 0);
                        depth += 1;
                        let cd = depth as usize;
                        stack[cd].prefixdepth = PrefixDepth::At(d);
                        stack[cd].arridx = 0;

                        // Move the prefix to preword with its own case.
                        let seg = tword[stack[cd].splitoff..stack[cd].twordlen].to_vec();
                        let cased = make_case_word(
                            su.table,
                            &String::from_utf8_lossy(&seg),
                            prefix_flags,
                        );
                        preword.truncate(stack[cd].prewordlen);
                        preword.extend_from_slice(cased.as_bytes());
                        stack[cd].prewordlen = preword.len();
                        stack[cd].splitoff = stack[cd].twordlen;
                    }
                    continue 'main;
                }

                if sp.curi > len || byte_at(byts, arridx) != 0 {
                    // Past the NUL bytes in this node.
                    stack[d].state = State::EndNul;
                    stack[d].save_badflags = su.badflags;
                    continue 'main;
                }

                // The word in the tree ends here; eat one NUL.
                stack[d].curi += 1;
                let mut flags = *idxs.get(arridx).unwrap_or(&0);

                if !soundfold && flags & WF_NOSUGGEST != 0 {
                    continue 'main;
                }

                let fword_ends = byte_at(fword, sp.fidx) == 0
                    || (if soundfold {
                        char_at(fword, sp.fidx).is_whitespace()
                    } else {
                        !iswordp(lang, fword, sp.fidx)
                    });

                // A prefix in front of this word must accept it.
                if let PrefixDepth::At(pd) = sp.prefixdepth {
                    if sp.flags & TSF_PREFIXOK == 0 {
                        if let (Some(_pb), Some(pi)) = (pbyts, pidxs) {
                            let pnode = stack[pd].arridx;
                            let plen = byte_at(pbyts.unwrap(), pnode) as usize;
                            let mut nuls = 0usize;
                            while nuls < plen
                                && byte_at(pbyts.unwrap(), pnode + 1 + nuls) == 0
                            {
                                nuls += 1;
                            }
                            if nuls > 0 {
                                let seg = tword[sp.splitoff..sp.twordlen].to_vec();
                                let tail = String::from_utf8_lossy(&seg).into_owned();
                                match valid_word_prefix(
                                    pi,
                                    pnode + 1,
                                    nuls,
                                    flags,
                                    &tail,
                                    &lang.prefcond,
                                ) {
                                    Some(pidx) => {
                                        if pidx & WF_RAREPFX != 0 {
                                            flags |= WF_RARE;
                                        }
                                        stack[d].flags |= TSF_PREFIXOK;
                                    }
                                    None => continue 'main,
                                }
                            }
                        }
                    }
                }

                // NEEDCOMPOUND: only usable as part of a compound.
                let mut goodword_ends = true;
                if sp.complen == sp.compsplit && fword_ends && flags & WF_NEEDCOMP != 0 {
                    goodword_ends = false;
                }

                let mut compound_ok = true;
                let mut prev_word_end: Option<usize> = None;
                if sp.complen > sp.compsplit {
                    if lang.nobreak {
                        // NOBREAK: if this word was typed correctly, add
                        // the part before it as the suggestion.
                        let seg_len = sp.twordlen - sp.splitoff;
                        if sp.fidx.saturating_sub(sp.splitfidx) == seg_len
                            && fword
                                .get(sp.splitfidx..sp.splitfidx + seg_len)
                                .is_some_and(|f| f == &tword[sp.splitoff..sp.twordlen])
                        {
                            let pre = String::from_utf8_lossy(&preword[..sp.prewordlen])
                                .into_owned();
                            let newscore = wordcount_adjust(
                                lang,
                                &pre,
                                sp.prewordlen > 0,
                                sp.score,
                            );
                            if newscore <= su.maxscore {
                                let badlenarg =
                                    (sp.splitfidx as i32 - repextra).max(0) as usize;
                                let sallang = su.sallang;
                                add_suggestion(
                                    su, false, pre, badlenarg, newscore, 0, false, sallang,
                                    false,
                                );
                            }
                            continue 'main;
                        }
                    } else {
                        // A compound word precedes: this word must carry a
                        // usable compound flag.
                        let compflag = (flags >> 24) as u8;
                        let seg_len = sp.twordlen - sp.splitoff;
                        let min_len =
                            lang.compound.as_ref().map_or(0, |c| c.min_len);
                        if compflag == 0 || seg_len < min_len {
                            continue 'main;
                        }
                        let seg = &tword[sp.splitoff..sp.twordlen];
                        if min_len > 0
                            && String::from_utf8_lossy(seg).chars().count() < min_len
                        {
                            continue 'main;
                        }
                        compflags[sp.complen] = compflag;
                        compflags[sp.complen + 1] = 0;
                        preword.truncate(sp.prewordlen);
                        preword.extend_from_slice(seg);

                        if match_checkcompoundpattern(lang, &preword, sp.prewordlen) {
                            compound_ok = false;
                        }
                        if compound_ok {
                            let last = last_word_of(&preword);
                            if fword_ends
                                && !can_compound(
                                    lang,
                                    &last,
                                    &compflags[sp.compsplit..sp.complen + 1],
                                )
                            {
                                compound_ok = false;
                            }
                        }
                        if sp.prewordlen > 0 {
                            prev_word_end = Some(prev_char_start(&preword, sp.prewordlen));
                        }
                    }
                }

                // Build preword with the proper case.
                let seg = tword[sp.splitoff..sp.twordlen].to_vec();
                let seg_str = String::from_utf8_lossy(&seg).into_owned();
                let cased = if soundfold {
                    seg_str.clone()
                } else if flags & WF_KEEPCAP != 0 {
                    find_keepcap_word(&lang.keep, &seg_str, su.table)
                        .unwrap_or_else(|| seg_str.clone())
                } else {
                    let mut c = su.badflags;
                    if c & WF_ALLCAP != 0
                        && su.badlen
                            == su.badptr.chars().next().map_or(0, char::len_utf8)
                    {
                        c = WF_ONECAP;
                    }
                    c |= flags;
                    // Appending to a word char: no Onecap.
                    if prev_word_end
                        .is_some_and(|p| iswordp_nmw(lang, &preword, p))
                    {
                        c &= !WF_ONECAP;
                    }
                    make_case_word(su.table, &seg_str, c)
                };
                preword.truncate(sp.prewordlen);
                preword.extend_from_slice(cased.as_bytes());
                let preword_str = String::from_utf8_lossy(&preword).into_owned();
                let preword_tail = preword_str
                    .get(sp.prewordlen.min(preword_str.len())..)
                    .unwrap_or("")
                    .to_string();

                if !soundfold {
                    // Banned words are remembered but never suggested.
                    if flags & WF_BANNED != 0 {
                        add_banned(su, preword_tail.clone());
                        continue 'main;
                    }
                    if was_banned(su, &preword_tail) || was_banned(su, &preword_str) {
                        if lang.compound.is_none() {
                            continue 'main;
                        }
                        goodword_ends = false;
                    }
                }

                let mut newscore = 0i32;
                if !soundfold {
                    if flags & WF_REGION != 0
                        && !lang.region_visible(((flags >> 16) & 0xFF) as u8)
                    {
                        newscore += SCORE_REGION;
                    }
                    if flags & WF_RARE != 0 {
                        newscore += SCORE_RARE;
                    }
                    newscore += case_score_penalty(su.table, su.badflags, &preword_tail);
                }

                if fword_ends && goodword_ends && sp.fidx >= sp.fidxtry && compound_ok {
                    if soundfold {
                        let score = stack[d].score;
                        add_sound_suggest(su, &preword_str, score, lang_idx);
                    } else if sp.fidx > 0 {
                        // Changing a non-word char into a word char gets a
                        // penalty: "thes," -> "these".
                        let prev = prev_char_start(fword, sp.fidx);
                        if !iswordp(lang, fword, prev) && !preword_str.is_empty() {
                            let lastp = prev_char_start(&preword, preword.len());
                            if iswordp_nmw(lang, &preword, lastp) {
                                newscore += SCORE_NONWORD;
                            }
                        }

                        let score = wordcount_adjust(
                            lang,
                            &preword_tail,
                            sp.prewordlen > 0,
                            sp.score + newscore,
                        );
                        if score <= su.maxscore {
                            let badlenarg = (sp.fidx as i32 - repextra).max(0) as usize;
                            let sallang = su.sallang;
                            add_suggestion(
                                su,
                                false,
                                preword_str.clone(),
                                badlenarg,
                                score,
                                0,
                                false,
                                sallang,
                                false,
                            );

                            if su.badflags & WF_MIXCAP != 0 {
                                // Both capitalisations are plausible.
                                let cap = super::captype_flags(su.table, &preword_str);
                                if cap == 0 || cap == WF_ALLCAP {
                                    let other = make_case_word(
                                        su.table,
                                        &seg_str,
                                        if cap == 0 { WF_ALLCAP } else { 0 },
                                    );
                                    let mut alt = preword[..sp.prewordlen].to_vec();
                                    alt.extend_from_slice(other.as_bytes());
                                    add_suggestion(
                                        su,
                                        false,
                                        String::from_utf8_lossy(&alt).into_owned(),
                                        badlenarg,
                                        score + SCORE_ICASE,
                                        0,
                                        false,
                                        sallang,
                                        false,
                                    );
                                }
                            }
                        }
                    }
                }

                // Try a split (insert a space) or a compound continuation.
                if (sp.fidx >= sp.fidxtry || fword_ends) && sp.tcharlen == 0 {
                    let try_split =
                        (sp.fidx as i32 - repextra) < su.badlen as i32 && !soundfold;
                    let compflag = (flags >> 24) as u8;
                    let seg_len = sp.twordlen - sp.splitoff;
                    let mut try_compound = false;
                    if !soundfold && lang.compound.is_some() && compflag != 0 {
                        let comp = lang.compound.as_ref().unwrap();
                        let seg = &tword[sp.splitoff..sp.twordlen];
                        let chars_ok = comp.min_len == 0
                            || String::from_utf8_lossy(seg).chars().count() >= comp.min_len;
                        if seg_len >= comp.min_len
                            && chars_ok
                            && (comp.syl_max < MAXWLEN
                                || sp.complen + 1 - sp.compsplit < comp.max_words)
                            && can_be_compound(
                                lang,
                                &compflags,
                                sp.complen,
                                sp.compsplit,
                                compflag,
                            )
                        {
                            try_compound = true;
                            compflags[sp.complen] = compflag;
                            compflags[sp.complen + 1] = 0;
                        }
                    }

                    if lang.nobreak {
                        // NOBREAK: compounding is how words chain.
                        try_compound = true;
                    } else if !fword_ends
                        && try_compound
                        && sp.flags & TSF_DIDSPLIT == 0
                    {
                        // Both are possible; do the split first and redo
                        // this NUL for the compound.
                        try_compound = false;
                        stack[d].flags |= TSF_DIDSPLIT;
                        stack[d].curi -= 1;
                        compflags[sp.complen] = 0;
                    } else {
                        stack[d].flags &= !TSF_DIDSPLIT;
                    }

                    if try_split || try_compound {
                        if !try_compound && (!fword_ends || !goodword_ends) {
                            // A real split: the words so far must be valid.
                            if sp.complen == sp.compsplit && flags & WF_NEEDCOMP != 0 {
                                continue 'main;
                            }
                            if sp.complen > sp.compsplit {
                                let last = last_word_of(&preword);
                                if !can_compound(
                                    lang,
                                    &last,
                                    &compflags[sp.compsplit..sp.complen],
                                ) {
                                    continue 'main;
                                }
                            }
                            newscore += if lang.no_split_sugs {
                                SCORE_SPLIT_NO
                            } else {
                                SCORE_SPLIT
                            };
                            newscore = wordcount_adjust(lang, &preword_tail, true, newscore);
                        }

                        if try_deeper!(depth, newscore) {
                            go_deeper!(depth, newscore);
                            stack[d].save_badflags = su.badflags;
                            stack[d].state = State::SplitUndo;
                            depth += 1;
                            let cd = depth as usize;

                            // A space between the words when splitting.
                            if !try_compound && !fword_ends {
                                preword.push(b' ');
                            }
                            stack[cd].prewordlen = preword.len();
                            stack[cd].splitoff = stack[cd].twordlen;
                            stack[cd].splitfidx = stack[cd].fidx;

                            // A non-word char in the bad word is replaced
                            // by the space; at the word end keep it.
                            if ((!try_compound && !iswordp_nmw(lang, fword, stack[cd].fidx))
                                || fword_ends)
                                && byte_at(fword, stack[cd].fidx) != 0
                                && goodword_ends
                            {
                                let l = char_len_at(fword, stack[cd].fidx);
                                if fword_ends {
                                    let piece =
                                        fword[stack[cd].fidx..stack[cd].fidx + l].to_vec();
                                    preword.extend_from_slice(&piece);
                                    stack[cd].prewordlen = preword.len();
                                } else {
                                    stack[cd].score -= SCORE_SPLIT - SCORE_SUBST;
                                }
                                stack[cd].fidx += l;
                            }

                            if try_compound {
                                stack[cd].complen += 1;
                            } else {
                                stack[cd].compsplit = stack[cd].complen;
                            }
                            stack[cd].prefixdepth = PrefixDepth::None;

                            // Case type of what follows the split point.
                            let n = nofold_len(fword, stack[cd].fidx, su.badptr);
                            su.badflags = badword_captype(
                                su.table,
                                su.badptr
                                    .get(n.min(su.badptr.len())..su.badlen.max(n).min(su.badptr.len()))
                                    .unwrap_or(""),
                            );

                            // Restart at the top of the tree.
                            stack[cd].arridx = 0;
                            if pbyts.is_some() {
                                stack[cd].prefixdepth = PrefixDepth::Tree;
                                stack[cd].state = State::NoPrefix;
                            }
                        }
                    }
                }
            }

            State::SplitUndo => {
                su.badflags = stack[d].save_badflags;
                stack[d].state = State::Start;
            }

            State::EndNul => {
                su.badflags = stack[d].save_badflags;
                if byte_at(fword, stack[d].fidx) == 0 && stack[d].tcharlen == 0 {
                    // The bad word ends, only deletion may help.
                    stack[d].state = State::Del;
                } else {
                    stack[d].state = State::Plain;
                }
            }

            State::Plain => {
                // Accept or substitute one sibling byte, recurse.
                let sp = stack[d];
                let node = sp.arridx;
                let len = byte_at(byts, node) as usize;
                if sp.curi > len {
                    stack[d].state = if sp.fidx >= sp.fidxtry {
                        State::Del
                    } else {
                        State::Final
                    };
                    continue 'main;
                }
                let arridx = node + sp.curi;
                stack[d].curi += 1;
                let c = byte_at(byts, arridx);

                let newscore = if c == byte_at(fword, sp.fidx)
                    || (sp.tcharlen > 0 && sp.isdiff != Diff::None)
                {
                    0
                } else {
                    SCORE_SUBST
                };
                let allowed = newscore == 0
                    || (sp.fidx >= sp.fidxtry
                        && (sp.flags & TSF_DIDDEL == 0 || c != byte_at(fword, sp.delidx)));
                if allowed && try_deeper!(depth, newscore) {
                    go_deeper!(depth, newscore);
                    depth += 1;
                    let cd = depth as usize;
                    stack[cd].fidx += 1;
                    if stack[cd].twordlen < MAXWLEN {
                        tword[stack[cd].twordlen] = c;
                        stack[cd].twordlen += 1;
                    }
                    stack[cd].arridx = *idxs.get(arridx).unwrap_or(&0) as usize;
                    if newscore == SCORE_SUBST {
                        stack[cd].isdiff = Diff::Yes;
                    }

                    // Character assembly: a char differs when any of its
                    // bytes differ, and an edit is charged once per char,
                    // so corrections wait for the last byte.
                    if stack[cd].tcharlen == 0 {
                        stack[cd].tcharidx = 0;
                        stack[cd].tcharlen = mb_byte2len(c);
                        stack[cd].fcharstart = stack[cd].fidx - 1;
                        stack[cd].isdiff = if newscore != 0 {
                            Diff::Yes
                        } else {
                            Diff::None
                        };
                    } else if stack[cd].isdiff == Diff::Insert {
                        // Inserting trail bytes: don't advance in fword.
                        stack[cd].fidx -= 1;
                    }
                    stack[cd].tcharidx += 1;
                    if stack[cd].tcharidx == stack[cd].tcharlen {
                        // Last byte of the character.
                        if stack[cd].isdiff == Diff::Yes {
                            // Correct fidx for the bad word's char length.
                            stack[cd].fidx = stack[cd].fcharstart
                                + char_len_at(fword, stack[cd].fcharstart);
                            let tc =
                                char_at(&tword, stack[cd].twordlen - stack[cd].tcharlen);
                            let fc = char_at(fword, stack[cd].fcharstart);
                            if is_composing(tc) && is_composing(fc) {
                                stack[cd].score -= SCORE_SUBST - SCORE_INSCOMP;
                            } else if !soundfold
                                && !lang.map.is_empty()
                                && lang.map.similar(tc, fc)
                            {
                                stack[cd].score -= SCORE_SUBST - SCORE_SIMILAR;
                            }
                        } else if stack[cd].isdiff == Diff::Insert
                            && stack[cd].twordlen > stack[cd].tcharlen
                        {
                            let at = stack[cd].twordlen - stack[cd].tcharlen;
                            let c2 = char_at(&tword, at);
                            if is_composing(c2) {
                                stack[cd].score -= SCORE_INS - SCORE_INSCOMP;
                            } else {
                                let prev = prev_char_start(&tword, at);
                                if c2 == char_at(&tword, prev) {
                                    stack[cd].score -= SCORE_INS - SCORE_INSDUP;
                                }
                            }
                        }
                        stack[cd].tcharlen = 0;
                    }
                }
            }

            State::Del => {
                // Don't edit in the middle of a multi-byte char.
                if stack[d].tcharlen > 0 {
                    stack[d].state = State::Final;
                    continue 'main;
                }
                stack[d].state = State::InsPrep;
                stack[d].curi = 1;
                let sp = stack[d];
                let newscore = if soundfold && sp.fidx == 0 && byte_at(fword, 0) == b'*' {
                    2 * SCORE_DEL / 3
                } else {
                    SCORE_DEL
                };
                if byte_at(fword, sp.fidx) != 0 && try_deeper!(depth, newscore) {
                    go_deeper!(depth, newscore);
                    depth += 1;
                    let cd = depth as usize;
                    stack[cd].flags |= TSF_DIDDEL;
                    stack[cd].delidx = sp.fidx;

                    // Skip the deleted char; deleting a double costs less.
                    let c = char_at(fword, stack[cd].fidx);
                    stack[cd].fidx += char_len_at(fword, stack[cd].fidx);
                    if is_composing(c) {
                        stack[cd].score -= SCORE_DEL - SCORE_DELCOMP;
                    } else if c == char_at(fword, stack[cd].fidx) {
                        stack[cd].score -= SCORE_DEL - SCORE_DELDUP;
                    }
                }
            }

            State::InsPrep => {
                if stack[d].flags & TSF_DIDDEL != 0 {
                    // Just deleted a byte: inserting is pointless, a
                    // substitute is always cheaper.
                    stack[d].state = State::Swap;
                    continue 'main;
                }
                let node = stack[d].arridx;
                let len = byte_at(byts, node) as usize;
                loop {
                    if stack[d].curi > len {
                        stack[d].state = State::Swap;
                        break;
                    }
                    if byte_at(byts, node + stack[d].curi) != 0 {
                        stack[d].state = State::Ins;
                        break;
                    }
                    stack[d].curi += 1;
                }
            }

            State::Ins => {
                let sp = stack[d];
                let node = sp.arridx;
                let len = byte_at(byts, node) as usize;
                if sp.curi > len {
                    stack[d].state = State::Swap;
                    continue 'main;
                }
                let arridx = node + sp.curi;
                stack[d].curi += 1;
                let c = byte_at(byts, arridx);
                let newscore = if soundfold && sp.twordlen == 0 && c == b'*' {
                    2 * SCORE_INS / 3
                } else {
                    SCORE_INS
                };
                if c != byte_at(fword, sp.fidx) && try_deeper!(depth, newscore) {
                    go_deeper!(depth, newscore);
                    depth += 1;
                    let cd = depth as usize;
                    if stack[cd].twordlen < MAXWLEN {
                        tword[stack[cd].twordlen] = c;
                        stack[cd].twordlen += 1;
                    }
                    stack[cd].arridx = *idxs.get(arridx).unwrap_or(&0) as usize;
                    let fl = mb_byte2len(c);
                    if fl > 1 {
                        // Trail bytes must be collected before more edits.
                        stack[cd].tcharlen = fl;
                        stack[cd].tcharidx = 1;
                        stack[cd].isdiff = Diff::Insert;
                    } else if stack[cd].twordlen >= 2
                        && tword[stack[cd].twordlen - 2] == c
                    {
                        // Doubling a char is a likelier typo.
                        stack[cd].score -= SCORE_INS - SCORE_INSDUP;
                    }
                }
            }

            State::Swap => {
                let sp = stack[d];
                let c = byte_at(fword, sp.fidx);
                if c == 0 {
                    // End of the word: no swap or further changes.
                    stack[d].state = State::Final;
                    continue 'main;
                }
                if !soundfold && !iswordp(lang, fword, sp.fidx) {
                    // Non-word char: SWAP and friends make no sense.
                    stack[d].state = State::RepIni;
                    continue 'main;
                }
                let n = char_len_at(fword, sp.fidx);
                let c1 = char_at(fword, sp.fidx);
                let c2 = if byte_at(fword, sp.fidx + n) == 0 {
                    '\0'
                } else if !soundfold && !iswordp(lang, fword, sp.fidx + n) {
                    c1 // don't swap with a non-word char
                } else {
                    char_at(fword, sp.fidx + n)
                };
                if c2 == '\0' {
                    stack[d].state = State::RepIni;
                    continue 'main;
                }
                if c1 == c2 {
                    // Swapping identical chars is a no-op.
                    stack[d].state = State::Swap3;
                    continue 'main;
                }
                if try_deeper!(depth, SCORE_SWAP) {
                    go_deeper!(depth, SCORE_SWAP);
                    stack[d].state = State::UnSwap;
                    depth += 1;
                    let fl = c2.len_utf8();
                    let mut swapped = char_bytes(c2);
                    swapped.extend_from_slice(&char_bytes(c1));
                    fword.splice(sp.fidx..sp.fidx + n + fl, swapped);
                    stack[depth as usize].fidxtry = sp.fidx + n + fl;
                } else {
                    // If the swap is too expensive, SWAP3 is too.
                    stack[d].state = State::RepIni;
                }
            }

            State::UnSwap => {
                // "21" -> "12", then fall through to SWAP3.
                let fidx = stack[d].fidx;
                let n = char_len_at(fword, fidx);
                let c1 = char_at(fword, fidx);
                let l2 = char_len_at(fword, fidx + n);
                let c2 = char_at(fword, fidx + n);
                let mut orig = char_bytes(c2);
                orig.extend_from_slice(&char_bytes(c1));
                fword.splice(fidx..fidx + n + l2, orig);
                stack[d].state = State::Swap3;
            }

            State::Swap3 => {
                // "123" -> "321".
                let sp = stack[d];
                let n = char_len_at(fword, sp.fidx);
                let c1 = char_at(fword, sp.fidx);
                let fl = char_len_at(fword, sp.fidx + n);
                let c2 = char_at(fword, sp.fidx + n);
                let c3 = if byte_at(fword, sp.fidx + n + fl) == 0 {
                    '\0'
                } else if !soundfold && !iswordp(lang, fword, sp.fidx + n + fl) {
                    c1
                } else {
                    char_at(fword, sp.fidx + n + fl)
                };
                if c1 == c3 || c3 == '\0' {
                    stack[d].state = State::RepIni;
                    continue 'main;
                }
                if try_deeper!(depth, SCORE_SWAP3) {
                    go_deeper!(depth, SCORE_SWAP3);
                    stack[d].state = State::UnSwap3;
                    depth += 1;
                    let tl = c3.len_utf8();
                    let mut swapped = char_bytes(c3);
                    swapped.extend_from_slice(&char_bytes(c2));
                    swapped.extend_from_slice(&char_bytes(c1));
                    fword.splice(sp.fidx..sp.fidx + n + fl + tl, swapped);
                    stack[depth as usize].fidxtry = sp.fidx + n + fl + tl;
                } else {
                    stack[d].state = State::RepIni;
                }
            }

            State::UnSwap3 => {
                // "321" -> "123".
                let fidx = stack[d].fidx;
                let n = char_len_at(fword, fidx);
                let c3 = char_at(fword, fidx);
                let fl = char_len_at(fword, fidx + n);
                let c2 = char_at(fword, fidx + n);
                let tl = char_len_at(fword, fidx + n + fl);
                let c1 = char_at(fword, fidx + n + fl);
                let mut orig = char_bytes(c1);
                orig.extend_from_slice(&char_bytes(c2));
                orig.extend_from_slice(&char_bytes(c3));
                fword.splice(fidx..fidx + n + fl + tl, orig);

                let mid = fidx + c1.len_utf8();
                if !soundfold && !iswordp(lang, fword, mid) {
                    // Middle char is not a word char, skip the rotations.
                    stack[d].state = State::RepIni;
                    continue 'main;
                }
                // Rotate left: "123" -> "231".
                if try_deeper!(depth, SCORE_SWAP3) {
                    go_deeper!(depth, SCORE_SWAP3);
                    stack[d].state = State::UnRot3L;
                    depth += 1;
                    let sp = stack[d];
                    let n = char_len_at(fword, sp.fidx);
                    let c1 = char_at(fword, sp.fidx);
                    let l2 = char_len_at(fword, sp.fidx + n);
                    let c2 = char_at(fword, sp.fidx + n);
                    let l3 = char_len_at(fword, sp.fidx + n + l2);
                    let c3 = char_at(fword, sp.fidx + n + l2);
                    let mut rot = char_bytes(c2);
                    rot.extend_from_slice(&char_bytes(c3));
                    rot.extend_from_slice(&char_bytes(c1));
                    fword.splice(sp.fidx..sp.fidx + n + l2 + l3, rot);
                    stack[depth as usize].fidxtry = sp.fidx + n + l2 + l3;
                } else {
                    stack[d].state = State::RepIni;
                }
            }

            State::UnRot3L => {
                // "231" -> "123".
                let fidx = stack[d].fidx;
                let l1 = char_len_at(fword, fidx);
                let c2 = char_at(fword, fidx);
                let l2 = char_len_at(fword, fidx + l1);
                let c3 = char_at(fword, fidx + l1);
                let l3 = char_len_at(fword, fidx + l1 + l2);
                let c1 = char_at(fword, fidx + l1 + l2);
                let mut orig = char_bytes(c1);
                orig.extend_from_slice(&char_bytes(c2));
                orig.extend_from_slice(&char_bytes(c3));
                fword.splice(fidx..fidx + l1 + l2 + l3, orig);

                // Rotate right: "123" -> "312".
                if try_deeper!(depth, SCORE_SWAP3) {
                    go_deeper!(depth, SCORE_SWAP3);
                    stack[d].state = State::UnRot3R;
                    depth += 1;
                    let sp = stack[d];
                    let l1 = char_len_at(fword, sp.fidx);
                    let c1 = char_at(fword, sp.fidx);
                    let l2 = char_len_at(fword, sp.fidx + l1);
                    let c2 = char_at(fword, sp.fidx + l1);
                    let l3 = char_len_at(fword, sp.fidx + l1 + l2);
                    let c3 = char_at(fword, sp.fidx + l1 + l2);
                    let mut rot = char_bytes(c3);
                    rot.extend_from_slice(&char_bytes(c1));
                    rot.extend_from_slice(&char_bytes(c2));
                    fword.splice(sp.fidx..sp.fidx + l1 + l2 + l3, rot);
                    stack[depth as usize].fidxtry = sp.fidx + l1 + l2 + l3;
                } else {
                    stack[d].state = State::RepIni;
                }
            }

            State::UnRot3R => {
                // "312" -> "123", then continue with REP.
                let fidx = stack[d].fidx;
                let l1 = char_len_at(fword, fidx);
                let c3 = char_at(fword, fidx);
                let l2 = char_len_at(fword, fidx + l1);
                let c1 = char_at(fword, fidx + l1);
                let l3 = char_len_at(fword, fidx + l1 + l2);
                let c2 = char_at(fword, fidx + l1 + l2);
                let mut orig = char_bytes(c1);
                orig.extend_from_slice(&char_bytes(c2));
                orig.extend_from_slice(&char_bytes(c3));
                fword.splice(fidx..fidx + l1 + l2 + l3, orig);
                stack[d].state = State::RepIni;
            }

            State::RepIni => {
                let sp = stack[d];
                let rep_table = if soundfold {
                    Some(&lang.repsal)
                } else {
                    replang.map(|l| &l.rep)
                };
                let usable = rep_table.is_some_and(|t| !t.is_empty());
                if !usable
                    || sp.score + SCORE_REP >= su.maxscore
                    || sp.fidx < sp.fidxtry
                {
                    stack[d].state = State::Final;
                    continue 'main;
                }
                // First-byte acceleration table.
                let table = rep_table.unwrap();
                let b = byte_at(fword, sp.fidx);
                match table.first_for_byte(b) {
                    Some(i) => {
                        stack[d].curi = i;
                        stack[d].state = State::Rep;
                    }
                    None => stack[d].state = State::Final,
                }
            }

            State::Rep => {
                let sp = stack[d];
                let table = if soundfold {
                    &lang.repsal
                } else {
                    match replang {
                        Some(l) => &l.rep,
                        None => {
                            stack[d].state = State::Final;
                            continue 'main;
                        }
                    }
                };
                let entries = table.entries();
                let b = byte_at(fword, sp.fidx);
                let mut applied = false;
                while stack[d].curi < entries.len() {
                    let e = &entries[stack[d].curi];
                    stack[d].curi += 1;
                    if e.from.first() != Some(&b) {
                        // Past the possibly matching entries.
                        stack[d].curi = entries.len();
                        break;
                    }
                    let matches = fword
                        .get(sp.fidx..sp.fidx + e.from.len())
                        .is_some_and(|s| s == e.from.as_slice());
                    if matches && try_deeper!(depth, SCORE_REP) {
                        go_deeper!(depth, SCORE_REP);
                        stack[d].state = State::RepUndo;
                        depth += 1;
                        let fl = e.from.len();
                        let tl = e.to.len();
                        let to = e.to.clone();
                        fword.splice(sp.fidx..sp.fidx + fl, to);
                        repextra += tl as i32 - fl as i32;
                        stack[depth as usize].fidxtry = sp.fidx + tl;
                        stack[depth as usize].tcharlen = 0;
                        applied = true;
                        break;
                    }
                }
                if !applied && stack[d].state == State::Rep && stack[d].curi >= entries.len() {
                    stack[d].state = State::Final;
                }
            }

            State::RepUndo => {
                // Undo the last REP and continue with the next entry.
                let sp = stack[d];
                let table = if soundfold {
                    &lang.repsal
                } else {
                    replang.map(|l| &l.rep).unwrap()
                };
                let e = &table.entries()[sp.curi - 1];
                let fl = e.from.len();
                let tl = e.to.len();
                let from = e.from.clone();
                fword.splice(sp.fidx..sp.fidx + tl, from);
                repextra -= tl as i32 - fl as i32;
                stack[d].state = State::Rep;
            }

            State::Final => {
                depth -= 1;
                breakcheck = breakcheck.saturating_sub(1);
                if breakcheck == 0 {
                    if su.stopped() {
                        break 'main;
                    }
                    breakcheck = 1000;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::SCORE_MAXINIT;
    use crate::suggest::{SugInfo, SuggestMode};
    use crate::trie::TrieBuilder;
    use crate::util::{CaseFolder, CharTable};
    use std::collections::{HashMap, HashSet};

    fn lang_of(words: &[&str]) -> Language {
        let mut lang = Language::new("en", "en.spl");
        let mut b = TrieBuilder::new();
        let mut sorted = words.to_vec();
        sorted.sort_unstable();
        for w in sorted {
            b.insert(w.as_bytes(), 0);
        }
        lang.fold = b.finish();
        lang
    }

    fn walk<'a>(
        langs: &'a [&'a Language],
        table: &'a CharTable,
        bad: &'a str,
    ) -> Vec<(String, i32)> {
        let folder = CaseFolder::new(table);
        let fbad = folder.fold(bad, MAXWLEN).unwrap();
        let mut su = SugInfo {
            langs,
            table,
            badptr: bad,
            badlen: bad.len(),
            badword: bad.to_string(),
            fbadword: fbad.clone(),
            badflags: badword_captype(table, bad),
            ga: Vec::new(),
            sga: Vec::new(),
            banned: HashSet::new(),
            maxscore: SCORE_MAXINIT,
            sfmaxscore: SCORE_MAXINIT * 3,
            maxcount: 20,
            sallang: None,
            replang: langs.iter().position(|l| !l.rep.is_empty()),
            sal_badword: String::new(),
            sounddone: HashMap::new(),
            interrupt: None,
            mode: SuggestMode::Fast,
        };
        let mut fword = fbad.into_bytes();
        suggest_trie_walk(&mut su, 0, &mut fword, false);
        // Candidates keep only the changed head; re-attach the common
        // tail so assertions can use full words.
        let mut out: Vec<(String, i32)> = su
            .ga
            .into_iter()
            .map(|s| {
                let tail = bad.get(s.orglen.min(bad.len())..).unwrap_or("");
                (format!("{}{}", s.word, tail), s.score)
            })
            .collect();
        out.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));
        out
    }

    #[test]
    fn substitution_found() {
        let lang = lang_of(&["cat", "cut"]);
        let t = CharTable::default();
        let langs = [&lang];
        let found = walk(&langs, &t, "cot");
        assert!(found.iter().any(|(w, s)| w == "cat" && *s == SCORE_SUBST));
        assert!(found.iter().any(|(w, s)| w == "cut" && *s == SCORE_SUBST));
    }

    #[test]
    fn deletion_and_insertion_found() {
        let lang = lang_of(&["the", "these"]);
        let t = CharTable::default();
        let langs = [&lang];
        let found = walk(&langs, &t, "thes");
        assert!(found.iter().any(|(w, s)| w == "the" && *s == SCORE_DEL));
        assert!(found.iter().any(|(w, s)| w == "these" && *s == SCORE_INS));
    }

    #[test]
    fn swap_found() {
        let lang = lang_of(&["the"]);
        let t = CharTable::default();
        let langs = [&lang];
        let found = walk(&langs, &t, "teh");
        assert!(found.iter().any(|(w, s)| w == "the" && *s == SCORE_SWAP));
    }

    #[test]
    fn rep_entry_applies() {
        use crate::lang::{RepEntry, RepTable};
        let mut lang = lang_of(&["disconnecsion"]);
        lang.rep = RepTable::new(vec![RepEntry {
            from: b"tion".to_vec(),
            to: b"sion".to_vec(),
        }]);
        let t = CharTable::default();
        let langs = [&lang];
        let found = walk(&langs, &t, "disconnection");
        assert!(
            found
                .iter()
                .any(|(w, s)| w == "disconnecsion" && *s == SCORE_REP),
            "found: {:?}",
            found
        );
    }

    #[test]
    fn split_suggestion_found() {
        use crate::lang::CompoundInfo;
        let _ = CompoundInfo::from_raw(2, 1, MAXWLEN, 0, vec![], b"f+".to_vec());
        let lang = lang_of(&["foot", "ball"]);
        let t = CharTable::default();
        let langs = [&lang];
        let found = walk(&langs, &t, "football");
        assert!(
            found
                .iter()
                .any(|(w, s)| w == "foot ball" && *s == SCORE_SPLIT),
            "found: {:?}",
            found
        );
    }

    #[test]
    fn compound_suggestion_found() {
        use crate::lang::CompoundInfo;
        use crate::types::WordMeta;
        let mut lang = Language::new("en", "en.spl");
        let mut b = TrieBuilder::new();
        let f = WordMeta {
            flags: 0,
            region: 0,
            affix_id: b'f',
        }
        .encode();
        b.insert(b"ball", f);
        b.insert(b"foot", f);
        lang.fold = b.finish();
        lang.compound = Some(CompoundInfo::from_raw(
            MAXWLEN,
            1,
            MAXWLEN,
            0,
            vec![],
            b"f+".to_vec(),
        ));
        let t = CharTable::default();
        let langs = [&lang];
        // "footbal" -> "football" must be reachable via compounding plus
        // one insert.
        let found = walk(&langs, &t, "footbal");
        assert!(
            found.iter().any(|(w, _)| w == "football"),
            "found: {:?}",
            found
        );
    }

    #[test]
    fn scores_respect_budget() {
        let lang = lang_of(&["alpha", "beta", "gamma"]);
        let t = CharTable::default();
        let langs = [&lang];
        for (_, score) in walk(&langs, &t, "alphx") {
            assert!(score < SCORE_MAXINIT);
        }
    }
}
