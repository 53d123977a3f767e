// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The suggestion engine: propose replacements for a bad word.
//!
//! Three strategies feed one ranked list:
//!
//! 1. **Special cases** — a repeated word ("the the") suggests dropping
//!    one copy.
//! 2. **Edit walk** — a depth-first walk over the fold-case trie trying
//!    substitutions, deletes, inserts, swaps, rotations, REP table
//!    replacements, splits and compounds, bounded by a score budget
//!    (see `trie_walk`).
//! 3. **Sound-a-like** — the same walk over the soundfold trie of the
//!    `.sug` file; matches map back to dictionary words via the
//!    suggestion table and are re-scored by edit distance.
//!
//! Scores are integers, lower is better. In `best` mode word scores are
//! blended with the sound-a-like score; `fast` skips the sound pass;
//! `double` keeps both lists and interleaves them.

mod trie_walk;

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::fuzzy::{edit_score, edit_score_limit};
use crate::lang::Language;
use crate::matcher::{spell_valid_case, Matcher};
use crate::scoring::{
    score_combine, wordcount_adjust, SCORE_BIG, SCORE_DEL, SCORE_ICASE, SCORE_LIMITMAX,
    SCORE_MAXINIT, SCORE_MAXMAX, SCORE_REP, SCORE_SFMAX1, SCORE_SFMAX2, SCORE_SFMAX3, SCORE_SUBST,
    SCORE_SWAP,
};
use crate::trie::TrieStore;
use crate::types::{
    Suggestion, CaseType, MAXWLEN, WF_ALLCAP, WF_CAPMASK, WF_KEEPCAP, WF_MIXCAP, WF_NOSUGGEST,
    WF_ONECAP, WF_REGION,
};
use crate::util::{CaseFolder, CharTable};

/// Which strategies run and how scores merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuggestMode {
    /// Edit walk plus sound-a-like, blended scores.
    #[default]
    Best,
    /// Edit walk only.
    Fast,
    /// Both lists kept apart and interleaved.
    Double,
}

/// Caller knobs for one suggestion run.
pub struct SuggestOptions<'a> {
    pub mode: SuggestMode,
    pub max_count: usize,
    /// The word must be suggested with a capital (start of sentence).
    pub need_cap: bool,
    /// Polled cooperatively; set to abort with partial results.
    pub interrupt: Option<&'a AtomicBool>,
}

impl Default for SuggestOptions<'_> {
    fn default() -> Self {
        SuggestOptions {
            mode: SuggestMode::Best,
            max_count: 25,
            need_cap: false,
            interrupt: None,
        }
    }
}

/// One candidate in the working lists.
#[derive(Debug, Clone)]
pub(crate) struct Sug {
    pub word: String,
    pub orglen: usize,
    pub score: i32,
    pub altscore: i32,
    /// The sound-a-like score was already folded into `score`.
    pub had_bonus: bool,
    /// Candidate came from the soundfold list.
    pub salscore: bool,
    pub lang: Option<usize>,
}

/// Working state for one suggestion run.
pub(crate) struct SugInfo<'a> {
    pub langs: &'a [&'a Language],
    pub table: &'a CharTable,
    /// Bad word plus the text that follows it on the line.
    pub badptr: &'a str,
    /// Byte length of the bad word inside `badptr`.
    pub badlen: usize,
    /// The bad word with original case.
    pub badword: String,
    /// Case-folded bad word.
    pub fbadword: String,
    /// badword_captype of the bad word; mutated around prefix/split.
    pub badflags: u32,
    pub ga: Vec<Sug>,
    pub sga: Vec<Sug>,
    pub banned: HashSet<String>,
    pub maxscore: i32,
    pub sfmaxscore: i32,
    pub maxcount: usize,
    /// First language with sound folding / with REP entries.
    pub sallang: Option<usize>,
    pub replang: Option<usize>,
    /// Soundfolded fbadword for `sallang`.
    pub sal_badword: String,
    /// Soundfold words already expanded, with their best score.
    pub sounddone: HashMap<String, i32>,
    pub interrupt: Option<&'a AtomicBool>,
    pub mode: SuggestMode,
}

impl SugInfo<'_> {
    pub(crate) fn stopped(&self) -> bool {
        self.interrupt.is_some_and(|b| b.load(Ordering::Relaxed))
    }

    /// ≈ maxCount+50 before a cleanup pass, tightening the limit.
    pub(crate) fn clean_count(&self) -> usize {
        if self.maxcount < 130 {
            150
        } else {
            self.maxcount + 20
        }
    }

    pub(crate) fn max_store(&self) -> usize {
        self.clean_count() + 50
    }
}

/// Produce up to `max_count` candidates for the bad word at the start of
/// `text`. `badlen` is its byte length; the rest of `text` is context
/// for split suggestions and "the the" handling.
pub fn suggest(
    langs: &[&Language],
    table: &CharTable,
    text: &str,
    badlen: usize,
    opts: &SuggestOptions<'_>,
) -> Vec<Suggestion> {
    let badlen = badlen.min(text.len());
    if badlen == 0 || langs.is_empty() {
        return Vec::new();
    }
    let badword = text[..badlen].to_string();
    let folder = CaseFolder::new(table);
    let Some(fbadword) = folder.fold(&badword, MAXWLEN) else {
        return Vec::new();
    };

    let sallang = langs.iter().position(|l| !l.sound.is_none());
    let replang = langs.iter().position(|l| !l.rep.is_empty());
    let sal_badword = sallang
        .and_then(|i| langs[i].sound_fold(&fbadword))
        .unwrap_or_default();

    let mut badflags = badword_captype(table, &badword);
    if opts.need_cap {
        badflags |= WF_ONECAP;
    }

    let mut su = SugInfo {
        langs,
        table,
        badptr: text,
        badlen,
        badword: badword.clone(),
        fbadword,
        badflags,
        ga: Vec::new(),
        sga: Vec::new(),
        banned: HashSet::new(),
        maxscore: SCORE_MAXINIT,
        sfmaxscore: SCORE_MAXINIT * 3,
        maxcount: opts.max_count,
        sallang,
        replang,
        sal_badword,
        sounddone: HashMap::new(),
        interrupt: opts.interrupt,
        mode: opts.mode,
    };

    // Ban the bad word itself and its case variants so a regional or
    // rare variant of it doesn't come back as the top suggestion.
    add_banned(&mut su, badword.clone());
    let one = make_case_word(table, &su.fbadword.clone(), WF_ONECAP);
    add_banned(&mut su, one);
    let all = make_case_word(table, &su.fbadword.clone(), WF_ALLCAP);
    add_banned(&mut su, all);

    suggest_try_special(&mut su);
    suggest_try_change(&mut su);

    let double = su.mode == SuggestMode::Double;
    if double {
        score_comp_sal(&mut su);
    }

    if su.mode != SuggestMode::Fast && su.sallang.is_some() {
        if su.mode == SuggestMode::Best {
            rescore_suggestions(&mut su);
        }
        // Progressively wider sound-a-like searches until enough
        // candidates exist.
        su.maxscore = SCORE_SFMAX1;
        su.sfmaxscore = SCORE_MAXINIT * 3;
        suggest_try_soundalike(&mut su);
        if su.ga.len() < su.clean_count() {
            su.maxscore = SCORE_SFMAX2;
            suggest_try_soundalike(&mut su);
            if su.ga.len() < su.clean_count() {
                su.maxscore = SCORE_SFMAX3;
                suggest_try_soundalike(&mut su);
            }
        }
        su.maxscore = su.sfmaxscore;
    }

    if double {
        combine_double(&mut su);
    } else if !su.ga.is_empty() {
        if su.mode == SuggestMode::Best {
            rescore_suggestions(&mut su);
        }
        check_suggestions(&mut su);
        let max = su.maxscore;
        let count = su.maxcount;
        cleanup_suggestions(&mut su.ga, max, count);
    }

    su.ga
        .into_iter()
        .take(opts.max_count)
        .map(|s| Suggestion {
            word: s.word,
            orig_len: s.orglen,
            score: s.score,
            alt_score: s.altscore,
            sound_based: s.salscore,
        })
        .collect()
}

// ============================================================================
// STRATEGIES
// ============================================================================

/// "the the" and friends: a doubled word suggests one copy.
fn suggest_try_special(su: &mut SugInfo<'_>) {
    let fbad = su.fbadword.clone();
    let Some(space) = fbad.find(' ') else {
        return;
    };
    let (first, rest) = fbad.split_at(space);
    let rest = rest.trim_start_matches(' ');
    if !first.is_empty() && rest == first {
        // Keep the case of the bad word: "The the" -> "The".
        let word = make_case_word(su.table, first, su.badflags);
        let badlen = su.badlen;
        let sallang = su.sallang;
        add_suggestion(su, false, word, badlen, SCORE_REP, 0, true, sallang, false);
    }
}

/// The main edit walk over every language.
fn suggest_try_change(su: &mut SugInfo<'_>) {
    // Modifiable copy of the folded bad word plus folded following text:
    // changing characters after the bad word may help.
    let mut fword = su.fbadword.clone().into_bytes();
    let tail = &su.badptr[su.badlen.min(su.badptr.len())..];
    for c in tail.chars() {
        let f = su.table.fold_char(c);
        if fword.len() + f.len_utf8() > MAXWLEN {
            break;
        }
        let mut buf = [0u8; 4];
        fword.extend_from_slice(f.encode_utf8(&mut buf).as_bytes());
    }

    for lang_idx in 0..su.langs.len() {
        if su.langs[lang_idx].fold.is_empty() {
            continue;
        }
        let mut fword_copy = fword.clone();
        trie_walk::suggest_trie_walk(su, lang_idx, &mut fword_copy, false);
        if su.stopped() {
            break;
        }
    }
}

/// Sound-a-like pass: walk the soundfold trie of each language that has
/// one loaded.
fn suggest_try_soundalike(su: &mut SugInfo<'_>) {
    for lang_idx in 0..su.langs.len() {
        let lang = su.langs[lang_idx];
        if lang.sound.is_none() || lang.sug.loaded().is_none() {
            continue;
        }
        let Some(salword) = lang.sound_fold(&su.fbadword.clone()) else {
            continue;
        };
        let mut sal_bytes = salword.into_bytes();
        trie_walk::suggest_trie_walk(su, lang_idx, &mut sal_bytes, true);
        if su.stopped() {
            break;
        }
    }
}

// ============================================================================
// SUGGESTION LIST MAINTENANCE
// ============================================================================

pub(crate) fn add_banned(su: &mut SugInfo<'_>, word: String) {
    su.banned.insert(word);
}

pub(crate) fn was_banned(su: &SugInfo<'_>, word: &str) -> bool {
    su.banned.contains(word)
}

/// Add one candidate, deduplicating on (word, replaced length) and
/// keeping the better score. `maxsf` selects which limit a cleanup pass
/// tightens.
#[allow(clippy::too_many_arguments)]
pub(crate) fn add_suggestion(
    su: &mut SugInfo<'_>,
    to_sga: bool,
    goodword: String,
    badlenarg: usize,
    score: i32,
    altscore: i32,
    had_bonus: bool,
    lang: Option<usize>,
    maxsf: bool,
) {
    // Minimize the replaced length: drop a common tail so "the the" ->
    // "the" replaces only the dropped part. Keeps equal suggestions
    // comparable.
    let good: Vec<char> = goodword.chars().collect();
    let bad_end = badlenarg.min(su.badptr.len());
    let bad_aligned = su
        .badptr
        .get(..bad_end)
        .map(|s| s.chars().collect::<Vec<char>>())
        .unwrap_or_default();
    let mut goodlen_chars = good.len();
    let mut badlen_chars = bad_aligned.len();
    while goodlen_chars > 0 && badlen_chars > 0 {
        if good[goodlen_chars - 1] != bad_aligned[badlen_chars - 1] {
            break;
        }
        goodlen_chars -= 1;
        badlen_chars -= 1;
    }
    if goodlen_chars == 0 && badlen_chars == 0 {
        // The suggestion changes nothing.
        return;
    }
    let goodlen: usize = good[..goodlen_chars].iter().map(|c| c.len_utf8()).sum();
    let badlen: usize = bad_aligned[..badlen_chars]
        .iter()
        .map(|c| c.len_utf8())
        .sum();
    let word: String = goodword[..goodlen].to_string();

    let pos = {
        let list = if to_sga { &su.sga } else { &su.ga };
        list.iter()
            .position(|s| s.word == word && s.orglen == badlen)
    };
    if let Some(pos) = pos {
        let mut ex = if to_sga {
            su.sga[pos].clone()
        } else {
            su.ga[pos].clone()
        };
        if ex.lang.is_none() {
            ex.lang = lang;
        }
        if ex.score > score {
            let mut new_sug = Sug {
                word,
                orglen: badlen,
                score,
                altscore,
                had_bonus,
                salscore: false,
                lang,
            };
            if ex.had_bonus != had_bonus {
                // Only one of the two has its sound score folded in;
                // compute the other so the comparison is fair.
                if had_bonus {
                    rescore_one(su, &mut ex);
                } else {
                    rescore_one(su, &mut new_sug);
                }
            }
            if ex.score > new_sug.score {
                ex.score = new_sug.score;
                ex.altscore = new_sug.altscore;
                ex.had_bonus = new_sug.had_bonus;
            }
        }
        if to_sga {
            su.sga[pos] = ex;
        } else {
            su.ga[pos] = ex;
        }
        return;
    }

    let entry = Sug {
        word,
        orglen: badlen,
        score,
        altscore,
        had_bonus,
        salscore: false,
        lang,
    };
    let len = if to_sga {
        su.sga.push(entry);
        su.sga.len()
    } else {
        su.ga.push(entry);
        su.ga.len()
    };

    if len > su.max_store() {
        let clean = su.clean_count();
        if maxsf {
            let max = su.sfmaxscore;
            let list = if to_sga { &mut su.sga } else { &mut su.ga };
            su.sfmaxscore = cleanup_suggestions(list, max, clean);
        } else {
            let max = su.maxscore;
            let list = if to_sga { &mut su.sga } else { &mut su.ga };
            su.maxscore = cleanup_suggestions(list, max, clean);
        }
    }
}

/// Sort by score and keep the best `keep`; returns the tightened score
/// limit (one above the worst kept score).
pub(crate) fn cleanup_suggestions(list: &mut Vec<Sug>, maxscore: i32, keep: usize) -> i32 {
    if list.is_empty() {
        return maxscore;
    }
    list.sort_by(|a, b| {
        a.score
            .cmp(&b.score)
            .then(a.altscore.cmp(&b.altscore))
            .then(a.word.to_lowercase().cmp(&b.word.to_lowercase()))
    });
    if list.len() > keep {
        list.truncate(keep);
        return list.last().map_or(maxscore, |s| s.score);
    }
    maxscore
}

/// Drop candidates that, rechecked with their following text, are still
/// spelled wrong (can happen through splits and compounds).
fn check_suggestions(su: &mut SugInfo<'_>) {
    if su.ga.is_empty() {
        return;
    }
    let langs = su.langs;
    let table = su.table;
    let matcher = Matcher::new(langs, table);
    let badptr = su.badptr;
    su.ga.retain(|s| {
        let mut longword = s.word.clone();
        if let Some(tail) = badptr.get(s.orglen.min(badptr.len())..) {
            longword.push_str(tail);
        }
        let mut ok = true;
        let mut pos = 0usize;
        // Check only the suggestion part, like rechecking the line head.
        while pos < s.word.len().min(longword.len()) {
            let r = matcher.check_word(&longword[pos..], false);
            if r.result.needs_attention() {
                ok = false;
                break;
            }
            pos += r.len.max(1);
        }
        ok
    });
}

// ============================================================================
// SOUND SCORES AND RESCORING
// ============================================================================

/// Fold the sound score into every plain suggestion (best mode).
fn rescore_suggestions(su: &mut SugInfo<'_>) {
    if su.sallang.is_none() {
        return;
    }
    for i in 0..su.ga.len() {
        let mut s = su.ga[i].clone();
        rescore_one(su, &mut s);
        su.ga[i] = s;
    }
}

/// Blend one suggestion's score with its sound-a-like score.
pub(crate) fn rescore_one(su: &SugInfo<'_>, sug: &mut Sug) {
    let Some(sallang) = sug.lang.or(su.sallang) else {
        return;
    };
    let lang = su.langs[sallang];
    if lang.sound.is_none() || sug.had_bonus {
        return;
    }
    let badsound = if Some(sallang) == su.sallang {
        su.sal_badword.clone()
    } else {
        lang.sound_fold(&su.fbadword).unwrap_or_default()
    };
    let mut alt = stp_sal_score(su, sug, sallang, &badsound);
    if alt == SCORE_MAXMAX {
        alt = SCORE_BIG;
    }
    sug.altscore = alt;
    sug.score = score_combine(sug.score, alt);
    sug.had_bonus = true;
}

/// Compute sound scores for the `double` list.
fn score_comp_sal(su: &mut SugInfo<'_>) {
    let Some(sallang) = su.sallang else {
        return;
    };
    for i in 0..su.ga.len() {
        let sug = su.ga[i].clone();
        if sug.had_bonus {
            continue;
        }
        let badsound = su.sal_badword.clone();
        let score = stp_sal_score(su, &sug, sallang, &badsound);
        if score < SCORE_MAXMAX {
            su.sga.push(Sug {
                word: sug.word,
                orglen: sug.orglen,
                score,
                altscore: 0,
                had_bonus: false,
                salscore: true,
                lang: Some(sallang),
            });
        }
    }
}

/// Sound-a-like score of one suggestion against the bad word.
fn stp_sal_score(su: &SugInfo<'_>, sug: &Sug, sallang: usize, badsound: &str) -> i32 {
    let lang = su.langs[sallang];
    let folder = CaseFolder::new(su.table);
    let badsound2: String;
    let pbad = if sug.orglen <= su.badlen {
        badsound
    } else {
        // The suggestion replaces text past the bad word; sound-fold
        // that stretch. Remove spaces so joining words scores fairly.
        let span = &su.badptr[..sug.orglen.min(su.badptr.len())];
        let mut fword = folder.fold(span, MAXWLEN).unwrap_or_default();
        if su
            .badptr
            .get(su.badlen..)
            .and_then(|s| s.chars().next())
            .is_some_and(char::is_whitespace)
            && !sug.word.contains(' ')
        {
            fword.retain(|c| c != ' ');
        }
        badsound2 = lang.sound_fold(&fword).unwrap_or_default();
        &badsound2
    };

    let Some(goodsound) = lang.sound_fold(&folder.fold(&sug.word, MAXWLEN).unwrap_or_default())
    else {
        return SCORE_MAXMAX;
    };
    soundalike_score(&goodsound, pbad)
}

/// Edit distance between two sound strings, allowing at most two
/// changes; a vowel-ish `*` at the start is discounted. The cases are
/// enumerated by the length difference so no DP table is needed.
pub(crate) fn soundalike_score(goodstart: &str, badstart: &str) -> i32 {
    // C-string flavoured access: reading past the end yields NUL.
    fn at(s: &[char], i: usize) -> char {
        s.get(i).copied().unwrap_or('\0')
    }
    // Tails compare equal like strcmp() == 0.
    fn tail_eq(a: &[char], ai: usize, b: &[char], bi: usize) -> bool {
        let at_ = a.get(ai.min(a.len())..).unwrap_or(&[]);
        let bt = b.get(bi.min(b.len())..).unwrap_or(&[]);
        at_ == bt
    }

    let mut good: Vec<char> = goodstart.chars().collect();
    let mut bad: Vec<char> = badstart.chars().collect();
    let mut score = 0i32;

    if (at(&bad, 0) == '*' || at(&good, 0) == '*') && at(&bad, 0) != at(&good, 0) {
        if (at(&bad, 0) == '\0' && at(&good, 1) == '\0')
            || (at(&good, 0) == '\0' && at(&bad, 1) == '\0')
        {
            // Changing a one-sound word to a no-sound word.
            return SCORE_DEL;
        }
        if at(&bad, 0) == '\0' || at(&good, 0) == '\0' {
            return SCORE_MAXMAX;
        }
        if at(&bad, 1) == at(&good, 1)
            || (at(&bad, 1) != '\0' && at(&good, 1) != '\0' && at(&bad, 2) == at(&good, 2))
        {
            // Handled like a substitute further down.
        } else {
            score = 2 * SCORE_DEL / 3;
            if at(&bad, 0) == '*' {
                bad.remove(0);
            } else {
                good.remove(0);
            }
        }
    }

    let n = good.len() as i32 - bad.len() as i32;
    if !(-2..=2).contains(&n) {
        return SCORE_MAXMAX;
    }

    // pl is the longer string, ps the shorter.
    let (pl_v, ps_v) = if n > 0 { (good, bad) } else { (bad, good) };
    let mut i = 0usize;
    while at(&pl_v, i) != '\0' && at(&pl_v, i) == at(&ps_v, i) {
        i += 1;
    }
    let pl: Vec<char> = pl_v[i.min(pl_v.len())..].to_vec();
    let ps: Vec<char> = ps_v[i.min(ps_v.len())..].to_vec();

    match n.abs() {
        2 => {
            // Must delete two characters from pl.
            let mut pli = 1usize;
            let mut psi = 0usize;
            while at(&pl, pli) != '\0' && at(&pl, pli) == at(&ps, psi) {
                pli += 1;
                psi += 1;
            }
            if tail_eq(&pl, pli + 1, &ps, psi) {
                return score + SCORE_DEL * 2;
            }
        }
        1 => {
            // Minimal one delete from pl required.
            // 1: delete
            let mut pli = 1usize;
            let mut psi = 0usize;
            loop {
                if at(&pl, pli) != at(&ps, psi) {
                    break;
                }
                if at(&pl, pli) == '\0' {
                    return score + SCORE_DEL;
                }
                pli += 1;
                psi += 1;
            }
            // 2: delete then swap, then rest must be equal
            if at(&pl, pli) == at(&ps, psi + 1)
                && at(&pl, pli + 1) == at(&ps, psi)
                && tail_eq(&pl, pli + 2, &ps, psi + 2)
            {
                return score + SCORE_DEL + SCORE_SWAP;
            }
            // 3: delete then substitute, then the rest must be equal
            if tail_eq(&pl, pli + 1, &ps, psi + 1) {
                return score + SCORE_DEL + SCORE_SUBST;
            }
            // 4: first swap then delete, then the rest must be equal
            if at(&pl, 0) == at(&ps, 1) && at(&pl, 1) == at(&ps, 0) {
                let mut pli = 2usize;
                let mut psi = 2usize;
                while at(&pl, pli) != '\0' && at(&pl, pli) == at(&ps, psi) {
                    pli += 1;
                    psi += 1;
                }
                if tail_eq(&pl, pli + 1, &ps, psi) {
                    return score + SCORE_SWAP + SCORE_DEL;
                }
            }
            // 5: first substitute then delete, then the rest must be equal
            {
                let mut pli = 1usize;
                let mut psi = 1usize;
                while at(&pl, pli) != '\0' && at(&pl, pli) == at(&ps, psi) {
                    pli += 1;
                    psi += 1;
                }
                if tail_eq(&pl, pli + 1, &ps, psi) {
                    return score + SCORE_SUBST + SCORE_DEL;
                }
            }
        }
        0 => {
            // Same length: changes must keep the length.
            // 1: identical
            if at(&pl, 0) == '\0' {
                return score;
            }
            // 2: swap
            if at(&pl, 0) == at(&ps, 1) && at(&pl, 1) == at(&ps, 0) {
                let mut pli = 2usize;
                let mut psi = 2usize;
                loop {
                    if at(&pl, pli) != at(&ps, psi) {
                        break;
                    }
                    if at(&pl, pli) == '\0' {
                        return score + SCORE_SWAP;
                    }
                    pli += 1;
                    psi += 1;
                }
                // 3: swap and swap again
                if at(&pl, pli) == at(&ps, psi + 1)
                    && at(&pl, pli + 1) == at(&ps, psi)
                    && tail_eq(&pl, pli + 2, &ps, psi + 2)
                {
                    return score + SCORE_SWAP + SCORE_SWAP;
                }
                // 4: swap and substitute
                if tail_eq(&pl, pli + 1, &ps, psi + 1) {
                    return score + SCORE_SWAP + SCORE_SUBST;
                }
            }
            // 5: substitute
            let mut pli = 1usize;
            let mut psi = 1usize;
            loop {
                if at(&pl, pli) != at(&ps, psi) {
                    break;
                }
                if at(&pl, pli) == '\0' {
                    return score + SCORE_SUBST;
                }
                pli += 1;
                psi += 1;
            }
            // 6: substitute and swap
            if at(&pl, pli) == at(&ps, psi + 1)
                && at(&pl, pli + 1) == at(&ps, psi)
                && tail_eq(&pl, pli + 2, &ps, psi + 2)
            {
                return score + SCORE_SUBST + SCORE_SWAP;
            }
            // 7: substitute and substitute
            if tail_eq(&pl, pli + 1, &ps, psi + 1) {
                return score + SCORE_SUBST + SCORE_SUBST;
            }
            // 8: insert then delete
            let mut pli = 0usize;
            let mut psi = 1usize;
            while at(&pl, pli) != '\0' && at(&pl, pli) == at(&ps, psi) {
                pli += 1;
                psi += 1;
            }
            if tail_eq(&pl, pli + 1, &ps, psi) {
                return score + crate::scoring::SCORE_INS + SCORE_DEL;
            }
        }
        _ => {}
    }
    SCORE_MAXMAX
}

// ============================================================================
// DOUBLE MODE COMBINING
// ============================================================================

fn combine_double(su: &mut SugInfo<'_>) {
    // Blend scores in both lists, then interleave them, deduplicating.
    for i in 0..su.ga.len() {
        let mut s = su.ga[i].clone();
        if !s.had_bonus {
            rescore_one(su, &mut s);
        }
        s.salscore = false;
        su.ga[i] = s;
    }
    for s in &mut su.sga {
        s.score = score_combine(s.score, s.altscore);
        s.salscore = true;
    }
    check_suggestions(su);
    let max = su.maxscore;
    let count = su.maxcount;
    cleanup_suggestions(&mut su.ga, max, count);
    cleanup_suggestions(&mut su.sga, max, count);

    let mut merged: Vec<Sug> = Vec::with_capacity(su.ga.len() + su.sga.len());
    let longest = su.ga.len().max(su.sga.len());
    for i in 0..longest {
        for round in 0..2 {
            let list = if round == 0 { &su.ga } else { &su.sga };
            if let Some(s) = list.get(i) {
                if !merged.iter().any(|m| m.word == s.word) {
                    merged.push(s.clone());
                }
            }
        }
    }
    merged.truncate(su.maxcount);
    su.ga = merged;
}

// ============================================================================
// SOUND SUGGESTION EXPANSION
// ============================================================================

/// A soundfold-trie match: find every dictionary word with that sound,
/// score it by edit distance and add the survivors.
pub(crate) fn add_sound_suggest(
    su: &mut SugInfo<'_>,
    soundword: &str,
    score: i32,
    lang_idx: usize,
) {
    // The same soundfold word turns up many times with different scores;
    // only expand when it improves.
    match su.sounddone.get(soundword) {
        Some(&prev) if score >= prev => return,
        _ => {}
    }
    su.sounddone.insert(soundword.to_string(), score);

    let lang = su.langs[lang_idx];
    let Some(sug_file) = lang.sug.loaded() else {
        return;
    };
    let Some(sfwordnr) = soundfold_find(&sug_file.trie, soundword.as_bytes()) else {
        return;
    };
    let Some(orgnrs) = sug_file.table.get(sfwordnr as usize) else {
        return;
    };

    for &orgnr in orgnrs.clone().iter() {
        let Some((theword, nul_run)) = word_by_number(&lang.fold, orgnr) else {
            continue;
        };
        let Ok(theword) = String::from_utf8(theword) else {
            continue;
        };

        for &flags_raw in nul_run.iter() {
            let flags = flags_raw;
            if flags & WF_NOSUGGEST != 0 {
                continue;
            }
            let goodword = if flags & WF_KEEPCAP != 0 {
                find_keepcap_word(&lang.keep, &theword, su.table)
                    .unwrap_or_else(|| theword.clone())
            } else {
                let mut f = flags | su.badflags;
                if f & WF_ALLCAP != 0 && su.badlen == first_char_len(&su.badword) {
                    f = (f & !WF_ALLCAP) | WF_ONECAP;
                }
                if f & WF_CAPMASK != 0 {
                    make_case_word(su.table, &theword, f)
                } else {
                    theword.clone()
                }
            };

            if su.mode == SuggestMode::Double {
                if score <= su.maxscore {
                    let badlen = su.badlen;
                    add_suggestion(
                        su,
                        true,
                        goodword,
                        badlen,
                        score,
                        0,
                        false,
                        Some(lang_idx),
                        false,
                    );
                }
                continue;
            }

            let mut goodscore = 0i32;
            if flags & WF_REGION != 0 && !lang.region_visible(((flags >> 16) & 0xFF) as u8) {
                goodscore = crate::scoring::SCORE_REGION;
            }
            // A small penalty for introducing a capital: "tath" -> "path"
            // is likelier than "tath" -> "Kath".
            let gc = goodword.chars().next();
            let bc = su.badword.chars().next();
            if let (Some(gc), Some(bc)) = (gc, bc) {
                if su.table.is_upper_char(gc)
                    && !su.table.is_upper_char(bc)
                    && su.table.fold_char(bc) != su.table.fold_char(gc)
                {
                    goodscore += SCORE_ICASE / 2;
                }
            }

            // Edit-distance the candidate; with a tight limit use the
            // bounded walk, otherwise the full DP.
            let badchars: Vec<char> = su.badword.chars().collect();
            let goodchars: Vec<char> = goodword.chars().collect();
            let map = if lang.map.is_empty() {
                None
            } else {
                Some(&lang.map)
            };
            let limit = (4 * (su.sfmaxscore - goodscore) - score) / 3;
            let edit = if limit > SCORE_LIMITMAX {
                edit_score(map, su.table, &badchars, &goodchars)
            } else {
                edit_score_limit(map, su.table, &badchars, &goodchars, limit)
            };
            let mut goodscore = goodscore + edit;
            if goodscore < SCORE_MAXMAX {
                goodscore = wordcount_adjust(lang, &goodword, false, goodscore);
                goodscore = score_combine(goodscore, score);
                if goodscore <= su.sfmaxscore {
                    let badlen = su.badlen;
                    add_suggestion(
                        su,
                        false,
                        goodword,
                        badlen,
                        goodscore,
                        score,
                        true,
                        Some(lang_idx),
                        true,
                    );
                }
            }
        }
    }
}

/// Find the tree-order word number of an exact soundfold word in the
/// sug trie. Requires subtree counts in the node slots (see
/// `TrieStore::store_subtree_counts`): siblings sorting before the
/// matched byte contribute their whole subtree.
fn soundfold_find(store: &TrieStore, word: &[u8]) -> Option<u32> {
    let byts = store.byts();
    let idxs = store.idxs();
    if byts.is_empty() {
        return None;
    }
    let mut arridx = 0usize;
    let mut wlen = 0usize;
    let mut wordnr = 0u32;
    loop {
        let len = *byts.get(arridx)? as usize;
        arridx += 1;
        let mut len = len;
        let c = word.get(wlen).copied().unwrap_or(0);
        if byts.get(arridx) == Some(&0) {
            if c == 0 {
                return Some(wordnr);
            }
            // A shorter word ends here and sorts before ours.
            while len > 0 && byts.get(arridx) == Some(&0) {
                arridx += 1;
                len -= 1;
            }
            if len == 0 {
                return None;
            }
            wordnr += 1;
        }
        if c == 0 {
            return None;
        }
        let c = if c == b'\t' { b' ' } else { c };
        // Walk the siblings in order: earlier branches add their counts.
        let sibs = byts.get(arridx..arridx + len)?;
        let mut next = None;
        for (i, &b) in sibs.iter().enumerate() {
            if b == c {
                next = Some(*idxs.get(arridx + i)? as usize);
                break;
            }
            if b > c {
                break;
            }
            let child = *idxs.get(arridx + i)? as usize;
            wordnr += *idxs.get(child)?;
        }
        arridx = next?;
        wlen += 1;
        if c == b' ' {
            while matches!(word.get(wlen), Some(b' ') | Some(b'\t')) {
                wlen += 1;
            }
        }
    }
}

/// Look up word number `orgnr` in a fold trie whose node slots carry
/// subtree word counts (see `TrieStore::store_subtree_counts`). Returns
/// the word bytes and the packed values of its NUL run.
fn word_by_number(store: &TrieStore, orgnr: u32) -> Option<(Vec<u8>, Vec<u32>)> {
    let byts = store.byts();
    let idxs = store.idxs();
    if byts.is_empty() {
        return None;
    }
    let mut n = 0usize;
    let mut wordcount = 0u32;
    let mut word: Vec<u8> = Vec::new();
    for _ in 0..MAXWLEN {
        let count = *byts.get(n)? as usize;
        if byts.get(n + 1) == Some(&0) {
            if wordcount == orgnr {
                // Collect the NUL run values.
                let mut vals = Vec::new();
                let mut i = 1;
                while i <= count && byts.get(n + i) == Some(&0) {
                    vals.push(*idxs.get(n + i)?);
                    i += 1;
                }
                return Some((word, vals));
            }
            wordcount += 1;
        }
        // Skip the NUL siblings, then pick the child whose subtree holds
        // the target number.
        let mut i = 1usize;
        while i <= count && byts.get(n + i) == Some(&0) {
            i += 1;
        }
        let mut chosen = None;
        while i <= count {
            let child = *idxs.get(n + i)? as usize;
            let wc = *idxs.get(child)?;
            if wordcount + wc > orgnr {
                chosen = Some((n + i, child));
                break;
            }
            wordcount += wc;
            i += 1;
        }
        let (slot, child) = chosen?;
        word.push(byts[slot]);
        n = child;
    }
    None
}

/// Find the keep-case spelling of a folded word by walking the keep-case
/// tree, trying the folded and upper-case variant of every character.
pub(crate) fn find_keepcap_word(keep: &TrieStore, fword: &str, table: &CharTable) -> Option<String> {
    if keep.is_empty() {
        return None;
    }
    let byts = keep.byts();
    let idxs = keep.idxs();
    let fchars: Vec<char> = fword.chars().collect();

    struct Frame {
        arridx: usize,
        round: u8,
        fidx: usize,
        klen: usize,
    }
    let mut kword: Vec<u8> = Vec::new();
    let mut stack = vec![Frame {
        arridx: 0,
        round: 0,
        fidx: 0,
        klen: 0,
    }];

    while let Some(top) = stack.last_mut() {
        if top.fidx >= fchars.len() {
            if byts.get(top.arridx + 1) == Some(&0) {
                kword.truncate(top.klen);
                return String::from_utf8(kword).ok();
            }
            stack.pop();
            continue;
        }
        top.round += 1;
        if top.round > 2 {
            stack.pop();
            continue;
        }
        let fc = fchars[top.fidx];
        let c = if top.round == 1 {
            fc
        } else {
            table.unfold_char(fc)
        };
        let mut buf = [0u8; 4];
        let bytes = c.encode_utf8(&mut buf).as_bytes().to_vec();

        // Walk all bytes of this character down the tree.
        let mut tryidx = top.arridx;
        let mut ok = true;
        for &b in &bytes {
            let Some(&len) = byts.get(tryidx) else {
                ok = false;
                break;
            };
            let len = len as usize;
            let Some(sibs) = byts.get(tryidx + 1..tryidx + 1 + len) else {
                ok = false;
                break;
            };
            let nuls = sibs.iter().take_while(|&&x| x == 0).count();
            match sibs[nuls..].binary_search(&b) {
                Ok(at) => {
                    tryidx = idxs[tryidx + 1 + nuls + at] as usize;
                }
                Err(_) => {
                    ok = false;
                    break;
                }
            }
        }
        if ok {
            let fidx = top.fidx;
            let klen = top.klen;
            kword.truncate(klen);
            kword.extend_from_slice(&bytes);
            let new_klen = kword.len();
            stack.push(Frame {
                arridx: tryidx,
                round: 0,
                fidx: fidx + 1,
                klen: new_klen,
            });
        }
    }
    None
}

// ============================================================================
// CASE HELPERS
// ============================================================================

/// Capital pattern of the bad word as WF_* flags, including the MIXCAP
/// refinement for hopeless mixes.
pub(crate) fn badword_captype(table: &CharTable, word: &str) -> u32 {
    let folder = CaseFolder::new(table);
    let cap = folder.case_type(word);
    let mut flags = cap.as_flags();
    if cap == CaseType::KeepCap {
        let mut upper = 0usize;
        let mut lower = 0usize;
        let mut first_upper = false;
        for (i, c) in word.chars().enumerate() {
            if table.is_upper_char(c) {
                upper += 1;
                if i == 0 {
                    first_upper = true;
                }
            } else {
                lower += 1;
            }
        }
        if upper > lower && upper > 2 {
            flags |= WF_ALLCAP;
        } else if first_upper {
            flags |= WF_ONECAP;
        }
        if upper >= 2 && lower >= 2 {
            flags |= WF_MIXCAP;
        }
    }
    flags
}

/// Apply WF case flags to a folded word.
pub(crate) fn make_case_word(table: &CharTable, word: &str, flags: u32) -> String {
    let folder = CaseFolder::new(table);
    if flags & WF_ALLCAP != 0 {
        folder.apply_case(word, CaseType::AllCap)
    } else if flags & (WF_ONECAP | WF_KEEPCAP) != 0 {
        folder.apply_case(word, CaseType::OneCap)
    } else {
        word.to_string()
    }
}

pub(crate) fn captype_flags(table: &CharTable, word: &str) -> u32 {
    CaseFolder::new(table).case_type(word).as_flags()
}

/// Penalty when the candidate's case does not match the bad word's.
pub(crate) fn case_score_penalty(table: &CharTable, badflags: u32, preword: &str) -> i32 {
    if spell_valid_case(badflags, captype_flags(table, preword)) {
        0
    } else {
        SCORE_ICASE
    }
}

fn first_char_len(s: &str) -> usize {
    s.chars().next().map_or(0, char::len_utf8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trie::TrieBuilder;

    fn lang_of(words: &[&str]) -> Language {
        let mut lang = Language::new("en", "en.spl");
        let mut b = TrieBuilder::new();
        let mut sorted: Vec<&str> = words.to_vec();
        sorted.sort_unstable();
        for w in sorted {
            b.insert(w.as_bytes(), 0);
        }
        lang.fold = b.finish();
        lang
    }

    fn run(lang: &Language, text: &str, badlen: usize) -> Vec<Suggestion> {
        let langs = [lang];
        let table = CharTable::default();
        suggest(
            &langs,
            &table,
            text,
            badlen,
            &SuggestOptions {
                mode: SuggestMode::Fast,
                max_count: 10,
                ..SuggestOptions::default()
            },
        )
    }

    #[test]
    fn delete_suggestion_scores_del() {
        let lang = lang_of(&["the", "these", "theses"]);
        let sugs = run(&lang, "thes", 4);
        assert!(!sugs.is_empty());
        // "the" is one delete away, "these" one insert; delete is cheaper
        // so "the" ranks first with exactly the delete cost.
        assert_eq!(sugs[0].word, "the");
        assert_eq!(sugs[0].score, SCORE_DEL);
        assert!(sugs.iter().any(|s| s.word == "these"));
        let these = sugs.iter().find(|s| s.word == "these").unwrap();
        assert_eq!(these.score, crate::scoring::SCORE_INS);
    }

    #[test]
    fn scores_are_sorted_and_bounded() {
        let lang = lang_of(&["the", "these", "theses", "thesis", "them", "then"]);
        let sugs = run(&lang, "thes", 4);
        assert!(sugs.len() <= 10);
        for w in sugs.windows(2) {
            assert!(w[0].score <= w[1].score);
        }
    }

    #[test]
    fn banned_words_never_show_up() {
        use crate::types::{WordMeta, WF_BANNED};
        let mut lang = Language::new("en", "en.spl");
        let mut b = TrieBuilder::new();
        b.insert(b"thee", 0);
        b.insert(
            b"thes",
            WordMeta {
                flags: WF_BANNED,
                region: 0,
                affix_id: 0,
            }
            .encode(),
        );
        lang.fold = b.finish();
        let sugs = run(&lang, "thex", 4);
        assert!(sugs.iter().all(|s| s.word != "thes"));
    }

    #[test]
    fn the_the_suggests_single_copy() {
        let lang = lang_of(&["the"]);
        let table = CharTable::default();
        let langs = [&lang];
        let sugs = suggest(
            &langs,
            &table,
            "the the",
            7,
            &SuggestOptions {
                mode: SuggestMode::Fast,
                max_count: 5,
                ..SuggestOptions::default()
            },
        );
        // The common tail is trimmed: dropping the duplicate is stored as
        // replacing the first "the " with nothing, at the repeat cost.
        let drop = sugs.iter().find(|s| s.word.is_empty());
        let drop = drop.expect("duplicate-word suggestion present");
        assert_eq!(drop.orig_len, 4);
        assert_eq!(drop.score, SCORE_REP);
    }

    #[test]
    fn case_of_bad_word_is_kept() {
        let lang = lang_of(&["these"]);
        let sugs = run(&lang, "Thes", 4);
        assert!(sugs.iter().any(|s| s.word == "These"), "sugs: {:?}", sugs);
    }

    #[test]
    fn soundalike_score_basics() {
        assert_eq!(soundalike_score("NT", "NT"), 0);
        assert_eq!(soundalike_score("NT", "N"), SCORE_DEL);
        assert_eq!(soundalike_score("NT", "TN"), SCORE_SWAP);
        assert_eq!(soundalike_score("NT", "NX"), SCORE_SUBST);
        assert_eq!(soundalike_score("ABCDEF", "XYZUVW"), SCORE_MAXMAX);
    }

    #[test]
    fn badword_captype_classifies() {
        let t = CharTable::default();
        assert_eq!(badword_captype(&t, "word"), 0);
        assert_eq!(badword_captype(&t, "Word"), WF_ONECAP);
        assert_eq!(badword_captype(&t, "WORD"), WF_ALLCAP);
        // Mostly upper: suggest all-caps too.
        let f = badword_captype(&t, "WOrDS");
        assert!(f & WF_KEEPCAP != 0);
        assert!(f & WF_ALLCAP != 0);
        let f = badword_captype(&t, "maCAroni");
        assert!(f & WF_MIXCAP != 0);
    }

    #[test]
    fn word_by_number_walks_counted_trie() {
        let mut b = TrieBuilder::new();
        for w in ["ape", "bee", "cat"] {
            b.insert(w.as_bytes(), 0);
        }
        let mut store = b.finish();
        store.store_subtree_counts();
        assert_eq!(word_by_number(&store, 0).unwrap().0, b"ape".to_vec());
        assert_eq!(word_by_number(&store, 1).unwrap().0, b"bee".to_vec());
        assert_eq!(word_by_number(&store, 2).unwrap().0, b"cat".to_vec());
        assert!(word_by_number(&store, 3).is_none());
    }

    #[test]
    fn find_keepcap_word_restores_case() {
        let mut b = TrieBuilder::new();
        b.insert(b"NASA", 0);
        b.insert(b"iPod", 0);
        let keep = b.finish();
        let t = CharTable::default();
        assert_eq!(find_keepcap_word(&keep, "nasa", &t).as_deref(), Some("NASA"));
        assert_eq!(find_keepcap_word(&keep, "ipod", &t).as_deref(), Some("iPod"));
        assert_eq!(find_keepcap_word(&keep, "none", &t), None);
    }
}
