// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Sound folding: mapping a word to a phonetic key so that "night" and
//! "knight" collide.
//!
//! Two schemes exist and a dictionary carries at most one:
//!
//! * **SOFO** is a plain character translation table, cheap and
//!   idempotent.
//! * **SAL** is the Aspell phonet rule engine: ordered rules with a lead
//!   string, an optional one-of class, anchor/priority marks and a
//!   replacement. Rules are matched greedily at each position, optionally
//!   refined by a higher-priority follow-up rule, with `<` marking
//!   back-tracking rules that rewrite the input in place.
//!
//! Inputs of any width go through one Unicode-scalar-value path; the rule
//! structures themselves are width-agnostic.

use std::collections::HashMap;

use crate::binary::header::{SAL_COLLAPSE, SAL_F0LLOWUP, SAL_REM_ACCENTS};
use crate::types::MAXWLEN;
use crate::util::CharTable;

/// The sound-folding scheme of one language.
#[derive(Debug, Clone, Default)]
pub enum SoundFolding {
    /// Dictionary has no sound folding; sound-a-like suggestions are off.
    #[default]
    None,
    Sofo(SofoMap),
    Sal(SalRules),
}

impl SoundFolding {
    pub fn is_none(&self) -> bool {
        matches!(self, SoundFolding::None)
    }

    /// Fold `word` (already case-folded) into its phonetic key.
    pub fn fold(&self, word: &str, table: &CharTable) -> String {
        match self {
            SoundFolding::None => String::new(),
            SoundFolding::Sofo(map) => map.fold(word),
            SoundFolding::Sal(rules) => rules.fold(word, table),
        }
    }
}

// ============================================================================
// SOFO
// ============================================================================

/// Simple character translation table (SOFOFROM/SOFOTO).
#[derive(Debug, Clone)]
pub struct SofoMap {
    /// Raw strings, kept verbatim for the file writer.
    pub from: String,
    pub to: String,
    /// Translation for scalar values below 256; NUL means "drop".
    low: [char; 256],
    /// Translation for everything else; absent means "drop".
    wide: HashMap<char, char>,
}

impl SofoMap {
    /// Build from the two mapping strings. They must hold the same number
    /// of scalar values.
    pub fn new(from: &str, to: &str) -> Option<SofoMap> {
        if from.chars().count() != to.chars().count() {
            return None;
        }
        let mut low = ['\0'; 256];
        let mut wide = HashMap::new();
        for (f, t) in from.chars().zip(to.chars()) {
            let cp = f as u32;
            if cp < 256 {
                low[cp as usize] = t;
            } else {
                wide.insert(f, t);
            }
        }
        Some(SofoMap {
            from: from.to_string(),
            to: to.to_string(),
            low,
            wide,
        })
    }

    /// Translate character by character, dropping unmapped characters and
    /// collapsing consecutive identical outputs.
    pub fn fold(&self, word: &str) -> String {
        let mut out = String::new();
        let mut prev = '\0';
        for mut c in word.chars() {
            if c.is_whitespace() {
                c = ' ';
            } else {
                let cp = c as u32;
                c = if cp < 256 {
                    self.low[cp as usize]
                } else {
                    self.wide.get(&c).copied().unwrap_or('\0')
                };
            }
            if c != '\0' && c != prev {
                if out.len() + c.len_utf8() > MAXWLEN {
                    break;
                }
                out.push(c);
                prev = c;
            }
        }
        out
    }
}

// ============================================================================
// SAL
// ============================================================================

/// One phonet rule, split out of its `from` string.
#[derive(Debug, Clone)]
pub struct SalRule {
    /// Raw from/to strings as stored in the file, for the writer.
    pub from: String,
    pub to: String,
    /// Leading literal characters.
    lead: Vec<char>,
    /// Characters of a `(abc)` class following the lead, if any.
    oneof: Option<Vec<char>>,
    /// Trailing marks: digits (priority), `-`, `<`, `^`, `$`.
    rules: Vec<char>,
    /// Replacement characters.
    to_chars: Vec<char>,
}

impl SalRule {
    /// Split a raw `from` string: lead up to the first special character,
    /// optional `(...)` class, remaining marks.
    pub fn parse(from: &str, to: &str) -> SalRule {
        let chars: Vec<char> = from.chars().collect();
        let mut i = 0;
        let mut lead = Vec::new();
        while i < chars.len() && !"0123456789(-<^$".contains(chars[i]) {
            lead.push(chars[i]);
            i += 1;
        }
        let mut oneof = None;
        if i < chars.len() && chars[i] == '(' {
            i += 1;
            let mut class = Vec::new();
            while i < chars.len() && chars[i] != ')' {
                class.push(chars[i]);
                i += 1;
            }
            if i < chars.len() {
                i += 1;
            }
            oneof = Some(class);
        }
        let rules: Vec<char> = chars[i..].to_vec();
        SalRule {
            from: from.to_string(),
            to: to.to_string(),
            lead,
            oneof,
            rules,
            to_chars: to.chars().collect(),
        }
    }

    fn first_low_byte(&self) -> Option<u8> {
        self.lead.first().map(|&c| (c as u32 & 0xFF) as u8)
    }
}

/// The ordered SAL rule set plus its option flags.
#[derive(Debug, Clone)]
pub struct SalRules {
    pub followup: bool,
    pub collapse: bool,
    pub rem_accents: bool,
    rules: Vec<SalRule>,
    /// Index of the first rule per low byte of the lead, -1 when none.
    /// Rules sharing a low byte are kept adjacent, preserving file order.
    first: [i32; 256],
}

impl SalRules {
    pub fn new(flags: u8, mut rules: Vec<SalRule>) -> SalRules {
        // Group rules by the low byte of their first lead char, stable.
        let mut grouped: Vec<SalRule> = Vec::with_capacity(rules.len());
        let mut order: Vec<u8> = Vec::new();
        for r in &rules {
            if let Some(b) = r.first_low_byte() {
                if !order.contains(&b) {
                    order.push(b);
                }
            }
        }
        for b in order {
            let mut i = 0;
            while i < rules.len() {
                if rules[i].first_low_byte() == Some(b) {
                    grouped.push(rules.remove(i));
                } else {
                    i += 1;
                }
            }
        }
        // Rules with an empty lead never match; keep them for the writer.
        grouped.append(&mut rules);

        let mut first = [-1i32; 256];
        for (i, r) in grouped.iter().enumerate() {
            if let Some(b) = r.first_low_byte() {
                if first[b as usize] < 0 {
                    first[b as usize] = i as i32;
                }
            }
        }
        SalRules {
            followup: flags & SAL_F0LLOWUP != 0,
            collapse: flags & SAL_COLLAPSE != 0,
            rem_accents: flags & SAL_REM_ACCENTS != 0,
            rules: grouped,
            first,
        }
    }

    pub fn flags_byte(&self) -> u8 {
        let mut f = 0;
        if self.followup {
            f |= SAL_F0LLOWUP;
        }
        if self.collapse {
            f |= SAL_COLLAPSE;
        }
        if self.rem_accents {
            f |= SAL_REM_ACCENTS;
        }
        f
    }

    pub fn rules(&self) -> &[SalRule] {
        &self.rules
    }

    /// The phonet algorithm, ported rule-for-rule from the Aspell
    /// phonet.cpp lineage. Operates on scalar values; a char without any
    /// applicable rule is dropped, which is why real SAL tables carry a
    /// trivial identity rule for every letter.
    pub fn fold(&self, word: &str, table: &CharTable) -> String {
        // Strip accents / non-word characters when configured, keeping
        // single spaces.
        let mut w: Vec<char> = Vec::with_capacity(word.len());
        if self.rem_accents {
            let mut did_white = false;
            for c in word.chars() {
                if c.is_whitespace() {
                    if did_white {
                        continue;
                    }
                    w.push(' ');
                    did_white = true;
                } else {
                    did_white = false;
                    if table.is_word_char(c) {
                        w.push(strip_accent(c));
                    }
                }
            }
        } else {
            w.extend(word.chars());
        }

        let is_word = |w: &[char], at: usize| -> bool {
            w.get(at).is_some_and(|&c| table.is_word_char(c))
        };

        let mut res: Vec<char> = Vec::new();
        let mut i = 0usize;
        // The k/p0/z trio carries state across loop iterations exactly as
        // the original does: k is the matched length, p0 the first mark
        // of the last inspected rule (0 allows emission), z the
        // just-backtracked latch.
        let mut z = false;
        let mut k: usize = 0;
        let mut p0: i32 = -333;

        while i < w.len() {
            let mut c = Some(w[i]);
            let mut z0 = false;

            let low = (w[i] as u32 & 0xFF) as usize;
            let mut n = self.first[low];
            if n >= 0 {
                'rules: while (n as usize) < self.rules.len() {
                    let rule = &self.rules[n as usize];
                    let Some(&first) = rule.lead.first() else {
                        break;
                    };
                    if (first as u32 & 0xFF) as usize != low {
                        break;
                    }
                    n += 1;

                    if first != w[i] {
                        continue;
                    }
                    k = rule.lead.len();
                    if k > 1 {
                        if w.get(i + 1) != rule.lead.get(1) {
                            continue;
                        }
                        for j in 2..k {
                            if w.get(i + j) != rule.lead.get(j) {
                                continue 'rules;
                            }
                        }
                    }
                    if let Some(class) = &rule.oneof {
                        match w.get(i + k) {
                            Some(next) if class.contains(next) => k += 1,
                            _ => continue,
                        }
                    }

                    let mut s = rule.rules.as_slice();
                    let mut pri = 5i32;
                    p0 = s.first().map_or(0, |&c| c as i32);
                    let k0 = k;
                    while s.first() == Some(&'-') && k > 1 {
                        k -= 1;
                        s = &s[1..];
                    }
                    if s.first() == Some(&'<') {
                        s = &s[1..];
                    }
                    if let Some(d) = s.first().and_then(|c| c.to_digit(10)) {
                        pri = d as i32;
                        s = &s[1..];
                    }
                    if s.first() == Some(&'^') && s.get(1) == Some(&'^') {
                        s = &s[1..];
                    }

                    let anchored_ok = s.is_empty()
                        || (s.first() == Some(&'^')
                            && (i == 0 || !(w[i - 1] == ' ' || is_word(&w, i - 1)))
                            && (s.get(1) != Some(&'$') || !is_word(&w, i + k0)))
                        || (s.first() == Some(&'$')
                            && i > 0
                            && is_word(&w, i - 1)
                            && !is_word(&w, i + k0));
                    if !anchored_ok {
                        continue;
                    }

                    // Follow-up rule check: a rule starting at the last
                    // matched char may take precedence over this one.
                    let c0 = w[i + k - 1];
                    let low0 = (c0 as u32 & 0xFF) as usize;
                    let mut n0 = self.first[low0];
                    if self.followup
                        && k > 1
                        && n0 >= 0
                        && p0 != '-' as i32
                        && w.get(i + k).is_some()
                    {
                        let mut fits = false;
                        'follow: while (n0 as usize) < self.rules.len() {
                            let fr = &self.rules[n0 as usize];
                            let Some(&ffirst) = fr.lead.first() else {
                                break;
                            };
                            if (ffirst as u32 & 0xFF) as usize != low0 {
                                break;
                            }
                            n0 += 1;
                            if ffirst != c0 {
                                continue;
                            }
                            let mut fk = fr.lead.len();
                            if fk > 1 {
                                if w.get(i + k) != fr.lead.get(1) {
                                    continue;
                                }
                                for j in 2..fk {
                                    if w.get(i + k + j - 1) != fr.lead.get(j) {
                                        continue 'follow;
                                    }
                                }
                            }
                            fk += k - 1;
                            if let Some(class) = &fr.oneof {
                                match w.get(i + fk) {
                                    Some(next) if class.contains(next) => fk += 1,
                                    _ => continue,
                                }
                            }

                            // p0 is clobbered here on purpose, like the
                            // original: it keeps the follow-up priority.
                            p0 = 5;
                            let mut fs = fr.rules.as_slice();
                            while fs.first() == Some(&'-') {
                                fs = &fs[1..];
                            }
                            if fs.first() == Some(&'<') {
                                fs = &fs[1..];
                            }
                            if let Some(d) = fs.first().and_then(|c| c.to_digit(10)) {
                                p0 = d as i32;
                                fs = &fs[1..];
                            }

                            if fs.is_empty()
                                || (fs.first() == Some(&'$') && !is_word(&w, i + fk))
                            {
                                if fk == k {
                                    // Only a piece of the string.
                                    continue;
                                }
                                if p0 < pri {
                                    continue;
                                }
                                fits = true;
                                break;
                            }
                        }
                        if fits {
                            continue;
                        }
                    }

                    // The rule applies: emit or rewrite.
                    let to = rule.to_chars.clone();
                    p0 = i32::from(rule.rules.contains(&'<'));
                    if p0 == 1 && !z {
                        // '<' rule: rewrite the input in place and re-run
                        // from the same position.
                        if !res.is_empty()
                            && !to.is_empty()
                            && (res.last() == Some(&w[i]) || res.last() == to.first())
                        {
                            res.pop();
                        }
                        z0 = true;
                        z = true;
                        let mut wrote = 0usize;
                        for &t in &to {
                            if i + wrote >= w.len() {
                                break;
                            }
                            w[i + wrote] = t;
                            wrote += 1;
                        }
                        if k > wrote {
                            w.drain(i + wrote..i + k);
                        }
                        c = Some(w[i]);
                    } else {
                        // Plain rule: append all but the final replacement
                        // char, which becomes the new current char and is
                        // emitted by the shared tail below.
                        i += k - 1;
                        z = false;
                        let mut ws = to.as_slice();
                        while ws.len() > 1 && res.len() < MAXWLEN {
                            if res.last() != ws.first() {
                                res.push(ws[0]);
                            }
                            ws = &ws[1..];
                        }
                        c = ws.first().copied();
                        if rule.rules.windows(2).any(|p| p == ['^', '^']) {
                            if let Some(nc) = c {
                                res.push(nc);
                            }
                            w.drain(..(i + 1).min(w.len()));
                            i = 0;
                            z0 = true;
                        }
                    }
                    break;
                }
            } else if w[i].is_whitespace() {
                c = Some(' ');
                k = 1;
            }

            if !z0 {
                if k != 0 && p0 == 0 && res.len() < MAXWLEN {
                    if let Some(c) = c {
                        if !self.collapse || res.last() != Some(&c) {
                            res.push(c);
                        }
                    }
                }
                i += 1;
                z = false;
                k = 0;
            }
        }

        res.into_iter().collect()
    }
}

/// Accent removal for the SAL `rem_accents` option: NFD-decompose and
/// drop combining marks.
#[cfg(feature = "unicode-normalization")]
fn strip_accent(c: char) -> char {
    use unicode_normalization::UnicodeNormalization;
    c.to_string()
        .nfd()
        .find(|d| !is_combining_mark(*d))
        .unwrap_or(c)
}

#[cfg(not(feature = "unicode-normalization"))]
fn strip_accent(c: char) -> char {
    c
}

/// Combining marks have Unicode category Mn (Mark, Nonspacing).
#[cfg(feature = "unicode-normalization")]
fn is_combining_mark(c: char) -> bool {
    matches!(c,
        '\u{0300}'..='\u{036F}' |  // Combining Diacritical Marks
        '\u{1DC0}'..='\u{1DFF}' |  // Combining Diacritical Marks Supplement
        '\u{20D0}'..='\u{20FF}' |  // Combining Diacritical Marks for Symbols
        '\u{FE20}'..='\u{FE2F}'    // Combining Half Marks
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CharTable {
        CharTable::default()
    }

    #[test]
    fn sofo_translates_and_collapses() {
        let map = SofoMap::new("abcdef", "*BC**B").unwrap();
        // Doubles collapse, unmapped chars drop.
        assert_eq!(map.fold("aabbcc"), "*BC");
        assert_eq!(map.fold("axb"), "*B");
    }

    #[test]
    fn sofo_rejects_length_mismatch() {
        assert!(SofoMap::new("abc", "xy").is_none());
    }

    #[test]
    fn sofo_idempotent_on_canonical_table() {
        // A table whose image maps to itself, as real SOFO tables do.
        let from = "abcdefghijklmnopqrstuvwxyzABCDLMRS";
        let to = "ABCAABCCACCLMMABCRSDABCCASABCDLMRS";
        let map = SofoMap::new(from, to).unwrap();
        let once = map.fold("hello");
        assert_eq!(map.fold(&once), once);
    }

    #[test]
    fn sal_rule_parsing() {
        let r = SalRule::parse("SCH(EOU)-", "SK");
        assert_eq!(r.lead, vec!['S', 'C', 'H']);
        assert_eq!(r.oneof.as_deref(), Some(&['E', 'O', 'U'][..]));
        assert_eq!(r.rules, vec!['-']);

        let r = SalRule::parse("GH^", "G");
        assert_eq!(r.lead, vec!['G', 'H']);
        assert!(r.oneof.is_none());
        assert_eq!(r.rules, vec!['^']);
    }

    #[test]
    fn sal_basic_substitution() {
        // KN at word start folds to N: "knight" and "night" collide.
        let rules = vec![
            SalRule::parse("KN^", "N"),
            SalRule::parse("K", "K"),
            SalRule::parse("N", "N"),
            SalRule::parse("IGHT", "T"),
            SalRule::parse("I", "I"),
            SalRule::parse("G", "K"),
            SalRule::parse("H", "H"),
            SalRule::parse("T", "T"),
        ];
        let sal = SalRules::new(0, rules);
        let t = table();
        assert_eq!(sal.fold("KNIGHT", &t), sal.fold("NIGHT", &t));
        assert_eq!(sal.fold("NIGHT", &t), "NT");
    }

    #[test]
    fn sal_oneof_class() {
        let rules = vec![
            SalRule::parse("C(EIY)", "S"),
            SalRule::parse("C", "K"),
            SalRule::parse("A", "A"),
            SalRule::parse("E", "E"),
            SalRule::parse("T", "T"),
        ];
        let sal = SalRules::new(0, rules);
        let t = table();
        // "CE" matches the one-of rule and eats both chars.
        assert_eq!(sal.fold("CE", &t), "S");
        assert_eq!(sal.fold("CA", &t), "KA");
    }

    #[test]
    fn sal_preserves_spaces() {
        let rules = vec![SalRule::parse("A", "A"), SalRule::parse("B", "B")];
        let sal = SalRules::new(0, rules);
        let t = table();
        assert_eq!(sal.fold("AB BA", &t), "AB BA");
    }

    #[test]
    fn sal_grouping_keeps_order() {
        let rules = vec![
            SalRule::parse("AX", "1"),
            SalRule::parse("B", "2"),
            SalRule::parse("A", "3"),
        ];
        let sal = SalRules::new(0, rules);
        // Both A rules are adjacent, AX before A (file order).
        assert_eq!(sal.rules()[0].from, "AX");
        assert_eq!(sal.rules()[1].from, "A");
        assert_eq!(sal.rules()[2].from, "B");
    }
}
