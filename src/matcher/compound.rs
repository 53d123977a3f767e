// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Compound-word rule checks.
//!
//! A compound is a run of dictionary words glued together, each carrying
//! a compound flag (stored in the affix-ID byte of its word entry). The
//! matcher collects the flag of every segment; these functions decide
//! whether the sequence is legal.

use crate::lang::Language;
use crate::types::MAXWLEN;

/// Quick prune while the compound is still growing: can `flags` be the
/// start of any COMPOUNDRULE? Works on the raw rule string and therefore
/// only when no rule uses wildcards; with wildcards present it cannot
/// prune and reports "maybe".
pub fn match_compoundrule(lang: &Language, flags: &[u8]) -> bool {
    let Some(comp) = &lang.compound else {
        return false;
    };
    let Some(rules) = &comp.rules_plain else {
        return true;
    };
    let mut p = 0usize;
    loop {
        let mut i = 0usize;
        let mut q = p;
        let matched = loop {
            let Some(&c) = flags.get(i) else {
                // All collected flags matched a rule head.
                break true;
            };
            match rules.get(q) {
                None | Some(&b'/') => break false,
                Some(&b'[') => {
                    q += 1;
                    let mut hit = false;
                    while let Some(&rc) = rules.get(q) {
                        if rc == b']' {
                            break;
                        }
                        if rc == c {
                            hit = true;
                        }
                        q += 1;
                    }
                    if !hit {
                        break false;
                    }
                }
                Some(&rc) if rc != c => break false,
                _ => {}
            }
            i += 1;
            q += 1;
        };
        if matched {
            return true;
        }
        match rules[p..].iter().position(|&c| c == b'/') {
            Some(n) => p += n + 1,
            None => return false,
        }
    }
}

/// Full acceptance check for a finished compound: the flag sequence must
/// match a COMPOUNDRULE; when the syllable count overflows the limit the
/// word count decides instead.
pub fn can_compound(lang: &Language, word: &str, flags: &[u8]) -> bool {
    let Some(comp) = &lang.compound else {
        return false;
    };
    let Some(prog) = &comp.program else {
        return false;
    };
    let fchars: Vec<char> = flags.iter().map(|&b| b as char).collect();
    if !prog.matches(&fchars) {
        return false;
    }
    if comp.syl_max < MAXWLEN
        && !lang.syllable.is_empty()
        && lang.syllable.count(word) > comp.syl_max
    {
        return flags.len() < comp.max_words;
    }
    true
}

/// CHECKCOMPOUNDPATTERN: does any (end, begin) pair straddle the
/// junction at byte offset `wlen` of `word`?
pub fn match_checkcompoundpattern(lang: &Language, word: &[u8], wlen: usize) -> bool {
    let Some(comp) = &lang.compound else {
        return false;
    };
    if wlen > word.len() {
        return false;
    }
    let mut i = 0;
    while i + 1 < comp.patterns.len() {
        let begin = &comp.patterns[i + 1];
        if word[wlen..].starts_with(begin) {
            let end = &comp.patterns[i];
            if end.len() <= wlen && word[wlen - end.len()..wlen] == end[..] {
                return true;
            }
        }
        i += 2;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::CompoundInfo;

    fn lang_with_rules(rules: &[u8], patterns: Vec<Vec<u8>>) -> Language {
        let mut lang = Language::new("en", "en.spl");
        lang.compound = Some(CompoundInfo::from_raw(
            4,
            1,
            MAXWLEN,
            0,
            patterns,
            rules.to_vec(),
        ));
        lang
    }

    #[test]
    fn prefix_prune_follows_rules() {
        let lang = lang_with_rules(b"sme/xy", vec![]);
        assert!(match_compoundrule(&lang, b"s"));
        assert!(match_compoundrule(&lang, b"sm"));
        assert!(match_compoundrule(&lang, b"sme"));
        assert!(match_compoundrule(&lang, b"x"));
        assert!(!match_compoundrule(&lang, b"sx"));
        assert!(!match_compoundrule(&lang, b"e"));
    }

    #[test]
    fn prefix_prune_with_classes() {
        let lang = lang_with_rules(b"[ab]c", vec![]);
        assert!(match_compoundrule(&lang, b"a"));
        assert!(match_compoundrule(&lang, b"bc"));
        assert!(!match_compoundrule(&lang, b"c"));
    }

    #[test]
    fn wildcards_disable_pruning() {
        let lang = lang_with_rules(b"f+", vec![]);
        // Cannot prune, must answer "maybe".
        assert!(match_compoundrule(&lang, b"zzz"));
    }

    #[test]
    fn can_compound_matches_full_rule() {
        let lang = lang_with_rules(b"f+", vec![]);
        assert!(can_compound(&lang, "football", b"ff"));
        assert!(!can_compound(&lang, "football", b"fx"));
    }

    #[test]
    fn can_compound_syllable_overflow_uses_word_count() {
        let mut lang = lang_with_rules(b"f+", vec![]);
        if let Some(c) = &mut lang.compound {
            c.syl_max = 2;
            c.max_words = 3;
        }
        lang.syllable = crate::lang::SylTable::from_raw("aeiou");
        // "fafefifo" has 4 syllables > 2; flags len 2 < 3: still allowed.
        assert!(can_compound(&lang, "fafefifo", b"ff"));
        // Flag count at the limit: rejected.
        assert!(!can_compound(&lang, "fafefifo", b"fff"));
    }

    #[test]
    fn checkcompoundpattern_matches_junction() {
        let lang = lang_with_rules(b"f+", vec![b"ba".to_vec(), b"fo".to_vec()]);
        assert!(match_checkcompoundpattern(&lang, b"bafoot", 2));
        assert!(!match_checkcompoundpattern(&lang, b"bafoot", 3));
    }
}
