// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The score table behind suggestion ranking. Lower is better.
//!
//! These constants are calibrated against each other, not freestanding:
//! a REP replacement (65) must beat a plain substitution (93), a
//! substitution must beat delete+insert (190), a split (149) must beat
//! two substitutions. Changing one value reorders suggestion lists in
//! ways that look arbitrary to users, so don't.
//!
//! The initial limit of 350 allows roughly three changes. Sound-a-like
//! walks get their own, looser ceilings (SFMAX1..3) because soundfold
//! words are short and collisions are the point.

use crate::lang::Language;
use crate::types::Suggestion;

// =============================================================================
// EDIT OPERATION COSTS
// =============================================================================

/// Insert a space, try the parts as two words.
pub const SCORE_SPLIT: i32 = 149;
/// As SCORE_SPLIT when the language has NOSPLITSUGS.
pub const SCORE_SPLIT_NO: i32 = 249;
/// Case-only difference.
pub const SCORE_ICASE: i32 = 52;
/// Word valid in another region.
pub const SCORE_REGION: i32 = 200;
/// Word is marked rare.
pub const SCORE_RARE: i32 = 180;
/// Swap two adjacent characters.
pub const SCORE_SWAP: i32 = 75;
/// Swap characters two positions apart, and three-char rotations.
pub const SCORE_SWAP3: i32 = 110;
/// Replacement from the REP table.
pub const SCORE_REP: i32 = 65;
/// Substitute one character.
pub const SCORE_SUBST: i32 = 93;
/// Substitute with a MAP-similar character.
pub const SCORE_SIMILAR: i32 = 33;
/// Delete a character.
pub const SCORE_DEL: i32 = 94;
/// Delete a duplicated character.
pub const SCORE_DELDUP: i32 = 66;
/// Delete a composing character.
pub const SCORE_DELCOMP: i32 = 28;
/// Insert a character.
pub const SCORE_INS: i32 = 96;
/// Insert a duplicate of the neighbouring character.
pub const SCORE_INSDUP: i32 = 67;
/// Insert a composing character.
pub const SCORE_INSCOMP: i32 = 33;
/// A bad word that is a non-word becoming a word.
pub const SCORE_NONWORD: i32 = 103;

/// The cheapest change; used to prune near the limit.
pub const SCORE_EDIT_MIN: i32 = SCORE_SIMILAR;

// =============================================================================
// LIMITS AND BONUSES
// =============================================================================

/// Initial maximum score: allows about three changes.
pub const SCORE_MAXINIT: i32 = 350;

/// Common-word bonuses, by occurrence-count band.
pub const SCORE_COMMON1: i32 = 30;
pub const SCORE_COMMON2: i32 = 40;
pub const SCORE_COMMON3: i32 = 50;
/// Word count at or above which COMMON2 applies.
pub const SCORE_THRES2: u16 = 10;
/// Word count at or above which COMMON3 applies.
pub const SCORE_THRES3: u16 = 100;

/// Sound-a-like walk ceilings, applied progressively until enough
/// candidates exist.
pub const SCORE_SFMAX1: i32 = 200;
pub const SCORE_SFMAX2: i32 = 300;
pub const SCORE_SFMAX3: i32 = 400;

/// "No score under the limit exists"; also the banned-word sentinel.
pub const SCORE_MAXMAX: i32 = 999_999;
/// Ceiling used when tightening the limit after a cleanup.
pub const SCORE_LIMITMAX: i32 = 350;

/// A big but not maximal score for keeping bad candidates comparable.
pub const SCORE_BIG: i32 = SCORE_INS * 3;

// =============================================================================
// RESCORING
// =============================================================================

/// Weighted combination of edit score and sound-a-like score used in
/// `best` mode.
pub fn score_combine(score: i32, sound_score: i32) -> i32 {
    (score * 3 + sound_score) / 4
}

/// Re-score one suggestion once its sound-a-like score is known. The
/// plain score moves to `alt_score` duty via the caller.
pub fn rescore_one(sug: &mut Suggestion, sound_score: i32) {
    if !sug.sound_based {
        sug.score = score_combine(sug.score, sound_score);
        sug.alt_score = sound_score;
    }
}

/// Subtract the common-word bonus for `word` when the language counts it;
/// halved when the suggestion needed a split.
pub fn wordcount_adjust(lang: &Language, word: &str, split: bool, score: i32) -> i32 {
    let Some(&count) = lang.word_count.get(word) else {
        return score;
    };
    let bonus = if count < SCORE_THRES2 {
        SCORE_COMMON1
    } else if count < SCORE_THRES3 {
        SCORE_COMMON2
    } else {
        SCORE_COMMON3
    };
    let bonus = if split { bonus / 2 } else { bonus };
    score - bonus
}

/// Final ordering: score, then alt score, then the word itself so equal
/// scores come out deterministic.
pub fn suggestion_order(a: &Suggestion, b: &Suggestion) -> std::cmp::Ordering {
    a.score
        .cmp(&b.score)
        .then(a.alt_score.cmp(&b.alt_score))
        .then(a.word.cmp(&b.word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_weights_edit_score_higher() {
        assert_eq!(score_combine(100, 0), 75);
        assert_eq!(score_combine(0, 100), 25);
        assert_eq!(score_combine(94, 94), 94);
    }

    #[test]
    fn wordcount_bands() {
        let mut lang = Language::new("en", "en.spl");
        lang.count_common_word("the", 5);
        assert_eq!(wordcount_adjust(&lang, "the", false, 100), 100 - SCORE_COMMON1);
        lang.count_common_word("the", 20);
        assert_eq!(wordcount_adjust(&lang, "the", false, 100), 100 - SCORE_COMMON2);
        lang.count_common_word("the", 200);
        assert_eq!(wordcount_adjust(&lang, "the", false, 100), 100 - SCORE_COMMON3);
        // Split suggestions get half the bonus.
        assert_eq!(
            wordcount_adjust(&lang, "the", true, 100),
            100 - SCORE_COMMON3 / 2
        );
        assert_eq!(wordcount_adjust(&lang, "absent", false, 100), 100);
    }

    #[test]
    fn ordering_breaks_ties_deterministically() {
        let mk = |w: &str, s: i32, alt: i32| Suggestion {
            word: w.into(),
            orig_len: 4,
            score: s,
            alt_score: alt,
            sound_based: false,
        };
        let mut v = vec![mk("b", 10, 5), mk("a", 10, 5), mk("c", 10, 2), mk("d", 5, 9)];
        v.sort_by(suggestion_order);
        let words: Vec<&str> = v.iter().map(|s| s.word.as_str()).collect();
        assert_eq!(words, vec!["d", "c", "a", "b"]);
    }
}
