// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Damerau-Levenshtein with the suggestion cost table, twice.
//!
//! `edit_score` is the full O(nm) DP: exact, allocates the whole matrix,
//! used when a candidate is definitely going to be scored. Costs are NOT
//! symmetric on purpose: deleting a surplus char from the typed word (94)
//! is judged slightly more likely than the dictionary word carrying one
//! extra (96).
//!
//! `edit_score_limit` answers the cheaper question "is the distance under
//! this limit, and if so what is it": a depth-first walk over an explicit
//! stack that abandons any branch reaching the limit. With the usual
//! limits this touches a fraction of the matrix. Returns `SCORE_MAXMAX`
//! when nothing under the limit exists, so callers can compare scores
//! without an Option dance.

use crate::lang::SimilarMap;
use crate::scoring::{
    SCORE_DEL, SCORE_EDIT_MIN, SCORE_ICASE, SCORE_INS, SCORE_MAXMAX, SCORE_SIMILAR, SCORE_SUBST,
    SCORE_SWAP,
};
use crate::util::CharTable;

/// Exact weighted distance between `bad` and `good`.
pub fn edit_score(
    map: Option<&SimilarMap>,
    table: &CharTable,
    bad: &[char],
    good: &[char],
) -> i32 {
    let blen = bad.len();
    let glen = good.len();
    let width = glen + 1;
    let mut dp = vec![0i32; (blen + 1) * width];

    for j in 1..=glen {
        dp[j] = dp[j - 1] + SCORE_DEL;
    }
    for i in 1..=blen {
        dp[i * width] = dp[(i - 1) * width] + SCORE_INS;
        for j in 1..=glen {
            let bc = bad[i - 1];
            let gc = good[j - 1];
            if bc == gc {
                dp[i * width + j] = dp[(i - 1) * width + j - 1];
                continue;
            }
            // Substitution, cheaper for case-only or MAP-similar chars.
            let subst = if table.fold_char(bc) == table.fold_char(gc) {
                SCORE_ICASE
            } else if map.is_some_and(|m| m.similar(gc, bc)) {
                SCORE_SIMILAR
            } else {
                SCORE_SUBST
            };
            let mut best = subst + dp[(i - 1) * width + j - 1];

            if i > 1 && j > 1 && bc == good[j - 2] && gc == bad[i - 2] {
                let t = SCORE_SWAP + dp[(i - 2) * width + j - 2];
                if t < best {
                    best = t;
                }
            }
            let t = SCORE_DEL + dp[(i - 1) * width + j];
            if t < best {
                best = t;
            }
            let t = SCORE_INS + dp[i * width + j - 1];
            if t < best {
                best = t;
            }
            dp[i * width + j] = best;
        }
    }
    dp[blen * width + glen]
}

struct LimitFrame {
    badi: usize,
    goodi: usize,
    score: i32,
}

/// Bounded variant: the true score when it is at or below `limit`,
/// otherwise `SCORE_MAXMAX`.
pub fn edit_score_limit(
    map: Option<&SimilarMap>,
    table: &CharTable,
    bad: &[char],
    good: &[char],
    limit: i32,
) -> i32 {
    let mut stack: Vec<LimitFrame> = Vec::with_capacity(10);
    let mut bi = 0usize;
    let mut gi = 0usize;
    let mut score = 0i32;
    let mut minscore = limit + 1;

    'outer: loop {
        // Skip the equal run; the score does not change there.
        loop {
            match (bad.get(bi), good.get(gi)) {
                (Some(&bc), Some(&gc)) if bc == gc => {
                    bi += 1;
                    gi += 1;
                }
                (None, None) => {
                    if score < minscore {
                        minscore = score;
                    }
                    match stack.pop() {
                        Some(f) => {
                            bi = f.badi;
                            gi = f.goodi;
                            score = f.score;
                            continue 'outer;
                        }
                        None => break 'outer,
                    }
                }
                _ => break,
            }
        }

        let popped = match (bad.get(bi).copied(), good.get(gi).copied()) {
            (Some(_), None) => {
                // Good word ended: delete the rest of the bad word.
                let mut over = false;
                while bi < bad.len() {
                    score += SCORE_DEL;
                    if score >= minscore {
                        over = true;
                        break;
                    }
                    bi += 1;
                }
                if !over {
                    minscore = score;
                }
                true
            }
            (None, Some(_)) => {
                // Bad word ended: insert the rest of the good word.
                let mut over = false;
                while gi < good.len() {
                    score += SCORE_INS;
                    if score >= minscore {
                        over = true;
                        break;
                    }
                    gi += 1;
                }
                if !over {
                    minscore = score;
                }
                true
            }
            (Some(bc), Some(gc)) => {
                // Both continue: queue delete and insert, then do the
                // cheapest op (swap or substitute) in place.
                for round in 0..2usize {
                    let score_off = score + if round == 0 { SCORE_DEL } else { SCORE_INS };
                    if score_off >= minscore {
                        continue;
                    }
                    if score_off + SCORE_EDIT_MIN >= minscore {
                        // Too close to the limit for further edits: the
                        // remainders must match exactly.
                        let mut bi2 = bi + 1 - round;
                        let mut gi2 = gi + round;
                        loop {
                            match (bad.get(bi2), good.get(gi2)) {
                                (None, None) => {
                                    minscore = score_off;
                                    break;
                                }
                                (Some(b2), Some(g2)) if b2 == g2 => {
                                    bi2 += 1;
                                    gi2 += 1;
                                }
                                _ => break,
                            }
                        }
                    } else {
                        stack.push(LimitFrame {
                            badi: bi + 1 - round,
                            goodi: gi + round,
                            score: score_off,
                        });
                    }
                }

                if score + SCORE_SWAP < minscore
                    && good.get(gi + 1) == Some(&bc)
                    && bad.get(bi + 1) == Some(&gc)
                {
                    // A swap makes both pairs match; the substitution
                    // path cannot beat it, skip both chars.
                    bi += 2;
                    gi += 2;
                    score += SCORE_SWAP;
                    continue 'outer;
                }

                score += if table.fold_char(bc) == table.fold_char(gc) {
                    SCORE_ICASE
                } else if map.is_some_and(|m| m.similar(gc, bc)) {
                    SCORE_SIMILAR
                } else {
                    SCORE_SUBST
                };
                if score < minscore {
                    bi += 1;
                    gi += 1;
                    continue 'outer;
                }
                true
            }
            (None, None) => unreachable!("equal run loop handles double end"),
        };

        if popped {
            match stack.pop() {
                Some(f) => {
                    bi = f.badi;
                    gi = f.goodi;
                    score = f.score;
                }
                None => break,
            }
        }
    }

    if minscore > limit {
        SCORE_MAXMAX
    } else {
        minscore
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn score(a: &str, b: &str) -> i32 {
        edit_score(None, &CharTable::default(), &chars(a), &chars(b))
    }

    fn score_limit(a: &str, b: &str, limit: i32) -> i32 {
        edit_score_limit(None, &CharTable::default(), &chars(a), &chars(b), limit)
    }

    #[test]
    fn identical_is_zero() {
        assert_eq!(score("hello", "hello"), 0);
        assert_eq!(score("", ""), 0);
    }

    #[test]
    fn single_operations() {
        assert_eq!(score("thes", "the"), SCORE_DEL);
        assert_eq!(score("thes", "these"), SCORE_INS);
        assert_eq!(score("cat", "cut"), SCORE_SUBST);
        assert_eq!(score("teh", "the"), SCORE_SWAP);
        assert_eq!(score("Cat", "cat"), SCORE_ICASE);
    }

    #[test]
    fn similar_chars_cost_less() {
        let map = SimilarMap::from_map_str("aàá");
        let t = CharTable::default();
        let s = edit_score(Some(&map), &t, &chars("càt"), &chars("cat"));
        assert_eq!(s, SCORE_SIMILAR);
    }

    #[test]
    fn multibyte_words_score_per_char() {
        assert_eq!(score("naïve", "naive"), SCORE_SUBST);
    }

    #[test]
    fn limit_variant_agrees_under_limit() {
        let cases = [
            ("thes", "these"),
            ("thes", "the"),
            ("cat", "cut"),
            ("teh", "the"),
            ("banana", "bananas"),
            ("color", "colour"),
            ("abcdef", "abcdef"),
        ];
        for (a, b) in cases {
            let full = score(a, b);
            assert_eq!(score_limit(a, b, full + 1), full, "{} vs {}", a, b);
            assert_eq!(score_limit(a, b, full), full, "{} vs {}", a, b);
            if full > 0 {
                assert_eq!(score_limit(a, b, full - 1), SCORE_MAXMAX, "{} vs {}", a, b);
            }
        }
    }

    #[test]
    fn limit_variant_rejects_far_words() {
        assert_eq!(score_limit("abcdef", "xyzuvw", 100), SCORE_MAXMAX);
    }

    #[test]
    fn swap_beats_double_subst() {
        // "ab" -> "ba" is one swap, not two substitutions.
        assert_eq!(score("ab", "ba"), SCORE_SWAP);
        assert_eq!(score_limit("ab", "ba", 100), SCORE_SWAP);
    }
}
