// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Property tests for the invariants the engine promises.

mod common;

use std::io::Cursor;

use proptest::prelude::*;
use proptest::string::string_regex;

use common::{engine_of, lang_with_words, spl_bytes};
use spelt::binary::read_spell_data;
use spelt::fuzzy::{edit_score, edit_score_limit};
use spelt::phonetic::SofoMap;
use spelt::scoring::SCORE_MAXMAX;
use spelt::{CharTable, TrieBuilder};

fn word_strategy() -> impl Strategy<Value = String> {
    string_regex("[a-z]{1,10}").unwrap()
}

fn word_set_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(word_strategy(), 1..20)
}

proptest! {
    #[test]
    fn edit_score_zero_iff_equal(a in word_strategy(), b in word_strategy()) {
        let t = CharTable::default();
        let ac: Vec<char> = a.chars().collect();
        let bc: Vec<char> = b.chars().collect();
        let s = edit_score(None, &t, &ac, &bc);
        prop_assert_eq!(s == 0, a == b);
        prop_assert!(s >= 0);
    }

    #[test]
    fn edit_score_symmetric_for_equal_lengths(a in word_strategy(), b in word_strategy()) {
        // Substitution, case and swap costs are symmetric; only the
        // delete/insert pair differs, which equal lengths cannot use in
        // unequal numbers.
        prop_assume!(a.chars().count() == b.chars().count());
        let t = CharTable::default();
        let ac: Vec<char> = a.chars().collect();
        let bc: Vec<char> = b.chars().collect();
        prop_assert_eq!(
            edit_score(None, &t, &ac, &bc),
            edit_score(None, &t, &bc, &ac)
        );
    }

    #[test]
    fn edit_score_limit_agrees(a in word_strategy(), b in word_strategy(), limit in 0i32..500) {
        let t = CharTable::default();
        let ac: Vec<char> = a.chars().collect();
        let bc: Vec<char> = b.chars().collect();
        let full = edit_score(None, &t, &ac, &bc);
        let bounded = edit_score_limit(None, &t, &ac, &bc, limit);
        // The bounded variant returns the true score or the sentinel,
        // nothing else.
        prop_assert!(bounded == full || bounded == SCORE_MAXMAX);
        if full <= limit {
            prop_assert_eq!(bounded, full);
        } else {
            prop_assert_eq!(bounded, SCORE_MAXMAX);
        }
    }

    #[test]
    fn sofo_fold_is_idempotent(word in word_strategy()) {
        // A canonical table: every output char maps to itself.
        let map = SofoMap::new(
            "abcdefghijklmnopqrstuvwxyzABCDLMRS",
            "ABCAABCCACCLMMABCRSDABCCASABCDLMRS",
        )
        .unwrap();
        let once = map.fold(&word);
        prop_assert_eq!(map.fold(&once), once.clone());
    }

    #[test]
    fn trie_roundtrips_words(words in word_set_strategy()) {
        let mut sorted: Vec<String> = words.clone();
        sorted.sort();
        sorted.dedup();
        let mut b = TrieBuilder::new();
        for w in &sorted {
            b.insert(w.as_bytes(), 0);
        }
        let store = b.finish();
        let mut out = Vec::new();
        store.for_each_word(|w, _| out.push(String::from_utf8(w.to_vec()).unwrap()));
        prop_assert_eq!(out, sorted);
    }

    #[test]
    fn spell_file_roundtrip_preserves_dump(words in word_set_strategy()) {
        let refs: Vec<&str> = words.iter().map(String::as_str).collect();
        let lang = lang_with_words(&refs);
        let bytes = spl_bytes(&lang);
        let back = read_spell_data(&mut Cursor::new(&bytes), "mem.spl", "en").unwrap();

        let dump = |l: &spelt::Language| {
            let mut v = Vec::new();
            l.fold.for_each_word(|w, f| v.push((w.to_vec(), f)));
            v.sort();
            v
        };
        prop_assert_eq!(dump(&lang), dump(&back));
    }

    #[test]
    fn checking_agrees_with_membership(words in word_set_strategy(), probe in word_strategy()) {
        let refs: Vec<&str> = words.iter().map(String::as_str).collect();
        let engine = engine_of(lang_with_words(&refs));
        let known = words.iter().any(|w| *w == probe);
        let r = engine.check_word(&format!("{} ", probe));
        prop_assert_eq!(r.result == spelt::SpellResult::Good, known);
    }

    #[test]
    fn suggestions_sorted_bounded_and_exclude_bad_word(
        words in word_set_strategy(),
        probe in word_strategy(),
        max in 1usize..10,
    ) {
        let refs: Vec<&str> = words.iter().map(String::as_str).collect();
        let mut engine = engine_of(lang_with_words(&refs));
        engine.set_spellsuggest("fast").unwrap();
        let r = engine.check_word(&format!("{} ", probe));
        prop_assume!(r.result != spelt::SpellResult::Good);

        let sugs = engine.suggestions(&probe, max, false);
        prop_assert!(sugs.len() <= max);
        for w in sugs.windows(2) {
            prop_assert!(w[0].score <= w[1].score);
        }
        for s in &sugs {
            prop_assert_ne!(&s.word, &probe);
        }
    }
}
