// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! End-to-end word classification: the concrete dictionary scenarios.

mod common;

use common::{engine_of, lang_with_flagged, lang_with_words, meta};
use spelt::lang::CompoundInfo;
use spelt::types::{MAXWLEN, WF_KEEPCAP};
use spelt::{DictBuilder, SpellResult};

#[test]
fn scenario_plain_english_words() {
    // {"the", "these", "theses"}: "the" is good, "thes" is bad.
    let engine = engine_of(lang_with_words(&["the", "these", "theses"]));
    assert_eq!(engine.check_word("the ").result, SpellResult::Good);
    assert_eq!(engine.check_word("these ").result, SpellResult::Good);
    assert_eq!(engine.check_word("theses ").result, SpellResult::Good);
    let r = engine.check_word("thes ");
    assert_eq!(r.result, SpellResult::Bad);
    assert_eq!(r.len, 4);
}

#[test]
fn scenario_compound_football() {
    // COMPOUNDFLAG on {"foot","ball"}: "football" good, "ballfoot" bad
    // when the rule demands foot-first.
    let mut lang = lang_with_flagged(&[("foot", meta(0, 0, b's')), ("ball", meta(0, 0, b'e'))]);
    lang.compound = Some(CompoundInfo::from_raw(
        MAXWLEN,
        1,
        MAXWLEN,
        0,
        vec![],
        b"se".to_vec(),
    ));
    let engine = engine_of(lang);
    assert_eq!(engine.check_word("football ").result, SpellResult::Good);
    assert_eq!(engine.check_word("ballfoot ").result, SpellResult::Bad);
}

#[test]
fn scenario_regions_color_colour() {
    // Region table "usgb": "color" in region 1, "colour" in region 2.
    // With gb active: color is local, colour is good.
    let mut lang = lang_with_flagged(&[("color", meta(0, 0x01, 0)), ("colour", meta(0, 0x02, 0))]);
    lang.regions = vec!["us".into(), "gb".into()];
    lang.region_mask = 0x02;
    let engine = engine_of(lang);
    assert_eq!(engine.check_word("color ").result, SpellResult::Local);
    assert_eq!(engine.check_word("colour ").result, SpellResult::Good);
}

#[test]
fn keepcase_through_the_keep_tree() {
    let mut lang = lang_with_flagged(&[("nasa", meta(WF_KEEPCAP, 0, 0))]);
    let mut keep = spelt::TrieBuilder::new();
    keep.insert(b"NASA", 0);
    lang.keep = keep.finish();
    let engine = engine_of(lang);
    assert_eq!(engine.check_word("NASA ").result, SpellResult::Good);
    assert_eq!(engine.check_word("nasa ").result, SpellResult::Bad);
}

#[test]
fn numbers_and_blanks() {
    let engine = engine_of(lang_with_words(&["gpp"]));
    assert_eq!(engine.check_word("12345 "), spelt::CheckedWord::good(5));
    assert_eq!(engine.check_word("0xFF99 "), spelt::CheckedWord::good(6));
    // "3gpp": digits pass, the word part is found.
    assert_eq!(engine.check_word("3gpp ").result, SpellResult::Good);
    assert_eq!(engine.check_word(" x"), spelt::CheckedWord::good(1));
}

#[test]
fn too_long_words_are_bad_without_a_walk() {
    let engine = engine_of(lang_with_words(&["the"]));
    let long = "x".repeat(300);
    let r = engine.check_word(&long);
    assert_eq!(r.result, SpellResult::Bad);
    assert_eq!(r.len, 300);
}

#[test]
fn affix_compiled_dictionary_checks() {
    let data = spelt::AffixData::parse(
        "SFX S Y 2\nSFX S 0 s [^s]\nSFX S 0 es s\nPFX U Y 1\nPFX U 0 un .\n",
    )
    .unwrap();
    let mut b = DictBuilder::new(&data);
    b.add_word("walk", "US").unwrap();
    b.add_word("talk", "S").unwrap();
    let engine = engine_of(b.build("en"));

    for good in ["walk", "walks", "unwalk", "unwalks", "talk", "talks"] {
        assert_eq!(
            engine.check_word(&format!("{} ", good)).result,
            SpellResult::Good,
            "{}",
            good
        );
    }
    for bad in ["untalk", "walkes", "stalk"] {
        assert_eq!(
            engine.check_word(&format!("{} ", bad)).result,
            SpellResult::Bad,
            "{}",
            bad
        );
    }
}

#[test]
fn checkcompoundpattern_blocks_junctions() {
    let mut lang = lang_with_flagged(&[("ba", meta(0, 0, b'f')), ("foot", meta(0, 0, b'f'))]);
    lang.compound = Some(CompoundInfo::from_raw(
        MAXWLEN,
        1,
        MAXWLEN,
        0,
        vec![b"ba".to_vec(), b"fo".to_vec()],
        b"f+".to_vec(),
    ));
    let engine = engine_of(lang);
    // "bafoot" hits the forbidden (end "ba", begin "fo") junction.
    assert_eq!(engine.check_word("bafoot ").result, SpellResult::Bad);
    // Reversed order has no matching pattern.
    assert_eq!(engine.check_word("footba ").result, SpellResult::Good);
}

#[test]
fn compound_word_count_limit() {
    let mut lang = lang_with_flagged(&[("ab", meta(0, 0, b'f'))]);
    lang.compound = Some(CompoundInfo::from_raw(
        2,
        1,
        MAXWLEN,
        0,
        vec![],
        b"f+".to_vec(),
    ));
    let engine = engine_of(lang);
    assert_eq!(engine.check_word("abab ").result, SpellResult::Good);
    // Three segments exceed COMPOUNDWORDMAX 2.
    assert_eq!(engine.check_word("ababab ").result, SpellResult::Bad);
}
