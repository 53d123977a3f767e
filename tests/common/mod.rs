// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Shared helpers for the integration tests: build small dictionaries in
//! memory and as `.spl` byte images.
#![allow(dead_code)]

use spelt::binary::{write_spell_data, write_tree};
use spelt::types::WordMeta;
use spelt::{Engine, Language, TrieBuilder};

/// A language with plain words in the fold-case tree.
pub fn lang_with_words(words: &[&str]) -> Language {
    lang_with_flagged(&words.iter().map(|&w| (w, 0u32)).collect::<Vec<_>>())
}

/// A language with (word, packed flags) entries.
pub fn lang_with_flagged(words: &[(&str, u32)]) -> Language {
    let mut lang = Language::new("en", "test://en");
    let mut sorted: Vec<(&str, u32)> = words.to_vec();
    sorted.sort_by_key(|&(w, _)| w);
    let mut b = TrieBuilder::new();
    for (w, v) in sorted {
        b.insert(w.as_bytes(), v);
    }
    lang.fold = b.finish();
    lang
}

/// Convenience: pack WordMeta fields.
pub fn meta(flags: u32, region: u8, affix_id: u8) -> u32 {
    WordMeta {
        flags,
        region,
        affix_id,
    }
    .encode()
}

/// Serialize a language to `.spl` bytes.
pub fn spl_bytes(lang: &Language) -> Vec<u8> {
    let mut buf = Vec::new();
    write_spell_data(&mut buf, lang).unwrap();
    buf
}

/// An engine with one adopted language.
pub fn engine_of(lang: Language) -> Engine {
    let mut e = Engine::new();
    e.adopt_language(lang);
    e
}

/// Hand-assemble a minimal `.spl` image: header, given raw sections,
/// then the three trees.
pub fn assemble_spl(sections: &[(u8, u8, Vec<u8>)], fold_words: &[&str]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"VIMspell");
    buf.push(50);
    for (id, flags, payload) in sections {
        buf.push(*id);
        buf.push(*flags);
        buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        buf.extend_from_slice(payload);
    }
    buf.push(255);

    let mut b = TrieBuilder::new();
    let mut sorted = fold_words.to_vec();
    sorted.sort_unstable();
    for w in sorted {
        b.insert(w.as_bytes(), 0);
    }
    let fold = b.finish();
    write_tree(&mut buf, &fold, false).unwrap();
    write_tree(&mut buf, &TrieBuilder::new().finish(), false).unwrap();
    write_tree(&mut buf, &TrieBuilder::new().finish(), true).unwrap();
    buf
}
