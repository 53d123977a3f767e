// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Benchmarks for the hot paths: word classification and suggesting.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use spelt::{Engine, Language, TrieBuilder};

fn build_engine(word_count: usize) -> Engine {
    // A synthetic dictionary with predictable shared prefixes.
    let mut words: Vec<String> = Vec::with_capacity(word_count);
    let stems = ["walk", "talk", "lock", "spell", "check", "found", "light"];
    let tails = ["", "s", "ed", "ing", "er", "ers", "able", "ment"];
    'outer: for i in 0.. {
        for stem in &stems {
            for tail in &tails {
                words.push(format!("{}{}{}", stem, tail, if i == 0 { String::new() } else { i.to_string() }));
                if words.len() >= word_count {
                    break 'outer;
                }
            }
        }
    }
    words.sort();
    words.dedup();

    let mut lang = Language::new("bench", "bench://dict");
    let mut b = TrieBuilder::new();
    for w in &words {
        b.insert(w.as_bytes(), 0);
    }
    lang.fold = b.finish();

    let mut e = Engine::new();
    e.adopt_language(lang);
    e.set_spellsuggest("fast").unwrap();
    e
}

fn bench_check(c: &mut Criterion) {
    let engine = build_engine(5_000);
    c.bench_function("check_word_hit", |b| {
        b.iter(|| black_box(engine.check_word(black_box("walking "))))
    });
    c.bench_function("check_word_miss", |b| {
        b.iter(|| black_box(engine.check_word(black_box("wlaking "))))
    });
    c.bench_function("check_line", |b| {
        b.iter(|| {
            black_box(engine.check_line(black_box(
                "walking and tlaking while spelling checks the lockers",
            )))
        })
    });
}

fn bench_suggest(c: &mut Criterion) {
    let engine = build_engine(5_000);
    c.bench_function("suggest_one_edit", |b| {
        b.iter(|| black_box(engine.suggestions(black_box("walkin"), 10, false)))
    });
    c.bench_function("suggest_two_edits", |b| {
        b.iter(|| black_box(engine.suggestions(black_box("wlakimg"), 10, false)))
    });
}

criterion_group!(benches, bench_check, bench_suggest);
criterion_main!(benches);
