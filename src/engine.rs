// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The engine: one value that owns every loaded language and drives
//! checking and suggesting over the active set.
//!
//! There is deliberately no global state: hosts create an [`Engine`],
//! point it at dictionaries (directly by path or through a
//! [`RuntimePath`] resolver and a `spelllang` spec) and call methods on
//! it. Reloading swaps a language's interior in place so handles stay
//! valid; a half-cleared language simply matches nothing while the
//! re-read runs.
//!
//! The engine is single-threaded by design; the only cross-thread
//! affordance is the cooperative interrupt flag polled by the
//! suggestion walk.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::binary::{read_spell_file, sug::read_sug_file, sug::SugState};
use crate::error::{Result, SpellError};
use crate::lang::Language;
use crate::matcher::Matcher;
use crate::suggest::{suggest, SuggestMode, SuggestOptions};
use crate::trie::CompressLimits;
use crate::types::{CheckedWord, SpellResult, Suggestion, WordMeta, MAXWLEN};
use crate::util::{CaseFolder, CharTable};

/// Handle to one loaded language.
pub type LanguageHandle = usize;

/// Host collaborator: hands out buffer lines for error scanning.
pub trait LineSource {
    fn line_count(&self) -> usize;
    /// 0-based line access.
    fn line(&self, lnum: usize) -> Option<&str>;
    /// Is the position just after a sentence end (capitalisation is
    /// expected next)? Default: never.
    fn is_sentence_end(&self, _lnum: usize, _col: usize) -> bool {
        false
    }
}

/// Host collaborator: locates `spell/<name>.<enc>.spl` files.
pub trait RuntimePath {
    fn find_spell_file(&self, name: &str, encoding: &str) -> Option<PathBuf>;
}

/// A `spelllang` entry after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LangSpec {
    /// Direct path to a `.spl` file.
    File(String),
    /// Language name with optional region ("en", "en_us").
    Name { name: String, region: Option<String> },
    /// The special `cjk` entry: no checking for East-Asian scripts.
    Cjk,
}

/// Parsed `spellsuggest` option.
#[derive(Debug, Clone, Default)]
pub struct SuggestConfig {
    pub mode: SuggestMode,
    /// Candidate-count override from a bare number.
    pub max_count: Option<usize>,
    /// `expr:`/`file:` tokens, handled by the host.
    pub external: Vec<String>,
}

#[derive(Default)]
pub struct Engine {
    langs: Vec<Language>,
    /// Indices of the active languages, in `spelllang` order.
    active: Vec<usize>,
    table: CharTable,
    have_table: bool,
    cjk: bool,
    suggest_cfg: SuggestConfig,
    compress: CompressLimits,
    break_flag: AtomicBool,
}

impl Engine {
    pub fn new() -> Engine {
        Engine {
            compress: CompressLimits::default(),
            ..Engine::default()
        }
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Load (or reload) a `.spl` file. The language becomes active.
    pub fn load_language(&mut self, path: &Path, name: &str) -> Result<LanguageHandle> {
        let path_str = path.display().to_string();
        let lang = read_spell_file(path, name, path_str.ends_with(".add.spl"))?;

        // All active languages must agree on the character table.
        if self.have_table {
            if lang.char_table.charflags_payload() != self.table.charflags_payload() {
                return Err(SpellError::format(
                    &path_str,
                    "character table differs from previously loaded language",
                ));
            }
        } else {
            self.table = lang.char_table.clone();
            self.have_table = true;
        }

        let handle = match self.langs.iter().position(|l| l.path == path_str) {
            Some(i) => {
                // Reload in place: aliases stay valid.
                self.langs[i].clear();
                self.langs[i] = lang;
                i
            }
            None => {
                self.langs.push(lang);
                self.langs.len() - 1
            }
        };
        if !self.active.contains(&handle) {
            self.active.push(handle);
        }
        Ok(handle)
    }

    /// Register an already-built language (tests, embedders).
    pub fn adopt_language(&mut self, lang: Language) -> LanguageHandle {
        if !self.have_table {
            self.table = lang.char_table.clone();
            self.have_table = true;
        }
        self.langs.push(lang);
        let handle = self.langs.len() - 1;
        self.active.push(handle);
        handle
    }

    /// Try to load the companion `.sug` file. A missing file is not an
    /// error: sound suggestions are just unavailable. A failed load is
    /// remembered so it is not retried.
    pub fn load_sug_file(&mut self, handle: LanguageHandle, path: &Path) -> Result<()> {
        let lang = &mut self.langs[handle];
        if lang.sug_time == 0 {
            return Ok(());
        }
        let label = path.display().to_string();
        let file = match std::fs::File::open(path) {
            Ok(f) => f,
            Err(_) => {
                lang.sug = SugState::NotLoaded;
                return Ok(());
            }
        };
        let mut r = std::io::BufReader::new(file);
        match read_sug_file(&mut r, &label, lang.sug_time) {
            Ok(mut sug) => {
                // Both tries need subtree word counts: the soundfold
                // trie for finding a soundfold word's number, the fold
                // trie for resolving those numbers back to words.
                sug.trie.store_subtree_counts();
                lang.fold.store_subtree_counts();
                lang.sug = SugState::Loaded(sug);
                Ok(())
            }
            Err(e) => {
                lang.sug = SugState::Failed;
                Err(e)
            }
        }
    }

    /// Drop every language. Handles become invalid.
    pub fn free_all(&mut self) {
        self.langs.clear();
        self.active.clear();
        self.have_table = false;
        self.table = CharTable::default();
    }

    pub fn language(&self, handle: LanguageHandle) -> Option<&Language> {
        self.langs.get(handle)
    }

    pub fn language_mut(&mut self, handle: LanguageHandle) -> Option<&mut Language> {
        self.langs.get_mut(handle)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    // ------------------------------------------------------------------
    // Options
    // ------------------------------------------------------------------

    /// Parse a `spelllang` value into entries.
    pub fn parse_spelllang(spec: &str) -> Vec<LangSpec> {
        spec.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|entry| {
                if entry.eq_ignore_ascii_case("cjk") {
                    LangSpec::Cjk
                } else if entry.ends_with(".spl") {
                    LangSpec::File(entry.to_string())
                } else {
                    match entry.split_once('_') {
                        Some((name, region)) => LangSpec::Name {
                            name: name.to_string(),
                            region: Some(region.to_lowercase()),
                        },
                        None => LangSpec::Name {
                            name: entry.to_string(),
                            region: None,
                        },
                    }
                }
            })
            .collect()
    }

    /// Apply a `spelllang` value: load every entry via `rtp`, activate
    /// them in order, set region masks. Returns the messages for
    /// entries that failed; the engine stays usable with the rest.
    pub fn set_spelllang(&mut self, spec: &str, rtp: &dyn RuntimePath) -> Vec<String> {
        let mut messages = Vec::new();
        self.active.clear();
        self.cjk = false;

        for entry in Self::parse_spelllang(spec) {
            match entry {
                LangSpec::Cjk => self.cjk = true,
                LangSpec::File(p) => {
                    let path = PathBuf::from(&p);
                    let name = path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_else(|| p.clone());
                    if let Err(e) = self.load_language(&path, &name) {
                        messages.push(e.user_message());
                    }
                }
                LangSpec::Name { name, region } => {
                    let found = rtp
                        .find_spell_file(&name, "utf-8")
                        .or_else(|| rtp.find_spell_file(&name, "ascii"));
                    let Some(path) = found else {
                        messages.push(format!("Warning: cannot find spell file for \"{}\"", name));
                        continue;
                    };
                    match self.load_language(&path, &name) {
                        Ok(handle) => {
                            if let Some(region) = region {
                                let lang = &mut self.langs[handle];
                                match lang.regions.iter().position(|r| *r == region) {
                                    Some(i) => {
                                        // Several entries for one file OR
                                        // their region bits together.
                                        if lang.region_mask == 0xFF {
                                            lang.region_mask = 0;
                                        }
                                        lang.region_mask |= 1 << i;
                                    }
                                    None => messages.push(format!(
                                        "Warning: region {} not supported in {}",
                                        region, name
                                    )),
                                }
                            }
                        }
                        Err(e) => messages.push(e.user_message()),
                    }
                }
            }
        }
        messages
    }

    /// Parse and apply a `spellsuggest` value.
    pub fn set_spellsuggest(&mut self, spec: &str) -> Result<()> {
        let mut cfg = SuggestConfig::default();
        for token in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if token == "best" {
                cfg.mode = SuggestMode::Best;
            } else if token == "fast" {
                cfg.mode = SuggestMode::Fast;
            } else if token == "double" {
                cfg.mode = SuggestMode::Double;
            } else if let Ok(n) = token.parse::<usize>() {
                cfg.max_count = Some(n);
            } else if token.starts_with("expr:") || token.starts_with("file:") {
                cfg.external.push(token.to_string());
            } else {
                return Err(SpellError::format(
                    "spellsuggest",
                    format!("invalid token '{}'", token),
                ));
            }
        }
        self.suggest_cfg = cfg;
        Ok(())
    }

    pub fn suggest_config(&self) -> &SuggestConfig {
        &self.suggest_cfg
    }

    /// Parse and apply a `mkspellmem` value: `start,inc,added`.
    pub fn set_mkspellmem(&mut self, spec: &str) -> Result<()> {
        let parts: Vec<&str> = spec.split(',').collect();
        let parse = |s: &&str| s.trim().parse::<u32>().ok();
        let (Some(start), Some(inc), Some(added)) = (
            parts.first().and_then(parse),
            parts.get(1).and_then(parse),
            parts.get(2).and_then(parse),
        ) else {
            return Err(SpellError::format("mkspellmem", "expected start,inc,added"));
        };
        let limits = CompressLimits { start, inc, added };
        if !limits.validate() {
            return Err(SpellError::format(
                "mkspellmem",
                "values must be positive and inc <= start",
            ));
        }
        self.compress = limits;
        Ok(())
    }

    pub fn compress_limits(&self) -> CompressLimits {
        self.compress
    }

    // ------------------------------------------------------------------
    // Checking
    // ------------------------------------------------------------------

    fn active_langs(&self) -> Vec<&Language> {
        self.active.iter().filter_map(|&i| self.langs.get(i)).collect()
    }

    /// Classify the word at the start of `text` (usually a line tail).
    pub fn check_word(&self, text: &str) -> CheckedWord {
        self.check_word_cap(text, false)
    }

    /// As `check_word`, with "a capital is expected here" from the
    /// sentence predicate.
    pub fn check_word_cap(&self, text: &str, cap_expected: bool) -> CheckedWord {
        if self.cjk {
            if let Some(len) = cjk_span(text) {
                return CheckedWord::good(len);
            }
        }
        let langs = self.active_langs();
        Matcher::new(&langs, &self.table).check_word(text, cap_expected)
    }

    /// Iterate a whole line, returning `(byte_offset, result)` for every
    /// word that needs attention.
    pub fn check_line(&self, line: &str) -> Vec<(usize, CheckedWord)> {
        let mut out = Vec::new();
        let mut pos = 0usize;
        while pos < line.len() {
            let r = self.check_word(&line[pos..]);
            if r.len == 0 {
                break;
            }
            if r.result.needs_attention() {
                out.push((pos, r));
            }
            pos += r.len;
        }
        out
    }

    /// Signal the suggestion walk to stop at the next poll.
    pub fn interrupt(&self) {
        self.break_flag.store(true, Ordering::Relaxed);
    }

    /// Candidates for the bad word at the start of `text`. `text` should
    /// extend to the end of the line so splits and "the the" handling
    /// see the following words.
    pub fn suggestions(&self, text: &str, max: usize, need_cap: bool) -> Vec<Suggestion> {
        self.break_flag.store(false, Ordering::Relaxed);
        let checked = self.check_word(text);
        if !checked.result.needs_attention() {
            return Vec::new();
        }
        let badlen = checked.len.min(MAXWLEN);
        let langs = self.active_langs();
        let opts = SuggestOptions {
            mode: self.suggest_cfg.mode,
            max_count: self.suggest_cfg.max_count.unwrap_or(max).min(max.max(1)),
            need_cap,
            interrupt: Some(&self.break_flag),
        };
        let mut sugs = suggest(&langs, &self.table, text, badlen, &opts);
        // Candidates store the minimal replacement (common tails are
        // trimmed); rebuild the full word for display.
        for s in &mut sugs {
            if s.orig_len < badlen {
                if let Some(tail) = text.get(s.orig_len..badlen) {
                    s.word.push_str(tail);
                    s.orig_len = badlen;
                }
            }
        }
        sugs
    }

    /// Sound-fold a word with one language's SAL/SOFO rules.
    pub fn sound_fold(&self, handle: LanguageHandle, word: &str) -> Option<String> {
        let lang = self.langs.get(handle)?;
        let folded = CaseFolder::new(&self.table).fold(word, MAXWLEN)?;
        lang.sound_fold(&folded)
    }

    /// Raise the occurrence count of a word the user keeps using.
    pub fn count_word(&mut self, word: &str) {
        for &i in &self.active.clone() {
            if let Some(lang) = self.langs.get_mut(i) {
                lang.count_common_word(word, 1);
                break;
            }
        }
    }

    // ------------------------------------------------------------------
    // Error movement
    // ------------------------------------------------------------------

    /// Find the next (or previous) spelling error in a buffer, starting
    /// after `(start_line, start_col)`. Returns `(line, col, len,
    /// result)` in bytes.
    pub fn move_to_next_error(
        &self,
        src: &dyn LineSource,
        start_line: usize,
        start_col: usize,
        forward: bool,
        include_rare: bool,
        cur_line_only: bool,
    ) -> Option<(usize, usize, usize, SpellResult)> {
        let count = src.line_count();
        if count == 0 {
            return None;
        }
        let wanted = |r: SpellResult| {
            r == SpellResult::Bad
                || r == SpellResult::Banned
                || (include_rare && (r == SpellResult::Rare || r == SpellResult::Local))
        };

        let lines: Vec<usize> = if cur_line_only {
            vec![start_line]
        } else if forward {
            (start_line..count).collect()
        } else {
            (0..=start_line.min(count - 1)).rev().collect()
        };

        for lnum in lines {
            let Some(line) = src.line(lnum) else { continue };
            let mut line_best: Option<(usize, usize, usize, SpellResult)> = None;
            let mut pos = 0usize;
            while pos < line.len() {
                let cap = src.is_sentence_end(lnum, pos);
                let r = self.check_word_cap(&line[pos..], cap);
                if r.len == 0 {
                    break;
                }
                if wanted(r.result) {
                    if forward {
                        if lnum > start_line || pos > start_col {
                            return Some((lnum, pos, r.len, r.result));
                        }
                    } else if lnum < start_line || pos < start_col {
                        // Keep the last hit before the cursor; lines are
                        // visited closest-first.
                        line_best = Some((lnum, pos, r.len, r.result));
                    }
                }
                pos += r.len;
            }
            if !forward && line_best.is_some() {
                return line_best;
            }
        }
        None
    }

    // ------------------------------------------------------------------
    // Word dumping
    // ------------------------------------------------------------------

    /// Iterate all words of the active languages. The callback gets the
    /// word (with display case applied), its decoded metadata and the
    /// language handle. `pattern` filters by case-folded prefix.
    pub fn dump_words<F: FnMut(&str, &WordMeta, LanguageHandle)>(
        &self,
        pattern: Option<&str>,
        mut cb: F,
    ) {
        let folder = CaseFolder::new(&self.table);
        let pat = pattern.and_then(|p| folder.fold(p, MAXWLEN));
        for &handle in &self.active {
            let Some(lang) = self.langs.get(handle) else {
                continue;
            };
            lang.fold.for_each_word(|bytes, value| {
                let meta = WordMeta::decode(value);
                if meta.flags & crate::types::WF_KEEPCAP != 0 {
                    // Shown from the keep-case tree instead.
                    return;
                }
                let Ok(word) = std::str::from_utf8(bytes) else {
                    return;
                };
                if let Some(p) = &pat {
                    if !word.starts_with(p.as_str()) {
                        return;
                    }
                }
                let display = if meta.flags & (crate::types::WF_ONECAP | crate::types::WF_ALLCAP)
                    != 0
                {
                    let case = if meta.flags & crate::types::WF_ALLCAP != 0 {
                        crate::types::CaseType::AllCap
                    } else {
                        crate::types::CaseType::OneCap
                    };
                    folder.apply_case(word, case)
                } else {
                    word.to_string()
                };
                cb(&display, &meta, handle);
            });
            lang.keep.for_each_word(|bytes, value| {
                let meta = WordMeta::decode(value);
                let Ok(word) = std::str::from_utf8(bytes) else {
                    return;
                };
                if let Some(p) = &pat {
                    let folded = folder.fold(word, MAXWLEN).unwrap_or_default();
                    if !folded.starts_with(p.as_str()) {
                        return;
                    }
                }
                cb(word, &meta, handle);
            });
        }
    }
}

/// Byte length of a leading run of CJK characters, `None` when the text
/// does not start with one.
fn cjk_span(text: &str) -> Option<usize> {
    let mut len = 0usize;
    for c in text.chars() {
        if is_cjk(c) {
            len += c.len_utf8();
        } else {
            break;
        }
    }
    if len == 0 {
        None
    } else {
        Some(len)
    }
}

fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x11FF        // Hangul Jamo
        | 0x2E80..=0x9FFF      // CJK radicals .. unified ideographs
        | 0xA000..=0xA4CF      // Yi
        | 0xAC00..=0xD7AF      // Hangul syllables
        | 0xF900..=0xFAFF      // CJK compatibility ideographs
        | 0xFF00..=0xFFEF      // fullwidth forms
        | 0x20000..=0x2FFFF)   // CJK extension planes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trie::TrieBuilder;

    struct Lines(Vec<&'static str>);
    impl LineSource for Lines {
        fn line_count(&self) -> usize {
            self.0.len()
        }
        fn line(&self, lnum: usize) -> Option<&str> {
            self.0.get(lnum).copied()
        }
    }

    fn engine_with(words: &[&str]) -> Engine {
        let mut lang = Language::new("en", "test://en");
        let mut b = TrieBuilder::new();
        let mut sorted = words.to_vec();
        sorted.sort_unstable();
        for w in sorted {
            b.insert(w.as_bytes(), 0);
        }
        lang.fold = b.finish();
        let mut e = Engine::new();
        e.adopt_language(lang);
        e
    }

    #[test]
    fn spelllang_parsing() {
        let specs = Engine::parse_spelllang("en_us,de,cjk,/dict/custom.spl");
        assert_eq!(
            specs[0],
            LangSpec::Name {
                name: "en".into(),
                region: Some("us".into())
            }
        );
        assert_eq!(
            specs[1],
            LangSpec::Name {
                name: "de".into(),
                region: None
            }
        );
        assert_eq!(specs[2], LangSpec::Cjk);
        assert_eq!(specs[3], LangSpec::File("/dict/custom.spl".into()));
    }

    #[test]
    fn spellsuggest_parsing() {
        let mut e = Engine::new();
        e.set_spellsuggest("best,8,expr:MySuggest()").unwrap();
        assert_eq!(e.suggest_config().mode, SuggestMode::Best);
        assert_eq!(e.suggest_config().max_count, Some(8));
        assert_eq!(e.suggest_config().external.len(), 1);
        assert!(e.set_spellsuggest("bogus").is_err());
    }

    #[test]
    fn mkspellmem_validation() {
        let mut e = Engine::new();
        e.set_mkspellmem("460000,8000,500000").unwrap();
        assert!(e.set_mkspellmem("100,200,1").is_err());
        assert!(e.set_mkspellmem("1,2").is_err());
    }

    #[test]
    fn check_and_line_scan() {
        let e = engine_with(&["hello", "world"]);
        assert_eq!(e.check_word("hello ").result, SpellResult::Good);
        assert_eq!(e.check_word("helo ").result, SpellResult::Bad);
        let hits = e.check_line("hello wrld and");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0, 6);
    }

    #[test]
    fn move_to_error_forward_and_back() {
        let e = engine_with(&["one", "two", "three"]);
        let src = Lines(vec!["one txo three", "thrxe two"]);
        let hit = e.move_to_next_error(&src, 0, 0, true, false, false).unwrap();
        assert_eq!((hit.0, hit.1, hit.2), (0, 4, 3));
        let hit = e
            .move_to_next_error(&src, 1, 6, false, false, false)
            .unwrap();
        assert_eq!((hit.0, hit.1), (1, 0));
    }

    #[test]
    fn cjk_spans_skipped() {
        let mut e = engine_with(&["hello"]);
        e.cjk = true;
        let r = e.check_word("\u{4E2D}\u{6587} hello");
        assert_eq!(r.result, SpellResult::Good);
        assert_eq!(r.len, 6);
    }

    #[test]
    fn dump_words_lists_everything() {
        let e = engine_with(&["alpha", "beta"]);
        let mut seen = Vec::new();
        e.dump_words(None, |w, _, _| seen.push(w.to_string()));
        assert_eq!(seen, vec!["alpha", "beta"]);
        let mut seen = Vec::new();
        e.dump_words(Some("al"), |w, _, _| seen.push(w.to_string()));
        assert_eq!(seen, vec!["alpha"]);
    }

    #[test]
    fn reload_keeps_handle() {
        let mut e = engine_with(&["old"]);
        assert_eq!(e.check_word("old ").result, SpellResult::Good);
        // Simulate reload by clearing in place.
        e.language_mut(0).unwrap().clear();
        assert_eq!(e.check_word("old ").result, SpellResult::Bad);
    }

    #[test]
    fn suggestions_flow() {
        let mut e = engine_with(&["hello"]);
        e.set_spellsuggest("fast").unwrap();
        let sugs = e.suggestions("helo", 5, false);
        assert!(sugs.iter().any(|s| s.word == "hello"));
        // A good word gets no suggestions.
        assert!(e.suggestions("hello", 5, false).is_empty());
    }
}
