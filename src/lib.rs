// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Vim-compatible spell checking: `.spl`/`.sug` dictionaries, affix
//! compilation, word classification and suggestions.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌───────────┐   ┌────────────┐
//! │ trie.rs  │──▶│ binary/   │──▶│ matcher/  │──▶│ suggest/   │
//! │ (byts[]/ │   │ (.spl and │   │ (classify │   │ (edit walk │
//! │  idxs[]) │   │  .sug IO) │   │  words)   │   │  + sounds) │
//! └──────────┘   └───────────┘   └───────────┘   └────────────┘
//!       │              │               │               │
//!       ▼              ▼               ▼               ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │ lang.rs (Language: tries + every auxiliary table)        │
//! │ engine.rs (Engine: owns languages, options, public API)  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Dependency order is strict: `trie`, `phonetic`, `fuzzy` and `regexp`
//! are leaves; the `binary` codec materialises a [`Language`]; the
//! matcher consumes languages; the suggest engine drives the matcher's
//! tries with mutations of the bad word. Higher layers only use
//! lower-layer contracts.
//!
//! # Usage
//!
//! ```no_run
//! use spelt::{Engine, SpellResult};
//!
//! let mut engine = Engine::new();
//! engine.load_language(std::path::Path::new("en.utf-8.spl"), "en")?;
//!
//! let checked = engine.check_word("helo ");
//! if checked.result != SpellResult::Good {
//!     for s in engine.suggestions("helo", 5, false) {
//!         println!("{} (score {})", s.word, s.score);
//!     }
//! }
//! # Ok::<(), spelt::SpellError>(())
//! ```

pub mod affix;
pub mod binary;
mod engine;
mod error;
pub mod fuzzy;
pub mod lang;
pub mod matcher;
pub mod phonetic;
mod regexp;
pub mod scoring;
pub mod suggest;
mod trie;
pub mod types;
mod util;

// Re-exports for the public API.
pub use affix::{AffixData, DictBuilder, FlagMode};
pub use engine::{Engine, LangSpec, LanguageHandle, LineSource, RuntimePath, SuggestConfig};
pub use error::{Result, SpellError};
pub use lang::{CompoundInfo, Language, PrefCond, RepEntry, RepTable, SimilarMap, SylTable};
pub use matcher::Matcher;
pub use phonetic::{SalRules, SofoMap, SoundFolding};
pub use regexp::Program;
pub use suggest::{suggest, SuggestMode, SuggestOptions};
pub use trie::{CompressLimits, TrieBuilder, TrieStore};
pub use types::{CaseType, CheckedWord, PrefixMeta, SpellResult, Suggestion, WordMeta, MAXWLEN};
pub use util::{CaseFolder, CharTable};
