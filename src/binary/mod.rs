// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Reading and writing `.spl` spell files.
//!
//! # Format overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ HEADER: magic "VIMspell" [8] + version [1]               │
//! ├──────────────────────────────────────────────────────────┤
//! │ SECTIONS: TLV stream                                     │
//! │   id[1] flags[1] len[4, MSB] payload[len]                │
//! │   flags bit 0 = required: fail the load if id is unknown │
//! │   terminated by the bare id byte 255 (SN_END)            │
//! ├──────────────────────────────────────────────────────────┤
//! │ LWORDTREE: fold-case word tree                           │
//! │ KWORDTREE: keep-case word tree                           │
//! │ PREFIXTREE: postponed-prefix tree                        │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Sections parse independently of their order; only the three trees are
//! positional. Unknown optional sections are skipped by length so newer
//! writers stay readable. The writer emits sections in ascending-id
//! order, which keeps output stable for byte-for-byte comparisons.
//!
//! The payload of every section is read into memory first and parsed
//! from the slice, so a payload truncated mid-field is caught by the
//! bounded reads instead of bleeding into the next section.

pub mod encoding;
pub mod header;
pub mod sug;
mod tree;

pub use tree::{read_tree, write_tree};

use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Write};
use std::path::Path;

use crate::error::{io_at, Result, SpellError};
use crate::lang::{CompoundInfo, Language, PrefCond, RepEntry, RepTable, SimilarMap, SylTable};
use crate::phonetic::{SalRule, SalRules, SofoMap, SoundFolding};
use crate::types::MAXWLEN;

use encoding::{
    read_bytes, read_string8, read_u16, read_u32, read_u64, read_u8, write_string8, write_u16,
    write_u32, write_u64, write_u8,
};
use header::{
    COMMON_WORD_START_COUNT, MAX_SECTION_LEN, SNF_REQUIRED, SN_CHARFLAGS, SN_COMPOUND, SN_END,
    SN_INFO, SN_MAP, SN_MIDWORD, SN_NOBREAK, SN_NOSPLITSUGS, SN_PREFCOND, SN_REGION, SN_REP,
    SN_REPSAL, SN_SAL, SN_SOFO, SN_SUGFILE, SN_SYLLABLE, SN_WORDS, SPELL_MAGIC, SPELL_VERSION,
};

// ============================================================================
// READER
// ============================================================================

/// Load a `.spl` file from disk into a fresh [`Language`].
pub fn read_spell_file(path: &Path, name: &str, is_addition: bool) -> Result<Language> {
    let label = path.display().to_string();
    let file = File::open(path).map_err(|e| SpellError::Io {
        path: label.clone(),
        source: e,
    })?;
    let mut r = BufReader::new(file);
    let mut lang = read_spell_data(&mut r, &label, name)?;
    lang.is_addition = is_addition;
    Ok(lang)
}

/// Parse a `.spl` stream. `label` is used in error messages.
pub fn read_spell_data<R: Read>(r: &mut R, label: &str, name: &str) -> Result<Language> {
    let mut magic = [0u8; 8];
    r.read_exact(&mut magic)
        .map_err(|e| io_at(label, "file magic", e))?;
    if &magic != SPELL_MAGIC {
        return Err(SpellError::format(label, "is not a spell file"));
    }
    let version = read_u8(r).map_err(|e| io_at(label, "file version", e))?;
    if version != SPELL_VERSION {
        return Err(SpellError::Version {
            path: label.to_string(),
            version,
        });
    }

    let mut lang = Language::new(name, label);

    // Section stream.
    loop {
        let id = read_u8(r).map_err(|e| io_at(label, "section id", e))?;
        if id == SN_END {
            break;
        }
        let flags = read_u8(r).map_err(|e| io_at(label, "section flags", e))?;
        let len = read_u32(r).map_err(|e| io_at(label, "section length", e))?;
        if len > MAX_SECTION_LEN {
            return Err(SpellError::format(
                label,
                format!("section {} length {} out of range", id, len),
            ));
        }
        let payload =
            read_bytes(r, len as usize).map_err(|e| io_at(label, "section payload", e))?;

        let known = read_section(&mut lang, id, &payload, label)?;
        if !known && flags & SNF_REQUIRED != 0 {
            return Err(SpellError::format(
                label,
                format!("unknown required section {}", id),
            ));
        }
    }

    // The three trees always follow the section stream.
    lang.fold = tree::read_tree(r, false, 0, label)?;
    lang.keep = tree::read_tree(r, false, 0, label)?;
    lang.prefix = tree::read_tree(r, true, lang.prefix_count, label)?;

    // NOBREAK semantics and compound rules contradict each other; refuse
    // dictionaries that carry both rather than guessing.
    if lang.nobreak && lang.compound.is_some() {
        return Err(SpellError::format(
            label,
            "dictionary has both NOBREAK and compound rules",
        ));
    }
    Ok(lang)
}

/// Parse one section into `lang`. Returns false for an unknown id.
fn read_section(lang: &mut Language, id: u8, payload: &[u8], label: &str) -> Result<bool> {
    let mut c = Cursor::new(payload);
    match id {
        SN_REGION => {
            if payload.len() % 2 != 0 || payload.len() > 16 {
                return Err(SpellError::format(label, "bad REGION section"));
            }
            lang.regions = payload
                .chunks(2)
                .map(|p| String::from_utf8_lossy(p).into_owned())
                .collect();
        }
        SN_CHARFLAGS => {
            let flagslen = read_u8(&mut c).map_err(|e| io_at(label, "charflags", e))? as usize;
            if flagslen > 128 {
                return Err(SpellError::format(label, "bad CHARFLAGS length"));
            }
            let flags =
                read_bytes(&mut c, flagslen).map_err(|e| io_at(label, "charflags", e))?;
            let follen = read_u16(&mut c).map_err(|e| io_at(label, "fold chars", e))? as usize;
            let fol = read_bytes(&mut c, follen).map_err(|e| io_at(label, "fold chars", e))?;
            let fol = utf8(fol, label, "fold chars")?;
            lang.char_table.apply_charflags(&flags, &fol);
            lang.has_charflags = true;
        }
        SN_MIDWORD => {
            lang.midword = utf8(payload.to_vec(), label, "MIDWORD")?;
        }
        SN_PREFCOND => {
            let count = read_u16(&mut c).map_err(|e| io_at(label, "PREFCOND count", e))? as usize;
            let mut conds = Vec::with_capacity(count);
            for _ in 0..count {
                let raw = read_string8(&mut c).map_err(|e| io_at(label, "PREFCOND entry", e))?;
                conds.push(PrefCond::from_raw(raw));
            }
            lang.prefix_count = conds.len();
            lang.prefcond = conds;
        }
        SN_REP => lang.rep = read_rep(&mut c, label)?,
        SN_REPSAL => lang.repsal = read_rep(&mut c, label)?,
        SN_SAL => {
            if matches!(lang.sound, SoundFolding::Sofo(_)) {
                return Err(SpellError::format(label, "both SAL and SOFO present"));
            }
            let flags = read_u8(&mut c).map_err(|e| io_at(label, "SAL flags", e))?;
            let count = read_u16(&mut c).map_err(|e| io_at(label, "SAL count", e))? as usize;
            let mut rules = Vec::with_capacity(count);
            for _ in 0..count {
                let from = read_string8(&mut c).map_err(|e| io_at(label, "SAL entry", e))?;
                let to = read_string8(&mut c).map_err(|e| io_at(label, "SAL entry", e))?;
                rules.push(SalRule::parse(
                    &utf8(from, label, "SAL entry")?,
                    &utf8(to, label, "SAL entry")?,
                ));
            }
            lang.sound = SoundFolding::Sal(SalRules::new(flags, rules));
        }
        SN_SOFO => {
            if matches!(lang.sound, SoundFolding::Sal(_)) {
                return Err(SpellError::format(label, "both SAL and SOFO present"));
            }
            let fromlen = read_u16(&mut c).map_err(|e| io_at(label, "SOFO", e))? as usize;
            let from = read_bytes(&mut c, fromlen).map_err(|e| io_at(label, "SOFO", e))?;
            let tolen = read_u16(&mut c).map_err(|e| io_at(label, "SOFO", e))? as usize;
            let to = read_bytes(&mut c, tolen).map_err(|e| io_at(label, "SOFO", e))?;
            let from = utf8(from, label, "SOFO")?;
            let to = utf8(to, label, "SOFO")?;
            match SofoMap::new(&from, &to) {
                Some(map) => lang.sound = SoundFolding::Sofo(map),
                None => {
                    return Err(SpellError::format(
                        label,
                        "SOFOFROM and SOFOTO differ in length",
                    ))
                }
            }
        }
        SN_MAP => {
            lang.map = SimilarMap::from_map_str(&utf8(payload.to_vec(), label, "MAP")?);
        }
        SN_COMPOUND => {
            lang.compound = Some(read_compound(&mut c, payload, label)?);
        }
        SN_SYLLABLE => {
            lang.syllable = SylTable::from_raw(&utf8(payload.to_vec(), label, "SYLLABLE")?);
        }
        SN_NOBREAK => lang.nobreak = true,
        SN_SUGFILE => {
            lang.sug_time = read_u64(&mut c).map_err(|e| io_at(label, "SUGFILE", e))?;
        }
        SN_WORDS => {
            for word in payload.split(|&b| b == 0).filter(|w| !w.is_empty()) {
                let word = utf8(word.to_vec(), label, "WORDS")?;
                lang.count_common_word(&word, COMMON_WORD_START_COUNT);
            }
        }
        SN_NOSPLITSUGS => lang.no_split_sugs = true,
        SN_INFO => {
            lang.info = utf8(payload.to_vec(), label, "INFO")?;
        }
        _ => return Ok(false),
    }
    Ok(true)
}

fn utf8(bytes: Vec<u8>, label: &str, what: &str) -> Result<String> {
    String::from_utf8(bytes)
        .map_err(|_| SpellError::format(label, format!("invalid UTF-8 in {}", what)))
}

fn read_rep(c: &mut Cursor<&[u8]>, label: &str) -> Result<RepTable> {
    let count = read_u16(c).map_err(|e| io_at(label, "REP count", e))? as usize;
    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        let from = read_string8(c).map_err(|e| io_at(label, "REP entry", e))?;
        let to = read_string8(c).map_err(|e| io_at(label, "REP entry", e))?;
        entries.push(RepEntry { from, to });
    }
    Ok(RepTable::new(entries))
}

fn read_compound(c: &mut Cursor<&[u8]>, payload: &[u8], label: &str) -> Result<CompoundInfo> {
    let raw_max = read_u8(c).map_err(|e| io_at(label, "COMPOUND", e))? as usize;
    let max_words = if raw_max < 2 { MAXWLEN } else { raw_max };
    let min_len = read_u8(c).map_err(|e| io_at(label, "COMPOUND", e))? as usize;
    let raw_syl = read_u8(c).map_err(|e| io_at(label, "COMPOUND", e))? as usize;
    let syl_max = if raw_syl < 1 { MAXWLEN } else { raw_syl };

    // A zero byte introduces the options/patterns block; anything else is
    // the first byte of the flags string (the compat layout).
    let marker = read_u8(c).map_err(|e| io_at(label, "COMPOUND", e))?;
    let mut options = 0u8;
    let mut patterns: Vec<Vec<u8>> = Vec::new();
    let flags_raw: Vec<u8>;
    if marker == 0 {
        options = read_u8(c).map_err(|e| io_at(label, "COMPOUND options", e))?;
        let patcount = read_u16(c).map_err(|e| io_at(label, "COMPOUND patterns", e))? as usize;
        for _ in 0..patcount {
            patterns.push(read_string8(c).map_err(|e| io_at(label, "COMPOUND patterns", e))?);
        }
        flags_raw = payload[c.position() as usize..].to_vec();
    } else {
        let mut rest = vec![marker];
        rest.extend_from_slice(&payload[c.position() as usize..]);
        flags_raw = rest;
    }
    if flags_raw.is_empty() {
        return Err(SpellError::format(label, "COMPOUND section has no rules"));
    }
    Ok(CompoundInfo::from_raw(
        max_words, min_len, syl_max, options, patterns, flags_raw,
    ))
}

// ============================================================================
// WRITER
// ============================================================================

/// Write `lang` to a `.spl` file on disk.
pub fn write_spell_file(path: &Path, lang: &Language) -> Result<()> {
    let label = path.display().to_string();
    let file = File::create(path).map_err(|e| SpellError::Io {
        path: label.clone(),
        source: e,
    })?;
    let mut w = BufWriter::new(file);
    write_spell_data(&mut w, lang).map_err(|e| io_at(&label, "spell file", e))
}

/// Serialize `lang` as a `.spl` stream. Sections are emitted in
/// ascending-id order and only when they have content, so writing the
/// same language twice produces identical bytes.
pub fn write_spell_data<W: Write>(w: &mut W, lang: &Language) -> std::io::Result<()> {
    w.write_all(SPELL_MAGIC)?;
    write_u8(w, SPELL_VERSION)?;

    if !lang.regions.is_empty() {
        let mut p = Vec::new();
        for r in &lang.regions {
            p.extend_from_slice(r.as_bytes());
        }
        section(w, SN_REGION, SNF_REQUIRED, &p)?;
    }
    if lang.has_charflags {
        let (flags, fol) = lang.char_table.charflags_payload();
        let mut p = Vec::new();
        write_u8(&mut p, flags.len() as u8)?;
        p.extend_from_slice(&flags);
        write_u16(&mut p, fol.len() as u16)?;
        p.extend_from_slice(fol.as_bytes());
        section(w, SN_CHARFLAGS, SNF_REQUIRED, &p)?;
    }
    if !lang.midword.is_empty() {
        section(w, SN_MIDWORD, SNF_REQUIRED, lang.midword.as_bytes())?;
    }
    if !lang.prefcond.is_empty() {
        let mut p = Vec::new();
        write_u16(&mut p, lang.prefcond.len() as u16)?;
        for cond in &lang.prefcond {
            write_string8(&mut p, &cond.raw)?;
        }
        section(w, SN_PREFCOND, SNF_REQUIRED, &p)?;
    }
    if !lang.rep.is_empty() {
        section(w, SN_REP, 0, &rep_payload(&lang.rep)?)?;
    }
    match &lang.sound {
        SoundFolding::Sal(sal) => {
            let mut p = Vec::new();
            write_u8(&mut p, sal.flags_byte())?;
            write_u16(&mut p, sal.rules().len() as u16)?;
            for rule in sal.rules() {
                write_string8(&mut p, rule.from.as_bytes())?;
                write_string8(&mut p, rule.to.as_bytes())?;
            }
            section(w, SN_SAL, 0, &p)?;
        }
        SoundFolding::Sofo(map) => {
            let mut p = Vec::new();
            write_u16(&mut p, map.from.len() as u16)?;
            p.extend_from_slice(map.from.as_bytes());
            write_u16(&mut p, map.to.len() as u16)?;
            p.extend_from_slice(map.to.as_bytes());
            section(w, SN_SOFO, 0, &p)?;
        }
        SoundFolding::None => {}
    }
    if !lang.map.is_empty() {
        section(w, SN_MAP, 0, lang.map.raw.as_bytes())?;
    }
    if let Some(comp) = &lang.compound {
        let mut p = Vec::new();
        write_u8(&mut p, if comp.max_words >= MAXWLEN { 0 } else { comp.max_words as u8 })?;
        write_u8(&mut p, comp.min_len as u8)?;
        write_u8(&mut p, if comp.syl_max >= MAXWLEN { 0 } else { comp.syl_max as u8 })?;
        write_u8(&mut p, 0)?; // options/patterns block follows
        write_u8(&mut p, comp.options)?;
        write_u16(&mut p, comp.patterns.len() as u16)?;
        for pat in &comp.patterns {
            write_string8(&mut p, pat)?;
        }
        p.extend_from_slice(&comp.flags_raw);
        section(w, SN_COMPOUND, SNF_REQUIRED, &p)?;
    }
    if !lang.syllable.is_empty() {
        section(w, SN_SYLLABLE, 0, lang.syllable.raw.as_bytes())?;
    }
    if lang.nobreak {
        section(w, SN_NOBREAK, SNF_REQUIRED, &[])?;
    }
    if lang.sug_time != 0 {
        let mut p = Vec::new();
        write_u64(&mut p, lang.sug_time)?;
        section(w, SN_SUGFILE, 0, &p)?;
    }
    if !lang.repsal.is_empty() {
        section(w, SN_REPSAL, 0, &rep_payload(&lang.repsal)?)?;
    }
    if !lang.common_order.is_empty() {
        let mut p = Vec::new();
        for word in &lang.common_order {
            p.extend_from_slice(word.as_bytes());
            p.push(0);
        }
        section(w, SN_WORDS, 0, &p)?;
    }
    if lang.no_split_sugs {
        section(w, SN_NOSPLITSUGS, 0, &[])?;
    }
    if !lang.info.is_empty() {
        section(w, SN_INFO, 0, lang.info.as_bytes())?;
    }

    write_u8(w, SN_END)?;
    tree::write_tree(w, &lang.fold, false)?;
    tree::write_tree(w, &lang.keep, false)?;
    tree::write_tree(w, &lang.prefix, true)?;
    Ok(())
}

fn section<W: Write>(w: &mut W, id: u8, flags: u8, payload: &[u8]) -> std::io::Result<()> {
    write_u8(w, id)?;
    write_u8(w, flags)?;
    write_u32(w, payload.len() as u32)?;
    w.write_all(payload)
}

fn rep_payload(rep: &RepTable) -> std::io::Result<Vec<u8>> {
    let mut p = Vec::new();
    write_u16(&mut p, rep.entries().len() as u16)?;
    for e in rep.entries() {
        write_string8(&mut p, &e.from)?;
        write_string8(&mut p, &e.to)?;
    }
    Ok(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trie::TrieBuilder;
    use crate::types::WordMeta;

    fn small_lang() -> Language {
        let mut lang = Language::new("en", "en.spl");
        let mut b = TrieBuilder::new();
        for w in ["the", "these", "theses"] {
            b.insert(w.as_bytes(), 0);
        }
        lang.fold = b.finish();
        lang
    }

    fn to_bytes(lang: &Language) -> Vec<u8> {
        let mut buf = Vec::new();
        write_spell_data(&mut buf, lang).unwrap();
        buf
    }

    fn from_bytes(bytes: &[u8]) -> Result<Language> {
        read_spell_data(&mut Cursor::new(bytes), "mem.spl", "en")
    }

    #[test]
    fn minimal_roundtrip() {
        let lang = small_lang();
        let buf = to_bytes(&lang);
        let back = from_bytes(&buf).unwrap();
        let mut words = Vec::new();
        back.fold.for_each_word(|w, _| words.push(w.to_vec()));
        assert_eq!(
            words,
            vec![b"the".to_vec(), b"these".to_vec(), b"theses".to_vec()]
        );
        // Deterministic writer: a second write is byte-identical.
        assert_eq!(buf, to_bytes(&back));
    }

    #[test]
    fn bad_magic() {
        let err = from_bytes(b"NOTspell999");
        assert!(matches!(err, Err(SpellError::Format { .. })));
    }

    #[test]
    fn wrong_version() {
        let mut buf = to_bytes(&small_lang());
        buf[8] = 51;
        assert!(matches!(from_bytes(&buf), Err(SpellError::Version { .. })));
    }

    #[test]
    fn unknown_optional_section_skipped() {
        let lang = small_lang();
        let mut buf = Vec::new();
        buf.extend_from_slice(SPELL_MAGIC);
        buf.push(SPELL_VERSION);
        // Unknown id 200, optional, 3 payload bytes.
        buf.push(200);
        buf.push(0);
        buf.extend_from_slice(&3u32.to_be_bytes());
        buf.extend_from_slice(b"xyz");
        buf.push(SN_END);
        write_tree(&mut buf, &lang.fold, false).unwrap();
        write_tree(&mut buf, &lang.keep, false).unwrap();
        write_tree(&mut buf, &lang.prefix, true).unwrap();
        assert!(from_bytes(&buf).is_ok());
    }

    #[test]
    fn unknown_required_section_fails() {
        let mut buf = Vec::new();
        buf.extend_from_slice(SPELL_MAGIC);
        buf.push(SPELL_VERSION);
        buf.push(200);
        buf.push(SNF_REQUIRED);
        buf.extend_from_slice(&0u32.to_be_bytes());
        buf.push(SN_END);
        let err = from_bytes(&buf);
        assert!(matches!(err, Err(SpellError::Format { .. })));
    }

    #[test]
    fn truncated_section_payload() {
        let mut buf = Vec::new();
        buf.extend_from_slice(SPELL_MAGIC);
        buf.push(SPELL_VERSION);
        buf.push(SN_INFO);
        buf.push(0);
        buf.extend_from_slice(&100u32.to_be_bytes());
        buf.extend_from_slice(b"short");
        let err = from_bytes(&buf);
        assert!(matches!(err, Err(SpellError::Trunc { .. })));
    }

    #[test]
    fn sal_and_sofo_are_exclusive() {
        let mut buf = Vec::new();
        buf.extend_from_slice(SPELL_MAGIC);
        buf.push(SPELL_VERSION);
        // SOFO
        let mut p = Vec::new();
        write_u16(&mut p, 2).unwrap();
        p.extend_from_slice(b"ab");
        write_u16(&mut p, 2).unwrap();
        p.extend_from_slice(b"AB");
        section(&mut buf, SN_SOFO, 0, &p).unwrap();
        // SAL
        let mut p = Vec::new();
        write_u8(&mut p, 0).unwrap();
        write_u16(&mut p, 1).unwrap();
        write_string8(&mut p, b"A").unwrap();
        write_string8(&mut p, b"A").unwrap();
        section(&mut buf, SN_SAL, 0, &p).unwrap();
        buf.push(SN_END);
        let err = from_bytes(&buf);
        assert!(matches!(err, Err(SpellError::Format { .. })));
    }

    #[test]
    fn nobreak_with_compound_rejected() {
        let mut lang = small_lang();
        lang.nobreak = true;
        lang.compound = Some(CompoundInfo::from_raw(3, 1, MAXWLEN, 0, vec![], b"f+".to_vec()));
        let buf = to_bytes(&lang);
        let err = from_bytes(&buf);
        assert!(matches!(err, Err(SpellError::Format { .. })));
    }

    #[test]
    fn full_tables_roundtrip() {
        let mut lang = small_lang();
        lang.regions = vec!["us".into(), "gb".into()];
        lang.midword = "'-".into();
        lang.rep = RepTable::new(vec![RepEntry {
            from: b"tion".to_vec(),
            to: b"sion".to_vec(),
        }]);
        lang.repsal = RepTable::new(vec![RepEntry {
            from: b"k".to_vec(),
            to: b"c".to_vec(),
        }]);
        lang.map = SimilarMap::from_map_str("aá/eé");
        lang.syllable = SylTable::from_raw("aeiou/oo");
        lang.no_split_sugs = true;
        lang.info = "test dictionary".into();
        lang.sug_time = 0xDEAD_BEEF;
        lang.compound = Some(CompoundInfo::from_raw(
            3,
            2,
            5,
            crate::types::COMP_CHECK_DUP,
            vec![b"ba".to_vec(), b"fo".to_vec()],
            b"f+".to_vec(),
        ));
        let mut kb = TrieBuilder::new();
        kb.insert(
            b"NASA",
            WordMeta {
                flags: crate::types::WF_KEEPCAP,
                region: 0,
                affix_id: 0,
            }
            .encode(),
        );
        lang.keep = kb.finish();
        lang.count_common_word("the", 10);

        let buf = to_bytes(&lang);
        let back = from_bytes(&buf).unwrap();
        assert_eq!(back.regions, lang.regions);
        assert_eq!(back.midword, lang.midword);
        assert_eq!(back.rep.entries(), lang.rep.entries());
        assert_eq!(back.repsal.entries(), lang.repsal.entries());
        assert_eq!(back.map.raw, lang.map.raw);
        assert_eq!(back.syllable.raw, lang.syllable.raw);
        assert!(back.no_split_sugs);
        assert_eq!(back.info, lang.info);
        assert_eq!(back.sug_time, lang.sug_time);
        let comp = back.compound.as_ref().unwrap();
        assert_eq!(comp.max_words, 3);
        assert_eq!(comp.min_len, 2);
        assert_eq!(comp.syl_max, 5);
        assert_eq!(comp.options, crate::types::COMP_CHECK_DUP);
        assert_eq!(comp.patterns.len(), 2);
        assert_eq!(back.word_count.get("the").copied(), Some(10));
        // Write-back of the reread language is byte-identical.
        assert_eq!(buf, to_bytes(&back));
    }
}
