// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Building a [`Language`] from parsed affix data and a word list.
//!
//! This is the in-memory dictionary compiler: affixes are expanded into
//! word forms, keep-case words land in the keep-case tree, postponed
//! prefixes go to the prefix trie with their conditions, and compound
//! flags are remapped to one-byte IDs that share the affix-ID byte with
//! prefix IDs (prefix IDs 1..=127, compound IDs 128..=255).

use std::collections::HashMap;

use crate::error::{Result, SpellError};
use crate::lang::{CompoundInfo, Language, PrefCond, RepEntry, RepTable, SimilarMap, SylTable};
use crate::phonetic::{SalRule, SalRules, SofoMap, SoundFolding};
use crate::trie::{CompressLimits, TrieBuilder};
use crate::types::{
    CaseType, PrefixMeta, WordMeta, MAXWLEN, WFP_COMPFORBID, WFP_COMPPERMIT, WFP_NC, WFP_UP,
    WF_ALLCAP, WF_BANNED, WF_FIXCAP, WF_HAS_AFF, WF_KEEPCAP, WF_NEEDCOMP, WF_NOSUGGEST, WF_ONECAP,
    WF_RARE,
};
use crate::util::{CaseFolder, CharTable};

use super::{parse_flags, AffixData, AffixEntry, AffixGroup};

/// Incremental dictionary builder over one parsed affix file.
pub struct DictBuilder<'a> {
    data: &'a AffixData,
    table: CharTable,
    fold: TrieBuilder,
    keep: TrieBuilder,
    prefix: TrieBuilder,
    prefcond: Vec<PrefCond>,
    /// Affix flag -> postponed prefix ID.
    prefix_ids: HashMap<u32, u8>,
    next_prefix_id: u8,
    /// Compound flag -> remapped ID byte.
    comp_ids: HashMap<u32, u8>,
    next_comp_id: u8,
    regions: Vec<String>,
    warnings: Vec<String>,
}

impl<'a> DictBuilder<'a> {
    pub fn new(data: &'a AffixData) -> DictBuilder<'a> {
        Self::with_limits(data, CompressLimits::default())
    }

    pub fn with_limits(data: &'a AffixData, limits: CompressLimits) -> DictBuilder<'a> {
        DictBuilder {
            data,
            table: CharTable::default(),
            fold: TrieBuilder::with_limits(limits),
            keep: TrieBuilder::with_limits(limits),
            prefix: TrieBuilder::with_limits(limits),
            prefcond: vec![PrefCond::default()],
            prefix_ids: HashMap::new(),
            next_prefix_id: 1,
            comp_ids: HashMap::new(),
            next_comp_id: 128,
            regions: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Declare the region names (up to 8 two-letter codes).
    pub fn set_regions(&mut self, regions: &[&str]) {
        self.regions = regions.iter().map(|s| s.to_string()).collect();
    }

    /// Add one word, `flags` in the affix file's flag syntax, valid in
    /// all regions.
    pub fn add_word(&mut self, word: &str, flags: &str) -> Result<()> {
        self.add_word_region(word, flags, 0)
    }

    /// Add one word restricted to a region bitmask (0 = everywhere).
    pub fn add_word_region(&mut self, word: &str, flags: &str, region: u8) -> Result<()> {
        let flag_list = parse_flags(flags, self.data.flag_mode).map_err(|detail| {
            SpellError::Rule {
                line: 0,
                detail: format!("word '{}': {}", word, detail),
            }
        })?;

        let mut wf = 0u32;
        let d = self.data;
        let has = |o: Option<u32>, f: &[u32]| o.is_some_and(|v| f.contains(&v));
        if has(d.rare_flag, &flag_list) {
            wf |= WF_RARE;
        }
        if has(d.forbidden_flag, &flag_list) {
            wf |= WF_BANNED;
        }
        if has(d.keepcase_flag, &flag_list) {
            wf |= WF_KEEPCAP | WF_FIXCAP;
        }
        if has(d.nosuggest_flag, &flag_list) {
            wf |= WF_NOSUGGEST;
        }
        if has(d.needcomp_flag, &flag_list) {
            wf |= WF_NEEDCOMP;
        }
        let need_affix = has(d.needaffix_flag, &flag_list);

        // The compound ID for this word, if it takes part in compounds.
        let comp_id = self.compound_id_for(&flag_list);

        // Postponed prefix IDs that apply to this word.
        let pfx_ids = self.prefix_ids_for(&flag_list);

        if !need_affix {
            self.store_word(word, wf, region, comp_id, &pfx_ids)?;
        }

        // Expand affixes.
        let sgroups: Vec<&AffixGroup> = d
            .suffixes
            .iter()
            .filter(|g| flag_list.contains(&g.flag))
            .collect();
        let pgroups: Vec<&AffixGroup> = d
            .prefixes
            .iter()
            .filter(|g| flag_list.contains(&g.flag) && !self.is_postponed(g))
            .collect();

        for group in &sgroups {
            for entry in &group.entries {
                let Some(derived) = apply_suffix(word, entry) else {
                    continue;
                };
                let comp = if entry.comp_permit { comp_id } else { 0 };
                self.store_word(&derived, wf | WF_HAS_AFF, region, comp, &pfx_ids)?;

                if group.combines {
                    for pgroup in &pgroups {
                        if !pgroup.combines {
                            continue;
                        }
                        for pentry in &pgroup.entries {
                            if let Some(both) = apply_prefix(&derived, pentry) {
                                let comp =
                                    if entry.comp_permit && pentry.comp_permit { comp_id } else { 0 };
                                self.store_word(&both, wf | WF_HAS_AFF, region, comp, &[])?;
                            }
                        }
                    }
                }
            }
        }
        for group in &pgroups {
            for entry in &group.entries {
                if let Some(derived) = apply_prefix(word, entry) {
                    let comp = if entry.comp_permit { comp_id } else { 0 };
                    self.store_word(&derived, wf | WF_HAS_AFF, region, comp, &[])?;
                }
            }
        }
        Ok(())
    }

    /// Store one word form: folded into the fold tree (one entry per
    /// applicable prefix ID plus the plain form), original case into the
    /// keep tree for keep-case words.
    fn store_word(
        &mut self,
        word: &str,
        flags: u32,
        region: u8,
        comp_id: u8,
        pfx_ids: &[u8],
    ) -> Result<()> {
        let folder = CaseFolder::new(&self.table);
        let ct = folder.case_type(word);
        let ct_flags = match ct {
            CaseType::Folded => 0,
            CaseType::OneCap => WF_ONECAP,
            CaseType::AllCap => WF_ALLCAP,
            CaseType::KeepCap => WF_KEEPCAP,
        };
        let all_flags = flags | ct_flags;
        let Some(folded) = folder.fold(word, MAXWLEN) else {
            return Err(SpellError::Rule {
                line: 0,
                detail: format!("word '{}' is too long", word),
            });
        };

        // The affix-ID byte carries either a compound ID or a postponed
        // prefix ID; a word can have several prefix entries.
        let base_meta = WordMeta {
            flags: all_flags & 0xFFFF,
            region,
            affix_id: comp_id,
        };
        self.fold.insert(folded.as_bytes(), base_meta.encode());
        for &pid in pfx_ids {
            let meta = WordMeta {
                flags: (all_flags & 0xFFFF) | WF_HAS_AFF,
                region,
                affix_id: pid,
            };
            self.fold.insert(folded.as_bytes(), meta.encode());
        }

        if ct == CaseType::KeepCap || flags & WF_KEEPCAP != 0 {
            let meta = WordMeta {
                flags: all_flags & 0xFFFF,
                region,
                affix_id: comp_id,
            };
            self.keep.insert(word.as_bytes(), meta.encode());
        }
        Ok(())
    }

    fn is_postponed(&self, group: &AffixGroup) -> bool {
        self.data.pfxpostpone
            && group.is_prefix
            && group
                .entries
                .iter()
                .all(|e| e.chop.is_empty() && e.flags.is_empty())
    }

    /// Map the word's compound-relevant flag to its remapped ID.
    fn compound_id_for(&mut self, flags: &[u32]) -> u8 {
        let mut relevant: Vec<u32> = Vec::new();
        if let Some(cf) = self.data.compflag {
            if flags.contains(&cf) {
                relevant.push(cf);
            }
        }
        for rule in &self.data.compound_rules {
            for c in rule.chars() {
                if "?*+[]/".contains(c) {
                    continue;
                }
                if flags.contains(&(c as u32)) && !relevant.contains(&(c as u32)) {
                    relevant.push(c as u32);
                }
            }
        }
        let Some(&flag) = relevant.first() else {
            return 0;
        };
        if let Some(&id) = self.comp_ids.get(&flag) {
            return id;
        }
        let id = self.next_comp_id;
        if id == 0 {
            // Pool exhausted; word simply won't compound.
            self.warnings
                .push("too many distinct compound flags".to_string());
            return 0;
        }
        self.next_comp_id = self.next_comp_id.wrapping_add(1);
        self.comp_ids.insert(flag, id);
        id
    }

    /// Postponed-prefix IDs for the word's flags, creating trie entries
    /// on first use.
    fn prefix_ids_for(&mut self, flags: &[u32]) -> Vec<u8> {
        if !self.data.pfxpostpone {
            return Vec::new();
        }
        let mut ids = Vec::new();
        let groups: Vec<AffixGroup> = self
            .data
            .prefixes
            .iter()
            .filter(|g| flags.contains(&g.flag))
            .cloned()
            .collect();
        for group in groups {
            if !self.is_postponed(&group) {
                continue;
            }
            let id = match self.prefix_ids.get(&group.flag) {
                Some(&id) => id,
                None => {
                    if self.next_prefix_id > 127 {
                        self.warnings
                            .push("too many postponed prefixes".to_string());
                        continue;
                    }
                    let id = self.next_prefix_id;
                    self.next_prefix_id += 1;
                    self.prefix_ids.insert(group.flag, id);

                    // One prefix-trie entry per rule, with its condition.
                    let cond_indices: Vec<u16> =
                        group.entries.iter().map(|entry| self.cond_index(entry)).collect();
                    let folder = CaseFolder::new(&self.table);
                    for (entry, cond_index) in group.entries.iter().zip(cond_indices) {
                        let mut pflags = 0u8;
                        if !group.combines {
                            pflags |= WFP_NC;
                        }
                        if entry.upper {
                            pflags |= WFP_UP;
                        }
                        if entry.comp_permit {
                            pflags |= WFP_COMPPERMIT;
                        }
                        if entry.comp_forbid {
                            pflags |= WFP_COMPFORBID;
                        }
                        let meta = PrefixMeta {
                            prefix_id: id,
                            cond_index,
                            pflags,
                        };
                        if let Some(folded) = folder.fold(&entry.add, MAXWLEN) {
                            self.prefix.insert(folded.as_bytes(), meta.encode());
                        }
                    }
                    id
                }
            };
            ids.push(id);
        }
        ids
    }

    fn cond_index(&mut self, entry: &AffixEntry) -> u16 {
        if entry.cond.is_none() {
            return 0;
        }
        let raw = entry.cond_raw.as_bytes().to_vec();
        if let Some(i) = self.prefcond.iter().position(|c| c.raw == raw) {
            return i as u16;
        }
        self.prefcond.push(PrefCond::from_raw(raw));
        (self.prefcond.len() - 1) as u16
    }

    /// Finish: assemble the Language with every auxiliary table.
    pub fn build(mut self, name: &str) -> Language {
        let mut lang = Language::new(name, "");
        let d = self.data;

        lang.regions = self.regions;
        lang.midword = d.midword.clone();
        // REP/REPSAL/SAL strings are stored case-folded; the engine
        // compares them against folded words.
        let folder = CaseFolder::new(&self.table);
        let fold = |s: &str| folder.fold(s, MAXWLEN).unwrap_or_else(|| s.to_string());
        lang.rep = RepTable::new(
            d.rep
                .iter()
                .map(|p| RepEntry {
                    from: fold(&p.from).into_bytes(),
                    to: fold(&p.to).into_bytes(),
                })
                .collect(),
        );
        lang.repsal = RepTable::new(
            d.repsal
                .iter()
                .map(|p| RepEntry {
                    from: fold(&p.from).into_bytes(),
                    to: fold(&p.to).into_bytes(),
                })
                .collect(),
        );
        if !d.map_lines.is_empty() {
            lang.map = SimilarMap::from_map_str(&d.map_lines.join("/"));
        }
        if !d.sofo_from.is_empty() {
            if let Some(map) = SofoMap::new(&d.sofo_from, &d.sofo_to) {
                lang.sound = SoundFolding::Sofo(map);
            }
        } else if !d.sal.is_empty() {
            let mut flags = 0u8;
            if d.sal_followup {
                flags |= crate::binary::header::SAL_F0LLOWUP;
            }
            if d.sal_collapse {
                flags |= crate::binary::header::SAL_COLLAPSE;
            }
            if d.sal_rem_accents {
                flags |= crate::binary::header::SAL_REM_ACCENTS;
            }
            let folder = CaseFolder::new(&self.table);
            let fold = |s: &str| folder.fold(s, MAXWLEN).unwrap_or_else(|| s.to_string());
            let rules = d
                .sal
                .iter()
                .map(|p| SalRule::parse(&fold(&p.from), &fold(&p.to)))
                .collect();
            lang.sound = SoundFolding::Sal(SalRules::new(flags, rules));
        }
        if !d.syllable.is_empty() {
            lang.syllable = SylTable::from_raw(&d.syllable);
        }
        lang.nobreak = d.nobreak;
        lang.no_split_sugs = d.nosplitsugs;
        for w in &d.common_words {
            lang.count_common_word(w, crate::binary::header::COMMON_WORD_START_COUNT);
        }

        // Compound rules: remap affix flags to their ID bytes.
        let have_compounds = d.compflag.is_some() || !d.compound_rules.is_empty();
        if have_compounds {
            let mut rules: Vec<String> = Vec::new();
            // COMPOUNDFLAG becomes the rule "flag+": any number of
            // flagged words in a row.
            if let Some(&id) = d.compflag.and_then(|f| self.comp_ids.get(&f)) {
                rules.push(format!("{}+", id as char));
            }
            for rule in &d.compound_rules {
                let mut remapped = String::new();
                for c in rule.chars() {
                    if "?*+[]/".contains(c) {
                        remapped.push(c);
                    } else if let Some(&id) = self.comp_ids.get(&(c as u32)) {
                        remapped.push(id as char);
                    } else {
                        // Flag never used by a word; keep a placeholder
                        // ID so the rule stays well-formed.
                        remapped.push('\u{1}');
                    }
                }
                rules.push(remapped);
            }
            let flags_raw: Vec<u8> = rules
                .join("/")
                .chars()
                .map(|c| (c as u32).min(255) as u8)
                .collect();
            let mut options = 0u8;
            if d.check_dup {
                options |= crate::types::COMP_CHECK_DUP;
            }
            if d.check_rep {
                options |= crate::types::COMP_CHECK_REP;
            }
            if d.check_case {
                options |= crate::types::COMP_CHECK_CASE;
            }
            if d.check_triple {
                options |= crate::types::COMP_CHECK_TRIPLE;
            }
            let patterns = d
                .comppatterns
                .iter()
                .flat_map(|p| [p.from.clone().into_bytes(), p.to.clone().into_bytes()])
                .collect();
            lang.compound = Some(CompoundInfo::from_raw(
                if d.compmax < 2 { MAXWLEN } else { d.compmax },
                d.compmin,
                if d.compsylmax == 0 { MAXWLEN } else { d.compsylmax },
                options,
                patterns,
                flags_raw,
            ));
        }

        lang.prefcond = self.prefcond;
        lang.prefix_count = lang.prefcond.len();
        lang.fold = self.fold.finish();
        lang.keep = self.keep.finish();
        lang.prefix = self.prefix.finish();
        lang
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

fn apply_suffix(word: &str, entry: &AffixEntry) -> Option<String> {
    if let Some(prog) = &entry.cond {
        let chars: Vec<char> = word.chars().collect();
        if !prog.matches_suffix(&chars) {
            return None;
        }
    }
    let stem = if entry.chop.is_empty() {
        word
    } else {
        word.strip_suffix(entry.chop.as_str())?
    };
    Some(format!("{}{}", stem, entry.add))
}

fn apply_prefix(word: &str, entry: &AffixEntry) -> Option<String> {
    if let Some(prog) = &entry.cond {
        let chars: Vec<char> = word.chars().collect();
        if !prog.matches_prefix(&chars) {
            return None;
        }
    }
    let stem = if entry.chop.is_empty() {
        word
    } else {
        word.strip_prefix(entry.chop.as_str())?
    };
    Some(format!("{}{}", entry.add, stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::Matcher;
    use crate::types::SpellResult;

    fn check(lang: &Language, word: &str) -> SpellResult {
        let langs = [lang];
        let table = CharTable::default();
        Matcher::new(&langs, &table)
            .check_word(&format!("{} ", word), false)
            .result
    }

    #[test]
    fn suffix_expansion() {
        let data = AffixData::parse(
            "SFX S Y 2\nSFX S 0 s [^s]\nSFX S 0 es s\n",
        )
        .unwrap();
        let mut b = DictBuilder::new(&data);
        b.add_word("walk", "S").unwrap();
        b.add_word("pass", "S").unwrap();
        let lang = b.build("en");
        assert_eq!(check(&lang, "walk"), SpellResult::Good);
        assert_eq!(check(&lang, "walks"), SpellResult::Good);
        assert_eq!(check(&lang, "passes"), SpellResult::Good);
        assert_eq!(check(&lang, "walkes"), SpellResult::Bad);
        assert_eq!(check(&lang, "passs"), SpellResult::Bad);
    }

    #[test]
    fn prefix_and_cross_product() {
        let data = AffixData::parse(
            "PFX U Y 1\nPFX U 0 un .\nSFX S Y 1\nSFX S 0 s .\n",
        )
        .unwrap();
        let mut b = DictBuilder::new(&data);
        b.add_word("lock", "US").unwrap();
        let lang = b.build("en");
        assert_eq!(check(&lang, "lock"), SpellResult::Good);
        assert_eq!(check(&lang, "unlock"), SpellResult::Good);
        assert_eq!(check(&lang, "locks"), SpellResult::Good);
        assert_eq!(check(&lang, "unlocks"), SpellResult::Good);
        assert_eq!(check(&lang, "unslock"), SpellResult::Bad);
    }

    #[test]
    fn chop_suffix() {
        let data = AffixData::parse("SFX Y Y 1\nSFX Y y ies [^aeiou]y\n").unwrap();
        let mut b = DictBuilder::new(&data);
        b.add_word("pony", "Y").unwrap();
        b.add_word("play", "Y").unwrap();
        let lang = b.build("en");
        assert_eq!(check(&lang, "ponies"), SpellResult::Good);
        // "play" ends in vowel+y: the rule must not apply.
        assert_eq!(check(&lang, "plaies"), SpellResult::Bad);
    }

    #[test]
    fn keepcase_words() {
        let data = AffixData::parse("KEEPCASE K\n").unwrap();
        let mut b = DictBuilder::new(&data);
        b.add_word("NASA", "K").unwrap();
        let lang = b.build("en");
        assert_eq!(check(&lang, "NASA"), SpellResult::Good);
        assert_eq!(check(&lang, "nasa"), SpellResult::Bad);
    }

    #[test]
    fn forbidden_and_rare() {
        let data = AffixData::parse("FORBIDDENWORD X\nRARE R\n").unwrap();
        let mut b = DictBuilder::new(&data);
        b.add_word("foo", "X").unwrap();
        b.add_word("qua", "R").unwrap();
        let lang = b.build("en");
        assert_eq!(check(&lang, "foo"), SpellResult::Banned);
        assert_eq!(check(&lang, "qua"), SpellResult::Rare);
    }

    #[test]
    fn compound_flag_roundtrip() {
        let data = AffixData::parse("COMPOUNDFLAG f\nCOMPOUNDMIN 3\n").unwrap();
        let mut b = DictBuilder::new(&data);
        b.add_word("foot", "f").unwrap();
        b.add_word("ball", "f").unwrap();
        let lang = b.build("en");
        assert!(lang.compound.is_some());
        assert_eq!(check(&lang, "football"), SpellResult::Good);
        assert_eq!(check(&lang, "footballfoot"), SpellResult::Good);
        assert_eq!(check(&lang, "balls"), SpellResult::Bad);
    }

    #[test]
    fn postponed_prefixes() {
        let data = AffixData::parse("PFXPOSTPONE\nPFX U Y 1\nPFX U 0 un .\n").unwrap();
        let mut b = DictBuilder::new(&data);
        b.add_word("lock", "U").unwrap();
        let lang = b.build("en");
        assert!(!lang.prefix.is_empty());
        assert_eq!(check(&lang, "unlock"), SpellResult::Good);
        assert_eq!(check(&lang, "lock"), SpellResult::Good);
        assert_eq!(check(&lang, "unwalk"), SpellResult::Bad);
    }

    #[test]
    fn needaffix_words_need_affix() {
        let data =
            AffixData::parse("NEEDAFFIX N\nSFX S Y 1\nSFX S 0 s .\n").unwrap();
        let mut b = DictBuilder::new(&data);
        b.add_word("stem", "NS").unwrap();
        let lang = b.build("en");
        assert_eq!(check(&lang, "stems"), SpellResult::Good);
        assert_eq!(check(&lang, "stem"), SpellResult::Bad);
    }

    #[test]
    fn regions_flow_through() {
        let data = AffixData::parse("").unwrap();
        let mut b = DictBuilder::new(&data);
        b.set_regions(&["us", "gb"]);
        b.add_word_region("color", "", 0x01).unwrap();
        b.add_word_region("colour", "", 0x02).unwrap();
        let mut lang = b.build("en");
        lang.region_mask = 0x02;
        assert_eq!(check(&lang, "colour"), SpellResult::Good);
        assert_eq!(check(&lang, "color"), SpellResult::Local);
    }
}
