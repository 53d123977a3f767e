// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The `.aff` affix-file compiler.
//!
//! An affix file is a line-oriented directive stream. Every recognised
//! directive from the Hunspell/Myspell family maps to a field of
//! [`AffixData`]; PFX/SFX blocks become [`AffixGroup`]s with compiled
//! conditions. `DictBuilder` then combines the affix data with a word
//! list into a [`Language`]: affixes are expanded into the fold/keep
//! tries, except postponed prefixes which land in the prefix trie with
//! their condition table.
//!
//! Malformed directives are collected as warnings and skipped when
//! recoverable, matching the "log and continue" contract; structural
//! problems (bad PFX/SFX header, unusable FLAG) abort with a
//! `SpellError::Rule`.

mod build;

pub use build::DictBuilder;

use crate::error::{Result, SpellError};
use crate::regexp::Program;
use crate::types::MAXWLEN;

/// How flags are written in this affix file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagMode {
    /// One character per flag.
    #[default]
    Single,
    /// Two characters per flag ("FLAG long").
    Long,
    /// Decimal numbers, comma separated ("FLAG num").
    Num,
    /// An upper-case first letter starts a two-character flag
    /// ("FLAG caplong").
    CapLong,
}

/// One PFX or SFX rule line.
#[derive(Debug, Clone, Default)]
pub struct AffixEntry {
    /// Characters removed from the stem; empty for `0`.
    pub chop: String,
    /// Characters added; empty for `0`.
    pub add: String,
    /// Flags on the added affix (Myspell `add/flags` syntax), for
    /// chained affixes and compound permissions.
    pub flags: Vec<u32>,
    /// Raw condition, `.` or empty when absent.
    pub cond_raw: String,
    /// Compiled condition; `None` always matches.
    pub cond: Option<Program>,
    pub comp_forbid: bool,
    pub comp_permit: bool,
    /// Prefix that also upper-cases the following letter.
    pub upper: bool,
}

/// A named block of affix rules.
#[derive(Debug, Clone)]
pub struct AffixGroup {
    pub flag: u32,
    /// May combine with an affix of the other kind.
    pub combines: bool,
    pub is_prefix: bool,
    pub entries: Vec<AffixEntry>,
}

/// One REP/REPSAL/SAL pair as written in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub from: String,
    pub to: String,
}

/// Everything parsed out of one `.aff` file.
#[derive(Debug, Clone, Default)]
pub struct AffixData {
    pub encoding: String,
    pub flag_mode: FlagMode,
    pub midword: String,
    pub try_string: String,

    // Single-flag directives.
    pub rare_flag: Option<u32>,
    pub keepcase_flag: Option<u32>,
    pub forbidden_flag: Option<u32>,
    pub needaffix_flag: Option<u32>,
    pub circumfix_flag: Option<u32>,
    pub nosuggest_flag: Option<u32>,
    pub needcomp_flag: Option<u32>,
    pub comproot_flag: Option<u32>,
    pub compforbid_flag: Option<u32>,
    pub comppermit_flag: Option<u32>,
    pub compflag: Option<u32>,

    // Compounding.
    pub compound_rules: Vec<String>,
    pub compmin: usize,
    pub compmax: usize,
    pub compsylmax: usize,
    pub check_dup: bool,
    pub check_rep: bool,
    pub check_case: bool,
    pub check_triple: bool,
    pub comppatterns: Vec<Pair>,
    pub syllable: String,

    pub nobreak: bool,
    pub nosplitsugs: bool,
    pub nosugfile: bool,
    pub pfxpostpone: bool,

    pub rep: Vec<Pair>,
    pub repsal: Vec<Pair>,
    pub map_lines: Vec<String>,
    pub sal: Vec<Pair>,
    pub sal_followup: bool,
    pub sal_collapse: bool,
    pub sal_rem_accents: bool,
    pub sofo_from: String,
    pub sofo_to: String,
    pub common_words: Vec<String>,

    pub prefixes: Vec<AffixGroup>,
    pub suffixes: Vec<AffixGroup>,

    /// Recoverable problems, one message per skipped line.
    pub warnings: Vec<String>,
}

impl AffixData {
    /// Parse an affix file's text.
    pub fn parse(text: &str) -> Result<AffixData> {
        let mut data = AffixData {
            compmin: 0,
            compmax: MAXWLEN,
            compsylmax: MAXWLEN,
            ..AffixData::default()
        };
        let mut lines = text.lines().enumerate().peekable();

        while let Some((lnum, raw)) = lines.next() {
            let line = strip_comment(raw);
            if line.is_empty() {
                continue;
            }
            let mut it = line.split_whitespace();
            let key = it.next().unwrap_or("");
            let rest: Vec<&str> = it.collect();
            let lnum = lnum + 1;

            match key {
                "SET" => data.encoding = rest.first().unwrap_or(&"").to_string(),
                "FLAG" => {
                    data.flag_mode = match rest.first().copied() {
                        Some("long") => FlagMode::Long,
                        Some("num") => FlagMode::Num,
                        Some("caplong") => FlagMode::CapLong,
                        Some(other) => {
                            return Err(SpellError::Rule {
                                line: lnum,
                                detail: format!("unknown FLAG value '{}'", other),
                            })
                        }
                        None => FlagMode::Single,
                    }
                }
                "MIDWORD" => data.midword = rest.first().unwrap_or(&"").to_string(),
                "TRY" => data.try_string = rest.first().unwrap_or(&"").to_string(),
                "RARE" | "RAR" => data.rare_flag = data.one_flag(&rest, lnum)?,
                "KEEPCASE" | "KEP" => data.keepcase_flag = data.one_flag(&rest, lnum)?,
                "FORBIDDENWORD" | "BAD" => data.forbidden_flag = data.one_flag(&rest, lnum)?,
                "NEEDAFFIX" => data.needaffix_flag = data.one_flag(&rest, lnum)?,
                "CIRCUMFIX" => data.circumfix_flag = data.one_flag(&rest, lnum)?,
                "NOSUGGEST" => data.nosuggest_flag = data.one_flag(&rest, lnum)?,
                "NEEDCOMPOUND" | "ONLYINCOMPOUND" => {
                    data.needcomp_flag = data.one_flag(&rest, lnum)?
                }
                "COMPOUNDROOT" => data.comproot_flag = data.one_flag(&rest, lnum)?,
                "COMPOUNDFORBIDFLAG" => data.compforbid_flag = data.one_flag(&rest, lnum)?,
                "COMPOUNDPERMITFLAG" => data.comppermit_flag = data.one_flag(&rest, lnum)?,
                "COMPOUNDFLAG" => data.compflag = data.one_flag(&rest, lnum)?,
                "COMPOUNDRULE" | "COMPOUNDRULES" => {
                    if let Some(rule) = rest.first() {
                        // A plain count line announces the rules, skip it.
                        if !rule.chars().all(|c| c.is_ascii_digit()) {
                            data.compound_rules.push((*rule).to_string());
                        }
                    }
                }
                "COMPOUNDMIN" => data.compmin = num_or_warn(&mut data.warnings, &rest, lnum),
                "COMPOUNDWORDMAX" => {
                    data.compmax = num_or_warn(&mut data.warnings, &rest, lnum)
                }
                "COMPOUNDSYLMAX" => {
                    data.compsylmax = num_or_warn(&mut data.warnings, &rest, lnum)
                }
                "CHECKCOMPOUNDDUP" => data.check_dup = true,
                "CHECKCOMPOUNDREP" => data.check_rep = true,
                "CHECKCOMPOUNDCASE" => data.check_case = true,
                "CHECKCOMPOUNDTRIPLE" => data.check_triple = true,
                "CHECKCOMPOUNDPATTERN" => {
                    if rest.len() >= 2 && !rest[0].chars().all(|c| c.is_ascii_digit()) {
                        data.comppatterns.push(Pair {
                            from: rest[0].to_string(),
                            to: rest[1].to_string(),
                        });
                    } else if rest.len() == 1 && !rest[0].chars().all(|c| c.is_ascii_digit())
                    {
                        data.warnings
                            .push(format!("line {}: incomplete CHECKCOMPOUNDPATTERN", lnum));
                    }
                }
                "SYLLABLE" => data.syllable = rest.join(""),
                "NOBREAK" => data.nobreak = true,
                "NOSPLITSUGS" => data.nosplitsugs = true,
                "NOSUGFILE" => data.nosugfile = true,
                "PFXPOSTPONE" => data.pfxpostpone = true,
                "REP" | "REPSAL" => {
                    // The first line is a count, further lines are pairs.
                    if rest.len() >= 2 {
                        let list = if key == "REP" {
                            &mut data.rep
                        } else {
                            &mut data.repsal
                        };
                        list.push(Pair {
                            from: rest[0].replace('_', " "),
                            to: rest[1].replace('_', " "),
                        });
                    }
                }
                "MAP" => {
                    if let Some(first) = rest.first() {
                        if !first.chars().all(|c| c.is_ascii_digit()) {
                            data.map_lines.push((*first).to_string());
                        }
                    }
                }
                "SAL" => match rest.first().copied() {
                    Some("followup") => data.sal_followup = yesno(rest.get(1)),
                    Some("collapse_result") => data.sal_collapse = yesno(rest.get(1)),
                    Some("remove_accents") => data.sal_rem_accents = yesno(rest.get(1)),
                    Some(from) if rest.len() >= 2 => data.sal.push(Pair {
                        from: from.to_string(),
                        to: if rest[1] == "_" {
                            String::new()
                        } else {
                            rest[1].to_string()
                        },
                    }),
                    _ => {}
                },
                "SOFOFROM" => data.sofo_from = rest.first().unwrap_or(&"").to_string(),
                "SOFOTO" => data.sofo_to = rest.first().unwrap_or(&"").to_string(),
                "COMMON" => data
                    .common_words
                    .extend(rest.iter().map(|s| s.to_string())),
                "PFX" | "SFX" => {
                    let is_prefix = key == "PFX";
                    let group = parse_affix_block(&mut data, is_prefix, &rest, lnum, &mut lines)?;
                    if is_prefix {
                        data.prefixes.push(group);
                    } else {
                        data.suffixes.push(group);
                    }
                }
                _ => data
                    .warnings
                    .push(format!("line {}: unrecognized directive '{}'", lnum, key)),
            }
        }

        if !data.sofo_from.is_empty() || !data.sofo_to.is_empty() {
            if data.sofo_from.chars().count() != data.sofo_to.chars().count() {
                return Err(SpellError::Rule {
                    line: 0,
                    detail: "SOFOFROM and SOFOTO differ in length".to_string(),
                });
            }
            if !data.sal.is_empty() {
                return Err(SpellError::Rule {
                    line: 0,
                    detail: "both SAL and SOFO specified".to_string(),
                });
            }
        }
        Ok(data)
    }

    fn one_flag(&self, rest: &[&str], lnum: usize) -> Result<Option<u32>> {
        let Some(s) = rest.first() else {
            return Err(SpellError::Rule {
                line: lnum,
                detail: "missing flag value".to_string(),
            });
        };
        let flags = parse_flags(s, self.flag_mode).map_err(|detail| SpellError::Rule {
            line: lnum,
            detail,
        })?;
        Ok(flags.first().copied())
    }
}

/// Split a flag string into flag values for the given naming scheme.
pub fn parse_flags(s: &str, mode: FlagMode) -> std::result::Result<Vec<u32>, String> {
    let mut out = Vec::new();
    match mode {
        FlagMode::Single => out.extend(s.chars().map(|c| c as u32)),
        FlagMode::Long => {
            let chars: Vec<char> = s.chars().collect();
            if chars.len() % 2 != 0 {
                return Err(format!("odd length for 'long' flags: '{}'", s));
            }
            for p in chars.chunks(2) {
                out.push(((p[0] as u32) << 8) | p[1] as u32);
            }
        }
        FlagMode::Num => {
            for part in s.split(',') {
                let n: u32 = part
                    .trim()
                    .parse()
                    .map_err(|_| format!("bad numeric flag '{}'", part))?;
                if n == 0 || n > 65000 {
                    return Err(format!("numeric flag {} out of range", n));
                }
                out.push(n);
            }
        }
        FlagMode::CapLong => {
            let chars: Vec<char> = s.chars().collect();
            let mut i = 0;
            while i < chars.len() {
                if chars[i].is_uppercase() && i + 1 < chars.len() {
                    out.push(((chars[i] as u32) << 8) | chars[i + 1] as u32);
                    i += 2;
                } else {
                    out.push(chars[i] as u32);
                    i += 1;
                }
            }
        }
    }
    Ok(out)
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(i) => line[..i].trim(),
        None => line.trim(),
    }
}

fn yesno(v: Option<&&str>) -> bool {
    matches!(v.copied(), Some("1") | Some("true") | Some("yes") | None)
}

fn num_or_warn(warnings: &mut Vec<String>, rest: &[&str], lnum: usize) -> usize {
    match rest.first().and_then(|s| s.parse().ok()) {
        Some(n) => n,
        None => {
            warnings.push(format!("line {}: expected a number", lnum));
            0
        }
    }
}

/// Parse one PFX/SFX block: the header line was already split into
/// `rest`; entry lines follow in the iterator.
fn parse_affix_block<'a, I>(
    data: &mut AffixData,
    is_prefix: bool,
    rest: &[&str],
    lnum: usize,
    lines: &mut std::iter::Peekable<I>,
) -> Result<AffixGroup>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let kind = if is_prefix { "PFX" } else { "SFX" };
    if rest.len() < 3 {
        return Err(SpellError::Rule {
            line: lnum,
            detail: format!("short {} header", kind),
        });
    }
    let flag = parse_flags(rest[0], data.flag_mode)
        .map_err(|detail| SpellError::Rule { line: lnum, detail })?
        .first()
        .copied()
        .ok_or_else(|| SpellError::Rule {
            line: lnum,
            detail: format!("missing {} flag", kind),
        })?;
    let combines = rest[1] == "Y";
    // The count is advisory; a trailing "S" marks a continuation block.
    let count: usize = rest[2].parse().unwrap_or(0);

    let mut group = AffixGroup {
        flag,
        combines,
        is_prefix,
        entries: Vec::new(),
    };

    while let Some(&(_, peeked)) = lines.peek() {
        let line = strip_comment(peeked);
        let mut it = line.split_whitespace();
        if it.next() != Some(kind) {
            break;
        }
        let name = it.next().unwrap_or("");
        if parse_flags(name, data.flag_mode).ok().and_then(|f| f.first().copied()) != Some(flag)
        {
            break;
        }
        let (elnum, _) = lines.next().unwrap();
        let fields: Vec<&str> = line.split_whitespace().skip(2).collect();
        if fields.len() < 2 {
            data.warnings
                .push(format!("line {}: short {} entry", elnum + 1, kind));
            continue;
        }

        let chop = if fields[0] == "0" { "" } else { fields[0] };
        // The add string may carry Myspell "/flags".
        let (add_raw, flagpart) = match fields[1].split_once('/') {
            Some((a, f)) => (a, Some(f)),
            None => (fields[1], None),
        };
        let add = if add_raw == "0" { "" } else { add_raw };
        let cond_raw = fields.get(2).copied().unwrap_or(".").to_string();

        let mut entry = AffixEntry {
            chop: chop.to_string(),
            add: add.to_string(),
            cond_raw: cond_raw.clone(),
            ..AffixEntry::default()
        };
        if cond_raw != "." && !cond_raw.is_empty() {
            entry.cond = Program::compile(&cond_raw).ok();
            if entry.cond.is_none() {
                data.warnings.push(format!(
                    "line {}: unparsable condition '{}'",
                    elnum + 1,
                    cond_raw
                ));
            }
        }
        if let Some(fp) = flagpart {
            match parse_flags(fp, data.flag_mode) {
                Ok(flags) => {
                    for f in flags {
                        // COMPOUND{FORBID,PERMIT}FLAG are lifted into
                        // entry fields, other flags stay for chaining.
                        if Some(f) == data.compforbid_flag {
                            entry.comp_forbid = true;
                        } else if Some(f) == data.comppermit_flag {
                            entry.comp_permit = true;
                        } else {
                            entry.flags.push(f);
                        }
                    }
                }
                Err(detail) => data
                    .warnings
                    .push(format!("line {}: {}", elnum + 1, detail)),
            }
        }
        group.entries.push(entry);
    }

    if count != 0 && count != group.entries.len() {
        data.warnings.push(format!(
            "line {}: {} {} announces {} entries, found {}",
            lnum,
            kind,
            flag_name(flag),
            count,
            group.entries.len()
        ));
    }
    Ok(group)
}

fn flag_name(flag: u32) -> String {
    char::from_u32(flag).map_or_else(|| flag.to_string(), |c| c.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
SET UTF-8
TRY esianrtolcdugmphbyfvkwz
MIDWORD '-

COMPOUNDFLAG f
COMPOUNDMIN 3
NOSPLITSUGS

REP 2
REP tion sion
REP f ph

MAP 2
MAP a\u{e0}\u{e1}
MAP e\u{e8}\u{e9}

SFX S Y 2
SFX S 0 s [^s]
SFX S 0 es s

PFX U Y 1
PFX U 0 un .
";

    #[test]
    fn parses_sample() {
        let data = AffixData::parse(SAMPLE).unwrap();
        assert_eq!(data.encoding, "UTF-8");
        assert_eq!(data.midword, "'-");
        assert_eq!(data.compflag, Some('f' as u32));
        assert_eq!(data.compmin, 3);
        assert!(data.nosplitsugs);
        assert_eq!(data.rep.len(), 2);
        assert_eq!(data.rep[0].from, "tion");
        assert_eq!(data.map_lines.len(), 2);
        assert_eq!(data.suffixes.len(), 1);
        assert_eq!(data.suffixes[0].entries.len(), 2);
        assert!(data.suffixes[0].combines);
        assert_eq!(data.prefixes.len(), 1);
        assert_eq!(data.prefixes[0].entries[0].add, "un");
        assert!(data.warnings.is_empty(), "{:?}", data.warnings);
    }

    #[test]
    fn conditions_compile() {
        let data = AffixData::parse(SAMPLE).unwrap();
        let e = &data.suffixes[0].entries[0];
        assert_eq!(e.cond_raw, "[^s]");
        let prog = e.cond.as_ref().unwrap();
        let word: Vec<char> = "walk".chars().collect();
        assert!(prog.matches_suffix(&word));
        let word: Vec<char> = "pass".chars().collect();
        assert!(!prog.matches_suffix(&word));
    }

    #[test]
    fn flag_modes() {
        assert_eq!(parse_flags("ab", FlagMode::Single).unwrap(), vec![97, 98]);
        assert_eq!(
            parse_flags("aabb", FlagMode::Long).unwrap(),
            vec![(97 << 8) | 97, (98 << 8) | 98]
        );
        assert!(parse_flags("abc", FlagMode::Long).is_err());
        assert_eq!(
            parse_flags("12,345", FlagMode::Num).unwrap(),
            vec![12, 345]
        );
        assert!(parse_flags("0", FlagMode::Num).is_err());
        assert_eq!(
            parse_flags("Aab", FlagMode::CapLong).unwrap(),
            vec![((b'A' as u32) << 8) | b'a' as u32, b'b' as u32]
        );
    }

    #[test]
    fn myspell_trailing_flags() {
        let text = "\
COMPOUNDPERMITFLAG p
SFX S Y 1
SFX S 0 s/p .
";
        let data = AffixData::parse(text).unwrap();
        let e = &data.suffixes[0].entries[0];
        assert_eq!(e.add, "s");
        assert!(e.comp_permit);
        assert!(e.flags.is_empty());
    }

    #[test]
    fn count_mismatch_warns() {
        let text = "\
SFX S Y 3
SFX S 0 s .
";
        let data = AffixData::parse(text).unwrap();
        assert_eq!(data.suffixes[0].entries.len(), 1);
        assert!(!data.warnings.is_empty());
    }

    #[test]
    fn sofo_length_mismatch_is_an_error() {
        let text = "SOFOFROM abc\nSOFOTO xy\n";
        assert!(matches!(
            AffixData::parse(text),
            Err(SpellError::Rule { .. })
        ));
    }

    #[test]
    fn sal_subkeys() {
        let text = "\
SAL followup 1
SAL collapse_result 1
SAL remove_accents 0
SAL CIA X
SAL C K
";
        let data = AffixData::parse(text).unwrap();
        assert!(data.sal_followup);
        assert!(data.sal_collapse);
        assert!(!data.sal_rem_accents);
        assert_eq!(data.sal.len(), 2);
    }
}
