// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Spelt CLI: check, suggest, dump, inspect and soundfold against `.spl`
//! dictionaries.
//!
//! ```bash
//! # Classify words
//! spelt check en.utf-8.spl hello helo
//!
//! # Replacements for a misspelling
//! spelt suggest en.utf-8.spl thes --limit 5
//!
//! # Show the binary layout of a dictionary
//! spelt inspect en.utf-8.spl
//! ```

use std::io::BufRead;
use std::path::Path;

use clap::Parser;

use spelt::binary::header::{SN_END, SPELL_MAGIC, SPELL_VERSION};
use spelt::{Engine, SpellResult, SuggestMode};

mod cli;
use cli::display::{
    format_size, pad_left, pad_right, section_name, styled, BOLD, CYAN, DIM, GREEN, RED, YELLOW,
};
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let status = match cli.command {
        Commands::Check {
            file,
            words,
            lines,
            json,
        } => cmd_check(&file, &words, lines, json),
        Commands::Suggest {
            file,
            word,
            limit,
            mode,
            sug,
            json,
        } => cmd_suggest(&file, &word, limit, &mode, sug.as_deref(), json),
        Commands::Dump {
            file,
            pattern,
            flags,
        } => cmd_dump(&file, pattern.as_deref(), flags),
        Commands::Inspect { file } => cmd_inspect(&file),
        Commands::Soundfold { file, words } => cmd_soundfold(&file, &words),
    };
    if let Err(msg) = status {
        eprintln!("{}", styled(RED, &format!("error: {}", msg)));
        std::process::exit(1);
    }
}

fn load_engine(file: &str) -> Result<Engine, String> {
    let mut engine = Engine::new();
    let name = Path::new(file)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string());
    engine
        .load_language(Path::new(file), &name)
        .map_err(|e| e.user_message())?;
    Ok(engine)
}

fn result_label(r: SpellResult) -> String {
    match r {
        SpellResult::Good => styled(GREEN, "good"),
        SpellResult::Rare => styled(YELLOW, "rare"),
        SpellResult::Local => styled(YELLOW, "local"),
        SpellResult::Bad => styled(RED, "bad"),
        SpellResult::Banned => styled(RED, "banned"),
    }
}

fn cmd_check(file: &str, words: &[String], lines: bool, json: bool) -> Result<(), String> {
    let engine = load_engine(file)?;

    let inputs: Vec<String> = if words.is_empty() {
        std::io::stdin()
            .lock()
            .lines()
            .map_while(Result::ok)
            .collect()
    } else {
        words.to_vec()
    };

    let mut had_bad = false;
    for input in &inputs {
        if lines {
            let hits = engine.check_line(input);
            had_bad |= !hits.is_empty();
            if json {
                let row: Vec<serde_json::Value> = hits
                    .iter()
                    .map(|(off, r)| {
                        serde_json::json!({
                            "offset": off,
                            "length": r.len,
                            "result": r.result,
                            "word": &input[*off..*off + r.len],
                        })
                    })
                    .collect();
                println!("{}", serde_json::json!({ "line": input, "errors": row }));
            } else if hits.is_empty() {
                println!("{}  {}", styled(GREEN, "ok "), input);
            } else {
                for (off, r) in hits {
                    println!(
                        "{}  {} (at byte {})",
                        result_label(r.result),
                        &input[off..off + r.len],
                        off
                    );
                }
            }
        } else {
            // One word per entry; append a blank so the word ends.
            let r = engine.check_word(&format!("{} ", input));
            had_bad |= r.result.needs_attention();
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "word": input, "result": r.result })
                );
            } else {
                println!("{} {}", pad_right(&result_label(r.result), 8), input);
            }
        }
    }
    if had_bad {
        std::process::exit(2);
    }
    Ok(())
}

fn cmd_suggest(
    file: &str,
    word: &str,
    limit: usize,
    mode: &str,
    sug: Option<&str>,
    json: bool,
) -> Result<(), String> {
    let mut engine = load_engine(file)?;
    let mode = match mode {
        "best" => SuggestMode::Best,
        "fast" => SuggestMode::Fast,
        "double" => SuggestMode::Double,
        other => return Err(format!("unknown mode '{}'", other)),
    };
    engine
        .set_spellsuggest(match mode {
            SuggestMode::Best => "best",
            SuggestMode::Fast => "fast",
            SuggestMode::Double => "double",
        })
        .map_err(|e| e.user_message())?;
    if let Some(sug_path) = sug {
        engine
            .load_sug_file(0, Path::new(sug_path))
            .map_err(|e| e.user_message())?;
    }

    let checked = engine.check_word(&format!("{} ", word));
    if !checked.result.needs_attention() {
        println!("{} is spelled correctly", styled(BOLD, word));
        return Ok(());
    }

    let sugs = engine.suggestions(word, limit, false);
    if json {
        println!("{}", serde_json::to_string_pretty(&sugs).unwrap());
        return Ok(());
    }
    if sugs.is_empty() {
        println!("no suggestions for {}", styled(BOLD, word));
        return Ok(());
    }
    println!(
        "{}",
        styled(BOLD, &format!("suggestions for \"{}\":", word))
    );
    for (i, s) in sugs.iter().enumerate() {
        let origin = if s.sound_based {
            styled(CYAN, "sound")
        } else {
            styled(DIM, "edit ")
        };
        println!(
            " {}  {}  {} {}",
            pad_left(&format!("{}", i + 1), 2),
            pad_right(&s.word, 24),
            origin,
            styled(DIM, &format!("score {}", s.score)),
        );
    }
    Ok(())
}

fn cmd_dump(file: &str, pattern: Option<&str>, with_flags: bool) -> Result<(), String> {
    let engine = load_engine(file)?;
    let mut count = 0usize;
    engine.dump_words(pattern, |word, meta, _| {
        count += 1;
        if with_flags {
            let mut marks = String::new();
            if meta.has(spelt::types::WF_RARE) {
                marks.push('?');
            }
            if meta.has(spelt::types::WF_BANNED) {
                marks.push('!');
            }
            if meta.region != 0 {
                marks.push_str(&format!("={:02x}", meta.region));
            }
            if meta.affix_id != 0 {
                marks.push_str(&format!("+{}", meta.affix_id));
            }
            println!("{}\t{}", word, marks);
        } else {
            println!("{}", word);
        }
    });
    eprintln!("{}", styled(DIM, &format!("{} words", count)));
    Ok(())
}

fn cmd_inspect(file: &str) -> Result<(), String> {
    let bytes = std::fs::read(file).map_err(|e| format!("{}: {}", file, e))?;
    if bytes.len() < 9 || &bytes[..8] != SPELL_MAGIC {
        return Err(format!("{}: not a spell file", file));
    }
    let version = bytes[8];
    println!(
        "{} {} ({}, format version {})",
        styled(BOLD, file),
        format_size(bytes.len()),
        if version == SPELL_VERSION {
            styled(GREEN, "supported")
        } else {
            styled(RED, "unsupported")
        },
        version,
    );

    let mut pos = 9usize;
    println!("{}", styled(BOLD, "sections:"));
    loop {
        if pos >= bytes.len() {
            return Err("truncated section stream".to_string());
        }
        let id = bytes[pos];
        pos += 1;
        if id == SN_END {
            break;
        }
        if pos + 5 > bytes.len() {
            return Err("truncated section header".to_string());
        }
        let flags = bytes[pos];
        let len = u32::from_be_bytes([bytes[pos + 1], bytes[pos + 2], bytes[pos + 3], bytes[pos + 4]])
            as usize;
        pos += 5;
        println!(
            "  {} {} {} {}",
            pad_left(&id.to_string(), 3),
            pad_right(section_name(id), 12),
            pad_left(&format_size(len), 9),
            if flags & 1 != 0 {
                styled(YELLOW, "required")
            } else {
                styled(DIM, "optional")
            },
        );
        pos += len;
    }

    for tree in ["fold-case", "keep-case", "prefix"] {
        if pos + 4 > bytes.len() {
            return Err("truncated tree header".to_string());
        }
        let slots =
            u32::from_be_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]]);
        println!(
            "  {} {}",
            pad_right(&format!("{} tree", tree), 16),
            styled(DIM, &format!("{} slots", slots)),
        );
        // Skipping the node stream needs a parse; load the whole file
        // through the reader instead for the word counts.
        break;
    }

    let engine = load_engine(file)?;
    if let Some(lang) = engine.language(0) {
        let mut words = 0usize;
        lang.fold.for_each_word(|_, _| words += 1);
        println!("{}", styled(BOLD, "contents:"));
        println!("  fold-case words  {}", words);
        let mut kwords = 0usize;
        lang.keep.for_each_word(|_, _| kwords += 1);
        println!("  keep-case words  {}", kwords);
        println!("  regions          {:?}", lang.regions);
        println!("  prefix entries   {}", lang.prefix_count);
        println!("  REP entries      {}", lang.rep.entries().len());
        let sound = match &lang.sound {
            spelt::SoundFolding::None => "none",
            spelt::SoundFolding::Sofo(_) => "SOFO",
            spelt::SoundFolding::Sal(_) => "SAL",
        };
        println!("  sound folding    {}", sound);
        println!("  compounding      {}", lang.compound.is_some());
    }
    Ok(())
}

fn cmd_soundfold(file: &str, words: &[String]) -> Result<(), String> {
    let engine = load_engine(file)?;
    let lang = engine.language(0).ok_or("no language loaded")?;
    if lang.sound.is_none() {
        return Err("dictionary has no SAL or SOFO section".to_string());
    }
    for word in words {
        match engine.sound_fold(0, word) {
            Some(folded) => println!("{}\t{}", word, folded),
            None => println!("{}\t", word),
        }
    }
    Ok(())
}
